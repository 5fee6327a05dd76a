//! The correction pipeline.
//!
//! Stages run in a fixed order, once per top-level specification, over the
//! flattened (leaf, table) list. Every stage sits behind its own fault
//! boundary: a failing heuristic must never block the others or the eventual
//! render, so its error is logged and the remaining stages still run. The
//! worst case is a specification returned with fewer corrections applied
//! than intended.

mod axes;
mod bins;
mod cleanup;
mod colors;
mod flatten;
mod heatmap;
mod infer;
mod orient;
mod pie;
mod sanitize;

pub use flatten::{flatten_concats, flatten_layers, Leaf, Panel};

use tracing::warn;

use crate::options::PipelineOptions;
use crate::spec::ChartNode;
use crate::table::TableRef;
use crate::Result;

/// The post-processing pipeline. Holds the thresholds every stage reads.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(options: PipelineOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Run every correction stage over `chart`, mutating the tree and its
    /// tables in place.
    ///
    /// `data` supplies the root table when the specification does not carry
    /// one itself (e.g. when operating on a pre-flattened node). All tables
    /// are deep-copied during flattening; the caller's handles are never
    /// mutated — corrected data lives in the tree afterwards.
    pub fn run(&self, chart: &mut ChartNode, data: Option<TableRef>) {
        if chart.data.is_none() {
            chart.data = data;
        }
        let panels = flatten_concats(chart);
        let single_panel = panels.len() == 1;
        for panel in panels {
            self.process_panel(panel, single_panel);
        }
    }

    fn process_panel(&self, panel: Panel<'_>, single_panel: bool) {
        let Panel { node, table } = panel;
        let options = &self.options;

        let declutter = {
            let mut leaves = flatten_layers(&mut *node, table);

            guard("column-sanitization", sanitize::sanitize_columns(&mut leaves));
            guard(
                "type-inference",
                infer::update_types_and_formats(&mut leaves, options),
            );
            guard("axis-scaling", axes::scale_axes(&mut leaves, options));
            guard(
                "selector-dedup",
                cleanup::remove_duplicate_selectors(&mut leaves),
            );
            guard(
                "legend-suppression",
                cleanup::remove_legend_suppression(&mut leaves),
            );
            guard(
                "legend-singletons",
                cleanup::remove_single_category_legends(&mut leaves),
            );
            guard("pie-shaping", pie::format_labeled_pie(&mut leaves, options));
            guard("wedge-capping", pie::cap_wedges(&mut leaves, options));
            if single_panel {
                // Rotating one panel of a concatenation would desynchronize
                // it from its siblings; leave multi-panel charts alone.
                guard(
                    "bar-rotation",
                    orient::rotate_crowded_bars(&mut leaves, options),
                );
            }
            guard(
                "facet-orientation",
                orient::match_grouping_orientation(&mut leaves),
            );
            guard("default-bins", bins::set_default_bins(&mut leaves, options));
            guard("bin-sync", bins::sync_binning(&mut leaves));
            if options.assign_default_colors {
                guard("default-colors", colors::assign_default_colors(&mut leaves));
            }

            match heatmap::plan_declutter(&leaves, options) {
                Ok(plan) => plan,
                Err(error) => {
                    warn!(
                        stage = "heatmap-declutter",
                        %error,
                        "post-processing stage failed; continuing"
                    );
                    None
                }
            }
        };
        if let Some(path) = declutter {
            heatmap::remove_text_leaf(node, &path);
        }
    }
}

/// Run the pipeline with default options.
pub fn post_process(chart: &mut ChartNode, data: Option<TableRef>) {
    Pipeline::default().run(chart, data);
}

fn guard(stage: &str, outcome: Result<()>) {
    if let Err(error) = outcome {
        warn!(stage, %error, "post-processing stage failed; continuing");
    }
}
