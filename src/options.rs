//! Tunable thresholds for the post-processing heuristics.

use serde::{Deserialize, Serialize};

/// Ordered character substitutions applied to table column names and to
/// encoding fields. The same ordered table is used on both sides so renamed
/// columns and rewritten field references stay addressable to each other.
pub const COLUMN_NAME_REPLACEMENTS: &[(&str, &str)] = &[
    ("[", "("),
    ("]", ")"),
    (".", " "),
    (":", "_"),
    ("'", ""),
];

/// Thresholds and defaults for every correction stage.
///
/// `Default` reproduces the production constants; deserialize a partial
/// config over it to override individual knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Minimum distinct non-null values before a column bound to a chart
    /// channel is eligible for type conversion.
    pub min_distinct_for_conversion: usize,
    /// Wedge count above which a pie chart's tail is collapsed into an
    /// "Other" bucket.
    pub max_pie_wedges: usize,
    /// Distinct x categories above which bar/box charts rotate horizontal.
    pub max_vertical_bars: usize,
    /// Bin count substituted for a bare `bin: true`.
    pub default_max_bins: u32,
    /// Outer radius assigned to labeled pies that don't set one.
    pub default_pie_radius: f64,
    /// Distance between a pie's outer radius and its labels.
    pub label_offset: f64,
    /// Distinct x categories above which a heat-map's label layer is dropped.
    pub max_heatmap_labeled_x: usize,
    /// Fraction of the mean-to-extremum distance padded onto axis domains.
    pub axis_padding: f64,
    /// Assign the default categorical palette to leaves without explicit
    /// color scales. Off until default styling has an owner.
    pub assign_default_colors: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            min_distinct_for_conversion: 10,
            max_pie_wedges: 24,
            max_vertical_bars: 25,
            default_max_bins: 30,
            default_pie_radius: 120.0,
            label_offset: 20.0,
            max_heatmap_labeled_x: 20,
            axis_padding: 0.15,
            assign_default_colors: false,
        }
    }
}
