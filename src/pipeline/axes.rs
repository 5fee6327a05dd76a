//! Axis-domain computation from column extrema.

use crate::options::PipelineOptions;
use crate::pipeline::Leaf;
use crate::spec::{channel, FieldType, MarkType, Prop, ScaleSpec};
use crate::table::{all_non_negative, numeric_summary};
use crate::Result;

/// Marks whose geometry makes min/max-derived domains misleading (bars and
/// areas are anchored at zero, arcs and geoshapes have no positional axes).
const DOMAIN_DENY_LIST: &[MarkType] = &[
    MarkType::Arc,
    MarkType::Area,
    MarkType::Bar,
    MarkType::Rect,
    MarkType::Geoshape,
    MarkType::Rule,
];

/// Give unscaled quantitative x/y channels a domain padded slightly beyond
/// the data so boundary points are not cut off.
pub fn scale_axes(leaves: &mut [Leaf<'_>], options: &PipelineOptions) -> Result<()> {
    for leaf in leaves.iter() {
        if let Some(mark) = leaf.node.mark_type() {
            if DOMAIN_DENY_LIST.contains(&mark) {
                return Ok(());
            }
        }
    }

    for leaf in leaves.iter_mut() {
        let Some(table) = leaf.table.clone() else {
            continue;
        };
        let Some(encoding) = leaf.node.encoding.value_mut() else {
            continue;
        };
        for channel_name in [channel::X, channel::Y] {
            let Some(spec) = encoding.single_mut(channel_name) else {
                continue;
            };
            let field = match spec.field() {
                Some(field) => field.to_string(),
                None => continue,
            };
            if !matches!(spec.field_type.value(), Some(FieldType::Quantitative)) {
                continue;
            }
            // Respect any scale the generator set deliberately.
            if !spec.scale.is_unset() {
                continue;
            }
            // Min and max of binned or aggregated channels are not the range
            // the axis should show.
            if !spec.bin.is_unset() || !spec.aggregate.is_unset() {
                continue;
            }

            let (mut lower, upper) = {
                let frame = table.borrow();
                let summary = numeric_summary(&frame, &field)?;
                let lower = summary.min - options.axis_padding * (summary.mean - summary.min);
                let upper = summary.max + options.axis_padding * (summary.max - summary.mean);
                let clamp = lower < 0.0 && all_non_negative(&frame, &field)?;
                (if clamp { 0.0 } else { lower }, upper)
            };
            // Guard against NaN from degenerate columns.
            if !lower.is_finite() || !upper.is_finite() {
                continue;
            }
            if lower > upper {
                lower = upper;
            }
            spec.scale = Prop::Value(ScaleSpec::with_domain(lower, upper));
        }
    }
    Ok(())
}
