//! Binning defaults and bin/scale/tooltip consistency.

use crate::options::PipelineOptions;
use crate::pipeline::Leaf;
use crate::spec::{channel, BinParams, BinSpec, MarkType, Prop};
use crate::Result;

/// Replace a bare `bin: true` on x/y channels with an explicit bin count.
///
/// Heat-map groups are skipped: label layers are added to heat-maps and
/// later removed by cardinality, and the size of a binned heat-map cannot be
/// known here, so binned heat-maps keep whatever the generator asked for.
pub fn set_default_bins(leaves: &mut [Leaf<'_>], options: &PipelineOptions) -> Result<()> {
    if leaves
        .iter()
        .any(|leaf| leaf.node.mark_type() == Some(MarkType::Rect))
    {
        return Ok(());
    }
    for leaf in leaves.iter_mut() {
        let Some(encoding) = leaf.node.encoding.value_mut() else {
            continue;
        };
        for channel_name in [channel::X, channel::Y] {
            let Some(spec) = encoding.single_mut(channel_name) else {
                continue;
            };
            if matches!(spec.bin.value(), Some(BinSpec::Enabled(true))) {
                spec.bin = Prop::Value(BinSpec::Params(BinParams::with_maxbins(
                    options.default_max_bins,
                )));
            }
        }
    }
    Ok(())
}

/// Keep scales and tooltips consistent with binning: a binned channel cannot
/// carry a typed scale, and the first tooltip entry over the same field must
/// show the same buckets.
pub fn sync_binning(leaves: &mut [Leaf<'_>]) -> Result<()> {
    for leaf in leaves.iter_mut() {
        let Some(encoding) = leaf.node.encoding.value_mut() else {
            continue;
        };
        for channel_name in [channel::X, channel::Y] {
            let (bin, field) = {
                let Some(spec) = encoding.single_mut(channel_name) else {
                    continue;
                };
                if spec.bin.is_unset() {
                    continue;
                }
                if let Some(scale) = spec.scale.value_mut() {
                    scale.scale_type.unset();
                }
                let active = spec.bin.value().is_some_and(BinSpec::is_active);
                match (active, spec.field()) {
                    (true, Some(field)) => (spec.bin.clone(), field.to_string()),
                    _ => continue,
                }
            };
            let Some(tooltips) = encoding.get_mut(channel::TOOLTIP) else {
                continue;
            };
            for tooltip in tooltips.iter_mut() {
                if tooltip.field() == Some(field.as_str()) {
                    tooltip.bin = bin;
                    break;
                }
            }
        }
    }
    Ok(())
}
