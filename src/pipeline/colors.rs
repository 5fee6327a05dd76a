//! Default categorical palette assignment.
//!
//! Disabled by default (`PipelineOptions::assign_default_colors`): leaves
//! without an explicit color scale get the house palette, assigned
//! cyclically over the sorted category domain.

use polars::prelude::*;

use crate::pipeline::Leaf;
use crate::spec::{channel, Encoding, EncodingSpec, Prop, ScaleSpec, ScaleValue};
use crate::{Result, TidyError};

/// Default categorical palette, assigned cyclically.
pub const DEFAULT_COLORS: &[&str] = &[
    "#1A73E8", "#12B5CB", "#F538A0", "#FA903E", "#C58AF9", "#81C995", "#FCC934", "#9AA0A6",
    "#185ABC", "#129EAF", "#E52592", "#D56E0C", "#A142F4", "#1E8E3E", "#F9AB00", "#5F6368",
    "#669DF6", "#4ECDE6", "#FF8BCB", "#FCAD70", "#E9D2FD", "#A8DAB5", "#FDD663", "#BDC1C6",
];

/// Assign the default palette to leaves without explicit color scales.
///
/// A leaf with no color channel gets a constant first-palette color (which
/// introduces no legend); a discrete color channel gets a domain/range scale
/// over its sorted categories. Continuous color channels and explicit ranges
/// are respected.
pub fn assign_default_colors(leaves: &mut [Leaf<'_>]) -> Result<()> {
    for leaf in leaves.iter_mut() {
        let table = leaf.table.clone();
        let encoding = leaf.node.encoding.get_or_insert_with(Encoding::new);

        let has_explicit_range = encoding
            .single(channel::COLOR)
            .and_then(|spec| spec.scale.value())
            .is_some_and(|scale| !scale.range.is_unset());
        if has_explicit_range {
            continue;
        }

        let Some(color) = encoding.single(channel::COLOR) else {
            encoding.insert(
                channel::COLOR,
                EncodingSpec {
                    value: Prop::Value(serde_json::json!(DEFAULT_COLORS[0])),
                    ..EncodingSpec::default()
                },
            );
            continue;
        };
        // A continuous color scale would swallow the whole palette.
        if color.is_continuous() {
            continue;
        }
        if color.value.is_defined() {
            continue;
        }

        let domain: Vec<ScaleValue> = match color.scale.value().and_then(|s| s.domain.value()) {
            Some(values) => values.clone(),
            None => {
                let field = color.field().ok_or_else(|| {
                    TidyError::MalformedNode("color channel has no field".to_string())
                })?;
                let Some(table) = table.as_ref() else {
                    continue;
                };
                sorted_domain(&table.borrow(), field)?
            }
        };
        let range: Vec<ScaleValue> = (0..domain.len())
            .map(|idx| ScaleValue::String(DEFAULT_COLORS[idx % DEFAULT_COLORS.len()].to_string()))
            .collect();

        if let Some(spec) = encoding.single_mut(channel::COLOR) {
            let scale = spec.scale.get_or_insert_with(ScaleSpec::default);
            scale.domain = Prop::Value(domain);
            scale.range = Prop::Value(range);
        }
    }
    Ok(())
}

/// Sorted distinct non-null values of a column, as scale domain entries.
fn sorted_domain(frame: &DataFrame, column: &str) -> Result<Vec<ScaleValue>> {
    let series = frame.column(column)?.as_materialized_series().drop_nulls();
    if matches!(series.dtype(), DataType::String) {
        let mut values: Vec<String> = series
            .str()?
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect();
        values.sort();
        values.dedup();
        Ok(values.into_iter().map(ScaleValue::String).collect())
    } else {
        let floats = series.cast(&DataType::Float64)?;
        let mut values: Vec<f64> = floats.f64()?.into_iter().flatten().collect();
        values.sort_by(f64::total_cmp);
        values.dedup();
        Ok(values.into_iter().map(ScaleValue::Number).collect())
    }
}
