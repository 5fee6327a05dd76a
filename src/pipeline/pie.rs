//! Pie shaping and wedge capping.

use polars::prelude::*;

use crate::options::PipelineOptions;
use crate::pipeline::Leaf;
use crate::spec::{
    channel, Encoding, EncodingSpec, MarkType, Prop, SortOrder, Stack, StackOffset,
};
use crate::table::{distinct_count, is_numeric_dtype, is_string_dtype};
use crate::{Result, TidyError};

fn mark_indices(leaves: &[Leaf<'_>], mark: MarkType) -> Vec<usize> {
    leaves
        .iter()
        .enumerate()
        .filter(|(_, leaf)| leaf.node.mark_type() == Some(mark))
        .map(|(idx, _)| idx)
        .collect()
}

/// Fix a pie chart's wedge order, stacking, and label placement.
///
/// Requires exactly one arc leaf and at most one text leaf in the group.
/// The pie's wedges are ordered descending by value and theta is forced to
/// stack (labels land in the wrong positions otherwise). When a text leaf
/// exists, its radius is pushed just outside the pie and its order and
/// stacking mirror the pie's.
pub fn format_labeled_pie(leaves: &mut [Leaf<'_>], options: &PipelineOptions) -> Result<()> {
    let pies = mark_indices(leaves, MarkType::Arc);
    let texts = mark_indices(leaves, MarkType::Text);
    let &[pie_idx] = pies.as_slice() else {
        return Ok(());
    };
    if texts.len() > 1 {
        return Ok(());
    }

    let order = {
        let pie = &mut leaves[pie_idx];
        let encoding = pie.node.encoding.value_mut().ok_or_else(|| {
            TidyError::MalformedNode("pie leaf has no encoding".to_string())
        })?;
        let theta = encoding.single(channel::THETA).ok_or_else(|| {
            TidyError::MalformedNode("pie leaf has no theta channel".to_string())
        })?;
        EncodingSpec {
            field: theta.field.clone(),
            field_type: theta.field_type.clone(),
            sort: Prop::Value(SortOrder::Descending),
            ..EncodingSpec::default()
        }
    };

    let mut uses_normalize = false;
    {
        let pie = &mut leaves[pie_idx];
        let encoding = pie.node.encoding.value_mut().ok_or_else(|| {
            TidyError::MalformedNode("pie leaf has no encoding".to_string())
        })?;
        encoding.insert(channel::ORDER, order.clone());
        if let Some(theta) = encoding.single_mut(channel::THETA) {
            if theta.stack.value().is_some_and(|stack| stack.is_normalize()) {
                uses_normalize = true;
            } else {
                theta.stack = Prop::Value(Stack::Enabled(true));
            }
        }
    }

    // An unlabeled pie is done here.
    let &[text_idx] = texts.as_slice() else {
        return Ok(());
    };

    let outer_radius = {
        let pie = &mut leaves[pie_idx];
        let mark = pie.node.mark.value_mut().ok_or_else(|| {
            TidyError::MalformedNode("pie leaf has no mark".to_string())
        })?;
        *mark
            .outer_radius
            .get_or_insert_with(|| options.default_pie_radius)
    };

    let text = &mut leaves[text_idx];
    if let Some(mark) = text.node.mark.value_mut() {
        mark.radius = Prop::Value(outer_radius + options.label_offset);
    }
    let encoding = text.node.encoding.get_or_insert_with(Encoding::new);
    encoding.insert(channel::ORDER, order);
    if let Some(theta) = encoding.single_mut(channel::THETA) {
        theta.stack = Prop::Value(if uses_normalize {
            Stack::Offset(StackOffset::Normalize)
        } else {
            Stack::Enabled(true)
        });
    }
    Ok(())
}

/// Collapse a pie's smallest wedges into one aggregate row.
///
/// With more distinct color categories than `max_pie_wedges`, the rows are
/// sorted descending by the theta field, the largest kept verbatim, and the
/// tail replaced by a single row whose numeric columns are sums and whose
/// string columns read "Other". The shared table is rewritten in place.
pub fn cap_wedges(leaves: &mut [Leaf<'_>], options: &PipelineOptions) -> Result<()> {
    let pies = mark_indices(leaves, MarkType::Arc);
    let &[pie_idx] = pies.as_slice() else {
        return Ok(());
    };
    let leaf = &leaves[pie_idx];
    let Some(encoding) = leaf.node.encoding.value() else {
        return Ok(());
    };
    let Some(theta_field) = encoding.single(channel::THETA).and_then(|spec| spec.field())
    else {
        return Ok(());
    };
    let Some(color_field) = encoding.single(channel::COLOR).and_then(|spec| spec.field())
    else {
        return Ok(());
    };

    let table = leaf.table()?.clone();
    let capped = {
        let frame = table.borrow();
        if distinct_count(&frame, color_field)? <= options.max_pie_wedges {
            return Ok(());
        }
        build_capped_frame(&frame, theta_field, options.max_pie_wedges)?
    };
    *table.borrow_mut() = capped;
    Ok(())
}

/// Keep the `max_wedges - 1` largest rows and synthesize the aggregate row:
/// numeric columns summed in their native dtype, string columns forced to
/// "Other", anything else null.
fn build_capped_frame(frame: &DataFrame, theta_field: &str, max_wedges: usize) -> Result<DataFrame> {
    let sorted = frame.sort(
        [theta_field],
        SortMultipleOptions::default()
            .with_order_descending(true)
            .with_nulls_last(true),
    )?;
    let kept = sorted.head(Some(max_wedges - 1));
    let tail = sorted.slice((max_wedges - 1) as i64, sorted.height());

    let mut aggregate: Vec<Column> = Vec::with_capacity(tail.width());
    for column in tail.get_columns() {
        let series = column.as_materialized_series();
        let name = series.name().clone();
        let collapsed = if is_numeric_dtype(series.dtype()) {
            let floats = series.cast(&DataType::Float64)?;
            let total = floats.f64()?.sum().unwrap_or(0.0);
            Series::new(name, vec![total]).cast(series.dtype())?
        } else if is_string_dtype(series.dtype()) {
            Series::new(name, vec!["Other"])
        } else {
            Series::full_null(name, 1, series.dtype())
        };
        aggregate.push(collapsed.into_column());
    }
    let aggregate = DataFrame::new(aggregate)?;
    Ok(kept.vstack(&aggregate)?)
}
