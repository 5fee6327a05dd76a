//! Selector and legend cleanup.

use std::collections::HashSet;

use crate::pipeline::Leaf;
use crate::spec::{channel, MarkType};
use crate::table::distinct_count;
use crate::Result;

/// Remove selectors whose name already appeared on an earlier leaf, keeping
/// the first occurrence. A selection emptied this way is cleared entirely.
pub fn remove_duplicate_selectors(leaves: &mut [Leaf<'_>]) -> Result<()> {
    let mut seen: HashSet<String> = HashSet::new();
    for leaf in leaves.iter_mut() {
        let Some(selection) = leaf.node.selection.value_mut() else {
            continue;
        };
        let duplicates: Vec<String> = selection
            .keys()
            .filter(|name| !seen.insert((*name).clone()))
            .cloned()
            .collect();
        for name in &duplicates {
            selection.shift_remove(name);
        }
        if selection.is_empty() {
            leaf.node.selection.unset();
        }
    }
    Ok(())
}

/// `legend: null` on pies and heat-maps removes context the reader needs;
/// clear the suppression back to the default legend.
pub fn remove_legend_suppression(leaves: &mut [Leaf<'_>]) -> Result<()> {
    for leaf in leaves.iter_mut() {
        if !matches!(
            leaf.node.mark_type(),
            Some(MarkType::Arc | MarkType::Rect)
        ) {
            continue;
        }
        let Some(encoding) = leaf.node.encoding.value_mut() else {
            continue;
        };
        let Some(color) = encoding.single_mut(channel::COLOR) else {
            continue;
        };
        if color.legend.is_null() {
            color.legend.unset();
        }
    }
    Ok(())
}

/// A color or shape bound to a single-valued column adds a one-entry legend
/// and nothing else; drop the channel. Pies lose their meaning without color
/// (and shape doesn't apply), and heat-maps encode value in color, so groups
/// containing either are left alone.
pub fn remove_single_category_legends(leaves: &mut [Leaf<'_>]) -> Result<()> {
    if leaves.iter().any(|leaf| {
        matches!(
            leaf.node.mark_type(),
            Some(MarkType::Arc | MarkType::Rect)
        )
    }) {
        return Ok(());
    }

    for leaf in leaves.iter_mut() {
        for channel_name in [channel::COLOR, channel::SHAPE] {
            let field = match leaf
                .node
                .encoding
                .value()
                .and_then(|encoding| encoding.single(channel_name))
                .and_then(|spec| spec.field())
            {
                Some(field) => field.to_string(),
                None => continue,
            };
            let count = distinct_count(&leaf.table()?.borrow(), &field)?;
            if count == 1 {
                if let Some(encoding) = leaf.node.encoding.value_mut() {
                    encoding.remove(channel_name);
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{flatten_concats, flatten_layers};
    use crate::spec::{ChartNode, EncodingSpec, FieldType, Prop, SelectionDef};
    use crate::table::TableRef;
    use polars::prelude::*;

    fn table(values: &[&str]) -> TableRef {
        TableRef::new(
            DataFrame::new(vec![Series::new("series".into(), values).into_column()]).unwrap(),
        )
    }

    fn with_leaves<F: FnOnce(&mut [Leaf<'_>])>(chart: &mut ChartNode, f: F) {
        let mut panels = flatten_concats(chart);
        let panel = panels.pop().unwrap();
        let mut leaves = flatten_layers(panel.node, panel.table);
        f(&mut leaves);
    }

    #[test]
    fn test_duplicate_selectors_keep_first_occurrence() {
        let first = ChartNode::with_mark(MarkType::Line)
            .with_selection("zoom", SelectionDef::interval())
            .with_selection("hover", SelectionDef::default());
        let second = ChartNode::with_mark(MarkType::Point)
            .with_selection("zoom", SelectionDef::interval());
        let mut chart = ChartNode::new()
            .with_layers(vec![first, second])
            .with_data(table(&["a"]));

        with_leaves(&mut chart, |leaves| {
            remove_duplicate_selectors(leaves).unwrap();
        });

        let layers = chart.layer.as_ref().unwrap();
        let kept = layers[0].selection.value().unwrap();
        assert!(kept.contains_key("zoom"));
        assert!(kept.contains_key("hover"));
        // The second layer's selection emptied out and was cleared.
        assert!(layers[1].selection.is_unset());
    }

    #[test]
    fn test_unique_selectors_survive() {
        let first = ChartNode::with_mark(MarkType::Line)
            .with_selection("zoom", SelectionDef::interval());
        let second = ChartNode::with_mark(MarkType::Point)
            .with_selection("brush", SelectionDef::interval());
        let mut chart = ChartNode::new()
            .with_layers(vec![first, second])
            .with_data(table(&["a"]));
        with_leaves(&mut chart, |leaves| {
            remove_duplicate_selectors(leaves).unwrap();
        });
        let layers = chart.layer.as_ref().unwrap();
        assert!(layers[0].selection.is_defined());
        assert!(layers[1].selection.is_defined());
    }

    #[test]
    fn test_legend_null_cleared_on_arc() {
        let mut spec = EncodingSpec::for_field("series", FieldType::Nominal);
        spec.legend = Prop::Null;
        let mut chart = ChartNode::with_mark(MarkType::Arc)
            .with_channel(channel::COLOR, spec)
            .with_data(table(&["a", "b"]));
        with_leaves(&mut chart, |leaves| {
            remove_legend_suppression(leaves).unwrap();
        });
        let color = chart.encoding.value().unwrap().single(channel::COLOR).unwrap();
        assert!(color.legend.is_unset());
    }

    #[test]
    fn test_legend_null_kept_on_other_marks() {
        let mut spec = EncodingSpec::for_field("series", FieldType::Nominal);
        spec.legend = Prop::Null;
        let mut chart = ChartNode::with_mark(MarkType::Line)
            .with_channel(channel::COLOR, spec)
            .with_data(table(&["a", "b"]));
        with_leaves(&mut chart, |leaves| {
            remove_legend_suppression(leaves).unwrap();
        });
        let color = chart.encoding.value().unwrap().single(channel::COLOR).unwrap();
        assert!(color.legend.is_null());
    }

    #[test]
    fn test_single_category_color_removed() {
        let mut chart = ChartNode::with_mark(MarkType::Line)
            .with_channel(
                channel::COLOR,
                EncodingSpec::for_field("series", FieldType::Nominal),
            )
            .with_data(table(&["only", "only", "only"]));
        with_leaves(&mut chart, |leaves| {
            remove_single_category_legends(leaves).unwrap();
        });
        assert!(chart.encoding.value().unwrap().single(channel::COLOR).is_none());
    }

    #[test]
    fn test_two_categories_keep_color() {
        let mut chart = ChartNode::with_mark(MarkType::Line)
            .with_channel(
                channel::COLOR,
                EncodingSpec::for_field("series", FieldType::Nominal),
            )
            .with_data(table(&["a", "b"]));
        with_leaves(&mut chart, |leaves| {
            remove_single_category_legends(leaves).unwrap();
        });
        assert!(chart.encoding.value().unwrap().single(channel::COLOR).is_some());
    }

    #[test]
    fn test_pie_groups_keep_single_category_color() {
        let mut chart = ChartNode::with_mark(MarkType::Arc)
            .with_channel(
                channel::COLOR,
                EncodingSpec::for_field("series", FieldType::Nominal),
            )
            .with_data(table(&["only", "only"]));
        with_leaves(&mut chart, |leaves| {
            remove_single_category_legends(leaves).unwrap();
        });
        assert!(chart.encoding.value().unwrap().single(channel::COLOR).is_some());
    }
}
