//! Bar and box-plot orientation fixes.

use crate::options::PipelineOptions;
use crate::pipeline::Leaf;
use crate::spec::{channel, ChartNode, MarkType};
use crate::table::distinct_count;
use crate::{Result, TidyError};

/// Rotate crowded vertical bar/box charts horizontal.
///
/// A leaf is a rotation candidate when its mark is bar or boxplot, both x
/// and y are encoded, x is discrete, and x has more distinct categories than
/// both the crowding threshold and the y channel. If any leaf qualifies,
/// every leaf in the group rotates — layers likely share axes.
pub fn rotate_crowded_bars(leaves: &mut [Leaf<'_>], options: &PipelineOptions) -> Result<()> {
    let mut rotate = false;
    for leaf in leaves.iter() {
        if should_rotate(leaf, options)? {
            rotate = true;
            break;
        }
    }
    if rotate {
        for leaf in leaves.iter_mut() {
            rotate_leaf(leaf.node);
        }
    }
    Ok(())
}

fn should_rotate(leaf: &Leaf<'_>, options: &PipelineOptions) -> Result<bool> {
    if !matches!(
        leaf.node.mark_type(),
        Some(MarkType::Bar | MarkType::Boxplot)
    ) {
        return Ok(false);
    }
    let Some(encoding) = leaf.node.encoding.value() else {
        return Ok(false);
    };
    let (Some(x), Some(y)) = (encoding.single(channel::X), encoding.single(channel::Y)) else {
        return Ok(false);
    };
    // Only a discrete x axis gets crowded enough to rotate.
    if x.is_continuous() {
        return Ok(false);
    }

    let x_field = x
        .field()
        .ok_or_else(|| TidyError::MalformedNode("x channel has no field".to_string()))?;
    let frame = leaf.table()?.borrow();
    let x_categories = distinct_count(&frame, x_field)?;
    // A discrete y competes for the category axis; rotating would just move
    // the crowding if y has more categories.
    let y_categories = if !y.is_continuous() {
        let y_field = y
            .field()
            .ok_or_else(|| TidyError::MalformedNode("y channel has no field".to_string()))?;
        distinct_count(&frame, y_field)?
    } else {
        0
    };

    Ok(x_categories > options.max_vertical_bars && x_categories > y_categories)
}

fn rotate_leaf(node: &mut ChartNode) {
    let Some(encoding) = node.encoding.value_mut() else {
        return;
    };
    let x = encoding.remove(channel::X);
    let y = encoding.remove(channel::Y);
    if let Some(value) = y {
        encoding.insert_value(channel::X, value);
    }
    if let Some(value) = x {
        encoding.insert_value(channel::Y, value);
    }

    // A label angle tuned for one orientation looks wrong after the swap.
    for channel_name in [channel::X, channel::Y] {
        let Some(spec) = encoding.single_mut(channel_name) else {
            continue;
        };
        let mut clear_axis = false;
        if let Some(axis) = spec.axis.value_mut() {
            if !axis.label_angle.is_unset() {
                axis.label_angle.unset();
                clear_axis = axis.is_empty();
            }
        }
        if clear_axis {
            spec.axis.unset();
        }
    }
}

/// Keep grouping facets aligned with bar orientation: a horizontal bar chart
/// grouped by `column` regroups by `row`, with header orientations that
/// pointed "bottom" remapped to "left".
pub fn match_grouping_orientation(leaves: &mut [Leaf<'_>]) -> Result<()> {
    for leaf in leaves.iter_mut() {
        if !matches!(
            leaf.node.mark_type(),
            Some(MarkType::Bar | MarkType::Boxplot)
        ) {
            continue;
        }
        let Some(encoding) = leaf.node.encoding.value_mut() else {
            continue;
        };
        let has_row = encoding.contains(channel::ROW);
        let has_column = encoding.contains(channel::COLUMN);
        // Only charts with exactly one grouping dimension are considered.
        if has_row == has_column {
            continue;
        }
        let (Some(x), Some(y)) = (encoding.single(channel::X), encoding.single(channel::Y))
        else {
            continue;
        };
        // With two discrete axes the bars render as squares; orientation
        // doesn't apply.
        if !x.is_continuous() && !y.is_continuous() {
            continue;
        }
        let horizontal = x.is_continuous() && !y.is_continuous();
        if !(horizontal && has_column) {
            continue;
        }

        let Some(mut grouping) = encoding.remove(channel::COLUMN) else {
            continue;
        };
        for spec in grouping.iter_mut() {
            if let Some(header) = spec.header.value_mut() {
                for orient in [&mut header.title_orient, &mut header.label_orient] {
                    if orient.value().is_some_and(|v| v == "bottom") {
                        *orient = crate::spec::Prop::Value("left".to_string());
                    }
                }
            }
        }
        encoding.insert_value(channel::ROW, grouping);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{flatten_concats, flatten_layers};
    use crate::spec::{AxisSpec, EncodingSpec, FieldType, HeaderSpec, Prop};
    use crate::table::TableRef;
    use polars::prelude::*;

    fn category_table(x_count: usize, y_count: usize) -> TableRef {
        // Rows pair category i with group i % y_count, covering all
        // categories of both columns.
        let xs: Vec<String> = (0..x_count).map(|i| format!("x{i}")).collect();
        let ys: Vec<String> = (0..x_count).map(|i| format!("y{}", i % y_count.max(1))).collect();
        TableRef::new(
            DataFrame::new(vec![
                Series::new("cat".into(), xs).into_column(),
                Series::new("grp".into(), ys).into_column(),
                Series::new("value".into(), (0..x_count as i64).collect::<Vec<_>>()).into_column(),
            ])
            .unwrap(),
        )
    }

    fn bar_chart(x_count: usize) -> ChartNode {
        ChartNode::with_mark(MarkType::Bar)
            .with_channel(channel::X, EncodingSpec::for_field("cat", FieldType::Nominal))
            .with_channel(
                channel::Y,
                EncodingSpec::for_field("value", FieldType::Quantitative),
            )
            .with_data(category_table(x_count, 1))
    }

    fn with_leaves<F: FnOnce(&mut [Leaf<'_>])>(chart: &mut ChartNode, f: F) {
        let mut panels = flatten_concats(chart);
        let panel = panels.pop().unwrap();
        let mut leaves = flatten_layers(panel.node, panel.table);
        f(&mut leaves);
    }

    fn x_field(chart: &ChartNode) -> String {
        chart
            .encoding
            .value()
            .unwrap()
            .single(channel::X)
            .unwrap()
            .field()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_crowded_bars_rotate() {
        let mut chart = bar_chart(26);
        with_leaves(&mut chart, |leaves| {
            rotate_crowded_bars(leaves, &PipelineOptions::default()).unwrap();
        });
        // 26 categories > 25: x and y swapped.
        assert_eq!(x_field(&chart), "value");
    }

    #[test]
    fn test_twenty_five_categories_do_not_rotate() {
        let mut chart = bar_chart(25);
        with_leaves(&mut chart, |leaves| {
            rotate_crowded_bars(leaves, &PipelineOptions::default()).unwrap();
        });
        assert_eq!(x_field(&chart), "cat");
    }

    #[test]
    fn test_crowded_x_with_fewer_y_categories_rotates() {
        // 26 discrete x categories against 5 discrete y categories: rotate.
        let mut chart = ChartNode::with_mark(MarkType::Bar)
            .with_channel(channel::X, EncodingSpec::for_field("cat", FieldType::Nominal))
            .with_channel(channel::Y, EncodingSpec::for_field("grp", FieldType::Nominal))
            .with_data(category_table(26, 5));
        with_leaves(&mut chart, |leaves| {
            rotate_crowded_bars(leaves, &PipelineOptions::default()).unwrap();
        });
        assert_eq!(x_field(&chart), "grp");
    }

    #[test]
    fn test_discrete_y_with_more_categories_blocks_rotation() {
        // 26 x categories but 30 y categories: rotating would only move the
        // crowding to the other axis.
        let mut chart = ChartNode::with_mark(MarkType::Bar)
            .with_channel(channel::X, EncodingSpec::for_field("cat", FieldType::Nominal))
            .with_channel(channel::Y, EncodingSpec::for_field("grp", FieldType::Nominal))
            .with_data(category_table(26, 30));
        // Make grp genuinely carry 30 distinct values.
        {
            let table = chart.data.as_ref().unwrap();
            let ys: Vec<String> = (0..30).map(|i| format!("y{i}")).collect();
            let mut extended: Vec<String> = (0..26).map(|i| format!("x{}", i % 26)).collect();
            extended.extend((26..30).map(|i| format!("x{}", i % 26)));
            let frame = DataFrame::new(vec![
                Series::new("cat".into(), extended).into_column(),
                Series::new("grp".into(), ys).into_column(),
                Series::new("value".into(), (0..30i64).collect::<Vec<_>>()).into_column(),
            ])
            .unwrap();
            *table.borrow_mut() = frame;
        }
        with_leaves(&mut chart, |leaves| {
            rotate_crowded_bars(leaves, &PipelineOptions::default()).unwrap();
        });
        assert_eq!(x_field(&chart), "cat");
    }

    #[test]
    fn test_rotation_drops_label_angle_and_empty_axis() {
        let mut chart = bar_chart(26);
        {
            let spec = chart
                .encoding
                .value_mut()
                .unwrap()
                .single_mut(channel::X)
                .unwrap();
            spec.axis = Prop::Value(AxisSpec {
                label_angle: Prop::Value(45.0),
                ..AxisSpec::default()
            });
        }
        with_leaves(&mut chart, |leaves| {
            rotate_crowded_bars(leaves, &PipelineOptions::default()).unwrap();
        });
        // The rotated channel's axis held only a labelAngle, so it clears.
        let y = chart.encoding.value().unwrap().single(channel::Y).unwrap();
        assert_eq!(y.field(), Some("cat"));
        assert!(y.axis.is_unset());
    }

    #[test]
    fn test_rotation_applies_to_all_layers() {
        let crowded = bar_chart(26);
        let quiet = ChartNode::with_mark(MarkType::Bar)
            .with_channel(channel::X, EncodingSpec::for_field("cat", FieldType::Nominal))
            .with_channel(
                channel::Y,
                EncodingSpec::for_field("value", FieldType::Quantitative),
            );
        let mut chart = ChartNode::new()
            .with_layers(vec![crowded, quiet])
            .with_data(category_table(26, 1));
        with_leaves(&mut chart, |leaves| {
            rotate_crowded_bars(leaves, &PipelineOptions::default()).unwrap();
        });
        for layer in chart.layer.as_ref().unwrap() {
            let x = layer.encoding.value().unwrap().single(channel::X).unwrap();
            assert_eq!(x.field(), Some("value"));
        }
    }

    #[test]
    fn test_horizontal_bars_regroup_column_as_row() {
        let mut grouping = EncodingSpec::for_field("grp", FieldType::Nominal);
        grouping.header = Prop::Value(HeaderSpec {
            title_orient: Prop::Value("bottom".to_string()),
            label_orient: Prop::Value("top".to_string()),
            ..HeaderSpec::default()
        });
        // Horizontal: x continuous, y discrete.
        let mut chart = ChartNode::with_mark(MarkType::Bar)
            .with_channel(
                channel::X,
                EncodingSpec::for_field("value", FieldType::Quantitative),
            )
            .with_channel(channel::Y, EncodingSpec::for_field("cat", FieldType::Nominal))
            .with_channel(channel::COLUMN, grouping)
            .with_data(category_table(3, 2));
        with_leaves(&mut chart, |leaves| {
            match_grouping_orientation(leaves).unwrap();
        });
        let encoding = chart.encoding.value().unwrap();
        assert!(!encoding.contains(channel::COLUMN));
        let row = encoding.single(channel::ROW).unwrap();
        assert_eq!(row.field(), Some("grp"));
        let header = row.header.value().unwrap();
        assert_eq!(header.title_orient.value().map(String::as_str), Some("left"));
        // Only "bottom" orientations are remapped.
        assert_eq!(header.label_orient.value().map(String::as_str), Some("top"));
    }

    #[test]
    fn test_vertical_bars_keep_column_grouping() {
        let mut chart = ChartNode::with_mark(MarkType::Bar)
            .with_channel(channel::X, EncodingSpec::for_field("cat", FieldType::Nominal))
            .with_channel(
                channel::Y,
                EncodingSpec::for_field("value", FieldType::Quantitative),
            )
            .with_channel(
                channel::COLUMN,
                EncodingSpec::for_field("grp", FieldType::Nominal),
            )
            .with_data(category_table(3, 2));
        with_leaves(&mut chart, |leaves| {
            match_grouping_orientation(leaves).unwrap();
        });
        assert!(chart.encoding.value().unwrap().contains(channel::COLUMN));
    }

    #[test]
    fn test_both_groupings_present_is_left_alone() {
        let mut chart = ChartNode::with_mark(MarkType::Bar)
            .with_channel(
                channel::X,
                EncodingSpec::for_field("value", FieldType::Quantitative),
            )
            .with_channel(channel::Y, EncodingSpec::for_field("cat", FieldType::Nominal))
            .with_channel(
                channel::COLUMN,
                EncodingSpec::for_field("grp", FieldType::Nominal),
            )
            .with_channel(
                channel::ROW,
                EncodingSpec::for_field("grp", FieldType::Nominal),
            )
            .with_data(category_table(3, 2));
        with_leaves(&mut chart, |leaves| {
            match_grouping_orientation(leaves).unwrap();
        });
        assert!(chart.encoding.value().unwrap().contains(channel::COLUMN));
    }
}
