//! Heat-map label decluttering.
//!
//! Heat-maps get a text layer stamped on every cell; past a certain number
//! of x categories the labels overlap into noise, so the text layer is
//! removed from the tree entirely.

use crate::options::PipelineOptions;
use crate::pipeline::Leaf;
use crate::spec::{channel, ChartNode, MarkType};
use crate::table::distinct_count;
use crate::Result;

/// Decide whether a labeled heat-map should lose its text layer.
///
/// Requires exactly one heat-map leaf and one text leaf reading from the
/// same table, with matching, defined x and y fields. Returns the layer path
/// of the text leaf when its labels should go.
pub fn plan_declutter(
    leaves: &[Leaf<'_>],
    options: &PipelineOptions,
) -> Result<Option<Vec<usize>>> {
    let heatmaps: Vec<&Leaf<'_>> = leaves
        .iter()
        .filter(|leaf| leaf.node.mark_type() == Some(MarkType::Rect))
        .collect();
    let texts: Vec<&Leaf<'_>> = leaves
        .iter()
        .filter(|leaf| leaf.node.mark_type() == Some(MarkType::Text))
        .collect();
    let (&[heatmap], &[text]) = (heatmaps.as_slice(), texts.as_slice()) else {
        return Ok(None);
    };

    let (Some(heatmap_table), Some(text_table)) = (&heatmap.table, &text.table) else {
        return Ok(None);
    };
    if !heatmap_table.same_table(text_table) {
        return Ok(None);
    }

    let Some((heatmap_x, heatmap_y)) = xy_fields(heatmap.node) else {
        return Ok(None);
    };
    let Some((text_x, text_y)) = xy_fields(text.node) else {
        return Ok(None);
    };
    if heatmap_x != text_x || heatmap_y != text_y {
        return Ok(None);
    }

    if distinct_count(&heatmap_table.borrow(), heatmap_x)? > options.max_heatmap_labeled_x {
        return Ok(Some(text.path.clone()));
    }
    Ok(None)
}

fn xy_fields(node: &ChartNode) -> Option<(&str, &str)> {
    let encoding = node.encoding.value()?;
    let x = encoding.single(channel::X)?.field()?;
    let y = encoding.single(channel::Y)?.field()?;
    Some((x, y))
}

/// Remove the leaf at `path` from its owning layer list in the panel
/// subtree.
pub fn remove_text_leaf(panel: &mut ChartNode, path: &[usize]) {
    let Some((&last, parents)) = path.split_last() else {
        return;
    };
    let mut node = panel;
    for &idx in parents {
        match node.layer.as_mut().and_then(|children| children.get_mut(idx)) {
            Some(child) => node = child,
            None => return,
        }
    }
    if let Some(children) = node.layer.as_mut() {
        if last < children.len() {
            children.remove(last);
        }
    }
}
