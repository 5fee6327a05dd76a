//! Tree flattening and table copying.
//!
//! The tree is decomposed in two passes: first over `hconcat`/`vconcat`
//! nesting into [`Panel`]s, then within each panel over `layer` nesting into
//! [`Leaf`] charts. Every table encountered on a visited node is replaced by
//! a deep copy and the copy propagated to its descendants, so in-place edits
//! made by later stages never touch caller-owned frames or sibling subtrees
//! that happened to share the source object.

use crate::spec::ChartNode;
use crate::table::TableRef;
use crate::{Result, TidyError};

/// A concatenation panel: a subtree with no further hconcat/vconcat nesting,
/// paired with the table in scope for it.
pub struct Panel<'a> {
    pub node: &'a mut ChartNode,
    pub table: Option<TableRef>,
}

/// A leaf chart paired with the table in scope for it.
pub struct Leaf<'a> {
    pub node: &'a mut ChartNode,
    pub table: Option<TableRef>,
    /// Indices through `layer` lists from the panel node down to this leaf.
    pub path: Vec<usize>,
}

impl Leaf<'_> {
    /// The table backing this leaf. Leaves without one make most heuristics
    /// meaningless, so this is an error the stage guard can report.
    pub fn table(&self) -> Result<&TableRef> {
        self.table
            .as_ref()
            .ok_or_else(|| TidyError::MalformedNode("leaf chart has no backing table".to_string()))
    }
}

/// Flatten hconcat/vconcat nesting into panels, copying every table reached.
pub fn flatten_concats(root: &mut ChartNode) -> Vec<Panel<'_>> {
    let mut panels = Vec::new();
    walk_concats(root, None, &mut panels);
    panels
}

fn walk_concats<'a>(
    node: &'a mut ChartNode,
    inherited: Option<TableRef>,
    out: &mut Vec<Panel<'a>>,
) {
    let table = scoped_table(node, inherited);
    if node.hconcat.is_some() || node.vconcat.is_some() {
        let lists = [node.hconcat.as_mut(), node.vconcat.as_mut()];
        for list in lists.into_iter().flatten() {
            for child in list.iter_mut() {
                walk_concats(child, table.clone(), out);
            }
        }
    } else {
        out.push(Panel { node, table });
    }
}

/// Flatten a panel's layer nesting into leaf charts. The panel's own table
/// was already copied by the concat pass; tables on nested layers are copied
/// here.
pub fn flatten_layers(panel: &mut ChartNode, table: Option<TableRef>) -> Vec<Leaf<'_>> {
    let mut leaves = Vec::new();
    let mut path = Vec::new();
    walk_layers(panel, table, true, &mut path, &mut leaves);
    leaves
}

fn walk_layers<'a>(
    node: &'a mut ChartNode,
    inherited: Option<TableRef>,
    is_panel_root: bool,
    path: &mut Vec<usize>,
    out: &mut Vec<Leaf<'a>>,
) {
    let table = if is_panel_root {
        inherited
    } else {
        scoped_table(node, inherited)
    };
    if node.layer.is_some() {
        if let Some(children) = node.layer.as_mut() {
            for (idx, child) in children.iter_mut().enumerate() {
                path.push(idx);
                walk_layers(child, table.clone(), false, path, out);
                path.pop();
            }
        }
    } else {
        out.push(Leaf {
            node,
            table,
            path: path.clone(),
        });
    }
}

/// The table in scope for `node`: its own table — replaced in place by a
/// deep copy on this first encounter — or the one inherited from above.
fn scoped_table(node: &mut ChartNode, inherited: Option<TableRef>) -> Option<TableRef> {
    match node.data.take() {
        Some(own) => {
            let copy = own.deep_copy();
            node.data = Some(copy.clone());
            Some(copy)
        }
        None => inherited,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::MarkType;
    use polars::prelude::*;

    fn table() -> TableRef {
        TableRef::new(
            DataFrame::new(vec![
                Series::new("x".into(), &[1.0f64, 2.0, 3.0]).into_column(),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_single_leaf_is_one_panel_one_leaf() {
        let mut chart = ChartNode::with_mark(MarkType::Bar).with_data(table());
        let mut panels = flatten_concats(&mut chart);
        assert_eq!(panels.len(), 1);
        let panel = panels.pop().unwrap();
        let leaves = flatten_layers(panel.node, panel.table);
        assert_eq!(leaves.len(), 1);
        assert!(leaves[0].path.is_empty());
        assert!(leaves[0].table.is_some());
    }

    #[test]
    fn test_concat_panels_inherit_root_table() {
        let mut chart = ChartNode::new()
            .with_hconcat(vec![
                ChartNode::with_mark(MarkType::Bar),
                ChartNode::with_mark(MarkType::Line),
            ])
            .with_data(table());
        let panels = flatten_concats(&mut chart);
        assert_eq!(panels.len(), 2);
        let tables: Vec<&TableRef> = panels.iter().map(|p| p.table.as_ref().unwrap()).collect();
        // Both panels see the same copied table.
        assert!(tables[0].same_table(tables[1]));
    }

    #[test]
    fn test_root_table_is_copied_not_aliased() {
        let caller = table();
        let mut chart = ChartNode::with_mark(MarkType::Bar).with_data(caller.clone());
        let panels = flatten_concats(&mut chart);
        let panel_table = panels[0].table.as_ref().unwrap();
        assert!(!panel_table.same_table(&caller));
        // The node's reference was replaced with the copy.
        drop(panels);
        assert!(!chart.data.as_ref().unwrap().same_table(&caller));
    }

    #[test]
    fn test_layer_flatten_records_paths_and_copies_nested_tables() {
        let own = table();
        let mut panel_node = ChartNode::new()
            .with_layers(vec![
                ChartNode::with_mark(MarkType::Rect),
                ChartNode::with_mark(MarkType::Text).with_data(own.clone()),
            ])
            .with_data(table());

        let mut panels = flatten_concats(&mut panel_node);
        let panel = panels.pop().unwrap();
        let leaves = flatten_layers(panel.node, panel.table);
        assert_eq!(leaves.len(), 2);
        assert_eq!(leaves[0].path, vec![0]);
        assert_eq!(leaves[1].path, vec![1]);
        // The text leaf's own table was copied; the rect leaf inherited the
        // panel table. Neither aliases the caller's handle.
        assert!(!leaves[1].table.as_ref().unwrap().same_table(&own));
        assert!(!leaves[0]
            .table
            .as_ref()
            .unwrap()
            .same_table(leaves[1].table.as_ref().unwrap()));
    }

    #[test]
    fn test_nested_layer_paths() {
        let mut panel_node = ChartNode::new()
            .with_layers(vec![
                ChartNode::with_mark(MarkType::Line),
                ChartNode::new().with_layers(vec![ChartNode::with_mark(MarkType::Point)]),
            ])
            .with_data(table());
        let mut panels = flatten_concats(&mut panel_node);
        let panel = panels.pop().unwrap();
        let leaves = flatten_layers(panel.node, panel.table);
        assert_eq!(leaves.len(), 2);
        assert_eq!(leaves[1].path, vec![1, 0]);
    }

    #[test]
    fn test_leaf_without_table_errors_on_access() {
        let mut chart = ChartNode::with_mark(MarkType::Bar);
        let mut panels = flatten_concats(&mut chart);
        let panel = panels.pop().unwrap();
        let leaves = flatten_layers(panel.node, panel.table);
        assert!(leaves[0].table().is_err());
    }
}
