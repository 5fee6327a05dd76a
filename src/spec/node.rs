//! Chart specification tree nodes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::spec::{Encoding, EncodingSpec, MarkDef, MarkType, Prop};
use crate::table::TableRef;

/// A named interaction selector attached to a leaf chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SelectionDef {
    #[serde(rename = "type", default, skip_serializing_if = "Prop::is_unset")]
    pub kind: Prop<String>,
    #[serde(default, skip_serializing_if = "Prop::is_unset")]
    pub fields: Prop<Vec<String>>,
    #[serde(default, skip_serializing_if = "Prop::is_unset")]
    pub encodings: Prop<Vec<String>>,
    #[serde(default, skip_serializing_if = "Prop::is_unset")]
    pub bind: Prop<serde_json::Value>,
}

impl SelectionDef {
    pub fn interval() -> Self {
        Self {
            kind: Prop::Value("interval".to_string()),
            ..Self::default()
        }
    }
}

/// A node in the chart specification tree.
///
/// A node either nests further charts (through exactly one of `layer`,
/// `hconcat`, or `vconcat`) or is a leaf bound to a mark, encodings, and a
/// table. Tables are attached in memory by the caller and are not part of
/// the JSON form.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChartNode {
    #[serde(default, skip_serializing_if = "Prop::is_unset")]
    pub mark: Prop<MarkDef>,
    #[serde(default, skip_serializing_if = "Prop::is_unset")]
    pub encoding: Prop<Encoding>,
    #[serde(default, skip_serializing_if = "Prop::is_unset")]
    pub selection: Prop<IndexMap<String, SelectionDef>>,
    #[serde(skip)]
    pub data: Option<TableRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<Vec<ChartNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hconcat: Option<Vec<ChartNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vconcat: Option<Vec<ChartNode>>,
}

impl ChartNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// A leaf node with the given mark.
    pub fn with_mark(mark: impl Into<MarkDef>) -> Self {
        Self {
            mark: Prop::Value(mark.into()),
            ..Self::default()
        }
    }

    pub fn with_data(mut self, table: TableRef) -> Self {
        self.data = Some(table);
        self
    }

    pub fn with_channel(mut self, channel: impl Into<String>, spec: EncodingSpec) -> Self {
        self.encoding.get_or_insert_with(Encoding::new).insert(channel, spec);
        self
    }

    pub fn with_selection(mut self, name: impl Into<String>, selector: SelectionDef) -> Self {
        self.selection
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), selector);
        self
    }

    pub fn with_layers(mut self, children: Vec<ChartNode>) -> Self {
        self.layer = Some(children);
        self
    }

    pub fn with_hconcat(mut self, children: Vec<ChartNode>) -> Self {
        self.hconcat = Some(children);
        self
    }

    pub fn with_vconcat(mut self, children: Vec<ChartNode>) -> Self {
        self.vconcat = Some(children);
        self
    }

    /// The node's mark type, when a mark is defined.
    pub fn mark_type(&self) -> Option<MarkType> {
        self.mark.value().map(|mark| mark.mark_type)
    }

    /// True when no nesting list is present.
    pub fn is_leaf(&self) -> bool {
        self.layer.is_none() && self.hconcat.is_none() && self.vconcat.is_none()
    }
}
