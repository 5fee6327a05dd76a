//! Mark definitions.

use serde::{Deserialize, Serialize};

use crate::spec::Prop;

/// The Vega-Lite mark vocabulary.
///
/// `Rect` is the heat-map cell mark and `Arc` the pie mark; several
/// heuristics key off those two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkType {
    Arc,
    Area,
    Bar,
    Boxplot,
    Circle,
    Errorband,
    Errorbar,
    Geoshape,
    Image,
    Line,
    Point,
    Rect,
    Rule,
    Square,
    Text,
    Tick,
    Trail,
}

/// A mark plus optional style attributes.
///
/// Generators emit either a bare mark string (`"mark": "arc"`) or an object
/// (`"mark": {"type": "arc", "outerRadius": 100}`); both deserialize into
/// this struct.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkDef {
    #[serde(rename = "type")]
    pub mark_type: MarkType,
    #[serde(rename = "outerRadius", skip_serializing_if = "Prop::is_unset")]
    pub outer_radius: Prop<f64>,
    #[serde(rename = "innerRadius", skip_serializing_if = "Prop::is_unset")]
    pub inner_radius: Prop<f64>,
    #[serde(skip_serializing_if = "Prop::is_unset")]
    pub radius: Prop<f64>,
    #[serde(skip_serializing_if = "Prop::is_unset")]
    pub tooltip: Prop<bool>,
    #[serde(skip_serializing_if = "Prop::is_unset")]
    pub point: Prop<bool>,
}

impl MarkDef {
    /// A mark with no style attributes set.
    pub fn new(mark_type: MarkType) -> Self {
        Self {
            mark_type,
            outer_radius: Prop::Unset,
            inner_radius: Prop::Unset,
            radius: Prop::Unset,
            tooltip: Prop::Unset,
            point: Prop::Unset,
        }
    }
}

impl From<MarkType> for MarkDef {
    fn from(mark_type: MarkType) -> Self {
        MarkDef::new(mark_type)
    }
}

impl<'de> Deserialize<'de> for MarkDef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Fields {
            #[serde(rename = "type")]
            mark_type: MarkType,
            #[serde(rename = "outerRadius", default)]
            outer_radius: Prop<f64>,
            #[serde(rename = "innerRadius", default)]
            inner_radius: Prop<f64>,
            #[serde(default)]
            radius: Prop<f64>,
            #[serde(default)]
            tooltip: Prop<bool>,
            #[serde(default)]
            point: Prop<bool>,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Shorthand(MarkType),
            Full(Fields),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Shorthand(mark_type) => MarkDef::new(mark_type),
            Repr::Full(fields) => MarkDef {
                mark_type: fields.mark_type,
                outer_radius: fields.outer_radius,
                inner_radius: fields.inner_radius,
                radius: fields.radius,
                tooltip: fields.tooltip,
                point: fields.point,
            },
        })
    }
}
