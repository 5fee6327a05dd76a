//! Encoding channels and their specification types.
//!
//! An encoding maps a visual channel (x, y, theta, color, ...) to a data
//! field plus typing and formatting metadata. Channels live in an
//! insertion-ordered map; most carry a single [`EncodingSpec`], while tooltip
//! may carry a list.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::spec::Prop;

/// Channel name constants.
pub mod channel {
    pub const X: &str = "x";
    pub const Y: &str = "y";
    pub const THETA: &str = "theta";
    pub const COLOR: &str = "color";
    pub const SHAPE: &str = "shape";
    pub const ORDER: &str = "order";
    pub const TOOLTIP: &str = "tooltip";
    pub const ROW: &str = "row";
    pub const COLUMN: &str = "column";
    pub const TEXT: &str = "text";
}

/// Declared field type of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Nominal,
    Ordinal,
    Quantitative,
    Temporal,
}

impl FieldType {
    /// Quantitative and temporal fields are continuous; nominal and ordinal
    /// are discrete.
    pub fn is_continuous(self) -> bool {
        matches!(self, FieldType::Quantitative | FieldType::Temporal)
    }
}

/// Sort direction for an encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Stack offset keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackOffset {
    Zero,
    Normalize,
    Center,
}

/// Stack configuration: a boolean or an offset keyword.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Stack {
    Enabled(bool),
    Offset(StackOffset),
}

impl Stack {
    pub fn is_normalize(self) -> bool {
        matches!(self, Stack::Offset(StackOffset::Normalize))
    }
}

/// Bin configuration: a boolean flag or a parameter object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BinSpec {
    Enabled(bool),
    Params(BinParams),
}

impl BinSpec {
    /// True when binning is actually on (either `true` or a config object).
    pub fn is_active(&self) -> bool {
        !matches!(self, BinSpec::Enabled(false))
    }
}

/// Bin parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BinParams {
    #[serde(default, skip_serializing_if = "Prop::is_unset")]
    pub maxbins: Prop<u32>,
    #[serde(default, skip_serializing_if = "Prop::is_unset")]
    pub step: Prop<f64>,
}

impl BinParams {
    pub fn with_maxbins(maxbins: u32) -> Self {
        Self {
            maxbins: Prop::Value(maxbins),
            step: Prop::Unset,
        }
    }
}

/// A scale domain/range entry: numbers for continuous domains, strings for
/// categorical domains and color ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScaleValue {
    Number(f64),
    String(String),
}

/// Scale configuration on a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ScaleSpec {
    #[serde(default, skip_serializing_if = "Prop::is_unset")]
    pub domain: Prop<Vec<ScaleValue>>,
    #[serde(default, skip_serializing_if = "Prop::is_unset")]
    pub range: Prop<Vec<ScaleValue>>,
    #[serde(rename = "type", default, skip_serializing_if = "Prop::is_unset")]
    pub scale_type: Prop<String>,
    #[serde(default, skip_serializing_if = "Prop::is_unset")]
    pub zero: Prop<bool>,
}

impl ScaleSpec {
    /// A scale carrying only a numeric `[lower, upper]` domain.
    pub fn with_domain(lower: f64, upper: f64) -> Self {
        Self {
            domain: Prop::Value(vec![ScaleValue::Number(lower), ScaleValue::Number(upper)]),
            ..Self::default()
        }
    }
}

/// Axis configuration on a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AxisSpec {
    #[serde(default, skip_serializing_if = "Prop::is_unset")]
    pub format: Prop<String>,
    #[serde(rename = "labelAngle", default, skip_serializing_if = "Prop::is_unset")]
    pub label_angle: Prop<f64>,
    #[serde(default, skip_serializing_if = "Prop::is_unset")]
    pub title: Prop<String>,
}

impl AxisSpec {
    /// True when every attribute is unset (an axis object carrying nothing).
    pub fn is_empty(&self) -> bool {
        self.format.is_unset() && self.label_angle.is_unset() && self.title.is_unset()
    }
}

/// Legend configuration on a channel. The legend's tri-state (unset vs
/// explicitly null vs configured) matters more than its contents here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LegendSpec {
    #[serde(default, skip_serializing_if = "Prop::is_unset")]
    pub title: Prop<String>,
    #[serde(default, skip_serializing_if = "Prop::is_unset")]
    pub orient: Prop<String>,
}

/// Facet header configuration on a row/column channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HeaderSpec {
    #[serde(rename = "titleOrient", default, skip_serializing_if = "Prop::is_unset")]
    pub title_orient: Prop<String>,
    #[serde(rename = "labelOrient", default, skip_serializing_if = "Prop::is_unset")]
    pub label_orient: Prop<String>,
    #[serde(default, skip_serializing_if = "Prop::is_unset")]
    pub title: Prop<String>,
}

/// A single channel binding: a data field plus typing/formatting metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EncodingSpec {
    #[serde(default, skip_serializing_if = "Prop::is_unset")]
    pub field: Prop<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Prop::is_unset")]
    pub field_type: Prop<FieldType>,
    #[serde(default, skip_serializing_if = "Prop::is_unset")]
    pub aggregate: Prop<String>,
    #[serde(default, skip_serializing_if = "Prop::is_unset")]
    pub bin: Prop<BinSpec>,
    #[serde(default, skip_serializing_if = "Prop::is_unset")]
    pub scale: Prop<ScaleSpec>,
    #[serde(default, skip_serializing_if = "Prop::is_unset")]
    pub axis: Prop<AxisSpec>,
    #[serde(default, skip_serializing_if = "Prop::is_unset")]
    pub format: Prop<String>,
    #[serde(default, skip_serializing_if = "Prop::is_unset")]
    pub stack: Prop<Stack>,
    #[serde(default, skip_serializing_if = "Prop::is_unset")]
    pub sort: Prop<SortOrder>,
    #[serde(default, skip_serializing_if = "Prop::is_unset")]
    pub legend: Prop<LegendSpec>,
    #[serde(default, skip_serializing_if = "Prop::is_unset")]
    pub header: Prop<HeaderSpec>,
    #[serde(default, skip_serializing_if = "Prop::is_unset")]
    pub value: Prop<serde_json::Value>,
}

impl EncodingSpec {
    /// A channel bound to `field` with a declared type.
    pub fn for_field(field: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            field: Prop::Value(field.into()),
            field_type: Prop::Value(field_type),
            ..Self::default()
        }
    }

    /// The bound field name, if defined.
    pub fn field(&self) -> Option<&str> {
        self.field.value().map(String::as_str)
    }

    /// Continuity of the declared type. An undeclared type counts as
    /// discrete, matching how the heuristics treat it.
    pub fn is_continuous(&self) -> bool {
        self.field_type.value().is_some_and(|t| t.is_continuous())
    }
}

/// A channel's value: a single spec, or a list of specs (tooltips).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelValue {
    One(EncodingSpec),
    Many(Vec<EncodingSpec>),
}

impl ChannelValue {
    pub fn as_single(&self) -> Option<&EncodingSpec> {
        match self {
            ChannelValue::One(spec) => Some(spec),
            ChannelValue::Many(_) => None,
        }
    }

    pub fn as_single_mut(&mut self) -> Option<&mut EncodingSpec> {
        match self {
            ChannelValue::One(spec) => Some(spec),
            ChannelValue::Many(_) => None,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EncodingSpec> {
        match self {
            ChannelValue::One(spec) => std::slice::from_ref(spec).iter(),
            ChannelValue::Many(specs) => specs.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, EncodingSpec> {
        match self {
            ChannelValue::One(spec) => std::slice::from_mut(spec).iter_mut(),
            ChannelValue::Many(specs) => specs.iter_mut(),
        }
    }
}

impl From<EncodingSpec> for ChannelValue {
    fn from(spec: EncodingSpec) -> Self {
        ChannelValue::One(spec)
    }
}

/// The channel map of a leaf chart, in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Encoding {
    channels: IndexMap<String, ChannelValue>,
}

impl Encoding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, channel: &str) -> Option<&ChannelValue> {
        self.channels.get(channel)
    }

    pub fn get_mut(&mut self, channel: &str) -> Option<&mut ChannelValue> {
        self.channels.get_mut(channel)
    }

    /// The channel's spec when it carries exactly one.
    pub fn single(&self, channel: &str) -> Option<&EncodingSpec> {
        self.channels.get(channel).and_then(ChannelValue::as_single)
    }

    pub fn single_mut(&mut self, channel: &str) -> Option<&mut EncodingSpec> {
        self.channels
            .get_mut(channel)
            .and_then(ChannelValue::as_single_mut)
    }

    pub fn insert(&mut self, channel: impl Into<String>, spec: EncodingSpec) {
        self.channels.insert(channel.into(), ChannelValue::One(spec));
    }

    pub fn insert_value(&mut self, channel: impl Into<String>, value: ChannelValue) {
        self.channels.insert(channel.into(), value);
    }

    /// Remove a channel, preserving the order of the rest.
    pub fn remove(&mut self, channel: &str) -> Option<ChannelValue> {
        self.channels.shift_remove(channel)
    }

    pub fn contains(&self, channel: &str) -> bool {
        self.channels.contains_key(channel)
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Every spec across every channel (flattening lists) that has a defined
    /// field.
    pub fn field_specs_mut(&mut self) -> impl Iterator<Item = &mut EncodingSpec> {
        self.channels
            .values_mut()
            .flat_map(|value| value.iter_mut())
            .filter(|spec| spec.field.is_defined())
    }
}
