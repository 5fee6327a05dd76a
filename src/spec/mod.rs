//! Specification tree types.
//!
//! These types model the Vega-Lite-shaped output of a chart generator: a
//! tree of [`ChartNode`]s nested through `layer`/`hconcat`/`vconcat`, whose
//! leaves carry a mark, an encoding-channel map, and a reference to a
//! backing table. Attribute optionality is tri-state ([`Prop`]): unset,
//! explicitly null, or a value.

pub mod encoding;
pub mod mark;
pub mod node;
pub mod prop;

// Re-export all types for convenience
pub use encoding::{
    channel, AxisSpec, BinParams, BinSpec, ChannelValue, Encoding, EncodingSpec, FieldType,
    HeaderSpec, LegendSpec, ScaleSpec, ScaleValue, SortOrder, Stack, StackOffset,
};
pub use mark::{MarkDef, MarkType};
pub use node::{ChartNode, SelectionDef};
pub use prop::Prop;
