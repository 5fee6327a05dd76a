/*!
# vltidy - Vega-Lite specification post-processing

A normalization pipeline for machine-generated chart specifications bound to
tabular data. An upstream generator (typically an LLM) emits a tree of nested
layout/layering nodes, each leaf referencing a table and a set of
visual-encoding bindings. Because generators frequently produce stylistically
invalid or suboptimal specifications, this crate applies a fixed sequence of
corrective heuristics before the chart is rendered.

## Example

```
use polars::prelude::*;
use vltidy::{channel, ChartNode, EncodingSpec, FieldType, MarkType, TableRef};

let frame = DataFrame::new(vec![
    Series::new("month".into(), &["Jan", "Feb", "Mar"]).into_column(),
    Series::new("sales".into(), &[10.0f64, 20.0, 30.0]).into_column(),
])
.unwrap();

let mut chart = ChartNode::with_mark(MarkType::Line)
    .with_channel(channel::X, EncodingSpec::for_field("month", FieldType::Nominal))
    .with_channel(channel::Y, EncodingSpec::for_field("sales", FieldType::Quantitative))
    .with_data(TableRef::new(frame));

vltidy::post_process(&mut chart, None);
```

## Architecture

The pipeline flattens the tree in two passes (concatenation, then layering)
into a list of leaf charts paired with their backing tables, deep-copying
every table on first encounter so caller-owned frames are never mutated. The
correction stages then run over that list in a fixed order, each behind its
own fault boundary: a failing heuristic is logged and skipped so the chart
still renders with whatever corrections did apply.

## Core Components

- [`spec`] - The specification tree: nodes, marks, encodings, and the
  unset/null/value tri-state their attributes use
- [`table`] - Shared table handles and column statistics
- [`pipeline`] - The correction stages and the driver that sequences them
- [`options`] - Tunable thresholds for every heuristic
*/

pub mod options;
pub mod pipeline;
pub mod spec;
pub mod table;

// Re-export key types for convenience
pub use options::PipelineOptions;
pub use pipeline::{post_process, Leaf, Panel, Pipeline};
pub use spec::{
    channel, AxisSpec, BinParams, BinSpec, ChannelValue, ChartNode, Encoding, EncodingSpec,
    FieldType, HeaderSpec, LegendSpec, MarkDef, MarkType, Prop, ScaleSpec, ScaleValue,
    SelectionDef, SortOrder, Stack, StackOffset,
};
pub use table::TableRef;

// DataFrame abstraction (wraps Polars)
pub use polars::prelude::DataFrame;

/// Main library error type
#[derive(thiserror::Error, Debug)]
pub enum TidyError {
    /// A leaf was missing an attribute a heuristic expected, or carried one
    /// of the wrong shape.
    #[error("Malformed node: {0}")]
    MalformedNode(String),

    /// A type-coercion strategy failed to parse or cast column contents.
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// A table operation failed (absent column, unexpected dtype, ...).
    #[error("Data error: {0}")]
    Data(String),
}

impl From<polars::error::PolarsError> for TidyError {
    fn from(err: polars::error::PolarsError) -> Self {
        TidyError::Data(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TidyError>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
