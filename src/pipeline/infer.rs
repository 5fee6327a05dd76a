//! Type and format inference for mis-typed columns.
//!
//! Generators frequently hand back dates, numbers, currency amounts, and
//! percentages as plain strings. For columns actually bound to a chart
//! channel, conversions are attempted in strict priority order — date,
//! number, currency, percentage — stopping at the first success, then the
//! column and every encoding referencing it are rewritten.
//!
//! Date detection is deliberately limited: numeric columns convert only when
//! they hold 4-digit years, and string columns only when the first non-null
//! value matches one of a fixed list of candidate formats (ISO date and
//! datetime, slash dates, month-name forms), which the whole column must
//! then parse under.

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use regex::Regex;
use tracing::debug;

use crate::options::PipelineOptions;
use crate::pipeline::Leaf;
use crate::spec::{channel, AxisSpec, FieldType, MarkType, Prop};
use crate::table::{distinct_count, is_numeric_dtype, is_temporal_dtype, TableRef};
use crate::Result;

/// Channels whose backing columns are considered for conversion. Anything
/// not shown as a variable on the chart is left alone.
const CONVERTIBLE_CHANNELS: &[&str] = &[channel::X, channel::Y, channel::THETA, channel::COLOR];

/// Days from CE to the Unix epoch (1970-01-01).
const UNIX_EPOCH_CE_DAYS: i32 = 719_163;

/// Candidate string formats with a time component, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

/// Candidate date-only formats, tried after the datetime formats.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%d %b %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

static CURRENCY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^\s*([$€£¥]))|(?:([$€£¥])\s*$)").expect("hard-coded pattern")
});

static PERCENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*%$").expect("hard-coded pattern"));

/// Outcome of a successful conversion strategy.
struct Converted {
    column: Series,
    field_type: FieldType,
    format: Option<String>,
}

/// One queued column rewrite: the owning table plus the converted column.
struct PendingConversion {
    field: String,
    table: TableRef,
    outcome: Converted,
}

/// Detect mis-typed columns bound to chart channels and coerce them,
/// updating the declared type and format of every encoding that references
/// the column.
pub fn update_types_and_formats(leaves: &mut [Leaf<'_>], options: &PipelineOptions) -> Result<()> {
    // Heat-map axes often look binned; reinterpreting their string values as
    // continuous is basically all the strategies do, so heat-map groups are
    // left alone entirely.
    if leaves
        .iter()
        .any(|leaf| leaf.node.mark_type() == Some(MarkType::Rect))
    {
        return Ok(());
    }

    // Collect every (field, table) pair that needs converting before
    // touching anything, so each column converts at most once per table.
    let mut pending: Vec<PendingConversion> = Vec::new();
    for leaf in leaves.iter() {
        let Some(encoding) = leaf.node.encoding.value() else {
            continue;
        };
        for channel_name in CONVERTIBLE_CHANNELS {
            let Some(spec) = encoding.single(channel_name) else {
                continue;
            };
            let Some(field) = spec.field() else {
                continue;
            };
            let table = leaf.table()?;
            if distinct_count(&table.borrow(), field)? < options.min_distinct_for_conversion {
                continue;
            }
            if pending
                .iter()
                .any(|queued| queued.field == field && queued.table.same_table(table))
            {
                continue;
            }
            if let Some(outcome) = try_convert(&table.borrow(), field) {
                debug!(field, new_type = ?outcome.field_type, "queueing column conversion");
                pending.push(PendingConversion {
                    field: field.to_string(),
                    table: table.clone(),
                    outcome,
                });
            }
        }
    }

    // Apply each conversion to its table, then update every encoding in
    // every leaf that reads the rewritten field from the same table.
    for conversion in pending {
        let PendingConversion { field, table, outcome } = conversion;
        let Converted {
            column,
            field_type,
            format,
        } = outcome;
        table.borrow_mut().replace(&field, column)?;

        for leaf in leaves.iter_mut() {
            let shares_table = leaf
                .table
                .as_ref()
                .is_some_and(|candidate| candidate.same_table(&table));
            if !shares_table {
                continue;
            }
            let Some(encoding) = leaf.node.encoding.value_mut() else {
                continue;
            };
            for spec in encoding.field_specs_mut() {
                if spec.field() != Some(field.as_str()) {
                    continue;
                }
                spec.field_type = Prop::Value(field_type);
                if let Some(format) = &format {
                    spec.format = Prop::Value(format.clone());
                    let axis = spec.axis.get_or_insert_with(AxisSpec::default);
                    axis.format = Prop::Value(format.clone());
                }
            }
        }
    }
    Ok(())
}

/// Run the conversion strategies in priority order, stopping at the first
/// success. A failure inside one strategy only rules out that strategy.
fn try_convert(frame: &DataFrame, field: &str) -> Option<Converted> {
    let series = frame.column(field).ok()?.as_materialized_series().clone();
    convert_date(&series)
        .or_else(|| convert_number(&series))
        .or_else(|| convert_currency(&series))
        .or_else(|| convert_percentage(&series))
}

// =============================================================================
// Date conversion
// =============================================================================

fn convert_date(series: &Series) -> Option<Converted> {
    if is_temporal_dtype(series.dtype()) {
        // Already temporal, nothing to fix.
        return None;
    }
    if is_numeric_dtype(series.dtype()) {
        return convert_year_numbers(series);
    }
    convert_string_dates(series)
}

/// Numeric columns of 4-digit integers (e.g. `2019`) are read as years.
fn convert_year_numbers(series: &Series) -> Option<Converted> {
    let floats = series.cast(&DataType::Float64).ok()?;
    let ca = floats.f64().ok()?;
    let first = ca.into_iter().flatten().next()?;
    if !is_four_digit_year(first) {
        return None;
    }
    let mut days: Vec<Option<i32>> = Vec::with_capacity(series.len());
    for value in ca.into_iter() {
        match value {
            None => days.push(None),
            Some(year) => {
                if !is_four_digit_year(year) {
                    return None;
                }
                let date = NaiveDate::from_ymd_opt(year as i32, 1, 1)?;
                days.push(Some(date.num_days_from_ce() - UNIX_EPOCH_CE_DAYS));
            }
        }
    }
    let column = Series::new(series.name().clone(), days)
        .cast(&DataType::Date)
        .ok()?;
    Some(Converted {
        column,
        field_type: FieldType::Temporal,
        format: Some("%Y".to_string()),
    })
}

fn is_four_digit_year(value: f64) -> bool {
    value.fract() == 0.0 && (1000.0..=9999.0).contains(&value)
}

/// String columns convert when a candidate format matches the first value
/// and the whole column parses under it.
fn convert_string_dates(series: &Series) -> Option<Converted> {
    let ca = series.str().ok()?;
    let first = ca.into_iter().flatten().next()?;
    let (format, has_time) = detect_datetime_format(first)?;

    if has_time {
        let mut stamps: Vec<Option<i64>> = Vec::with_capacity(series.len());
        for value in ca.into_iter() {
            match value {
                None => stamps.push(None),
                Some(text) => {
                    let parsed = NaiveDateTime::parse_from_str(text, format).ok()?;
                    stamps.push(Some(parsed.and_utc().timestamp_micros()));
                }
            }
        }
        let column = Series::new(series.name().clone(), stamps)
            .cast(&DataType::Datetime(TimeUnit::Microseconds, None))
            .ok()?;
        Some(Converted {
            column,
            field_type: FieldType::Temporal,
            format: Some(format.to_string()),
        })
    } else {
        let mut days: Vec<Option<i32>> = Vec::with_capacity(series.len());
        for value in ca.into_iter() {
            match value {
                None => days.push(None),
                Some(text) => {
                    let parsed = NaiveDate::parse_from_str(text, format).ok()?;
                    days.push(Some(parsed.num_days_from_ce() - UNIX_EPOCH_CE_DAYS));
                }
            }
        }
        let column = Series::new(series.name().clone(), days)
            .cast(&DataType::Date)
            .ok()?;
        Some(Converted {
            column,
            field_type: FieldType::Temporal,
            format: Some(format.to_string()),
        })
    }
}

fn detect_datetime_format(value: &str) -> Option<(&'static str, bool)> {
    for &format in DATETIME_FORMATS {
        if NaiveDateTime::parse_from_str(value, format).is_ok() {
            return Some((format, true));
        }
    }
    for &format in DATE_FORMATS {
        if NaiveDate::parse_from_str(value, format).is_ok() {
            return Some((format, false));
        }
    }
    None
}

// =============================================================================
// Number / currency / percentage conversion
// =============================================================================

/// Whole-column cast of numeric strings to floats. Columns that already
/// carry a non-string dtype are left to the renderer.
fn convert_number(series: &Series) -> Option<Converted> {
    let ca = series.str().ok()?;
    let mut values: Vec<Option<f64>> = Vec::with_capacity(series.len());
    for value in ca.into_iter() {
        match value {
            None => values.push(None),
            Some(text) => values.push(Some(text.trim().parse::<f64>().ok()?)),
        }
    }
    Some(Converted {
        column: Series::new(series.name().clone(), values),
        field_type: FieldType::Quantitative,
        format: None,
    })
}

/// Strings with a single leading or trailing currency symbol convert to
/// floats with a 2-decimal currency format. Mixed symbols are left alone —
/// there is no consistent format for them.
fn convert_currency(series: &Series) -> Option<Converted> {
    let ca = series.str().ok()?;
    let mut symbols: HashSet<&str> = HashSet::new();
    for value in ca.into_iter().flatten() {
        let captures = CURRENCY_PATTERN.captures(value)?;
        let symbol = captures.get(1).or_else(|| captures.get(2))?.as_str();
        symbols.insert(symbol);
    }
    if symbols.len() != 1 {
        return None;
    }
    let symbol = symbols.into_iter().next()?;

    let mut values: Vec<Option<f64>> = Vec::with_capacity(series.len());
    for value in ca.into_iter() {
        match value {
            None => values.push(None),
            Some(text) => {
                let stripped = CURRENCY_PATTERN.replace_all(text, "");
                values.push(Some(stripped.trim().parse::<f64>().ok()?));
            }
        }
    }
    Some(Converted {
        column: Series::new(series.name().clone(), values),
        field_type: FieldType::Quantitative,
        format: Some(format!("{symbol}.2f")),
    })
}

/// Strings ending in `%` convert to fractions with a percent format.
fn convert_percentage(series: &Series) -> Option<Converted> {
    let ca = series.str().ok()?;
    for value in ca.into_iter().flatten() {
        if !PERCENT_PATTERN.is_match(value) {
            return None;
        }
    }
    let mut values: Vec<Option<f64>> = Vec::with_capacity(series.len());
    for value in ca.into_iter() {
        match value {
            None => values.push(None),
            Some(text) => {
                let stripped = PERCENT_PATTERN.replace(text, "");
                values.push(Some(stripped.trim().parse::<f64>().ok()? / 100.0));
            }
        }
    }
    Some(Converted {
        column: Series::new(series.name().clone(), values),
        field_type: FieldType::Quantitative,
        format: Some("%".to_string()),
    })
}
