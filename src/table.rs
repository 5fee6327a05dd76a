//! Shared table handles and column statistics.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use polars::prelude::*;

use crate::{Result, TidyError};

/// Shared, mutable handle to a chart's backing table.
///
/// The pipeline is strictly single-threaded, and table *identity* is
/// semantically load-bearing (layers sharing one table, copy-on-first-
/// encounter during flattening), so the handle is a plain `Rc<RefCell<_>>`
/// rather than a thread-safe wrapper.
#[derive(Clone)]
pub struct TableRef {
    inner: Rc<RefCell<DataFrame>>,
}

impl TableRef {
    pub fn new(frame: DataFrame) -> Self {
        Self {
            inner: Rc::new(RefCell::new(frame)),
        }
    }

    /// A fresh handle backed by a copy of the current contents. Mutations
    /// through the copy never reach this handle's table.
    pub fn deep_copy(&self) -> Self {
        TableRef::new(self.inner.borrow().clone())
    }

    /// True when both handles point at the same underlying table.
    pub fn same_table(&self, other: &TableRef) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn borrow(&self) -> Ref<'_, DataFrame> {
        self.inner.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, DataFrame> {
        self.inner.borrow_mut()
    }
}

impl From<DataFrame> for TableRef {
    fn from(frame: DataFrame) -> Self {
        TableRef::new(frame)
    }
}

impl std::fmt::Debug for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let frame = self.inner.borrow();
        write!(f, "TableRef({} rows x {} cols)", frame.height(), frame.width())
    }
}

// =============================================================================
// Column classification
// =============================================================================

pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

pub fn is_temporal_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Date | DataType::Datetime(_, _) | DataType::Time
    )
}

pub fn is_string_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::String)
}

// =============================================================================
// Column statistics
// =============================================================================

/// Number of distinct non-null values in a column.
pub fn distinct_count(frame: &DataFrame, column: &str) -> Result<usize> {
    let series = frame.column(column)?.as_materialized_series().drop_nulls();
    Ok(series.n_unique()?)
}

/// Min, max, and mean of a column's numeric view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

pub fn numeric_summary(frame: &DataFrame, column: &str) -> Result<NumericSummary> {
    let series = frame
        .column(column)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let ca = series.f64()?;
    let (Some(min), Some(max), Some(mean)) = (ca.min(), ca.max(), ca.mean()) else {
        return Err(TidyError::Data(format!(
            "column '{column}' has no numeric values"
        )));
    };
    Ok(NumericSummary { min, max, mean })
}

/// True when every value in the column is present and non-negative.
pub fn all_non_negative(frame: &DataFrame, column: &str) -> Result<bool> {
    let series = frame
        .column(column)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let ca = series.f64()?;
    let result = ca.into_iter().all(|value| value.is_some_and(|v| v >= 0.0));
    Ok(result)
}
