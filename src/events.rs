//! Row-indexed event data
//!
//! The fit only needs named per-row reals. [`EventSource`] is that accessor;
//! [`EventTable`] is the in-memory implementation, a dense `rows x fields`
//! matrix with named columns.

use crate::error::{DalitzError, Result};
use ndarray::{Array2, ArrayView1, Axis};

/// Accessor for event data
pub trait EventSource {
    /// Number of rows
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value of `field` in `row`
    fn value(&self, field: &str, row: usize) -> Result<f64>;
}

/// Dense event table with named columns
#[derive(Debug, Clone, PartialEq)]
pub struct EventTable {
    fields: Vec<String>,
    data: Array2<f64>,
}

impl EventTable {
    /// Wrap `data` whose columns are named by `fields`
    pub fn new(fields: Vec<String>, data: Array2<f64>) -> Result<Self> {
        if data.ncols() != fields.len() {
            return Err(DalitzError::OutOfRange(format!(
                "{} field names for {} columns",
                fields.len(),
                data.ncols()
            )));
        }
        for (i, name) in fields.iter().enumerate() {
            if fields[..i].contains(name) {
                return Err(DalitzError::InvalidState(format!(
                    "duplicate field '{}'",
                    name
                )));
            }
        }
        Ok(Self { fields, data })
    }

    /// Empty table with the given columns
    pub fn with_fields(fields: &[&str]) -> Result<Self> {
        let fields: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
        let data = Array2::zeros((0, fields.len()));
        Self::new(fields, data)
    }

    /// Build a table from row vectors
    ///
    /// ```
    /// use dalitz_rs::events::{EventSource, EventTable};
    ///
    /// let table = EventTable::from_rows(&["m12sq", "m13sq"], &[vec![1.0, 1.5], vec![0.8, 2.0]]).unwrap();
    /// assert_eq!(table.len(), 2);
    /// assert_eq!(table.value("m13sq", 1).unwrap(), 2.0);
    /// ```
    pub fn from_rows(fields: &[&str], rows: &[Vec<f64>]) -> Result<Self> {
        let mut table = Self::with_fields(fields)?;
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Append one row
    pub fn push_row(&mut self, row: &[f64]) -> Result<()> {
        if row.len() != self.fields.len() {
            return Err(DalitzError::OutOfRange(format!(
                "row has {} values for {} fields",
                row.len(),
                self.fields.len()
            )));
        }
        self.data
            .push_row(ArrayView1::from(row))
            .map_err(|e| DalitzError::OutOfRange(e.to_string()))
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    fn field_index(&self, field: &str) -> Result<usize> {
        self.fields
            .iter()
            .position(|f| f == field)
            .ok_or_else(|| DalitzError::OutOfRange(format!("unknown field '{}'", field)))
    }

    /// One full column
    pub fn column(&self, field: &str) -> Result<ArrayView1<'_, f64>> {
        let index = self.field_index(field)?;
        Ok(self.data.index_axis(Axis(1), index))
    }
}

impl EventSource for EventTable {
    fn len(&self) -> usize {
        self.data.nrows()
    }

    fn value(&self, field: &str, row: usize) -> Result<f64> {
        let column = self.field_index(field)?;
        self.data.get((row, column)).copied().ok_or_else(|| {
            DalitzError::OutOfRange(format!(
                "row {} outside a table of {} rows",
                row,
                self.data.nrows()
            ))
        })
    }
}
