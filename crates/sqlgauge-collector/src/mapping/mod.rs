//! Row to metric mapping
//!
//! Decides, from column names and untyped values alone, which column names
//! the measurement, which columns are tags and which are fields.

mod row_mapper;

#[cfg(test)]
mod tests;

pub use row_mapper::*;
