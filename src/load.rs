// Copyright 2023 Daniel Harrison. All Rights Reserved.

//! Resetting tables and filling them batch by batch.
//!
//! A run walks the tables of a [Set] in declaration order. Each table is
//! dropped and recreated, then its batches are generated, encoded for the
//! target's [Dialect], and written one transaction per batch. The first
//! error aborts the run: tables already loaded stay loaded, and later tables
//! are never touched.

use std::time::Instant;

use log::info;

use crate::dialect::{Dialect, InsertPlan, TableSchema};
use crate::value::Value;
use crate::{Error, Record, Set, Table, TableFnMut};

/// A database session that tables can be loaded into.
pub trait Target {
    /// The engine on the other end of this session.
    fn dialect(&self) -> Dialect;

    /// Drops the table if it exists, including anything that depends on it,
    /// and recreates it (with its indexes) from `schema`.
    ///
    /// Afterwards the table exists and is empty. A missing table is not an
    /// error.
    fn reset_table(&mut self, schema: &TableSchema) -> Result<(), Error>;

    /// Inserts every row of batch number `batch` and commits.
    ///
    /// Each row holds the parameters of `plan`, already encoded for this
    /// target's dialect. Either the whole batch is committed or the error is
    /// returned.
    fn write_batch(
        &mut self,
        plan: &InsertPlan,
        batch: usize,
        rows: &[Vec<Value>],
    ) -> Result<(), Error>;
}

impl<T: Target + ?Sized> Target for Box<T> {
    fn dialect(&self) -> Dialect {
        (**self).dialect()
    }

    fn reset_table(&mut self, schema: &TableSchema) -> Result<(), Error> {
        (**self).reset_table(schema)
    }

    fn write_batch(
        &mut self,
        plan: &InsertPlan,
        batch: usize,
        rows: &[Vec<Value>],
    ) -> Result<(), Error> {
        (**self).write_batch(plan, batch, rows)
    }
}

/// What was written to one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    /// The table name.
    pub table: &'static str,
    /// The number of rows inserted.
    pub rows: usize,
    /// The number of batches committed.
    pub batches: usize,
}

/// What was written by [run], one entry per table in load order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    #[allow(missing_docs)]
    pub tables: Vec<TableReport>,
}

impl RunReport {
    /// The total number of rows inserted across all tables.
    pub fn rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows).sum()
    }
}

/// Generates, encodes, and writes every batch of `table` in order.
///
/// The table is expected to already have been reset with `schema`.
pub fn load_table<X: Target + ?Sized, T: Table>(
    target: &mut X,
    table: &T,
    schema: &TableSchema,
) -> Result<TableReport, Error> {
    if schema.table != table.name() {
        return Err(Error::schema(
            table.name(),
            format!("schema is for table {}", schema.table),
        ));
    }
    let plan = InsertPlan::new(target.dialect(), schema, <T::Record as Record>::FIELDS)?;
    let num_rows = table.num_rows();
    let num_batches = table.num_batches();

    let mut records = Vec::new();
    let mut rows = Vec::new();
    let mut inserted = 0;
    for batch_idx in 0..num_batches {
        table.gen_batch(batch_idx, &mut records);
        rows.clear();
        for record in records.iter() {
            rows.push(plan.encode(record)?);
        }
        target.write_batch(&plan, batch_idx, &rows)?;
        inserted += rows.len();
        info!("[{}] Inserted {}/{}", plan.table(), inserted, num_rows);
    }
    Ok(TableReport {
        table: plan.table(),
        rows: inserted,
        batches: num_batches,
    })
}

/// Resets and loads every table of `set`, in declaration order.
///
/// Stops at, and returns, the first error.
pub fn run<X: Target + ?Sized, S: Set>(target: &mut X, set: &S) -> Result<RunReport, Error> {
    let mut loader = Loader {
        target,
        report: RunReport::default(),
    };
    set.tables(&mut loader)?;
    Ok(loader.report)
}

struct Loader<'a, X: ?Sized> {
    target: &'a mut X,
    report: RunReport,
}

impl<X: Target + ?Sized> TableFnMut<Result<(), Error>> for Loader<'_, X> {
    fn call_mut<T: Table>(&mut self, table: T) -> Result<(), Error> {
        let start = Instant::now();
        let dialect = self.target.dialect();
        info!(
            "[{}] Loading {} rows into {}",
            table.name(),
            table.num_rows(),
            dialect
        );
        let schema = TableSchema::new(dialect, table.name(), <T::Record as Record>::FIELDS)?;
        self.target.reset_table(&schema)?;
        let report = load_table(self.target, &table, &schema)?;
        info!(
            "[{}] Done: {} rows in {} batches in {:?}",
            report.table,
            report.rows,
            report.batches,
            start.elapsed()
        );
        self.report.tables.push(report);
        Ok(())
    }
}
