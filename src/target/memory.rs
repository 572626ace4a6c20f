// Copyright 2023 Daniel Harrison. All Rights Reserved.

use std::collections::BTreeMap;

use log::debug;

use crate::dialect::{Dialect, InsertPlan, TableSchema};
use crate::load::Target;
use crate::value::Value;
use crate::Error;

/// Something that happened to a [MemoryTarget], in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A table was dropped and recreated.
    Reset {
        #[allow(missing_docs)]
        table: &'static str,
    },
    /// A batch was committed.
    Commit {
        #[allow(missing_docs)]
        table: &'static str,
        #[allow(missing_docs)]
        batch: usize,
        /// The number of rows in the batch.
        rows: usize,
    },
}

/// The contents of one table held by a [MemoryTarget].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryTable {
    /// The column names, in insert order.
    pub columns: Vec<&'static str>,
    /// Committed rows, decoded back to semantic values.
    pub rows: Vec<Vec<Value>>,
    /// The number of batches committed since the last reset.
    pub commits: usize,
}

/// An in-process [Target] that keeps every committed row.
///
/// Each batch is decoded back through its [InsertPlan] before it is
/// committed, so anything an encoder produces that its decoder can't read
/// fails the batch. Used for dry runs and in tests.
#[derive(Debug)]
pub struct MemoryTarget {
    dialect: Dialect,
    tables: BTreeMap<&'static str, MemoryTable>,
    events: Vec<Event>,
    fail_on: Option<(String, usize)>,
}

impl MemoryTarget {
    /// An empty target that encodes as `dialect` would.
    pub fn new(dialect: Dialect) -> Self {
        MemoryTarget {
            dialect,
            tables: BTreeMap::new(),
            events: Vec::new(),
            fail_on: None,
        }
    }

    /// Makes writing the given batch of the given table fail, as if the
    /// engine had rejected it.
    pub fn fail_on(mut self, table: &str, batch: usize) -> Self {
        self.fail_on = Some((table.to_owned(), batch));
        self
    }

    /// The named table, if it has been reset.
    pub fn table(&self, name: &str) -> Option<&MemoryTable> {
        self.tables.get(name)
    }

    /// Everything that has happened to this target, oldest first.
    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

impl Target for MemoryTarget {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn reset_table(&mut self, schema: &TableSchema) -> Result<(), Error> {
        let create = schema.statements().next().unwrap_or_default();
        if !create.starts_with("CREATE TABLE") {
            return Err(Error::schema(schema.table, "missing CREATE TABLE"));
        }
        debug!("{}", schema.ddl);
        let table = MemoryTable {
            columns: schema.columns.iter().map(|c| c.name).collect(),
            ..Default::default()
        };
        self.tables.insert(schema.table, table);
        self.events.push(Event::Reset {
            table: schema.table,
        });
        Ok(())
    }

    fn write_batch(
        &mut self,
        plan: &InsertPlan,
        batch: usize,
        rows: &[Vec<Value>],
    ) -> Result<(), Error> {
        let name = plan.table();
        if let Some((table, fail_batch)) = &self.fail_on {
            if table == name && *fail_batch == batch {
                return Err(Error::insert(name, batch, "injected failure"));
            }
        }
        let table = self
            .tables
            .get_mut(name)
            .ok_or_else(|| Error::insert(name, batch, "table does not exist"))?;
        if table.columns != plan.column_names() {
            return Err(Error::insert(name, batch, "column list does not match table"));
        }
        let decoded = rows
            .iter()
            .map(|row| plan.decode(row.clone()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| Error::insert(name, batch, err))?;
        table.rows.extend(decoded);
        table.commits += 1;
        self.events.push(Event::Commit {
            table: name,
            batch,
            rows: rows.len(),
        });
        Ok(())
    }
}
