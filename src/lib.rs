// Copyright 2022 Daniel Harrison. All Rights Reserved.

//! Reproducible synthetic datasets for seeding relational databases
//!
//! A [Set] is a named collection of [Table]s. Every row of every table is a
//! pure function of the dataset configuration and the row's index, so
//! batches can be generated in any order and regenerated at will. Rows are
//! typed [Record]s that flatten to engine-independent [value::Value]s, which
//! a [dialect::Dialect] then encodes for one particular database engine.

#![warn(missing_docs, missing_debug_implementations)]

use std::num::NonZeroUsize;
use std::ops::Range;

/// Declares a record struct together with its [Record] impl.
///
/// Field order in the struct is the order of [Record::FIELDS] and of
/// [Record::values], so the two cannot drift apart.
macro_rules! record {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                pub $field:ident: $ty:ty,
            )*
        }
    ) => {
        $(#[$meta])*
        pub struct $name {
            $(
                $(#[$fmeta])*
                pub $field: $ty,
            )*
        }

        impl $crate::Record for $name {
            const FIELDS: &'static [$crate::Field] = &[
                $(
                    $crate::Field {
                        name: stringify!($field),
                        kind: <$ty as $crate::value::ToValue>::KIND,
                    },
                )*
            ];

            fn values(&self) -> Result<Vec<$crate::value::Value>, $crate::Error> {
                Ok(vec![
                    $($crate::value::ToValue::to_value(&self.$field)?,)*
                ])
            }
        }
    };
}

pub mod config;
pub mod dialect;
pub mod factory;
pub mod load;
pub mod reference;
pub mod serde;
pub mod target;
pub mod value;

mod error;

pub use crate::error::Error;

/// A named dataset made up of one or more [Table]s.
pub trait Set {
    /// Configuration necessary for construct this dataset.
    type Config;

    /// Construct an instance of this dataset with the given configuration.
    fn init(config: Self::Config) -> Self;

    /// Calls `f` with each table in this dataset, in declaration order.
    ///
    /// Stops at, and returns, the first error.
    fn tables<E, F: TableFnMut<Result<(), E>>>(&self, f: &mut F) -> Result<(), E>;
}

/// A callback that is generic over the [Table] it is handed.
pub trait TableFnMut<R> {
    /// Invokes this callback with one table.
    fn call_mut<T: Table>(&mut self, table: T) -> R;
}

/// The object-safe portion of a [Table].
pub trait DynTable {
    /// The name of this table.
    fn name(&self) -> &'static str;

    /// The total number of rows in all batches.
    fn num_rows(&self) -> usize;

    /// The maximum number of rows to include in any given batch.
    fn max_rows_per_batch(&self) -> NonZeroUsize;

    /// The number of batches of data in this table.
    fn num_batches(&self) -> usize {
        self.num_rows().div_ceil(self.max_rows_per_batch().get())
    }

    /// The row indexes covered by the requested batch.
    ///
    /// Batches are consecutive and cover `0..num_rows` exactly once. An out
    /// of bounds batch is empty.
    fn batch_rows(&self, idx: usize) -> Range<usize> {
        let max = self.max_rows_per_batch().get();
        let num_rows = self.num_rows();
        let row_start = std::cmp::min(idx.saturating_mul(max), num_rows);
        let row_end = std::cmp::min(row_start.saturating_add(max), num_rows);
        row_start..row_end
    }
}

/// A named set of data with a uniform schema.
///
/// A table is generated in batches, each of which contains one or more rows.
/// For parallelization, each row can be generated purely as a function of its
/// index and dataset configuration.
pub trait Table: DynTable {
    /// The typed row of this table.
    type Record: Record;

    /// Generates the requested row.
    fn gen_row(&self, idx: usize) -> Self::Record;

    /// Generates the requested batch's rows.
    ///
    /// This clears the given batch and reuses its allocation. If the
    /// requested index is out of bounds, an empty batch is generated.
    fn gen_batch(&self, idx: usize, batch: &mut Vec<Self::Record>) {
        batch.clear();
        let rows = self.batch_rows(idx);
        batch.reserve(rows.len());
        batch.extend(rows.map(|row| self.gen_row(row)));
    }
}

/// A named, typed column of a [Record].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// The name of the field.
    pub name: &'static str,
    /// The kind of value the field holds, including when it is NULL.
    pub kind: value::Kind,
}

/// A typed row that flattens to positional values.
pub trait Record {
    /// The fields of this record, in order.
    const FIELDS: &'static [Field];

    /// Returns one value per entry in [Self::FIELDS], in the same order.
    fn values(&self) -> Result<Vec<value::Value>, Error>;
}
