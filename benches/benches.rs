// Copyright 2023 Daniel Harrison. All Rights Reserved.

use std::hint::black_box;
use std::num::NonZeroUsize;

use codspeed_criterion_compat::{criterion_group, criterion_main, Criterion, Throughput};
use seedz::dialect::{Dialect, InsertPlan, TableSchema};
use seedz::factory::{Factory, FactoryConfig};
use seedz::{Record, Set, Table, TableFnMut};

struct Bench<'c> {
    c: &'c mut Criterion,
}

impl TableFnMut<Result<(), seedz::Error>> for Bench<'_> {
    fn call_mut<T: Table>(&mut self, table: T) -> Result<(), seedz::Error> {
        let fields = <T::Record as Record>::FIELDS;
        let schema = TableSchema::new(Dialect::Oracle, table.name(), fields)?;
        let plan = InsertPlan::new(Dialect::Oracle, &schema, fields)?;
        let mut batch = Vec::new();

        let mut g = self.c.benchmark_group(table.name());
        g.throughput(Throughput::Elements(table.num_rows() as u64));
        g.bench_function("gen", |b| {
            b.iter(|| {
                for idx in 0..table.num_batches() {
                    table.gen_batch(idx, &mut batch);
                    black_box(&mut batch);
                }
            })
        });
        // Oracle has the most encoding work to do: no booleans, no arrays,
        // and JSON as text.
        g.bench_function("gen_encode_oracle", |b| {
            b.iter(|| {
                for idx in 0..table.num_batches() {
                    table.gen_batch(idx, &mut batch);
                    for record in batch.iter() {
                        black_box(plan.encode(record).ok());
                    }
                }
            })
        });
        g.finish();
        Ok(())
    }
}

fn factory(c: &mut Criterion) {
    let max_rows_per_batch = NonZeroUsize::new(500).unwrap_or(NonZeroUsize::MIN);
    let factory = Factory::init(FactoryConfig::fixed(5000, max_rows_per_batch));
    if let Err(err) = factory.tables(&mut Bench { c }) {
        panic!("bench setup failed: {}", err);
    }
}

// The grouping here is an artifact of criterion's interaction with the
// plug-able rust benchmark harness. We use criterion's groups instead.
criterion_group!(benches, factory);
criterion_main!(benches);
