// Copyright 2022 Daniel Harrison. All Rights Reserved.

//! [serde::Serializer] implementations for crate types.

use serde::ser::{Error as _, SerializeMap, SerializeSeq};

use crate::dialect::InsertPlan;
use crate::value::Value;
use crate::{Record, Table};

/// Row-oriented serialization of a [Table]'s data.
///
/// Each row is an object keyed by field name, holding the record's
/// engine-independent values.
#[derive(Debug)]
pub struct Rows<'t, T>(pub &'t T);

/// Like [Rows], but each row holds the parameters of an [InsertPlan], keyed
/// by column name, as encoded for the plan's engine.
#[derive(Debug)]
pub struct EncodedRows<'t, T>(pub &'t T, pub &'t InsertPlan);

struct Row<'a> {
    names: &'a [&'static str],
    values: &'a [Value],
}

impl serde::Serialize for Row<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.names.len()))?;
        for (name, value) in self.names.iter().zip(self.values.iter()) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

fn serialize_rows<T, S, F>(
    table: &T,
    serializer: S,
    names: &[&'static str],
    mut values: F,
) -> Result<S::Ok, S::Error>
where
    T: Table,
    S: serde::Serializer,
    F: FnMut(&T::Record) -> Result<Vec<Value>, crate::Error>,
{
    let mut batch = Vec::new();
    let mut seq = serializer.serialize_seq(Some(table.num_rows()))?;
    for batch_idx in 0..table.num_batches() {
        table.gen_batch(batch_idx, &mut batch);
        for record in batch.iter() {
            let values = values(record).map_err(S::Error::custom)?;
            seq.serialize_element(&Row {
                names,
                values: &values,
            })?;
        }
    }
    seq.end()
}

impl<T: Table> serde::Serialize for Rows<'_, T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let Rows(table) = self;
        let names: Vec<&'static str> = <T::Record as Record>::FIELDS
            .iter()
            .map(|f| f.name)
            .collect();
        serialize_rows(*table, serializer, &names, <T::Record as Record>::values)
    }
}

impl<T: Table> serde::Serialize for EncodedRows<'_, T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let EncodedRows(table, plan) = self;
        serialize_rows(*table, serializer, plan.column_names(), |record| {
            plan.encode(record)
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::dialect::{Dialect, TableSchema};
    use crate::factory::tests::config;
    use crate::factory::{SensorReading, SensorReadings};

    use super::*;

    #[test]
    fn rows() {
        let table = SensorReadings::init(config(3));

        let actual: serde_json::Value = serde_json::to_value(Rows(&table)).unwrap();
        let rows = actual.as_array().unwrap();
        assert_eq!(rows.len(), 3);
        for (idx, row) in rows.iter().enumerate() {
            let reading = table.gen_row(idx);
            let row = row.as_object().unwrap();
            assert_eq!(row.len(), SensorReading::FIELDS.len());
            assert_eq!(row["device_id"], reading.device_id);
            assert_eq!(row["tag_ids"], serde_json::json!(reading.tag_ids));
            assert_eq!(
                row["temperature_c"],
                serde_json::json!(reading.temperature_c.to_string())
            );
            match &reading.notes {
                Some(notes) => assert_eq!(&row["notes"], notes),
                None => assert!(row["notes"].is_null()),
            }
        }
    }

    #[test]
    fn encoded_rows() {
        #[track_caller]
        fn test_case(
            dialect: Dialect,
            column: &str,
            expected: fn(&SensorReading) -> serde_json::Value,
        ) {
            let table = SensorReadings::init(config(2));
            let schema = TableSchema::new(dialect, SensorReadings::NAME, SensorReading::FIELDS)
                .unwrap();
            let plan = InsertPlan::new(dialect, &schema, SensorReading::FIELDS).unwrap();
            let actual = serde_json::to_value(EncodedRows(&table, &plan)).unwrap();
            let rows = actual.as_array().unwrap();
            assert_eq!(rows.len(), 2);
            for (idx, row) in rows.iter().enumerate() {
                let row = row.as_object().unwrap();
                assert_eq!(row.len(), plan.column_names().len());
                assert_eq!(row[column], expected(&table.gen_row(idx)));
            }
        }

        test_case(Dialect::Postgres, "is_anomaly", |r| r.is_anomaly.into());
        test_case(Dialect::MySql, "is_anomaly", |r| i16::from(r.is_anomaly).into());
        test_case(Dialect::MySql, "tag_ids", |r| {
            serde_json::to_string(&r.tag_ids).unwrap().into()
        });
        test_case(Dialect::Oracle, "tag_ids_json", |r| {
            serde_json::to_string(&r.tag_ids).unwrap().into()
        });
        test_case(Dialect::MsSql, "checksum_fixed", |r| r.checksum.clone().into());
    }
}
