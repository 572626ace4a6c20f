// Copyright 2023 Daniel Harrison. All Rights Reserved.

use std::net::IpAddr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use log::debug;
use postgres::types::ToSql;
use postgres::{Client, Config, NoTls};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::config::ConnectConfig;
use crate::dialect::{Dialect, InsertPlan, TableSchema};
use crate::load::Target;
use crate::value::{Kind, Value};
use crate::Error;

/// A [Target] backed by a PostgreSQL connection.
pub struct PostgresTarget {
    client: Client,
}

impl std::fmt::Debug for PostgresTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresTarget").finish_non_exhaustive()
    }
}

impl PostgresTarget {
    /// Connects without TLS.
    pub fn connect(config: &ConnectConfig) -> Result<Self, Error> {
        let client = Config::new()
            .host(&config.host)
            .port(config.port)
            .user(&config.user)
            .password(&config.password)
            .dbname(&config.database)
            .connect(NoTls)
            .map_err(|err| Error::Connect(err.to_string()))?;
        Ok(PostgresTarget { client })
    }
}

/// Binds a value to a parameter. NULLs are typed so the server-inferred
/// parameter type still checks.
fn param(value: &Value) -> Box<dyn ToSql + Sync + '_> {
    match value {
        Value::Null(kind) => match kind {
            Kind::Bool => Box::new(None::<bool>),
            Kind::I16 => Box::new(None::<i16>),
            Kind::I32 => Box::new(None::<i32>),
            Kind::I64 => Box::new(None::<i64>),
            Kind::F32 => Box::new(None::<f32>),
            Kind::F64 => Box::new(None::<f64>),
            Kind::Decimal => Box::new(None::<Decimal>),
            Kind::Bytes => Box::new(None::<Vec<u8>>),
            Kind::Uuid => Box::new(None::<Uuid>),
            Kind::Date => Box::new(None::<NaiveDate>),
            Kind::Time => Box::new(None::<NaiveTime>),
            Kind::Timestamp => Box::new(None::<NaiveDateTime>),
            Kind::TimestampTz => Box::new(None::<DateTime<Utc>>),
            Kind::Inet => Box::new(None::<IpAddr>),
            Kind::TextList => Box::new(None::<Vec<String>>),
            Kind::IntList => Box::new(None::<Vec<i32>>),
            Kind::FloatList => Box::new(None::<Vec<f64>>),
            Kind::Json => Box::new(None::<serde_json::Value>),
            Kind::Text | Kind::Interval | Kind::MacAddr => Box::new(None::<String>),
        },
        Value::Bool(x) => Box::new(x),
        Value::I16(x) => Box::new(x),
        Value::I32(x) => Box::new(x),
        Value::I64(x) => Box::new(x),
        Value::F32(x) => Box::new(x),
        Value::F64(x) => Box::new(x),
        Value::Decimal(x) => Box::new(x),
        Value::Text(x) => Box::new(x),
        Value::Bytes(x) => Box::new(x),
        Value::Uuid(x) => Box::new(x),
        Value::Date(x) => Box::new(x),
        Value::Time(x) => Box::new(x),
        Value::Timestamp(x) => Box::new(x),
        Value::TimestampTz(x) => Box::new(x),
        Value::Inet(x) => Box::new(x),
        Value::TextList(x) => Box::new(x),
        Value::IntList(x) => Box::new(x),
        Value::FloatList(x) => Box::new(x),
        Value::Json(x) => Box::new(x),
        // Sent as text and cast by the placeholder.
        Value::Interval(x) => Box::new(x.to_string()),
        Value::MacAddr(x) => Box::new(x.to_string()),
    }
}

impl Target for PostgresTarget {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn reset_table(&mut self, schema: &TableSchema) -> Result<(), Error> {
        let drop = format!("DROP TABLE IF EXISTS {} CASCADE", schema.table);
        debug!("{}", drop);
        self.client
            .batch_execute(&drop)
            .map_err(|err| Error::schema(schema.table, err))?;
        debug!("{}", schema.ddl);
        self.client
            .batch_execute(schema.ddl)
            .map_err(|err| Error::schema(schema.table, err))?;
        Ok(())
    }

    fn write_batch(
        &mut self,
        plan: &InsertPlan,
        batch: usize,
        rows: &[Vec<Value>],
    ) -> Result<(), Error> {
        let err = |err: postgres::Error| Error::insert(plan.table(), batch, err);
        let mut txn = self.client.transaction().map_err(err)?;
        let stmt = txn.prepare(plan.sql()).map_err(err)?;
        for row in rows {
            let params: Vec<_> = row.iter().map(param).collect();
            let params: Vec<&(dyn ToSql + Sync)> = params.iter().map(|p| p.as_ref()).collect();
            txn.execute(&stmt, &params).map_err(err)?;
        }
        txn.commit().map_err(err)
    }
}
