// Copyright 2023 Daniel Harrison. All Rights Reserved.

use chrono::{Datelike, NaiveDateTime, NaiveTime, Timelike};
use log::debug;
use mysql::prelude::Queryable;
use mysql::{Conn, OptsBuilder, Params, TxOpts};

use crate::config::ConnectConfig;
use crate::dialect::{Dialect, InsertPlan, TableSchema};
use crate::load::Target;
use crate::value::Value;
use crate::Error;

use super::reset_statements;

/// A [Target] backed by a MySQL connection.
pub struct MySqlTarget {
    conn: Conn,
}

impl std::fmt::Debug for MySqlTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlTarget")
            .field("connection_id", &self.conn.connection_id())
            .finish()
    }
}

impl MySqlTarget {
    #[allow(missing_docs)]
    pub fn connect(config: &ConnectConfig) -> Result<Self, Error> {
        let opts = OptsBuilder::new()
            .ip_or_hostname(Some(config.host.as_str()))
            .tcp_port(config.port)
            .user(Some(config.user.as_str()))
            .pass(Some(config.password.as_str()))
            .db_name(Some(config.database.as_str()));
        let conn = Conn::new(opts).map_err(|err| Error::Connect(err.to_string()))?;
        Ok(MySqlTarget { conn })
    }
}

fn micros(t: &NaiveTime) -> u32 {
    // Leap seconds carry past one second.
    std::cmp::min(t.nanosecond() / 1000, 999_999)
}

fn datetime(x: &NaiveDateTime) -> mysql::Value {
    mysql::Value::Date(
        x.year() as u16,
        x.month() as u8,
        x.day() as u8,
        x.hour() as u8,
        x.minute() as u8,
        x.second() as u8,
        micros(&x.time()),
    )
}

/// Converts an encoded value to the driver's wire value. Anything the MySQL
/// dialect should have encoded away is rejected.
fn param(value: &Value) -> Result<mysql::Value, String> {
    let ret = match value {
        Value::Null(_) => mysql::Value::NULL,
        Value::Bool(x) => mysql::Value::Int(i64::from(*x)),
        Value::I16(x) => mysql::Value::Int(i64::from(*x)),
        Value::I32(x) => mysql::Value::Int(i64::from(*x)),
        Value::I64(x) => mysql::Value::Int(*x),
        Value::F32(x) => mysql::Value::Float(*x),
        Value::F64(x) => mysql::Value::Double(*x),
        // Exact decimals go over the wire as their text.
        Value::Decimal(x) => mysql::Value::Bytes(x.to_string().into_bytes()),
        Value::Text(x) => mysql::Value::Bytes(x.clone().into_bytes()),
        Value::Bytes(x) => mysql::Value::Bytes(x.clone()),
        Value::Date(x) => {
            mysql::Value::Date(x.year() as u16, x.month() as u8, x.day() as u8, 0, 0, 0, 0)
        }
        Value::Time(x) => mysql::Value::Time(
            false,
            0,
            x.hour() as u8,
            x.minute() as u8,
            x.second() as u8,
            micros(x),
        ),
        Value::Timestamp(x) => datetime(x),
        value => return Err(format!("unencoded {:?} parameter", value.kind())),
    };
    Ok(ret)
}

impl Target for MySqlTarget {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn reset_table(&mut self, schema: &TableSchema) -> Result<(), Error> {
        for stmt in reset_statements(schema) {
            debug!("{}", stmt);
            self.conn
                .query_drop(stmt.as_str())
                .map_err(|err| Error::schema(schema.table, err))?;
        }
        Ok(())
    }

    fn write_batch(
        &mut self,
        plan: &InsertPlan,
        batch: usize,
        rows: &[Vec<Value>],
    ) -> Result<(), Error> {
        let params = rows
            .iter()
            .map(|row| row.iter().map(param).collect::<Result<Vec<_>, _>>())
            .map(|row| row.map(Params::Positional))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| Error::insert(plan.table(), batch, err))?;

        let err = |err: mysql::Error| Error::insert(plan.table(), batch, err);
        let mut txn = self.conn.start_transaction(TxOpts::default()).map_err(err)?;
        let stmt = txn.prep(plan.sql()).map_err(err)?;
        txn.exec_batch(&stmt, params).map_err(err)?;
        txn.commit().map_err(err)
    }
}
