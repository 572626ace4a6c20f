// Copyright 2023 Daniel Harrison. All Rights Reserved.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use log::{debug, warn};
use oracle::sql_type::ToSql;
use oracle::Connection;

use crate::config::ConnectConfig;
use crate::dialect::{Dialect, InsertPlan, TableSchema};
use crate::load::Target;
use crate::value::{Kind, Value};
use crate::Error;

/// A [Target] backed by an Oracle connection.
pub struct OracleTarget {
    conn: Connection,
}

impl std::fmt::Debug for OracleTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleTarget").finish_non_exhaustive()
    }
}

impl OracleTarget {
    /// Connects with an easy connect string, using the configured database as
    /// the service name.
    pub fn connect(config: &ConnectConfig) -> Result<Self, Error> {
        let connect_string = format!("//{}:{}/{}", config.host, config.port, config.database);
        let conn = Connection::connect(&config.user, &config.password, connect_string)
            .map_err(|err| Error::Connect(err.to_string()))?;
        Ok(OracleTarget { conn })
    }
}

/// Converts an encoded value to a bind parameter. Anything the Oracle
/// dialect should have encoded away is rejected.
fn param(value: &Value) -> Result<Box<dyn ToSql>, String> {
    let ret: Box<dyn ToSql> = match value {
        Value::Null(kind) => match kind {
            Kind::I16 | Kind::Bool => Box::new(None::<i16>),
            Kind::I32 => Box::new(None::<i32>),
            Kind::I64 => Box::new(None::<i64>),
            Kind::F32 => Box::new(None::<f32>),
            Kind::F64 | Kind::Decimal => Box::new(None::<f64>),
            Kind::Bytes => Box::new(None::<Vec<u8>>),
            Kind::Date => Box::new(None::<NaiveDate>),
            Kind::Time | Kind::Timestamp => Box::new(None::<NaiveDateTime>),
            Kind::TimestampTz => Box::new(None::<DateTime<Utc>>),
            _ => Box::new(None::<String>),
        },
        Value::I16(x) => Box::new(*x),
        Value::I32(x) => Box::new(*x),
        Value::I64(x) => Box::new(*x),
        Value::F32(x) => Box::new(*x),
        Value::F64(x) => Box::new(*x),
        Value::Text(x) => Box::new(x.clone()),
        Value::Bytes(x) => Box::new(x.clone()),
        Value::Date(x) => Box::new(*x),
        Value::Timestamp(x) => Box::new(*x),
        Value::TimestampTz(x) => Box::new(*x),
        value => return Err(format!("unencoded {:?} parameter", value.kind())),
    };
    Ok(ret)
}

impl Target for OracleTarget {
    fn dialect(&self) -> Dialect {
        Dialect::Oracle
    }

    fn reset_table(&mut self, schema: &TableSchema) -> Result<(), Error> {
        let table = schema.table;
        let err = |err: oracle::Error| Error::schema(table, err);
        // Oracle has no DROP TABLE IF EXISTS before 23ai.
        let upper = table.to_uppercase();
        let existing: i64 = self
            .conn
            .query_row_as(
                "SELECT COUNT(*) FROM user_tables WHERE table_name = :1",
                &[&upper],
            )
            .map_err(err)?;
        if existing > 0 {
            let drop = format!("DROP TABLE {} CASCADE CONSTRAINTS", table);
            debug!("{}", drop);
            self.conn.execute(&drop, &[]).map_err(err)?;
        }

        let mut stmts = schema.statements();
        if let Some(create) = stmts.next() {
            debug!("{}", create);
            self.conn.execute(create, &[]).map_err(err)?;
        }
        // A failed index leaves the table usable, so keep going.
        for index in stmts {
            debug!("{}", index);
            if let Err(err) = self.conn.execute(index, &[]) {
                warn!("[{}] index failed: {}: {}", table, index, err);
            }
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
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| Error::insert(plan.table(), batch, err))?;
        if params.is_empty() {
            return Ok(());
        }

        let err = |err: oracle::Error| Error::insert(plan.table(), batch, err);
        let inserted = (|| {
            let mut stmt = self.conn.batch(plan.sql(), params.len()).build()?;
            for row in params.iter() {
                let row: Vec<&dyn ToSql> = row.iter().map(|p| p.as_ref()).collect();
                stmt.append_row(&row)?;
            }
            stmt.execute()
        })();
        match inserted {
            Ok(()) => self.conn.commit().map_err(err),
            Err(e) => {
                let _ = self.conn.rollback();
                Err(err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params() {
        #[track_caller]
        fn test_case(value: Value, ok: bool) {
            assert_eq!(param(&value).is_ok(), ok, "{:?}", value);
        }

        test_case(Value::Null(Kind::Decimal), true);
        test_case(Value::I16(1), true);
        test_case(Value::Text("+00-03".into()), true);
        test_case(Value::Bytes(vec![0; 16]), true);
        test_case(Value::Bool(true), false);
        test_case(Value::Decimal(rust_decimal::Decimal::ONE), false);
        test_case(Value::Json(serde_json::json!({})), false);
    }
}
