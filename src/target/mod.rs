// Copyright 2023 Daniel Harrison. All Rights Reserved.

//! Sessions against the supported engines.
//!
//! Each engine's driver is behind a cargo feature of the same name.
//! [MemoryTarget] is always available.

use crate::config::ConnectConfig;
#[cfg(any(feature = "mysql", feature = "mssql"))]
use crate::dialect::TableSchema;
use crate::dialect::Dialect;
use crate::load::Target;
use crate::Error;

mod memory;
#[cfg(feature = "mssql")]
mod mssql;
#[cfg(feature = "mysql")]
mod mysql;
#[cfg(feature = "oracle")]
mod oracle;
#[cfg(feature = "postgres")]
mod postgres;

pub use self::memory::{Event, MemoryTable, MemoryTarget};
#[cfg(feature = "mssql")]
pub use self::mssql::MsSqlTarget;
#[cfg(feature = "mysql")]
pub use self::mysql::MySqlTarget;
#[cfg(feature = "oracle")]
pub use self::oracle::OracleTarget;
#[cfg(feature = "postgres")]
pub use self::postgres::PostgresTarget;

/// `DROP TABLE IF EXISTS` followed by the table's DDL statements, in order.
#[cfg(any(feature = "mysql", feature = "mssql"))]
fn reset_statements(schema: &TableSchema) -> Vec<String> {
    let mut stmts = vec![format!("DROP TABLE IF EXISTS {}", schema.table)];
    stmts.extend(schema.statements().map(str::to_owned));
    stmts
}

/// Opens a session against the given engine.
///
/// Returns [Error::Config] if support for the engine was not compiled in.
pub fn connect(dialect: Dialect, config: &ConnectConfig) -> Result<Box<dyn Target>, Error> {
    log::info!(
        "connecting to {} at {}:{} as {}",
        dialect,
        config.host,
        config.port,
        config.user
    );
    match dialect {
        #[cfg(feature = "postgres")]
        Dialect::Postgres => Ok(Box::new(PostgresTarget::connect(config)?)),
        #[cfg(feature = "mysql")]
        Dialect::MySql => Ok(Box::new(MySqlTarget::connect(config)?)),
        #[cfg(feature = "mssql")]
        Dialect::MsSql => Ok(Box::new(MsSqlTarget::connect(config)?)),
        #[cfg(feature = "oracle")]
        Dialect::Oracle => Ok(Box::new(OracleTarget::connect(config)?)),
        #[allow(unreachable_patterns)]
        dialect => Err(Error::Config(format!(
            "{} support is not compiled in, rebuild with --features {}",
            dialect,
            dialect.name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_engine() {
        #[track_caller]
        #[allow(dead_code)]
        fn test_case(dialect: Dialect) {
            match connect(dialect, &ConnectConfig::defaults(dialect)) {
                Err(Error::Config(msg)) => assert!(msg.contains(dialect.name()), "{}", msg),
                Err(err) => panic!("unexpected error: {}", err),
                Ok(_) => panic!("connected to {} without support", dialect),
            }
        }

        #[cfg(not(feature = "postgres"))]
        test_case(Dialect::Postgres);
        #[cfg(not(feature = "mysql"))]
        test_case(Dialect::MySql);
        #[cfg(not(feature = "mssql"))]
        test_case(Dialect::MsSql);
        #[cfg(not(feature = "oracle"))]
        test_case(Dialect::Oracle);
    }

    #[cfg(any(feature = "mysql", feature = "mssql"))]
    #[test]
    fn reset_statements_drop_first() {
        use crate::factory::{Employee, SensorReading};
        use crate::Record;

        #[track_caller]
        fn test_case(dialect: Dialect, table: &str, fields: &[crate::Field]) {
            let schema = TableSchema::new(dialect, table, fields).unwrap();
            let stmts = reset_statements(&schema);
            assert_eq!(stmts[0], format!("DROP TABLE IF EXISTS {}", table));
            assert!(stmts[1].starts_with(&format!("CREATE TABLE {} (", table)));
            let rest: Vec<_> = schema.statements().collect();
            assert_eq!(stmts[1..], rest[..]);
        }

        test_case(Dialect::MySql, "employees", Employee::FIELDS);
        test_case(Dialect::MsSql, "employees", Employee::FIELDS);
        test_case(Dialect::MySql, "sensor_readings", SensorReading::FIELDS);
        test_case(Dialect::MsSql, "sensor_readings", SensorReading::FIELDS);
    }
}
