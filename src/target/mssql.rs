// Copyright 2023 Daniel Harrison. All Rights Reserved.

use std::borrow::Cow;

use log::debug;
use tiberius::{AuthMethod, Client, ColumnData, Config, ToSql};
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

use crate::config::ConnectConfig;
use crate::dialect::{Dialect, InsertPlan, TableSchema};
use crate::load::Target;
use crate::value::{Kind, Value};
use crate::Error;

use super::reset_statements;

type TdsClient = Client<Compat<TcpStream>>;
type TdsError = tiberius::error::Error;

/// A [Target] backed by a SQL Server connection.
///
/// The driver is async. It runs on a private current-thread runtime and
/// every call blocks until it completes.
pub struct MsSqlTarget {
    runtime: Runtime,
    client: TdsClient,
}

impl std::fmt::Debug for MsSqlTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MsSqlTarget").finish_non_exhaustive()
    }
}

impl MsSqlTarget {
    /// Connects, first creating the database through `master` if it doesn't
    /// exist.
    pub fn connect(config: &ConnectConfig) -> Result<Self, Error> {
        let database = valid_identifier(&config.database)?;
        let connect_err = |err: TdsError| Error::Connect(err.to_string());
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| Error::Connect(err.to_string()))?;
        let client = runtime.block_on(async {
            let mut master = open(config, "master").await?;
            let sql = format!("IF DB_ID(N'{0}') IS NULL CREATE DATABASE [{0}]", database);
            debug!("{}", sql);
            master
                .simple_query(sql)
                .await
                .map_err(connect_err)?
                .into_results()
                .await
                .map_err(connect_err)?;
            master.close().await.map_err(connect_err)?;
            open(config, database).await
        })?;
        Ok(MsSqlTarget { runtime, client })
    }
}

async fn open(config: &ConnectConfig, database: &str) -> Result<TdsClient, Error> {
    let mut tds = Config::new();
    tds.host(&config.host);
    tds.port(config.port);
    tds.database(database);
    tds.authentication(AuthMethod::sql_server(&config.user, &config.password));
    // Local containers use self-signed certificates.
    tds.trust_cert();
    let tcp = TcpStream::connect(tds.get_addr())
        .await
        .map_err(|err| Error::Connect(err.to_string()))?;
    tcp.set_nodelay(true)
        .map_err(|err| Error::Connect(err.to_string()))?;
    Client::connect(tds, tcp.compat_write())
        .await
        .map_err(|err| Error::Connect(err.to_string()))
}

/// The database name is spliced into DDL, so it must be a plain identifier.
fn valid_identifier(name: &str) -> Result<&str, Error> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && name.len() <= 128;
    if valid {
        Ok(name)
    } else {
        Err(Error::Config(format!("invalid database name: {:?}", name)))
    }
}

async fn batch(client: &mut TdsClient, sql: &str) -> Result<(), TdsError> {
    client.simple_query(sql).await?.into_results().await?;
    Ok(())
}

fn null(kind: Kind) -> ColumnData<'static> {
    match kind {
        Kind::Bool => ColumnData::Bit(None),
        Kind::I16 => ColumnData::I16(None),
        Kind::I32 => ColumnData::I32(None),
        Kind::I64 => ColumnData::I64(None),
        Kind::F32 => ColumnData::F32(None),
        Kind::F64 => ColumnData::F64(None),
        Kind::Decimal => ColumnData::Numeric(None),
        Kind::Bytes => ColumnData::Binary(None),
        Kind::Uuid => ColumnData::Guid(None),
        Kind::Date => ColumnData::Date(None),
        Kind::Time => ColumnData::Time(None),
        Kind::Timestamp => ColumnData::DateTime2(None),
        Kind::TimestampTz => ColumnData::DateTimeOffset(None),
        _ => ColumnData::String(None),
    }
}

/// Converts an encoded value to the driver's wire value. Anything the SQL
/// Server dialect should have encoded away is rejected.
fn column_data(value: &Value) -> Result<ColumnData<'_>, String> {
    let ret = match value {
        Value::Null(kind) => null(*kind),
        Value::Bool(x) => ColumnData::Bit(Some(*x)),
        Value::I16(x) => ColumnData::I16(Some(*x)),
        Value::I32(x) => ColumnData::I32(Some(*x)),
        Value::I64(x) => ColumnData::I64(Some(*x)),
        Value::F32(x) => ColumnData::F32(Some(*x)),
        Value::F64(x) => ColumnData::F64(Some(*x)),
        Value::Decimal(x) => x.to_sql(),
        Value::Text(x) => ColumnData::String(Some(Cow::Borrowed(x.as_str()))),
        Value::Bytes(x) => ColumnData::Binary(Some(Cow::Borrowed(x.as_slice()))),
        Value::Uuid(x) => ColumnData::Guid(Some(*x)),
        Value::Date(x) => x.to_sql(),
        Value::Time(x) => x.to_sql(),
        Value::Timestamp(x) => x.to_sql(),
        Value::TimestampTz(x) => x.to_sql(),
        value => return Err(format!("unencoded {:?} parameter", value.kind())),
    };
    Ok(ret)
}

#[derive(Debug)]
struct Param<'a>(ColumnData<'a>);

impl ToSql for Param<'_> {
    fn to_sql(&self) -> ColumnData<'_> {
        self.0.clone()
    }
}

impl Target for MsSqlTarget {
    fn dialect(&self) -> Dialect {
        Dialect::MsSql
    }

    fn reset_table(&mut self, schema: &TableSchema) -> Result<(), Error> {
        let stmts = reset_statements(schema);
        let client = &mut self.client;
        self.runtime
            .block_on(async move {
                for stmt in stmts {
                    debug!("{}", stmt);
                    batch(client, &stmt).await?;
                }
                Ok::<_, TdsError>(())
            })
            .map_err(|err| Error::schema(schema.table, err))
    }

    fn write_batch(
        &mut self,
        plan: &InsertPlan,
        batch_idx: usize,
        rows: &[Vec<Value>],
    ) -> Result<(), Error> {
        let params = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|v| column_data(v).map(Param))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| Error::insert(plan.table(), batch_idx, err))?;

        let client = &mut self.client;
        self.runtime
            .block_on(async move {
                batch(client, "BEGIN TRAN").await?;
                let inserted = async {
                    for row in params.iter() {
                        let row: Vec<&dyn ToSql> = row.iter().map(|p| p as &dyn ToSql).collect();
                        client.execute(plan.sql(), &row).await?;
                    }
                    Ok::<_, TdsError>(())
                }
                .await;
                match inserted {
                    Ok(()) => batch(client, "COMMIT").await,
                    Err(err) => {
                        // The session is abandoned on error, but don't leave
                        // the transaction open on the server.
                        let _ = batch(client, "IF @@TRANCOUNT > 0 ROLLBACK").await;
                        Err(err)
                    }
                }
            })
            .map_err(|err| Error::insert(plan.table(), batch_idx, err))
    }
}
