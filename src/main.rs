// Copyright 2023 Daniel Harrison. All Rights Reserved.

//! Seeds a database with reproducible synthetic data.

use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use seedz::config::{factory_config, ConnectConfig, DEFAULT_BATCH_SIZE, DEFAULT_ROWS};
use seedz::dialect::{Dialect, InsertPlan, TableSchema};
use seedz::factory::{Factory, FactoryConfig, TABLES};
use seedz::load::{run, RunReport};
use seedz::serde::{EncodedRows, Rows};
use seedz::target::{connect, MemoryTarget};
use seedz::{Record, Set, Table, TableFnMut};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Drops, recreates, and fills every table on one engine
    Load {
        /// postgres, mysql, mssql, or oracle
        engine: Dialect,

        #[command(flatten)]
        conn: ConnArgs,

        #[command(flatten)]
        data: DataArgs,

        /// Generate and encode everything, but keep it in memory
        #[arg(long)]
        dry_run: bool,
    },

    /// Prints one table's rows as JSON
    Dump {
        /// invoices, employees, sensor_readings, or product_catalog
        table: String,

        #[command(flatten)]
        data: DataArgs,

        /// Print the values as encoded for this engine
        #[arg(long)]
        engine: Option<Dialect>,
    },
}

/// Overrides of the engine's default connection settings.
#[derive(Args)]
struct ConnArgs {
    #[arg(long, env = "SEEDZ_HOST")]
    host: Option<String>,

    #[arg(long, env = "SEEDZ_PORT")]
    port: Option<u16>,

    #[arg(long, env = "SEEDZ_USER")]
    user: Option<String>,

    #[arg(long, env = "SEEDZ_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Database to load into (the service name for oracle)
    #[arg(long, env = "SEEDZ_DATABASE")]
    database: Option<String>,
}

impl ConnArgs {
    fn resolve(self, engine: Dialect) -> ConnectConfig {
        let defaults = ConnectConfig::defaults(engine);
        ConnectConfig {
            host: self.host.unwrap_or(defaults.host),
            port: self.port.unwrap_or(defaults.port),
            user: self.user.unwrap_or(defaults.user),
            password: self.password.unwrap_or(defaults.password),
            database: self.database.unwrap_or(defaults.database),
        }
    }
}

#[derive(Args)]
struct DataArgs {
    /// Rows per table
    #[arg(long, default_value_t = DEFAULT_ROWS)]
    rows: usize,

    /// Rows per transaction
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// The same seed generates the same rows
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Date everything relative to a fixed instant instead of now
    #[arg(long)]
    fixed_now: bool,

    /// JSON file overriding the built-in reference lists
    #[arg(long, value_name = "FILE")]
    reference: Option<PathBuf>,
}

impl DataArgs {
    fn factory_config(&self) -> anyhow::Result<FactoryConfig> {
        factory_config(
            self.rows,
            self.batch_size,
            self.seed,
            self.fixed_now,
            self.reference.as_deref(),
        )
        .context("invalid dataset configuration")
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Load {
            engine,
            conn,
            data,
            dry_run,
        } => load(engine, conn, data, dry_run),
        Command::Dump {
            table,
            data,
            engine,
        } => dump(&table, data, engine),
    }
}

fn load(engine: Dialect, conn: ConnArgs, data: DataArgs, dry_run: bool) -> anyhow::Result<()> {
    let factory = Factory::init(data.factory_config()?);
    let start = Instant::now();
    let report = if dry_run {
        run(&mut MemoryTarget::new(engine), &factory)
    } else {
        let config = conn.resolve(engine);
        let mut target = connect(engine, &config).with_context(|| {
            format!(
                "connecting to {} at {}:{}",
                engine, config.host, config.port
            )
        })?;
        run(&mut target, &factory)
    }
    .with_context(|| format!("loading {}", engine))?;
    print_report(engine, &report, start);
    Ok(())
}

fn print_report(engine: Dialect, report: &RunReport, start: Instant) {
    for table in &report.tables {
        println!(
            "{:<16} {:>8} rows {:>6} batches",
            table.table, table.rows, table.batches
        );
    }
    println!(
        "Loaded {} rows into {} in {:.1?}",
        report.rows(),
        engine,
        start.elapsed()
    );
}

fn dump(table: &str, data: DataArgs, engine: Option<Dialect>) -> anyhow::Result<()> {
    let factory = Factory::init(data.factory_config()?);
    let mut dump = Dump {
        out: std::io::stdout().lock(),
        engine,
    };
    factory
        .table(table, &mut dump)
        .with_context(|| format!("expected one of {}", TABLES.join(", ")))??;
    Ok(())
}

struct Dump<W> {
    out: W,
    engine: Option<Dialect>,
}

impl<W: Write> TableFnMut<anyhow::Result<()>> for Dump<W> {
    fn call_mut<T: Table>(&mut self, table: T) -> anyhow::Result<()> {
        match self.engine {
            None => serde_json::to_writer_pretty(&mut self.out, &Rows(&table))?,
            Some(dialect) => {
                let fields = <T::Record as Record>::FIELDS;
                let schema = TableSchema::new(dialect, table.name(), fields)?;
                let plan = InsertPlan::new(dialect, &schema, fields)?;
                serde_json::to_writer_pretty(&mut self.out, &EncodedRows(&table, &plan))?
            }
        }
        writeln!(self.out)?;
        Ok(())
    }
}
