// Copyright 2023 Daniel Harrison. All Rights Reserved.

//! Connection settings and loader defaults.

use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;

use crate::dialect::Dialect;
use crate::factory::FactoryConfig;
use crate::reference::Reference;
use crate::Error;

/// The default number of rows generated per table.
pub const DEFAULT_ROWS: usize = 5000;

/// The default number of rows committed per transaction.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Where and as whom to connect to an engine.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectConfig {
    #[allow(missing_docs)]
    pub host: String,
    #[allow(missing_docs)]
    pub port: u16,
    #[allow(missing_docs)]
    pub user: String,
    #[allow(missing_docs)]
    pub password: String,
    /// The database to load into. For Oracle this is the service name.
    pub database: String,
}

impl ConnectConfig {
    /// The settings of a stock local container for each engine.
    pub fn defaults(dialect: Dialect) -> Self {
        let (port, user, database) = match dialect {
            Dialect::Postgres => (5432, "sentinel", "citadel"),
            Dialect::MySql => (3306, "sentinel", "citadel"),
            Dialect::MsSql => (1433, "sa", "citadel"),
            Dialect::Oracle => (1521, "sentinel", "FREEPDB1"),
        };
        ConnectConfig {
            host: "localhost".to_owned(),
            port,
            user: user.to_owned(),
            password: "Test_123_Password".to_owned(),
            database: database.to_owned(),
        }
    }
}

// Keep the password out of logs.
impl std::fmt::Debug for ConnectConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

/// Builds a [FactoryConfig] from loader settings.
///
/// `now` is the current wall clock unless `fixed_now` is set, in which case
/// rows are reproducible across runs with the same seed. `reference`, if
/// given, is a JSON file overriding some or all of the built-in vocabulary.
pub fn factory_config(
    num_rows: usize,
    batch_size: usize,
    seed: u64,
    fixed_now: bool,
    reference: Option<&Path>,
) -> Result<FactoryConfig, Error> {
    let max_rows_per_batch = NonZeroUsize::new(batch_size)
        .ok_or_else(|| Error::Config("batch size must be at least 1".to_owned()))?;
    let mut config = FactoryConfig::fixed(num_rows, max_rows_per_batch);
    config.seed = seed;
    if !fixed_now {
        config.now = chrono::Utc::now();
    }
    if let Some(path) = reference {
        config.reference = Arc::new(Reference::from_path(path)?);
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        #[track_caller]
        fn test_case(dialect: Dialect, port: u16, user: &str, database: &str) {
            let config = ConnectConfig::defaults(dialect);
            assert_eq!(config.host, "localhost");
            assert_eq!(config.port, port);
            assert_eq!(config.user, user);
            assert_eq!(config.password, "Test_123_Password");
            assert_eq!(config.database, database);
        }

        test_case(Dialect::Postgres, 5432, "sentinel", "citadel");
        test_case(Dialect::MySql, 3306, "sentinel", "citadel");
        test_case(Dialect::MsSql, 1433, "sa", "citadel");
        test_case(Dialect::Oracle, 1521, "sentinel", "FREEPDB1");
    }

    #[test]
    fn debug_redacts_password() {
        let debug = format!("{:?}", ConnectConfig::defaults(Dialect::MySql));
        assert!(!debug.contains("Test_123_Password"), "{}", debug);
        assert!(debug.contains("sentinel"));
    }

    #[test]
    fn factory_configs() {
        let config = factory_config(DEFAULT_ROWS, DEFAULT_BATCH_SIZE, 7, true, None).unwrap();
        assert_eq!(config.num_rows, 5000);
        assert_eq!(config.max_rows_per_batch.get(), 500);
        assert_eq!(config.seed, 7);
        assert_eq!(config.now.timestamp(), FactoryConfig::OCT_1_2025_NOON);

        assert!(matches!(
            factory_config(10, 0, 0, true, None),
            Err(Error::Config(_))
        ));
        assert!(factory_config(10, 1, 0, true, Some(Path::new("/nonexistent.json"))).is_err());
    }
}
