// Copyright 2023 Daniel Harrison. All Rights Reserved.

//! A small manufacturing business: invoices, staff, plant telemetry, and the
//! product catalog.
//!
//! The four tables are independent. Identifiers that look like references
//! (`customer_id`, `project_ids`, `compatible_skus`) are drawn at random and
//! do not point at rows of any other table.

use std::net::{IpAddr, Ipv4Addr};
use std::num::NonZeroUsize;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use rand::distributions::uniform::SampleUniform;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::reference::Reference;
use crate::value::MacAddr;
use crate::{Error, Set, TableFnMut};

mod employee;
mod invoice;
mod product;
mod sensor;

pub use self::employee::{
    Address, EmergencyContact, Employee, Employees, EmploymentType, Gender, Preferences,
};
pub use self::invoice::{Invoice, InvoiceMetadata, InvoiceStatus, Invoices, LineItem, QualityMetrics};
pub use self::product::{
    Product, ProductCatalog, SeoMetadata, ShippingInfo, Specifications, SupplierInfo,
};
pub use self::sensor::{AlertConfig, DeviceMetadata, SensorReading, SensorReadings};

/// Configuration for [Factory].
#[derive(Debug, Clone)]
pub struct FactoryConfig {
    /// The number of rows in each table.
    pub num_rows: usize,
    /// The maximum number of rows to include in any given batch.
    pub max_rows_per_batch: NonZeroUsize,
    /// Mixed into every row's random state. The same seed yields the same
    /// rows.
    pub seed: u64,
    /// The value to use as the data generation time. Relative dates ("within
    /// the last 30 days") are relative to this.
    pub now: DateTime<Utc>,
    /// The vocabulary to draw from.
    pub reference: Arc<Reference>,
}

impl FactoryConfig {
    /// 2025-10-01T12:00:00Z as seconds since the unix epoch.
    pub const OCT_1_2025_NOON: i64 = 1_759_320_000;

    /// A fully deterministic configuration for testing convenience: seed 0,
    /// [Self::OCT_1_2025_NOON], and the default [Reference].
    pub fn fixed(num_rows: usize, max_rows_per_batch: NonZeroUsize) -> Self {
        FactoryConfig {
            num_rows,
            max_rows_per_batch,
            seed: 0,
            now: Utc
                .timestamp_opt(Self::OCT_1_2025_NOON, 0)
                .single()
                .unwrap_or_default(),
            reference: Arc::new(Reference::default()),
        }
    }
}

/// The names of the tables in [Factory], in declaration order.
pub const TABLES: [&str; 4] = [
    Invoices::NAME,
    Employees::NAME,
    SensorReadings::NAME,
    ProductCatalog::NAME,
];

/// A synthetic dataset for a small manufacturing business.
#[derive(Debug, Clone)]
pub struct Factory {
    config: FactoryConfig,
}

impl Factory {
    /// The configuration this dataset was constructed with.
    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    /// Calls `f` with the named table.
    pub fn table<R, F: TableFnMut<R>>(&self, name: &str, f: &mut F) -> Result<R, Error> {
        let config = self.config.clone();
        let ret = match name {
            Invoices::NAME => f.call_mut(Invoices::init(config)),
            Employees::NAME => f.call_mut(Employees::init(config)),
            SensorReadings::NAME => f.call_mut(SensorReadings::init(config)),
            ProductCatalog::NAME => f.call_mut(ProductCatalog::init(config)),
            _ => return Err(Error::UnknownTable(name.to_owned())),
        };
        Ok(ret)
    }
}

impl Set for Factory {
    type Config = FactoryConfig;

    fn init(config: Self::Config) -> Self {
        Factory { config }
    }

    fn tables<E, F: TableFnMut<Result<(), E>>>(&self, f: &mut F) -> Result<(), E> {
        f.call_mut(Invoices::init(self.config.clone()))?;
        f.call_mut(Employees::init(self.config.clone()))?;
        f.call_mut(SensorReadings::init(self.config.clone()))?;
        f.call_mut(ProductCatalog::init(self.config.clone()))?;
        Ok(())
    }
}

/// Implements the boilerplate shared by every table in this module.
macro_rules! factory_table {
    ($table:ident, $name:literal, $salt:literal) => {
        impl $table {
            /// The name of this table.
            pub const NAME: &'static str = $name;

            /// Construct an instance of this table with the given configuration.
            pub fn init(config: $crate::factory::FactoryConfig) -> Self {
                $table { config }
            }

            fn rng(&self, idx: usize) -> rand::rngs::SmallRng {
                $crate::factory::row_rng(self.config.seed, $salt, idx)
            }
        }

        impl $crate::DynTable for $table {
            fn name(&self) -> &'static str {
                $name
            }

            fn num_rows(&self) -> usize {
                self.config.num_rows
            }

            fn max_rows_per_batch(&self) -> std::num::NonZeroUsize {
                self.config.max_rows_per_batch
            }
        }
    };
}
use factory_table;

/// Declares an enumeration stored as its text label.
macro_rules! label_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $label:literal,)* }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[allow(missing_docs)]
        pub enum $name { $($variant,)* }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)*];

            /// The label stored in the database.
            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)*
                }
            }

            fn choose<R: rand::Rng>(rng: &mut R) -> Self {
                Self::ALL[rng.gen_range(0..Self::ALL.len())]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl $crate::value::ToValue for $name {
            const KIND: $crate::value::Kind = $crate::value::Kind::Text;

            fn to_value(&self) -> Result<$crate::value::Value, $crate::Error> {
                Ok($crate::value::Value::Text(self.label().to_owned()))
            }
        }
    };
}
use label_enum;

/// Seeds the random state of one row of one table.
///
/// Each part is fully mixed before the next is folded in.
fn row_rng(seed: u64, salt: u64, idx: usize) -> SmallRng {
    let state = splitmix64(splitmix64(splitmix64(seed) ^ salt) ^ idx as u64);
    SmallRng::seed_from_u64(state)
}

/// The SplitMix64 finalizer, a bijection on u64.
fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

const ALPHANUMERIC: &[char] = &[
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's',
    't', 'u', 'v', 'w', 'x', 'y', 'z', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L',
    'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '0', '1', '2', '3', '4',
    '5', '6', '7', '8', '9',
];

/// Returns a number within [min, max] inclusive.
fn rand_int<R: Rng, T: SampleUniform + PartialOrd>(rng: &mut R, min: T, max: T) -> T {
    rng.gen_range(min..=max)
}

/// Returns a float within [min, max) rounded to `dp` decimal places.
fn rand_float<R: Rng>(rng: &mut R, min: f64, max: f64, dp: i32) -> f64 {
    round_f64(rng.gen_range(min..max), dp)
}

fn round_f64(x: f64, dp: i32) -> f64 {
    let scale = 10f64.powi(dp);
    (x * scale).round() / scale
}

/// Returns an exact decimal within [min, max] with `dp` decimal places.
fn rand_decimal<R: Rng>(rng: &mut R, min: i64, max: i64, dp: u32) -> Decimal {
    let scale = 10i64.pow(dp);
    Decimal::new(rand_int(rng, min * scale, max * scale), dp)
}

/// Returns true with probability `p`.
fn flip<R: Rng>(rng: &mut R, p: f64) -> bool {
    rng.gen_bool(p)
}

/// Appends a random string of length `len` from the given alphabet.
fn rand_string<R: Rng>(rng: &mut R, alphabet: &[char], len: usize, x: &mut String) {
    for _ in 0..len {
        x.push(alphabet[rng.gen_range(0..alphabet.len())]);
    }
}

fn rand_alphanumeric<R: Rng>(rng: &mut R, len: usize) -> String {
    let mut x = String::with_capacity(len);
    rand_string(rng, ALPHANUMERIC, len, &mut x);
    x
}

/// Picks one entry of a reference list.
fn pick<'a, R: Rng>(rng: &mut R, list: &'a [String]) -> &'a str {
    list.choose(rng).map(String::as_str).unwrap_or_default()
}

/// Picks one of a fixed set of choices.
fn pick_str<R: Rng>(rng: &mut R, list: &[&'static str]) -> &'static str {
    list.choose(rng).copied().unwrap_or_default()
}

/// Samples `len` distinct entries (fewer if the list is shorter).
fn sample<R: Rng, T: AsRef<str>>(rng: &mut R, list: &[T], len: usize) -> Vec<String> {
    list.choose_multiple(rng, len)
        .map(|x| x.as_ref().to_owned())
        .collect()
}

fn rand_bytes<R: Rng>(rng: &mut R, len: usize) -> Vec<u8> {
    let mut x = vec![0u8; len];
    rng.fill(x.as_mut_slice());
    x
}

fn rand_uuid<R: Rng>(rng: &mut R) -> Uuid {
    uuid::Builder::from_random_bytes(rng.gen()).into_uuid()
}

/// A private address in 10.0.0.1..=10.255.255.255.
fn rand_ipv4<R: Rng>(rng: &mut R) -> IpAddr {
    IpAddr::V4(Ipv4Addr::from(rand_int(rng, 0x0A00_0001u32, 0x0AFF_FFFF)))
}

fn rand_mac<R: Rng>(rng: &mut R) -> MacAddr {
    MacAddr(rng.gen())
}

fn rand_semver<R: Rng>(rng: &mut R) -> String {
    format!(
        "{}.{}.{}",
        rand_int(rng, 0, 9),
        rand_int(rng, 0, 99),
        rand_int(rng, 0, 999)
    )
}

/// A date in the given years. Days stop at 28 so every month is valid.
fn rand_date<R: Rng>(rng: &mut R, min_year: i32, max_year: i32) -> NaiveDate {
    let year = rand_int(rng, min_year, max_year);
    let month = rand_int(rng, 1, 12);
    let day = rand_int(rng, 1, 28);
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn rand_time<R: Rng>(rng: &mut R) -> NaiveTime {
    let h = rand_int(rng, 0, 23);
    let m = rand_int(rng, 0, 59);
    let s = rand_int(rng, 0, 59);
    NaiveTime::from_hms_opt(h, m, s).unwrap_or_default()
}

fn days(n: i64) -> chrono::Duration {
    chrono::Duration::days(n)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashSet;

    use crate::{Record, Table};

    use super::*;

    pub(crate) fn config(num_rows: usize) -> FactoryConfig {
        FactoryConfig::fixed(num_rows, NonZeroUsize::new(7).unwrap())
    }

    /// Checks the properties every table shares.
    pub(crate) fn check_table<T>(table: T)
    where
        T: Table,
        T::Record: std::fmt::Debug + PartialEq,
    {
        // Pure function of index.
        for idx in [0, 1, 2, 50, 99] {
            assert_eq!(table.gen_row(idx), table.gen_row(idx));
        }
        assert_ne!(table.gen_row(0), table.gen_row(1));

        // Batches cover every index once, in order, and agree with gen_row.
        let mut batch = Vec::new();
        let mut rows = 0;
        for batch_idx in 0..table.num_batches() {
            table.gen_batch(batch_idx, &mut batch);
            assert!(!batch.is_empty());
            assert!(batch.len() <= table.max_rows_per_batch().get());
            assert_eq!(batch[0], table.gen_row(rows));
            rows += batch.len();
        }
        assert_eq!(rows, table.num_rows());
        table.gen_batch(table.num_batches(), &mut batch);
        assert!(batch.is_empty());

        // Values line up with the declared fields.
        let fields = <T::Record as Record>::FIELDS;
        let names: HashSet<_> = fields.iter().map(|f| f.name).collect();
        assert_eq!(names.len(), fields.len());
        for idx in 0..table.num_rows() {
            let values = table.gen_row(idx).values().unwrap();
            assert_eq!(values.len(), fields.len());
            for (field, value) in fields.iter().zip(values.iter()) {
                assert_eq!(field.kind, value.kind(), "{}", field.name);
            }
        }
    }

    /// Checks that `pred` holds for about `expected` of the table's rows.
    #[track_caller]
    pub(crate) fn check_rate<T, F>(table: &T, name: &str, expected: f64, pred: F)
    where
        T: Table,
        F: Fn(&T::Record) -> bool,
    {
        let num_rows = table.num_rows();
        let hits = (0..num_rows).filter(|idx| pred(&table.gen_row(*idx))).count();
        let actual = hits as f64 / num_rows as f64;
        assert!(
            (actual - expected).abs() < 0.03,
            "{}: expected ~{} got {}",
            name,
            expected,
            actual
        );
    }

    #[test]
    fn tables_in_order() {
        struct Names(Vec<&'static str>);
        impl TableFnMut<Result<(), ()>> for Names {
            fn call_mut<T: Table>(&mut self, table: T) -> Result<(), ()> {
                self.0.push(table.name());
                Ok(())
            }
        }

        let factory = Factory::init(config(1));
        let mut names = Names(Vec::new());
        factory.tables(&mut names).unwrap();
        assert_eq!(names.0, TABLES);

        struct NumRows;
        impl TableFnMut<usize> for NumRows {
            fn call_mut<T: Table>(&mut self, table: T) -> usize {
                table.num_rows()
            }
        }
        assert_eq!(factory.table("employees", &mut NumRows).unwrap(), 1);
        assert!(matches!(
            factory.table("nope", &mut NumRows),
            Err(Error::UnknownTable(_))
        ));
    }

    #[test]
    fn seed_changes_rows() {
        let a = Invoices::init(config(1));
        let b = Invoices::init(FactoryConfig {
            seed: 1,
            ..config(1)
        });
        assert_ne!(a.gen_row(0), b.gen_row(0));
        // Tables with the same seed don't share random streams.
        let x = row_rng(0, 1, 0).gen::<u64>();
        let y = row_rng(0, 2, 0).gen::<u64>();
        assert_ne!(x, y);

        #[track_caller]
        fn test_case(a: (u64, usize), b: (u64, usize)) {
            let x = row_rng(a.0, 0x1111_0001, a.1).gen::<u64>();
            let y = row_rng(b.0, 0x1111_0001, b.1).gen::<u64>();
            assert_ne!(x, y, "{:?} vs {:?}", a, b);
        }

        // Neighboring seeds and indexes get unrelated streams.
        test_case((0x9E37_79B9_7F4A_7C15, 0), (0, 1));
        test_case((1, 0), (0, 1));
        test_case((1, 1), (0, 0));
        test_case((0x1111_0001, 0), (0, 0));
        let a = Invoices::init(FactoryConfig {
            seed: 0x9E37_79B9_7F4A_7C15,
            ..config(2)
        });
        let b = Invoices::init(config(2));
        assert_ne!(
            a.gen_row(0).digital_signature,
            b.gen_row(1).digital_signature
        );
    }

    #[test]
    fn helpers() {
        let mut rng = row_rng(0, 0, 0);
        for _ in 0..1000 {
            let d = rand_decimal(&mut rng, 10, 20, 2);
            assert!(d >= Decimal::new(1000, 2) && d <= Decimal::new(2000, 2));
            assert_eq!(d.scale(), 2);

            let f = rand_float(&mut rng, 0.0, 1.0, 3);
            assert_eq!(round_f64(f, 3), f);

            let IpAddr::V4(ip) = rand_ipv4(&mut rng) else {
                panic!("expected ipv4");
            };
            assert_eq!(ip.octets()[0], 10);
        }
        assert_eq!(sample(&mut rng, &["a", "b"], 5).len(), 2);
        assert_eq!(pick(&mut rng, &[]), "");
    }
}
