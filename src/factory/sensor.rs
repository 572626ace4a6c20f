// Copyright 2023 Daniel Harrison. All Rights Reserved.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::factory::{
    days, factory_table, flip, pick, pick_str, rand_bytes, rand_decimal, rand_float, rand_int,
    rand_semver, rand_string, rand_uuid, sample, FactoryConfig,
};
use crate::value::Json;
use crate::Table;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct DeviceMetadata {
    pub manufacturer: &'static str,
    pub model: String,
    pub install_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct AlertConfig {
    pub temp_high: f64,
    pub temp_low: f64,
    pub notify: &'static str,
}

record! {
    /// One sample from a plant sensor.
    ///
    /// `reading_date` and `reading_time` are the parts of `reading_timestamp`
    /// and `server_received_at` is always later than it.
    #[derive(Debug, Clone, PartialEq)]
    #[allow(missing_docs)]
    pub struct SensorReading {
        pub reading_uuid: Uuid,
        pub device_id: String,
        pub device_serial: String,
        pub firmware_version: String,
        pub temperature_c: Decimal,
        pub humidity_pct: Decimal,
        pub pressure_hpa: Decimal,
        pub voltage: f32,
        pub current_amps: f64,
        pub power_watts: Decimal,
        pub latitude: Decimal,
        pub longitude: Decimal,
        pub altitude_m: f32,
        pub signal_strength_dbm: i16,
        pub error_code: i32,
        pub uptime_seconds: i64,
        /// Only MSSQL has a column for this.
        pub calibration_cost: Decimal,
        pub is_anomaly: bool,
        pub is_calibrated: bool,
        pub battery_low: bool,
        pub reading_timestamp: DateTime<Utc>,
        pub server_received_at: DateTime<Utc>,
        pub reading_date: NaiveDate,
        pub reading_time: NaiveTime,
        pub tag_ids: Vec<i32>,
        pub sensor_labels: Vec<String>,
        pub raw_samples: Vec<f64>,
        pub device_metadata: Json<DeviceMetadata>,
        pub alert_config: Json<AlertConfig>,
        pub raw_payload: Vec<u8>,
        /// Fixed width digest. Only MSSQL and Oracle have a column for this.
        pub checksum: Vec<u8>,
        pub location_name: String,
        pub notes: Option<String>,
    }
}

/// The `sensor_readings` table.
#[derive(Debug, Clone)]
pub struct SensorReadings {
    config: FactoryConfig,
}

factory_table!(SensorReadings, "sensor_readings", 0x3333_0003);

const UPPER_ALPHANUMERIC: &[char] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S',
    'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];
const ERROR_CODES: &[i32] = &[0, 0, 0, 0, 1, 2, 3, 99];
const LABELS: &[&str] = &[
    "temp",
    "humidity",
    "pressure",
    "vibration",
    "acoustic",
    "light",
];
const MANUFACTURERS: &[&str] = &["Bosch", "Siemens", "Honeywell", "ABB"];
const NOTIFY: &[&str] = &["email", "sms", "slack"];

impl Table for SensorReadings {
    type Record = SensorReading;

    fn gen_row(&self, idx: usize) -> SensorReading {
        let mut rng = self.rng(idx);
        let now = self.config.now;

        let reading_timestamp = now
            - days(rand_int(&mut rng, 0, 90))
            - Duration::hours(rand_int(&mut rng, 0, 23))
            - Duration::minutes(rand_int(&mut rng, 0, 59))
            - Duration::seconds(rand_int(&mut rng, 0, 59));
        let server_received_at =
            reading_timestamp + Duration::milliseconds(rand_int(&mut rng, 50, 2000));

        let mut device_serial = String::with_capacity(16);
        rand_string(&mut rng, UPPER_ALPHANUMERIC, 16, &mut device_serial);
        let tag_ids_len = rand_int(&mut rng, 1, 5);
        let labels_len = rand_int(&mut rng, 1, 4);
        let raw_samples_len = rand_int(&mut rng, 5, 20);
        let raw_payload_len = rand_int(&mut rng, 32, 256);

        SensorReading {
            reading_uuid: rand_uuid(&mut rng),
            device_id: format!("DEV-{:04}", rand_int(&mut rng, 1, 200)),
            device_serial,
            firmware_version: rand_semver(&mut rng),
            temperature_c: rand_decimal(&mut rng, -40, 85, 4),
            humidity_pct: rand_decimal(&mut rng, 0, 100, 3),
            pressure_hpa: rand_decimal(&mut rng, 900, 1100, 4),
            voltage: rand_float(&mut rng, 0.0, 48.0, 3) as f32,
            current_amps: rand_float(&mut rng, 0.0, 10.0, 8),
            power_watts: rand_decimal(&mut rng, 0, 5000, 6),
            latitude: rand_decimal(&mut rng, -90, 90, 7),
            longitude: rand_decimal(&mut rng, -180, 180, 7),
            altitude_m: rand_float(&mut rng, -50.0, 5000.0, 2) as f32,
            signal_strength_dbm: rand_int(&mut rng, -120, 0),
            error_code: ERROR_CODES[rand_int(&mut rng, 0, ERROR_CODES.len() - 1)],
            uptime_seconds: rand_int(&mut rng, 0, 10_000_000),
            calibration_cost: rand_decimal(&mut rng, 10, 200, 4),
            is_anomaly: flip(&mut rng, 0.05),
            is_calibrated: flip(&mut rng, 0.98),
            battery_low: flip(&mut rng, 0.10),
            reading_date: reading_timestamp.date_naive(),
            reading_time: reading_timestamp.time(),
            reading_timestamp,
            server_received_at,
            tag_ids: (0..tag_ids_len).map(|_| rand_int(&mut rng, 1, 500)).collect(),
            sensor_labels: sample(&mut rng, LABELS, labels_len),
            raw_samples: (0..raw_samples_len)
                .map(|_| rand_float(&mut rng, -50.0, 150.0, 6))
                .collect(),
            device_metadata: Json(DeviceMetadata {
                manufacturer: pick_str(&mut rng, MANUFACTURERS),
                model: format!("M{}", rand_int(&mut rng, 100, 999)),
                install_date: now.date_naive() - days(rand_int(&mut rng, 30, 1000)),
            }),
            alert_config: Json(AlertConfig {
                temp_high: rand_float(&mut rng, 50.0, 80.0, 1),
                temp_low: rand_float(&mut rng, -20.0, 10.0, 1),
                notify: pick_str(&mut rng, NOTIFY),
            }),
            raw_payload: rand_bytes(&mut rng, raw_payload_len),
            checksum: rand_bytes(&mut rng, 32),
            location_name: pick(&mut rng, &self.config.reference.sensor_locations).to_owned(),
            notes: flip(&mut rng, 0.3).then(|| format!("Auto-generated reading #{}", idx + 1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::factory::tests::{check_rate, check_table, config};

    use super::*;

    #[test]
    fn sensor_readings() {
        let table = SensorReadings::init(config(300));
        check_table(table.clone());

        let now = table.config.now;
        for idx in 0..table.config.num_rows {
            let r = table.gen_row(idx);
            assert_eq!(r.reading_date, r.reading_timestamp.date_naive());
            assert_eq!(r.reading_time, r.reading_timestamp.time());
            assert!(r.server_received_at > r.reading_timestamp);
            assert!(r.reading_timestamp <= now);
            assert!(r.reading_timestamp > now - days(92));
            assert_eq!(r.device_serial.len(), 16);
            assert_eq!(r.device_serial, r.device_serial.to_uppercase());
            assert!((1..=5).contains(&r.tag_ids.len()));
            let labels: HashSet<_> = r.sensor_labels.iter().collect();
            assert_eq!(labels.len(), r.sensor_labels.len());
            assert!((1..=4).contains(&labels.len()));
            assert!((5..=20).contains(&r.raw_samples.len()));
            assert!((32..=256).contains(&r.raw_payload.len()));
            assert_eq!(r.checksum.len(), 32);
            assert!(ERROR_CODES.contains(&r.error_code));
            assert!(r.temperature_c >= Decimal::new(-40, 0));
            assert!(r.temperature_c <= Decimal::new(85, 0));
        }
    }

    #[test]
    fn rates() {
        let table = SensorReadings::init(config(5000));
        check_rate(&table, "is_anomaly", 0.05, |r| r.is_anomaly);
        check_rate(&table, "is_calibrated", 0.98, |r| r.is_calibrated);
        check_rate(&table, "battery_low", 0.10, |r| r.battery_low);
        check_rate(&table, "notes", 0.3, |r| r.notes.is_some());
    }

    #[test]
    fn notes() {
        #[track_caller]
        fn test_case(idx: usize, expected: &str) {
            let table = SensorReadings::init(config(1));
            if let Some(notes) = table.gen_row(idx).notes {
                assert_eq!(notes, expected);
            }
        }

        for idx in 0..50 {
            test_case(idx, &format!("Auto-generated reading #{}", idx + 1));
        }
    }
}
