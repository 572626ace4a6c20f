// Copyright 2023 Daniel Harrison. All Rights Reserved.

//! Engine-independent column values.

use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::Error;

/// A single semantic column value.
///
/// This is what synthesizers produce. Each [crate::dialect::Dialect] then
/// re-encodes it into whatever concrete representation its engine supports.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL, tagged with the kind the column would otherwise hold.
    Null(Kind),
    #[allow(missing_docs)]
    Bool(bool),
    #[allow(missing_docs)]
    I16(i16),
    #[allow(missing_docs)]
    I32(i32),
    #[allow(missing_docs)]
    I64(i64),
    #[allow(missing_docs)]
    F32(f32),
    #[allow(missing_docs)]
    F64(f64),
    /// Exact fixed-point number.
    Decimal(Decimal),
    #[allow(missing_docs)]
    Text(String),
    #[allow(missing_docs)]
    Bytes(Vec<u8>),
    #[allow(missing_docs)]
    Uuid(Uuid),
    #[allow(missing_docs)]
    Date(NaiveDate),
    /// Time of day without a zone.
    Time(NaiveTime),
    /// Timestamp without a zone.
    Timestamp(NaiveDateTime),
    /// Timestamp normalized to UTC.
    TimestampTz(DateTime<Utc>),
    #[allow(missing_docs)]
    Interval(Interval),
    #[allow(missing_docs)]
    Inet(IpAddr),
    #[allow(missing_docs)]
    MacAddr(MacAddr),
    #[allow(missing_docs)]
    TextList(Vec<String>),
    #[allow(missing_docs)]
    IntList(Vec<i32>),
    #[allow(missing_docs)]
    FloatList(Vec<f64>),
    /// A nested object.
    Json(serde_json::Value),
}

/// The payload-free tag of a [Value].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Kind {
    Bool,
    I16,
    I32,
    I64,
    F32,
    F64,
    Decimal,
    Text,
    Bytes,
    Uuid,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Interval,
    Inet,
    MacAddr,
    TextList,
    IntList,
    FloatList,
    Json,
}

impl Value {
    /// The kind of this value. NULLs report the kind they stand in for.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null(kind) => *kind,
            Value::Bool(_) => Kind::Bool,
            Value::I16(_) => Kind::I16,
            Value::I32(_) => Kind::I32,
            Value::I64(_) => Kind::I64,
            Value::F32(_) => Kind::F32,
            Value::F64(_) => Kind::F64,
            Value::Decimal(_) => Kind::Decimal,
            Value::Text(_) => Kind::Text,
            Value::Bytes(_) => Kind::Bytes,
            Value::Uuid(_) => Kind::Uuid,
            Value::Date(_) => Kind::Date,
            Value::Time(_) => Kind::Time,
            Value::Timestamp(_) => Kind::Timestamp,
            Value::TimestampTz(_) => Kind::TimestampTz,
            Value::Interval(_) => Kind::Interval,
            Value::Inet(_) => Kind::Inet,
            Value::MacAddr(_) => Kind::MacAddr,
            Value::TextList(_) => Kind::TextList,
            Value::IntList(_) => Kind::IntList,
            Value::FloatList(_) => Kind::FloatList,
            Value::Json(_) => Kind::Json,
        }
    }

    /// Whether this is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null(_))
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Value::Null(_) => serializer.serialize_none(),
            Value::Bool(x) => x.serialize(serializer),
            Value::I16(x) => x.serialize(serializer),
            Value::I32(x) => x.serialize(serializer),
            Value::I64(x) => x.serialize(serializer),
            Value::F32(x) => x.serialize(serializer),
            Value::F64(x) => x.serialize(serializer),
            Value::Decimal(x) => Serialize::serialize(x, serializer),
            Value::Text(x) => x.serialize(serializer),
            Value::Bytes(x) => x.serialize(serializer),
            Value::Uuid(x) => x.serialize(serializer),
            Value::Date(x) => x.serialize(serializer),
            Value::Time(x) => x.serialize(serializer),
            Value::Timestamp(x) => x.serialize(serializer),
            Value::TimestampTz(x) => x.serialize(serializer),
            Value::Interval(x) => serializer.collect_str(x),
            Value::Inet(x) => x.serialize(serializer),
            Value::MacAddr(x) => serializer.collect_str(x),
            Value::TextList(x) => x.serialize(serializer),
            Value::IntList(x) => x.serialize(serializer),
            Value::FloatList(x) => x.serialize(serializer),
            Value::Json(x) => x.serialize(serializer),
        }
    }
}

/// A calendar interval, split the way PostgreSQL stores one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    /// Whole months.
    pub months: i32,
    /// Whole days.
    pub days: i32,
    /// Sub-day remainder in microseconds.
    pub micros: i64,
}

impl Interval {
    const MICROS_PER_SECOND: i64 = 1_000_000;

    /// An interval of whole months.
    pub const fn months(months: i32) -> Self {
        Interval {
            months,
            days: 0,
            micros: 0,
        }
    }

    /// An interval of days plus hours.
    pub const fn days_hours(days: i32, hours: i64) -> Self {
        Interval {
            months: 0,
            days,
            micros: hours * 3600 * Self::MICROS_PER_SECOND,
        }
    }

    /// Renders the interval as an Oracle literal.
    ///
    /// Pure month intervals become `INTERVAL YEAR TO MONTH` literals
    /// (`+00-03`); anything else becomes `INTERVAL DAY TO SECOND`
    /// (`+000001234 08:00:00.000000`). Day-second literals cannot carry
    /// months, so those are folded into 30-day months.
    pub fn to_oracle_literal(&self) -> String {
        if self.days == 0 && self.micros == 0 {
            let sign = if self.months < 0 { '-' } else { '+' };
            let months = self.months.unsigned_abs();
            return format!("{}{:02}-{:02}", sign, months / 12, months % 12);
        }
        let total_micros = (i64::from(self.months) * 30 + i64::from(self.days)) * 86_400
            * Self::MICROS_PER_SECOND
            + self.micros;
        let sign = if total_micros < 0 { '-' } else { '+' };
        let total_micros = total_micros.unsigned_abs();
        let (days, rem) = (total_micros / 86_400_000_000, total_micros % 86_400_000_000);
        let (h, rem) = (rem / 3_600_000_000, rem % 3_600_000_000);
        let (m, rem) = (rem / 60_000_000, rem % 60_000_000);
        let (s, us) = (rem / 1_000_000, rem % 1_000_000);
        format!("{}{:09} {:02}:{:02}:{:02}.{:06}", sign, days, h, m, s, us)
    }

    /// Parses the output of [Self::to_oracle_literal].
    pub fn from_oracle_literal(s: &str) -> Result<Self, Error> {
        let err = || Error::Decode(format!("invalid oracle interval: {}", s));
        let (negative, body) = match s.strip_prefix('-') {
            Some(body) => (true, body),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let mut ret = match body.split_once(' ') {
            Some((days, hms)) => Interval {
                months: 0,
                days: days.parse().map_err(|_| err())?,
                micros: parse_hms(hms).ok_or_else(err)?,
            },
            None => {
                let (years, months) = body.split_once('-').ok_or_else(err)?;
                let years: i32 = years.parse().map_err(|_| err())?;
                let months: i32 = months.parse().map_err(|_| err())?;
                Interval::months(years * 12 + months)
            }
        };
        if negative {
            ret = Interval {
                months: -ret.months,
                days: -ret.days,
                micros: -ret.micros,
            };
        }
        Ok(ret)
    }
}

/// Parses `[-]HH:MM:SS[.ffffff]` into microseconds.
fn parse_hms(s: &str) -> Option<i64> {
    let (negative, s) = match s.strip_prefix('-') {
        Some(s) => (true, s),
        None => (false, s),
    };
    let mut parts = s.splitn(3, ':');
    let h: i64 = parts.next()?.parse().ok()?;
    let m: i64 = parts.next()?.parse().ok()?;
    let secs = parts.next()?;
    let (secs, frac) = secs.split_once('.').unwrap_or((secs, ""));
    let secs: i64 = secs.parse().ok()?;
    let micros = if frac.is_empty() {
        0
    } else {
        // Right-pad to six digits: ".5" is 500000us.
        let frac = format!("{:0<6}", frac);
        frac.get(..6)?.parse::<i64>().ok()?
    };
    let total = ((h * 60 + m) * 60 + secs) * Interval::MICROS_PER_SECOND + micros;
    Some(if negative { -total } else { total })
}

impl std::str::FromStr for Interval {
    type Err = Error;

    /// Parses the [fmt::Display] form, which is also what PostgreSQL emits
    /// (modulo its `mons` abbreviation).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || Error::Decode(format!("invalid interval: {}", s));
        let mut ret = Interval {
            months: 0,
            days: 0,
            micros: 0,
        };
        let mut tokens = s.split_whitespace();
        while let Some(token) = tokens.next() {
            if token.contains(':') {
                ret.micros = parse_hms(token).ok_or_else(err)?;
                continue;
            }
            let n: i32 = token.parse().map_err(|_| err())?;
            match tokens.next() {
                Some("month" | "months" | "mon" | "mons") => ret.months = n,
                Some("day" | "days") => ret.days = n,
                _ => return Err(err()),
            }
        }
        Ok(ret)
    }
}

impl fmt::Display for Interval {
    /// PostgreSQL's input syntax, which doubles as a human readable form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.months != 0 {
            parts.push(format!("{} months", self.months));
        }
        if self.days != 0 {
            parts.push(format!("{} days", self.days));
        }
        if self.micros != 0 || parts.is_empty() {
            let sign = if self.micros < 0 { "-" } else { "" };
            let micros = self.micros.unsigned_abs();
            let secs = micros / 1_000_000;
            let frac = micros % 1_000_000;
            let hms = format!(
                "{}{:02}:{:02}:{:02}",
                sign,
                secs / 3600,
                (secs / 60) % 60,
                secs % 60
            );
            if frac == 0 {
                parts.push(hms);
            } else {
                parts.push(format!("{}.{:06}", hms, frac));
            }
        }
        f.write_str(&parts.join(" "))
    }
}

/// A 48-bit hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacAddr(pub [u8; 6]);

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}", a, b, c, d, e, g)
    }
}

impl std::str::FromStr for MacAddr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut ret = [0u8; 6];
        let mut parts = s.split(':');
        for byte in ret.iter_mut() {
            let part = parts
                .next()
                .ok_or_else(|| Error::Decode(format!("short mac address: {}", s)))?;
            *byte = u8::from_str_radix(part, 16)
                .map_err(|err| Error::Decode(format!("invalid mac address {}: {}", s, err)))?;
        }
        if parts.next().is_some() {
            return Err(Error::Decode(format!("long mac address: {}", s)));
        }
        Ok(MacAddr(ret))
    }
}

/// A nested object stored as a JSON document.
#[derive(Debug, Clone, PartialEq)]
pub struct Json<T>(pub T);

/// Conversion of a record field into a [Value].
pub trait ToValue {
    /// The kind of value produced, including for NULLs.
    const KIND: Kind;

    /// Converts this field.
    fn to_value(&self) -> Result<Value, Error>;
}

macro_rules! to_value {
    ($ty:ty, $kind:ident, |$x:ident| $conv:expr) => {
        impl ToValue for $ty {
            const KIND: Kind = Kind::$kind;

            fn to_value(&self) -> Result<Value, Error> {
                let $x = self;
                Ok(Value::$kind($conv))
            }
        }
    };
}

to_value!(bool, Bool, |x| *x);
to_value!(i16, I16, |x| *x);
to_value!(i32, I32, |x| *x);
to_value!(i64, I64, |x| *x);
to_value!(f32, F32, |x| *x);
to_value!(f64, F64, |x| *x);
to_value!(Decimal, Decimal, |x| *x);
to_value!(String, Text, |x| x.clone());
to_value!(Vec<u8>, Bytes, |x| x.clone());
to_value!(Uuid, Uuid, |x| *x);
to_value!(NaiveDate, Date, |x| *x);
to_value!(NaiveTime, Time, |x| *x);
to_value!(NaiveDateTime, Timestamp, |x| *x);
to_value!(DateTime<Utc>, TimestampTz, |x| *x);
to_value!(Interval, Interval, |x| *x);
to_value!(IpAddr, Inet, |x| *x);
to_value!(MacAddr, MacAddr, |x| *x);
to_value!(Vec<String>, TextList, |x| x.clone());
to_value!(Vec<i32>, IntList, |x| x.clone());
to_value!(Vec<f64>, FloatList, |x| x.clone());

impl<T: ToValue> ToValue for Option<T> {
    const KIND: Kind = T::KIND;

    fn to_value(&self) -> Result<Value, Error> {
        match self {
            Some(x) => x.to_value(),
            None => Ok(Value::Null(T::KIND)),
        }
    }
}

impl<T: Serialize> ToValue for Json<T> {
    const KIND: Kind = Kind::Json;

    fn to_value(&self) -> Result<Value, Error> {
        Ok(Value::Json(serde_json::to_value(&self.0)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_display() {
        #[track_caller]
        fn test_case(i: Interval, expected: &str) {
            assert_eq!(i.to_string(), expected);
        }

        test_case(Interval::months(3), "3 months");
        test_case(Interval::months(6), "6 months");
        test_case(Interval::days_hours(1234, 8), "1234 days 08:00:00");
        test_case(Interval::days_hours(0, 0), "00:00:00");
        test_case(
            Interval {
                months: 0,
                days: 0,
                micros: 1_500_000,
            },
            "00:00:01.500000",
        );
    }

    #[test]
    fn interval_oracle_literal() {
        #[track_caller]
        fn test_case(i: Interval, expected: &str) {
            assert_eq!(i.to_oracle_literal(), expected);
        }

        test_case(Interval::months(3), "+00-03");
        test_case(Interval::months(6), "+00-06");
        test_case(Interval::months(15), "+01-03");
        test_case(Interval::days_hours(1234, 8), "+000001234 08:00:00.000000");
        test_case(Interval::days_hours(30, 8), "+000000030 08:00:00.000000");
    }

    #[test]
    fn interval_parse() {
        #[track_caller]
        fn test_case(i: Interval) {
            assert_eq!(i.to_string().parse::<Interval>().unwrap(), i);
            assert_eq!(Interval::from_oracle_literal(&i.to_oracle_literal()).unwrap(), i);
        }

        test_case(Interval::months(3));
        test_case(Interval::months(15));
        test_case(Interval::days_hours(1234, 8));
        test_case(Interval {
            months: 0,
            days: 2,
            micros: 1_500_000,
        });

        assert_eq!("3 mons".parse::<Interval>().unwrap(), Interval::months(3));
        assert!("3 fortnights".parse::<Interval>().is_err());
        assert!("3".parse::<Interval>().is_err());
        assert!(Interval::from_oracle_literal("+00").is_err());
    }

    #[test]
    fn mac_addr() {
        let mac = MacAddr([0x00, 0x1b, 0x44, 0x11, 0x3a, 0xb7]);
        assert_eq!(mac.to_string(), "00:1b:44:11:3a:b7");
        assert_eq!("00:1b:44:11:3a:b7".parse::<MacAddr>().unwrap(), mac);
        assert!("00:1b:44".parse::<MacAddr>().is_err());
        assert!("00:1b:44:11:3a:b7:ff".parse::<MacAddr>().is_err());
        assert!("00:1b:44:11:3a:zz".parse::<MacAddr>().is_err());
    }

    #[test]
    fn serialize() {
        #[track_caller]
        fn test_case(value: Value, expected: serde_json::Value) {
            assert_eq!(serde_json::to_value(&value).unwrap(), expected);
        }

        test_case(Value::Decimal(Decimal::new(1250, 2)), serde_json::json!("12.50"));
        test_case(Value::Null(Kind::Decimal), serde_json::Value::Null);
        test_case(Value::I16(-3), serde_json::json!(-3));
        test_case(Value::Interval(Interval::months(3)), serde_json::json!("3 months"));
        test_case(
            Value::MacAddr(MacAddr([0, 0x1b, 0x44, 0x11, 0x3a, 0xb7])),
            serde_json::json!("00:1b:44:11:3a:b7"),
        );
        test_case(Value::IntList(vec![1, 2]), serde_json::json!([1, 2]));
    }

    #[test]
    fn option_nulls_keep_kind() {
        let x: Option<NaiveDate> = None;
        assert_eq!(x.to_value().unwrap(), Value::Null(Kind::Date));
        assert_eq!(<Option<NaiveDate> as ToValue>::KIND, Kind::Date);
        let y = Some(7i16);
        assert_eq!(y.to_value().unwrap(), Value::I16(7));
    }
}
