// Copyright 2023 Daniel Harrison. All Rights Reserved.

use std::net::IpAddr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::factory::{
    days, factory_table, flip, label_enum, pick, pick_str, rand_alphanumeric, rand_bytes,
    rand_date, rand_decimal, rand_float, rand_int, rand_ipv4, rand_mac, rand_time, rand_uuid,
    sample, FactoryConfig,
};
use crate::value::{Interval, Json, MacAddr};
use crate::Table;

label_enum! {
    #[doc = "An [Employee]'s self-reported gender."]
    pub enum Gender {
        Male => "Male",
        Female => "Female",
        NonBinary => "Non-Binary",
        PreferNotToSay => "Prefer Not to Say",
    }
}

label_enum! {
    #[doc = "The terms an [Employee] is engaged on."]
    pub enum EmploymentType {
        FullTime => "Full-Time",
        PartTime => "Part-Time",
        Contract => "Contract",
        Intern => "Intern",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct Address {
    pub street: String,
    pub city: &'static str,
    pub zip: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
    pub relation: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct Preferences {
    pub theme: &'static str,
    pub notifications: bool,
    pub language: &'static str,
}

record! {
    /// A person on the payroll.
    #[derive(Debug, Clone, PartialEq)]
    #[allow(missing_docs)]
    pub struct Employee {
        pub employee_uuid: Uuid,
        pub employee_code: String,
        pub first_name: String,
        pub last_name: String,
        pub email: String,
        pub phone_number: String,
        pub gender: Gender,
        pub employment_type: EmploymentType,
        pub department: String,
        pub job_title: String,
        pub job_level: i16,
        pub base_salary: Decimal,
        pub bonus_pct: f32,
        pub stock_options: i32,
        pub years_experience: i16,
        pub employee_rating: f64,
        pub badge_number: i64,
        pub is_active: bool,
        pub is_manager: bool,
        pub has_remote_access: bool,
        pub background_check_ok: Option<bool>,
        pub date_of_birth: NaiveDate,
        pub hire_date: NaiveDate,
        pub termination_date: Option<NaiveDate>,
        pub last_login_time: NaiveTime,
        pub shift_start: NaiveTime,
        pub created_at: DateTime<Utc>,
        pub updated_at: NaiveDateTime,
        pub probation_period: Interval,
        /// Time in post. Only Oracle has a column for this.
        pub tenure: Interval,
        pub office_ip: IpAddr,
        pub vpn_mac: MacAddr,
        pub skills: Vec<String>,
        pub certifications: Vec<String>,
        pub project_ids: Vec<i32>,
        pub address_json: Json<Address>,
        pub emergency_contact: Json<EmergencyContact>,
        pub preferences: Json<Preferences>,
        pub profile_photo_thumb: Vec<u8>,
        pub bio: String,
        pub notes: Option<String>,
    }
}

impl Employee {
    /// The derived display name, as computed by every engine's DDL.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// The `employees` table.
#[derive(Debug, Clone)]
pub struct Employees {
    config: FactoryConfig,
}

factory_table!(Employees, "employees", 0x2222_0002);

const CITIES: &[&str] = &["Tokyo", "Berlin", "Mumbai", "NYC", "London", "Singapore"];
const STREETS: &[&str] = &["Oak", "Elm", "Main", "Maple"];
const RELATIONS: &[&str] = &["Spouse", "Parent", "Sibling", "Friend"];
const THEMES: &[&str] = &["dark", "light", "system"];
const LANGUAGES: &[&str] = &["en", "de", "ja", "hi", "es"];

fn rand_phone<R: Rng>(rng: &mut R) -> String {
    format!(
        "+{}-{}-{}",
        rand_int(rng, 1, 99),
        rand_int(rng, 100, 999),
        rand_int(rng, 1000, 9999)
    )
}

impl Table for Employees {
    type Record = Employee;

    fn gen_row(&self, idx: usize) -> Employee {
        let mut rng = self.rng(idx);
        let reference = &self.config.reference;
        let now = self.config.now;

        let first_name = pick(&mut rng, &reference.first_names).to_owned();
        let last_name = pick(&mut rng, &reference.last_names).to_owned();
        let employee_uuid = rand_uuid(&mut rng);
        let date_of_birth = rand_date(&mut rng, 1960, 2002);
        let hire_date = rand_date(&mut rng, 2010, 2025);
        let termination_date =
            flip(&mut rng, 0.15).then(|| hire_date + days(rand_int(&mut rng, 180, 1800)));
        let skills_len = rand_int(&mut rng, 2, 7);
        let certifications_len = rand_int(&mut rng, 0, 4);
        let project_ids_len = rand_int(&mut rng, 1, 5);
        // Present and true 70%, present and false 15%, absent 15%.
        let background_check_ok = match rand_int(&mut rng, 0, 99) {
            0..=69 => Some(true),
            70..=84 => Some(false),
            _ => None,
        };

        Employee {
            employee_uuid,
            employee_code: format!("EMP-{:06}", idx + 1),
            email: format!(
                "{}.{}{}@example.com",
                first_name.to_lowercase(),
                last_name.to_lowercase(),
                rand_int(&mut rng, 1, 99)
            ),
            first_name,
            last_name,
            phone_number: rand_phone(&mut rng),
            gender: Gender::choose(&mut rng),
            employment_type: EmploymentType::choose(&mut rng),
            department: pick(&mut rng, &reference.departments).to_owned(),
            job_title: pick(&mut rng, &reference.job_titles).to_owned(),
            job_level: rand_int(&mut rng, 1, 10),
            base_salary: rand_decimal(&mut rng, 30_000, 250_000, 2),
            bonus_pct: rand_float(&mut rng, 0.0, 0.30, 4) as f32,
            stock_options: rand_int(&mut rng, 0, 50_000),
            years_experience: rand_int(&mut rng, 0, 35),
            employee_rating: rand_float(&mut rng, 1.0, 5.0, 6),
            badge_number: rand_int(&mut rng, 100_000, 999_999),
            is_active: flip(&mut rng, 0.5),
            is_manager: flip(&mut rng, 0.5),
            has_remote_access: flip(&mut rng, 0.5),
            background_check_ok,
            date_of_birth,
            hire_date,
            termination_date,
            last_login_time: rand_time(&mut rng),
            shift_start: NaiveTime::from_hms_opt(rand_int(&mut rng, 6, 10), 0, 0)
                .unwrap_or_default(),
            created_at: now - days(rand_int(&mut rng, 0, 30)),
            updated_at: (now - days(rand_int(&mut rng, 0, 10))).naive_utc(),
            probation_period: Interval::months(if flip(&mut rng, 0.5) { 3 } else { 6 }),
            tenure: Interval::days_hours(rand_int(&mut rng, 30, 3650), 8),
            office_ip: rand_ipv4(&mut rng),
            vpn_mac: rand_mac(&mut rng),
            skills: sample(&mut rng, &reference.skills, skills_len),
            certifications: sample(&mut rng, &reference.certifications, certifications_len),
            project_ids: (0..project_ids_len)
                .map(|_| rand_int(&mut rng, 1000, 9999))
                .collect(),
            address_json: Json(Address {
                street: format!(
                    "{} {} St",
                    rand_int(&mut rng, 1, 9999),
                    pick_str(&mut rng, STREETS)
                ),
                city: pick_str(&mut rng, CITIES),
                zip: rand_int(&mut rng, 10000, 99999).to_string(),
                country: pick(&mut rng, &reference.countries).to_owned(),
            }),
            emergency_contact: Json(EmergencyContact {
                name: format!(
                    "{} {}",
                    pick(&mut rng, &reference.first_names),
                    pick(&mut rng, &reference.last_names)
                ),
                phone: rand_phone(&mut rng),
                relation: pick_str(&mut rng, RELATIONS),
            }),
            preferences: Json(Preferences {
                theme: pick_str(&mut rng, THEMES),
                notifications: flip(&mut rng, 0.5),
                language: pick_str(&mut rng, LANGUAGES),
            }),
            profile_photo_thumb: rand_bytes(&mut rng, 128),
            bio: format!(
                "Experienced {} with {} years in {}.",
                pick(&mut rng, &reference.job_titles).to_lowercase(),
                rand_int(&mut rng, 1, 20),
                pick(&mut rng, &reference.departments).to_lowercase()
            ),
            notes: flip(&mut rng, 0.5).then(|| format!("Note: {}", rand_alphanumeric(&mut rng, 50))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::factory::tests::{check_rate, check_table, config};

    use super::*;

    #[test]
    fn employees() {
        let table = Employees::init(config(300));
        check_table(table.clone());

        let mut codes = HashSet::new();
        let mut background_nulls = 0;
        for idx in 0..table.config.num_rows {
            let emp = table.gen_row(idx);
            assert!(codes.insert(emp.employee_code.clone()));
            if let Some(termination_date) = emp.termination_date {
                assert!(termination_date > emp.hire_date);
            }
            assert!((2..=7).contains(&emp.skills.len()));
            let distinct: HashSet<_> = emp.skills.iter().collect();
            assert_eq!(distinct.len(), emp.skills.len());
            assert!(emp.certifications.len() <= 4);
            assert!((1..=5).contains(&emp.project_ids.len()));
            assert!(emp.base_salary >= Decimal::ZERO);
            assert!(emp.email.ends_with("@example.com"));
            assert_eq!(emp.email, emp.email.to_lowercase());
            assert!([3, 6].contains(&emp.probation_period.months));
            assert_eq!(emp.employee_uuid.get_version_num(), 4);
            if emp.background_check_ok.is_none() {
                background_nulls += 1;
            }
        }
        assert!(background_nulls > 0);
    }

    #[test]
    fn rates() {
        let table = Employees::init(config(5000));
        check_rate(&table, "termination_date", 0.15, |e| e.termination_date.is_some());
        check_rate(&table, "background_check_ok", 0.70, |e| {
            e.background_check_ok == Some(true)
        });
        check_rate(&table, "background_check_failed", 0.15, |e| {
            e.background_check_ok == Some(false)
        });
        check_rate(&table, "background_check_missing", 0.15, |e| {
            e.background_check_ok.is_none()
        });
        check_rate(&table, "is_active", 0.5, |e| e.is_active);
    }

    #[test]
    fn full_name() {
        let table = Employees::init(config(1));
        let emp = table.gen_row(0);
        assert_eq!(
            emp.full_name(),
            format!("{} {}", emp.first_name, emp.last_name)
        );
    }
}
