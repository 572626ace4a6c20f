// Copyright 2023 Daniel Harrison. All Rights Reserved.

//! Static reference lists that synthesized rows draw from.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Error;

/// The vocabulary that synthesized values are drawn from.
///
/// This is read-only for the lifetime of a run. [Reference::default] is the
/// built-in vocabulary; [Reference::from_json] replaces some or all of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reference {
    /// Country names, used for addresses, billing, and origins.
    pub countries: Vec<String>,
    /// ISO 4217 currency codes.
    pub currencies: Vec<String>,
    /// Manufacturing plant codes.
    pub plants: Vec<String>,
    /// IANA timezone names.
    pub timezones: Vec<String>,
    #[allow(missing_docs)]
    pub first_names: Vec<String>,
    #[allow(missing_docs)]
    pub last_names: Vec<String>,
    #[allow(missing_docs)]
    pub departments: Vec<String>,
    #[allow(missing_docs)]
    pub job_titles: Vec<String>,
    /// The pool employee skills are sampled from without replacement.
    pub skills: Vec<String>,
    /// The pool employee certifications are sampled from without replacement.
    pub certifications: Vec<String>,
    #[allow(missing_docs)]
    pub sensor_locations: Vec<String>,
    /// Product categories, each with its subcategories.
    pub categories: Vec<Category>,
    #[allow(missing_docs)]
    pub brands: Vec<String>,
    /// The pool product color options are sampled from without replacement.
    pub colors: Vec<String>,
}

/// A product category and its subcategories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[allow(missing_docs)]
    pub name: String,
    #[allow(missing_docs)]
    pub subcategories: Vec<String>,
}

fn strs(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|x| x.to_string()).collect()
}

impl Default for Reference {
    fn default() -> Self {
        let category = |name: &str, subcategories: &[&str]| Category {
            name: name.to_owned(),
            subcategories: strs(subcategories),
        };
        Reference {
            countries: strs(&[
                "USA",
                "Germany",
                "Japan",
                "China",
                "Brazil",
                "India",
                "UK",
                "France",
                "Australia",
                "Canada",
                "South Korea",
                "Singapore",
            ]),
            currencies: strs(&[
                "USD", "EUR", "JPY", "CNY", "BRL", "INR", "GBP", "CHF", "AUD", "CAD",
            ]),
            plants: strs(&[
                "US-PLANT-01",
                "GER-PLANT-02",
                "JP-PLANT-03",
                "CN-PLANT-04",
                "IN-PLANT-05",
            ]),
            timezones: strs(&[
                "UTC",
                "US/Eastern",
                "Europe/Berlin",
                "Asia/Tokyo",
                "Asia/Shanghai",
                "Asia/Kolkata",
                "Australia/Sydney",
            ]),
            first_names: strs(&[
                "Aarav", "Wei", "Sakura", "Priya", "Liam", "Emma", "Hiroshi", "Fatima", "Carlos",
                "Ingrid", "Raj", "Mei", "Yuki", "Olga", "James", "Sofia", "Kenji", "Anika",
                "Diego", "Freya",
            ]),
            last_names: strs(&[
                "Patel",
                "Wang",
                "Tanaka",
                "Sharma",
                "Smith",
                "Mueller",
                "Suzuki",
                "Khan",
                "Garcia",
                "Johansson",
                "Kumar",
                "Chen",
                "Sato",
                "Petrov",
                "Johnson",
                "Schmidt",
                "Kim",
                "Singh",
                "Lopez",
                "Andersson",
            ]),
            departments: strs(&[
                "Engineering",
                "Finance",
                "HR",
                "Sales",
                "Marketing",
                "Operations",
                "Legal",
                "R&D",
                "Support",
                "QA",
            ]),
            job_titles: strs(&[
                "Software Engineer",
                "Analyst",
                "Manager",
                "Director",
                "VP",
                "Intern",
                "Consultant",
                "Architect",
                "Lead",
                "Specialist",
                "Administrator",
                "Coordinator",
            ]),
            skills: strs(&[
                "Python",
                "Java",
                "SQL",
                "AWS",
                "Docker",
                "Kubernetes",
                "React",
                "TypeScript",
                "Go",
                "Rust",
                "Terraform",
                "CI/CD",
                "Machine Learning",
                "Data Engineering",
                "Kafka",
                "Spark",
            ]),
            certifications: strs(&[
                "AWS-SAA", "AWS-SAP", "CKA", "PMP", "CISSP", "TOGAF", "AZ-900", "GCP-ACE", "CKAD",
                "OCP",
            ]),
            sensor_locations: strs(&[
                "Factory Floor A",
                "Warehouse B",
                "Server Room C",
                "Outdoor Station D",
                "Cold Storage E",
                "Lab Room F",
                "Rooftop G",
                "Basement H",
            ]),
            categories: vec![
                category(
                    "Electronics",
                    &["Sensors", "Displays", "Controllers", "Cables", "Batteries"],
                ),
                category(
                    "Mechanical",
                    &["Bearings", "Gears", "Shafts", "Springs", "Fasteners"],
                ),
                category(
                    "Safety",
                    &["Helmets", "Gloves", "Goggles", "Vests", "Harnesses"],
                ),
                category(
                    "Chemicals",
                    &["Lubricants", "Solvents", "Adhesives", "Coatings", "Cleaners"],
                ),
                category(
                    "Tools",
                    &["Drills", "Wrenches", "Cutters", "Meters", "Probes"],
                ),
            ],
            brands: strs(&[
                "Bosch",
                "3M",
                "Siemens",
                "ABB",
                "Schneider",
                "Honeywell",
                "TE Connectivity",
                "Parker",
            ]),
            colors: strs(&[
                "Red", "Blue", "Green", "Black", "White", "Silver", "Yellow", "Orange", "Gray",
            ]),
        }
    }
}

impl Reference {
    /// Parses reference data from JSON, falling back to the built-in list
    /// for any key that is absent.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let reference: Reference = serde_json::from_str(json)?;
        reference.validate()?;
        Ok(reference)
    }

    /// Reads [Reference::from_json] input from a file.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let json = std::fs::read_to_string(path)
            .map_err(|err| Error::Config(format!("reading {}: {}", path.display(), err)))?;
        Self::from_json(&json)
    }

    /// Checks that every list has enough distinct entries to draw from.
    pub fn validate(&self) -> Result<(), Error> {
        // Sampling without replacement needs as many entries as the largest
        // draw: 7 skills, 4 colors.
        let lists: [(&str, &[String], usize); 13] = [
            ("countries", &self.countries, 1),
            ("currencies", &self.currencies, 1),
            ("plants", &self.plants, 1),
            ("timezones", &self.timezones, 1),
            ("first_names", &self.first_names, 1),
            ("last_names", &self.last_names, 1),
            ("departments", &self.departments, 1),
            ("job_titles", &self.job_titles, 1),
            ("skills", &self.skills, 7),
            ("certifications", &self.certifications, 1),
            ("sensor_locations", &self.sensor_locations, 1),
            ("brands", &self.brands, 1),
            ("colors", &self.colors, 4),
        ];
        for (name, list, min) in lists {
            if list.len() < min {
                return Err(Error::Config(format!(
                    "reference list {} needs at least {} entries, has {}",
                    name,
                    min,
                    list.len()
                )));
            }
            let mut seen = HashSet::with_capacity(list.len());
            if let Some(dup) = list.iter().find(|x| !seen.insert(x.as_str())) {
                return Err(Error::Config(format!(
                    "reference list {} has duplicate entry {:?}",
                    name, dup
                )));
            }
        }
        if self.categories.is_empty() {
            return Err(Error::Config("reference list categories is empty".into()));
        }
        for category in &self.categories {
            if category.name.is_empty() || category.subcategories.is_empty() {
                return Err(Error::Config(format!(
                    "category {:?} needs a name and at least one subcategory",
                    category.name
                )));
            }
        }
        Ok(())
    }

    /// The named category, if any.
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }
}
