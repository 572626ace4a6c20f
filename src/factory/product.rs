// Copyright 2023 Daniel Harrison. All Rights Reserved.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::factory::{
    days, factory_table, flip, pick, pick_str, rand_bytes, rand_date, rand_decimal, rand_float,
    rand_int, rand_uuid, round_f64, sample, FactoryConfig,
};
use crate::reference::Category;
use crate::value::Json;
use crate::Table;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct Specifications {
    pub material: &'static str,
    pub operating_temp: String,
    pub ip_rating: String,
    pub certifications: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct ShippingInfo {
    pub ship_class: &'static str,
    pub est_days: i32,
    pub free_shipping_above: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct SupplierInfo {
    pub supplier_id: String,
    pub lead_time_days: i32,
    pub moq: i32,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct SeoMetadata {
    pub title: String,
    pub keywords: Vec<String>,
    pub og_description: String,
}

record! {
    /// An entry in the product catalog.
    ///
    /// Prices satisfy `cost_price <= wholesale_price <= unit_price`.
    #[derive(Debug, Clone, PartialEq)]
    #[allow(missing_docs)]
    pub struct Product {
        pub product_uuid: Uuid,
        pub sku: String,
        pub product_name: String,
        pub category: String,
        pub subcategory: String,
        pub brand: String,
        pub description_short: String,
        pub description_long: String,
        pub unit_price: Decimal,
        pub wholesale_price: Decimal,
        pub cost_price: Decimal,
        pub weight_kg: f32,
        pub length_cm: f32,
        pub width_cm: f32,
        pub height_cm: f32,
        pub volume_cm3: f64,
        pub stock_quantity: i32,
        pub reorder_level: i16,
        pub max_order_qty: i32,
        pub popularity_score: f64,
        pub avg_rating: Decimal,
        pub total_reviews: i32,
        pub view_count: i64,
        pub is_active: bool,
        pub is_digital: bool,
        pub is_fragile: bool,
        pub is_hazardous: bool,
        pub requires_assembly: bool,
        pub tax_exempt: bool,
        pub launch_date: NaiveDate,
        pub discontinue_date: Option<NaiveDate>,
        pub last_restock_date: NaiveDate,
        pub created_at: DateTime<Utc>,
        pub updated_at: NaiveDateTime,
        pub tags: Vec<String>,
        pub color_options: Vec<String>,
        pub compatible_skus: Vec<String>,
        pub warehouse_ids: Vec<i32>,
        pub specifications: Json<Specifications>,
        pub shipping_info: Json<ShippingInfo>,
        pub supplier_info: Json<SupplierInfo>,
        pub seo_metadata: Json<SeoMetadata>,
        pub thumbnail_blob: Vec<u8>,
        pub internal_notes: Option<String>,
        pub country_of_origin: String,
        pub hs_tariff_code: String,
    }
}

/// The `product_catalog` table.
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    config: FactoryConfig,
}

factory_table!(ProductCatalog, "product_catalog", 0x4444_0004);

/// The category whose products are flagged hazardous.
const HAZARDOUS_CATEGORY: &str = "Chemicals";

const TIERS: &[&str] = &["Pro", "Standard", "Elite", "Eco", "Max"];
const TAGS: &[&str] = &[
    "industrial",
    "premium",
    "sale",
    "new",
    "eco",
    "certified",
    "OEM",
];
const MATERIALS: &[&str] = &["Steel", "Aluminum", "Plastic", "Composite", "Copper"];
const IP_RATINGS: &[&str] = &["54", "65", "67", "68"];
const CERTIFICATIONS: &[&str] = &["CE", "UL", "ISO9001", "RoHS", "REACH"];
const SHIP_CLASSES: &[&str] = &["Standard", "Oversize", "Hazmat", "Fragile"];
const KEYWORDS: &[&str] = &["industrial", "tools", "safety", "electronics", "parts"];
const MARGIN_TIERS: &[&str] = &["A", "B", "C"];

/// The SKU prefix for a category: its first three letters, uppercased.
fn sku_prefix(category: &str) -> String {
    category.chars().take(3).collect::<String>().to_uppercase()
}

fn rand_category<'a, R: Rng>(rng: &mut R, categories: &'a [Category]) -> (&'a str, &'a str) {
    match categories.choose(rng) {
        Some(category) => (category.name.as_str(), pick(rng, &category.subcategories)),
        None => ("", ""),
    }
}

impl Table for ProductCatalog {
    type Record = Product;

    fn gen_row(&self, idx: usize) -> Product {
        let mut rng = self.rng(idx);
        let reference = &self.config.reference;
        let now = self.config.now;

        let (category, subcategory) = rand_category(&mut rng, &reference.categories);
        let brand = pick(&mut rng, &reference.brands);

        // Each price is a fraction of the one before, so the ordering holds
        // after rounding.
        let unit_price = rand_decimal(&mut rng, 1, 5000, 4);
        let wholesale_price =
            (unit_price * Decimal::new(rand_int(&mut rng, 50, 90), 2)).round_dp(4);
        let cost_price =
            (wholesale_price * Decimal::new(rand_int(&mut rng, 40, 80), 2)).round_dp(4);

        let weight_kg = rand_float(&mut rng, 0.01, 100.0, 3) as f32;
        let length_cm = rand_float(&mut rng, 1.0, 200.0, 2) as f32;
        let width_cm = rand_float(&mut rng, 1.0, 200.0, 2) as f32;
        let height_cm = rand_float(&mut rng, 1.0, 200.0, 2) as f32;
        let volume_cm3 = round_f64(
            f64::from(length_cm) * f64::from(width_cm) * f64::from(height_cm),
            4,
        );

        let launch_date = rand_date(&mut rng, 2015, 2025);
        let discontinue_date =
            flip(&mut rng, 0.1).then(|| launch_date + days(rand_int(&mut rng, 365, 3650)));

        let tags_len = rand_int(&mut rng, 1, 4);
        let colors_len = rand_int(&mut rng, 1, 4);
        let compatible_len = rand_int(&mut rng, 0, 3);
        let warehouses_len = rand_int(&mut rng, 1, 4);
        let certifications_len = rand_int(&mut rng, 1, 3);

        Product {
            product_uuid: rand_uuid(&mut rng),
            sku: format!("SKU-{}-{:06}", sku_prefix(category), idx + 1),
            product_name: format!(
                "{} {} {} {}",
                brand,
                subcategory,
                pick_str(&mut rng, TIERS),
                rand_int(&mut rng, 100, 999)
            ),
            category: category.to_owned(),
            subcategory: subcategory.to_owned(),
            brand: brand.to_owned(),
            description_short: format!(
                "High-quality {} for industrial use. Model #{}.",
                subcategory.to_lowercase(),
                rand_int(&mut rng, 100, 999)
            ),
            description_long: format!(
                "Detailed description for {} product by {}. ",
                subcategory, brand
            )
            .repeat(rand_int(&mut rng, 3, 10)),
            unit_price,
            wholesale_price,
            cost_price,
            weight_kg,
            length_cm,
            width_cm,
            height_cm,
            volume_cm3,
            stock_quantity: rand_int(&mut rng, 0, 10_000),
            reorder_level: rand_int(&mut rng, 5, 100),
            max_order_qty: rand_int(&mut rng, 50, 5000),
            popularity_score: rand_float(&mut rng, 0.0, 100.0, 8),
            avg_rating: rand_decimal(&mut rng, 1, 5, 2),
            total_reviews: rand_int(&mut rng, 0, 5000),
            view_count: rand_int(&mut rng, 0, 1_000_000),
            is_active: flip(&mut rng, 0.75),
            is_digital: flip(&mut rng, 0.1),
            is_fragile: flip(&mut rng, 0.2),
            is_hazardous: category == HAZARDOUS_CATEGORY,
            requires_assembly: flip(&mut rng, 0.3),
            tax_exempt: flip(&mut rng, 0.05),
            launch_date,
            discontinue_date,
            last_restock_date: now.date_naive() - days(rand_int(&mut rng, 0, 90)),
            created_at: now - days(rand_int(&mut rng, 0, 60)),
            updated_at: now.naive_utc(),
            tags: sample(&mut rng, TAGS, tags_len),
            color_options: sample(&mut rng, &reference.colors, colors_len),
            compatible_skus: (0..compatible_len)
                .map(|_| {
                    let (other, _) = rand_category(&mut rng, &reference.categories);
                    format!(
                        "SKU-{}-{:06}",
                        sku_prefix(other),
                        rand_int(&mut rng, 1, 9999)
                    )
                })
                .collect(),
            warehouse_ids: (0..warehouses_len)
                .map(|_| rand_int(&mut rng, 1, 20))
                .collect(),
            specifications: Json(Specifications {
                material: pick_str(&mut rng, MATERIALS),
                operating_temp: format!(
                    "{}C to {}C",
                    rand_int(&mut rng, -40, 0),
                    rand_int(&mut rng, 50, 150)
                ),
                ip_rating: format!("IP{}", pick_str(&mut rng, IP_RATINGS)),
                certifications: sample(&mut rng, CERTIFICATIONS, certifications_len),
            }),
            shipping_info: Json(ShippingInfo {
                ship_class: pick_str(&mut rng, SHIP_CLASSES),
                est_days: rand_int(&mut rng, 1, 14),
                free_shipping_above: rand_float(&mut rng, 50.0, 500.0, 2),
            }),
            supplier_info: Json(SupplierInfo {
                supplier_id: format!("SUP-{}", rand_int(&mut rng, 100, 999)),
                lead_time_days: rand_int(&mut rng, 7, 90),
                moq: rand_int(&mut rng, 1, 100),
                country: pick(&mut rng, &reference.countries).to_owned(),
            }),
            seo_metadata: Json(SeoMetadata {
                title: format!("Buy {} from {}", subcategory, brand),
                keywords: sample(&mut rng, KEYWORDS, 3),
                og_description: format!("Shop {} {} at competitive prices.", brand, subcategory),
            }),
            thumbnail_blob: rand_bytes(&mut rng, 64),
            internal_notes: flip(&mut rng, 0.4).then(|| {
                format!(
                    "Internal: margin tier {}, review pending",
                    pick_str(&mut rng, MARGIN_TIERS)
                )
            }),
            country_of_origin: pick(&mut rng, &reference.countries).to_owned(),
            hs_tariff_code: format!(
                "{}.{}.{}",
                rand_int(&mut rng, 1000, 9999),
                rand_int(&mut rng, 10, 99),
                rand_int(&mut rng, 10, 99)
            ),
        }
    }
}
