// Copyright 2023 Daniel Harrison. All Rights Reserved.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::factory::{
    days, factory_table, flip, label_enum, pick, pick_str, rand_bytes, rand_float, rand_int,
    rand_uuid, FactoryConfig,
};
use crate::value::Json;
use crate::Table;

label_enum! {
    /// The lifecycle state of an [Invoice].
    pub enum InvoiceStatus {
        Draft => "DRAFT",
        Sent => "SENT",
        Paid => "PAID",
        Overdue => "OVERDUE",
        Cancelled => "CANCELLED",
    }
}

/// One line of an [Invoice], stored inside the invoice as JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct LineItem {
    pub item_id: usize,
    pub product_code: String,
    pub description: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub total_amount: f64,
    pub uom: &'static str,
    pub hs_code: String,
}

/// Free-form processing metadata attached to an [Invoice].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct InvoiceMetadata {
    pub version: &'static str,
    pub batch_id: String,
    pub quality_metrics: QualityMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct QualityMetrics {
    pub score: f64,
}

record! {
    /// A billing document.
    ///
    /// Amounts satisfy `total = subtotal - discount + tax + shipping` exactly.
    #[derive(Debug, Clone, PartialEq)]
    #[allow(missing_docs)]
    pub struct Invoice {
        pub invoice_number: String,
        pub customer_id: i32,
        pub customer_code: String,
        pub customer_name: String,
        pub customer_address: String,
        pub billing_country: String,
        pub shipping_country: String,
        pub currency_code: String,
        pub payment_terms: String,
        pub sales_representative: String,
        pub total_amount: Decimal,
        pub tax_amount: Decimal,
        pub discount_amount: Decimal,
        pub shipping_cost: Decimal,
        pub subtotal_amount: Decimal,
        pub items_count: i16,
        pub revision_number: i16,
        pub processing_days: i16,
        pub exchange_rate: f64,
        pub tax_rate: f64,
        pub is_paid: bool,
        pub is_shipped: bool,
        pub is_recurring: bool,
        pub requires_approval: bool,
        pub is_international: bool,
        pub invoice_date: NaiveDate,
        pub due_date: NaiveDate,
        pub created_datetime: DateTime<Utc>,
        pub payment_date: Option<DateTime<Utc>>,
        pub shipment_date: Option<DateTime<Utc>>,
        pub approval_date: Option<DateTime<Utc>>,
        pub invoice_timezone: String,
        pub invoice_items: Json<Vec<LineItem>>,
        pub digital_signature: Vec<u8>,
        pub metadata_json: Json<InvoiceMetadata>,
        pub status: InvoiceStatus,
        pub project_code: String,
        pub cost_center: String,
        pub manufacturing_plant: String,
        pub quality_check_passed: bool,
        pub compliance_verified: bool,
    }
}

/// The `invoices` table.
#[derive(Debug, Clone)]
pub struct Invoices {
    config: FactoryConfig,
}

factory_table!(Invoices, "invoices", 0x1111_0001);

const PAYMENT_TERMS: &[&str] = &["NET30", "NET60", "DUE_ON_RECEIPT", "NET15"];
const UOMS: &[&str] = &["PCS", "KG", "M", "L"];

impl Table for Invoices {
    type Record = Invoice;

    fn gen_row(&self, idx: usize) -> Invoice {
        let mut rng = self.rng(idx);
        let reference = &self.config.reference;
        let now = self.config.now;
        let today = now.date_naive();

        let billing_country = pick(&mut rng, &reference.countries).to_owned();
        let shipping_country = pick(&mut rng, &reference.countries).to_owned();
        let currency_code = pick(&mut rng, &reference.currencies).to_owned();

        // Amounts are tracked in cents so the totals add up exactly.
        let items_count = rand_int(&mut rng, 1, 15);
        let mut items = Vec::with_capacity(items_count);
        let mut subtotal_cents = 0i64;
        for item_id in 1..=items_count {
            let unit_cents = rand_int(&mut rng, 1_000i64, 100_000);
            let quantity = rand_int(&mut rng, 1i64, 50);
            let total_cents = unit_cents * quantity;
            items.push(LineItem {
                item_id,
                product_code: format!("PROD-{}", rand_int(&mut rng, 1000, 9999)),
                description: format!("Manufactured Part {}", rand_int(&mut rng, 100, 999)),
                quantity,
                unit_price: unit_cents as f64 / 100.0,
                total_amount: total_cents as f64 / 100.0,
                uom: pick_str(&mut rng, UOMS),
                hs_code: format!(
                    "{}.{}",
                    rand_int(&mut rng, 1000, 9999),
                    rand_int(&mut rng, 10, 99)
                ),
            });
            subtotal_cents += total_cents;
        }
        let max_discount_cents = std::cmp::min(subtotal_cents / 5, 50_000);
        let subtotal = Decimal::new(subtotal_cents, 2);
        let discount = Decimal::new(rand_int(&mut rng, 0, max_discount_cents), 2);
        let shipping = Decimal::new(rand_int(&mut rng, 0i64, 20_000), 2);
        let tax_rate_millis = rand_int(&mut rng, 50i64, 250);
        let tax = ((subtotal - discount) * Decimal::new(tax_rate_millis, 3))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let total = subtotal - discount + tax + shipping;

        let invoice_date = today - days(rand_int(&mut rng, 0, 365));
        let due_date = invoice_date + days(rand_int(&mut rng, 15, 90));
        let created = now - days(rand_int(&mut rng, 0, 30));
        let payment_date =
            flip(&mut rng, 0.5).then(|| created - days(rand_int(&mut rng, 1, 15)));
        let shipment_date =
            flip(&mut rng, 0.5).then(|| created - days(rand_int(&mut rng, 1, 10)));
        let approval_date = flip(&mut rng, 0.5).then(|| created - days(rand_int(&mut rng, 1, 5)));

        Invoice {
            invoice_number: format!("INV-{}-{:06}", now.format("%Y%m"), idx + 1),
            customer_id: rand_int(&mut rng, 1000, 9999),
            customer_code: format!("CUST-{}", rand_int(&mut rng, 10000, 99999)),
            customer_name: format!("Customer {} Corp.", rand_int(&mut rng, 1, 1000)),
            customer_address: format!(
                "{} Main St, City {}, {}",
                rand_int(&mut rng, 1, 9999),
                rand_int(&mut rng, 1, 100),
                billing_country
            ),
            is_international: billing_country != shipping_country,
            billing_country,
            shipping_country,
            currency_code,
            payment_terms: pick_str(&mut rng, PAYMENT_TERMS).to_owned(),
            sales_representative: format!("SalesRep-{}", rand_int(&mut rng, 1, 50)),
            total_amount: total,
            tax_amount: tax,
            discount_amount: discount,
            shipping_cost: shipping,
            subtotal_amount: subtotal,
            items_count: items.len() as i16,
            revision_number: rand_int(&mut rng, 0, 5),
            processing_days: rand_int(&mut rng, 1, 10),
            exchange_rate: rand_float(&mut rng, 0.8, 1.2, 4),
            tax_rate: tax_rate_millis as f64 / 1000.0,
            is_paid: flip(&mut rng, 0.5),
            is_shipped: flip(&mut rng, 0.5),
            is_recurring: flip(&mut rng, 0.5),
            requires_approval: flip(&mut rng, 0.5),
            invoice_date,
            due_date,
            created_datetime: created,
            payment_date,
            shipment_date,
            approval_date,
            invoice_timezone: pick(&mut rng, &reference.timezones).to_owned(),
            invoice_items: Json(items),
            digital_signature: rand_bytes(&mut rng, 64),
            metadata_json: Json(InvoiceMetadata {
                version: "1.0",
                batch_id: rand_uuid(&mut rng).to_string(),
                quality_metrics: QualityMetrics {
                    score: rand_float(&mut rng, 85.0, 99.9, 1),
                },
            }),
            status: InvoiceStatus::choose(&mut rng),
            project_code: format!("PROJ-{}", rand_int(&mut rng, 1000, 9999)),
            cost_center: format!("CC-{}", rand_int(&mut rng, 100, 999)),
            manufacturing_plant: pick(&mut rng, &reference.plants).to_owned(),
            quality_check_passed: flip(&mut rng, 0.5),
            compliance_verified: flip(&mut rng, 0.5),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::factory::tests::{check_table, config};

    use super::*;

    #[test]
    fn invoices() {
        let table = Invoices::init(config(200));
        check_table(table.clone());

        for idx in 0..table.config.num_rows {
            let inv = table.gen_row(idx);
            assert_eq!(
                inv.total_amount,
                inv.subtotal_amount - inv.discount_amount + inv.tax_amount + inv.shipping_cost
            );
            assert!(inv.total_amount >= Decimal::ZERO);
            assert!(inv.discount_amount <= Decimal::new(500, 0));
            assert_eq!(inv.tax_amount.scale(), 2);
            let items = &inv.invoice_items.0;
            assert_eq!(items.len(), inv.items_count as usize);
            assert!((1..=15).contains(&items.len()));
            for (i, item) in items.iter().enumerate() {
                assert_eq!(item.item_id, i + 1);
                assert!((1..=50).contains(&item.quantity));
            }
            assert!(inv.due_date > inv.invoice_date);
            for date in [inv.payment_date, inv.shipment_date, inv.approval_date] {
                if let Some(date) = date {
                    assert!(date < inv.created_datetime);
                }
            }
            assert_eq!(
                inv.is_international,
                inv.billing_country != inv.shipping_country
            );
            assert_eq!(inv.digital_signature.len(), 64);
        }
    }

    #[test]
    fn invoice_number() {
        #[track_caller]
        fn test_case(idx: usize, expected: &str) {
            let table = Invoices::init(config(1));
            assert_eq!(table.gen_row(idx).invoice_number, expected);
        }

        test_case(0, "INV-202510-000001");
        test_case(41, "INV-202510-000042");
        test_case(999_999, "INV-202510-1000000");
    }
}
