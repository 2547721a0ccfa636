//! Limpeza da tabela de produtos (`dim_products`).

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::config::CleaningConfig;
use crate::error::RejectReason;
use crate::traits::{Cleaner, Record};
use crate::types::{DataRow, DataValue};
use super::dates::DateReconciler;
use super::text::{strip_currency, Category, CategoryInterner};
use super::weight::{WeightClass, WeightRules};
use super::{clean_table, column, parse_uuid, required, required_date, Cleaned};

/// Colunas de produto como chegam da fonte
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawProduct {
    pub product_name: DataValue,
    pub product_price: DataValue,
    pub weight: DataValue,
    pub category: DataValue,
    pub ean: DataValue,
    pub date_added: DataValue,
    pub uuid: DataValue,
    pub removed: DataValue,
    pub product_code: DataValue,
}

impl RawProduct {
    pub fn from_row(row: &DataRow) -> Self {
        Self {
            product_name: column(row, "product_name"),
            product_price: column(row, "product_price"),
            weight: column(row, "weight"),
            category: column(row, "category"),
            ean: column(row, "EAN"),
            date_added: column(row, "date_added"),
            uuid: column(row, "uuid"),
            removed: column(row, "removed"),
            product_code: column(row, "product_code"),
        }
    }
}

/// Produto limpo, com peso em quilogramas
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecord {
    pub product_code: String,
    pub product_name: String,
    pub product_price: f64,
    pub weight: f64,
    pub weight_class: WeightClass,
    pub category: Category,
    #[serde(rename = "EAN")]
    pub ean: String,
    pub date_added: NaiveDate,
    pub uuid: Uuid,
    pub still_available: bool,
}

impl Record for ProductRecord {
    const TABLE: &'static str = "dim_products";
    const COLUMNS: &'static [&'static str] = &[
        "product_code",
        "product_name",
        "product_price",
        "weight",
        "weight_class",
        "category",
        "EAN",
        "date_added",
        "uuid",
        "still_available",
    ];

    fn into_row(self) -> DataRow {
        let mut row = DataRow::with_capacity(Self::COLUMNS.len());
        row.insert("product_code".to_string(), self.product_code.into());
        row.insert("product_name".to_string(), self.product_name.into());
        row.insert("product_price".to_string(), self.product_price.into());
        row.insert("weight".to_string(), self.weight.into());
        row.insert("weight_class".to_string(), self.weight_class.as_str().into());
        row.insert("category".to_string(), self.category.as_str().into());
        row.insert("EAN".to_string(), self.ean.into());
        row.insert("date_added".to_string(), self.date_added.into());
        row.insert("uuid".to_string(), self.uuid.to_string().into());
        row.insert("still_available".to_string(), self.still_available.into());
        row
    }
}

/// Interpreta a coluna `removed` como disponibilidade
///
/// A fonte grava "Still_avaliable" com erro de digitação.
pub fn parse_availability(raw: &str) -> Option<bool> {
    match raw.trim() {
        "Still_available" | "Still_avaliable" => Some(true),
        "Removed" => Some(false),
        _ => None,
    }
}

/// Pipeline de limpeza e conversão de pesos de produtos
#[derive(Debug, Clone)]
pub struct ProductCleaner {
    weights: WeightRules,
    dates: DateReconciler,
}

impl Default for ProductCleaner {
    fn default() -> Self {
        Self::new(&CleaningConfig::default())
    }
}

impl ProductCleaner {
    pub fn new(config: &CleaningConfig) -> Self {
        Self {
            weights: config.weight.clone(),
            dates: DateReconciler::default(),
        }
    }

    pub fn with_weight_rules(mut self, weights: WeightRules) -> Self {
        self.weights = weights;
        self
    }

    fn clean_raw(&self, raw: RawProduct, categories: &mut CategoryInterner) -> Result<ProductRecord, RejectReason> {
        let product_code = required(&raw.product_code, "product_code")?;
        let product_name = required(&raw.product_name, "product_name")?;
        let price = required(&raw.product_price, "product_price")?;
        let weight = required(&raw.weight, "weight")?;
        let category = required(&raw.category, "category")?;
        let ean = required(&raw.ean, "EAN")?;
        let uuid = required(&raw.uuid, "uuid")?;
        let removed = required(&raw.removed, "removed")?;

        let product_price = strip_currency(&price)
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite() && *p >= 0.0)
            .ok_or(RejectReason::InvalidNumber {
                column: "product_price",
                raw: price,
            })?;
        let date_added = required_date(&self.dates, &raw.date_added, "date_added")?;
        let uuid = parse_uuid(&uuid, "uuid")?;
        let still_available = parse_availability(&removed).ok_or(RejectReason::UnexpectedValue {
            column: "removed",
            raw: removed,
        })?;

        let kg = self
            .weights
            .to_kg(&weight)
            .ok_or(RejectReason::InvalidWeight { raw: weight })?;

        Ok(ProductRecord {
            product_code,
            product_name,
            product_price,
            weight: kg,
            weight_class: WeightClass::from_kg(kg),
            category: categories.intern(&category),
            ean,
            date_added,
            uuid,
            still_available,
        })
    }
}

impl Cleaner for ProductCleaner {
    type Record = ProductRecord;

    fn clean(&self, rows: &[DataRow]) -> Cleaned<ProductRecord> {
        let mut categories = CategoryInterner::new();
        clean_table(ProductRecord::TABLE, rows, RawProduct::from_row, |raw| {
            self.clean_raw(raw, &mut categories)
        })
    }
}

/// Limpa os produtos e converte os pesos com a configuração padrão
pub fn convert_product_weights(rows: &[DataRow]) -> Cleaned<ProductRecord> {
    ProductCleaner::default().clean(rows)
}
