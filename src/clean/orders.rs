//! Limpeza da tabela fato de pedidos (`orders_table`).

use serde::Serialize;
use uuid::Uuid;

use crate::config::CleaningConfig;
use crate::error::RejectReason;
use crate::traits::{Cleaner, Record};
use crate::types::{DataRow, DataValue};
use super::{clean_table, column, parse_uuid, required, Cleaned};

/// Colunas de pedido como chegam da fonte
///
/// `level_0`, `index`, `first_name`, `last_name` e `1` ficam de fora.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawOrder {
    pub date_uuid: DataValue,
    pub user_uuid: DataValue,
    pub card_number: DataValue,
    pub store_code: DataValue,
    pub product_code: DataValue,
    pub product_quantity: DataValue,
}

impl RawOrder {
    pub fn from_row(row: &DataRow) -> Self {
        Self {
            date_uuid: column(row, "date_uuid"),
            user_uuid: column(row, "user_uuid"),
            card_number: column(row, "card_number"),
            store_code: column(row, "store_code"),
            product_code: column(row, "product_code"),
            product_quantity: column(row, "product_quantity"),
        }
    }
}

/// Pedido limpo, só com as chaves das dimensões e a quantidade
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct OrderRecord {
    pub date_uuid: Uuid,
    pub user_uuid: Uuid,
    pub card_number: String,
    pub store_code: String,
    pub product_code: String,
    pub product_quantity: i16,
}

impl Record for OrderRecord {
    const TABLE: &'static str = "orders_table";
    const COLUMNS: &'static [&'static str] = &[
        "date_uuid",
        "user_uuid",
        "card_number",
        "store_code",
        "product_code",
        "product_quantity",
    ];

    fn into_row(self) -> DataRow {
        let mut row = DataRow::with_capacity(Self::COLUMNS.len());
        row.insert("date_uuid".to_string(), self.date_uuid.to_string().into());
        row.insert("user_uuid".to_string(), self.user_uuid.to_string().into());
        row.insert("card_number".to_string(), self.card_number.into());
        row.insert("store_code".to_string(), self.store_code.into());
        row.insert("product_code".to_string(), self.product_code.into());
        row.insert("product_quantity".to_string(), i64::from(self.product_quantity).into());
        row
    }
}

/// Pipeline de limpeza de pedidos
#[derive(Debug, Clone, Default)]
pub struct OrderCleaner;

impl OrderCleaner {
    pub fn new() -> Self {
        Self
    }

    pub fn from_config(_config: &CleaningConfig) -> Self {
        Self
    }

    fn clean_raw(&self, raw: RawOrder) -> Result<OrderRecord, RejectReason> {
        let date_uuid = required(&raw.date_uuid, "date_uuid")?;
        let user_uuid = required(&raw.user_uuid, "user_uuid")?;
        let card_number = required(&raw.card_number, "card_number")?;
        let store_code = required(&raw.store_code, "store_code")?;
        let product_code = required(&raw.product_code, "product_code")?;
        let quantity = required(&raw.product_quantity, "product_quantity")?;

        let date_uuid = parse_uuid(&date_uuid, "date_uuid")?;
        let user_uuid = parse_uuid(&user_uuid, "user_uuid")?;
        let product_quantity = raw
            .product_quantity
            .as_integer()
            .and_then(|q| i16::try_from(q).ok())
            .ok_or(RejectReason::InvalidNumber {
                column: "product_quantity",
                raw: quantity,
            })?;

        Ok(OrderRecord {
            date_uuid,
            user_uuid,
            card_number,
            store_code,
            product_code,
            product_quantity,
        })
    }
}

impl Cleaner for OrderCleaner {
    type Record = OrderRecord;

    fn clean(&self, rows: &[DataRow]) -> Cleaned<OrderRecord> {
        clean_table(OrderRecord::TABLE, rows, RawOrder::from_row, |raw| self.clean_raw(raw))
    }
}

/// Limpa a tabela de pedidos
pub fn clean_orders_data(rows: &[DataRow]) -> Cleaned<OrderRecord> {
    OrderCleaner::new().clean(rows)
}
