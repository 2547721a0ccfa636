//! # Esquema estrela
//!
//! Descreve as seis tabelas de destino, suas chaves e as chaves estrangeiras
//! de `orders_table`, e verifica em memória se as restrições se manteriam
//! sobre as tabelas limpas.

use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;
use uuid::Uuid;

use crate::clean::{CardRecord, DateTimeRecord, OrderRecord, ProductRecord, StoreRecord, UserRecord};
use crate::traits::Record;

/// Tabela do warehouse e sua chave primária
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub name: &'static str,
    pub primary_key: Option<&'static str>,
}

/// Chave estrangeira de `orders_table` para uma dimensão
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references: &'static str,
}

pub const DIM_USERS: TableSchema = TableSchema { name: UserRecord::TABLE, primary_key: Some("user_uuid") };
pub const DIM_CARD_DETAILS: TableSchema = TableSchema { name: CardRecord::TABLE, primary_key: Some("card_number") };
pub const DIM_STORE_DETAILS: TableSchema = TableSchema { name: StoreRecord::TABLE, primary_key: Some("store_code") };
pub const DIM_PRODUCTS: TableSchema = TableSchema { name: ProductRecord::TABLE, primary_key: Some("product_code") };
pub const DIM_DATE_TIMES: TableSchema = TableSchema { name: DateTimeRecord::TABLE, primary_key: Some("date_uuid") };
pub const ORDERS_TABLE: TableSchema = TableSchema { name: OrderRecord::TABLE, primary_key: None };

/// Todas as tabelas, dimensões primeiro
pub const TABLES: [TableSchema; 6] = [
    DIM_USERS,
    DIM_CARD_DETAILS,
    DIM_STORE_DETAILS,
    DIM_PRODUCTS,
    DIM_DATE_TIMES,
    ORDERS_TABLE,
];

pub const FOREIGN_KEYS: [ForeignKey; 5] = [
    ForeignKey { column: "user_uuid", references: UserRecord::TABLE },
    ForeignKey { column: "card_number", references: CardRecord::TABLE },
    ForeignKey { column: "store_code", references: StoreRecord::TABLE },
    ForeignKey { column: "product_code", references: ProductRecord::TABLE },
    ForeignKey { column: "date_uuid", references: DateTimeRecord::TABLE },
];

/// Tabelas de dimensão limpas, emprestadas para a verificação
#[derive(Debug, Clone, Copy, Default)]
pub struct Dimensions<'a> {
    pub users: &'a [UserRecord],
    pub cards: &'a [CardRecord],
    pub stores: &'a [StoreRecord],
    pub products: &'a [ProductRecord],
    pub date_times: &'a [DateTimeRecord],
}

/// Resultado da verificação de integridade referencial
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrityReport {
    /// Pedidos sem linha correspondente, por chave estrangeira
    pub orphaned: BTreeMap<ForeignKey, usize>,
    /// Valores repetidos de chave primária, por tabela
    pub duplicate_keys: BTreeMap<&'static str, usize>,
}

impl IntegrityReport {
    pub fn is_consistent(&self) -> bool {
        self.orphaned.is_empty() && self.duplicate_keys.is_empty()
    }

    pub fn orphans_for(&self, column: &str) -> usize {
        self.orphaned
            .iter()
            .find(|(fk, _)| fk.column == column)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }
}

struct KeySet<K> {
    keys: HashSet<K>,
    duplicates: usize,
}

impl<K: Hash + Eq> KeySet<K> {
    fn build(keys: impl Iterator<Item = K>) -> Self {
        let mut set = KeySet { keys: HashSet::new(), duplicates: 0 };
        for key in keys {
            if !set.keys.insert(key) {
                set.duplicates += 1;
            }
        }
        set
    }

    fn missing<'a, Q>(&self, values: impl Iterator<Item = &'a Q>) -> usize
    where
        K: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized + 'a,
    {
        values.filter(|v| !self.keys.contains(*v)).count()
    }
}

/// Verifica se as chaves primárias são únicas e se todo pedido aponta para
/// linhas existentes em cada dimensão
pub fn check_integrity(dimensions: &Dimensions<'_>, orders: &[OrderRecord]) -> IntegrityReport {
    let users: KeySet<Uuid> = KeySet::build(dimensions.users.iter().map(|u| u.user_uuid));
    let cards: KeySet<&str> = KeySet::build(dimensions.cards.iter().map(|c| c.card_number.as_str()));
    let stores: KeySet<&str> = KeySet::build(dimensions.stores.iter().map(|s| s.store_code.as_str()));
    let products: KeySet<&str> = KeySet::build(dimensions.products.iter().map(|p| p.product_code.as_str()));
    let dates: KeySet<Uuid> = KeySet::build(dimensions.date_times.iter().map(|d| d.date_uuid));

    let mut report = IntegrityReport::default();

    let duplicates = [
        (DIM_USERS.name, users.duplicates),
        (DIM_CARD_DETAILS.name, cards.duplicates),
        (DIM_STORE_DETAILS.name, stores.duplicates),
        (DIM_PRODUCTS.name, products.duplicates),
        (DIM_DATE_TIMES.name, dates.duplicates),
    ];
    for (table, count) in duplicates {
        if count > 0 {
            report.duplicate_keys.insert(table, count);
        }
    }

    let orphans = [
        users.missing(orders.iter().map(|o| &o.user_uuid)),
        cards.missing(orders.iter().map(|o| o.card_number.as_str())),
        stores.missing(orders.iter().map(|o| o.store_code.as_str())),
        products.missing(orders.iter().map(|o| o.product_code.as_str())),
        dates.missing(orders.iter().map(|o| &o.date_uuid)),
    ];
    for (fk, count) in FOREIGN_KEYS.into_iter().zip(orphans) {
        if count > 0 {
            report.orphaned.insert(fk, count);
        }
    }

    if report.is_consistent() {
        tracing::info!(orders = orders.len(), "Integridade referencial verificada");
    } else {
        tracing::warn!(
            orphaned = ?report.orphaned,
            duplicate_keys = ?report.duplicate_keys,
            "Restrições do esquema estrela seriam violadas"
        );
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::orders::clean_orders_data;
    use crate::clean::stores::clean_store_data;
    use crate::clean::test_support::row;
    use crate::clean::date_times::clean_date_data;

    const DATE_UUID: &str = "9476f17e-5d6a-4117-874d-9cdb38ca1fa6";

    fn orders(store_codes: &[&str]) -> Vec<OrderRecord> {
        let rows: Vec<_> = store_codes
            .iter()
            .enumerate()
            .map(|(i, code)| {
                let quantity = (i + 1).to_string();
                row(&[
                    ("date_uuid", DATE_UUID),
                    ("user_uuid", "93caf182-e4e9-4c6e-bebb-60a1a9dcf9b8"),
                    ("card_number", "4971858637664481"),
                    ("store_code", code),
                    ("product_code", "R7-3126933h"),
                    ("product_quantity", quantity.as_str()),
                ])
            })
            .collect();
        clean_orders_data(&rows).records
    }

    fn stores(codes: &[&str]) -> Vec<StoreRecord> {
        let rows: Vec<_> = codes
            .iter()
            .map(|code| {
                row(&[
                    ("address", "1 High St"),
                    ("longitude", "N/A"),
                    ("latitude", "N/A"),
                    ("locality", "Bath"),
                    ("store_code", code),
                    ("staff_numbers", "12"),
                    ("opening_date", "2006-03-24"),
                    ("store_type", "Local"),
                    ("country_code", "GB"),
                    ("continent", "Europe"),
                ])
            })
            .collect();
        clean_store_data(&rows).records
    }

    #[test]
    fn test_schema_descriptor() {
        assert_eq!(TABLES.len(), 6);
        assert_eq!(ORDERS_TABLE.name, "orders_table");
        assert!(TABLES[..5].iter().all(|t| t.primary_key.is_some()));
        assert!(FOREIGN_KEYS.iter().all(|fk| TABLES.iter().any(|t| t.name == fk.references)));
    }

    #[test]
    fn test_orphaned_orders_are_counted() {
        let stores = stores(&["BL-8387506C"]);
        let dates = clean_date_data(&[row(&[
            ("timestamp", "22:00:06"),
            ("month", "9"),
            ("year", "2012"),
            ("day", "19"),
            ("time_period", "Evening"),
            ("date_uuid", DATE_UUID),
        ])])
        .records;
        let orders = orders(&["BL-8387506C", "WEB-1388012W", "XX-0000000"]);

        let dimensions = Dimensions {
            stores: &stores,
            date_times: &dates,
            ..Dimensions::default()
        };
        let report = check_integrity(&dimensions, &orders);

        assert!(!report.is_consistent());
        assert_eq!(report.orphans_for("store_code"), 2);
        assert_eq!(report.orphans_for("date_uuid"), 0);
        assert_eq!(report.orphans_for("user_uuid"), 3);
    }

    #[test]
    fn test_duplicate_primary_keys() {
        let stores = stores(&["BL-8387506C", "BL-8387506C "]);
        let dimensions = Dimensions { stores: &stores, ..Dimensions::default() };

        let report = check_integrity(&dimensions, &[]);
        assert_eq!(report.duplicate_keys.get(DIM_STORE_DETAILS.name), Some(&1));
        assert!(report.orphaned.is_empty());
    }
}
