//! Limpeza das seis tabelas do esquema estrela numa só chamada
//!
//! Cada pipeline roda na sua própria thread de bloqueio; nenhuma depende da
//! outra. No máximo `pipeline.parallel_workers` limpezas rodam ao mesmo
//! tempo. Depois da limpeza, [`CleanedWarehouse::integrity`] confere as
//! chaves estrangeiras de `orders_table` contra as dimensões.

use crate::clean::{
    clean_in_background, CardCleaner, CardRecord, Cleaned, CleaningReport, DateTimeCleaner,
    DateTimeRecord, OrderCleaner, OrderRecord, ProductCleaner, ProductRecord, StoreCleaner,
    StoreRecord, UserCleaner, UserRecord,
};
use crate::config::ETLConfig;
use crate::error::{ETLError, Result, TransformError};
use crate::schema::{check_integrity, Dimensions, IntegrityReport};
use crate::traits::Cleaner;
use crate::types::DataRow;
use tokio::sync::Semaphore;

/// Tabelas brutas, como saíram dos extratores
#[derive(Debug, Clone, Default)]
pub struct RawTables {
    pub users: Vec<DataRow>,
    pub cards: Vec<DataRow>,
    pub stores: Vec<DataRow>,
    pub products: Vec<DataRow>,
    pub orders: Vec<DataRow>,
    pub date_times: Vec<DataRow>,
}

/// Resultado da limpeza de todas as tabelas
#[derive(Debug, Clone)]
pub struct CleanedWarehouse {
    pub users: Cleaned<UserRecord>,
    pub cards: Cleaned<CardRecord>,
    pub stores: Cleaned<StoreRecord>,
    pub products: Cleaned<ProductRecord>,
    pub orders: Cleaned<OrderRecord>,
    pub date_times: Cleaned<DateTimeRecord>,
}

impl CleanedWarehouse {
    /// Relatórios na ordem das tabelas do esquema
    pub fn reports(&self) -> [&CleaningReport; 6] {
        [
            &self.users.report,
            &self.cards.report,
            &self.stores.report,
            &self.products.report,
            &self.date_times.report,
            &self.orders.report,
        ]
    }

    pub fn rows_rejected(&self) -> usize {
        self.reports().iter().map(|r| r.rows_rejected()).sum()
    }

    /// Confere as chaves estrangeiras dos pedidos limpos
    pub fn integrity(&self) -> IntegrityReport {
        let dimensions = Dimensions {
            users: &self.users.records,
            cards: &self.cards.records,
            stores: &self.stores.records,
            products: &self.products.records,
            date_times: &self.date_times.records,
        };
        check_integrity(&dimensions, &self.orders.records)
    }
}

/// Limpa um pipeline assim que houver uma vaga no semáforo
async fn clean_bounded<C>(permits: &Semaphore, cleaner: C, rows: Vec<DataRow>) -> Result<Cleaned<C::Record>>
where
    C: Cleaner + 'static,
{
    let _permit = permits
        .acquire()
        .await
        .map_err(|e| ETLError::Transform(TransformError::TaskAborted(e.to_string())))?;
    clean_in_background(cleaner, rows).await
}

/// Limpa as seis tabelas em paralelo, limitado por `pipeline.parallel_workers`
pub async fn clean_all(raw: RawTables, config: &ETLConfig) -> Result<CleanedWarehouse> {
    let RawTables { users, cards, stores, products, orders, date_times } = raw;
    let cleaning = &config.cleaning;
    let permits = Semaphore::new(config.pipeline.parallel_workers.max(1));

    let (users, cards, stores, products, orders, date_times) = futures::try_join!(
        clean_bounded(&permits, UserCleaner::new(cleaning), users),
        clean_bounded(&permits, CardCleaner::new(cleaning), cards),
        clean_bounded(&permits, StoreCleaner::new(cleaning), stores),
        clean_bounded(&permits, ProductCleaner::new(cleaning), products),
        clean_bounded(&permits, OrderCleaner::from_config(cleaning), orders),
        clean_bounded(&permits, DateTimeCleaner::from_config(cleaning), date_times),
    )?;

    let warehouse = CleanedWarehouse { users, cards, stores, products, orders, date_times };

    tracing::info!(
        users = warehouse.users.records.len(),
        cards = warehouse.cards.records.len(),
        stores = warehouse.stores.records.len(),
        products = warehouse.products.records.len(),
        orders = warehouse.orders.records.len(),
        date_times = warehouse.date_times.records.len(),
        rows_rejected = warehouse.rows_rejected(),
        "Warehouse limpo"
    );

    Ok(warehouse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::test_support::row;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    const USER: &str = "93caf182-e4e9-4c6e-bebb-60a1a9dcf9b8";
    const DATE: &str = "0b2b3e9b-13ed-4d49-a2a8-6d2e6c6f2d8a";
    const PRODUCT_UUID: &str = "83dc0a69-f96f-4c34-bcb7-928acae19a94";

    fn raw_tables(order_store: &str) -> RawTables {
        RawTables {
            users: vec![row(&[
                ("first_name", "Sigfried"),
                ("last_name", "Noack"),
                ("date_of_birth", "1990-09-30"),
                ("company", "Heydrich Junitz KG"),
                ("email_address", "rudi79@winkler.de"),
                ("address", "Zimmerstr. 1/0\n59015 Gießen"),
                ("country", "Germany"),
                ("country_code", "DE"),
                ("phone_number", "+49 30 1234567"),
                ("join_date", "2018-10-10"),
                ("user_uuid", USER),
            ])],
            cards: vec![row(&[
                ("card_number", "4971858637664481"),
                ("expiry_date", "09/15"),
                ("card_provider", "VISA 16 digit"),
                ("date_payment_confirmed", "2015-11-25"),
            ])],
            stores: vec![row(&[
                ("store_code", "WEB-1388012W"),
                ("address", "N/A"),
                ("longitude", "N/A"),
                ("latitude", "N/A"),
                ("locality", "N/A"),
                ("staff_numbers", "325"),
                ("opening_date", "2010-06-12"),
                ("store_type", "Web Portal"),
                ("country_code", "GB"),
                ("continent", "Europe"),
            ])],
            products: vec![row(&[
                ("product_name", "FurReal Dazzlin' Dimples"),
                ("product_price", "£39.99"),
                ("weight", "1.6kg"),
                ("category", "toys-and-games"),
                ("EAN", "7425710935115"),
                ("date_added", "2005-12-02"),
                ("uuid", PRODUCT_UUID),
                ("removed", "Still_avaliable"),
                ("product_code", "R7-3126933h"),
            ])],
            orders: vec![row(&[
                ("date_uuid", DATE),
                ("user_uuid", USER),
                ("card_number", "4971858637664481"),
                ("store_code", order_store),
                ("product_code", "R7-3126933h"),
                ("product_quantity", "3"),
            ])],
            date_times: vec![row(&[
                ("timestamp", "22:00:06"),
                ("month", "9"),
                ("year", "2012"),
                ("day", "19"),
                ("time_period", "Evening"),
                ("date_uuid", DATE),
            ])],
        }
    }

    #[tokio::test]
    async fn test_clean_all_tables() {
        let warehouse = clean_all(raw_tables("WEB-1388012W"), &ETLConfig::default())
            .await
            .unwrap();

        assert_eq!(warehouse.users.records.len(), 1);
        assert_eq!(warehouse.cards.records.len(), 1);
        assert_eq!(warehouse.stores.records.len(), 1);
        assert_eq!(warehouse.products.records.len(), 1);
        assert_eq!(warehouse.orders.records.len(), 1);
        assert_eq!(warehouse.date_times.records.len(), 1);
        assert_eq!(warehouse.rows_rejected(), 0);
        assert!(warehouse.integrity().is_consistent());
    }

    #[tokio::test]
    async fn test_orphaned_store_is_reported() {
        let config = ETLConfig::builder().parallel_workers(1).build().unwrap();
        let warehouse = clean_all(raw_tables("XX-00000000"), &config)
            .await
            .unwrap();

        let integrity = warehouse.integrity();
        assert!(!integrity.is_consistent());
        assert_eq!(integrity.orphans_for("store_code"), 1);
        assert_eq!(integrity.orphans_for("user_uuid"), 0);
    }

    /// Limpador que só mede quantas execuções estão em andamento
    #[derive(Clone, Default)]
    struct GaugeCleaner {
        active: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    impl Cleaner for GaugeCleaner {
        type Record = OrderRecord;

        fn clean(&self, _rows: &[DataRow]) -> Cleaned<OrderRecord> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(30));
            self.active.fetch_sub(1, Ordering::SeqCst);
            OrderCleaner::new().clean(&[])
        }
    }

    #[tokio::test]
    async fn test_parallel_workers_bounds_concurrency() {
        let gauge = GaugeCleaner::default();
        let permits = Semaphore::new(2);

        futures::try_join!(
            clean_bounded(&permits, gauge.clone(), Vec::new()),
            clean_bounded(&permits, gauge.clone(), Vec::new()),
            clean_bounded(&permits, gauge.clone(), Vec::new()),
            clean_bounded(&permits, gauge.clone(), Vec::new()),
            clean_bounded(&permits, gauge.clone(), Vec::new()),
        )
        .unwrap();

        let peak = gauge.peak.load(Ordering::SeqCst);
        assert!((1..=2).contains(&peak), "pico de {} execuções", peak);
    }
}
