//! # Limpeza
//!
//! Os seis pipelines de limpeza (usuários, cartões, lojas, produtos, pedidos e
//! datas) e as rotinas que eles compartilham.
//!
//! Cada pipeline é uma função pura de tabela bruta para tabela limpa, aplicada
//! nesta ordem: deduplicação, rejeição de ausentes, normalização de texto,
//! conversão de tipos, transformações do domínio e descarte das linhas que
//! falharam. A tabela de entrada é apenas emprestada e nunca alterada.

pub mod dates;
pub mod text;
pub mod phone;
pub mod weight;

pub mod users;
pub mod cards;
pub mod stores;
pub mod products;
pub mod orders;
pub mod date_times;

use std::collections::HashSet;
use std::hash::Hash;
use chrono::NaiveDate;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{ETLError, RejectReason, Result, TransformError};
use crate::traits::{Cleaner, Record};
use crate::types::{DataRow, DataValue, PipelineResult};
use self::dates::DateReconciler;

pub use self::cards::{CardCleaner, CardRecord};
pub use self::date_times::{DateTimeCleaner, DateTimeRecord};
pub use self::orders::{OrderCleaner, OrderRecord};
pub use self::products::{ProductCleaner, ProductRecord};
pub use self::stores::{CountryCode, StoreCleaner, StoreRecord};
pub use self::users::{UserCleaner, UserRecord};

/// Uma linha descartada e o motivo
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    /// Posição da linha na tabela bruta
    pub row: usize,
    pub reason: RejectReason,
}

/// Resumo de uma execução de limpeza
#[derive(Debug, Clone, PartialEq)]
pub struct CleaningReport {
    pub table: &'static str,
    pub rows_in: usize,
    pub rows_out: usize,
    pub duplicates_removed: usize,
    pub rejections: Vec<Rejection>,
}

impl CleaningReport {
    pub fn rows_rejected(&self) -> usize {
        self.rejections.len()
    }

    /// Rejeições causadas por valores ausentes
    pub fn missing_count(&self) -> usize {
        self.rejections.iter().filter(|r| r.reason.is_missing()).count()
    }

    /// Rejeições causadas por valores presentes porém inválidos
    pub fn invalid_count(&self) -> usize {
        self.rejections.len() - self.missing_count()
    }

    /// Converte o relatório no resultado genérico de pipeline
    pub fn to_pipeline_result(&self) -> PipelineResult {
        PipelineResult {
            rows_processed: self.rows_in,
            rows_successful: self.rows_out,
            rows_failed: self.rejections.len(),
            execution_time_ms: 0,
            errors: self
                .rejections
                .iter()
                .map(|r| format!("{} linha {}: {}", self.table, r.row, r.reason))
                .collect(),
        }
    }
}

/// Tabela limpa: registros tipados mais o relatório da limpeza
#[derive(Debug, Clone)]
pub struct Cleaned<R> {
    pub records: Vec<R>,
    pub report: CleaningReport,
}

impl<R: Record> Cleaned<R> {
    /// Converte os registros em linhas para os carregadores
    pub fn into_rows(self) -> Vec<DataRow> {
        self.records.into_iter().map(Record::into_row).collect()
    }
}

/// Executa um limpador numa thread de bloqueio do tokio
///
/// Permite limpar tabelas diferentes em paralelo, uma por núcleo.
pub async fn clean_in_background<C>(cleaner: C, rows: Vec<DataRow>) -> Result<Cleaned<C::Record>>
where
    C: Cleaner + 'static,
{
    tokio::task::spawn_blocking(move || cleaner.clean(&rows))
        .await
        .map_err(|e| ETLError::Transform(TransformError::TaskAborted(e.to_string())))
}

/// Laço comum a todos os pipelines
///
/// `project` extrai a projeção bruta da linha (que define duplicidade) e
/// `clean` converte a projeção no registro limpo ou a rejeita.
pub(crate) fn clean_table<Raw, R, P, F>(
    table: &'static str,
    rows: &[DataRow],
    project: P,
    mut clean: F,
) -> Cleaned<R>
where
    Raw: Hash + Eq + Clone,
    P: Fn(&DataRow) -> Raw,
    F: FnMut(Raw) -> std::result::Result<R, RejectReason>,
{
    let mut seen: HashSet<Raw> = HashSet::with_capacity(rows.len());
    let mut records = Vec::with_capacity(rows.len());
    let mut rejections = Vec::new();
    let mut duplicates_removed = 0;

    for (index, row) in rows.iter().enumerate() {
        let raw = project(row);
        if !seen.insert(raw.clone()) {
            duplicates_removed += 1;
            continue;
        }

        match clean(raw) {
            Ok(record) => records.push(record),
            Err(reason) => {
                debug!(table = table, row = index, reason = %reason, "Linha rejeitada");
                rejections.push(Rejection { row: index, reason });
            }
        }
    }

    let report = CleaningReport {
        table,
        rows_in: rows.len(),
        rows_out: records.len(),
        duplicates_removed,
        rejections,
    };

    info!(
        table = table,
        rows_in = report.rows_in,
        rows_out = report.rows_out,
        duplicates_removed = report.duplicates_removed,
        rows_rejected = report.rows_rejected(),
        "Tabela limpa"
    );

    Cleaned { records, report }
}

/// Valor da coluna, ou `Null` quando a coluna não existe na linha
pub(crate) fn column(row: &DataRow, name: &str) -> DataValue {
    row.get(name).cloned().unwrap_or(DataValue::Null)
}

/// Texto obrigatório, já sem espaços nas bordas
pub(crate) fn required(value: &DataValue, column: &'static str) -> std::result::Result<String, RejectReason> {
    if value.is_missing() {
        return Err(RejectReason::Missing { column });
    }
    value
        .as_text()
        .map(|text| text.trim().to_string())
        .ok_or(RejectReason::Missing { column })
}

/// Data obrigatória, reconciliada entre os formatos aceitos
pub(crate) fn required_date(
    reconciler: &DateReconciler,
    value: &DataValue,
    column: &'static str,
) -> std::result::Result<NaiveDate, RejectReason> {
    if let Some(date) = value.as_date() {
        return Ok(date);
    }
    let raw = required(value, column)?;
    reconciler
        .reconcile(&raw)
        .ok_or(RejectReason::InvalidDate { column, raw })
}

pub(crate) fn parse_uuid(raw: &str, column: &'static str) -> std::result::Result<Uuid, RejectReason> {
    Uuid::parse_str(raw.trim()).map_err(|_| RejectReason::InvalidUuid {
        column,
        raw: raw.to_string(),
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::types::{DataRow, DataValue};

    /// Monta uma linha a partir de pares coluna/texto
    pub fn row(cells: &[(&str, &str)]) -> DataRow {
        cells
            .iter()
            .map(|(k, v)| (k.to_string(), DataValue::String(v.to_string())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::test_support::row;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct RawName {
        name: DataValue,
    }

    fn clean_names(rows: &[DataRow]) -> Cleaned<String> {
        clean_table(
            "names",
            rows,
            |r| RawName { name: column(r, "name") },
            |raw| required(&raw.name, "name"),
        )
    }

    #[test]
    fn test_duplicates_are_removed_before_validation() {
        let rows = vec![
            row(&[("name", "Ana"), ("index", "0")]),
            row(&[("name", "Ana"), ("index", "1")]),
            row(&[("name", "NULL")]),
            row(&[("name", "NULL")]),
        ];

        let cleaned = clean_names(&rows);
        assert_eq!(cleaned.records, vec!["Ana".to_string()]);
        assert_eq!(cleaned.report.duplicates_removed, 2);
        // A duplicata inválida não é contada duas vezes
        assert_eq!(cleaned.report.rows_rejected(), 1);
        assert_eq!(cleaned.report.rejections[0].row, 2);
    }

    #[test]
    fn test_rows_with_nan_cells_are_deduplicated() {
        let mut web = row(&[
            ("address", "N/A"),
            ("locality", "N/A"),
            ("store_code", "WEB-1388012W"),
            ("staff_numbers", "325"),
            ("opening_date", "2010-06-12"),
            ("store_type", "Web Portal"),
            ("country_code", "GB"),
            ("continent", "Europe"),
        ]);
        web.insert("longitude".to_string(), DataValue::Float(f64::NAN));
        web.insert("latitude".to_string(), DataValue::Float(-0.0));
        let mut twin = web.clone();
        twin.insert("latitude".to_string(), DataValue::Float(0.0));

        let cleaned = stores::clean_store_data(&[web, twin]);
        assert_eq!(cleaned.records.len(), 1);
        assert_eq!(cleaned.report.duplicates_removed, 1);
    }

    #[test]
    fn test_absent_column_is_missing() {
        let rows = vec![row(&[("other", "x")])];
        let cleaned = clean_names(&rows);
        assert!(cleaned.records.is_empty());
        assert_eq!(cleaned.report.missing_count(), 1);
        assert_eq!(cleaned.report.invalid_count(), 0);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let rows = vec![row(&[("name", "  Bia  ")])];
        let before = rows.clone();
        let cleaned = clean_names(&rows);
        assert_eq!(cleaned.records, vec!["Bia".to_string()]);
        assert_eq!(rows, before);
    }

    #[test]
    fn test_report_to_pipeline_result() {
        let rows = vec![row(&[("name", "Ana")]), row(&[("name", "")])];
        let result = clean_names(&rows).report.to_pipeline_result();
        assert_eq!(result.rows_processed, 2);
        assert_eq!(result.rows_successful, 1);
        assert_eq!(result.rows_failed, 1);
        assert!(result.errors[0].contains("names linha 1"));
    }

    #[test]
    fn test_required_date_accepts_typed_values() {
        let reconciler = DateReconciler::default();
        let date = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
        assert_eq!(required_date(&reconciler, &DataValue::Date(date), "d"), Ok(date));
        assert_eq!(
            required_date(&reconciler, &DataValue::String("bad".to_string()), "d"),
            Err(RejectReason::InvalidDate { column: "d", raw: "bad".to_string() })
        );
    }

    #[test]
    fn test_clean_in_background() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let rows = vec![row(&[
            ("date_uuid", "9476f17e-5d6a-4117-874d-9cdb38ca1fa6"),
            ("user_uuid", "93caf182-e4e9-4c6e-bebb-60a1a9dcf9b8"),
            ("card_number", "30060773296197"),
            ("store_code", "BL-8387506C"),
            ("product_code", "R7-3126933h"),
            ("product_quantity", "3"),
        ])];

        let cleaned = runtime
            .block_on(clean_in_background(OrderCleaner::new(), rows))
            .unwrap();
        assert_eq!(cleaned.records.len(), 1);
    }
}
