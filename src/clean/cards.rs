//! Limpeza da tabela de cartões (`dim_card_details`).

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::CleaningConfig;
use crate::error::RejectReason;
use crate::traits::{Cleaner, Record};
use crate::types::{DataRow, DataValue};
use super::dates::DateReconciler;
use super::text::{card_provider, Category, CategoryInterner};
use super::{clean_table, column, required, required_date, Cleaned};

/// Colunas de cartão como chegam da fonte
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawCard {
    pub card_number: DataValue,
    pub expiry_date: DataValue,
    pub card_provider: DataValue,
    pub date_payment_confirmed: DataValue,
}

impl RawCard {
    pub fn from_row(row: &DataRow) -> Self {
        Self {
            card_number: column(row, "card_number"),
            expiry_date: column(row, "expiry_date"),
            card_provider: column(row, "card_provider"),
            date_payment_confirmed: column(row, "date_payment_confirmed"),
        }
    }
}

/// Cartão limpo
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardRecord {
    pub card_number: String,
    /// Primeiro dia do mês de validade
    pub expiry_date: NaiveDate,
    pub card_provider: Category,
    pub date_payment_confirmed: NaiveDate,
}

impl Record for CardRecord {
    const TABLE: &'static str = "dim_card_details";
    const COLUMNS: &'static [&'static str] = &[
        "card_number",
        "expiry_date",
        "card_provider",
        "date_payment_confirmed",
    ];

    fn into_row(self) -> DataRow {
        let mut row = DataRow::with_capacity(Self::COLUMNS.len());
        row.insert("card_number".to_string(), self.card_number.into());
        row.insert("expiry_date".to_string(), self.expiry_date.into());
        row.insert("card_provider".to_string(), self.card_provider.as_str().into());
        row.insert("date_payment_confirmed".to_string(), self.date_payment_confirmed.into());
        row
    }
}

/// Remove espaços e o preenchimento "?" do número do cartão
///
/// Devolve `None` se sobrar qualquer caractere que não seja dígito.
pub fn clean_card_number(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '?')
        .collect();

    (!cleaned.is_empty() && cleaned.chars().all(|c| c.is_ascii_digit())).then_some(cleaned)
}

/// Converte a validade `MM/YY` no primeiro dia do mês
pub fn parse_expiry(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("01/{}", raw.trim()), "%d/%m/%y").ok()
}

/// Pipeline de limpeza de cartões
#[derive(Debug, Clone, Default)]
pub struct CardCleaner {
    dates: DateReconciler,
}

impl CardCleaner {
    pub fn new(_config: &CleaningConfig) -> Self {
        Self::default()
    }

    pub fn with_date_reconciler(mut self, dates: DateReconciler) -> Self {
        self.dates = dates;
        self
    }

    fn clean_raw(&self, raw: RawCard, providers: &mut CategoryInterner) -> Result<CardRecord, RejectReason> {
        let card_number = required(&raw.card_number, "card_number")?;
        let expiry = required(&raw.expiry_date, "expiry_date")?;
        let provider = required(&raw.card_provider, "card_provider")?;

        let card_number = clean_card_number(&card_number)
            .ok_or(RejectReason::InvalidCardNumber { raw: card_number })?;
        let expiry_date = parse_expiry(&expiry).ok_or(RejectReason::InvalidDate {
            column: "expiry_date",
            raw: expiry,
        })?;
        let date_payment_confirmed =
            required_date(&self.dates, &raw.date_payment_confirmed, "date_payment_confirmed")?;

        if expiry_date >= date_payment_confirmed {
            return Err(RejectReason::ExpiryNotBeforePayment {
                expiry: expiry_date.to_string(),
                confirmed: date_payment_confirmed.to_string(),
            });
        }

        let provider = card_provider(&provider).ok_or(RejectReason::Missing { column: "card_provider" })?;

        Ok(CardRecord {
            card_number,
            expiry_date,
            card_provider: providers.intern(provider),
            date_payment_confirmed,
        })
    }
}

impl Cleaner for CardCleaner {
    type Record = CardRecord;

    fn clean(&self, rows: &[DataRow]) -> Cleaned<CardRecord> {
        let mut providers = CategoryInterner::new();
        clean_table(CardRecord::TABLE, rows, RawCard::from_row, |raw| {
            self.clean_raw(raw, &mut providers)
        })
    }
}

/// Limpa a tabela de cartões com a configuração padrão
pub fn clean_card_data(rows: &[DataRow]) -> Cleaned<CardRecord> {
    CardCleaner::default().clean(rows)
}
