//! Limpeza da tabela de datas dos pedidos (`dim_date_times`).

use chrono::{Datelike, NaiveDateTime};
use serde::Serialize;
use uuid::Uuid;

use crate::config::CleaningConfig;
use crate::error::RejectReason;
use crate::traits::{Cleaner, Record};
use crate::types::{DataRow, DataValue};
use super::text::{Category, CategoryInterner};
use super::{clean_table, column, parse_uuid, required, Cleaned};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Colunas de data como chegam da fonte
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawDateTime {
    pub timestamp: DataValue,
    pub month: DataValue,
    pub year: DataValue,
    pub day: DataValue,
    pub time_period: DataValue,
    pub date_uuid: DataValue,
}

impl RawDateTime {
    pub fn from_row(row: &DataRow) -> Self {
        Self {
            timestamp: column(row, "timestamp"),
            month: column(row, "month"),
            year: column(row, "year"),
            day: column(row, "day"),
            time_period: column(row, "time_period"),
            date_uuid: column(row, "date_uuid"),
        }
    }
}

/// Momento de um pedido, com os componentes derivados do valor validado
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateTimeRecord {
    pub date_uuid: Uuid,
    pub datetime: NaiveDateTime,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub time_period: Category,
}

impl Record for DateTimeRecord {
    const TABLE: &'static str = "dim_date_times";
    const COLUMNS: &'static [&'static str] = &["date_uuid", "datetime", "year", "month", "day", "time_period"];

    fn into_row(self) -> DataRow {
        let mut row = DataRow::with_capacity(Self::COLUMNS.len());
        row.insert("date_uuid".to_string(), self.date_uuid.to_string().into());
        row.insert("datetime".to_string(), self.datetime.into());
        row.insert("year".to_string(), i64::from(self.year).into());
        row.insert("month".to_string(), i64::from(self.month).into());
        row.insert("day".to_string(), i64::from(self.day).into());
        row.insert("time_period".to_string(), self.time_period.as_str().into());
        row
    }
}

/// Junta ano, mês, dia e horário num único valor
pub fn combine_datetime(year: &str, month: &str, day: &str, timestamp: &str) -> Option<NaiveDateTime> {
    let text = format!("{}-{}-{} {}", year.trim(), month.trim(), day.trim(), timestamp.trim());
    NaiveDateTime::parse_from_str(&text, DATETIME_FORMAT).ok()
}

/// Pipeline de limpeza de datas
#[derive(Debug, Clone, Default)]
pub struct DateTimeCleaner;

impl DateTimeCleaner {
    pub fn new() -> Self {
        Self
    }

    pub fn from_config(_config: &CleaningConfig) -> Self {
        Self
    }

    fn clean_raw(&self, raw: RawDateTime, periods: &mut CategoryInterner) -> Result<DateTimeRecord, RejectReason> {
        let timestamp = required(&raw.timestamp, "timestamp")?;
        let month = required(&raw.month, "month")?;
        let year = required(&raw.year, "year")?;
        let day = required(&raw.day, "day")?;
        let time_period = required(&raw.time_period, "time_period")?;
        let date_uuid = required(&raw.date_uuid, "date_uuid")?;

        let datetime = combine_datetime(&year, &month, &day, &timestamp).ok_or_else(|| {
            RejectReason::InvalidDate {
                column: "timestamp",
                raw: format!("{}-{}-{} {}", year, month, day, timestamp),
            }
        })?;
        let date_uuid = parse_uuid(&date_uuid, "date_uuid")?;

        Ok(DateTimeRecord {
            date_uuid,
            datetime,
            year: datetime.year(),
            month: datetime.month(),
            day: datetime.day(),
            time_period: periods.intern(&time_period),
        })
    }
}

impl Cleaner for DateTimeCleaner {
    type Record = DateTimeRecord;

    fn clean(&self, rows: &[DataRow]) -> Cleaned<DateTimeRecord> {
        let mut periods = CategoryInterner::new();
        clean_table(DateTimeRecord::TABLE, rows, RawDateTime::from_row, |raw| {
            self.clean_raw(raw, &mut periods)
        })
    }
}

/// Limpa a tabela de datas
pub fn clean_date_data(rows: &[DataRow]) -> Cleaned<DateTimeRecord> {
    DateTimeCleaner::new().clean(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::test_support::row;
    use chrono::NaiveDate;

    fn date_row(year: &str, month: &str, day: &str, timestamp: &str) -> DataRow {
        row(&[
            ("timestamp", timestamp),
            ("month", month),
            ("year", year),
            ("day", day),
            ("time_period", "Evening"),
            ("date_uuid", "3b7ca996-37f9-433f-b6d0-ce8391b615ad"),
        ])
    }

    #[test]
    fn test_components_are_combined() {
        let cleaned = clean_date_data(&[date_row("2012", "9", "19", "22:00:06")]);
        let record = &cleaned.records[0];
        let expected = NaiveDate::from_ymd_opt(2012, 9, 19)
            .unwrap()
            .and_hms_opt(22, 0, 6)
            .unwrap();

        assert_eq!(record.datetime, expected);
        assert_eq!((record.year, record.month, record.day), (2012, 9, 19));
        assert_eq!(record.time_period, "Evening");
    }

    #[test]
    fn test_invalid_components_are_rejected() {
        let rows = vec![
            date_row("2012", "2", "30", "10:00:00"),
            date_row("2012", "NULL", "19", "22:00:06"),
            date_row("2012", "DXBU6GX1VC", "19", "22:00:06"),
            date_row("2012", "9", "19", "25:00:00"),
        ];

        let cleaned = clean_date_data(&rows);
        assert!(cleaned.records.is_empty());
        assert_eq!(cleaned.report.missing_count(), 1);
        assert_eq!(cleaned.report.invalid_count(), 3);
    }

    #[test]
    fn test_numeric_components_from_source() {
        let mut raw = date_row("", "", "", "09:15:00");
        raw.insert("year".to_string(), DataValue::Integer(2020));
        raw.insert("month".to_string(), DataValue::Integer(1));
        raw.insert("day".to_string(), DataValue::Integer(5));

        let cleaned = clean_date_data(&[raw]);
        assert_eq!(cleaned.records[0].datetime.date(), NaiveDate::from_ymd_opt(2020, 1, 5).unwrap());
    }

    #[test]
    fn test_combine_datetime() {
        assert!(combine_datetime("1993", "10", "27", "03:48:42").is_some());
        assert!(combine_datetime("1993", "10", "27", "03:48").is_none());
    }
}
