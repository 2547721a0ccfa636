//! Limpeza da tabela de lojas (`dim_store_details`).

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::config::CleaningConfig;
use crate::error::RejectReason;
use crate::traits::{Cleaner, Record};
use crate::types::{DataRow, DataValue};
use super::dates::DateReconciler;
use super::text::{digits_only, fix_continent, fix_country_code, normalize_address, Category, CategoryInterner};
use super::{clean_table, column, required, required_date, Cleaned};

/// Marcador usado pela loja virtual nas colunas de localização
const NOT_APPLICABLE: &str = "N/A";

/// Países onde a rede opera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountryCode {
    GB,
    US,
    DE,
}

impl CountryCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CountryCode::GB => "GB",
            CountryCode::US => "US",
            CountryCode::DE => "DE",
        }
    }
}

impl FromStr for CountryCode {
    type Err = RejectReason;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fix_country_code(s).as_str() {
            "GB" => Ok(CountryCode::GB),
            "US" => Ok(CountryCode::US),
            "DE" => Ok(CountryCode::DE),
            _ => Err(RejectReason::UnknownCountryCode { raw: s.to_string() }),
        }
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CountryCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Colunas de loja como chegam da fonte
///
/// A coluna `lat` é redundante com `latitude` e não entra na projeção.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawStore {
    pub address: DataValue,
    pub longitude: DataValue,
    pub latitude: DataValue,
    pub locality: DataValue,
    pub store_code: DataValue,
    pub staff_numbers: DataValue,
    pub opening_date: DataValue,
    pub store_type: DataValue,
    pub country_code: DataValue,
    pub continent: DataValue,
}

impl RawStore {
    pub fn from_row(row: &DataRow) -> Self {
        Self {
            address: column(row, "address"),
            longitude: column(row, "longitude"),
            latitude: column(row, "latitude"),
            locality: column(row, "locality"),
            store_code: column(row, "store_code"),
            staff_numbers: column(row, "staff_numbers"),
            opening_date: column(row, "opening_date"),
            store_type: column(row, "store_type"),
            country_code: column(row, "country_code"),
            continent: column(row, "continent"),
        }
    }
}

/// Loja limpa
///
/// Coordenadas são opcionais porque a loja virtual não tem endereço físico.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreRecord {
    pub store_code: String,
    pub address: String,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub locality: Category,
    pub staff_numbers: u16,
    pub opening_date: NaiveDate,
    pub store_type: Category,
    pub country_code: CountryCode,
    pub continent: Category,
}

impl Record for StoreRecord {
    const TABLE: &'static str = "dim_store_details";
    const COLUMNS: &'static [&'static str] = &[
        "store_code",
        "address",
        "longitude",
        "latitude",
        "locality",
        "staff_numbers",
        "opening_date",
        "store_type",
        "country_code",
        "continent",
    ];

    fn into_row(self) -> DataRow {
        let mut row = DataRow::with_capacity(Self::COLUMNS.len());
        row.insert("store_code".to_string(), self.store_code.into());
        row.insert("address".to_string(), self.address.into());
        row.insert("longitude".to_string(), self.longitude.into());
        row.insert("latitude".to_string(), self.latitude.into());
        row.insert("locality".to_string(), self.locality.as_str().into());
        row.insert("staff_numbers".to_string(), i64::from(self.staff_numbers).into());
        row.insert("opening_date".to_string(), self.opening_date.into());
        row.insert("store_type".to_string(), self.store_type.as_str().into());
        row.insert("country_code".to_string(), self.country_code.as_str().into());
        row.insert("continent".to_string(), self.continent.as_str().into());
        row
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Coordenada opcional arredondada para duas casas
fn coordinate(value: &DataValue, column: &'static str) -> Result<Option<f64>, RejectReason> {
    if value.is_missing() {
        return Ok(None);
    }
    let raw = value.as_text().unwrap_or_default();
    if raw.trim().eq_ignore_ascii_case(NOT_APPLICABLE) {
        return Ok(None);
    }
    value
        .as_float()
        .filter(|v| v.is_finite())
        .map(|v| Some(round2(v)))
        .ok_or(RejectReason::InvalidNumber { column, raw })
}

/// Pipeline de limpeza de lojas
#[derive(Debug, Clone, Default)]
pub struct StoreCleaner {
    dates: DateReconciler,
}

impl StoreCleaner {
    pub fn new(_config: &CleaningConfig) -> Self {
        Self::default()
    }

    pub fn with_date_reconciler(mut self, dates: DateReconciler) -> Self {
        self.dates = dates;
        self
    }

    fn clean_raw(&self, raw: RawStore, categories: &mut CategoryInterner) -> Result<StoreRecord, RejectReason> {
        let store_code = required(&raw.store_code, "store_code")?;
        let address = required(&raw.address, "address")?;
        let locality = required(&raw.locality, "locality")?;
        let staff_numbers = required(&raw.staff_numbers, "staff_numbers")?;
        let store_type = required(&raw.store_type, "store_type")?;
        let country_code = required(&raw.country_code, "country_code")?;
        let continent = required(&raw.continent, "continent")?;

        let address = normalize_address(&address);
        let continent = fix_continent(&continent);

        let opening_date = required_date(&self.dates, &raw.opening_date, "opening_date")?;
        let longitude = coordinate(&raw.longitude, "longitude")?;
        let latitude = coordinate(&raw.latitude, "latitude")?;
        let staff = digits_only(&staff_numbers)
            .parse::<u16>()
            .map_err(|_| RejectReason::InvalidNumber {
                column: "staff_numbers",
                raw: staff_numbers,
            })?;
        let country_code = country_code.parse::<CountryCode>()?;

        Ok(StoreRecord {
            store_code,
            address,
            longitude,
            latitude,
            locality: categories.intern(&locality),
            staff_numbers: staff,
            opening_date,
            store_type: categories.intern(&store_type),
            country_code,
            continent: categories.intern(&continent),
        })
    }
}

impl Cleaner for StoreCleaner {
    type Record = StoreRecord;

    fn clean(&self, rows: &[DataRow]) -> Cleaned<StoreRecord> {
        let mut categories = CategoryInterner::new();
        clean_table(StoreRecord::TABLE, rows, RawStore::from_row, |raw| {
            self.clean_raw(raw, &mut categories)
        })
    }
}

/// Limpa a tabela de lojas com a configuração padrão
pub fn clean_store_data(rows: &[DataRow]) -> Cleaned<StoreRecord> {
    StoreCleaner::default().clean(rows)
}
