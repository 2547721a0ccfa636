//! Limpeza da tabela de usuários (`dim_users`).

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::config::CleaningConfig;
use crate::error::RejectReason;
use crate::traits::{Cleaner, Record};
use crate::types::{DataRow, DataValue};
use super::dates::DateReconciler;
use super::phone::PhoneRules;
use super::text::{fix_country_code, is_valid_email, normalize_address, Category, CategoryInterner};
use super::{clean_table, column, parse_uuid, required, required_date, Cleaned};

/// Colunas de usuário como chegam da fonte
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawUser {
    pub first_name: DataValue,
    pub last_name: DataValue,
    pub date_of_birth: DataValue,
    pub company: DataValue,
    pub email_address: DataValue,
    pub address: DataValue,
    pub country: DataValue,
    pub country_code: DataValue,
    pub phone_number: DataValue,
    pub join_date: DataValue,
    pub user_uuid: DataValue,
}

impl RawUser {
    pub fn from_row(row: &DataRow) -> Self {
        Self {
            first_name: column(row, "first_name"),
            last_name: column(row, "last_name"),
            date_of_birth: column(row, "date_of_birth"),
            company: column(row, "company"),
            email_address: column(row, "email_address"),
            address: column(row, "address"),
            country: column(row, "country"),
            country_code: column(row, "country_code"),
            phone_number: column(row, "phone_number"),
            join_date: column(row, "join_date"),
            user_uuid: column(row, "user_uuid"),
        }
    }
}

/// Usuário limpo
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRecord {
    pub user_uuid: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub company: String,
    pub email_address: String,
    pub address: String,
    pub country: Category,
    pub country_code: Category,
    pub phone_number: String,
    pub join_date: NaiveDate,
}

impl Record for UserRecord {
    const TABLE: &'static str = "dim_users";
    const COLUMNS: &'static [&'static str] = &[
        "user_uuid",
        "first_name",
        "last_name",
        "date_of_birth",
        "company",
        "email_address",
        "address",
        "country",
        "country_code",
        "phone_number",
        "join_date",
    ];

    fn into_row(self) -> DataRow {
        let mut row = DataRow::with_capacity(Self::COLUMNS.len());
        row.insert("user_uuid".to_string(), self.user_uuid.to_string().into());
        row.insert("first_name".to_string(), self.first_name.into());
        row.insert("last_name".to_string(), self.last_name.into());
        row.insert("date_of_birth".to_string(), self.date_of_birth.into());
        row.insert("company".to_string(), self.company.into());
        row.insert("email_address".to_string(), self.email_address.into());
        row.insert("address".to_string(), self.address.into());
        row.insert("country".to_string(), self.country.as_str().into());
        row.insert("country_code".to_string(), self.country_code.as_str().into());
        row.insert("phone_number".to_string(), self.phone_number.into());
        row.insert("join_date".to_string(), self.join_date.into());
        row
    }
}

/// Pipeline de limpeza de usuários
#[derive(Debug, Clone)]
pub struct UserCleaner {
    phone: PhoneRules,
    dates: DateReconciler,
    validate_email: bool,
}

impl Default for UserCleaner {
    fn default() -> Self {
        Self::new(&CleaningConfig::default())
    }
}

impl UserCleaner {
    pub fn new(config: &CleaningConfig) -> Self {
        Self {
            phone: config.phone.clone(),
            dates: DateReconciler::default(),
            validate_email: config.validate_email,
        }
    }

    pub fn with_date_reconciler(mut self, dates: DateReconciler) -> Self {
        self.dates = dates;
        self
    }

    fn clean_raw(&self, raw: RawUser, categories: &mut CategoryInterner) -> Result<UserRecord, RejectReason> {
        let first_name = required(&raw.first_name, "first_name")?;
        let last_name = required(&raw.last_name, "last_name")?;
        let company = required(&raw.company, "company")?;
        let email_address = required(&raw.email_address, "email_address")?;
        let address = required(&raw.address, "address")?;
        let country = required(&raw.country, "country")?;
        let country_code = required(&raw.country_code, "country_code")?;
        let phone_number = required(&raw.phone_number, "phone_number")?;
        let user_uuid = required(&raw.user_uuid, "user_uuid")?;

        let address = normalize_address(&address);
        let country_code = fix_country_code(&country_code);

        let date_of_birth = required_date(&self.dates, &raw.date_of_birth, "date_of_birth")?;
        let join_date = required_date(&self.dates, &raw.join_date, "join_date")?;
        let user_uuid = parse_uuid(&user_uuid, "user_uuid")?;

        if self.validate_email && !is_valid_email(&email_address) {
            return Err(RejectReason::InvalidEmail { raw: email_address });
        }

        let phone_number = self
            .phone
            .normalize(&phone_number, &country_code)
            .ok_or_else(|| RejectReason::InvalidPhone {
                country_code: country_code.clone(),
                raw: phone_number,
            })?;

        Ok(UserRecord {
            user_uuid,
            first_name,
            last_name,
            date_of_birth,
            company,
            email_address,
            address,
            country: categories.intern(&country),
            country_code: categories.intern(&country_code),
            phone_number,
            join_date,
        })
    }
}

impl Cleaner for UserCleaner {
    type Record = UserRecord;

    fn clean(&self, rows: &[DataRow]) -> Cleaned<UserRecord> {
        let mut categories = CategoryInterner::new();
        clean_table(UserRecord::TABLE, rows, RawUser::from_row, |raw| {
            self.clean_raw(raw, &mut categories)
        })
    }
}

/// Limpa a tabela de usuários com a configuração padrão
pub fn clean_user_data(rows: &[DataRow]) -> Cleaned<UserRecord> {
    UserCleaner::default().clean(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::test_support::row;
    use once_cell::sync::Lazy;
    use regex::Regex;

    static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+\d+$").unwrap());

    fn user(first_name: &str, country_code: &str, phone: &str) -> DataRow {
        row(&[
            ("index", "0"),
            ("first_name", first_name),
            ("last_name", "Winkler"),
            ("date_of_birth", "1968 October 16"),
            ("company", "Wendt GmbH"),
            ("email_address", "rudi79@winkler.de"),
            ("address", "Zimmerstr. 1/0\n59015 Gießen"),
            ("country", "Germany"),
            ("country_code", country_code),
            ("phone_number", phone),
            ("join_date", "2018-10-10"),
            ("user_uuid", "93caf182-e4e9-4c6e-bebb-60a1a9dcf9b8"),
        ])
    }

    #[test]
    fn test_null_first_name_is_dropped() {
        let rows = vec![
            user("NULL", "DE", "+49 30 1234567"),
            user("Sigfried", "DE", "+49 30 1234567"),
        ];

        let cleaned = clean_user_data(&rows);
        assert_eq!(cleaned.records.len(), 1);
        assert_eq!(cleaned.records[0].first_name, "Sigfried");
        assert_eq!(
            cleaned.report.rejections[0].reason,
            RejectReason::Missing { column: "first_name" }
        );
    }

    #[test]
    fn test_user_is_normalized() {
        let cleaned = clean_user_data(&[user("  Sigfried ", "DE", "030 1234567")]);
        assert!(cleaned.records.is_empty());

        let cleaned = clean_user_data(&[user("  Sigfried ", "DE", "(030) 1234567 ")]);
        // Sem prefixo o zero de tronco permanece e o número fica longo demais
        assert!(cleaned.records.is_empty());

        let cleaned = clean_user_data(&[user("  Sigfried ", "DE", "30 1234567")]);
        let record = &cleaned.records[0];
        assert_eq!(record.first_name, "Sigfried");
        assert_eq!(record.phone_number, "+49301234567");
        assert_eq!(record.address, "Zimmerstr. 1/0, 59015 Gießen");
        assert_eq!(record.date_of_birth, NaiveDate::from_ymd_opt(1968, 10, 16).unwrap());
        assert_eq!(record.join_date, NaiveDate::from_ymd_opt(2018, 10, 10).unwrap());
        assert_eq!(record.country_code, "DE");
    }

    #[test]
    fn test_ggb_is_corrected_before_phone_lookup() {
        let cleaned = clean_user_data(&[user("Ann", "GGB", "1632 960 123")]);
        let record = &cleaned.records[0];
        assert_eq!(record.country_code, "GB");
        assert_eq!(record.phone_number, "+441632960123");
    }

    #[test]
    fn test_phone_property_holds_for_surviving_rows() {
        let rows = vec![
            user("A", "GB", "+44 1632 960123"),
            user("B", "GB", "01632 960 123"),
            user("C", "US", "(555) 123-4567"),
            user("D", "US", "555.123.4567x890"),
            user("E", "DE", "+49 30 1234567"),
            user("F", "FR", "0123456789012"),
        ];
        let rules = PhoneRules::default();

        let cleaned = clean_user_data(&rows);
        assert_eq!(cleaned.records.len(), 3);
        for record in &cleaned.records {
            assert!(PHONE_RE.is_match(&record.phone_number));
            assert_eq!(record.phone_number.len(), rules.expected_length(&record.country_code));
        }
        assert_eq!(cleaned.report.invalid_count(), 3);
    }

    #[test]
    fn test_invalid_dates_and_uuid_are_rejected() {
        let mut bad_date = user("A", "GB", "1632 960 123");
        bad_date.insert("join_date".to_string(), "not-a-date".into());
        let mut bad_uuid = user("B", "GB", "1632 960 123");
        bad_uuid.insert("user_uuid".to_string(), "XYZ".into());

        let cleaned = clean_user_data(&[bad_date, bad_uuid]);
        assert!(cleaned.records.is_empty());
        assert!(matches!(
            cleaned.report.rejections[0].reason,
            RejectReason::InvalidDate { column: "join_date", .. }
        ));
        assert!(matches!(
            cleaned.report.rejections[1].reason,
            RejectReason::InvalidUuid { column: "user_uuid", .. }
        ));
    }

    #[test]
    fn test_email_validation_can_be_disabled() {
        let mut row = user("A", "GB", "1632 960 123");
        row.insert("email_address".to_string(), "GB@@example.com".into());

        let strict = clean_user_data(&[row.clone()]);
        assert!(strict.records.is_empty());

        let config = CleaningConfig {
            validate_email: false,
            ..CleaningConfig::default()
        };
        let lenient = UserCleaner::new(&config).clean(&[row]);
        assert_eq!(lenient.records.len(), 1);
    }

    #[test]
    fn test_duplicate_users_keep_first_occurrence() {
        let first = user("A", "GB", "1632 960 123");
        let mut second = first.clone();
        second.insert("index".to_string(), "1".into());

        let cleaned = clean_user_data(&[first, second]);
        assert_eq!(cleaned.records.len(), 1);
        assert_eq!(cleaned.report.duplicates_removed, 1);
    }

    #[test]
    fn test_categories_share_storage() {
        let cleaned = clean_user_data(&[
            user("A", "GB", "1632 960 123"),
            user("B", "GB", "1632 960 124"),
        ]);
        let a = &cleaned.records[0].country_code;
        let b = &cleaned.records[1].country_code;
        assert!(a.shares_storage_with(b));
    }

    #[test]
    fn test_into_row_has_every_column() {
        let cleaned = clean_user_data(&[user("A", "GB", "1632 960 123")]);
        let row = cleaned.into_rows().remove(0);
        for column in UserRecord::COLUMNS {
            assert!(row.contains_key(*column), "coluna ausente: {column}");
        }
        assert!(!row.contains_key("index"));
    }
}
