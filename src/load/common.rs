//! # Common Utilities
//!
//! Formatação compartilhada pelos loaders de console e JSON.

use crate::types::{DataRow, DataValue};

/// Utilitários para formatação de dados
pub struct DataFormatter;

impl DataFormatter {
    /// Formata um DataValue para exibição em texto
    pub fn format_value(value: &DataValue) -> String {
        match value {
            DataValue::String(s) => s.clone(),
            DataValue::Integer(i) => i.to_string(),
            DataValue::Float(f) => f.to_string(),
            DataValue::Boolean(b) => b.to_string(),
            DataValue::Null => "null".to_string(),
            DataValue::Date(date) => date.format("%Y-%m-%d").to_string(),
            DataValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Converte um DataValue para JSON sem a marcação de variante
    pub fn value_to_json(value: &DataValue) -> serde_json::Value {
        match value {
            DataValue::String(s) => serde_json::Value::String(s.clone()),
            DataValue::Integer(i) => serde_json::Value::Number(serde_json::Number::from(*i)),
            DataValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            DataValue::Boolean(b) => serde_json::Value::Bool(*b),
            DataValue::Null => serde_json::Value::Null,
            DataValue::Date(_) | DataValue::DateTime(_) => {
                serde_json::Value::String(Self::format_value(value))
            }
        }
    }

    /// Colunas da linha na ordem pedida; as que sobrarem vêm depois, em ordem alfabética
    pub fn ordered_columns<'a>(row: &'a DataRow, columns: &[&'static str]) -> Vec<&'a str> {
        let mut ordered: Vec<&str> = columns
            .iter()
            .filter_map(|c| row.get_key_value(*c).map(|(k, _)| k.as_str()))
            .collect();
        let mut rest: Vec<&str> = row
            .keys()
            .map(String::as_str)
            .filter(|k| !columns.iter().any(|c| c == k))
            .collect();
        rest.sort_unstable();
        ordered.extend(rest);
        ordered
    }

    /// Converte a linha num objeto JSON com as colunas na ordem pedida
    pub fn row_to_json(row: &DataRow, columns: &[&'static str]) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for key in Self::ordered_columns(row, columns) {
            if let Some(value) = row.get(key) {
                map.insert(key.to_string(), Self::value_to_json(value));
            }
        }
        serde_json::Value::Object(map)
    }

    /// Formata uma linha completa para exibição
    pub fn format_row(row: &DataRow, columns: &[&'static str]) -> String {
        Self::ordered_columns(row, columns)
            .into_iter()
            .filter_map(|key| row.get(key).map(|v| format!("{}: {}", key, Self::format_value(v))))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}
