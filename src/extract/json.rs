use async_trait::async_trait;
use std::path::{Path, PathBuf};
use crate::error::{ETLError, ExtractError, Result};
use crate::types::{DataRow, DataValue};
use crate::traits::Extractor;

/// Extrator para arquivos JSON
///
/// Aceita três formatos:
/// - array de objetos, um objeto por linha;
/// - objeto orientado a colunas `{"coluna": {"0": v, "1": v}}`, como nas
///   exportações de tabelas de datas;
/// - um único objeto, tratado como uma linha.
///
/// Strings, números e booleanos mantêm o tipo do JSON. Valores aninhados
/// chegam como texto JSON.
#[derive(Debug, Clone)]
pub struct JsonExtractor {
    file_path: PathBuf,
    array_path: Option<String>,
}

impl JsonExtractor {
    /// Cria um novo extrator JSON
    pub fn new<P: AsRef<Path>>(file_path: P) -> Self {
        Self {
            file_path: file_path.as_ref().to_path_buf(),
            array_path: None,
        }
    }

    /// Define o caminho do array no JSON (para JSONs aninhados), separado por "."
    pub fn with_array_path(mut self, path: impl Into<String>) -> Self {
        self.array_path = Some(path.into());
        self
    }

    fn json_to_data_value(value: &serde_json::Value) -> DataValue {
        match value {
            serde_json::Value::String(s) => DataValue::String(s.clone()),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    DataValue::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    DataValue::Float(f)
                } else {
                    DataValue::String(n.to_string())
                }
            }
            serde_json::Value::Bool(b) => DataValue::Boolean(*b),
            serde_json::Value::Null => DataValue::Null,
            nested => DataValue::String(nested.to_string()),
        }
    }

    fn object_to_row(obj: &serde_json::Map<String, serde_json::Value>) -> DataRow {
        obj.iter()
            .map(|(key, value)| (key.clone(), Self::json_to_data_value(value)))
            .collect()
    }

    /// Verdadeiro quando todas as colunas são objetos indexados pela linha
    fn is_column_oriented(obj: &serde_json::Map<String, serde_json::Value>) -> bool {
        !obj.is_empty() && obj.values().all(serde_json::Value::is_object)
    }

    fn columns_to_rows(obj: &serde_json::Map<String, serde_json::Value>) -> Vec<DataRow> {
        let mut index: Vec<&str> = Vec::new();
        for column in obj.values().filter_map(serde_json::Value::as_object) {
            for key in column.keys() {
                if !index.contains(&key.as_str()) {
                    index.push(key);
                }
            }
        }
        // Índices numéricos em ordem numérica ("10" depois de "9")
        index.sort_by_key(|key| (key.parse::<u64>().unwrap_or(u64::MAX), key.to_string()));

        index
            .into_iter()
            .map(|row_key| {
                obj.iter()
                    .map(|(column, cells)| {
                        let value = cells
                            .get(row_key)
                            .map(Self::json_to_data_value)
                            .unwrap_or(DataValue::Null);
                        (column.clone(), value)
                    })
                    .collect()
            })
            .collect()
    }

    fn extract_from_path<'a>(json: &'a serde_json::Value, path: &str) -> Result<&'a serde_json::Value> {
        let mut current = json;

        for part in path.split('.') {
            current = current
                .as_object()
                .ok_or_else(|| parse_error(format!("Caminho '{}' não é um objeto", part)))?
                .get(part)
                .ok_or_else(|| parse_error(format!("Caminho '{}' não encontrado no JSON", part)))?;
        }

        Ok(current)
    }

    fn parse(&self, content: &str) -> Result<Vec<DataRow>> {
        let json: serde_json::Value = serde_json::from_str(content)?;

        let target = match &self.array_path {
            Some(path) => Self::extract_from_path(&json, path)?,
            None => &json,
        };

        match target {
            serde_json::Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_object()
                        .map(Self::object_to_row)
                        .ok_or_else(|| parse_error("Item do array não é um objeto".to_string()))
                })
                .collect(),
            serde_json::Value::Object(obj) if Self::is_column_oriented(obj) => Ok(Self::columns_to_rows(obj)),
            serde_json::Value::Object(obj) => Ok(vec![Self::object_to_row(obj)]),
            _ => Err(ETLError::Extract(ExtractError::InvalidFormat(
                "JSON deve ser um array ou um objeto".to_string(),
            ))),
        }
    }
}

fn parse_error(message: String) -> ETLError {
    ETLError::Extract(ExtractError::ParseError(message))
}

#[async_trait]
impl Extractor for JsonExtractor {
    async fn extract(&self) -> Result<Vec<DataRow>> {
        let content = match tokio::fs::read_to_string(&self.file_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ExtractError::FileNotFound(self.file_path.display().to_string()).into());
            }
            Err(e) => return Err(e.into()),
        };

        let rows = self.parse(&content)?;
        tracing::debug!(path = %self.file_path.display(), rows = rows.len(), "JSON lido");
        Ok(rows)
    }
}
