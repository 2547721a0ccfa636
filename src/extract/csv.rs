use async_trait::async_trait;
use std::path::{Path, PathBuf};
use crate::error::{ExtractError, Result};
use crate::types::{DataRow, DataValue};
use crate::traits::Extractor;

/// Extrator para arquivos CSV
///
/// Nenhum tipo é inferido: cada célula chega como texto, e células vazias
/// chegam como `Null`. Telefones e números de cartão mantêm os zeros à
/// esquerda e a limpeza decide como converter cada coluna.
#[derive(Debug, Clone)]
pub struct CsvExtractor {
    file_path: PathBuf,
    delimiter: u8,
    has_headers: bool,
    quote_char: u8,
}

impl CsvExtractor {
    /// Cria um novo extrator CSV
    pub fn new<P: AsRef<Path>>(file_path: P) -> Self {
        Self {
            file_path: file_path.as_ref().to_path_buf(),
            delimiter: b',',
            has_headers: true,
            quote_char: b'"',
        }
    }

    /// Define o delimitador
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Define se tem cabeçalhos
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    /// Define o caractere de aspas
    pub fn with_quote_char(mut self, quote_char: u8) -> Self {
        self.quote_char = quote_char;
        self
    }

    fn parse_value(value: &str) -> DataValue {
        if value.is_empty() {
            DataValue::Null
        } else {
            DataValue::String(value.to_string())
        }
    }

    fn parse(&self, content: &[u8]) -> Result<Vec<DataRow>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(self.has_headers)
            .quote(self.quote_char)
            .from_reader(content);

        let headers: Option<Vec<String>> = if self.has_headers {
            Some(csv_reader.headers()?.iter().map(str::to_string).collect())
        } else {
            None
        };

        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            let mut row = DataRow::with_capacity(record.len());

            for (i, field) in record.iter().enumerate() {
                let key = match &headers {
                    Some(headers) => match headers.get(i) {
                        Some(header) => header.clone(),
                        None => continue,
                    },
                    None => format!("column_{}", i),
                };
                row.insert(key, Self::parse_value(field));
            }

            rows.push(row);
        }

        Ok(rows)
    }
}

#[async_trait]
impl Extractor for CsvExtractor {
    async fn extract(&self) -> Result<Vec<DataRow>> {
        let content = match tokio::fs::read(&self.file_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ExtractError::FileNotFound(self.file_path.display().to_string()).into());
            }
            Err(e) => return Err(e.into()),
        };

        let rows = self.parse(&content)?;
        tracing::debug!(path = %self.file_path.display(), rows = rows.len(), "CSV lido");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_csv_extractor_keeps_raw_text() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, ",first_name,phone_number,country_code").unwrap();
        writeln!(temp_file, "0,Sigfried,030 1234567,DE").unwrap();
        writeln!(temp_file, "1,NULL,,GB").unwrap();

        let extractor = CsvExtractor::new(temp_file.path());
        let result = extractor.extract().await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].get("phone_number"), Some(&DataValue::String("030 1234567".to_string())));
        assert_eq!(result[0].get(""), Some(&DataValue::String("0".to_string())));
        // "NULL" chega como texto; quem decide que é ausente é a limpeza
        assert_eq!(result[1].get("first_name"), Some(&DataValue::String("NULL".to_string())));
        assert_eq!(result[1].get("phone_number"), Some(&DataValue::Null));
    }

    #[tokio::test]
    async fn test_csv_extractor_multiline_address() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "store_code,address").unwrap();
        writeln!(temp_file, "HI-9B97EE4E,\"Flat 72W\nSally isle\"").unwrap();

        let result = CsvExtractor::new(temp_file.path()).extract().await.unwrap();
        assert_eq!(
            result[0].get("address"),
            Some(&DataValue::String("Flat 72W\nSally isle".to_string()))
        );
    }

    #[tokio::test]
    async fn test_csv_extractor_without_headers() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "Alice,30").unwrap();

        let extractor = CsvExtractor::new(temp_file.path()).with_headers(false);
        let result = extractor.extract().await.unwrap();

        assert_eq!(result[0].get("column_0"), Some(&DataValue::String("Alice".to_string())));
        assert_eq!(result[0].get("column_1"), Some(&DataValue::String("30".to_string())));
    }

    #[tokio::test]
    async fn test_csv_extractor_custom_delimiter() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "name;age").unwrap();
        writeln!(temp_file, "Alice;30").unwrap();

        let extractor = CsvExtractor::new(temp_file.path()).with_delimiter(b';');
        let result = extractor.extract().await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].get("name"), Some(&DataValue::String("Alice".to_string())));
    }

    #[tokio::test]
    async fn test_csv_extractor_missing_file() {
        let err = CsvExtractor::new("/nonexistent/users.csv").extract().await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::ETLError::Extract(ExtractError::FileNotFound(_))
        ));
    }
}
