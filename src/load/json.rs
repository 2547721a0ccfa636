//! # JSON Loader
//!
//! Grava cada tabela limpa num arquivo JSON próprio, substituindo o arquivo
//! anterior da mesma tabela.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};
use crate::error::{LoadError, Result};
use crate::traits::{Loader, Record};
use crate::types::{DataRow, PipelineResult};
use super::common::DataFormatter;

/// Carregador que persiste uma tabela como array JSON
///
/// As linhas recebidas em `load` ficam num buffer e o arquivo só é escrito em
/// `finalize`, de uma vez. O conteúdo anterior é sempre substituído: uma
/// execução nunca mistura linhas com a execução passada.
///
/// # Exemplos
///
/// ```rust,no_run
/// use retail_etl::clean::UserRecord;
/// use retail_etl::load::json::JsonLoader;
///
/// let loader = JsonLoader::for_record::<UserRecord>("warehouse").with_pretty(true);
/// assert!(loader.file_path().ends_with("dim_users.json"));
/// ```
#[derive(Debug, Clone)]
pub struct JsonLoader {
    file_path: PathBuf,
    pretty: bool,
    columns: &'static [&'static str],
    buffer: Arc<Mutex<Vec<DataRow>>>,
}

impl JsonLoader {
    /// Cria um JsonLoader para o arquivo indicado
    pub fn new<P: AsRef<Path>>(file_path: P) -> Self {
        Self {
            file_path: file_path.as_ref().to_path_buf(),
            pretty: false,
            columns: &[],
            buffer: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Cria um JsonLoader que grava `<dir>/<tabela>.json` com as colunas do registro
    pub fn for_record<R: Record>(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(format!("{}.json", R::TABLE))).with_columns(R::COLUMNS)
    }

    /// Define se deve usar formatação pretty-print
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Ordem das colunas em cada objeto
    pub fn with_columns(mut self, columns: &'static [&'static str]) -> Self {
        self.columns = columns;
        self
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    fn lock(&self) -> MutexGuard<'_, Vec<DataRow>> {
        self.buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn render(&self, rows: &[DataRow]) -> Result<String> {
        let values: Vec<serde_json::Value> = rows
            .iter()
            .map(|row| DataFormatter::row_to_json(row, self.columns))
            .collect();
        let array = serde_json::Value::Array(values);

        if self.pretty {
            Ok(serde_json::to_string_pretty(&array)?)
        } else {
            Ok(serde_json::to_string(&array)?)
        }
    }
}

#[async_trait]
impl Loader for JsonLoader {
    async fn load(&self, data: Vec<DataRow>) -> Result<PipelineResult> {
        let mut result = PipelineResult::new();
        result.rows_processed = data.len();
        result.rows_successful = data.len();
        self.lock().extend(data);
        Ok(result)
    }

    async fn finalize(&self) -> Result<()> {
        // O buffer só é esvaziado depois que o arquivo foi trocado
        let rows = self.lock().clone();
        let content = self.render(&rows)?;

        // Escreve ao lado e renomeia para não deixar um arquivo pela metade
        let tmp_path = self.file_path.with_extension("json.tmp");
        let written = match tokio::fs::write(&tmp_path, content).await {
            Ok(()) => tokio::fs::rename(&tmp_path, &self.file_path).await.map_err(|e| {
                LoadError::WriteError(format!("{}: {}", self.file_path.display(), e))
            }),
            Err(e) => Err(LoadError::WriteError(format!("{}: {}", tmp_path.display(), e))),
        };

        if let Err(e) = written {
            if let Err(remove_error) = tokio::fs::remove_file(&tmp_path).await {
                if remove_error.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %tmp_path.display(), error = %remove_error, "Arquivo temporário não removido");
                }
            }
            return Err(e.into());
        }

        self.lock().drain(..rows.len());

        info!(
            path = %self.file_path.display(),
            rows = rows.len(),
            "Tabela gravada"
        );
        Ok(())
    }

    async fn health_check(&self) -> Result<bool> {
        match self.file_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => Ok(parent.is_dir()),
            _ => Ok(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::StoreRecord;
    use crate::types::DataValue;
    use tempfile::TempDir;

    fn store_row(code: &str) -> DataRow {
        let mut row = DataRow::new();
        row.insert("store_code".to_string(), DataValue::String(code.to_string()));
        row.insert("staff_numbers".to_string(), DataValue::Integer(12));
        row.insert("longitude".to_string(), DataValue::Null);
        row
    }

    async fn read_array(path: &Path) -> Vec<serde_json::Value> {
        let content = tokio::fs::read_to_string(path).await.unwrap();
        match serde_json::from_str(&content).unwrap() {
            serde_json::Value::Array(values) => values,
            other => panic!("conteúdo não é um array JSON: {other}"),
        }
    }

    #[tokio::test]
    async fn test_json_loader_writes_table_file() {
        let dir = TempDir::new().unwrap();
        let loader = JsonLoader::for_record::<StoreRecord>(dir.path()).with_pretty(true);
        assert!(loader.health_check().await.unwrap());

        let result = loader
            .load(vec![store_row("BL-8387506C"), store_row("WEB-1388012W")])
            .await
            .unwrap();
        assert_eq!(result.rows_successful, 2);
        loader.finalize().await.unwrap();

        let path = dir.path().join("dim_store_details.json");
        let values = read_array(&path).await;
        assert_eq!(values.len(), 2);
        assert_eq!(values[0]["store_code"], "BL-8387506C");
        assert_eq!(values[0]["staff_numbers"], 12);
        assert!(values[1]["longitude"].is_null());

        // A ordem das colunas segue a tabela
        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(content.find("store_code").unwrap() < content.find("longitude").unwrap());
    }

    #[tokio::test]
    async fn test_json_loader_replaces_existing_table() {
        let dir = TempDir::new().unwrap();
        let loader = JsonLoader::for_record::<StoreRecord>(dir.path());

        loader.load(vec![store_row("A"), store_row("B")]).await.unwrap();
        loader.finalize().await.unwrap();

        loader.load(vec![store_row("C")]).await.unwrap();
        loader.finalize().await.unwrap();

        let values = read_array(loader.file_path()).await;
        assert_eq!(values.len(), 1);
        assert_eq!(values[0]["store_code"], "C");
    }

    #[tokio::test]
    async fn test_json_loader_missing_directory() {
        let dir = TempDir::new().unwrap();
        let loader = JsonLoader::new(dir.path().join("nope").join("t.json"));
        assert!(!loader.health_check().await.unwrap());

        loader.load(vec![store_row("A")]).await.unwrap();
        let err = loader.finalize().await.unwrap_err();
        assert_eq!(err.error_code(), "LOAD_ERROR");
    }

    #[tokio::test]
    async fn test_failed_write_keeps_rows_for_retry() {
        let dir = TempDir::new().unwrap();
        let loader = JsonLoader::for_record::<StoreRecord>(dir.path());

        // Um diretório ocupando o caminho da tabela faz o rename falhar
        let blocker = dir.path().join("dim_store_details.json");
        std::fs::create_dir(&blocker).unwrap();
        std::fs::write(blocker.join("keep"), b"x").unwrap();

        loader.load(vec![store_row("A"), store_row("B")]).await.unwrap();
        let err = loader.finalize().await.unwrap_err();
        assert_eq!(err.error_code(), "LOAD_ERROR");
        assert!(!dir.path().join("dim_store_details.json.tmp").exists());

        std::fs::remove_dir_all(&blocker).unwrap();
        loader.finalize().await.unwrap();

        let values = read_array(loader.file_path()).await;
        assert_eq!(values.len(), 2);
        assert_eq!(values[1]["store_code"], "B");
    }
}
