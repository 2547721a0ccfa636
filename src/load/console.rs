//! # Console Loader
//!
//! Imprime as tabelas limpas no stdout. Útil para inspecionar uma execução.

use async_trait::async_trait;
use crate::error::Result;
use crate::traits::{Loader, Record};
use crate::types::{DataRow, PipelineResult};
use super::common::DataFormatter;

/// Carregador para output em console/stdout
///
/// No modo pretty cada registro ocupa uma linha `coluna: valor | ...`; caso
/// contrário cada registro é impresso como um objeto JSON.
#[derive(Debug, Clone)]
pub struct ConsoleLoader {
    pretty: bool,
    columns: &'static [&'static str],
    limit: Option<usize>,
}

impl ConsoleLoader {
    /// Cria um novo ConsoleLoader em modo pretty
    pub fn new() -> Self {
        Self {
            pretty: true,
            columns: &[],
            limit: None,
        }
    }

    /// Usa a ordem de colunas da tabela do registro `R`
    pub fn for_record<R: Record>() -> Self {
        Self::new().with_columns(R::COLUMNS)
    }

    /// Define se deve usar formatação pretty-print
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Ordem em que as colunas são impressas
    pub fn with_columns(mut self, columns: &'static [&'static str]) -> Self {
        self.columns = columns;
        self
    }

    /// Imprime no máximo `limit` registros por carga
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn render(&self, row: &DataRow) -> Result<String> {
        if self.pretty {
            Ok(DataFormatter::format_row(row, self.columns))
        } else {
            Ok(serde_json::to_string(&DataFormatter::row_to_json(row, self.columns))?)
        }
    }
}

impl Default for ConsoleLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Loader for ConsoleLoader {
    async fn load(&self, data: Vec<DataRow>) -> Result<PipelineResult> {
        let start_time = std::time::Instant::now();
        let mut result = PipelineResult::new();

        let shown = self.limit.unwrap_or(data.len()).min(data.len());
        for (i, row) in data.iter().take(shown).enumerate() {
            println!("[{}] {}", i + 1, self.render(row)?);
        }
        if shown < data.len() {
            println!("... {} registros omitidos", data.len() - shown);
        }

        result.rows_processed = data.len();
        result.rows_successful = data.len();
        result.execution_time_ms = start_time.elapsed().as_millis() as u64;

        Ok(result)
    }
}
