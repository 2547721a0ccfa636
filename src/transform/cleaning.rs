use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use crate::clean::{clean_in_background, CleaningReport};
use crate::error::Result;
use crate::traits::{Cleaner, Transformer};
use crate::types::{DataRow, PipelineResult};

/// Adapta um pipeline de limpeza ao `Transformer` do pipeline ETL
///
/// A limpeza roda numa thread de bloqueio para não travar o runtime. O último
/// relatório fica disponível em [`last_report`](Self::last_report) com o
/// motivo de cada linha rejeitada.
pub struct CleaningTransform<C> {
    cleaner: Arc<C>,
    last_report: Mutex<Option<CleaningReport>>,
}

impl<C: Cleaner + 'static> CleaningTransform<C> {
    pub fn new(cleaner: C) -> Self {
        Self {
            cleaner: Arc::new(cleaner),
            last_report: Mutex::new(None),
        }
    }

    /// Relatório da execução mais recente
    pub fn last_report(&self) -> Option<CleaningReport> {
        self.last_report
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    async fn run(&self, data: Vec<DataRow>) -> Result<(Vec<DataRow>, CleaningReport)> {
        let cleaned = clean_in_background(Arc::clone(&self.cleaner), data).await?;
        let report = cleaned.report.clone();

        *self
            .last_report
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(report.clone());

        Ok((cleaned.into_rows(), report))
    }
}

#[async_trait]
impl<C: Cleaner + 'static> Transformer for CleaningTransform<C> {
    async fn transform(&self, data: Vec<DataRow>) -> Result<Vec<DataRow>> {
        Ok(self.run(data).await?.0)
    }

    async fn transform_with_report(&self, data: Vec<DataRow>) -> Result<(Vec<DataRow>, PipelineResult)> {
        let (rows, report) = self.run(data).await?;
        Ok((rows, report.to_pipeline_result()))
    }
}
