//! Sistema de eventos para observabilidade do pipeline

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use crate::error::Result;
use crate::traits::EventEmitter;
use crate::types::PipelineEvent;
use tracing::{error, info, warn};

/// Implementação simples de EventEmitter que logga eventos
#[derive(Debug, Clone, Default)]
pub struct LoggingEventEmitter;

impl LoggingEventEmitter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventEmitter for LoggingEventEmitter {
    async fn emit(&self, event: PipelineEvent) -> Result<()> {
        match event {
            PipelineEvent::Started { pipeline_id, timestamp } => {
                info!(
                    pipeline_id = %pipeline_id,
                    timestamp = ?timestamp,
                    "Pipeline iniciado"
                );
            }
            PipelineEvent::StateChanged {
                pipeline_id,
                old_state,
                new_state,
                timestamp,
            } => {
                info!(
                    pipeline_id = %pipeline_id,
                    old_state = %old_state,
                    new_state = %new_state,
                    timestamp = ?timestamp,
                    "Estado do pipeline alterado"
                );
            }
            PipelineEvent::RowsRejected {
                pipeline_id,
                rows_rejected,
                timestamp,
            } => {
                warn!(
                    pipeline_id = %pipeline_id,
                    rows_rejected = rows_rejected,
                    timestamp = ?timestamp,
                    "Linhas descartadas na limpeza"
                );
            }
            PipelineEvent::Error { pipeline_id, error, timestamp } => {
                error!(
                    pipeline_id = %pipeline_id,
                    error = %error,
                    timestamp = ?timestamp,
                    "Erro no pipeline"
                );
            }
            PipelineEvent::Completed { pipeline_id, result, timestamp } => {
                info!(
                    pipeline_id = %pipeline_id,
                    rows_processed = result.rows_processed,
                    rows_successful = result.rows_successful,
                    rows_failed = result.rows_failed,
                    execution_time_ms = result.execution_time_ms,
                    success_rate = result.success_rate(),
                    timestamp = ?timestamp,
                    "Pipeline concluído"
                );
            }
        }

        Ok(())
    }
}

/// EventEmitter que armazena eventos em memória para testes
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventEmitter {
    events: Arc<Mutex<Vec<PipelineEvent>>>,
}

impl InMemoryEventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    // Um teste que entrou em pânico não deve esconder os eventos dos demais
    fn lock(&self) -> MutexGuard<'_, Vec<PipelineEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Retorna todos os eventos capturados
    pub fn get_events(&self) -> Vec<PipelineEvent> {
        self.lock().clone()
    }

    /// Total de linhas descartadas informado pelos eventos `RowsRejected`
    pub fn rows_rejected(&self) -> usize {
        self.lock()
            .iter()
            .map(|event| match event {
                PipelineEvent::RowsRejected { rows_rejected, .. } => *rows_rejected,
                _ => 0,
            })
            .sum()
    }

    /// Limpa todos os eventos armazenados
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Retorna o número de eventos capturados
    pub fn event_count(&self) -> usize {
        self.lock().len()
    }
}

#[async_trait]
impl EventEmitter for InMemoryEventEmitter {
    async fn emit(&self, event: PipelineEvent) -> Result<()> {
        self.lock().push(event);
        Ok(())
    }
}
