//! # Memory Loader
//!
//! Módulo para carregamento de dados em memória.
//! Especialmente útil para testes e para encadear a limpeza com a
//! verificação de integridade sem passar por disco.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use crate::error::Result;
use crate::types::{DataRow, PipelineResult};
use crate::traits::Loader;

/// Carregador que acumula dados em memória
///
/// Os dados são armazenados de forma thread-safe usando `Arc<Mutex<>>`, então
/// um clone do loader enxerga o que foi carregado pelo pipeline.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    data: Arc<Mutex<Vec<DataRow>>>,
}

impl MemoryLoader {
    /// Cria um novo MemoryLoader vazio
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<DataRow>> {
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Obtém uma cópia dos dados armazenados
    pub async fn get_data(&self) -> Vec<DataRow> {
        self.lock().clone()
    }

    /// Limpa todos os dados armazenados
    pub async fn clear(&self) {
        self.lock().clear();
    }

    /// Obtém o número de registros armazenados
    pub async fn len(&self) -> usize {
        self.lock().len()
    }

    /// Verifica se está vazio
    pub async fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Executa `f` sobre os dados sem cloná-los
    ///
    /// A closure roda com o lock adquirido e deve ser rápida.
    pub async fn with_data<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&[DataRow]) -> T,
    {
        let data = self.lock();
        f(&data)
    }
}

#[async_trait]
impl Loader for MemoryLoader {
    async fn load(&self, data: Vec<DataRow>) -> Result<PipelineResult> {
        let start_time = std::time::Instant::now();
        let mut result = PipelineResult::new();

        result.rows_processed = data.len();
        result.rows_successful = data.len();
        self.lock().extend(data);
        result.execution_time_ms = start_time.elapsed().as_millis() as u64;

        Ok(result)
    }

    async fn health_check(&self) -> Result<bool> {
        // Lock contendido não é erro fatal
        Ok(self.data.try_lock().is_ok())
    }
}
