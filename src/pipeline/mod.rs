use crate::config::ETLConfig;
use crate::error::{ETLError, Result};
use crate::traits::{Extractor, Transformer, Loader, EventEmitter};
use crate::types::{DataRow, PipelineResult, PipelineState, PipelineEvent};
use crate::events::LoggingEventEmitter;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Pipeline ETL principal com suporte a eventos e estado
///
/// Cada execução percorre `Extracting → Cleaning → Loading → Completed`, ou
/// termina em `Failed` com a mensagem do erro.
pub struct Pipeline<E, T, L> {
    extractor: E,
    transformer: T,
    loader: L,
    config: ETLConfig,
    metrics: Arc<Mutex<PipelineMetrics>>,
    state: Arc<Mutex<PipelineState>>,
    event_emitter: Arc<dyn EventEmitter>,
    pipeline_id: String,
}

/// Métricas do pipeline
#[derive(Debug, Clone, Default)]
pub struct PipelineMetrics {
    pub executions: Vec<PipelineExecution>,
    pub total_rows_processed: usize,
    pub total_rows_rejected: usize,
    pub total_execution_time_ms: u64,
    pub success_rate: f64,
}

/// Informações de uma execução do pipeline
#[derive(Debug, Clone)]
pub struct PipelineExecution {
    pub timestamp: SystemTime,
    pub result: PipelineResult,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Pipeline<(), (), ()> {
    /// Cria um novo builder de pipeline
    pub fn builder() -> PipelineBuilder<(), (), ()> {
        PipelineBuilder::new()
    }

    /// Cria um builder com configuração personalizada
    pub fn with_config(config: ETLConfig) -> PipelineBuilder<(), (), ()> {
        PipelineBuilder::with_config(config)
    }
}

impl<E, T, L> Pipeline<E, T, L>
where
    E: Extractor + Send + Sync,
    T: Transformer + Send + Sync,
    L: Loader + Send + Sync,
{
    /// Retorna o ID do pipeline
    pub fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    /// Retorna o estado atual do pipeline
    pub fn current_state(&self) -> PipelineState {
        lock(&self.state).clone()
    }

    /// Altera o estado do pipeline e emite evento
    async fn set_state(&self, new_state: PipelineState) -> Result<()> {
        let old_state = std::mem::replace(&mut *lock(&self.state), new_state.clone());

        let event = PipelineEvent::StateChanged {
            pipeline_id: self.pipeline_id.clone(),
            old_state,
            new_state,
            timestamp: SystemTime::now(),
        };

        self.event_emitter.emit(event).await
    }

    /// Marca a execução como falha e emite o evento de erro
    async fn fail(&self, stage: &str, error: ETLError) -> ETLError {
        let message = format!("Erro na {}: {}", stage, error);
        tracing::error!(pipeline_id = %self.pipeline_id, error = %error, "{}", message);

        let failed = self.set_state(PipelineState::Failed(message.clone())).await;
        let emitted = self
            .event_emitter
            .emit(PipelineEvent::Error {
                pipeline_id: self.pipeline_id.clone(),
                error: message,
                timestamp: SystemTime::now(),
            })
            .await;

        match failed.and(emitted) {
            Ok(()) => error,
            Err(emit_error) => {
                tracing::warn!(error = %emit_error, "Falha ao emitir evento de erro");
                error
            }
        }
    }

    /// Executa o pipeline respeitando o timeout configurado
    pub async fn execute(&self) -> Result<PipelineResult> {
        let timeout = Duration::from_secs(self.config.pipeline.timeout_seconds);

        match tokio::time::timeout(timeout, self.run()).await {
            Ok(result) => result,
            Err(_) => {
                let error = ETLError::Pipeline(format!(
                    "Tempo limite de {}s excedido",
                    self.config.pipeline.timeout_seconds
                ));
                Err(self.fail("execução", error).await)
            }
        }
    }

    async fn run(&self) -> Result<PipelineResult> {
        let start_time = Instant::now();

        self.event_emitter
            .emit(PipelineEvent::Started {
                pipeline_id: self.pipeline_id.clone(),
                timestamp: SystemTime::now(),
            })
            .await?;

        if !self.loader.health_check().await? {
            let error = ETLError::Pipeline("Health check do loader falhou".to_string());
            return Err(self.fail("validação", error).await);
        }

        // Extração
        self.set_state(PipelineState::Extracting).await?;
        let extracted = match self.extractor.extract().await {
            Ok(data) => data,
            Err(e) => return Err(self.fail("extração", e).await),
        };
        tracing::info!(pipeline_id = %self.pipeline_id, rows = extracted.len(), "Dados extraídos");

        // Limpeza
        self.set_state(PipelineState::Cleaning).await?;
        let (cleaned, cleaning) = match self.transformer.transform_with_report(extracted).await {
            Ok(output) => output,
            Err(e) => return Err(self.fail("limpeza", e).await),
        };
        if cleaning.rows_failed > 0 {
            self.event_emitter
                .emit(PipelineEvent::RowsRejected {
                    pipeline_id: self.pipeline_id.clone(),
                    rows_rejected: cleaning.rows_failed,
                    timestamp: SystemTime::now(),
                })
                .await?;
        }

        // Carregamento
        self.set_state(PipelineState::Loading).await?;
        let loaded = match self.load_in_batches(cleaned).await {
            Ok(result) => result,
            Err(e) => return Err(self.fail("carga", e).await),
        };
        if let Err(e) = self.loader.finalize().await {
            return Err(self.fail("carga", e).await);
        }

        let mut final_result = PipelineResult::new();
        final_result.rows_processed = cleaning.rows_processed;
        final_result.rows_successful = loaded.rows_successful;
        final_result.rows_failed = cleaning.rows_failed + loaded.rows_failed;
        final_result.errors = cleaning.errors;
        final_result.errors.extend(loaded.errors);
        final_result.execution_time_ms = start_time.elapsed().as_millis() as u64;

        self.set_state(PipelineState::Completed).await?;
        self.event_emitter
            .emit(PipelineEvent::Completed {
                pipeline_id: self.pipeline_id.clone(),
                result: final_result.clone(),
                timestamp: SystemTime::now(),
            })
            .await?;

        self.record_execution(&final_result);

        tracing::info!(
            pipeline_id = %self.pipeline_id,
            rows_processed = final_result.rows_processed,
            rows_successful = final_result.rows_successful,
            rows_failed = final_result.rows_failed,
            execution_time_ms = final_result.execution_time_ms,
            "Pipeline executado"
        );

        Ok(final_result)
    }

    /// Entrega as linhas ao loader em lotes de `batch_size`
    async fn load_in_batches(&self, rows: Vec<DataRow>) -> Result<PipelineResult> {
        let batch_size = self.config.pipeline.batch_size.max(1);
        let mut total = PipelineResult::new();
        let mut rows = rows.into_iter().peekable();

        while rows.peek().is_some() {
            let batch: Vec<DataRow> = rows.by_ref().take(batch_size).collect();
            let result = self.loader.load(batch).await?;
            total.rows_processed += result.rows_processed;
            total.rows_successful += result.rows_successful;
            total.rows_failed += result.rows_failed;
            total.errors.extend(result.errors);
        }

        Ok(total)
    }

    /// Obtém métricas do pipeline
    pub fn get_metrics(&self) -> PipelineMetrics {
        lock(&self.metrics).clone()
    }

    /// Reseta métricas do pipeline
    pub fn reset_metrics(&self) {
        *lock(&self.metrics) = PipelineMetrics::default();
    }

    fn record_execution(&self, result: &PipelineResult) {
        let mut metrics = lock(&self.metrics);

        metrics.executions.push(PipelineExecution {
            timestamp: SystemTime::now(),
            result: result.clone(),
        });
        metrics.total_rows_processed += result.rows_processed;
        metrics.total_rows_rejected += result.rows_failed;
        metrics.total_execution_time_ms += result.execution_time_ms;

        let total_successful: usize = metrics.executions.iter().map(|e| e.result.rows_successful).sum();
        metrics.success_rate = if metrics.total_rows_processed > 0 {
            total_successful as f64 / metrics.total_rows_processed as f64
        } else {
            0.0
        };
    }
}

/// Builder para criação de pipelines
pub struct PipelineBuilder<E, T, L> {
    extractor: E,
    transformer: T,
    loader: L,
    config: ETLConfig,
    event_emitter: Option<Arc<dyn EventEmitter>>,
    pipeline_id: Option<String>,
    _phantom: PhantomData<(E, T, L)>,
}

impl PipelineBuilder<(), (), ()> {
    /// Cria um novo builder
    pub fn new() -> Self {
        Self::with_config(ETLConfig::default())
    }

    /// Cria um builder com configuração personalizada
    pub fn with_config(config: ETLConfig) -> Self {
        Self {
            extractor: (),
            transformer: (),
            loader: (),
            config,
            event_emitter: None,
            pipeline_id: None,
            _phantom: PhantomData,
        }
    }
}

impl<E, T, L> PipelineBuilder<E, T, L> {
    /// Define o extrator
    pub fn extract<NewE: Extractor + Send + Sync>(self, extractor: NewE) -> PipelineBuilder<NewE, T, L> {
        PipelineBuilder {
            extractor,
            transformer: self.transformer,
            loader: self.loader,
            config: self.config,
            event_emitter: self.event_emitter,
            pipeline_id: self.pipeline_id,
            _phantom: PhantomData,
        }
    }

    /// Define o transformador
    pub fn transform<NewT: Transformer + Send + Sync>(self, transformer: NewT) -> PipelineBuilder<E, NewT, L> {
        PipelineBuilder {
            extractor: self.extractor,
            transformer,
            loader: self.loader,
            config: self.config,
            event_emitter: self.event_emitter,
            pipeline_id: self.pipeline_id,
            _phantom: PhantomData,
        }
    }

    /// Define o carregador
    pub fn load<NewL: Loader + Send + Sync>(self, loader: NewL) -> PipelineBuilder<E, T, NewL> {
        PipelineBuilder {
            extractor: self.extractor,
            transformer: self.transformer,
            loader,
            config: self.config,
            event_emitter: self.event_emitter,
            pipeline_id: self.pipeline_id,
            _phantom: PhantomData,
        }
    }

    /// Define a configuração
    pub fn config(mut self, config: ETLConfig) -> Self {
        self.config = config;
        self
    }

    /// Define o event emitter
    pub fn event_emitter<EventEmitterType: EventEmitter + 'static>(mut self, emitter: EventEmitterType) -> Self {
        self.event_emitter = Some(Arc::new(emitter));
        self
    }

    /// Define o ID usado nos eventos e logs, normalmente o nome da tabela
    pub fn pipeline_id(mut self, id: impl Into<String>) -> Self {
        self.pipeline_id = Some(id.into());
        self
    }

    /// Define o tamanho do lote entregue ao loader
    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.pipeline.batch_size = size;
        self
    }

    /// Define o timeout
    pub fn timeout_seconds(mut self, timeout: u64) -> Self {
        self.config.pipeline.timeout_seconds = timeout;
        self
    }
}

impl<E, T, L> PipelineBuilder<E, T, L>
where
    E: Extractor + Send + Sync,
    T: Transformer + Send + Sync,
    L: Loader + Send + Sync,
{
    /// Constrói o pipeline
    pub fn build(self) -> Pipeline<E, T, L> {
        let pipeline_id = self.pipeline_id.unwrap_or_else(|| {
            let millis = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default();
            format!("pipeline-{}-{}", std::process::id(), millis)
        });

        Pipeline {
            extractor: self.extractor,
            transformer: self.transformer,
            loader: self.loader,
            config: self.config,
            metrics: Arc::new(Mutex::new(PipelineMetrics::default())),
            state: Arc::new(Mutex::new(PipelineState::default())),
            event_emitter: self.event_emitter.unwrap_or_else(|| Arc::new(LoggingEventEmitter::default())),
            pipeline_id,
        }
    }
}

impl Default for PipelineBuilder<(), (), ()> {
    fn default() -> Self {
        Self::new()
    }
}
