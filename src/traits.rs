use async_trait::async_trait;
use serde::Serialize;
use crate::clean::Cleaned;
use crate::error::Result;
use crate::types::{DataRow, PipelineEvent, PipelineResult};

/// Trait para componentes que extraem dados
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extrai dados da fonte
    async fn extract(&self) -> Result<Vec<DataRow>>;
}

/// Trait para componentes que transformam dados
#[async_trait]
pub trait Transformer: Send + Sync {
    /// Transforma um lote de dados
    async fn transform(&self, data: Vec<DataRow>) -> Result<Vec<DataRow>>;

    /// Transforma e devolve também o resultado da etapa
    ///
    /// A implementação padrão considera que nenhuma linha foi descartada.
    async fn transform_with_report(&self, data: Vec<DataRow>) -> Result<(Vec<DataRow>, PipelineResult)> {
        let rows_in = data.len();
        let rows = self.transform(data).await?;
        let result = PipelineResult {
            rows_processed: rows_in,
            rows_successful: rows.len(),
            ..PipelineResult::default()
        };
        Ok((rows, result))
    }
}

/// Trait para componentes que carregam dados
#[async_trait]
pub trait Loader: Send + Sync {
    /// Carrega dados para o destino
    async fn load(&self, data: Vec<DataRow>) -> Result<PipelineResult>;

    /// Finaliza o carregamento (flush, commit, etc.)
    async fn finalize(&self) -> Result<()> {
        Ok(())
    }

    /// Verifica se o destino está disponível
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

/// Registro limpo pronto para uma tabela do esquema estrela
pub trait Record: Serialize + Clone + Send + 'static {
    /// Tabela de destino no warehouse
    const TABLE: &'static str;
    /// Colunas na ordem em que são gravadas
    const COLUMNS: &'static [&'static str];

    /// Converte o registro numa linha genérica
    fn into_row(self) -> DataRow;
}

/// Pipeline de limpeza de um tipo de registro
///
/// `clean` é pura: recebe a tabela bruta emprestada e devolve uma tabela nova.
pub trait Cleaner: Send + Sync {
    type Record: Record;

    fn clean(&self, rows: &[DataRow]) -> Cleaned<Self::Record>;
}

/// Trait para emissão de eventos do pipeline
#[async_trait]
pub trait EventEmitter: Send + Sync {
    /// Emite um evento do pipeline
    async fn emit(&self, event: PipelineEvent) -> Result<()>;
}

impl<C: Cleaner + ?Sized> Cleaner for std::sync::Arc<C> {
    type Record = C::Record;

    fn clean(&self, rows: &[DataRow]) -> Cleaned<Self::Record> {
        (**self).clean(rows)
    }
}
