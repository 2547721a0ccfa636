//! # retail-etl - Limpeza de dados de varejo para um esquema estrela
//!
//! Pipelines que recebem tabelas brutas e inconsistentes (datas em quatro
//! formatos, telefones sem código do país, pesos como "1 x 100ml", códigos de
//! país em caixa mista, endereços com quebras de linha) e devolvem registros
//! tipados, validados e prontos para tabelas com chaves primárias e
//! estrangeiras.
//!
//! ## Exemplo Rápido
//!
//! ```rust,no_run
//! use retail_etl::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Pipeline simples: CSV → limpeza de usuários → JSON
//!     let pipeline = Pipeline::builder()
//!         .extract(CsvExtractor::new("legacy_users.csv"))
//!         .transform(CleaningTransform::new(UserCleaner::default()))
//!         .load(JsonLoader::for_record::<UserRecord>("warehouse"))
//!         .pipeline_id("dim_users")
//!         .build();
//!
//!     let result = pipeline.execute().await?;
//!     println!("{} usuários gravados", result.rows_successful);
//!     Ok(())
//! }
//! ```
//!
//! ## Arquitetura
//!
//! ### Limpeza
//! O núcleo da biblioteca. Seis pipelines independentes (`UserCleaner`,
//! `CardCleaner`, `StoreCleaner`, `ProductCleaner`, `OrderCleaner`,
//! `DateTimeCleaner`) compostos a partir das primitivas de `clean`: datas,
//! texto, telefones e pesos. Cada linha descartada vem com o motivo em
//! `CleaningReport`.
//!
//! ### Extractors
//! Leem CSV e JSON sem inferir tipos.
//!
//! ### Loaders
//! Gravam cada tabela limpa em JSON, no console ou em memória.
//!
//! ### Esquema
//! `schema` descreve as seis tabelas e confere as chaves estrangeiras dos
//! pedidos antes da carga.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;
pub mod clean;
pub mod schema;
pub mod extract;
pub mod transform;
pub mod load;
pub mod pipeline;
pub mod events;
pub mod logging;
pub mod warehouse;

// Re-exports para facilitar o uso
pub use config::{CleaningConfig, ETLConfig};
pub use error::{ETLError, RejectReason, Result};
pub use types::{DataRow, DataValue, PipelineResult, PipelineState, PipelineEvent};
pub use traits::*;
pub use pipeline::Pipeline;
pub use events::{LoggingEventEmitter, InMemoryEventEmitter};
pub use clean::{Cleaned, CleaningReport, Rejection};
pub use warehouse::{clean_all, CleanedWarehouse, RawTables};

/// Prelude com imports mais comuns
pub mod prelude {
    pub use crate::config::{CleaningConfig, ETLConfig, LogFormat};
    pub use crate::error::{ETLError, RejectReason, Result};
    pub use crate::types::{DataRow, DataValue, PipelineResult, PipelineState, PipelineEvent};
    pub use crate::traits::{Cleaner, EventEmitter, Extractor, Loader, Record, Transformer};
    pub use crate::pipeline::Pipeline;
    pub use crate::events::{LoggingEventEmitter, InMemoryEventEmitter};
    pub use crate::logging::init_tracing;

    // Limpeza
    pub use crate::clean::{
        clean_in_background, CardCleaner, CardRecord, Cleaned, CleaningReport, CountryCode,
        DateTimeCleaner, DateTimeRecord, OrderCleaner, OrderRecord, ProductCleaner, ProductRecord,
        StoreCleaner, StoreRecord, UserCleaner, UserRecord,
    };
    pub use crate::schema::{check_integrity, Dimensions, IntegrityReport};
    pub use crate::warehouse::{clean_all, CleanedWarehouse, RawTables};

    // Extractors
    #[cfg(feature = "csv")]
    pub use crate::extract::csv::CsvExtractor;

    #[cfg(feature = "json")]
    pub use crate::extract::json::JsonExtractor;

    // Transformers
    pub use crate::transform::CleaningTransform;

    // Loaders
    pub use crate::load::common::DataFormatter;
    pub use crate::load::console::ConsoleLoader;
    pub use crate::load::memory::MemoryLoader;
    pub use crate::load::json::JsonLoader;
}

/// Informações sobre a versão da biblioteca
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Informações sobre a biblioteca
pub fn about() -> &'static str {
    env!("CARGO_PKG_DESCRIPTION")
}
