use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::clean::phone::PhoneRules;
use crate::clean::weight::{UnitMatching, WeightRules};
use crate::error::{ConfigError, ETLError};

/// Configuração principal do ETL
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ETLConfig {
    pub pipeline: PipelineConfig,
    pub cleaning: CleaningConfig,
    pub observability: ObservabilityConfig,
}

/// Configuração do pipeline
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub batch_size: usize,
    pub parallel_workers: usize,
    pub timeout_seconds: u64,
}

/// Regras de limpeza injetadas nos limpadores
///
/// As tabelas de conversão são valores imutáveis: cada limpador recebe a sua
/// cópia na construção.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CleaningConfig {
    pub phone: PhoneRules,
    pub weight: WeightRules,
    pub validate_email: bool,
}

/// Configuração de observabilidade
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

/// Formato de log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            parallel_workers: num_cpus::get(),
            timeout_seconds: 300,
        }
    }
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            phone: PhoneRules::default(),
            weight: WeightRules::default(),
            validate_email: true,
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl ETLConfig {
    /// Cria um novo builder para configuração
    pub fn builder() -> ETLConfigBuilder {
        ETLConfigBuilder::default()
    }

    /// Carrega configuração do ambiente
    pub fn from_env() -> Result<Self, ETLError> {
        let mut builder = Self::builder();

        if let Ok(batch_size) = std::env::var("ETL_BATCH_SIZE") {
            if let Ok(size) = batch_size.parse::<usize>() {
                builder = builder.batch_size(size);
            }
        }

        if let Ok(workers) = std::env::var("ETL_PARALLEL_WORKERS") {
            if let Ok(worker_count) = workers.parse::<usize>() {
                builder = builder.parallel_workers(worker_count);
            }
        }

        if let Ok(timeout) = std::env::var("ETL_TIMEOUT_SECONDS") {
            if let Ok(timeout_val) = timeout.parse::<u64>() {
                builder = builder.timeout_seconds(timeout_val);
            }
        }

        if let Ok(validate) = std::env::var("ETL_VALIDATE_EMAIL") {
            if let Ok(enable) = validate.parse::<bool>() {
                builder = builder.validate_email(enable);
            }
        }

        if let Ok(matching) = std::env::var("ETL_UNIT_MATCHING") {
            match matching.to_lowercase().as_str() {
                "substring" => builder = builder.unit_matching(UnitMatching::Substring),
                "suffix" => builder = builder.unit_matching(UnitMatching::Suffix),
                other => {
                    return Err(ETLError::Config(ConfigError::InvalidValue {
                        param: "ETL_UNIT_MATCHING".to_string(),
                        value: other.to_string(),
                    }))
                }
            }
        }

        if let Ok(level) = std::env::var("ETL_LOG_LEVEL") {
            builder = builder.log_level(level);
        }

        builder.build()
    }

    /// Carrega configuração de arquivo
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ETLError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .build()?;

        let parsed: Self = config.try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Carrega configuração de string TOML
    pub fn from_toml(toml_str: &str) -> Result<Self, ETLError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(toml_str, config::FileFormat::Toml))
            .build()?;

        let parsed: Self = config.try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Valida a configuração
    pub fn validate(&self) -> Result<(), ETLError> {
        if self.pipeline.batch_size == 0 {
            return Err(ETLError::Config(ConfigError::InvalidValue {
                param: "batch_size".to_string(),
                value: "0".to_string(),
            }));
        }

        if self.pipeline.parallel_workers == 0 {
            return Err(ETLError::Config(ConfigError::InvalidValue {
                param: "parallel_workers".to_string(),
                value: "0".to_string(),
            }));
        }

        if self.cleaning.phone.default_length == 0 {
            return Err(ETLError::Config(ConfigError::InvalidValue {
                param: "cleaning.phone.default_length".to_string(),
                value: "0".to_string(),
            }));
        }

        if self.cleaning.weight.units.is_empty() {
            return Err(ETLError::Config(ConfigError::InvalidConfig(
                "cleaning.weight.units não pode ser vazio".to_string(),
            )));
        }

        Ok(())
    }
}

/// Builder para configuração ETL
#[derive(Default)]
pub struct ETLConfigBuilder {
    config: ETLConfig,
}

impl ETLConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.pipeline.batch_size = size;
        self
    }

    pub fn parallel_workers(mut self, workers: usize) -> Self {
        self.config.pipeline.parallel_workers = workers;
        self
    }

    pub fn timeout_seconds(mut self, timeout: u64) -> Self {
        self.config.pipeline.timeout_seconds = timeout;
        self
    }

    pub fn validate_email(mut self, enable: bool) -> Self {
        self.config.cleaning.validate_email = enable;
        self
    }

    pub fn unit_matching(mut self, matching: UnitMatching) -> Self {
        self.config.cleaning.weight.matching = matching;
        self
    }

    pub fn phone_rules(mut self, rules: PhoneRules) -> Self {
        self.config.cleaning.phone = rules;
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.observability.log_level = level.into();
        self
    }

    pub fn log_format(mut self, format: LogFormat) -> Self {
        self.config.observability.log_format = format;
        self
    }

    pub fn build(self) -> Result<ETLConfig, ETLError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
