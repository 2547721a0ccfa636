use tracing_subscriber::EnvFilter;
use crate::config::{LogFormat, ObservabilityConfig};
use crate::error::{ConfigError, ETLError, Result};

/// Monta o filtro de níveis
///
/// `RUST_LOG` tem precedência sobre o nível configurado.
pub fn env_filter(config: &ObservabilityConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    EnvFilter::try_new(&config.log_level).map_err(|_| {
        ETLError::Config(ConfigError::InvalidValue {
            param: "log_level".to_string(),
            value: config.log_level.clone(),
        })
    })
}

/// Instala o subscriber global de logs no formato configurado
///
/// Falha se já houver um subscriber instalado.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config)?)
        .with_target(false)
        .with_level(true);

    let installed = match config.log_format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    installed.map_err(|e| ETLError::Generic(anyhow::anyhow!("Falha ao inicializar logs: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_is_rejected() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }

        let config = ObservabilityConfig {
            log_level: "retail_etl=loud".to_string(),
            ..ObservabilityConfig::default()
        };
        let err = env_filter(&config).unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_init_tracing_only_once() {
        let config = ObservabilityConfig {
            log_format: LogFormat::Compact,
            ..ObservabilityConfig::default()
        };

        // Outro teste pode ter instalado um subscriber antes
        let _ = init_tracing(&config);
        assert!(init_tracing(&config).is_err());
    }
}
