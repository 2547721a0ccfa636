use thiserror::Error;

/// Tipo Result principal da biblioteca
pub type Result<T> = std::result::Result<T, ETLError>;

/// Erro principal da biblioteca
///
/// Cobre apenas falhas de I/O e de orquestração. Falhas de limpeza de uma
/// célula nunca abortam uma tabela: viram [`RejectReason`] no relatório.
#[derive(Error, Debug)]
pub enum ETLError {
    #[error("Erro de extração: {0}")]
    Extract(#[from] ExtractError),

    #[error("Erro de transformação: {0}")]
    Transform(#[from] TransformError),

    #[error("Erro de carga: {0}")]
    Load(#[from] LoadError),

    #[error("Erro de configuração: {0}")]
    Config(#[from] ConfigError),

    #[error("Erro de pipeline: {0}")]
    Pipeline(String),

    #[error("Erro de I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro de serialização: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Erro genérico: {0}")]
    Generic(#[from] anyhow::Error),
}

/// Erros relacionados à extração de dados
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Arquivo não encontrado: {0}")]
    FileNotFound(String),

    #[error("Formato inválido: {0}")]
    InvalidFormat(String),

    #[error("Erro de parsing: {0}")]
    ParseError(String),
}

/// Erros relacionados à transformação de dados
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Erro de processamento: {0}")]
    ProcessingError(String),

    #[error("Tarefa de limpeza interrompida: {0}")]
    TaskAborted(String),
}

/// Erros relacionados ao carregamento de dados
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Erro de conexão de destino: {0}")]
    DestinationConnection(String),

    #[error("Erro de escrita: {0}")]
    WriteError(String),
}

/// Erros relacionados à configuração
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuração inválida: {0}")]
    InvalidConfig(String),

    #[error("Valor inválido para {param}: {value}")]
    InvalidValue { param: String, value: String },

    #[error("Erro de parsing de configuração: {0}")]
    ParseError(String),
}

/// Motivo pelo qual uma linha foi descartada durante a limpeza
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RejectReason {
    #[error("coluna obrigatória ausente: {column}")]
    Missing { column: &'static str },

    #[error("data inválida em {column}: '{raw}'")]
    InvalidDate { column: &'static str, raw: String },

    #[error("número inválido em {column}: '{raw}'")]
    InvalidNumber { column: &'static str, raw: String },

    #[error("UUID inválido em {column}: '{raw}'")]
    InvalidUuid { column: &'static str, raw: String },

    #[error("e-mail inválido: '{raw}'")]
    InvalidEmail { raw: String },

    #[error("telefone inválido para {country_code}: '{raw}'")]
    InvalidPhone { country_code: String, raw: String },

    #[error("peso não reconhecido: '{raw}'")]
    InvalidWeight { raw: String },

    #[error("número de cartão inválido: '{raw}'")]
    InvalidCardNumber { raw: String },

    #[error("código de país fora do domínio: '{raw}'")]
    UnknownCountryCode { raw: String },

    #[error("valor fora do domínio em {column}: '{raw}'")]
    UnexpectedValue { column: &'static str, raw: String },

    #[error("validade {expiry} não é anterior ao pagamento {confirmed}")]
    ExpiryNotBeforePayment { expiry: String, confirmed: String },
}

impl RejectReason {
    /// Indica se a rejeição veio de um valor ausente (e não inválido)
    pub fn is_missing(&self) -> bool {
        matches!(self, RejectReason::Missing { .. })
    }
}

impl ETLError {
    /// Verifica se o erro é recuperável
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ETLError::Load(LoadError::DestinationConnection(_)))
    }

    /// Retorna o código de erro
    pub fn error_code(&self) -> &'static str {
        match self {
            ETLError::Extract(_) => "EXTRACT_ERROR",
            ETLError::Transform(_) => "TRANSFORM_ERROR",
            ETLError::Load(_) => "LOAD_ERROR",
            ETLError::Config(_) => "CONFIG_ERROR",
            ETLError::Pipeline(_) => "PIPELINE_ERROR",
            ETLError::Io(_) => "IO_ERROR",
            ETLError::Serialization(_) => "SERIALIZATION_ERROR",
            ETLError::Generic(_) => "GENERIC_ERROR",
        }
    }
}

impl From<config::ConfigError> for ETLError {
    fn from(err: config::ConfigError) -> Self {
        ETLError::Config(ConfigError::ParseError(err.to_string()))
    }
}

#[cfg(feature = "csv")]
impl From<csv::Error> for ETLError {
    fn from(err: csv::Error) -> Self {
        match err.kind() {
            csv::ErrorKind::Io(io_err) => ETLError::Io(std::io::Error::new(io_err.kind(), io_err.to_string())),
            csv::ErrorKind::Utf8 { .. } => {
                ETLError::Extract(ExtractError::InvalidFormat("UTF-8 inválido".to_string()))
            }
            _ => ETLError::Extract(ExtractError::ParseError(err.to_string())),
        }
    }
}
