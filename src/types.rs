use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use chrono::{NaiveDate, NaiveDateTime};

/// Representa uma linha de dados genérica
pub type DataRow = HashMap<String, DataValue>;

/// Texto usado pelas fontes legadas para marcar ausência de valor
pub const NULL_MARKER: &str = "NULL";

/// Valores de dados suportados
///
/// Floats comparam pelos bits canônicos: todo NaN é igual a qualquer NaN e
/// `-0.0` é igual a `0.0`. `Hash` usa os mesmos bits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DataValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
    /// Data sem horário (YYYY-MM-DD)
    Date(NaiveDate),
    /// Data e horário sem timezone (YYYY-MM-DD HH:MM:SS)
    DateTime(NaiveDateTime),
}

/// Bits usados em comparação e hash de floats
fn canonical_bits(value: f64) -> u64 {
    if value.is_nan() {
        f64::NAN.to_bits()
    } else if value == 0.0 {
        0.0f64.to_bits()
    } else {
        value.to_bits()
    }
}

impl PartialEq for DataValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DataValue::String(a), DataValue::String(b)) => a == b,
            (DataValue::Integer(a), DataValue::Integer(b)) => a == b,
            (DataValue::Float(a), DataValue::Float(b)) => canonical_bits(*a) == canonical_bits(*b),
            (DataValue::Boolean(a), DataValue::Boolean(b)) => a == b,
            (DataValue::Null, DataValue::Null) => true,
            (DataValue::Date(a), DataValue::Date(b)) => a == b,
            (DataValue::DateTime(a), DataValue::DateTime(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for DataValue {}

impl Hash for DataValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            DataValue::String(s) => {
                0u8.hash(state);
                s.hash(state);
            }
            DataValue::Integer(i) => {
                1u8.hash(state);
                i.hash(state);
            }
            DataValue::Float(f) => {
                2u8.hash(state);
                canonical_bits(*f).hash(state);
            }
            DataValue::Boolean(b) => {
                3u8.hash(state);
                b.hash(state);
            }
            DataValue::Null => {
                4u8.hash(state);
            }
            DataValue::Date(date) => {
                5u8.hash(state);
                date.hash(state);
            }
            DataValue::DateTime(dt) => {
                6u8.hash(state);
                dt.hash(state);
            }
        }
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        DataValue::String(value)
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::String(value.to_string())
    }
}

impl From<i64> for DataValue {
    fn from(value: i64) -> Self {
        DataValue::Integer(value)
    }
}

impl From<f64> for DataValue {
    fn from(value: f64) -> Self {
        DataValue::Float(value)
    }
}

impl From<bool> for DataValue {
    fn from(value: bool) -> Self {
        DataValue::Boolean(value)
    }
}

impl From<NaiveDate> for DataValue {
    fn from(value: NaiveDate) -> Self {
        DataValue::Date(value)
    }
}

impl From<NaiveDateTime> for DataValue {
    fn from(value: NaiveDateTime) -> Self {
        DataValue::DateTime(value)
    }
}

impl<T: Into<DataValue>> From<Option<T>> for DataValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(DataValue::Null)
    }
}

impl DataValue {
    /// Representação textual da célula, sem nenhuma normalização
    pub fn as_text(&self) -> Option<String> {
        match self {
            DataValue::String(s) => Some(s.clone()),
            DataValue::Integer(i) => Some(i.to_string()),
            DataValue::Float(f) if f.is_nan() => None,
            DataValue::Float(f) => Some(f.to_string()),
            DataValue::Boolean(b) => Some(b.to_string()),
            DataValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
            DataValue::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            DataValue::Null => None,
        }
    }

    /// Converte para inteiro se possível
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            DataValue::Integer(i) => Some(*i),
            DataValue::String(s) => s.trim().parse().ok(),
            DataValue::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    /// Converte para float se possível
    pub fn as_float(&self) -> Option<f64> {
        match self {
            DataValue::Float(f) if !f.is_nan() => Some(*f),
            DataValue::Integer(i) => Some(*i as f64),
            DataValue::String(s) => s.trim().parse().ok().filter(|f: &f64| !f.is_nan()),
            _ => None,
        }
    }

    /// Converte para data (NaiveDate) quando o valor já é tipado
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            DataValue::Date(d) => Some(*d),
            DataValue::DateTime(dt) => Some(dt.date()),
            _ => None,
        }
    }

    /// Verifica se é nulo
    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    /// Verifica se a célula deve ser tratada como ausente
    ///
    /// Além de `Null`, as fontes usam NaN, texto vazio e o literal `NULL`.
    pub fn is_missing(&self) -> bool {
        match self {
            DataValue::Null => true,
            DataValue::Float(f) => f.is_nan(),
            DataValue::String(s) => {
                let trimmed = s.trim();
                trimmed.is_empty() || trimmed == NULL_MARKER
            }
            _ => false,
        }
    }
}

/// Resultado de uma operação de pipeline
#[derive(Debug, Clone, Default)]
pub struct PipelineResult {
    pub rows_processed: usize,
    pub rows_successful: usize,
    pub rows_failed: usize,
    pub execution_time_ms: u64,
    pub errors: Vec<String>,
}

impl PipelineResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success_rate(&self) -> f64 {
        if self.rows_processed == 0 {
            0.0
        } else {
            self.rows_successful as f64 / self.rows_processed as f64
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Estados do pipeline para rastreamento de execução
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    Extracting,
    Cleaning,
    Loading,
    Completed,
    Failed(String),
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineState::Idle => write!(f, "Ocioso"),
            PipelineState::Extracting => write!(f, "Extraindo"),
            PipelineState::Cleaning => write!(f, "Limpando"),
            PipelineState::Loading => write!(f, "Carregando"),
            PipelineState::Completed => write!(f, "Concluído"),
            PipelineState::Failed(error) => write!(f, "Falhou: {}", error),
        }
    }
}

/// Eventos do pipeline para monitoramento externo
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// Pipeline iniciado
    Started {
        pipeline_id: String,
        timestamp: std::time::SystemTime,
    },
    /// Estado alterado
    StateChanged {
        pipeline_id: String,
        old_state: PipelineState,
        new_state: PipelineState,
        timestamp: std::time::SystemTime,
    },
    /// Linhas descartadas pela limpeza
    RowsRejected {
        pipeline_id: String,
        rows_rejected: usize,
        timestamp: std::time::SystemTime,
    },
    /// Erro ocorreu
    Error {
        pipeline_id: String,
        error: String,
        timestamp: std::time::SystemTime,
    },
    /// Pipeline concluído
    Completed {
        pipeline_id: String,
        result: PipelineResult,
        timestamp: std::time::SystemTime,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_missing() {
        assert!(DataValue::Null.is_missing());
        assert!(DataValue::Float(f64::NAN).is_missing());
        assert!(DataValue::String("   ".to_string()).is_missing());
        assert!(DataValue::String("NULL".to_string()).is_missing());
        assert!(!DataValue::String("null value".to_string()).is_missing());
        assert!(!DataValue::Integer(0).is_missing());
    }

    #[test]
    fn test_as_text_keeps_raw_content() {
        assert_eq!(DataValue::String(" 07700 ".to_string()).as_text().as_deref(), Some(" 07700 "));
        assert_eq!(DataValue::Integer(42).as_text().as_deref(), Some("42"));
        assert_eq!(DataValue::Float(3.0).as_text().as_deref(), Some("3"));
        assert_eq!(DataValue::Float(f64::NAN).as_text(), None);
        assert_eq!(DataValue::Null.as_text(), None);
    }

    #[test]
    fn test_numeric_conversions() {
        assert_eq!(DataValue::String(" 12 ".to_string()).as_integer(), Some(12));
        assert_eq!(DataValue::Float(2.5).as_integer(), None);
        assert_eq!(DataValue::String("1.25".to_string()).as_float(), Some(1.25));
        assert_eq!(DataValue::String("N/A".to_string()).as_float(), None);
    }

    #[test]
    fn test_hash_distinguishes_variants() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(DataValue::Integer(1));
        set.insert(DataValue::String("1".to_string()));
        set.insert(DataValue::Integer(1));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_float_equality_matches_hash() {
        use std::collections::HashSet;

        assert_eq!(DataValue::Float(f64::NAN), DataValue::Float(f64::NAN));
        assert_eq!(DataValue::Float(-0.0), DataValue::Float(0.0));
        assert_ne!(DataValue::Float(1.5), DataValue::Float(2.5));
        assert_ne!(DataValue::Float(1.0), DataValue::Integer(1));

        let mut set = HashSet::new();
        set.insert(DataValue::Float(f64::NAN));
        set.insert(DataValue::Float(-f64::NAN));
        set.insert(DataValue::Float(0.0));
        set.insert(DataValue::Float(-0.0));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_pipeline_result_rate() {
        let mut result = PipelineResult::new();
        assert_eq!(result.success_rate(), 0.0);
        result.rows_processed = 4;
        result.rows_successful = 3;
        assert_eq!(result.success_rate(), 0.75);
        assert!(!result.has_errors());
    }
}
