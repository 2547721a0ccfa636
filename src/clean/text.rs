//! Normalização de texto e de colunas categóricas.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("regex de e-mail válida")
});

/// Remove espaços nas bordas
pub fn normalize_text(raw: &str) -> String {
    raw.trim().to_string()
}

/// Remove espaços nas bordas e troca quebras de linha internas por ", "
pub fn normalize_address(raw: &str) -> String {
    raw.trim()
        .replace("\r\n", "\n")
        .replace('\n', ", ")
}

/// Corrige o erro de digitação conhecido "GGB" → "GB"
pub fn fix_country_code(raw: &str) -> String {
    raw.trim().replace("GGB", "GB")
}

/// Remove o prefixo "ee" deixado por erro de digitação no continente
pub fn fix_continent(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed.strip_prefix("ee").unwrap_or(trimmed).to_string()
}

/// Primeira palavra da descrição do emissor do cartão
pub fn card_provider(raw: &str) -> Option<&str> {
    raw.split_whitespace().next()
}

/// Remove símbolos monetários soltos antes de converter o preço
pub fn strip_currency(raw: &str) -> String {
    raw.trim()
        .trim_start_matches(['£', '$', '€'])
        .trim()
        .replace(',', "")
}

/// Mantém apenas os dígitos ASCII
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Validação sintática de e-mail
pub fn is_valid_email(raw: &str) -> bool {
    EMAIL_RE.is_match(raw.trim())
}

/// Valor categórico de baixa cardinalidade
///
/// Valores iguais vindos do mesmo [`CategoryInterner`] compartilham a alocação.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Category(Arc<str>);

impl Category {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Verdadeiro quando as duas categorias apontam para a mesma alocação
    pub fn shares_storage_with(&self, other: &Category) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for Category {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        Category(Arc::from(value))
    }
}

impl PartialEq<str> for Category {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Category {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Pool de categorias de uma execução de limpeza
#[derive(Debug, Default)]
pub struct CategoryInterner {
    pool: HashSet<Arc<str>>,
}

impl CategoryInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Devolve a categoria para o valor, reaproveitando a alocação existente
    pub fn intern(&mut self, value: &str) -> Category {
        if let Some(existing) = self.pool.get(value) {
            return Category(Arc::clone(existing));
        }
        let shared: Arc<str> = Arc::from(value);
        self.pool.insert(Arc::clone(&shared));
        Category(shared)
    }

    /// Número de valores distintos vistos
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }
}
