//! Normalização de telefones para o formato internacional.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use super::text::digits_only;

/// Comprimento assumido para países sem regra própria
pub const DEFAULT_PHONE_LENGTH: usize = 13;

/// Tabelas de prefixo internacional e comprimento esperado por país
///
/// Para códigos de país fora da tabela nenhum prefixo é adicionado, o
/// comprimento padrão é exigido e o número já precisa começar com "+".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhoneRules {
    pub dial_codes: BTreeMap<String, String>,
    pub lengths: BTreeMap<String, usize>,
    pub default_length: usize,
}

impl Default for PhoneRules {
    fn default() -> Self {
        let dial_codes = [("DE", "+49"), ("GB", "+44"), ("US", "+1")]
            .into_iter()
            .map(|(country, prefix)| (country.to_string(), prefix.to_string()))
            .collect();
        let lengths = [("DE", 12), ("GB", 13), ("US", 12)]
            .into_iter()
            .map(|(country, length)| (country.to_string(), length))
            .collect();

        Self {
            dial_codes,
            lengths,
            default_length: DEFAULT_PHONE_LENGTH,
        }
    }
}

impl PhoneRules {
    /// Prefixo internacional do país, se conhecido
    pub fn dial_code(&self, country_code: &str) -> Option<&str> {
        lookup(&self.dial_codes, country_code).map(String::as_str)
    }

    /// Comprimento total esperado, com o prefixo incluído
    pub fn expected_length(&self, country_code: &str) -> usize {
        lookup(&self.lengths, country_code)
            .copied()
            .unwrap_or(self.default_length)
    }

    /// Normaliza o telefone ou devolve `None` quando ele deve ser rejeitado
    pub fn normalize(&self, raw: &str, country_code: &str) -> Option<String> {
        let trimmed = raw.trim();
        let digits = digits_only(trimmed);
        if digits.is_empty() {
            return None;
        }

        // Um "+" antes do primeiro dígito marca número internacional, como em "(+44) ..."
        let international = trimmed
            .chars()
            .take_while(|c| !c.is_ascii_digit())
            .any(|c| c == '+');

        let mut cleaned = if international {
            format!("+{}", digits)
        } else {
            digits
        };

        if let Some(prefix) = self.dial_code(country_code) {
            if !cleaned.starts_with(prefix) {
                cleaned = format!("{}{}", prefix, cleaned);
            }
        }

        if !is_international(&cleaned) {
            return None;
        }

        if cleaned.len() != self.expected_length(country_code) {
            return None;
        }

        Some(cleaned)
    }
}

/// Normaliza com as tabelas padrão
pub fn normalize_phone(raw: &str, country_code: &str) -> Option<String> {
    PhoneRules::default().normalize(raw, country_code)
}

fn is_international(number: &str) -> bool {
    number
        .strip_prefix('+')
        .map(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

// Chaves vindas de arquivos de configuração podem chegar em minúsculas
fn lookup<'a, V>(table: &'a BTreeMap<String, V>, country_code: &str) -> Option<&'a V> {
    let code = country_code.trim();
    table.get(code).or_else(|| {
        table
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(code))
            .map(|(_, value)| value)
    })
}
