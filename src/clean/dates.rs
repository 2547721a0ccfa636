//! Reconciliação de datas escritas em convenções diferentes na mesma coluna.

use chrono::NaiveDate;

/// Um formato candidato de data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatePattern {
    /// Nome legível, no estilo `MonthName:DD:YY`
    pub name: &'static str,
    /// Formato chrono aplicado ao token já normalizado
    pub format: &'static str,
    /// Formatos com nome de mês aceitam `:`, `/` ou espaços entre os componentes
    pub month_name: bool,
}

/// Formatos aceitos, na ordem em que são tentados
pub const DATE_PATTERNS: [DatePattern; 4] = [
    DatePattern { name: "YYYY-MM-DD", format: "%Y-%m-%d", month_name: false },
    DatePattern { name: "MonthName:DD:YY", format: "%B %d %y", month_name: true },
    DatePattern { name: "YYYY:MonthName:DD", format: "%Y %B %d", month_name: true },
    DatePattern { name: "MonthName:YYYY:DD", format: "%B %Y %d", month_name: true },
];

/// Reconciliador de datas com lista de formatos fixa e ordenada
///
/// Um token ambíguo fica com o primeiro formato que o aceitar.
#[derive(Debug, Clone, Copy)]
pub struct DateReconciler {
    patterns: &'static [DatePattern],
}

impl Default for DateReconciler {
    fn default() -> Self {
        Self::new(&DATE_PATTERNS)
    }
}

impl DateReconciler {
    pub fn new(patterns: &'static [DatePattern]) -> Self {
        Self { patterns }
    }

    /// Formatos usados, na ordem de tentativa
    pub fn patterns(&self) -> &'static [DatePattern] {
        self.patterns
    }

    /// Converte o token na primeira data válida encontrada
    pub fn reconcile(&self, token: &str) -> Option<NaiveDate> {
        self.reconcile_with_pattern(token).map(|(date, _)| date)
    }

    /// Como [`reconcile`](Self::reconcile), devolvendo também o formato que casou
    pub fn reconcile_with_pattern(&self, token: &str) -> Option<(NaiveDate, &'static DatePattern)> {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return None;
        }

        let spaced = normalize_separators(trimmed);

        self.patterns.iter().find_map(|pattern| {
            let candidate = if pattern.month_name { spaced.as_str() } else { trimmed };
            NaiveDate::parse_from_str(candidate, pattern.format)
                .ok()
                .map(|date| (date, pattern))
        })
    }
}

/// Reconcilia um token usando os formatos padrão
pub fn reconcile_date(token: &str) -> Option<NaiveDate> {
    DateReconciler::default().reconcile(token)
}

fn normalize_separators(token: &str) -> String {
    token
        .split(|c: char| c == ':' || c == '/' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_iso_date() {
        assert_eq!(reconcile_date("2021-05-04"), Some(date(2021, 5, 4)));
        assert_eq!(reconcile_date("  2021-05-04 "), Some(date(2021, 5, 4)));
    }

    #[test]
    fn test_month_day_short_year() {
        assert_eq!(reconcile_date("May:04:21"), Some(date(2021, 5, 4)));
        assert_eq!(reconcile_date("May 04 21"), Some(date(2021, 5, 4)));
    }

    #[test]
    fn test_year_month_day() {
        assert_eq!(reconcile_date("1968 October 16"), Some(date(1968, 10, 16)));
        assert_eq!(reconcile_date("2005:Jan:27"), Some(date(2005, 1, 27)));
    }

    #[test]
    fn test_month_year_day() {
        assert_eq!(reconcile_date("July 1961 14"), Some(date(1961, 7, 14)));
        assert_eq!(reconcile_date("December/2018/02"), Some(date(2018, 12, 2)));
    }

    #[test]
    fn test_invalid_tokens() {
        assert_eq!(reconcile_date("not-a-date"), None);
        assert_eq!(reconcile_date(""), None);
        assert_eq!(reconcile_date("2021-02-30"), None);
        assert_eq!(reconcile_date("GB9JQB1V6Z"), None);
    }

    #[test]
    fn test_first_matching_pattern_wins() {
        let reconciler = DateReconciler::default();
        let (_, pattern) = reconciler.reconcile_with_pattern("May:04:21").unwrap();
        assert_eq!(pattern.name, "MonthName:DD:YY");

        let (_, pattern) = reconciler.reconcile_with_pattern("2021-05-04").unwrap();
        assert_eq!(pattern.name, "YYYY-MM-DD");
    }
}
