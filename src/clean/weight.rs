//! Conversão de pesos em texto livre para quilogramas.

use serde::{Deserialize, Serialize, Serializer};

/// Como a unidade é localizada no token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitMatching {
    /// A unidade pode aparecer em qualquer posição do token
    #[default]
    Substring,
    /// A unidade precisa terminar o token
    Suffix,
}

/// Unidade reconhecida e seu fator para quilogramas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitFactor {
    pub unit: String,
    pub kg: f64,
}

impl UnitFactor {
    fn new(unit: &str, kg: f64) -> Self {
        Self { unit: unit.to_string(), kg }
    }
}

/// Regras de conversão de peso
///
/// As unidades são testadas na ordem da lista; a primeira encontrada vence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightRules {
    pub units: Vec<UnitFactor>,
    pub matching: UnitMatching,
}

impl Default for WeightRules {
    fn default() -> Self {
        Self {
            units: vec![
                UnitFactor::new("kg", 1.0),
                UnitFactor::new("g", 0.001),
                UnitFactor::new("ml", 0.001),
                UnitFactor::new("oz", 0.028349523125),
            ],
            matching: UnitMatching::Substring,
        }
    }
}

impl WeightRules {
    pub fn with_matching(mut self, matching: UnitMatching) -> Self {
        self.matching = matching;
        self
    }

    /// Converte o token para quilogramas, ou `None` se não for possível
    ///
    /// Aceita `<valor><unidade>` e a forma multiplicada
    /// `<quantidade> x <valor><unidade>`.
    pub fn to_kg(&self, raw: &str) -> Option<f64> {
        let token = raw.trim().to_lowercase().replace(" .", "");
        let token = token.trim();

        let unit = self.units.iter().find(|u| match self.matching {
            UnitMatching::Substring => token.contains(u.unit.as_str()),
            UnitMatching::Suffix => token.ends_with(u.unit.as_str()),
        })?;

        let body = token.trim_matches(|c: char| unit.unit.contains(c));

        let amount = if body.contains('x') {
            let mut operands = body.split('x');
            let count = parse_operand(operands.next()?)?;
            let each = parse_operand(operands.next()?)?;
            if operands.next().is_some() {
                return None;
            }
            count * each
        } else {
            parse_operand(body)?
        };

        let kg = amount * unit.kg;
        (kg.is_finite() && kg >= 0.0).then_some(kg)
    }
}

fn parse_operand(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Converte usando as regras padrão
pub fn convert_weight(raw: &str) -> Option<f64> {
    WeightRules::default().to_kg(raw)
}

/// Faixa de peso usada pela logística
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightClass {
    Light,
    MidSized,
    Heavy,
    TruckRequired,
}

impl WeightClass {
    /// Classifica um peso em quilogramas
    pub fn from_kg(kg: f64) -> Self {
        if kg < 2.0 {
            WeightClass::Light
        } else if kg < 40.0 {
            WeightClass::MidSized
        } else if kg < 140.0 {
            WeightClass::Heavy
        } else {
            WeightClass::TruckRequired
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeightClass::Light => "Light",
            WeightClass::MidSized => "Mid_Sized",
            WeightClass::Heavy => "Heavy",
            WeightClass::TruckRequired => "Truck_Required",
        }
    }
}

impl std::fmt::Display for WeightClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for WeightClass {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
