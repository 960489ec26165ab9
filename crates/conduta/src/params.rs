//! Resolver for the `Config` relation: a loose key–value namespace with
//! an enumerated set of recognized keys. Unknown keys are ignored;
//! missing keys fall back to defaults at the call site.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::domain::{parse_decimal, parse_flexible_date};
use crate::store::{field, Relation};

/// Recognized configuration keys.
pub mod keys {
    pub const PONTUACAO_INICIAL: &str = "pontuacao_inicial";
    pub const PERIODO_ADAPTACAO_INICIO: &str = "periodo_adaptacao_inicio";
    pub const PERIODO_ADAPTACAO_FIM: &str = "periodo_adaptacao_fim";
    pub const FATOR_ADAPTACAO: &str = "fator_adaptacao";
    pub const CONCEITO_REFERENCIA: &str = "conceito_referencia";
    pub const FATOR_CONCEITO_PONTOS: &str = "fator_conceito_pontos";
    pub const FATOR_CONCEITO_MEDIA: &str = "fator_conceito_media";
    pub const PERNOITE_CABECALHO: &str = "pernoite_cabecalho";
    pub const PERNOITE_RODAPE: &str = "pernoite_rodape";
    pub const PERNOITE_LEGENDA_CAP: &str = "pernoite_legenda_cap";
    pub const PERNOITE_LEGENDA_QTPA: &str = "pernoite_legenda_qtpa";
}

pub const PONTUACAO_INICIAL_PADRAO: f64 = 10.0;
pub const FATOR_ADAPTACAO_PADRAO: f64 = 0.25;
pub const CONCEITO_REFERENCIA_PADRAO: f64 = 8.0;
pub const FATOR_CONCEITO_PONTOS_PADRAO: f64 = 0.2;
pub const FATOR_CONCEITO_MEDIA_PADRAO: f64 = 0.1;

/// Resolved view over the `Config` table.
#[derive(Debug, Clone, Default)]
pub struct Params {
    values: HashMap<String, String>,
}

impl Params {
    pub fn from_relation(relation: &Relation) -> Self {
        let mut values = HashMap::with_capacity(relation.rows.len());
        for row in &relation.rows {
            let chave = field(row, "chave");
            if chave.is_empty() {
                continue;
            }
            // First match wins; duplicate keys in the sheet are noise.
            values
                .entry(chave.to_string())
                .or_insert_with(|| field(row, "valor").to_string());
        }
        Self { values }
    }

    #[cfg(test)]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            values: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn text(&self, key: &str, default: &str) -> String {
        self.values
            .get(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default.to_string())
    }

    pub fn real(&self, key: &str, default: f64) -> f64 {
        self.values
            .get(key)
            .and_then(|v| parse_decimal(v))
            .unwrap_or(default)
    }

    pub fn date(&self, key: &str) -> Option<NaiveDate> {
        self.values.get(key).and_then(|v| parse_flexible_date(v))
    }

    pub fn pontuacao_inicial(&self) -> f64 {
        self.real(keys::PONTUACAO_INICIAL, PONTUACAO_INICIAL_PADRAO)
    }

    pub fn fator_adaptacao(&self) -> f64 {
        self.real(keys::FATOR_ADAPTACAO, FATOR_ADAPTACAO_PADRAO)
    }

    /// The adaptation window, when both bounds are configured.
    pub fn janela_adaptacao(&self) -> Option<(NaiveDate, NaiveDate)> {
        let inicio = self.date(keys::PERIODO_ADAPTACAO_INICIO)?;
        let fim = self.date(keys::PERIODO_ADAPTACAO_FIM)?;
        Some((inicio, fim))
    }

    /// Active for `d` iff both bounds are present and `inicio <= d <= fim`.
    pub fn em_adaptacao(&self, d: NaiveDate) -> bool {
        match self.janela_adaptacao() {
            Some((inicio, fim)) => inicio <= d && d <= fim,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Row;

    fn config_relation(pairs: &[(&str, &str)]) -> Relation {
        let mut relation = Relation::new(["chave", "valor"]);
        for (chave, valor) in pairs {
            let mut row = Row::new();
            row.insert("chave".to_string(), chave.to_string());
            row.insert("valor".to_string(), valor.to_string());
            relation.push(row);
        }
        relation
    }

    #[test]
    fn defaults_apply_when_keys_missing() {
        let params = Params::from_relation(&config_relation(&[]));
        assert_eq!(params.pontuacao_inicial(), 10.0);
        assert_eq!(params.fator_adaptacao(), 0.25);
        assert!(params.janela_adaptacao().is_none());
    }

    #[test]
    fn values_parse_with_decimal_comma() {
        let params = Params::from_relation(&config_relation(&[("fator_adaptacao", "0,5")]));
        assert_eq!(params.fator_adaptacao(), 0.5);
    }

    #[test]
    fn window_is_inclusive_on_both_ends() {
        let params = Params::from_relation(&config_relation(&[
            ("periodo_adaptacao_inicio", "2025-06-30"),
            ("periodo_adaptacao_fim", "2025-07-21"),
        ]));
        let d = |y, m, dd| NaiveDate::from_ymd_opt(y, m, dd).expect("valid date");
        assert!(params.em_adaptacao(d(2025, 6, 30)));
        assert!(params.em_adaptacao(d(2025, 7, 21)));
        assert!(!params.em_adaptacao(d(2025, 6, 29)));
        assert!(!params.em_adaptacao(d(2025, 7, 22)));
    }

    #[test]
    fn window_with_single_bound_is_never_active() {
        let params = Params::from_relation(&config_relation(&[(
            "periodo_adaptacao_inicio",
            "2025-06-30",
        )]));
        let d = NaiveDate::from_ymd_opt(2025, 7, 1).expect("valid date");
        assert!(!params.em_adaptacao(d));
    }

    #[test]
    fn first_duplicate_key_wins() {
        let params = Params::from_relation(&config_relation(&[
            ("pontuacao_inicial", "12"),
            ("pontuacao_inicial", "99"),
        ]));
        assert_eq!(params.pontuacao_inicial(), 12.0);
    }

    #[test]
    fn unknown_keys_are_carried_but_harmless() {
        let params =
            Params::from_relation(&config_relation(&[("chave_inexistente", "qualquer")]));
        assert_eq!(params.text("chave_inexistente", ""), "qualquer");
        assert_eq!(params.pontuacao_inicial(), 10.0);
    }
}
