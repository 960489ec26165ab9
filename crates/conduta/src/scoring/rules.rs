use std::collections::HashMap;

use serde::Serialize;

use crate::domain::{Acao, TipoAcao};
use crate::params::Params;

/// Defects detected while scoring a single action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFlag {
    /// The referenced action type no longer exists; base treated as 0,
    /// the action itself is retained.
    TipoOrfao,
    /// The stored date would not parse; the action is excluded from
    /// balances.
    DataInvalida,
}

/// One action scored against the current type table and configuration.
#[derive(Debug, Clone, Serialize)]
pub struct AcaoPontuada {
    pub acao_id: String,
    pub aluno_id: String,
    pub base: f64,
    pub efetiva: f64,
    pub em_adaptacao: bool,
    pub flags: Vec<ScoreFlag>,
}

/// Applies the base score and the adaptation multiplier. The multiplier
/// scales every nonzero base of either sign, exactly once; snapshots on
/// the row are never consulted.
pub(super) fn pontuar(
    acao: &Acao,
    tipos: &HashMap<String, TipoAcao>,
    params: &Params,
) -> AcaoPontuada {
    let mut flags = Vec::new();

    let base = match tipos.get(&acao.tipo_acao_id) {
        Some(tipo) => tipo.pontuacao,
        None => {
            flags.push(ScoreFlag::TipoOrfao);
            0.0
        }
    };

    let (efetiva, em_adaptacao) = match acao.data {
        Some(data) if params.em_adaptacao(data) => (base * params.fator_adaptacao(), true),
        Some(_) => (base, false),
        None => {
            flags.push(ScoreFlag::DataInvalida);
            (base, false)
        }
    };

    AcaoPontuada {
        acao_id: acao.id.clone(),
        aluno_id: acao.aluno_id.clone(),
        base,
        efetiva,
        em_adaptacao,
        flags,
    }
}
