//! Action scoring engine: turns the stream of dated, typed behavioral
//! events into per-subject conduct balances. Stored score snapshots on
//! the rows are ignored; every value is re-derived from the current
//! type table and configuration so retroactive config edits stay
//! consistent.

pub mod conceito;
mod rules;

pub use conceito::{avaliar_turma, classificacao_prevista, AvaliacaoConceito};
pub use rules::{AcaoPontuada, ScoreFlag};

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::domain::{Acao, Aluno, TipoAcao};
use crate::params::Params;

/// Stateless scorer over a type table and resolved configuration.
pub struct ScoringEngine {
    tipos: HashMap<String, TipoAcao>,
    params: Params,
}

/// Per-subject balances plus the defects encountered while summing.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SaldoTurma {
    /// `aluno_id` → conduct balance.
    pub saldos: BTreeMap<String, f64>,
    /// Actions pointing at a subject absent from the roster.
    pub acoes_sem_aluno: usize,
    /// Actions whose type no longer exists (scored as zero, retained).
    pub acoes_sem_tipo: usize,
    /// Actions excluded from balances because the date would not parse.
    pub acoes_sem_data: usize,
}

impl ScoringEngine {
    pub fn new(tipos: Vec<TipoAcao>, params: Params) -> Self {
        let tipos = tipos.into_iter().map(|t| (t.id.clone(), t)).collect();
        Self { tipos, params }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Scores one action against the current configuration.
    pub fn pontuar(&self, acao: &Acao) -> AcaoPontuada {
        rules::pontuar(acao, &self.tipos, &self.params)
    }

    /// Balance per subject: `pontuacao_inicial + Σ effective`, summing
    /// only actions with a valid date and a rostered subject.
    pub fn saldos(&self, acoes: &[Acao], alunos: &[Aluno]) -> SaldoTurma {
        let inicial = self.params.pontuacao_inicial();
        let rostered: HashSet<&str> = alunos.iter().map(|a| a.id.as_str()).collect();

        let mut resultado = SaldoTurma::default();
        for aluno in alunos {
            resultado.saldos.insert(aluno.id.clone(), inicial);
        }

        for acao in acoes {
            let pontuada = self.pontuar(acao);
            if pontuada.flags.contains(&ScoreFlag::TipoOrfao) {
                resultado.acoes_sem_tipo += 1;
            }
            if pontuada.flags.contains(&ScoreFlag::DataInvalida) {
                resultado.acoes_sem_data += 1;
                continue;
            }
            if !rostered.contains(acao.aluno_id.as_str()) {
                resultado.acoes_sem_aluno += 1;
                continue;
            }
            if let Some(saldo) = resultado.saldos.get_mut(&acao.aluno_id) {
                *saldo += pontuada.efetiva;
            }
        }

        resultado
    }
}
