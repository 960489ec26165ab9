//! FAIA launch tracker: which actions have already been transcribed
//! into each subject's paper logbook. Filtering feeds the launch queue
//! screens; the toggle persists immediately through the store.

mod report;

pub use report::{relatorio_aluno, zip_pelotao, FaiaReportError};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{parse_bool, Acao, Aluno};
use crate::store::{field, tables, StoreError, TableStore};

/// Launch-status filter over the action queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FiltroLancamento {
    ALancar,
    Lancados,
    Todos,
}

impl FiltroLancamento {
    pub const fn label(self) -> &'static str {
        match self {
            FiltroLancamento::ALancar => "A Lançar",
            FiltroLancamento::Lancados => "Lançados",
            FiltroLancamento::Todos => "Todos",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "a lançar" | "a lancar" => FiltroLancamento::ALancar,
            "lançados" | "lancados" => FiltroLancamento::Lancados,
            _ => FiltroLancamento::Todos,
        }
    }

    fn aceita(self, lancado: bool) -> bool {
        match self {
            FiltroLancamento::ALancar => !lancado,
            FiltroLancamento::Lancados => lancado,
            FiltroLancamento::Todos => true,
        }
    }
}

/// Composite filter for the launch queue.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FiltroAcoes {
    #[serde(default = "FiltroAcoes::status_padrao")]
    pub status: FiltroLancamento,
    pub pelotao: Option<String>,
    /// Substring match over nome de guerra, case-insensitive.
    pub nome: Option<String>,
    pub aluno_id: Option<String>,
}

impl FiltroAcoes {
    fn status_padrao() -> FiltroLancamento {
        FiltroLancamento::Todos
    }
}

impl Default for FiltroLancamento {
    fn default() -> Self {
        FiltroLancamento::Todos
    }
}

/// Applies the composite filter. Actions whose subject is unknown only
/// survive the status filter when no subject-dependent criterion is
/// set; they have no platoon or name to match against.
pub fn filtrar<'a>(
    acoes: &'a [Acao],
    alunos: &[Aluno],
    filtro: &FiltroAcoes,
) -> Vec<&'a Acao> {
    let por_id: HashMap<&str, &Aluno> = alunos.iter().map(|a| (a.id.as_str(), a)).collect();
    let nome_busca = filtro.nome.as_deref().map(str::to_lowercase);

    acoes
        .iter()
        .filter(|acao| filtro.status.aceita(acao.lancado_faia))
        .filter(|acao| {
            if let Some(aluno_id) = &filtro.aluno_id {
                if &acao.aluno_id != aluno_id {
                    return false;
                }
            }
            let aluno = por_id.get(acao.aluno_id.as_str());
            if let Some(pelotao) = &filtro.pelotao {
                match aluno {
                    Some(a) if a.pelotao.eq_ignore_ascii_case(pelotao) => {}
                    _ => return false,
                }
            }
            if let Some(busca) = &nome_busca {
                match aluno {
                    Some(a) if a.nome_guerra.to_lowercase().contains(busca) => {}
                    _ => return false,
                }
            }
            true
        })
        .collect()
}

/// Persists launch marks through the store.
pub struct FaiaTracker<'a, S: TableStore> {
    store: &'a S,
}

impl<'a, S: TableStore> FaiaTracker<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Sets `lancado_faia` on one action. Setting the current value is
    /// a no-op at the store level: no write, no error, no other column
    /// touched.
    pub fn marcar(&self, acao_id: &str, lancado: bool) -> Result<(), StoreError> {
        let relation = self.store.load(tables::ACOES)?;
        let row = relation
            .find("id", acao_id)
            .ok_or_else(|| StoreError::RowNotFound {
                table: tables::ACOES.to_string(),
                key: acao_id.to_string(),
            })?;

        if parse_bool(field(row, "lancado_faia")) == lancado {
            return Ok(());
        }

        let mut atualizado = row.clone();
        atualizado.insert(
            "lancado_faia".to_string(),
            if lancado { "true" } else { "false" }.to_string(),
        );
        self.store.upsert(tables::ACOES, atualizado)?;
        info!(acao_id, lancado, "launch mark updated");
        Ok(())
    }

    /// Flips the current mark and returns the new value.
    pub fn alternar(&self, acao_id: &str) -> Result<bool, StoreError> {
        let relation = self.store.load(tables::ACOES)?;
        let row = relation
            .find("id", acao_id)
            .ok_or_else(|| StoreError::RowNotFound {
                table: tables::ACOES.to_string(),
                key: acao_id.to_string(),
            })?;
        let novo = !parse_bool(field(row, "lancado_faia"));
        self.marcar(acao_id, novo)?;
        Ok(novo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, Relation, Row};

    fn aluno(id: &str, pelotao: &str, nome_guerra: &str) -> Aluno {
        Aluno {
            id: id.to_string(),
            numero_interno: format!("M-{id}"),
            nome_guerra: nome_guerra.to_string(),
            nome_completo: String::new(),
            pelotao: pelotao.to_string(),
            especialidade: String::new(),
            data_nascimento: None,
            media_academica: 0.0,
            foto: None,
        }
    }

    fn acao(id: &str, aluno_id: &str, lancado: bool) -> Acao {
        Acao {
            id: id.to_string(),
            aluno_id: aluno_id.to_string(),
            tipo_acao_id: "t1".to_string(),
            tipo: "Elogio".to_string(),
            descricao: String::new(),
            data: None,
            data_bruta: String::new(),
            usuario: String::new(),
            lancado_faia: lancado,
        }
    }

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn a_lancar_excludes_every_truthy_mark() {
        let acoes = vec![acao("1", "a", false), acao("2", "a", true)];
        let alunos = vec![aluno("a", "1", "SILVA")];
        let filtro = FiltroAcoes {
            status: FiltroLancamento::ALancar,
            ..Default::default()
        };
        let restantes = filtrar(&acoes, &alunos, &filtro);
        assert_eq!(restantes.len(), 1);
        assert_eq!(restantes[0].id, "1");
    }

    #[test]
    fn status_parse_accepts_accented_and_plain_forms() {
        assert_eq!(FiltroLancamento::parse("A Lançar"), FiltroLancamento::ALancar);
        assert_eq!(FiltroLancamento::parse("a lancar"), FiltroLancamento::ALancar);
        assert_eq!(FiltroLancamento::parse("Lançados"), FiltroLancamento::Lancados);
        assert_eq!(FiltroLancamento::parse("qualquer"), FiltroLancamento::Todos);
    }

    #[test]
    fn platoon_and_name_filters_compose() {
        let acoes = vec![acao("1", "a", false), acao("2", "b", false)];
        let alunos = vec![aluno("a", "1", "SILVA"), aluno("b", "2", "SOUZA")];
        let filtro = FiltroAcoes {
            status: FiltroLancamento::Todos,
            pelotao: Some("2".to_string()),
            nome: Some("sou".to_string()),
            aluno_id: None,
        };
        let restantes = filtrar(&acoes, &alunos, &filtro);
        assert_eq!(restantes.len(), 1);
        assert_eq!(restantes[0].aluno_id, "b");
    }

    #[test]
    fn orphan_actions_fail_subject_dependent_filters() {
        let acoes = vec![acao("1", "fantasma", false)];
        let alunos = vec![aluno("a", "1", "SILVA")];
        let com_pelotao = FiltroAcoes {
            pelotao: Some("1".to_string()),
            ..Default::default()
        };
        assert!(filtrar(&acoes, &alunos, &com_pelotao).is_empty());
        let sem_criterios = FiltroAcoes::default();
        assert_eq!(filtrar(&acoes, &alunos, &sem_criterios).len(), 1);
    }

    fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        let mut relation = Relation::new(["id", "aluno_id", "lancado_faia", "descricao"]);
        relation.push(row(&[
            ("id", "x1"),
            ("aluno_id", "a"),
            ("lancado_faia", "false"),
            ("descricao", "atraso"),
        ]));
        store.seed(tables::ACOES, relation);
        store
    }

    #[test]
    fn marcar_persists_only_the_launch_column() {
        let store = seeded_store();
        FaiaTracker::new(&store).marcar("x1", true).expect("marks");
        let relation = store.load(tables::ACOES).expect("load");
        let row = relation.find("id", "x1").expect("row kept");
        assert_eq!(field(row, "lancado_faia"), "true");
        assert_eq!(field(row, "descricao"), "atraso");
    }

    #[test]
    fn marcar_same_value_is_a_noop() {
        let store = seeded_store();
        let antes = store.load(tables::ACOES).expect("load");
        FaiaTracker::new(&store).marcar("x1", false).expect("no-op");
        let depois = store.load(tables::ACOES).expect("load");
        assert_eq!(antes, depois);
    }

    #[test]
    fn alternar_flips_and_reports_new_value() {
        let store = seeded_store();
        let tracker = FaiaTracker::new(&store);
        assert!(tracker.alternar("x1").expect("first flip"));
        assert!(!tracker.alternar("x1").expect("second flip"));
    }

    #[test]
    fn unknown_action_reports_row_not_found() {
        let store = seeded_store();
        let error = FaiaTracker::new(&store)
            .marcar("ghost", true)
            .expect_err("missing row");
        assert!(matches!(error, StoreError::RowNotFound { .. }));
    }
}
