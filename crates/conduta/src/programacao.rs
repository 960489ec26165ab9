//! Daily-schedule maintenance: the auto-closer that transitions
//! routine entries from "A Realizar" to "Concluído" once their time
//! has passed. Only descriptions in the automation allow-list are
//! touched; anything else waits for a human.

use chrono::{NaiveDateTime, NaiveTime};
use tracing::info;

use crate::domain::{
    parse_rows, to_iso, Programacao, StatusProgramacao,
};
use crate::store::{field, tables, StoreError, TableStore};

/// Recurring entries safe to close automatically.
pub const DESCRICOES_AUTOMATICAS: &[&str] = &[
    "alvorada",
    "café da manhã",
    "rancho - almoço",
    "rancho - jantar",
    "formatura matinal",
    "revista do recolher",
    "silêncio",
];

/// Actor recorded on automatically closed entries.
pub const OPERADOR_AUTOMATICO: &str = "rotina automática";

fn descricao_automatica(descricao: &str) -> bool {
    let normalizada = descricao.trim().to_lowercase();
    DESCRICOES_AUTOMATICAS.iter().any(|d| *d == normalizada)
}

/// An entry with no time closes at end of day, not at midnight, so a
/// same-day run does not close evening events early.
fn momento(entrada: &Programacao) -> Option<NaiveDateTime> {
    let data = entrada.data?;
    let hora = entrada
        .hora
        .unwrap_or_else(|| NaiveTime::from_hms_opt(23, 59, 59).expect("valid time"));
    Some(data.and_time(hora))
}

/// Pure transition decision for one entry.
pub fn deve_fechar(entrada: &Programacao, agora: NaiveDateTime) -> bool {
    entrada.status == StatusProgramacao::ARealizar
        && descricao_automatica(&entrada.descricao)
        && momento(entrada).is_some_and(|m| m <= agora)
}

/// Runs the closer against the store: loads the schedule, closes every
/// eligible entry, writes the table back once. Returns the ids of the
/// transitioned entries; an empty schedule is a successful no-op.
pub fn fechar_pendentes<S: TableStore>(
    store: &S,
    agora: NaiveDateTime,
) -> Result<Vec<String>, StoreError> {
    let mut relation = store.load(tables::PROGRAMACAO)?;
    let parsed = parse_rows(&relation, tables::PROGRAMACAO, Programacao::from_row);

    let mut fechados = Vec::new();
    for entrada in &parsed.items {
        if !deve_fechar(entrada, agora) {
            continue;
        }
        let Some(row) = relation.find_mut("id", &entrada.id) else {
            continue;
        };
        row.insert(
            "status".to_string(),
            StatusProgramacao::Concluido.label().to_string(),
        );
        row.insert("concluido_por".to_string(), OPERADOR_AUTOMATICO.to_string());
        row.insert("data_conclusao".to_string(), to_iso(agora.date()));
        info!(
            id = %entrada.id,
            descricao = %entrada.descricao,
            data = %field(row, "data"),
            "schedule entry closed automatically"
        );
        fechados.push(entrada.id.clone());
    }

    if !fechados.is_empty() {
        store.save(tables::PROGRAMACAO, &relation)?;
    }
    Ok(fechados)
}
