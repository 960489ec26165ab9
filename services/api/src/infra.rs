use chrono::{NaiveDate, NaiveDateTime};
use conduta::domain::parse_flexible_date;
use conduta::store::{CachedStore, MemoryStore, Relation, Row};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

pub(crate) type SharedStore = CachedStore<MemoryStore>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) store: Arc<SharedStore>,
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    parse_flexible_date(raw).ok_or_else(|| format!("failed to parse '{raw}' as a date"))
}

pub(crate) fn parse_datetime(raw: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%dT%H:%M:%S")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DDTHH:MM:SS ({err})"))
}

fn row(pairs: &[(&str, &str)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Seeds the process-local store with a small but complete company:
/// roster, action types, recorded actions, configuration, schedule,
/// pay table, and one transport registration.
pub(crate) fn seeded_store(cache_ttl: Duration) -> Arc<SharedStore> {
    let store = MemoryStore::new();

    let mut config = Relation::new(["chave", "valor"]);
    for (chave, valor) in [
        ("pontuacao_inicial", "10"),
        ("fator_adaptacao", "0.25"),
        ("periodo_adaptacao_inicio", "2025-06-30"),
        ("periodo_adaptacao_fim", "2025-07-21"),
        ("conceito_referencia", "8"),
        ("fator_conceito_pontos", "0.2"),
        ("fator_conceito_media", "0.1"),
    ] {
        config.push(row(&[("chave", chave), ("valor", valor)]));
    }
    store.seed(conduta::store::tables::CONFIG, config);

    let mut alunos = Relation::new([
        "id",
        "numero_interno",
        "nome_guerra",
        "nome_completo",
        "pelotao",
        "media_academica",
    ]);
    for (id, numero, guerra, completo, pelotao, media) in [
        ("a1", "M-1", "SILVA", "João Silva", "1º Pelotão", "8.2"),
        ("a2", "M-2", "SOUZA", "Pedro Souza", "1º Pelotão", "7.4"),
        ("a3", "M-10", "LIMA", "Carlos Lima", "2º Pelotão", "9.0"),
        ("a4", "Q-1", "ROCHA", "Ana Rocha", "2º Pelotão", "8.8"),
        ("a5", "M-3", "PRATA", "José Prata", "BAIXA", "6.0"),
    ] {
        alunos.push(row(&[
            ("id", id),
            ("numero_interno", numero),
            ("nome_guerra", guerra),
            ("nome_completo", completo),
            ("pelotao", pelotao),
            ("media_academica", media),
        ]));
    }
    store.seed(conduta::store::tables::ALUNOS, alunos);

    let mut tipos = Relation::new(["id", "nome", "codigo", "pontuacao"]);
    for (id, nome, codigo, pontuacao) in [
        ("t1", "Elogio individual", "E1", "4"),
        ("t2", "Atraso em formatura", "A1", "-2"),
        ("t3", "Registro neutro", "N1", "0"),
    ] {
        tipos.push(row(&[
            ("id", id),
            ("nome", nome),
            ("codigo", codigo),
            ("pontuacao", pontuacao),
        ]));
    }
    store.seed(conduta::store::tables::TIPOS_ACAO, tipos);

    let mut acoes = Relation::new([
        "id",
        "aluno_id",
        "tipo_acao_id",
        "tipo",
        "descricao",
        "data",
        "usuario",
        "lancado_faia",
    ]);
    for (id, aluno_id, tipo_id, tipo, descricao, data, lancado) in [
        ("x1", "a1", "t1", "Elogio individual", "Destaque na instrução", "2025-07-05", "false"),
        ("x2", "a1", "t2", "Atraso em formatura", "Atraso de 5 minutos", "2025-07-10", "true"),
        ("x3", "a1", "t1", "Elogio individual", "Apoio ao rancho", "2025-08-01", "false"),
        ("x4", "a2", "t2", "Atraso em formatura", "Atraso na alvorada", "2025-08-02", "false"),
        ("x5", "a3", "t1", "Elogio individual", "Monitor de educação física", "2025-08-03", "false"),
    ] {
        acoes.push(row(&[
            ("id", id),
            ("aluno_id", aluno_id),
            ("tipo_acao_id", tipo_id),
            ("tipo", tipo),
            ("descricao", descricao),
            ("data", data),
            ("usuario", "sgte"),
            ("lancado_faia", lancado),
        ]));
    }
    store.seed(conduta::store::tables::ACOES, acoes);

    let mut programacao = Relation::new(["id", "data", "hora", "descricao", "status"]);
    for (id, data, hora, descricao) in [
        ("p1", "2025-08-29", "06:00", "Alvorada"),
        ("p2", "2025-08-29", "08:00", "Instrução de Ordem Unida"),
        ("p3", "2025-08-29", "22:00", "Revista do Recolher"),
    ] {
        programacao.push(row(&[
            ("id", id),
            ("data", data),
            ("hora", hora),
            ("descricao", descricao),
            ("status", "A Realizar"),
        ]));
    }
    store.seed(conduta::store::tables::PROGRAMACAO, programacao);

    let mut soldos = Relation::new(["graduacao", "valor"]);
    soldos.push(row(&[("graduacao", "Soldado"), ("valor", "R$ 1.765,00")]));
    soldos.push(row(&[("graduacao", "Cabo"), ("valor", "R$ 3.000,00")]));
    store.seed(conduta::store::tables::SOLDOS, soldos);

    let mut transporte = Relation::new(["id", "numero_interno", "ano_referencia", "dias_uteis"]);
    transporte.push(row(&[
        ("id", "tr1"),
        ("numero_interno", "M-1"),
        ("ano_referencia", "2025"),
        ("dias_uteis", "22"),
        ("ida_1_empresa", "VIACAO X"),
        ("ida_1_linha", "101"),
        ("ida_1_tarifa", "4,50"),
        ("ida_2_empresa", "VIACAO Y"),
        ("ida_2_linha", "202"),
        ("ida_2_tarifa", "3,00"),
        ("volta_1_empresa", "VIACAO X"),
        ("volta_1_linha", "102"),
        ("volta_1_tarifa", "4,50"),
        ("volta_2_empresa", "VIACAO Y"),
        ("volta_2_linha", "203"),
        ("volta_2_tarifa", "3,00"),
    ]));
    store.seed(conduta::store::tables::TRANSPORTE, transporte);

    let mut pernoite = Relation::new(["id", "aluno_id", "data", "presente"]);
    for (id, aluno_id) in [("n1", "a1"), ("n2", "a4")] {
        pernoite.push(row(&[
            ("id", id),
            ("aluno_id", aluno_id),
            ("data", "2025-08-29"),
            ("presente", "true"),
        ]));
    }
    store.seed(conduta::store::tables::PERNOITE, pernoite);

    Arc::new(CachedStore::new(store, cache_ttl))
}
