use std::io::Read;
use std::time::Duration;

use conduta::domain::{parse_rows, Acao, Aluno};
use conduta::faia::{filtrar, zip_pelotao, FaiaTracker, FiltroAcoes, FiltroLancamento};
use conduta::store::{tables, CachedStore, MemoryStore, Relation, Row, TableStore};

fn row(pairs: &[(&str, &str)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();

    let mut alunos = Relation::new([
        "id",
        "numero_interno",
        "nome_guerra",
        "nome_completo",
        "pelotao",
    ]);
    for (id, numero, guerra, completo, pelotao) in [
        ("a1", "M-2", "SOUZA", "João de Souza", "1º Pelotão"),
        ("a2", "M-1", "SILVA", "Maria da Silva", "1º Pelotão"),
        ("a3", "Q-1", "ROCHA", "Pedro Rocha", "2º Pelotão"),
        ("a4", "M-9", "PRATA", "Ana Prata", "BAIXA"),
    ] {
        alunos.push(row(&[
            ("id", id),
            ("numero_interno", numero),
            ("nome_guerra", guerra),
            ("nome_completo", completo),
            ("pelotao", pelotao),
        ]));
    }
    store.seed(tables::ALUNOS, alunos);

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
    for (id, aluno_id, tipo, descricao, data, lancado) in [
        ("x1", "a2", "Elogio", "destaque na instrução", "2025-07-01", "false"),
        ("x2", "a2", "Atraso", "atraso na revista", "05/08/2025", "true"),
        ("x3", "a1", "Elogio", "apoio ao rancho", "2025-08-02", "false"),
        ("x4", "a4", "Atraso", "registro antigo", "2025-06-01", "false"),
    ] {
        acoes.push(row(&[
            ("id", id),
            ("aluno_id", aluno_id),
            ("tipo_acao_id", "t1"),
            ("tipo", tipo),
            ("descricao", descricao),
            ("data", data),
            ("usuario", "sgt costa"),
            ("lancado_faia", lancado),
        ]));
    }
    store.seed(tables::ACOES, acoes);

    store
}

fn carregar(store: &impl TableStore) -> (Vec<Aluno>, Vec<Acao>) {
    let alunos = parse_rows(
        &store.load(tables::ALUNOS).expect("alunos load"),
        tables::ALUNOS,
        Aluno::from_row,
    );
    let acoes = parse_rows(
        &store.load(tables::ACOES).expect("acoes load"),
        tables::ACOES,
        Acao::from_row,
    );
    (alunos.items, acoes.items)
}

#[test]
fn platoon_bundle_orders_entries_and_skips_discharged() {
    let store = seeded_store();
    let (alunos, acoes) = carregar(&store);

    let bytes = zip_pelotao(&alunos, &acoes, "1º pelotão").expect("bundle builds");
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).expect("valid zip");

    let nomes: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).expect("entry").name().to_string())
        .collect();
    assert_eq!(nomes, vec!["M-1 - SILVA.txt", "M-2 - SOUZA.txt"]);

    let mut texto = String::new();
    archive
        .by_name("M-1 - SILVA.txt")
        .expect("subject report")
        .read_to_string(&mut texto)
        .expect("utf-8 body");
    assert!(texto.starts_with("FOLHA DE ALTERAÇÕES - FAIA"));
    assert!(texto.contains("Nome Completo: Maria da Silva"));
    let elogio = texto.find("2025-07-01").expect("first action");
    let atraso = texto.find("2025-08-05").expect("flexible date normalized");
    assert!(elogio < atraso, "chronological order inside the report");
    assert!(texto.contains("Registrado por: sgt costa"));
}

#[test]
fn toggled_action_leaves_the_launch_queue() {
    let store = CachedStore::new(seeded_store(), Duration::from_secs(60));
    let tracker = FaiaTracker::new(&store);

    let fila = |store: &CachedStore<MemoryStore>| -> Vec<String> {
        let (alunos, acoes) = carregar(store);
        let filtro = FiltroAcoes {
            status: FiltroLancamento::ALancar,
            ..Default::default()
        };
        filtrar(&acoes, &alunos, &filtro)
            .iter()
            .map(|a| a.id.clone())
            .collect()
    };

    assert_eq!(fila(&store), vec!["x1", "x3", "x4"]);

    assert!(tracker.alternar("x1").expect("flips on"));
    // The cached view must see the write immediately.
    assert_eq!(fila(&store), vec!["x3", "x4"]);

    assert!(!tracker.alternar("x1").expect("flips back"));
    assert_eq!(fila(&store), vec!["x1", "x3", "x4"]);
}

#[test]
fn launched_queue_composes_with_platoon_filter() {
    let store = seeded_store();
    let (alunos, acoes) = carregar(&store);

    let filtro = FiltroAcoes {
        status: FiltroLancamento::Lancados,
        pelotao: Some("1º Pelotão".to_string()),
        ..Default::default()
    };
    let lancados = filtrar(&acoes, &alunos, &filtro);
    assert_eq!(lancados.len(), 1);
    assert_eq!(lancados[0].id, "x2");
}
