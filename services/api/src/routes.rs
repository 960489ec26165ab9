use crate::infra::AppState;
use axum::extract::{Path, Query};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::NaiveDate;
use conduta::domain::{parse_rows, Acao, Aluno, RegistroTransporte, Soldo, TipoAcao};
use conduta::error::AppError;
use conduta::faia::{filtrar, FaiaTracker, FiltroAcoes};
use conduta::params::Params;
use conduta::permissoes;
use conduta::reports::planilha_conceitos;
use conduta::scoring::{avaliar_turma, AvaliacaoConceito, ScoringEngine};
use conduta::store::{tables, StoreError, TableStore};
use conduta::transporte::{calcular, CalculoTransporte};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ConceitosRequest {
    pub(crate) pelotao: Option<String>,
    /// `json` (default) or `csv`.
    #[serde(default)]
    pub(crate) formato: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ConceitosResponse {
    pub(crate) avaliacoes: Vec<AvaliacaoConceito>,
    pub(crate) acoes_sem_aluno: usize,
    pub(crate) acoes_sem_tipo: usize,
    pub(crate) acoes_sem_data: usize,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransporteRequest {
    pub(crate) numero_interno: String,
    /// Rank used to look up base pay; unresolvable ranks waive the
    /// beneficiary share.
    pub(crate) graduacao: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AcaoQueueEntry {
    pub(crate) id: String,
    pub(crate) aluno_id: String,
    pub(crate) numero_interno: Option<String>,
    pub(crate) nome_guerra: Option<String>,
    pub(crate) pelotao: Option<String>,
    pub(crate) tipo: String,
    pub(crate) descricao: String,
    pub(crate) data: Option<NaiveDate>,
    pub(crate) lancado_faia: bool,
}

pub(crate) fn router() -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/conceitos/relatorio",
            axum::routing::post(conceitos_endpoint),
        )
        .route(
            "/api/v1/transporte/calculo",
            axum::routing::post(transporte_endpoint),
        )
        .route("/api/v1/faia/acoes", axum::routing::get(faia_queue_endpoint))
        .route(
            "/api/v1/faia/:id/toggle",
            axum::routing::post(faia_toggle_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Everything the conceitos board needs, derived fresh from the store.
fn avaliar<S: TableStore>(store: &S) -> Result<ConceitosResponse, AppError> {
    let params = Params::from_relation(&store.load(tables::CONFIG)?);
    let alunos = parse_rows(&store.load(tables::ALUNOS)?, tables::ALUNOS, Aluno::from_row);
    let tipos = parse_rows(
        &store.load(tables::TIPOS_ACAO)?,
        tables::TIPOS_ACAO,
        TipoAcao::from_row,
    );
    let acoes = parse_rows(&store.load(tables::ACOES)?, tables::ACOES, Acao::from_row);

    let engine = ScoringEngine::new(tipos.items, params.clone());
    let saldos = engine.saldos(&acoes.items, &alunos.items);
    let avaliacoes = avaliar_turma(&alunos.items, &saldos.saldos, &params);

    Ok(ConceitosResponse {
        avaliacoes,
        acoes_sem_aluno: saldos.acoes_sem_aluno,
        acoes_sem_tipo: saldos.acoes_sem_tipo,
        acoes_sem_data: saldos.acoes_sem_data,
    })
}

pub(crate) async fn conceitos_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<ConceitosRequest>,
) -> Result<axum::response::Response, AppError> {
    let mut resposta = avaliar(state.store.as_ref())?;
    if let Some(pelotao) = &payload.pelotao {
        resposta
            .avaliacoes
            .retain(|a| a.pelotao.eq_ignore_ascii_case(pelotao));
    }

    if payload.formato.as_deref() == Some("csv") {
        let csv = planilha_conceitos(&resposta.avaliacoes, None)?;
        return Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            csv,
        )
            .into_response());
    }
    Ok(Json(resposta).into_response())
}

pub(crate) async fn transporte_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<TransporteRequest>,
) -> Result<Json<CalculoTransporte>, AppError> {
    let store = state.store.as_ref();
    let registros = parse_rows(
        &store.load(tables::TRANSPORTE)?,
        tables::TRANSPORTE,
        RegistroTransporte::from_row,
    );
    let registro = registros
        .items
        .iter()
        .find(|r| r.numero_interno.eq_ignore_ascii_case(&payload.numero_interno))
        .ok_or_else(|| StoreError::RowNotFound {
            table: tables::TRANSPORTE.to_string(),
            key: payload.numero_interno.clone(),
        })?;

    let soldo = match &payload.graduacao {
        Some(graduacao) => {
            let soldos = parse_rows(&store.load(tables::SOLDOS)?, tables::SOLDOS, Soldo::from_row);
            soldos
                .items
                .iter()
                .find(|s| s.graduacao.eq_ignore_ascii_case(graduacao))
                .map(|s| s.valor)
                .unwrap_or(0.0)
        }
        None => 0.0,
    };

    Ok(Json(calcular(registro, soldo)))
}

pub(crate) async fn faia_queue_endpoint(
    Extension(state): Extension<AppState>,
    Query(filtro): Query<FiltroAcoes>,
) -> Result<Json<Vec<AcaoQueueEntry>>, AppError> {
    let store = state.store.as_ref();
    let alunos = parse_rows(&store.load(tables::ALUNOS)?, tables::ALUNOS, Aluno::from_row);
    let acoes = parse_rows(&store.load(tables::ACOES)?, tables::ACOES, Acao::from_row);

    let selecionadas = filtrar(&acoes.items, &alunos.items, &filtro);
    let entries = selecionadas
        .into_iter()
        .map(|acao| {
            let aluno = alunos.items.iter().find(|a| a.id == acao.aluno_id);
            AcaoQueueEntry {
                id: acao.id.clone(),
                aluno_id: acao.aluno_id.clone(),
                numero_interno: aluno.map(|a| a.numero_interno.clone()),
                nome_guerra: aluno.map(|a| a.nome_guerra.clone()),
                pelotao: aluno.map(|a| a.pelotao.clone()),
                tipo: acao.tipo.clone(),
                descricao: acao.descricao.clone(),
                data: acao.data,
                lancado_faia: acao.lancado_faia,
            }
        })
        .collect();
    Ok(Json(entries))
}

/// Caller profile for feature gating, from the `x-perfil` header the
/// frontend proxy stamps. Absent header means an anonymous caller.
fn perfil_do_chamador(headers: &HeaderMap) -> &str {
    headers
        .get("x-perfil")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("anonimo")
}

pub(crate) async fn faia_toggle_endpoint(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    permissoes::exigir(
        state.store.as_ref(),
        "lancar_faia",
        perfil_do_chamador(&headers),
    )?;
    let tracker = FaiaTracker::new(state.store.as_ref());
    let lancado = tracker.alternar(&id)?;
    Ok(Json(json!({ "id": id, "lancado_faia": lancado })))
}
