//! Conceito and forecast-ranking evaluator. The concept curve maps the
//! accumulated conduct balance and the academic average onto a bounded
//! [0, 10] concept value; its coefficients live in the `Config` table so
//! the shape can be re-fit without code changes.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{ordenar_por_numero_interno, Aluno};
use crate::params::{
    keys, Params, CONCEITO_REFERENCIA_PADRAO, FATOR_CONCEITO_MEDIA_PADRAO,
    FATOR_CONCEITO_PONTOS_PADRAO,
};

pub const CONCEITO_MIN: f64 = 0.0;
pub const CONCEITO_MAX: f64 = 10.0;

/// Derived per-subject evaluation, ready for display or export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvaliacaoConceito {
    pub aluno_id: String,
    pub numero_interno: String,
    pub nome_guerra: String,
    pub pelotao: String,
    pub saldo_pontos: f64,
    pub media_academica: f64,
    pub conceito_final: f64,
    pub classificacao_prevista: f64,
}

/// `(3·média + 2·conceito) / 5`; ordering by this value gives the
/// forecast ranking.
pub fn classificacao_prevista(media_academica: f64, conceito_final: f64) -> f64 {
    (media_academica * 3.0 + conceito_final * 2.0) / 5.0
}

fn conceito_final(
    saldo: f64,
    media: f64,
    media_da_turma: f64,
    params: &Params,
) -> f64 {
    let referencia = params.real(keys::CONCEITO_REFERENCIA, CONCEITO_REFERENCIA_PADRAO);
    let fator_pontos = params.real(keys::FATOR_CONCEITO_PONTOS, FATOR_CONCEITO_PONTOS_PADRAO);
    let fator_media = params.real(keys::FATOR_CONCEITO_MEDIA, FATOR_CONCEITO_MEDIA_PADRAO);

    let bruto = referencia
        + fator_pontos * (saldo - params.pontuacao_inicial())
        + fator_media * (media - media_da_turma);
    bruto.clamp(CONCEITO_MIN, CONCEITO_MAX)
}

/// Evaluates the whole cohort. Subjects in the BAIXA platoon are
/// dropped before any cohort statistic is computed, so discharging a
/// subject never moves anyone else's concept. Output is ordered for
/// display by parsed `numero_interno`.
pub fn avaliar_turma(
    alunos: &[Aluno],
    saldos: &BTreeMap<String, f64>,
    params: &Params,
) -> Vec<AvaliacaoConceito> {
    let ativos: Vec<&Aluno> = alunos.iter().filter(|a| !a.baixado()).collect();
    if ativos.is_empty() {
        return Vec::new();
    }

    let media_da_turma =
        ativos.iter().map(|a| a.media_academica).sum::<f64>() / ativos.len() as f64;
    let inicial = params.pontuacao_inicial();

    let mut avaliacoes: Vec<AvaliacaoConceito> = ativos
        .into_iter()
        .map(|aluno| {
            let saldo = saldos.get(&aluno.id).copied().unwrap_or(inicial);
            let conceito = conceito_final(saldo, aluno.media_academica, media_da_turma, params);
            AvaliacaoConceito {
                aluno_id: aluno.id.clone(),
                numero_interno: aluno.numero_interno.clone(),
                nome_guerra: aluno.nome_guerra.clone(),
                pelotao: aluno.pelotao.clone(),
                saldo_pontos: saldo,
                media_academica: aluno.media_academica,
                conceito_final: conceito,
                classificacao_prevista: classificacao_prevista(
                    aluno.media_academica,
                    conceito,
                ),
            }
        })
        .collect();

    ordenar_por_numero_interno(&mut avaliacoes, |a| &a.numero_interno);
    avaliacoes
}
