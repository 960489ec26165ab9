//! Report exporters: the conceitos spreadsheet, the overnight-stay
//! roster PDF, and the FAIA archive.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{ordenar_por_numero_interno, Aluno, Pernoite};
use crate::params::{keys, Params};
use crate::pdf::grid::{gerar, PaginaGrade, SecaoGrade};
use crate::pdf::{concatenar, PdfError};
use crate::scoring::conceito::AvaliacaoConceito;

pub use crate::faia::zip_pelotao;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("could not write spreadsheet: {0}")]
    Csv(#[from] csv::Error),
    #[error("could not flush report: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Pdf(#[from] PdfError),
    #[error("no overnight-stay subjects marked for {0}")]
    SemMarcados(NaiveDate),
}

/// Conceitos spreadsheet, one row per evaluated subject, in the
/// evaluator's order. `pelotao` narrows to a single platoon.
pub fn planilha_conceitos(
    avaliacoes: &[AvaliacaoConceito],
    pelotao: Option<&str>,
) -> Result<Vec<u8>, ReportError> {
    let mut buffer = Vec::new();
    {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b';')
            .from_writer(&mut buffer);
        writer.write_record([
            "Nº Interno",
            "Nome de Guerra",
            "Pelotão",
            "Saldo de Pontos",
            "Média Acadêmica",
            "Conceito Final",
            "Classificação Prevista",
        ])?;

        for avaliacao in avaliacoes {
            if let Some(pelotao) = pelotao {
                if !avaliacao.pelotao.eq_ignore_ascii_case(pelotao) {
                    continue;
                }
            }
            writer.write_record([
                avaliacao.numero_interno.as_str(),
                avaliacao.nome_guerra.as_str(),
                avaliacao.pelotao.as_str(),
                &format!("{:.2}", avaliacao.saldo_pontos),
                &format!("{:.2}", avaliacao.media_academica),
                &format!("{:.2}", avaliacao.conceito_final),
                &format!("{:.2}", avaliacao.classificacao_prevista),
            ])?;
        }
        writer.flush()?;
    }
    Ok(buffer)
}

fn secoes_por_pelotao(marcados: &[&Aluno]) -> Vec<SecaoGrade> {
    let mut por_pelotao: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for aluno in marcados {
        por_pelotao
            .entry(aluno.pelotao.clone())
            .or_default()
            .push(aluno.numero_interno.clone());
    }
    por_pelotao
        .into_iter()
        .map(|(rotulo, mut numeros)| {
            ordenar_por_numero_interno(&mut numeros, |n| n.as_str());
            SecaoGrade { rotulo, numeros }
        })
        .collect()
}

/// Overnight-stay roster for one date: subjects marked present are
/// split by internal-number prefix into the CAP grid (`M-`, and
/// anything unclassified) and the QTPA grid (`Q-`).
pub fn pernoite_pdf(
    alunos: &[Aluno],
    pernoites: &[Pernoite],
    data: NaiveDate,
    params: &Params,
) -> Result<Vec<u8>, ReportError> {
    let por_id: BTreeMap<&str, &Aluno> = alunos
        .iter()
        .filter(|a| !a.baixado())
        .map(|a| (a.id.as_str(), a))
        .collect();

    let mut cap: Vec<&Aluno> = Vec::new();
    let mut qtpa: Vec<&Aluno> = Vec::new();
    for pernoite in pernoites {
        if !pernoite.presente || pernoite.data != Some(data) {
            continue;
        }
        let Some(aluno) = por_id.get(pernoite.aluno_id.as_str()) else {
            continue;
        };
        let prefixo = aluno
            .numero_interno
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase());
        if prefixo == Some('Q') {
            qtpa.push(aluno);
        } else {
            cap.push(aluno);
        }
    }
    if cap.is_empty() && qtpa.is_empty() {
        return Err(ReportError::SemMarcados(data));
    }

    let titulo = format!(
        "{} - {}",
        params.text(keys::PERNOITE_CABECALHO, "PERNOITE"),
        data.format("%d/%m/%Y")
    );
    let rodape = params.text(keys::PERNOITE_RODAPE, "");

    let mut documentos = Vec::new();
    for (marcados, legenda_chave, legenda_padrao) in [
        (&cap, keys::PERNOITE_LEGENDA_CAP, "CAP"),
        (&qtpa, keys::PERNOITE_LEGENDA_QTPA, "QTPA"),
    ] {
        if marcados.is_empty() {
            continue;
        }
        let pagina = PaginaGrade {
            titulo: titulo.clone(),
            rodape: rodape.clone(),
            legenda_lateral: params.text(legenda_chave, legenda_padrao),
            secoes: secoes_por_pelotao(marcados),
        };
        documentos.push(gerar(&pagina)?);
    }

    let mut saida = concatenar(documentos)?;
    let mut bytes = Vec::new();
    saida.save_to(&mut bytes).map_err(PdfError::from)?;
    Ok(bytes)
}
