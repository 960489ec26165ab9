//! Peer-review sheet intake. The form export is a wide sheet: one row
//! per respondent, one column per rated colleague. Review columns are
//! discovered by the literal `Avalie os integrantes` plus the rated
//! subject's nome de guerra inside square brackets; the sheet also
//! carries a self-evaluation column and the respondent's platoon.

use std::collections::BTreeMap;
use std::io::Read;

use serde::Serialize;

use crate::domain::parse_decimal;

const MARCADOR_REVISAO: &str = "Avalie os integrantes";
const COLUNA_AUTOAVALIACAO: &str = "Sua Autoavaliação (Nota)";
const COLUNA_PELOTAO: &str = "Selecione seu Pelotão";

#[derive(Debug, thiserror::Error)]
pub enum AvaliacaoError {
    #[error("invalid peer-review sheet: {0}")]
    Csv(#[from] csv::Error),
    #[error("no review columns found (expected headers containing '{MARCADOR_REVISAO}')")]
    SemColunasDeRevisao,
}

/// Aggregated grades one subject received from peers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NotasRecebidas {
    pub soma: f64,
    pub respostas: usize,
}

impl NotasRecebidas {
    pub fn media(&self) -> Option<f64> {
        if self.respostas == 0 {
            return None;
        }
        Some(self.soma / self.respostas as f64)
    }

    fn registrar(&mut self, nota: f64) {
        self.soma += nota;
        self.respostas += 1;
    }
}

/// Parsed peer-review results.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultadoAvaliacao {
    /// nome_guerra → received grades.
    pub por_aluno: BTreeMap<String, NotasRecebidas>,
    /// Respondent platoon → self-evaluation grades.
    pub autoavaliacao_por_pelotao: BTreeMap<String, NotasRecebidas>,
    pub respondentes: usize,
    /// Cells that did not parse as a grade; skipped, never fatal.
    pub celulas_invalidas: usize,
}

/// Extracts the rated nome de guerra from a review header:
/// `Avalie os integrantes ... [SILVA]` → `SILVA`.
fn nome_avaliado(cabecalho: &str) -> Option<String> {
    if !cabecalho.contains(MARCADOR_REVISAO) {
        return None;
    }
    let inicio = cabecalho.rfind('[')?;
    let fim = cabecalho[inicio..].find(']')? + inicio;
    let nome = cabecalho[inicio + 1..fim].trim();
    if nome.is_empty() {
        return None;
    }
    Some(nome.to_string())
}

pub fn processar<R: Read>(reader: R) -> Result<ResultadoAvaliacao, AvaliacaoError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let cabecalhos: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();

    let mut colunas_revisao: Vec<(usize, String)> = Vec::new();
    let mut coluna_auto = None;
    let mut coluna_pelotao = None;
    for (indice, cabecalho) in cabecalhos.iter().enumerate() {
        if let Some(nome) = nome_avaliado(cabecalho) {
            colunas_revisao.push((indice, nome));
        } else if cabecalho == COLUNA_AUTOAVALIACAO {
            coluna_auto = Some(indice);
        } else if cabecalho == COLUNA_PELOTAO {
            coluna_pelotao = Some(indice);
        }
    }
    if colunas_revisao.is_empty() {
        return Err(AvaliacaoError::SemColunasDeRevisao);
    }

    let mut resultado = ResultadoAvaliacao::default();
    for record in csv_reader.records() {
        let record = record?;
        resultado.respondentes += 1;

        for (indice, nome) in &colunas_revisao {
            let celula = record.get(*indice).unwrap_or("").trim();
            if celula.is_empty() {
                continue;
            }
            match parse_decimal(celula) {
                Some(nota) => resultado
                    .por_aluno
                    .entry(nome.clone())
                    .or_default()
                    .registrar(nota),
                None => resultado.celulas_invalidas += 1,
            }
        }

        if let Some(indice) = coluna_auto {
            let celula = record.get(indice).unwrap_or("").trim();
            if !celula.is_empty() {
                let pelotao = coluna_pelotao
                    .and_then(|i| record.get(i))
                    .unwrap_or("")
                    .trim();
                let chave = if pelotao.is_empty() {
                    "(sem pelotão)".to_string()
                } else {
                    pelotao.to_string()
                };
                match parse_decimal(celula) {
                    Some(nota) => resultado
                        .autoavaliacao_por_pelotao
                        .entry(chave)
                        .or_default()
                        .registrar(nota),
                    None => resultado.celulas_invalidas += 1,
                }
            }
        }
    }

    Ok(resultado)
}
