//! Domain entities parsed from store relations. Parsing is per-row
//! tolerant: a malformed row is skipped and counted, never fatal to a
//! batch (orphan foreign keys are the norm in this data, not an error).

mod coerce;
mod ordem;

pub use coerce::{parse_bool, parse_decimal, parse_flexible_date, parse_time, to_iso};
pub use ordem::{ordenar_por_numero_interno, ChaveNumeroInterno};

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::store::{field, Relation, Row};

/// Sentinel platoon for discharged subjects; excluded from every
/// cohort aggregate.
pub const PELOTAO_BAIXA: &str = "BAIXA";

#[derive(Debug, thiserror::Error)]
pub enum RowError {
    #[error("row is missing required field '{0}'")]
    MissingField(&'static str),
}

fn required(row: &Row, column: &'static str) -> Result<String, RowError> {
    let value = field(row, column);
    if value.is_empty() {
        return Err(RowError::MissingField(column));
    }
    Ok(value.to_string())
}

/// Result of a tolerant bulk parse.
#[derive(Debug, Clone)]
pub struct Parsed<T> {
    pub items: Vec<T>,
    pub skipped: usize,
}

/// Parses every row of a relation, skipping (and logging) failures.
pub fn parse_rows<T, F>(relation: &Relation, table: &str, parse: F) -> Parsed<T>
where
    F: Fn(&Row) -> Result<T, RowError>,
{
    let mut items = Vec::with_capacity(relation.rows.len());
    let mut skipped = 0;
    for row in &relation.rows {
        match parse(row) {
            Ok(item) => items.push(item),
            Err(error) => {
                skipped += 1;
                warn!(%table, %error, "skipping malformed row");
            }
        }
    }
    Parsed { items, skipped }
}

/// A tracked student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aluno {
    pub id: String,
    pub numero_interno: String,
    pub nome_guerra: String,
    pub nome_completo: String,
    pub pelotao: String,
    pub especialidade: String,
    pub data_nascimento: Option<NaiveDate>,
    pub media_academica: f64,
    pub foto: Option<String>,
}

impl Aluno {
    pub fn from_row(row: &Row) -> Result<Self, RowError> {
        let media = parse_decimal(field(row, "media_academica"))
            .unwrap_or(0.0)
            .max(0.0);
        let foto = match field(row, "foto") {
            "" => None,
            value => Some(value.to_string()),
        };
        Ok(Self {
            id: required(row, "id")?,
            numero_interno: field(row, "numero_interno").to_string(),
            nome_guerra: field(row, "nome_guerra").to_string(),
            nome_completo: field(row, "nome_completo").to_string(),
            pelotao: field(row, "pelotao").to_string(),
            especialidade: field(row, "especialidade").to_string(),
            data_nascimento: parse_flexible_date(field(row, "data_nascimento")),
            media_academica: media,
            foto,
        })
    }

    /// Discharged subjects stay in the roster but leave every cohort
    /// calculation.
    pub fn baixado(&self) -> bool {
        self.pelotao.trim().eq_ignore_ascii_case(PELOTAO_BAIXA)
    }
}

/// A category of disciplinary or merit action with its base score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TipoAcao {
    pub id: String,
    pub nome: String,
    pub codigo: String,
    pub descricao: String,
    pub pontuacao: f64,
}

impl TipoAcao {
    pub fn from_row(row: &Row) -> Result<Self, RowError> {
        Ok(Self {
            id: required(row, "id")?,
            nome: field(row, "nome").to_string(),
            codigo: field(row, "codigo").to_string(),
            descricao: field(row, "descricao").to_string(),
            pontuacao: parse_decimal(field(row, "pontuacao")).unwrap_or(0.0),
        })
    }
}

/// A dated behavioral event recorded against a subject.
///
/// The store also carries `pontuacao` / `pontuacao_efetiva` snapshots
/// on each row; those are display caches and deliberately not modeled
/// here: the scoring engine re-derives every value from the current
/// type table and configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Acao {
    pub id: String,
    pub aluno_id: String,
    pub tipo_acao_id: String,
    /// Denormalized type-name snapshot, kept for display when the
    /// referenced type has been deleted.
    pub tipo: String,
    pub descricao: String,
    pub data: Option<NaiveDate>,
    pub data_bruta: String,
    pub usuario: String,
    pub lancado_faia: bool,
}

impl Acao {
    pub fn from_row(row: &Row) -> Result<Self, RowError> {
        let data_bruta = field(row, "data").to_string();
        Ok(Self {
            id: required(row, "id")?,
            aluno_id: field(row, "aluno_id").to_string(),
            tipo_acao_id: field(row, "tipo_acao_id").to_string(),
            tipo: field(row, "tipo").to_string(),
            descricao: field(row, "descricao").to_string(),
            data: parse_flexible_date(&data_bruta),
            data_bruta,
            usuario: field(row, "usuario").to_string(),
            lancado_faia: parse_bool(field(row, "lancado_faia")),
        })
    }
}

/// Daily schedule entry status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusProgramacao {
    ARealizar,
    Concluido,
}

impl StatusProgramacao {
    pub const fn label(self) -> &'static str {
        match self {
            StatusProgramacao::ARealizar => "A Realizar",
            StatusProgramacao::Concluido => "Concluído",
        }
    }

    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("concluído")
            || value.trim().eq_ignore_ascii_case("concluido")
        {
            StatusProgramacao::Concluido
        } else {
            StatusProgramacao::ARealizar
        }
    }
}

/// A scheduled daily event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Programacao {
    pub id: String,
    pub data: Option<NaiveDate>,
    pub hora: Option<NaiveTime>,
    pub descricao: String,
    pub local: String,
    pub responsavel: String,
    pub status: StatusProgramacao,
    pub concluido_por: Option<String>,
    pub data_conclusao: Option<NaiveDate>,
}

impl Programacao {
    pub fn from_row(row: &Row) -> Result<Self, RowError> {
        let concluido_por = match field(row, "concluido_por") {
            "" => None,
            value => Some(value.to_string()),
        };
        Ok(Self {
            id: required(row, "id")?,
            data: parse_flexible_date(field(row, "data")),
            hora: parse_time(field(row, "hora")),
            descricao: field(row, "descricao").to_string(),
            local: field(row, "local").to_string(),
            responsavel: field(row, "responsavel").to_string(),
            status: StatusProgramacao::parse(field(row, "status")),
            concluido_por,
            data_conclusao: parse_flexible_date(field(row, "data_conclusao")),
        })
    }
}

/// One leg of a commute itinerary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trecho {
    pub empresa: String,
    pub linha: String,
    pub tarifa: f64,
}

impl Trecho {
    pub fn vazio(&self) -> bool {
        self.empresa.is_empty() && self.linha.is_empty() && self.tarifa == 0.0
    }
}

/// Maximum legs per direction supported by the paper form.
pub const MAX_TRECHOS: usize = 5;

/// Transport-allowance registration for one subject and year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistroTransporte {
    pub numero_interno: String,
    pub ano_referencia: String,
    pub dias_uteis: i64,
    pub endereco: String,
    pub bairro: String,
    pub cidade: String,
    pub cep: String,
    pub idas: Vec<Trecho>,
    pub voltas: Vec<Trecho>,
}

impl RegistroTransporte {
    pub fn from_row(row: &Row) -> Result<Self, RowError> {
        let trechos = |direcao: &str| -> Vec<Trecho> {
            (1..=MAX_TRECHOS)
                .map(|i| Trecho {
                    empresa: field(row, &format!("{direcao}_{i}_empresa")).to_string(),
                    linha: field(row, &format!("{direcao}_{i}_linha")).to_string(),
                    tarifa: crate::transporte::parse_valor_monetario(field(
                        row,
                        &format!("{direcao}_{i}_tarifa"),
                    ))
                    .unwrap_or(0.0),
                })
                .collect()
        };
        Ok(Self {
            numero_interno: required(row, "numero_interno")?,
            ano_referencia: field(row, "ano_referencia").to_string(),
            dias_uteis: parse_decimal(field(row, "dias_uteis")).unwrap_or(0.0) as i64,
            endereco: field(row, "endereco").to_string(),
            bairro: field(row, "bairro").to_string(),
            cidade: field(row, "cidade").to_string(),
            cep: field(row, "cep").to_string(),
            idas: trechos("ida"),
            voltas: trechos("volta"),
        })
    }
}

/// Base monthly pay for a rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Soldo {
    pub graduacao: String,
    pub valor: f64,
}

impl Soldo {
    pub fn from_row(row: &Row) -> Result<Self, RowError> {
        Ok(Self {
            graduacao: required(row, "graduacao")?,
            valor: crate::transporte::parse_valor_monetario(field(row, "valor")).unwrap_or(0.0),
        })
    }
}

/// Overnight-stay mark for one subject on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pernoite {
    pub aluno_id: String,
    pub data: Option<NaiveDate>,
    pub presente: bool,
}

impl Pernoite {
    pub fn from_row(row: &Row) -> Result<Self, RowError> {
        Ok(Self {
            aluno_id: required(row, "aluno_id")?,
            data: parse_flexible_date(field(row, "data")),
            presente: parse_bool(field(row, "presente")),
        })
    }
}

/// Where a PDF form field gets its value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OrigemCampo {
    /// Rendered from a relation column of the current row.
    Db { column: String },
    /// Fixed literal text.
    Static { text: String },
}

/// Mapping from one named PDF form field to its source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampoMapeado {
    pub campo: String,
    pub origem: OrigemCampo,
}

/// A stored PDF template with its field mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeloDocumento {
    pub nome: String,
    pub campos: Vec<CampoMapeado>,
}

impl ModeloDocumento {
    pub fn from_row(row: &Row) -> Result<Self, RowError> {
        let nome = required(row, "nome")?;
        let campos = serde_json::from_str(field(row, "campos")).unwrap_or_default();
        Ok(Self { nome, campos })
    }
}
