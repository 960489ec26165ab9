//! Transport-sheet importer. Column discovery is fuzzy but never
//! silent: `planejar` produces an [`ImportPlan`] describing exactly
//! which header landed on which internal field and which headers were
//! ignored; nothing is applied until the user confirms the plan.

mod mapping;
mod normalizer;
mod parser;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{parse_rows, Parsed, RegistroTransporte};
use crate::store::{Relation, Row};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("invalid transport sheet: {0}")]
    Csv(#[from] csv::Error),
    #[error("headers '{primeiro}' and '{segundo}' both map to field '{campo}'")]
    MappingAmbiguous {
        campo: String,
        primeiro: String,
        segundo: String,
    },
    #[error("no recognizable columns in the sheet")]
    SemColunas,
}

/// Proposed column mapping, shown to the user before anything is
/// written. Consuming it via [`ImportPlan::confirmar`] is the only way
/// to reach [`PlanoConfirmado::aplicar`].
#[derive(Debug, Serialize)]
pub struct ImportPlan {
    /// Internal field → original header label.
    pub mapeamento: BTreeMap<String, String>,
    /// Headers with no internal counterpart, surfaced for review.
    pub ignorados: Vec<String>,
    pub total_registros: usize,
    #[serde(skip)]
    colunas: BTreeMap<String, usize>,
    #[serde(skip)]
    registros: Vec<Vec<String>>,
}

impl ImportPlan {
    pub fn planejar(bytes: &[u8]) -> Result<Self, ImportError> {
        let planilha = parser::decodificar(bytes)?;

        let mut mapeamento = BTreeMap::new();
        let mut colunas = BTreeMap::new();
        let mut ignorados = Vec::new();

        for (indice, cabecalho) in planilha.cabecalhos.iter().enumerate() {
            let normalizado = normalizer::normalize_header(cabecalho);
            match mapping::campo_interno(&normalizado) {
                Some(campo) => {
                    if let Some(anterior) = mapeamento.insert(campo.clone(), cabecalho.clone()) {
                        return Err(ImportError::MappingAmbiguous {
                            campo,
                            primeiro: anterior,
                            segundo: cabecalho.clone(),
                        });
                    }
                    colunas.insert(campo, indice);
                }
                None => ignorados.push(cabecalho.clone()),
            }
        }

        if colunas.is_empty() {
            return Err(ImportError::SemColunas);
        }

        Ok(Self {
            mapeamento,
            ignorados,
            total_registros: planilha.registros.len(),
            colunas,
            registros: planilha.registros,
        })
    }

    /// The user-confirmation step required by the import workflow.
    pub fn confirmar(self) -> PlanoConfirmado {
        PlanoConfirmado { plano: self }
    }
}

/// A plan the user has signed off on.
#[derive(Debug)]
pub struct PlanoConfirmado {
    plano: ImportPlan,
}

impl PlanoConfirmado {
    /// Materializes the records: string fields upper-cased and trimmed,
    /// fares coerced per the currency rules, malformed rows skipped and
    /// counted.
    pub fn aplicar(self) -> Parsed<RegistroTransporte> {
        let mut relation = Relation::new(self.plano.colunas.keys().cloned());
        for registro in &self.plano.registros {
            let mut row = Row::new();
            for (campo, indice) in &self.plano.colunas {
                let bruto = registro.get(*indice).map(String::as_str).unwrap_or("");
                let valor = if campo.ends_with("_tarifa") || campo == "dias_uteis" {
                    bruto.trim().to_string()
                } else {
                    bruto.trim().to_uppercase()
                };
                row.insert(campo.clone(), valor);
            }
            relation.push(row);
        }
        parse_rows(&relation, "auxilio_transporte_dados", RegistroTransporte::from_row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The sheet arrives latin-1 encoded, so the fixture must too.
    fn latin1(texto: &str) -> Vec<u8> {
        encoding_rs::WINDOWS_1252.encode(texto).0.into_owned()
    }

    fn planilha() -> Vec<u8> {
        latin1(
            "SEQ;Número Interno;Ano;Dias Úteis;Endereço;Ida 1 Empresa;Ida 1 Linha;Tarifa Ida 1;Volta 1 Empresa;Volta 1 Linha;Tarifa Volta 1;Obs\n\
            1;m-1;2025;30;rua das flores;viação x;101;R$ 4,50;viação x;102;4,50;nada\n\
            2;;2025;20;rua b;;;1,00;;;1,00;\n",
        )
    }

    #[test]
    fn plan_reports_mapping_and_ignored_headers() {
        let plano = ImportPlan::planejar(&planilha()).expect("plans");
        assert_eq!(
            plano.mapeamento.get("numero_interno"),
            Some(&"Número Interno".to_string())
        );
        assert_eq!(
            plano.mapeamento.get("ida_1_tarifa"),
            Some(&"Tarifa Ida 1".to_string())
        );
        assert_eq!(plano.ignorados, vec!["Obs".to_string()]);
        assert_eq!(plano.total_registros, 2);
    }

    #[test]
    fn apply_uppercases_strings_and_parses_fares() {
        let registros = ImportPlan::planejar(&planilha())
            .expect("plans")
            .confirmar()
            .aplicar();
        // The second row has no internal number and is skipped.
        assert_eq!(registros.items.len(), 1);
        assert_eq!(registros.skipped, 1);

        let registro = &registros.items[0];
        assert_eq!(registro.numero_interno, "M-1");
        assert_eq!(registro.endereco, "RUA DAS FLORES");
        assert_eq!(registro.idas[0].empresa, "VIAÇÃO X");
        assert_eq!(registro.idas[0].tarifa, 4.5);
        assert_eq!(registro.voltas[0].tarifa, 4.5);
        assert_eq!(registro.dias_uteis, 30, "clamping happens at calculation time");
    }

    #[test]
    fn duplicate_target_field_is_ambiguous() {
        let bytes = latin1("SEQ;Dias Úteis;Dias de Trabalho\n1;20;21\n");
        let error = ImportPlan::planejar(&bytes).expect_err("ambiguous");
        assert!(matches!(error, ImportError::MappingAmbiguous { ref campo, .. } if campo == "dias_uteis"));
    }

    #[test]
    fn sheet_with_no_known_columns_is_rejected() {
        let bytes = "SEQ;Coluna Misteriosa\n1;x\n".as_bytes();
        let error = ImportPlan::planejar(bytes).expect_err("nothing to map");
        assert!(matches!(error, ImportError::SemColunas));
    }
}
