//! Plain-text FAIA transcription reports and the per-platoon zip
//! bundle handed to the company office.

use std::collections::HashMap;
use std::io::Write;

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::domain::{ordenar_por_numero_interno, to_iso, Acao, Aluno};

const LINHA: &str =
    "--------------------------------------------------------------------------------";

#[derive(Debug, thiserror::Error)]
pub enum FaiaReportError {
    #[error("failed to assemble zip bundle: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("io error while writing bundle: {0}")]
    Io(#[from] std::io::Error),
}

/// One subject's report: fixed identity header, then one block per
/// action in chronological order (undated actions go last, in input
/// order).
pub fn relatorio_aluno(aluno: &Aluno, acoes: &[&Acao]) -> String {
    let mut ordenadas: Vec<&Acao> = acoes.to_vec();
    ordenadas.sort_by_key(|a| (a.data.is_none(), a.data));

    let mut texto = String::new();
    texto.push_str(&format!(
        "FOLHA DE ALTERAÇÕES - FAIA\n{LINHA}\n\
         Nº Interno: {}\nNome de Guerra: {}\nNome Completo: {}\nPelotão: {}\n{LINHA}\n",
        aluno.numero_interno, aluno.nome_guerra, aluno.nome_completo, aluno.pelotao
    ));

    if ordenadas.is_empty() {
        texto.push_str("Sem alterações registradas.\n");
        return texto;
    }

    for acao in ordenadas {
        let data = acao
            .data
            .map(to_iso)
            .unwrap_or_else(|| acao.data_bruta.clone());
        texto.push_str(&format!(
            "Data: {data}\nTipo: {}\nDescrição: {}\nRegistrado por: {}\n{LINHA}\n",
            acao.tipo, acao.descricao, acao.usuario
        ));
    }
    texto
}

fn nome_arquivo(aluno: &Aluno) -> String {
    let base = format!("{} - {}", aluno.numero_interno, aluno.nome_guerra);
    let limpo: String = base
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect();
    format!("{}.txt", limpo.trim())
}

/// One text report per subject in the selected platoon, bundled as a
/// zip, entries ordered by internal number.
pub fn zip_pelotao(
    alunos: &[Aluno],
    acoes: &[Acao],
    pelotao: &str,
) -> Result<Vec<u8>, FaiaReportError> {
    let mut selecionados: Vec<&Aluno> = alunos
        .iter()
        .filter(|a| !a.baixado() && a.pelotao.eq_ignore_ascii_case(pelotao))
        .collect();
    ordenar_por_numero_interno(&mut selecionados, |a| &a.numero_interno);

    let mut por_aluno: HashMap<&str, Vec<&Acao>> = HashMap::new();
    for acao in acoes {
        por_aluno
            .entry(acao.aluno_id.as_str())
            .or_default()
            .push(acao);
    }

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = ZipWriter::new(&mut cursor);
        let options = SimpleFileOptions::default();
        for aluno in selecionados {
            let acoes_do_aluno = por_aluno
                .get(aluno.id.as_str())
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            writer.start_file(nome_arquivo(aluno), options)?;
            writer.write_all(relatorio_aluno(aluno, acoes_do_aluno).as_bytes())?;
        }
        writer.finish()?;
    }
    Ok(cursor.into_inner())
}
