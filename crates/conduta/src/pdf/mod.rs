//! PDF form-fill pipeline: clone a template per record, set its named
//! text fields, and concatenate the filled copies into one document.
//! Pure given (template bytes, mapping, rows); nothing here reads the
//! store.

pub mod grid;
mod merge;

pub use merge::concatenar;

use std::collections::BTreeMap;

use encoding_rs::WINDOWS_1252;
use lopdf::{Document, Object, ObjectId, StringFormat};

use crate::domain::{CampoMapeado, OrigemCampo};
use crate::store::{field, Row};

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("malformed PDF: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("could not write PDF: {0}")]
    Io(#[from] std::io::Error),
    #[error("no records to fill")]
    SemRegistros,
    #[error("template has no pages")]
    SemPaginas,
}

/// Renders the mapping against one record: database columns read from
/// the row, literals passed through.
fn render_valores(campos: &[CampoMapeado], row: &Row) -> BTreeMap<String, String> {
    campos
        .iter()
        .map(|campo| {
            let valor = match &campo.origem {
                OrigemCampo::Db { column } => field(row, column).to_string(),
                OrigemCampo::Static { text } => text.clone(),
            };
            (campo.campo.clone(), valor)
        })
        .collect()
}

fn decode_latin1(bytes: &[u8]) -> String {
    WINDOWS_1252.decode(bytes).0.into_owned()
}

pub(crate) fn encode_latin1(text: &str) -> Vec<u8> {
    WINDOWS_1252.encode(text).0.into_owned()
}

/// Sets every mapped text field present in the document. Mapped fields
/// absent from the template are silently skipped; template fields
/// absent from the mapping keep their default values byte-for-byte.
fn preencher_campos(doc: &mut Document, valores: &BTreeMap<String, String>) -> usize {
    let ids: Vec<ObjectId> = doc.objects.keys().copied().collect();
    let mut preenchidos = 0;

    for id in ids {
        let nome = {
            let Ok(Object::Dictionary(dict)) = doc.get_object(id) else {
                continue;
            };
            let eh_texto = matches!(dict.get(b"FT"), Ok(Object::Name(ft)) if ft == b"Tx");
            if !eh_texto {
                continue;
            }
            match dict.get(b"T") {
                Ok(Object::String(bytes, _)) => decode_latin1(bytes),
                _ => continue,
            }
        };

        let Some(valor) = valores.get(&nome) else {
            continue;
        };

        if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(id) {
            dict.set(
                "V",
                Object::String(encode_latin1(valor), StringFormat::Literal),
            );
            // Drop the stale appearance stream; viewers regenerate it.
            dict.remove(b"AP");
            preenchidos += 1;
        }
    }

    preenchidos
}

/// Viewers only regenerate field appearances when asked to.
fn marcar_need_appearances(doc: &mut Document) -> Result<(), lopdf::Error> {
    let root_id = doc.trailer.get(b"Root")?.as_reference()?;
    let acro_form = {
        let catalog = doc.get_dictionary(root_id)?;
        catalog.get(b"AcroForm").ok().cloned()
    };

    match acro_form {
        Some(Object::Reference(form_id)) => {
            let form = doc.get_dictionary_mut(form_id)?;
            form.set("NeedAppearances", Object::Boolean(true));
        }
        Some(Object::Dictionary(mut form)) => {
            form.set("NeedAppearances", Object::Boolean(true));
            let catalog = doc.get_dictionary_mut(root_id)?;
            catalog.set("AcroForm", Object::Dictionary(form));
        }
        _ => {}
    }
    Ok(())
}

/// Fills one template copy per row and concatenates the copies in
/// input order.
pub fn preencher_lote(
    template: &[u8],
    campos: &[CampoMapeado],
    rows: &[Row],
) -> Result<Vec<u8>, PdfError> {
    if rows.is_empty() {
        return Err(PdfError::SemRegistros);
    }

    let mut copias = Vec::with_capacity(rows.len());
    for row in rows {
        let mut doc = Document::load_mem(template)?;
        if doc.get_pages().is_empty() {
            return Err(PdfError::SemPaginas);
        }
        let valores = render_valores(campos, row);
        preencher_campos(&mut doc, &valores);
        marcar_need_appearances(&mut doc)?;
        copias.push(doc);
    }

    let mut saida = concatenar(copias)?;
    let mut bytes = Vec::new();
    saida.save_to(&mut bytes)?;
    Ok(bytes)
}

pub fn contar_paginas(bytes: &[u8]) -> Result<usize, PdfError> {
    let doc = Document::load_mem(bytes)?;
    Ok(doc.get_pages().len())
}

/// Reads back `(field name, value)` pairs, in object order. Mostly a
/// verification aid for exports and tests.
pub fn valores_dos_campos(bytes: &[u8]) -> Result<Vec<(String, String)>, PdfError> {
    let doc = Document::load_mem(bytes)?;
    let mut pares = Vec::new();
    for object in doc.objects.values() {
        let Object::Dictionary(dict) = object else {
            continue;
        };
        let Ok(Object::String(nome, _)) = dict.get(b"T") else {
            continue;
        };
        if !matches!(dict.get(b"FT"), Ok(Object::Name(ft)) if ft == b"Tx") {
            continue;
        }
        let valor = match dict.get(b"V") {
            Ok(Object::String(bytes, _)) => decode_latin1(bytes),
            _ => String::new(),
        };
        pares.push((decode_latin1(nome), valor));
    }
    Ok(pares)
}
