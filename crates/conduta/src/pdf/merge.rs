//! Document concatenation. Every input keeps its pages (and their
//! annotations) in order; catalogs and page trees collapse into one.

use std::collections::BTreeMap;

use lopdf::{dictionary, Document, Object, ObjectId};

use super::PdfError;

fn tipo(object: &Object) -> Option<&[u8]> {
    object.as_dict().ok()?.get(b"Type").ok()?.as_name().ok()
}

fn estender_formulario(form: &mut lopdf::Dictionary, extras: Vec<Object>, precisa: bool) {
    let mut fields = match form.get(b"Fields") {
        Ok(Object::Array(existentes)) => existentes.clone(),
        _ => Vec::new(),
    };
    fields.extend(extras);
    form.set("Fields", fields);
    if precisa {
        form.set("NeedAppearances", Object::Boolean(true));
    }
}

/// Merges the documents into a single one, pages in input order.
pub fn concatenar(documentos: Vec<Document>) -> Result<Document, PdfError> {
    if documentos.is_empty() {
        return Err(PdfError::SemRegistros);
    }

    let mut max_id = 1;
    let mut paginas: BTreeMap<ObjectId, Object> = BTreeMap::new();
    let mut objetos: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for mut doc in documentos {
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        for (_, pagina_id) in doc.get_pages() {
            let pagina = doc.get_object(pagina_id)?.to_owned();
            paginas.insert(pagina_id, pagina);
        }
        objetos.append(&mut doc.objects);
    }

    let mut saida = Document::with_version("1.5");
    let mut catalogo: Option<(ObjectId, Object)> = None;
    let mut arvore: Option<(ObjectId, lopdf::Dictionary)> = None;
    let mut formularios_absorvidos: Vec<Object> = Vec::new();

    for (id, object) in objetos {
        match tipo(&object) {
            Some(b"Catalog") => {
                // First catalog wins; the rest are absorbed, but their
                // forms still have to end up in the surviving AcroForm.
                if catalogo.is_none() {
                    catalogo = Some((id, object));
                } else if let Ok(form) = object.as_dict().and_then(|d| d.get(b"AcroForm")) {
                    formularios_absorvidos.push(form.clone());
                }
            }
            Some(b"Pages") => {
                if let Ok(dict) = object.as_dict() {
                    let mut dict = dict.clone();
                    match arvore.take() {
                        Some((primeiro_id, anterior)) => {
                            dict.extend(&anterior);
                            arvore = Some((primeiro_id, dict));
                        }
                        None => arvore = Some((id, dict)),
                    }
                }
            }
            Some(b"Page") => {}
            Some(b"Outlines") | Some(b"Outline") => {}
            _ => {
                saida.objects.insert(id, object);
            }
        }
    }

    let (arvore_id, mut arvore_dict) = arvore.ok_or(PdfError::SemPaginas)?;
    let (catalogo_id, catalogo_obj) = catalogo.ok_or(PdfError::SemPaginas)?;
    let Object::Dictionary(mut catalogo_dict) = catalogo_obj else {
        return Err(PdfError::SemPaginas);
    };

    for (id, pagina) in &paginas {
        if let Ok(dict) = pagina.as_dict() {
            let mut dict = dict.clone();
            dict.set("Parent", Object::Reference(arvore_id));
            saida.objects.insert(*id, Object::Dictionary(dict));
        }
    }

    arvore_dict.set("Count", paginas.len() as i64);
    arvore_dict.set(
        "Kids",
        paginas
            .keys()
            .map(|id| Object::Reference(*id))
            .collect::<Vec<_>>(),
    );
    saida
        .objects
        .insert(arvore_id, Object::Dictionary(arvore_dict));

    // Fold the absorbed forms into the surviving AcroForm: their field
    // references and any NeedAppearances flag must survive, or readers
    // will not enumerate the later documents' fields.
    let mut campos_extras: Vec<Object> = Vec::new();
    let mut precisa_aparencias = false;
    for form in formularios_absorvidos {
        let dict = match form {
            Object::Reference(form_id) => match saida.objects.remove(&form_id) {
                Some(Object::Dictionary(dict)) => dict,
                _ => continue,
            },
            Object::Dictionary(dict) => dict,
            _ => continue,
        };
        if let Ok(Object::Array(fields)) = dict.get(b"Fields") {
            campos_extras.extend(fields.iter().cloned());
        }
        if matches!(dict.get(b"NeedAppearances"), Ok(Object::Boolean(true))) {
            precisa_aparencias = true;
        }
    }
    if !campos_extras.is_empty() || precisa_aparencias {
        match catalogo_dict.get(b"AcroForm").ok().cloned() {
            Some(Object::Reference(form_id)) => {
                if let Some(Object::Dictionary(form)) = saida.objects.get_mut(&form_id) {
                    estender_formulario(form, campos_extras, precisa_aparencias);
                }
            }
            Some(Object::Dictionary(mut form)) => {
                estender_formulario(&mut form, campos_extras, precisa_aparencias);
                catalogo_dict.set("AcroForm", Object::Dictionary(form));
            }
            _ => {
                let mut form = lopdf::Dictionary::new();
                estender_formulario(&mut form, campos_extras, precisa_aparencias);
                catalogo_dict.set("AcroForm", Object::Dictionary(form));
            }
        }
    }

    catalogo_dict.set("Pages", Object::Reference(arvore_id));
    catalogo_dict.remove(b"Outlines");
    saida
        .objects
        .insert(catalogo_id, Object::Dictionary(catalogo_dict));

    saida.trailer = dictionary! { "Root" => Object::Reference(catalogo_id) };
    saida.max_id = max_id;
    saida.renumber_objects();
    saida.compress();

    Ok(saida)
}
