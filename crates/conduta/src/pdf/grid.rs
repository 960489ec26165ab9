//! Generated grid pages: a title, labelled sections of internal
//! numbers laid out in columns, a side caption, and a footer. Used by
//! the overnight-stay roster, which has no fillable template.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};

use super::{encode_latin1, PdfError};

/// One labelled block of the grid.
#[derive(Debug, Clone)]
pub struct SecaoGrade {
    pub rotulo: String,
    pub numeros: Vec<String>,
}

/// Everything the page needs; all text comes from configuration.
#[derive(Debug, Clone)]
pub struct PaginaGrade {
    pub titulo: String,
    pub rodape: String,
    pub legenda_lateral: String,
    pub secoes: Vec<SecaoGrade>,
}

// A4 portrait.
const LARGURA: f32 = 595.0;
const ALTURA: f32 = 842.0;
const MARGEM: f32 = 50.0;
const TOPO: f32 = ALTURA - 60.0;
const RODAPE_Y: f32 = 40.0;
const LIMITE_INFERIOR: f32 = 80.0;
const ALTURA_LINHA: f32 = 18.0;
const COLUNAS: usize = 6;

fn texto(ops: &mut Vec<Operation>, x: f32, y: f32, tamanho: f32, conteudo: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec!["F1".into(), tamanho.into()]));
    ops.push(Operation::new("Td", vec![x.into(), y.into()]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(
            encode_latin1(conteudo),
            StringFormat::Literal,
        )],
    ));
    ops.push(Operation::new("ET", vec![]));
}

fn texto_vertical(ops: &mut Vec<Operation>, x: f32, y: f32, tamanho: f32, conteudo: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec!["F1".into(), tamanho.into()]));
    // Rotate 90° so the caption runs up the left margin.
    ops.push(Operation::new(
        "Tm",
        vec![
            0.into(),
            1.into(),
            (-1).into(),
            0.into(),
            x.into(),
            y.into(),
        ],
    ));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(
            encode_latin1(conteudo),
            StringFormat::Literal,
        )],
    ));
    ops.push(Operation::new("ET", vec![]));
}

fn moldura(ops: &mut Vec<Operation>, pagina: &PaginaGrade, primeira: bool) {
    if primeira {
        texto(ops, MARGEM, TOPO, 14.0, &pagina.titulo);
    }
    if !pagina.legenda_lateral.is_empty() {
        texto_vertical(ops, 25.0, 200.0, 10.0, &pagina.legenda_lateral);
    }
    if !pagina.rodape.is_empty() {
        texto(ops, MARGEM, RODAPE_Y, 9.0, &pagina.rodape);
    }
}

/// Lays the sections out top to bottom, `COLUNAS` numbers per row,
/// flowing onto extra pages as needed.
pub fn gerar(pagina: &PaginaGrade) -> Result<Document, PdfError> {
    let largura_coluna = (LARGURA - 2.0 * MARGEM) / COLUNAS as f32;

    let mut paginas_ops: Vec<Vec<Operation>> = Vec::new();
    let mut ops = Vec::new();
    moldura(&mut ops, pagina, true);
    let mut y = TOPO - 2.0 * ALTURA_LINHA;

    let mut quebrar = |ops: &mut Vec<Operation>, y: &mut f32| {
        paginas_ops.push(std::mem::take(ops));
        moldura(ops, pagina, false);
        *y = TOPO;
    };

    for secao in &pagina.secoes {
        if y < LIMITE_INFERIOR {
            quebrar(&mut ops, &mut y);
        }
        texto(&mut ops, MARGEM, y, 11.0, &secao.rotulo);
        y -= ALTURA_LINHA;

        for linha in secao.numeros.chunks(COLUNAS) {
            if y < LIMITE_INFERIOR {
                quebrar(&mut ops, &mut y);
            }
            for (coluna, numero) in linha.iter().enumerate() {
                let x = MARGEM + coluna as f32 * largura_coluna;
                texto(&mut ops, x, y, 10.0, numero);
            }
            y -= ALTURA_LINHA;
        }
        y -= ALTURA_LINHA / 2.0;
    }
    paginas_ops.push(ops);

    montar(paginas_ops)
}

fn montar(paginas_ops: Vec<Vec<Operation>>) -> Result<Document, PdfError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for operations in paginas_ops {
        let conteudo = Content { operations }.encode()?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, conteudo));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                LARGURA.into(),
                ALTURA.into(),
            ],
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pagina(numeros: Vec<String>) -> PaginaGrade {
        PaginaGrade {
            titulo: "PERNOITE - 29/08/2025".to_string(),
            rodape: "Conferido pelo oficial de dia".to_string(),
            legenda_lateral: "CAP".to_string(),
            secoes: vec![SecaoGrade {
                rotulo: "1º Pelotão".to_string(),
                numeros,
            }],
        }
    }

    fn textos_do_documento(doc: &Document) -> Vec<String> {
        let mut textos = Vec::new();
        for (_, page_id) in doc.get_pages() {
            let conteudo = doc.get_page_content(page_id).expect("content");
            let content = Content::decode(&conteudo).expect("decodes");
            for operation in content.operations {
                if operation.operator == "Tj" {
                    if let Some(Object::String(bytes, _)) = operation.operands.first() {
                        textos.push(encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned());
                    }
                }
            }
        }
        textos
    }

    #[test]
    fn title_caption_footer_and_numbers_are_drawn() {
        let doc = gerar(&pagina(vec!["M-1".to_string(), "M-2".to_string()])).expect("generates");
        let textos = textos_do_documento(&doc);
        assert!(textos.contains(&"PERNOITE - 29/08/2025".to_string()));
        assert!(textos.contains(&"CAP".to_string()));
        assert!(textos.contains(&"Conferido pelo oficial de dia".to_string()));
        assert!(textos.contains(&"M-1".to_string()));
        assert!(textos.contains(&"M-2".to_string()));
    }

    #[test]
    fn short_roster_fits_one_page() {
        let doc = gerar(&pagina((1..=12).map(|i| format!("M-{i}")).collect())).expect("generates");
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn long_roster_flows_onto_extra_pages() {
        let doc =
            gerar(&pagina((1..=400).map(|i| format!("M-{i}")).collect())).expect("generates");
        assert!(doc.get_pages().len() > 1);
        let textos = textos_do_documento(&doc);
        assert!(textos.contains(&"M-400".to_string()), "last number survives pagination");
    }
}
