//! Raw decoding of the transport sheet: semicolon-separated, latin-1,
//! first column ignored (a sequence number on the paper form).

use encoding_rs::WINDOWS_1252;

/// Decoded sheet: remaining headers plus the matching cell slices per
/// record. Cells beyond the header width are dropped; short records
/// read as empty.
#[derive(Debug)]
pub(crate) struct Planilha {
    pub(crate) cabecalhos: Vec<String>,
    pub(crate) registros: Vec<Vec<String>>,
}

pub(crate) fn decodificar(bytes: &[u8]) -> Result<Planilha, csv::Error> {
    let (texto, _, _) = WINDOWS_1252.decode(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(texto.as_bytes());

    let cabecalhos: Vec<String> = reader
        .headers()?
        .iter()
        .skip(1)
        .map(str::to_string)
        .collect();

    let mut registros = Vec::new();
    for record in reader.records() {
        let record = record?;
        let linha: Vec<String> = (0..cabecalhos.len())
            .map(|i| record.get(i + 1).unwrap_or("").to_string())
            .collect();
        if linha.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        registros.push(linha);
    }

    Ok(Planilha {
        cabecalhos,
        registros,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_column_is_dropped() {
        let bytes = "SEQ;Numero Interno;Dias Uteis\n1;M-1;20\n".as_bytes();
        let planilha = decodificar(bytes).expect("decodes");
        assert_eq!(planilha.cabecalhos, vec!["Numero Interno", "Dias Uteis"]);
        assert_eq!(planilha.registros, vec![vec!["M-1", "20"]]);
    }

    #[test]
    fn latin1_bytes_decode() {
        let mut bytes = "SEQ;Endere".as_bytes().to_vec();
        bytes.push(0xE7); // ç in latin-1
        bytes.extend_from_slice("o\n1;Rua A\n".as_bytes());
        let planilha = decodificar(&bytes).expect("decodes");
        assert_eq!(planilha.cabecalhos, vec!["Endereço"]);
    }

    #[test]
    fn blank_lines_are_skipped_and_short_rows_pad() {
        let bytes = "SEQ;A;B\n1;x\n;;\n2;y;z\n".as_bytes();
        let planilha = decodificar(bytes).expect("decodes");
        assert_eq!(
            planilha.registros,
            vec![vec!["x", ""], vec!["y", "z"]]
        );
    }
}
