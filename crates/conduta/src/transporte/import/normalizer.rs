/// Normalizes a CSV header label for fuzzy matching: accents stripped,
/// punctuation collapsed to spaces, letter/digit boundaries split, all
/// lowercase.
pub(crate) fn normalize_header(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut anterior_digito = false;
    let mut anterior_alfa = false;
    for c in value.trim().chars() {
        let c = strip_accent(c.to_lowercase().next().unwrap_or(c));
        if c.is_ascii_alphanumeric() {
            let digito = c.is_ascii_digit();
            if (digito && anterior_alfa) || (!digito && anterior_digito) {
                out.push(' ');
            }
            out.push(c);
            anterior_digito = digito;
            anterior_alfa = !digito;
        } else {
            out.push(' ');
            anterior_digito = false;
            anterior_alfa = false;
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_accents_and_case() {
        assert_eq!(normalize_header("Número Interno"), "numero interno");
        assert_eq!(normalize_header("ENDEREÇO"), "endereco");
    }

    #[test]
    fn splits_letter_digit_boundaries() {
        assert_eq!(normalize_header("Ida1 Tarifa"), "ida 1 tarifa");
        assert_eq!(normalize_header("TARIFA-VOLTA-3"), "tarifa volta 3");
    }

    #[test]
    fn collapses_punctuation_and_whitespace() {
        assert_eq!(
            normalize_header("  Dias  Úteis (máx. 22) "),
            "dias uteis max 22"
        );
    }
}
