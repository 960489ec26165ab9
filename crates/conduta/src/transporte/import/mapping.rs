//! Fuzzy mapping from normalized header labels onto the internal
//! transport schema. The rules are deliberately token-based: sheets
//! arrive with labels like `TARIFA-IDA-3`, `Ida 3 (tarifa)`, or
//! `Valor volta 1`, all of which must land on the same field.

use crate::domain::MAX_TRECHOS;

/// Resolves one normalized header to an internal field name, or `None`
/// when the column is unrecognized (unrecognized columns are surfaced
/// to the user, not silently dropped).
pub(crate) fn campo_interno(normalizado: &str) -> Option<String> {
    let tokens: Vec<&str> = normalizado.split_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }

    if let Some(campo) = campo_trecho(&tokens) {
        return Some(campo);
    }

    let tem = |t: &str| tokens.iter().any(|x| *x == t);
    if tem("numero") && tem("interno") || normalizado == "numero" || normalizado == "n" {
        return Some("numero_interno".to_string());
    }
    if tem("ano") {
        return Some("ano_referencia".to_string());
    }
    if tem("dias") {
        return Some("dias_uteis".to_string());
    }
    if tem("endereco") || tem("logradouro") {
        return Some("endereco".to_string());
    }
    if tem("bairro") {
        return Some("bairro".to_string());
    }
    if tem("cidade") || tem("municipio") {
        return Some("cidade".to_string());
    }
    if tem("cep") {
        return Some("cep".to_string());
    }

    None
}

fn campo_trecho(tokens: &[&str]) -> Option<String> {
    let direcao = if tokens.contains(&"ida") {
        "ida"
    } else if tokens.contains(&"volta") || tokens.contains(&"retorno") {
        "volta"
    } else {
        return None;
    };

    let indice = match tokens.iter().find_map(|t| t.parse::<usize>().ok()) {
        Some(i) if (1..=MAX_TRECHOS).contains(&i) => i,
        // Numbered beyond what the paper form holds: not a leg column.
        Some(_) => return None,
        // A bare "Tarifa Ida" column means the first leg.
        None => 1,
    };

    let atributo = if tokens.iter().any(|t| {
        matches!(*t, "tarifa" | "valor" | "preco" | "custo")
    }) {
        "tarifa"
    } else if tokens.contains(&"empresa") {
        "empresa"
    } else if tokens.contains(&"linha") || tokens.contains(&"onibus") {
        "linha"
    } else {
        return None;
    };

    Some(format!("{direcao}_{indice}_{atributo}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transporte::import::normalizer::normalize_header;

    fn resolve(header: &str) -> Option<String> {
        campo_interno(&normalize_header(header))
    }

    #[test]
    fn leg_labels_map_regardless_of_token_order() {
        assert_eq!(resolve("Ida 1 Tarifa"), Some("ida_1_tarifa".to_string()));
        assert_eq!(resolve("TARIFA-VOLTA-3"), Some("volta_3_tarifa".to_string()));
        assert_eq!(resolve("Empresa (ida 2)"), Some("ida_2_empresa".to_string()));
        assert_eq!(resolve("Linha Volta 5"), Some("volta_5_linha".to_string()));
    }

    #[test]
    fn bare_direction_defaults_to_first_leg() {
        assert_eq!(resolve("Tarifa Ida"), Some("ida_1_tarifa".to_string()));
    }

    #[test]
    fn identity_and_address_fields_resolve() {
        assert_eq!(resolve("Número Interno"), Some("numero_interno".to_string()));
        assert_eq!(resolve("Ano de Referência"), Some("ano_referencia".to_string()));
        assert_eq!(resolve("Dias Úteis"), Some("dias_uteis".to_string()));
        assert_eq!(resolve("Endereço Residencial"), Some("endereco".to_string()));
        assert_eq!(resolve("CEP"), Some("cep".to_string()));
    }

    #[test]
    fn unknown_headers_stay_unmapped() {
        assert_eq!(resolve("Observações"), None);
        assert_eq!(resolve("Ida 7 Tarifa"), None, "legs above 5 are not fields");
    }
}
