//! Currency coercion for fare and pay columns. Accepts a leading
//! `R$`, thousands separators, and either decimal separator; the
//! result is a non-negative real. Unparseable input is `None`, which
//! callers treat as zero per the import contract.

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn parse_valor_monetario(value: &str) -> Option<f64> {
    let mut texto = value.trim().to_string();
    if texto.is_empty() {
        return None;
    }

    if let Some(resto) = texto.to_uppercase().strip_prefix("R$") {
        texto = resto.trim().to_string();
    }
    texto.retain(|c| !c.is_whitespace());
    if texto.is_empty() {
        return None;
    }

    let ultimo_ponto = texto.rfind('.');
    let ultima_virgula = texto.rfind(',');
    let normalizado = match (ultimo_ponto, ultima_virgula) {
        // Both present: the rightmost is the decimal separator, the
        // other is thousands noise.
        (Some(p), Some(v)) if p > v => texto.replace(',', ""),
        (Some(_), Some(_)) => texto.replace('.', "").replace(',', "."),
        (None, Some(_)) => texto.replace(',', "."),
        _ => texto,
    };

    let parsed = normalizado.parse::<f64>().ok()?;
    if !parsed.is_finite() {
        return None;
    }
    Some(parsed.max(0.0))
}
