//! Display ordering for internal numbers. A `numero_interno` carries up
//! to three dash-separated parts (`M-2-15`): the first compares
//! lexicographically, later parts numerically with zero as the default
//! for missing or non-numeric parts. The resulting order is total, and
//! stable sorts preserve insertion order on ties.

/// Sort key for a `numero_interno`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ChaveNumeroInterno {
    prefixo: String,
    segunda: i64,
    terceira: i64,
}

impl ChaveNumeroInterno {
    pub fn parse(numero_interno: &str) -> Self {
        let mut parts = numero_interno.trim().splitn(3, '-');
        let prefixo = parts
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_uppercase();
        let segunda = numeric_part(parts.next());
        let terceira = numeric_part(parts.next());
        Self {
            prefixo,
            segunda,
            terceira,
        }
    }
}

fn numeric_part(part: Option<&str>) -> i64 {
    part.and_then(|p| p.trim().parse::<i64>().ok()).unwrap_or(0)
}

/// Stable sort by parsed internal number; `numero` extracts the raw
/// string from each item.
pub fn ordenar_por_numero_interno<T, F>(items: &mut [T], numero: F)
where
    F: Fn(&T) -> &str,
{
    items.sort_by_key(|item| ChaveNumeroInterno::parse(numero(item)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_part_compares_lexicographically() {
        let m = ChaveNumeroInterno::parse("M-1");
        let q = ChaveNumeroInterno::parse("Q-1");
        assert!(m < q);
    }

    #[test]
    fn later_parts_compare_numerically_not_textually() {
        let two = ChaveNumeroInterno::parse("M-2");
        let ten = ChaveNumeroInterno::parse("M-10");
        assert!(two < ten, "numeric 2 sorts before 10");
    }

    #[test]
    fn missing_parts_default_to_zero() {
        let bare = ChaveNumeroInterno::parse("M");
        let first = ChaveNumeroInterno::parse("M-1");
        assert!(bare < first);
        assert_eq!(bare, ChaveNumeroInterno::parse("M-x"));
    }

    #[test]
    fn three_part_numbers_order_by_each_level() {
        let mut numeros = vec!["Q-1-2", "M-2-10", "M-2-3", "M-1-9"];
        ordenar_por_numero_interno(&mut numeros, |n| n);
        assert_eq!(numeros, vec!["M-1-9", "M-2-3", "M-2-10", "Q-1-2"]);
    }

    #[test]
    fn equal_keys_preserve_insertion_order() {
        let mut pares = vec![("M-1", "primeiro"), ("M-01x", "segundo"), ("M-1", "terceiro")];
        ordenar_por_numero_interno(&mut pares, |(n, _)| n);
        // "M-01x" parses its second part to 0, so it moves first; the
        // two "M-1" entries keep their relative order.
        assert_eq!(
            pares,
            vec![("M-01x", "segundo"), ("M-1", "primeiro"), ("M-1", "terceiro")]
        );
    }
}
