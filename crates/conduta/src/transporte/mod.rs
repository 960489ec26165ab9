//! Transport-allowance calculator: deterministic arithmetic over
//! itineraries, workdays, and the 6%-of-base beneficiary share.

pub mod import;
mod money;

pub use money::{parse_valor_monetario, round2};

use serde::Serialize;

use crate::domain::RegistroTransporte;

/// Workday cap applied after clamping negatives to zero.
pub const MAX_DIAS_UTEIS: i64 = 22;

/// Fraction of base pay charged to the beneficiary per month.
const COTA_SOLDO: f64 = 0.06;

/// Full breakdown of one subject's monthly allowance. Monetary fields
/// are already rounded to two decimal places.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculoTransporte {
    pub numero_interno: String,
    pub despesa_diaria: f64,
    pub dias_uteis: i64,
    pub despesa_mensal: f64,
    pub cota_beneficiario: f64,
    pub valor_liquido: f64,
}

/// Computes the allowance for one registration. `soldo` is the base
/// monthly pay for the subject's rank, zero when unresolvable.
pub fn calcular(registro: &RegistroTransporte, soldo: f64) -> CalculoTransporte {
    let despesa_diaria: f64 = registro
        .idas
        .iter()
        .chain(registro.voltas.iter())
        .map(|trecho| trecho.tarifa.max(0.0))
        .sum();

    let dias_uteis = registro.dias_uteis.clamp(0, MAX_DIAS_UTEIS);
    let despesa_mensal = despesa_diaria * dias_uteis as f64;

    let cota_beneficiario = if soldo > 0.0 && dias_uteis > 0 {
        ((soldo * COTA_SOLDO) / 30.0) * dias_uteis as f64
    } else {
        0.0
    };

    let valor_liquido = (despesa_mensal - cota_beneficiario).max(0.0);

    CalculoTransporte {
        numero_interno: registro.numero_interno.clone(),
        despesa_diaria: round2(despesa_diaria),
        dias_uteis,
        despesa_mensal: round2(despesa_mensal),
        cota_beneficiario: round2(cota_beneficiario),
        valor_liquido: round2(valor_liquido),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Trecho;

    fn trecho(tarifa: f64) -> Trecho {
        Trecho {
            empresa: "VIACAO".to_string(),
            linha: "101".to_string(),
            tarifa,
        }
    }

    fn registro(dias_uteis: i64, idas: Vec<Trecho>, voltas: Vec<Trecho>) -> RegistroTransporte {
        RegistroTransporte {
            numero_interno: "M-1".to_string(),
            ano_referencia: "2025".to_string(),
            dias_uteis,
            idas,
            voltas,
            ..Default::default()
        }
    }

    #[test]
    fn two_leg_commute_with_full_month() {
        // daily 15.00, monthly 330.00, share 132.00, net 198.00
        let registro = registro(
            22,
            vec![trecho(4.50), trecho(3.00)],
            vec![trecho(4.50), trecho(3.00)],
        );
        let calculo = calcular(&registro, 3000.0);
        assert_eq!(calculo.despesa_diaria, 15.0);
        assert_eq!(calculo.despesa_mensal, 330.0);
        assert_eq!(calculo.cota_beneficiario, 132.0);
        assert_eq!(calculo.valor_liquido, 198.0);
    }

    #[test]
    fn workdays_clamp_to_twenty_two() {
        let registro = registro(
            30,
            vec![trecho(4.50), trecho(3.00)],
            vec![trecho(4.50), trecho(3.00)],
        );
        let calculo = calcular(&registro, 3000.0);
        assert_eq!(calculo.dias_uteis, 22);
        assert_eq!(calculo.valor_liquido, 198.0);
    }

    #[test]
    fn negative_workdays_clamp_to_zero() {
        let registro = registro(-3, vec![trecho(4.50)], vec![trecho(4.50)]);
        let calculo = calcular(&registro, 3000.0);
        assert_eq!(calculo.dias_uteis, 0);
        assert_eq!(calculo.despesa_mensal, 0.0);
        assert_eq!(calculo.cota_beneficiario, 0.0);
        assert_eq!(calculo.valor_liquido, 0.0);
    }

    #[test]
    fn missing_soldo_waives_the_beneficiary_share() {
        let registro = registro(20, vec![trecho(5.0)], vec![trecho(5.0)]);
        let calculo = calcular(&registro, 0.0);
        assert_eq!(calculo.cota_beneficiario, 0.0);
        assert_eq!(calculo.valor_liquido, 200.0);
    }

    #[test]
    fn net_allowance_never_goes_negative() {
        let registro = registro(22, vec![trecho(0.10)], vec![]);
        let calculo = calcular(&registro, 10_000.0);
        assert_eq!(calculo.valor_liquido, 0.0);
    }

    #[test]
    fn monthly_expense_is_daily_times_workdays() {
        let registro = registro(13, vec![trecho(2.75), trecho(1.25)], vec![trecho(4.0)]);
        let calculo = calcular(&registro, 0.0);
        assert_eq!(calculo.despesa_mensal, round2(8.0 * 13.0));
    }
}
