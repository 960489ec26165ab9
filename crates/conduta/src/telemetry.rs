//! Tracing bootstrap. The filter comes from `CONDUTA_LOG` when set,
//! otherwise from the configured level; output is compact and
//! ANSI-free for journal capture.

use crate::config::TelemetryConfig;
use std::env;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the configured log filter.
pub const FILTRO_ENV: &str = "CONDUTA_LOG";

#[derive(Debug)]
pub enum TelemetryError {
    Filtro { valor: String, source: ParseError },
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::Filtro { valor, .. } => {
                write!(f, "invalid log filter '{valor}'")
            }
            TelemetryError::Subscriber(err) => write!(f, "telemetry error: {err}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::Filtro { source, .. } => Some(source),
            TelemetryError::Subscriber(err) => Some(&**err),
        }
    }
}

fn filtro(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    let valor = env::var(FILTRO_ENV).unwrap_or_else(|_| config.log_level.clone());
    EnvFilter::try_new(&valor).map_err(|source| TelemetryError::Filtro { valor, source })
}

pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    tracing_subscriber::fmt()
        .with_env_filter(filtro(config)?)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}
