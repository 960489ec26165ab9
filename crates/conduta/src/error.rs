use crate::avaliacao::AvaliacaoError;
use crate::config::ConfigError;
use crate::faia::FaiaReportError;
use crate::pdf::PdfError;
use crate::permissoes::PermissaoError;
use crate::reports::ReportError;
use crate::store::StoreError;
use crate::telemetry::TelemetryError;
use crate::transporte::import::ImportError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Store(StoreError),
    Import(ImportError),
    Avaliacao(AvaliacaoError),
    Pdf(PdfError),
    Report(ReportError),
    Faia(FaiaReportError),
    Permissao(PermissaoError),
    ConfigMissing(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Store(err) => write!(f, "store error: {}", err),
            AppError::Import(err) => write!(f, "import error: {}", err),
            AppError::Avaliacao(err) => write!(f, "peer-review error: {}", err),
            AppError::Pdf(err) => write!(f, "pdf error: {}", err),
            AppError::Report(err) => write!(f, "report error: {}", err),
            AppError::Faia(err) => write!(f, "faia report error: {}", err),
            AppError::Permissao(err) => write!(f, "permission error: {}", err),
            AppError::ConfigMissing(key) => write!(f, "missing configuration key '{}'", key),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Store(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Avaliacao(err) => Some(err),
            AppError::Pdf(err) => Some(err),
            AppError::Report(err) => Some(err),
            AppError::Faia(err) => Some(err),
            AppError::Permissao(err) => Some(err),
            AppError::ConfigMissing(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Permissao(PermissaoError::Negado { .. }) => StatusCode::FORBIDDEN,
            AppError::Import(_) | AppError::Avaliacao(_) => StatusCode::BAD_REQUEST,
            AppError::Store(StoreError::RowNotFound { .. }) => StatusCode::NOT_FOUND,
            AppError::Report(ReportError::SemMarcados(_)) | AppError::Pdf(PdfError::SemRegistros) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<ImportError> for AppError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

impl From<AvaliacaoError> for AppError {
    fn from(value: AvaliacaoError) -> Self {
        Self::Avaliacao(value)
    }
}

impl From<PdfError> for AppError {
    fn from(value: PdfError) -> Self {
        Self::Pdf(value)
    }
}

impl From<ReportError> for AppError {
    fn from(value: ReportError) -> Self {
        Self::Report(value)
    }
}

impl From<FaiaReportError> for AppError {
    fn from(value: FaiaReportError) -> Self {
        Self::Faia(value)
    }
}

impl From<PermissaoError> for AppError {
    fn from(value: PermissaoError) -> Self {
        Self::Permissao(value)
    }
}
