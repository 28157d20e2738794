use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use folio_core::PipelineError;
use tracing::error;

/// HTTP-facing wrapper over pipeline failures.
///
/// Each pipeline variant maps to one status; the body is the error's own
/// human-readable message, which already names the offending symbol or
/// condition.
#[derive(Debug)]
pub struct ApiError(pub PipelineError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            PipelineError::InvalidInput => StatusCode::BAD_REQUEST,
            PipelineError::DataRetrieval(_) => StatusCode::BAD_GATEWAY,
            PipelineError::SymbolNotFound { .. } => StatusCode::NOT_FOUND,
            PipelineError::NoValidData => StatusCode::BAD_REQUEST,
            PipelineError::EmptyReturns => StatusCode::BAD_REQUEST,
            PipelineError::AnalysisService(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(error: PipelineError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        error!(%status, "request failed: {}", self.0);
        (status, self.0.to_string()).into_response()
    }
}
