//! HTTP mapping for paint rejections

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use pixelboard_core::PaintError;

/// Paint rejection rendered as a plain-text HTTP response
#[derive(Debug)]
pub struct PaintRejection(pub PaintError);

impl From<PaintError> for PaintRejection {
    fn from(err: PaintError) -> Self {
        Self(err)
    }
}

impl PaintRejection {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            PaintError::MissingToken => StatusCode::UNAUTHORIZED,
            PaintError::Cooling { .. } => StatusCode::FORBIDDEN,
            PaintError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            PaintError::PipelineClosed => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for PaintRejection {
    fn into_response(self) -> Response {
        if matches!(self.0, PaintError::PipelineClosed) {
            tracing::error!("Paint submitted after pipeline shut down");
        }

        (self.status(), self.0.to_string()).into_response()
    }
}
