//! Error taxonomy for store lookups and gateway responses

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

/// Failure reported by an object store backend
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),

    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything the gateway can answer with other than a served object
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("not found")]
    NotFound,

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("upstream failure: {0}")]
    Upstream(#[from] StoreError),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        // Store detail stays in the logs
        let body = match &self {
            Self::NotFound => "Not found",
            Self::MethodNotAllowed => "Method not allowed",
            Self::Upstream(e) => {
                tracing::error!("Error fetching from object store: {}", e);
                "Internal server error"
            }
        };

        let mut response = (self.status(), body).into_response();
        if matches!(self, Self::MethodNotAllowed) {
            response.headers_mut().insert(
                header::ALLOW,
                HeaderValue::from_static(crate::gateway::cors::ALLOWED_METHODS),
            );
        }
        response
    }
}
