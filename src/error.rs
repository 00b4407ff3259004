use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use crate::database::StoreError;

/// Errors surfaced by the HTTP handlers.
///
/// Client errors render as `{"message": ..}`; store failures are logged and
/// answered with a generic plain-text message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("ID do evento é necessário.")]
    MissingId,
    #[error("Evento não encontrado.")]
    NotFound,
    #[error("{context}")]
    Store {
        context: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    pub fn store(context: &'static str, source: StoreError) -> Self {
        ApiError::Store { context, source }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::MissingId => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "message": self.to_string() })),
            )
                .into_response(),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "message": self.to_string() })),
            )
                .into_response(),
            ApiError::Store { context, source } => {
                tracing::error!("{}: {:?}", context, source);
                (StatusCode::INTERNAL_SERVER_ERROR, context).into_response()
            }
        }
    }
}
