use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Json, Response},
};

use crate::models::Fields;

/// Event fields from a request body.
///
/// Requests without a body, or whose body is not declared as JSON, carry no
/// fields. A declared JSON body must parse into an object.
#[derive(Debug)]
pub struct EventBody(pub Fields);

fn is_json(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

#[async_trait]
impl<S> FromRequest<S> for EventBody
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_json(&req) {
            return Ok(EventBody(Fields::new()));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(EventBody(Fields::new()));
        }

        let Json(fields) = Json::<Fields>::from_bytes(&bytes).map_err(IntoResponse::into_response)?;
        Ok(EventBody(fields))
    }
}
