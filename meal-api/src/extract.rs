//! Request body extraction
//!
//! `ApiJson` wraps `axum::Json` so a body that fails to parse is answered
//! with the same `{code, message}` 400 as every other validation failure.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// JSON body extractor with ledger-style rejections
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let message = rejection.body_text();
        // serde_path_to_error prefixes the failing field: "...: quantity: invalid type"
        let code = match rejection {
            JsonRejection::JsonDataError(_) if message.contains("quantity:") => {
                "INVALID_QUANTITY"
            }
            _ => "VALIDATION_ERROR",
        };
        ApiError::InvalidBody { code, message }
    }
}
