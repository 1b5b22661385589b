//! JSON extractor with automatic validation using the validator crate.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON extractor with automatic validation.
///
/// Deserializes the body, then runs the `validator::Validate` rules. Both
/// failure modes are reported through [`AppError`], so clients always get the
/// standard error body; validation failures carry per-field `details`.
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct Upload {
///     #[validate(url)]
///     image_url: String,
/// }
///
/// async fn upload(ValidatedJson(body): ValidatedJson<Upload>) -> StatusCode {
///     StatusCode::ACCEPTED
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        data.validate()?;
        Ok(ValidatedJson(data))
    }
}
