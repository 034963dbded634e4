use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::TypedHeader;
use axum_extra::typed_header::TypedHeaderRejection;
use headers::Authorization;
use headers::authorization::Bearer;

use crate::AppState;
use crate::error::AppError;
use crate::helpers;

/// Reject ingest requests without a configured bearer token. Runs before the
/// handler extracts the body.
pub(crate) async fn require_ingest_token(
    State(state): State<Arc<AppState>>,
    auth: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Ok(TypedHeader(auth)) = auth else {
        return Err(AppError::Unauthorized);
    };

    if !helpers::is_authorized(&state.ingest_token_hashes, auth.token()) {
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}
