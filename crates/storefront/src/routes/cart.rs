//! Cart availability endpoint.
//!
//! The visitor's cart lives in their browser. The server is only ever asked
//! which of a list of item IDs can still be bought.

use axum::{Json, extract::State};
use tracing::instrument;

use ximy_core::{ValidateRequest, ValidateResponse};

use crate::db::ItemRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::services::availability::{normalize_request, purchasable_ids};
use crate::state::AppState;

/// `POST /api/cart/validate`
///
/// Returns the requested IDs whose items are still `available`, in request
/// order. An empty list is answered without touching the database. Database
/// failures surface as 500 so clients fall back to their own policy.
#[instrument(skip(state, request), fields(requested = request.item_ids.len()))]
pub async fn validate(
    State(state): State<AppState>,
    Json(request): Json<ValidateRequest>,
) -> Result<Json<ValidateResponse>> {
    let ids = normalize_request(&request.item_ids)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if ids.is_empty() {
        return Ok(Json(ValidateResponse::default()));
    }

    let rows = ItemRepository::new(state.pool()).availability(&ids).await?;
    let valid_ids = purchasable_ids(&ids, &rows);

    let checked = ids.len().to_string();
    let valid = valid_ids.len().to_string();
    add_breadcrumb(
        "cart",
        "Validated cart items",
        Some(&[("checked", checked.as_str()), ("valid", valid.as_str())]),
    );

    Ok(Json(ValidateResponse { valid_ids }))
}
