//! Visitor analytics endpoints: inquiry clicks and detail page views.
//!
//! Both take the same body and answer the same way, so a visitor's ID can be
//! minted by whichever call comes first and reused by the other.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use ximy_core::{ItemId, VisitorId};

use crate::db::{ClickRepository, ViewRepository};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Response header carrying the visitor ID the event was recorded under.
pub const VISITOR_ID_HEADER: &str = "x-visitor-id";

const MAX_VISITOR_ID_LEN: usize = 64;

/// Body of `POST /api/whatsapp/clicks` and `POST /api/views`.
#[derive(Debug, Deserialize)]
pub struct TrackRequest {
    pub item_id: ItemId,
    #[serde(default)]
    pub visitor_id: Option<VisitorId>,
}

/// `POST /api/whatsapp/clicks`
///
/// Records an inquiry button click and answers 204 with the visitor ID in
/// [`VISITOR_ID_HEADER`]. A visitor without an ID gets a fresh one.
#[instrument(skip(state, request), fields(item_id = %request.item_id))]
pub async fn record_click(
    State(state): State<AppState>,
    Json(request): Json<TrackRequest>,
) -> Result<impl IntoResponse> {
    let visitor = validate(request.item_id.as_str(), request.visitor_id)?;

    ClickRepository::new(state.pool())
        .record(&request.item_id, &visitor)
        .await?;

    Ok(recorded(visitor))
}

/// `POST /api/views`
///
/// Records a detail page view. Same contract as [`record_click`].
#[instrument(skip(state, request), fields(item_id = %request.item_id))]
pub async fn record_view(
    State(state): State<AppState>,
    Json(request): Json<TrackRequest>,
) -> Result<impl IntoResponse> {
    let visitor = validate(request.item_id.as_str(), request.visitor_id)?;

    ViewRepository::new(state.pool())
        .record(&request.item_id, &visitor)
        .await?;

    Ok(recorded(visitor))
}

fn validate(item_id: &str, visitor_id: Option<VisitorId>) -> Result<VisitorId> {
    if Uuid::parse_str(item_id).is_err() {
        return Err(AppError::BadRequest("item_id must be a UUID".to_string()));
    }
    resolve_visitor(visitor_id)
}

fn recorded(visitor: VisitorId) -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [(VISITOR_ID_HEADER, visitor.into_inner())],
    )
}

/// Use the visitor's own ID if they sent a usable one.
fn resolve_visitor(visitor_id: Option<VisitorId>) -> Result<VisitorId> {
    match visitor_id {
        Some(id) if id.as_str().len() > MAX_VISITOR_ID_LEN => Err(AppError::BadRequest(format!(
            "visitor_id longer than {MAX_VISITOR_ID_LEN} characters"
        ))),
        Some(id) if !id.as_str().trim().is_empty() => Ok(id),
        _ => Ok(VisitorId::generate()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_or_blank_visitor_gets_generated_id() {
        for input in [None, Some(VisitorId::new("")), Some(VisitorId::new("   "))] {
            let visitor = resolve_visitor(input).unwrap();
            assert_eq!(visitor.as_str().len(), VisitorId::BYTES * 2);
        }
    }

    #[test]
    fn test_existing_visitor_is_kept() {
        let id = VisitorId::new("3f2a9c0d1e7b4a65b8c9d0e1f2a3b4c5");
        assert_eq!(resolve_visitor(Some(id.clone())).unwrap(), id);
    }

    #[test]
    fn test_oversized_visitor_is_rejected() {
        let id = VisitorId::new("f".repeat(MAX_VISITOR_ID_LEN + 1));
        assert!(matches!(
            resolve_visitor(Some(id)),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_non_uuid_item_is_rejected_before_visitor() {
        assert!(matches!(
            validate("levi-s-501-denim-jacket", None),
            Err(AppError::BadRequest(msg)) if msg == "item_id must be a UUID"
        ));
        assert!(validate("0b7c6f1e-8d0a-4c55-9a51-2f1f6d3c9e11", None).is_ok());
    }

    #[test]
    fn test_track_request_visitor_is_optional() {
        let request: TrackRequest =
            serde_json::from_str(r#"{"item_id":"0b7c6f1e-8d0a-4c55-9a51-2f1f6d3c9e11"}"#).unwrap();
        assert!(request.visitor_id.is_none());
    }
}
