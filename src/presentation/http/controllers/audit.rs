// src/presentation/http/controllers/audit.rs
use crate::application::dto::AuditRecordDto;
use crate::application::error::ApplicationError;
use crate::domain::audit::EntityTypeId;
use crate::presentation::http::error::{HttpResult, IntoHttpResult};
use crate::presentation::http::state::HttpState;
use axum::{Extension, Json, extract::Path};

/// `GET /api/v1/audit/{entity_type}/{entity_id}`: newest first.
pub async fn entity_history(
    Extension(state): Extension<HttpState>,
    Path((entity_type, entity_id)): Path<(String, String)>,
) -> HttpResult<Json<Vec<AuditRecordDto>>> {
    let entity_type = EntityTypeId::new(&entity_type)
        .map_err(ApplicationError::from)
        .into_http()?;
    let records = state
        .services
        .queries
        .history_for(&entity_type, &entity_id)
        .await
        .into_http()?;
    Ok(Json(records.into_iter().map(AuditRecordDto::from).collect()))
}
