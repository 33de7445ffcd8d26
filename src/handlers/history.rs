//! Search history endpoint handlers.

use crate::{
    models::{
        CreateHistoryRequest, CreateHistoryResponse, DeleteHistoryRequest, DeleteHistoryResponse,
        HistoryEntryResponse, NewSearchHistory,
    },
    middleware::RequestId,
    services::history::HistoryGateway,
};
use actix_web::{Error, HttpRequest, HttpResponse, Result, web};
use paperclip::actix::api_v2_operation;

/// Record a search
///
/// All fields are validated before the history store is contacted.
#[api_v2_operation(
    summary = "Create Search History Entry",
    description = "Records a searched location with its temperature. userId is optional; anonymous searches are stored for the guest user.",
    tags("History"),
    responses(
        (status = 201, description = "Entry created", body = CreateHistoryResponse),
        (status = 400, description = "Bad Request - Missing or non-numeric fields"),
        (status = 500, description = "Internal Server Error - History store not configured"),
        (status = 502, description = "Bad Gateway - History store failed")
    )
)]
pub async fn create_history(
    body: web::Json<CreateHistoryRequest>,
    gateway: web::Data<HistoryGateway>,
) -> Result<HttpResponse, Error> {
    let body = body.into_inner();
    let entry = NewSearchHistory::new(
        body.location_name.as_deref(),
        body.lat,
        body.lon,
        body.temperature,
        body.user_id.as_deref(),
    )?;

    let id = gateway.create(entry).await?;

    Ok(HttpResponse::Created().json(CreateHistoryResponse { success: true, id }))
}

#[api_v2_operation(
    summary = "List Search History",
    description = "Returns every recorded search, newest first.",
    tags("History"),
    responses(
        (status = 200, description = "History entries", body = Vec<HistoryEntryResponse>),
        (status = 500, description = "Internal Server Error - History store not configured"),
        (status = 502, description = "Bad Gateway - History store failed")
    )
)]
pub async fn list_history(
    gateway: web::Data<HistoryGateway>,
) -> Result<web::Json<Vec<HistoryEntryResponse>>, Error> {
    let records = gateway.list().await?;
    Ok(web::Json(
        records.iter().map(HistoryEntryResponse::from).collect(),
    ))
}

#[api_v2_operation(
    summary = "Delete Search History Entry",
    description = "Deletes one entry by id, passed as {\"entryId\": \"...\"} in the request body.",
    tags("History"),
    responses(
        (status = 200, description = "Entry deleted", body = DeleteHistoryResponse),
        (status = 400, description = "Bad Request - Missing entryId"),
        (status = 502, description = "Bad Gateway - History store failed or entry unknown")
    )
)]
pub async fn delete_history(
    req: HttpRequest,
    body: web::Json<DeleteHistoryRequest>,
    gateway: web::Data<HistoryGateway>,
) -> Result<web::Json<DeleteHistoryResponse>, Error> {
    let entry_id = body.entry_id.as_deref().unwrap_or_default();

    if let Err(e) = gateway.delete(entry_id).await {
        tracing::warn!(
            request_id = ?RequestId::of(&req),
            entry_id = %entry_id,
            error = %e,
            "Failed to delete search history entry"
        );
        return Err(e.into());
    }

    Ok(web::Json(DeleteHistoryResponse {
        success: true,
        message: "Search history deleted successfully".to_string(),
    }))
}
