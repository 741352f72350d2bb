//! Request handlers and wire types.

use crate::api::rest::error::ApiError;
use crate::api::rest::identity::RequestIdentity;
use crate::application::error::ApplicationError;
use crate::application::services::{
    AuditTrail, BookingWarning, BookingWorkflow, CreateBookingCommand, DEFAULT_INBOX_LIMIT,
    NotificationService, QuoteService,
};
use crate::domain::entities::{
    AuditAction, AuditLogEntry, Booking, CarrierRate, ConfirmOutcome, Notification, Quote,
    RateRequest,
};
use crate::domain::services::LocationResolver;
use crate::domain::value_objects::{
    BookingId, BookingStatus, CarrierId, LocationCode, NotificationId, OrganizationId, QuoteId,
    QuoteStatus, SubjectId, Timestamp,
};
use crate::infrastructure::persistence::AuditFilter;
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared handler state.
#[derive(Debug)]
pub struct AppState {
    /// Quote use cases.
    pub quotes: Arc<QuoteService>,
    /// Booking use cases.
    pub bookings: Arc<BookingWorkflow>,
    /// Inbox use cases.
    pub notifications: NotificationService,
    /// Audit queries.
    pub audit: AuditTrail,
    /// Location lookup.
    pub locations: LocationResolver,
}

type ApiResult<T> = Result<T, ApiError>;

fn require_subject(identity: &RequestIdentity) -> ApiResult<&SubjectId> {
    identity
        .0
        .subject
        .as_ref()
        .ok_or(ApiError::Application(ApplicationError::Unauthenticated))
}

// ---------------------------------------------------------------------------
// Health and locations
// ---------------------------------------------------------------------------

/// Health check body.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `healthy` when served.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Server time.
    pub timestamp: Timestamp,
}

/// `GET /api/v1/health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Timestamp::now(),
    })
}

/// Location lookup query.
#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    /// Free text.
    #[serde(default)]
    pub q: String,
}

/// Location lookup body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResolveResponse {
    /// The text as given.
    pub query: String,
    /// Resolved code.
    pub code: LocationCode,
}

/// `GET /api/v1/locations/resolve?q=`
pub async fn resolve_location(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ResolveQuery>, QueryRejection>,
) -> ApiResult<Json<ResolveResponse>> {
    let Query(query) = query?;
    let code = state
        .locations
        .resolve(&query.q)
        .ok_or_else(|| ApplicationError::not_found("Location", query.q.clone()))?;
    Ok(Json(ResolveResponse { query: query.q, code }))
}

// ---------------------------------------------------------------------------
// Quotes
// ---------------------------------------------------------------------------

/// Quote body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    /// Quote id.
    pub quote_id: QuoteId,
    /// Outcome.
    pub status: QuoteStatus,
    /// Rates, cheapest first.
    pub rates: Vec<CarrierRate>,
    /// Cheapest rate, if any.
    pub best_rate: Option<CarrierId>,
    /// The priced request.
    pub request: RateRequest,
    /// Creation time.
    pub created_at: Timestamp,
}

impl From<&Quote> for QuoteResponse {
    fn from(quote: &Quote) -> Self {
        Self {
            quote_id: quote.id().clone(),
            status: quote.status(),
            rates: quote.rates().to_vec(),
            best_rate: quote.best_rate().map(|r| r.carrier_id().clone()),
            request: quote.request().clone(),
            created_at: quote.created_at(),
        }
    }
}

/// Listing scope.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeQuery {
    /// List this organization instead of personal records.
    pub organization_id: Option<OrganizationId>,
}

/// `POST /api/v1/quotes`
pub async fn create_quote(
    State(state): State<Arc<AppState>>,
    identity: RequestIdentity,
    body: Result<Json<RateRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<QuoteResponse>)> {
    let Json(request) = body?;
    let quote = state.quotes.create_quote(&identity.0, request).await?;
    Ok((StatusCode::CREATED, Json(QuoteResponse::from(&quote))))
}

/// `GET /api/v1/quotes`
pub async fn list_quotes(
    State(state): State<Arc<AppState>>,
    identity: RequestIdentity,
    scope: Result<Query<ScopeQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<QuoteResponse>>> {
    let Query(scope) = scope?;
    let quotes = state
        .quotes
        .list_quotes(&identity.0, scope.organization_id.as_ref())
        .await?;
    Ok(Json(quotes.iter().map(QuoteResponse::from).collect()))
}

/// `GET /api/v1/quotes/{id}`
pub async fn get_quote(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<QuoteResponse>> {
    let quote = state.quotes.get_quote(&QuoteId::new(id)).await?;
    Ok(Json(QuoteResponse::from(&quote)))
}

// ---------------------------------------------------------------------------
// Bookings
// ---------------------------------------------------------------------------

/// Booking creation body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingResponse {
    /// New booking id.
    pub booking_id: BookingId,
    /// Advisory conditions.
    pub warnings: Vec<BookingWarning>,
    /// Stored booking.
    pub booking: Booking,
}

/// Approval body.
#[derive(Debug, Default, Deserialize)]
pub struct ApproveRequest {
    /// Reviewer notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Rejection body.
#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    /// Reason shown to the customer.
    #[serde(default)]
    pub reason: String,
}

/// Status overwrite body.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// New status.
    pub status: BookingStatus,
    /// Operator notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Payment confirmation body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentResponse {
    /// Booking id.
    pub booking_id: BookingId,
    /// False when the booking was already confirmed.
    pub changed: bool,
}

/// `POST /api/v1/bookings`
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    identity: RequestIdentity,
    body: Result<Json<CreateBookingCommand>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreateBookingResponse>)> {
    let Json(command) = body?;
    let outcome = state.bookings.create_booking(&identity.0, command).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateBookingResponse {
            booking_id: outcome.booking_id,
            warnings: outcome.warnings,
            booking: outcome.booking,
        }),
    ))
}

/// `GET /api/v1/bookings`
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    identity: RequestIdentity,
    scope: Result<Query<ScopeQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Booking>>> {
    let Query(scope) = scope?;
    let bookings = state
        .bookings
        .list_bookings(&identity.0, scope.organization_id.as_ref())
        .await?;
    Ok(Json(bookings))
}

/// `GET /api/v1/bookings/pending`
pub async fn list_pending_approvals(
    State(state): State<Arc<AppState>>,
    identity: RequestIdentity,
) -> ApiResult<Json<Vec<Booking>>> {
    Ok(Json(state.bookings.list_pending_approvals(&identity.0).await?))
}

/// `GET /api/v1/bookings/{id}`
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    identity: RequestIdentity,
    Path(id): Path<String>,
) -> ApiResult<Json<Booking>> {
    let booking = state
        .bookings
        .get_booking(&identity.0, &BookingId::new(id))
        .await?;
    Ok(Json(booking))
}

/// `POST /api/v1/bookings/{id}/approve`
pub async fn approve_booking(
    State(state): State<Arc<AppState>>,
    identity: RequestIdentity,
    Path(id): Path<String>,
    body: Option<Json<ApproveRequest>>,
) -> ApiResult<Json<Booking>> {
    let notes = body.and_then(|Json(b)| b.notes);
    let booking = state
        .bookings
        .approve_booking(&identity.0, &BookingId::new(id), notes)
        .await?;
    Ok(Json(booking))
}

/// `POST /api/v1/bookings/{id}/reject`
pub async fn reject_booking(
    State(state): State<Arc<AppState>>,
    identity: RequestIdentity,
    Path(id): Path<String>,
    body: Result<Json<RejectRequest>, JsonRejection>,
) -> ApiResult<Json<Booking>> {
    let Json(body) = body?;
    let booking = state
        .bookings
        .reject_booking(&identity.0, &BookingId::new(id), &body.reason)
        .await?;
    Ok(Json(booking))
}

/// `POST /api/v1/bookings/{id}/confirm-payment`
///
/// Accepts payment references (`PAY-…`, `INV-…`) as well as booking ids.
pub async fn confirm_payment(
    State(state): State<Arc<AppState>>,
    identity: RequestIdentity,
    Path(id): Path<String>,
) -> ApiResult<Json<ConfirmPaymentResponse>> {
    let booking_id = BookingId::from_reference(&id);
    let outcome = state.bookings.confirm_payment(&identity.0, &booking_id).await?;
    Ok(Json(ConfirmPaymentResponse {
        booking_id,
        changed: outcome == ConfirmOutcome::Confirmed,
    }))
}

/// `PUT /api/v1/bookings/{id}/status`
pub async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    identity: RequestIdentity,
    Path(id): Path<String>,
    body: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> ApiResult<Json<Booking>> {
    let Json(body) = body?;
    let booking = state
        .bookings
        .update_status(&identity.0, &BookingId::new(id), body.status, body.notes)
        .await?;
    Ok(Json(booking))
}

// ---------------------------------------------------------------------------
// Notifications and audit
// ---------------------------------------------------------------------------

/// Inbox query.
#[derive(Debug, Default, Deserialize)]
pub struct InboxQuery {
    /// Page size.
    pub limit: Option<usize>,
}

/// Inbox body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxResponse {
    /// Newest first.
    pub notifications: Vec<Notification>,
    /// Unread total, independent of the page size.
    pub unread_count: u64,
}

/// Mark-all body.
#[derive(Debug, Serialize)]
pub struct MarkAllResponse {
    /// Notifications that changed.
    pub updated: u64,
}

/// `GET /api/v1/notifications`
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    identity: RequestIdentity,
    query: Result<Query<InboxQuery>, QueryRejection>,
) -> ApiResult<Json<InboxResponse>> {
    let Query(query) = query?;
    let subject = require_subject(&identity)?;
    let limit = query.limit.unwrap_or(DEFAULT_INBOX_LIMIT);
    Ok(Json(InboxResponse {
        notifications: state.notifications.list(subject, limit).await?,
        unread_count: state.notifications.unread_count(subject).await?,
    }))
}

/// `POST /api/v1/notifications/{id}/read`
pub async fn mark_notification_read(
    State(state): State<Arc<AppState>>,
    identity: RequestIdentity,
    Path(id): Path<String>,
) -> ApiResult<Json<Notification>> {
    let subject = require_subject(&identity)?;
    let notification = state
        .notifications
        .mark_read(subject, &NotificationId::new(id))
        .await?;
    Ok(Json(notification))
}

/// `POST /api/v1/notifications/read-all`
pub async fn mark_all_notifications_read(
    State(state): State<Arc<AppState>>,
    identity: RequestIdentity,
) -> ApiResult<Json<MarkAllResponse>> {
    let subject = require_subject(&identity)?;
    let updated = state.notifications.mark_all_read(subject).await?;
    Ok(Json(MarkAllResponse { updated }))
}

/// Audit query.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditQuery {
    /// Entity type, e.g. `booking`.
    pub entity_type: Option<String>,
    /// Dotted action name, e.g. `booking.approved`.
    pub action: Option<AuditAction>,
    /// Maximum entries.
    pub limit: Option<usize>,
}

/// `GET /api/v1/audit`
pub async fn list_audit(
    State(state): State<Arc<AppState>>,
    identity: RequestIdentity,
    query: Result<Query<AuditQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<AuditLogEntry>>> {
    let Query(query) = query?;
    let filter = AuditFilter {
        entity_type: query.entity_type,
        action: query.action,
        limit: query.limit,
    };
    Ok(Json(state.audit.list(&identity.0, &filter).await?))
}
