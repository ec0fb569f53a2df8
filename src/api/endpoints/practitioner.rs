//! Practitioner endpoints: login, schedule management, visit completion and
//! the public directory listing.

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::endpoints::TokenResponse;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::auth::Principal;
use crate::credentials::verify_credential;
use crate::dashboard::{practitioner_dashboard, PractitionerDashboard};
use crate::db::repository;
use crate::models::{ActorRole, Address, Appointment, Practitioner, SlotMap};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /api/practitioner/login`
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let conn = ctx.state.open_db()?;
    let practitioner = repository::find_practitioner_by_email(&conn, &req.email)?
        .ok_or(ApiError::InvalidCredentials)?;
    if !verify_credential(&req.password, &practitioner.credential_hash) {
        return Err(ApiError::InvalidCredentials);
    }

    let token = ctx
        .state
        .issue_token(Principal::practitioner(practitioner.id))?;
    Ok(Json(TokenResponse { token }))
}

/// Directory entry shown to patients: contact details stay private.
#[derive(Debug, Serialize)]
pub struct PractitionerListing {
    pub id: Uuid,
    pub name: String,
    pub image: String,
    pub speciality: String,
    pub degree: String,
    pub experience: String,
    pub about: String,
    pub available: bool,
    pub fee: f64,
    pub address: Address,
    pub slots_booked: SlotMap,
}

impl From<Practitioner> for PractitionerListing {
    fn from(p: Practitioner) -> Self {
        Self {
            id: p.id,
            name: p.name,
            image: p.image,
            speciality: p.speciality,
            degree: p.degree,
            experience: p.experience,
            about: p.about,
            available: p.available,
            fee: p.fee,
            address: p.address,
            slots_booked: p.slots_booked,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DirectoryResponse {
    pub practitioners: Vec<PractitionerListing>,
}

/// `GET /api/practitioners` — public directory for the booking flow.
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<DirectoryResponse>, ApiError> {
    let conn = ctx.state.open_db()?;
    let practitioners = repository::list_practitioners(&conn)?
        .into_iter()
        .map(PractitionerListing::from)
        .collect();
    Ok(Json(DirectoryResponse { practitioners }))
}

#[derive(Debug, Serialize)]
pub struct AppointmentsResponse {
    pub appointments: Vec<Appointment>,
}

/// `GET /api/practitioner/appointments`
pub async fn appointments(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    let practitioner_id = principal.actor_id(ActorRole::Practitioner)?;
    let conn = ctx.state.open_db()?;
    let appointments = repository::list_by_practitioner(&conn, &practitioner_id)?;
    Ok(Json(AppointmentsResponse { appointments }))
}

#[derive(Debug, Deserialize)]
pub struct AppointmentActionRequest {
    pub appointment_id: Uuid,
}

/// `POST /api/practitioner/cancel` — cancel a visit booked with this
/// practitioner.
pub async fn cancel(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<AppointmentActionRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let practitioner_id = principal.actor_id(ActorRole::Practitioner)?;
    let conn = ctx.state.open_db()?;
    ctx.state.booking.cancel(
        &conn,
        &req.appointment_id,
        Some(&practitioner_id),
        &ActorRole::Practitioner,
    )?;
    Ok(Json(serde_json::json!({ "message": "Appointment cancelled" })))
}

/// `POST /api/practitioner/complete` — mark a visit as done.
pub async fn complete(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<AppointmentActionRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let practitioner_id = principal.actor_id(ActorRole::Practitioner)?;
    let conn = ctx.state.open_db()?;
    ctx.state
        .booking
        .complete(&conn, &req.appointment_id, &practitioner_id)?;
    Ok(Json(serde_json::json!({ "message": "Appointment completed" })))
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub available: bool,
}

/// `POST /api/practitioner/availability` — toggle own availability.
pub async fn toggle_availability(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let practitioner_id = principal.actor_id(ActorRole::Practitioner)?;
    let conn = ctx.state.open_db()?;
    let available = ctx
        .state
        .booking
        .toggle_availability(&conn, &practitioner_id)?;
    Ok(Json(AvailabilityResponse { available }))
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub practitioner: Practitioner,
}

/// `GET /api/practitioner/profile`
pub async fn profile(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let practitioner_id = principal.actor_id(ActorRole::Practitioner)?;
    let conn = ctx.state.open_db()?;
    let practitioner = repository::get_practitioner(&conn, &practitioner_id)?
        .ok_or_else(|| ApiError::NotFound("Practitioner not found".into()))?;
    Ok(Json(ProfileResponse { practitioner }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub fee: f64,
    #[serde(default)]
    pub address: Address,
    pub available: bool,
}

/// `POST /api/practitioner/profile` — update fee, address, availability.
pub async fn update_profile(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let practitioner_id = principal.actor_id(ActorRole::Practitioner)?;
    let conn = ctx.state.open_db()?;
    repository::update_practitioner_profile(
        &conn,
        &practitioner_id,
        req.fee,
        &req.address,
        req.available,
    )?;
    Ok(Json(serde_json::json!({ "message": "Profile updated" })))
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub dashboard: PractitionerDashboard,
}

/// `GET /api/practitioner/dashboard`
pub async fn dashboard(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let practitioner_id = principal.actor_id(ActorRole::Practitioner)?;
    let conn = ctx.state.open_db()?;
    let dashboard = practitioner_dashboard(&conn, &practitioner_id)?;
    Ok(Json(DashboardResponse { dashboard }))
}
