//! Admin endpoints: env-credentialed login, practitioner onboarding and
//! oversight of every appointment.

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::endpoints::{store_avatar, validate_credentials, AvatarUpload, TokenResponse};
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::auth::Principal;
use crate::credentials::hash_credential;
use crate::dashboard::{admin_dashboard, AdminDashboard};
use crate::db::repository;
use crate::models::{ActorRole, Address, Appointment, Practitioner};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /api/admin/login` — the admin identity lives in configuration, not
/// the identity store.
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let config = &ctx.state.config;
    if req.email != config.admin_email || req.password != config.admin_password {
        return Err(ApiError::InvalidCredentials);
    }

    let token = ctx.state.issue_token(Principal::admin())?;
    Ok(Json(TokenResponse { token }))
}

#[derive(Debug, Deserialize)]
pub struct AddPractitionerRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub speciality: String,
    pub degree: String,
    pub experience: String,
    pub about: String,
    pub fee: f64,
    #[serde(default)]
    pub address: Address,
    pub image: AvatarUpload,
}

#[derive(Debug, Serialize)]
pub struct AddPractitionerResponse {
    pub practitioner_id: Uuid,
}

/// `POST /api/admin/practitioners` — onboard a practitioner.
pub async fn add_practitioner(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<AddPractitionerRequest>,
) -> Result<Json<AddPractitionerResponse>, ApiError> {
    principal.require_admin()?;

    let required = [
        &req.name,
        &req.speciality,
        &req.degree,
        &req.experience,
        &req.about,
    ];
    if required.iter().any(|field| field.trim().is_empty()) || req.fee <= 0.0 {
        return Err(ApiError::BadRequest("Missing details".into()));
    }
    validate_credentials(&req.email, &req.password)?;

    let hash = hash_credential(&req.password)?;
    let image_url = store_avatar(&ctx.state.avatars, &req.image)?;
    let practitioner = Practitioner::new(
        req.name.trim(),
        &req.email,
        &hash,
        &image_url,
        &req.speciality,
        &req.degree,
        &req.experience,
        &req.about,
        req.fee,
        req.address.clone(),
    );

    let conn = ctx.state.open_db()?;
    repository::insert_practitioner(&conn, &practitioner)?;
    Ok(Json(AddPractitionerResponse {
        practitioner_id: practitioner.id,
    }))
}

#[derive(Debug, Serialize)]
pub struct PractitionersResponse {
    pub practitioners: Vec<Practitioner>,
}

/// `GET /api/admin/practitioners` — full records (credential hashes are
/// never serialized).
pub async fn list_practitioners(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<PractitionersResponse>, ApiError> {
    principal.require_admin()?;
    let conn = ctx.state.open_db()?;
    let practitioners = repository::list_practitioners(&conn)?;
    Ok(Json(PractitionersResponse { practitioners }))
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    pub practitioner_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub available: bool,
}

/// `POST /api/admin/availability` — toggle any practitioner.
pub async fn toggle_availability(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<AvailabilityRequest>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    principal.require_admin()?;
    let conn = ctx.state.open_db()?;
    let available = ctx
        .state
        .booking
        .toggle_availability(&conn, &req.practitioner_id)?;
    Ok(Json(AvailabilityResponse { available }))
}

#[derive(Debug, Serialize)]
pub struct AppointmentsResponse {
    pub appointments: Vec<Appointment>,
}

/// `GET /api/admin/appointments` — every booking in the system.
pub async fn appointments(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    principal.require_admin()?;
    let conn = ctx.state.open_db()?;
    let appointments = repository::list_all(&conn)?;
    Ok(Json(AppointmentsResponse { appointments }))
}

#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub appointment_id: Uuid,
}

/// `POST /api/admin/cancel` — cancel any appointment; the admin role
/// bypasses ownership.
pub async fn cancel(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CancelRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    principal.require_admin()?;
    let conn = ctx.state.open_db()?;
    ctx.state
        .booking
        .cancel(&conn, &req.appointment_id, None, &ActorRole::Admin)?;
    Ok(Json(serde_json::json!({ "message": "Appointment cancelled" })))
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub dashboard: AdminDashboard,
}

/// `GET /api/admin/dashboard`
pub async fn dashboard(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<DashboardResponse>, ApiError> {
    principal.require_admin()?;
    let conn = ctx.state.open_db()?;
    let dashboard = admin_dashboard(&conn)?;
    Ok(Json(DashboardResponse { dashboard }))
}
