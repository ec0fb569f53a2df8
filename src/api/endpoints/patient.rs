//! Patient endpoints: registration, login, profile, booking and payment
//! entry points for the patient role.

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::endpoints::{store_avatar, validate_credentials, AvatarUpload, TokenResponse};
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::auth::Principal;
use crate::credentials::{hash_credential, verify_credential};
use crate::db::repository;
use crate::models::{ActorRole, Address, Appointment, Patient};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// `POST /api/patient/register` — create an account and log in.
pub async fn register(
    State(ctx): State<ApiContext>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Missing details".into()));
    }
    validate_credentials(&req.email, &req.password)?;

    let hash = hash_credential(&req.password)?;
    let patient = Patient::new(req.name.trim(), &req.email, &hash);

    let conn = ctx.state.open_db()?;
    repository::insert_patient(&conn, &patient)?;

    let token = ctx.state.issue_token(Principal::patient(patient.id))?;
    Ok(Json(TokenResponse { token }))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /api/patient/login`
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let conn = ctx.state.open_db()?;
    let patient = repository::find_patient_by_email(&conn, &req.email)?
        .ok_or(ApiError::InvalidCredentials)?;
    if !verify_credential(&req.password, &patient.credential_hash) {
        return Err(ApiError::InvalidCredentials);
    }

    let token = ctx.state.issue_token(Principal::patient(patient.id))?;
    Ok(Json(TokenResponse { token }))
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub patient: Patient,
}

/// `GET /api/patient/profile`
pub async fn profile(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let patient_id = principal.actor_id(ActorRole::Patient)?;
    let conn = ctx.state.open_db()?;
    let patient = repository::get_patient(&conn, &patient_id)?
        .ok_or_else(|| ApiError::NotFound("Patient not found".into()))?;
    Ok(Json(ProfileResponse { patient }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub address: Address,
    pub dob: String,
    pub gender: String,
    #[serde(default)]
    pub image: Option<AvatarUpload>,
}

/// `POST /api/patient/profile` — update profile, optionally replacing the
/// avatar.
pub async fn update_profile(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let patient_id = principal.actor_id(ActorRole::Patient)?;
    if req.name.trim().is_empty()
        || req.phone.trim().is_empty()
        || req.dob.trim().is_empty()
        || req.gender.trim().is_empty()
    {
        return Err(ApiError::BadRequest("Data missing".into()));
    }

    let image_url = match &req.image {
        Some(upload) => Some(store_avatar(&ctx.state.avatars, upload)?),
        None => None,
    };

    let conn = ctx.state.open_db()?;
    repository::update_patient_profile(
        &conn,
        &patient_id,
        req.name.trim(),
        &req.phone,
        &req.address,
        &req.dob,
        &req.gender,
        image_url.as_deref(),
    )?;
    Ok(Json(serde_json::json!({ "message": "Profile updated" })))
}

#[derive(Debug, Serialize)]
pub struct AppointmentsResponse {
    pub appointments: Vec<Appointment>,
}

/// `GET /api/patient/appointments` — the patient's own appointments.
pub async fn appointments(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    let patient_id = principal.actor_id(ActorRole::Patient)?;
    let conn = ctx.state.open_db()?;
    let appointments = repository::list_by_patient(&conn, &patient_id)?;
    Ok(Json(AppointmentsResponse { appointments }))
}

#[derive(Debug, Deserialize)]
pub struct BookRequest {
    pub practitioner_id: Uuid,
    pub slot_date: String,
    pub slot_time: String,
}

#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub appointment_id: Uuid,
}

/// `POST /api/patient/book`
pub async fn book(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<BookRequest>,
) -> Result<Json<BookResponse>, ApiError> {
    let patient_id = principal.actor_id(ActorRole::Patient)?;
    let conn = ctx.state.open_db()?;
    let appointment = ctx.state.booking.book(
        &conn,
        &patient_id,
        &req.practitioner_id,
        &req.slot_date,
        &req.slot_time,
    )?;
    Ok(Json(BookResponse {
        appointment_id: appointment.id,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub appointment_id: Uuid,
}

/// `POST /api/patient/cancel`
pub async fn cancel(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CancelRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let patient_id = principal.actor_id(ActorRole::Patient)?;
    let conn = ctx.state.open_db()?;
    ctx.state.booking.cancel(
        &conn,
        &req.appointment_id,
        Some(&patient_id),
        &ActorRole::Patient,
    )?;
    Ok(Json(serde_json::json!({ "message": "Appointment cancelled" })))
}
