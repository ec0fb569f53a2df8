//! Payment endpoints.
//!
//! Charges are created against an existing, non-cancelled appointment.
//! Confirmation trusts the gateway's own verification flow and marks the
//! appointment paid without re-checking slot state or ownership.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository::get_appointment;
use crate::models::Appointment;
use crate::payments::{ChargeIntent, PaymentError};

#[derive(Debug, Deserialize)]
pub struct ChargeRequest {
    pub appointment_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ChargeResponse {
    pub charge: ChargeIntent,
}

/// Chargeable = exists and not cancelled.
fn chargeable_appointment(
    ctx: &ApiContext,
    appointment_id: &Uuid,
) -> Result<Appointment, ApiError> {
    let conn = ctx.state.open_db()?;
    let appointment = get_appointment(&conn, appointment_id)?
        .ok_or_else(|| ApiError::NotFound("Appointment not found".into()))?;
    if appointment.cancelled {
        return Err(ApiError::Conflict("Appointment cancelled".into()));
    }
    Ok(appointment)
}

/// `POST /api/payment/razorpay` — create a gateway order for the fee.
pub async fn razorpay_order(
    State(ctx): State<ApiContext>,
    Json(req): Json<ChargeRequest>,
) -> Result<Json<ChargeResponse>, ApiError> {
    let appointment = chargeable_appointment(&ctx, &req.appointment_id)?;
    let gateway = ctx.state.razorpay.as_ref().ok_or(PaymentError::NotConfigured)?;
    let charge = gateway
        .create_charge(&appointment.id, appointment.amount)
        .await?;
    Ok(Json(ChargeResponse { charge }))
}

#[derive(Debug, Deserialize)]
pub struct RazorpayVerifyRequest {
    pub order_id: String,
}

/// `POST /api/payment/razorpay/verify` — fetch the order back from the
/// gateway; a paid order marks its receipt appointment as paid.
pub async fn razorpay_verify(
    State(ctx): State<ApiContext>,
    Json(req): Json<RazorpayVerifyRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let gateway = ctx.state.razorpay.as_ref().ok_or(PaymentError::NotConfigured)?;
    let charge = gateway.verify_charge(&req.order_id).await?;

    let appointment_id = charge
        .receipt
        .as_deref()
        .and_then(|receipt| Uuid::parse_str(receipt).ok());
    match (charge.paid, appointment_id) {
        (true, Some(appointment_id)) => {
            let conn = ctx.state.open_db()?;
            ctx.state.booking.confirm_payment(&conn, &appointment_id)?;
            Ok(Json(serde_json::json!({ "message": "Payment successful" })))
        }
        _ => Err(ApiError::BadRequest("Payment failed".into())),
    }
}

/// `POST /api/payment/stripe` — create a hosted checkout session; the
/// client is redirected back to the calling origin.
pub async fn stripe_session(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
    Json(req): Json<ChargeRequest>,
) -> Result<Json<ChargeResponse>, ApiError> {
    let appointment = chargeable_appointment(&ctx, &req.appointment_id)?;
    let gateway = ctx.state.stripe.as_ref().ok_or(PaymentError::NotConfigured)?;

    let origin = headers
        .get("origin")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let charge = gateway
        .create_charge(&appointment.id, appointment.amount, origin)
        .await?;
    Ok(Json(ChargeResponse { charge }))
}

#[derive(Debug, Deserialize)]
pub struct StripeVerifyRequest {
    pub appointment_id: Uuid,
    pub success: String,
}

/// `POST /api/payment/stripe/verify` — the redirect flow's success flag is
/// the gateway's word that the charge settled.
pub async fn stripe_verify(
    State(ctx): State<ApiContext>,
    Json(req): Json<StripeVerifyRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if ctx.state.stripe.is_none() {
        return Err(PaymentError::NotConfigured.into());
    }
    if req.success != "true" {
        return Err(ApiError::BadRequest("Payment failed".into()));
    }

    let conn = ctx.state.open_db()?;
    ctx.state
        .booking
        .confirm_payment(&conn, &req.appointment_id)?;
    Ok(Json(serde_json::json!({ "message": "Payment successful" })))
}
