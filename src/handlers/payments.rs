//! Checkout endpoints: payment intents, payment records and history.

use actix_web::{HttpResponse, rt, web};
use serde_json::Value;
use validator::Validate;

use crate::{
    AppState,
    auth_middleware::AuthMiddleware,
    error::ApiError,
    models::{CheckoutFields, CheckoutResponse, PaymentIntentRequest, PaymentIntentResponse},
    services::{mailgun::Email, stripe::amount_in_cents},
    store::{Collection, Document, DocumentId, Filter},
};

/// `POST /create-payment-intent`
///
/// Creates a USD card payment intent for `price` and returns its client
/// secret. The provider call is awaited.
///
/// # Arguments
/// * `body` - `{ "price": <number> }`, converted to whole cents by truncation.
///
/// # Success Response (200 OK)
/// ```json
/// { "clientSecret": "pi_..._secret_..." }
/// ```
///
/// # Errors
/// * 400 when `price` is missing, not a number, or negative.
/// * 500 when the payment provider rejects the request or is unreachable.
#[tracing::instrument(skip(state, body), fields(price = body.price))]
pub async fn create_payment_intent(
    state: web::Data<AppState>,
    body: web::Json<PaymentIntentRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let amount = amount_in_cents(body.price);
    let client_secret = state.payments.create_payment_intent(amount).await?;
    Ok(HttpResponse::Ok().json(PaymentIntentResponse { client_secret }))
}

/// `POST /payments`
///
/// Stores the payment record as sent, then deletes every cart listed in
/// `cartIds`, then fires the confirmation email without waiting for it.
///
/// The insert and the delete are two independent writes. A failure between
/// them leaves the carts in place next to a stored payment.
///
/// # Errors
/// * 400 when `cartIds` is missing or holds anything but valid ids. Nothing
///   is written in that case.
/// * 500 when either store write fails.
#[tracing::instrument(skip(state, payment))]
pub async fn checkout(
    state: web::Data<AppState>,
    payment: web::Json<Document>,
) -> Result<HttpResponse, ApiError> {
    let payment = payment.into_inner();
    let fields: CheckoutFields = serde_json::from_value(Value::Object(payment.clone()))
        .map_err(|e| ApiError::BadRequest(format!("invalid payment: {e}")))?;
    let cart_ids = fields
        .cart_ids
        .iter()
        .map(|id| id.parse::<DocumentId>())
        .collect::<Result<Vec<_>, _>>()?;

    let payment_result = state.store.insert_one(Collection::Payments, payment).await?;
    let delete_result = state.store.delete_many(Collection::Carts, &cart_ids).await?;

    tracing::info!(
        payment_id = %payment_result.inserted_id,
        carts_requested = cart_ids.len(),
        carts_deleted = delete_result.deleted_count,
        "Checkout recorded"
    );

    match fields.recipient() {
        Some(to) => send_confirmation(&state, to, fields.transaction_ref()),
        None => tracing::warn!(
            payment_id = %payment_result.inserted_id,
            "Payment has no email, skipping confirmation"
        ),
    }

    Ok(HttpResponse::Ok().json(CheckoutResponse {
        payment_result,
        delete_result,
    }))
}

/// Dispatches the confirmation email onto the runtime. Delivery failures are
/// logged and never reach the caller.
fn send_confirmation(state: &AppState, to: &str, transaction_id: &str) {
    let mailer = state.mailer.clone();
    let email = Email::order_confirmation(to, transaction_id);

    rt::spawn(async move {
        match mailer.send(&email).await {
            Ok(message_id) => {
                tracing::info!(to = %email.to, %message_id, "Confirmation email sent")
            }
            Err(e) => {
                tracing::warn!(to = %email.to, error = %e, "Confirmation email failed")
            }
        }
    });
}

/// `GET /paymentHistory/{email}`
///
/// Self-only: the path email must match the token's email. Returns the
/// caller's payments.
///
/// # Errors
/// * 401 without a valid bearer token.
/// * 403 when the path email is not the caller's.
#[tracing::instrument(skip(state, user))]
pub async fn payment_history(
    user: AuthMiddleware,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let email = path.into_inner();
    user.require_email(&email)?;

    let payments = state
        .store
        .find(Collection::Payments, Filter::FieldEq("email", Value::String(email)))
        .await?;
    Ok(HttpResponse::Ok().json(payments))
}
