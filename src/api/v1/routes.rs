/*
 * Responsibility
 * - v1 URL layout
 * - health and auth routes are public; users routes sit behind the access gate
 *   (route_layer, so unmatched paths stay 404 instead of 401)
 */
use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::middleware::auth::{AccessGate, access};
use crate::state::AppState;

use crate::api::v1::handlers::{
    auth::{forgot_password, login, register, resend_otp, reset_password, verify_otp},
    health::health,
    html::convert_html,
    users::{change_password, check_validation, delete_user, list_users, profile_upload},
};

pub fn routes(gate: AccessGate) -> Router<AppState> {
    let auth = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/verify-otp", post(verify_otp))
        .route("/resend-otp", post(resend_otp))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password));

    let users = Router::new()
        .route("/list", get(list_users))
        .route("/change-password", post(change_password))
        .route("/check-validation", post(check_validation))
        .route("/delete-user/{user_id}", delete(delete_user))
        .route("/html-to-string", post(convert_html))
        .route("/profile-upload/{user_id}", post(profile_upload));
    let users = access::apply(users, gate);

    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth)
        .nest("/users", users)
}
