use axum::{
    Router,
    routing::{get, patch, post},
};
use tower_http::trace::TraceLayer;

use otpgate_core::health::{healthz, readyz};
use otpgate_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    phone_auth::{phone_login, send_mobile_otp, verify_mobile_otp},
    token::{logout, refresh_tokens},
    user::{get_me, update_welcome_status},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Phone OTP
        .route("/auth/send-mobile-otp", post(send_mobile_otp))
        .route("/auth/verify-mobile-otp", post(verify_mobile_otp))
        .route("/auth/phone-login", post(phone_login))
        // Session
        .route("/auth/logout", post(logout))
        .route("/auth/refresh-tokens", post(refresh_tokens))
        // Profile
        .route("/users/me", get(get_me))
        .route("/users/welcome-status", patch(update_welcome_status))
        .with_state(state)
        // Outermost last: the request id is set before tracing and echoed on the way out.
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
}
