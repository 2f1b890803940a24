use sea_orm::Database;
use tracing::info;

use otpgate_auth::config::AuthConfig;
use otpgate_auth::infra::db::DbOtpStore;
use otpgate_auth::infra::sms::TwilioSmsDispatcher;
use otpgate_auth::infra::sweeper::spawn_expiry_sweeper;
use otpgate_auth::router::build_router;
use otpgate_auth::state::AppState;
use otpgate_core::config::Config;
use otpgate_core::tracing::init_tracing;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = AuthConfig::from_env();
    let otp = config.otp_settings().expect("invalid OTP configuration");
    let tokens = config.token_settings().expect("invalid JWT configuration");

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let sms = TwilioSmsDispatcher::new(config.twilio_options())
        .expect("failed to build SMS dispatcher");

    spawn_expiry_sweeper(DbOtpStore { db: db.clone() }, config.sweep_interval());

    let state = AppState {
        db,
        sms,
        otp,
        tokens,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.auth_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!(otp_digits = otp.digits, "auth service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
