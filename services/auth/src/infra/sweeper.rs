use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::infra::db::DbOtpStore;
use crate::usecase::otp::purge_expired;

/// Periodically delete OTP challenges past their `expires_at`.
///
/// Verification never reads an expired row, so the sweep only bounds table size.
pub fn spawn_expiry_sweeper(store: DbOtpStore, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match purge_expired(&store, Utc::now()).await {
                Ok(0) => {}
                Ok(removed) => debug!(removed, "expired otp challenges purged"),
                Err(e) => warn!(error = %e, "otp expiry sweep failed"),
            }
        }
    })
}
