//! Periodic maintenance that runs alongside the HTTP server.
//!
//! Each tick expires overdue bids, warns bidders whose offers are about to
//! lapse, and purges read notifications past the retention window. The sweep
//! acts as the system user so it goes through the same authorization rules
//! as every other caller.

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::api::DynAPI;
use crate::auth::User;
use crate::config::Config;

/// Bids expiring within this window get a single warning notification.
const EXPIRY_WARNING_WINDOW_HOURS: i64 = 1;

pub fn spawn_sweeper(api: DynAPI, config: &Config) -> JoinHandle<()> {
    let every = config.sweep_interval;
    let retention_days = config.notification_retention_days;

    tracing::info!(
        interval_secs = every.as_secs(),
        retention_days,
        "sweeper started"
    );

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);

        loop {
            interval.tick().await;
            sweep(&api, retention_days).await;
        }
    })
}

#[tracing::instrument(skip(api))]
async fn sweep(api: &DynAPI, retention_days: i64) {
    let system = User::new_system_user();

    match api.expire_bids(system.clone()).await {
        Ok(0) => tracing::debug!("no bids to expire"),
        Ok(expired) => tracing::info!(expired, "expired overdue bids"),
        Err(err) => tracing::error!(error = ?err, "failed to expire bids"),
    }

    let window = chrono::Duration::hours(EXPIRY_WARNING_WINDOW_HOURS);
    match api.warn_expiring_bids(system.clone(), window).await {
        Ok(0) => {}
        Ok(warned) => tracing::info!(warned, "sent bid expiry warnings"),
        Err(err) => tracing::error!(error = ?err, "failed to warn about expiring bids"),
    }

    let cutoff = Utc::now() - chrono::Duration::days(retention_days);
    match api.purge_read_notifications(system, cutoff).await {
        Ok(0) => {}
        Ok(purged) => tracing::info!(purged, "purged read notifications"),
        Err(err) => tracing::error!(error = ?err, "failed to purge notifications"),
    }
}
