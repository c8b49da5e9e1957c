//! Post-update notification of the serving process.
//!
//! After a successful sync, `secret=<secret>` is POSTed form-encoded to the
//! configured update URL so the server can refresh whatever it caches.
//! Anything but `200 OK` counts as a failure.

use reqwest::StatusCode;
use thiserror::Error;

use crate::config::NotifyConfig;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("triggering server update failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server update unexpectedly responded with {0}")]
    Status(StatusCode),
}

pub async fn notify_update(config: &NotifyConfig) -> Result<(), NotifyError> {
    let client = reqwest::Client::new();
    let response = client
        .post(&config.update_url)
        .form(&[("secret", config.secret.as_str())])
        .send()
        .await?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(NotifyError::Status(status));
    }

    tracing::info!(url = %config.update_url, "server notified of update");
    Ok(())
}
