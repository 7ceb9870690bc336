//! One-shot notices carried in the session and consumed on the next render.

use crate::server::error::PageError;
use tower_sessions::Session;

const FLASH_KEY: &str = "_flashes";

/// Queues a notice for the next rendered page.
///
/// # Errors
/// Session-store failures collapse to [`PageError::Internal`].
pub async fn push(session: &Session, message: impl Into<String>) -> Result<(), PageError> {
    let mut pending: Vec<String> =
        session.get(FLASH_KEY).await.map_err(PageError::internal)?.unwrap_or_default();
    pending.push(message.into());
    session.insert(FLASH_KEY, pending).await.map_err(PageError::internal)?;
    Ok(())
}

/// Removes and returns all pending notices; a second call comes back empty.
///
/// # Errors
/// Session-store failures collapse to [`PageError::Internal`].
pub async fn take(session: &Session) -> Result<Vec<String>, PageError> {
    let pending: Option<Vec<String>> =
        session.remove(FLASH_KEY).await.map_err(PageError::internal)?;
    Ok(pending.unwrap_or_default())
}
