//! Session-backed CSRF tokens for form posts.
//!
//! A token is issued into the session when a form page renders and must come
//! back in the `csrf_token` form field. Mismatch or absence is a 400.

use crate::safe_nanoid;
use crate::server::error::PageError;
use tower_sessions::Session;

/// Session key holding the token.
pub const TOKEN_KEY: &str = "csrf_token";
/// Form field the token must be posted back in.
pub const FORM_FIELD: &str = "csrf_token";

const TOKEN_LENGTH: usize = 32;

/// Returns the session's CSRF token, creating one if absent.
///
/// # Errors
/// Session-store failures collapse to [`PageError::Internal`].
pub async fn issue(session: &Session) -> Result<String, PageError> {
    if let Some(token) =
        session.get::<String>(TOKEN_KEY).await.map_err(PageError::internal)?
    {
        return Ok(token);
    }

    let token = safe_nanoid!(TOKEN_LENGTH);
    session.insert(TOKEN_KEY, token.clone()).await.map_err(PageError::internal)?;
    Ok(token)
}

/// Checks a submitted token against the session's.
///
/// # Errors
/// Returns [`PageError::Csrf`] when the session has no token, the form did not
/// send one, or the values differ.
pub async fn verify(session: &Session, submitted: Option<&str>) -> Result<(), PageError> {
    let expected = session
        .get::<String>(TOKEN_KEY)
        .await
        .map_err(PageError::internal)?
        .ok_or_else(|| PageError::csrf("The CSRF session token is missing."))?;

    match submitted {
        Some(token) if token == expected => Ok(()),
        Some(_) => Err(PageError::csrf("The CSRF token is invalid.")),
        None => Err(PageError::csrf("The CSRF token is missing.")),
    }
}
