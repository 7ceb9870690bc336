use crate::IMAGES;
use axum::extract::{Multipart, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use doorstep_kernel::security::filename::FilenameGuard;
use doorstep_kernel::server::error::{PageError, PageFailure};
use doorstep_kernel::server::state::AppState;
use doorstep_kernel::server::{csrf, flash};
use minijinja::context;
use tower_sessions::Session;
use tracing::info;

const MISSING_FILE: &str = "Choose an image file to upload.";
const NOT_AN_IMAGE: &str = "Only image files allowed!";

/// `GET /upload`: the empty form.
pub(crate) async fn show_form(
    State(state): State<AppState>,
    session: Session,
) -> Result<Html<String>, PageFailure> {
    let token = csrf::issue(&session).await.map_err(|e| state.page(e))?;
    let notices = flash::take(&session).await.map_err(|e| state.page(e))?;

    render_form(&state, None, &token, &notices)
}

/// `POST /upload`: validate the multipart payload, sanitize the client
/// filename, and store the file. Success redirects to `/thanks`.
pub(crate) async fn submit(
    State(state): State<AppState>,
    session: Session,
    mut multipart: Multipart,
) -> Result<Response, PageFailure> {
    let mut csrf_token: Option<String> = None;
    let mut photo: Option<(String, axum::body::Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| state.page(PageError::internal(e)))?
    {
        match field.name() {
            Some(csrf::FORM_FIELD) => {
                csrf_token =
                    Some(field.text().await.map_err(|e| state.page(PageError::internal(e)))?);
            },
            Some("photo") => {
                let filename = field.file_name().unwrap_or_default().to_owned();
                let bytes =
                    field.bytes().await.map_err(|e| state.page(PageError::internal(e)))?;
                photo = Some((filename, bytes));
            },
            _ => {},
        }
    }

    csrf::verify(&session, csrf_token.as_deref()).await.map_err(|e| state.page(e))?;

    // Browsers post an empty filename when no file was chosen.
    let Some((filename, bytes)) = photo.filter(|(name, _)| !name.is_empty()) else {
        return rerender(&state, &session, MISSING_FILE).await;
    };

    let allowed = FilenameGuard::extension(&filename)
        .is_some_and(|ext| IMAGES.contains(&ext.as_str()));
    if !allowed {
        return rerender(&state, &session, NOT_AN_IMAGE).await;
    }

    // The client name is untrusted; reduce it to a safe basename before any
    // filesystem path is formed.
    let Ok(safe_name) = FilenameGuard::secure(&filename) else {
        return rerender(&state, &session, MISSING_FILE).await;
    };

    let uploads_dir = state.config.storage.uploads_dir.clone();
    tokio::fs::create_dir_all(&uploads_dir)
        .await
        .map_err(|e| state.page(PageError::internal(e)))?;
    let target = uploads_dir.join(&safe_name);
    tokio::fs::write(&target, &bytes)
        .await
        .map_err(|e| state.page(PageError::internal(e)))?;

    info!(name = %safe_name, size = bytes.len(), "Photo stored");
    flash::push(&session, "Your photo has been saved.").await.map_err(|e| state.page(e))?;

    Ok(Redirect::to("/thanks").into_response())
}

async fn rerender(
    state: &AppState,
    session: &Session,
    error: &str,
) -> Result<Response, PageFailure> {
    let token = csrf::issue(session).await.map_err(|e| state.page(e))?;
    let notices = flash::take(session).await.map_err(|e| state.page(e))?;
    render_form(state, Some(error), &token, &notices).map(IntoResponse::into_response)
}

fn render_form(
    state: &AppState,
    error: Option<&str>,
    csrf_token: &str,
    notices: &[String],
) -> Result<Html<String>, PageFailure> {
    state.render(
        "upload.html",
        context! { error => error, csrf_token => csrf_token, notices => notices },
    )
}
