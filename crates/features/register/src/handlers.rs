use crate::SESSION_USERNAME;
use crate::form::{FieldErrors, RegisterForm};
use axum::Form;
use axum::extract::State;
use axum::response::Html;
use doorstep_kernel::server::error::{PageError, PageFailure};
use doorstep_kernel::server::state::AppState;
use doorstep_kernel::server::{csrf, flash};
use doorstep_mailer::MailerError;
use minijinja::context;
use tower_sessions::Session;
use tracing::{info, warn};

/// `GET /register`: the empty form.
pub(crate) async fn show_form(
    State(state): State<AppState>,
    session: Session,
) -> Result<Html<String>, PageFailure> {
    let token = csrf::issue(&session).await.map_err(|e| state.page(e))?;
    let notices = flash::take(&session).await.map_err(|e| state.page(e))?;

    render_form(&state, &RegisterForm::default(), &FieldErrors::default(), &token, &notices)
}

/// `POST /register`: validate, mutate the session, dispatch the confirmation
/// email off the request path, and render the thanks view.
pub(crate) async fn submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Html<String>, PageFailure> {
    csrf::verify(&session, form.csrf_token.as_deref()).await.map_err(|e| state.page(e))?;

    let submission = match form.validate() {
        Ok(submission) => submission,
        Err(errors) => {
            let token = csrf::issue(&session).await.map_err(|e| state.page(e))?;
            let notices = flash::take(&session).await.map_err(|e| state.page(e))?;
            return render_form(&state, &form, &errors, &token, &notices);
        },
    };

    // A returning visitor changing their username gets a one-time notice.
    let prior: Option<String> = session
        .get(SESSION_USERNAME)
        .await
        .map_err(|e| state.page(PageError::internal(e)))?;
    if prior.as_deref().is_some_and(|p| p != submission.username) {
        flash::push(&session, "Your new settings has been updated!")
            .await
            .map_err(|e| state.page(e))?;
    }

    session
        .insert(SESSION_USERNAME, submission.username.clone())
        .await
        .map_err(|e| state.page(PageError::internal(e)))?;

    // Fire-and-forget: the handle is dropped, delivery continues in the
    // dispatcher. Only queue saturation is tolerated here; a broken template
    // setup is a server fault.
    match state.mailer.send(
        format!("Hello, {}", submission.name),
        vec![submission.username.clone()],
        "confirm",
    ) {
        Ok(_handle) => {
            info!(username = %submission.username, "Registration accepted, confirmation queued");
        },
        Err(err @ MailerError::QueueFull { .. }) => {
            warn!(username = %submission.username, %err, "Confirmation dropped under back-pressure");
        },
        Err(err) => return Err(state.page(PageError::internal(err))),
    }

    let notices = flash::take(&session).await.map_err(|e| state.page(e))?;

    // The submitted password is deliberately not echoed back here.
    state.render(
        "thanks.html",
        context! { username => submission.username, notices => notices },
    )
}

fn render_form(
    state: &AppState,
    form: &RegisterForm,
    errors: &FieldErrors,
    csrf_token: &str,
    notices: &[String],
) -> Result<Html<String>, PageFailure> {
    state.render(
        "register.html",
        context! {
            form => context! {
                name => form.name,
                username => form.username,
                gender => form.gender,
            },
            errors => errors,
            csrf_token => csrf_token,
            notices => notices,
        },
    )
}
