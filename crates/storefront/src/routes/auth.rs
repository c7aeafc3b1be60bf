//! Authentication route handlers.
//!
//! Sign-in and sign-up are delegated to the identity provider through
//! [`SessionClient`]; failures redirect back to the form with an
//! `?error=<code>` the page turns into a message.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use shopfront_core::Email;

use crate::controller::Navigation;
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::identity::Credentials;
use crate::session::{SessionClient, SessionError, StorageError};
use crate::state::AppState;

/// Minimum password length accepted by the sign-up form.
const MIN_PASSWORD_LENGTH: usize = 6;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Sign-up form data.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<&'static str>,
}

/// Sign-up page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub error: Option<&'static str>,
    pub min_password_length: usize,
}

/// User-facing text for an `?error=` code.
fn error_message(code: &str) -> &'static str {
    match code {
        "credentials" => "Invalid email or password.",
        "disabled" => "This account has been disabled.",
        "email_taken" => "An account with this email already exists.",
        "weak_password" => "That password is too weak. Choose a longer one.",
        "password_mismatch" => "Passwords do not match.",
        "too_many_attempts" => "Too many attempts. Please wait a moment and try again.",
        "invalid_email" => "Enter a valid email address.",
        "session" => "We could not start your session. Please try again.",
        _ => "Something went wrong. Please try again.",
    }
}

fn redirect_with_error(path: &str, code: &str) -> Response {
    Redirect::to(&format!("{path}?error={code}")).into_response()
}

/// Map a failed sign-in or sign-up to an error code, logging it.
fn failure_code(err: &SessionError) -> &'static str {
    match err {
        SessionError::Identity(e) => {
            tracing::warn!(error = %e, "Identity provider rejected request");
            e.code()
        }
        SessionError::Storage(e) => {
            tracing::error!(error = %e, "Failed to persist session");
            "session"
        }
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        error: query.error.as_deref().map(error_message),
    }
}

/// Handle login form submission.
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let Ok(email) = Email::parse(&form.email) else {
        return redirect_with_error("/login", "invalid_email");
    };
    let credentials = Credentials::new(email, form.password);

    match SessionClient::new(state.identity(), &session)
        .sign_in(&credentials)
        .await
    {
        Ok(signed_in) => {
            set_sentry_user(&signed_in.user.uid, Some(signed_in.user.email.as_str()));
            Redirect::to("/").into_response()
        }
        Err(e) => redirect_with_error("/login", failure_code(&e)),
    }
}

// =============================================================================
// Sign-up Routes
// =============================================================================

/// Display the sign-up page.
pub async fn signup_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    SignupTemplate {
        error: query.error.as_deref().map(error_message),
        min_password_length: MIN_PASSWORD_LENGTH,
    }
}

/// Handle sign-up form submission. A new account is signed in immediately.
#[tracing::instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Response {
    let Ok(email) = Email::parse(&form.email) else {
        return redirect_with_error("/signup", "invalid_email");
    };

    if form.password != form.password_confirm {
        return redirect_with_error("/signup", "password_mismatch");
    }

    if form.password.chars().count() < MIN_PASSWORD_LENGTH {
        return redirect_with_error("/signup", "weak_password");
    }

    let credentials = Credentials::new(email, form.password);

    match SessionClient::new(state.identity(), &session)
        .sign_up(&credentials)
        .await
    {
        Ok(signed_up) => {
            set_sentry_user(&signed_up.user.uid, Some(signed_up.user.email.as_str()));
            Redirect::to("/").into_response()
        }
        Err(e) => redirect_with_error("/signup", failure_code(&e)),
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout: clear the session and return to the login page.
///
/// # Errors
///
/// Returns `AppError::Session` if the session can neither be cleared nor
/// discarded, leaving the visitor signed in.
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Response> {
    if let Err(e) = SessionClient::new(state.identity(), &session)
        .sign_out()
        .await
    {
        tracing::warn!(error = %e, "Failed to clear session, discarding it");
        session.flush().await.map_err(StorageError::from)?;
    }

    clear_sentry_user();
    Ok(Redirect::to(&Navigation::Login.path()).into_response())
}
