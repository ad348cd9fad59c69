use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use homerent_core::credentials::{hash_password, verify_password, OtpChallenge};
use homerent_core::domain::user::{
    Credentials, NewUser, User, UserId, UserProfile, UserSummary, UserUpdate,
};
use homerent_core::validation::{self, ValidationErrors};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use super::{ApiError, AppState};

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Registration {
    #[serde(rename = "UserServer")]
    pub user: User,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Login {
    pub user: User,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct UserMessage {
    pub message: &'static str,
    pub user: UserSummary,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OtpRequest {
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OtpVerification {
    pub email: String,
    pub otp: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PasswordReset {
    pub email: String,
    pub otp: String,
    pub new_password: String,
}

const USER_NOT_FOUND: &str = "User not found.";

pub async fn add_user(
    State(state): State<AppState>,
    Json(body): Json<NewUser>,
) -> Result<(StatusCode, Json<Registration>), ApiError> {
    body.validate()?;
    if state.users.find_by_username(&body.user).await?.is_some() {
        return Err(ApiError::bad_request("User already exists."));
    }
    if state.users.find_by_email(&body.email).await?.is_some() {
        return Err(ApiError::bad_request("Email already exists."));
    }

    let password_hash = hash_password(&body.password)?;
    let user = body.into_user(UserId(Uuid::new_v4().to_string()), password_hash, Utc::now());
    state.users.save(user.clone()).await?;

    info!(event_name = "account.user.registered", correlation_id = %user.id, "user registered");
    Ok((StatusCode::CREATED, Json(Registration { user, message: "User added successfully." })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<Credentials>,
) -> Result<Json<Login>, ApiError> {
    let user = state
        .users
        .find_by_username(&body.user)
        .await?
        .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;
    if !verify_password(&body.password, &user.password_hash) {
        return Err(ApiError::unauthorized("Invalid password."));
    }

    info!(event_name = "account.user.login", correlation_id = %user.id, "user signed in");
    Ok(Json(Login { user, message: "Login successful." }))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(update): Json<UserUpdate>,
) -> Result<Json<UserMessage>, ApiError> {
    let mut user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;
    update.validate()?;

    if let Some(next) = update.username_change(&user.user) {
        if state.users.find_by_username(&next).await?.is_some() {
            return Err(ApiError::bad_request("Username already exists."));
        }
    }
    if let Some(next) = update.email_change(&user.email) {
        if state.users.find_by_email(&next).await?.is_some_and(|other| other.id != user.id) {
            return Err(ApiError::bad_request("Email already exists."));
        }
    }

    let now = Utc::now();
    update.apply_to(&mut user, now);
    if let Some(password) = update.new_password() {
        user.password_hash = hash_password(password)?;
    }
    state.users.save(user.clone()).await?;

    info!(event_name = "account.user.updated", correlation_id = %user.id, "user profile updated");
    Ok(Json(UserMessage { message: "User updated successfully.", user: user.summary() }))
}

pub async fn verify_user_update(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserMessage>, ApiError> {
    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;
    Ok(Json(UserMessage { message: "User verification successful", user: user.summary() }))
}

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.users.list().await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserMessage>, ApiError> {
    let user = state
        .users
        .delete(&UserId(id))
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    info!(event_name = "account.user.deleted", correlation_id = %user.id, "user deleted");
    Ok(Json(UserMessage { message: "User deleted successfully", user: user.summary() }))
}

pub async fn user_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;
    Ok(Json(user.profile()))
}

pub async fn request_otp(
    State(state): State<AppState>,
    Json(body): Json<OtpRequest>,
) -> Result<Json<MessageBody>, ApiError> {
    let mut user = find_by_email(&state, &body.email).await?;
    let challenge = OtpChallenge::issue(Utc::now());
    user.otp = Some(challenge.clone());
    state.users.save(user.clone()).await?;

    if let Err(error) = state.mailer.send_otp(&user.email, &challenge.code).await {
        error!(
            event_name = "account.otp.delivery_failed",
            correlation_id = %user.id,
            error = %error,
            "otp email could not be sent"
        );
        return Err(ApiError::internal("Failed to send OTP."));
    }

    info!(event_name = "account.otp.issued", correlation_id = %user.id, "otp issued");
    Ok(Json(MessageBody { message: "OTP sent to email." }))
}

pub async fn verify_otp(
    State(state): State<AppState>,
    Json(body): Json<OtpVerification>,
) -> Result<Json<MessageBody>, ApiError> {
    let user = find_by_email(&state, &body.email).await?;
    OtpChallenge::verify(user.otp.as_ref(), &body.otp, Utc::now())?;
    Ok(Json(MessageBody { message: "OTP verified." }))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<PasswordReset>,
) -> Result<Json<MessageBody>, ApiError> {
    let mut user = find_by_email(&state, &body.email).await?;
    let now = Utc::now();
    OtpChallenge::verify(user.otp.as_ref(), &body.otp, now)?;

    let mut errors = ValidationErrors::new();
    errors.check("newPassword", validation::validate_password(&body.new_password));
    errors.into_result()?;

    user.password_hash = hash_password(&body.new_password)?;
    user.otp = None;
    user.updated_at = now;
    state.users.save(user.clone()).await?;

    info!(event_name = "account.password.reset", correlation_id = %user.id, "password reset");
    Ok(Json(MessageBody { message: "Password reset successful." }))
}

async fn find_by_email(state: &AppState, email: &str) -> Result<User, ApiError> {
    state.users.find_by_email(email).await?.ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::{Method, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};

    use crate::api::router;
    use crate::api::testing::{send, state_with};
    use crate::mailer::testing::RecordingMailer;

    fn app_with_mailer() -> (Router, Arc<RecordingMailer>) {
        let mailer = Arc::new(RecordingMailer::default());
        (router(state_with(Vec::new(), mailer.clone())), mailer)
    }

    async fn register(app: &Router, user: &str, email: &str) -> (StatusCode, Value) {
        send(
            app,
            Method::POST,
            "/addUser",
            Some(json!({ "user": user, "password": "s3cret", "email": email, "gender": "female" })),
        )
        .await
    }

    #[tokio::test]
    async fn registration_rejects_duplicates_and_hides_the_hash() {
        let (app, _) = app_with_mailer();

        let (status, body) = register(&app, "Maryam", "maryam@example.com").await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "User added successfully.");
        assert_eq!(body["UserServer"]["user"], "maryam");
        assert!(body["UserServer"].get("passwordHash").is_none());

        let (status, body) = register(&app, "MARYAM", "other@example.com").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "User already exists.");

        let (status, body) = register(&app, "amal", "maryam@example.com").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Email already exists.");
    }

    #[tokio::test]
    async fn registration_reports_the_first_invalid_field() {
        let (app, _) = app_with_mailer();
        let (status, body) = register(&app, "maryam", "not-an-email").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Please enter a valid email address");
    }

    #[tokio::test]
    async fn login_is_case_insensitive_and_checks_the_password() {
        let (app, _) = app_with_mailer();
        register(&app, "salim", "salim@example.com").await;

        let (status, body) =
            send(&app, Method::POST, "/getUser", Some(json!({ "user": "nobody", "password": "x" })))
                .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "User not found.");

        let (status, body) =
            send(&app, Method::POST, "/getUser", Some(json!({ "user": "Salim", "password": "nope" })))
                .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid password.");

        let (status, body) = send(
            &app,
            Method::POST,
            "/getUser",
            Some(json!({ "user": " SALIM ", "password": "s3cret" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Login successful.");
        assert_eq!(body["user"]["email"], "salim@example.com");
    }

    #[tokio::test]
    async fn update_checks_uniqueness_and_changes_the_password() {
        let (app, _) = app_with_mailer();
        register(&app, "salim", "salim@example.com").await;
        register(&app, "amal", "amal@example.com").await;

        let (status, body) =
            send(&app, Method::PUT, "/updateUser/ghost", Some(json!({ "gender": "male" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "User not found.");

        let (status, body) =
            send(&app, Method::PUT, "/updateUser/salim", Some(json!({ "newUsername": "Amal" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Username already exists.");

        let (status, body) = send(
            &app,
            Method::PUT,
            "/updateUser/salim",
            Some(json!({ "email": "amal@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Email already exists.");

        let (status, body) = send(
            &app,
            Method::PUT,
            "/updateUser/salim",
            Some(json!({ "newUsername": "salim2", "password": "n3w", "gender": "male" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "User updated successfully.");
        assert_eq!(body["user"]["user"], "salim2");

        let (status, body) = send(&app, Method::GET, "/verifyUserUpdate/salim2", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["gender"], "male");

        let (status, _) =
            send(&app, Method::POST, "/getUser", Some(json!({ "user": "salim2", "password": "n3w" })))
                .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn admin_lists_profiles_and_deletes_users() {
        let (app, _) = app_with_mailer();
        let (_, body) = register(&app, "salim", "salim@example.com").await;
        let id = body["UserServer"]["_id"].as_str().expect("id").to_string();

        let (status, body) = send(&app, Method::GET, "/getUsers", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(1));

        let (status, body) = send(&app, Method::GET, "/getUserProfile/Salim", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({
            "user": "salim",
            "email": "salim@example.com",
            "gender": "female",
            "imgUrl": null,
            "isAdmin": false
        }));

        let (status, body) = send(&app, Method::DELETE, &format!("/deleteUser/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "User deleted successfully");

        let (status, body) = send(&app, Method::DELETE, &format!("/deleteUser/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "User not found");

        let (status, _) = send(&app, Method::GET, "/getUserProfile/salim", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn password_reset_runs_through_the_otp_flow() {
        let (app, mailer) = app_with_mailer();
        register(&app, "salim", "salim@example.com").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/verify-otp",
            Some(json!({ "email": "salim@example.com", "otp": "000000" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "OTP not requested.");

        let (status, body) = send(
            &app,
            Method::POST,
            "/request-otp",
            Some(json!({ "email": "salim@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "OTP sent to email.");
        let code = mailer.last_code().expect("otp was mailed");
        assert_eq!(code.len(), 6);

        let wrong = if code == "111111" { "222222" } else { "111111" };
        let (status, body) = send(
            &app,
            Method::POST,
            "/verify-otp",
            Some(json!({ "email": "salim@example.com", "otp": wrong })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid OTP.");

        let (status, body) = send(
            &app,
            Method::POST,
            "/verify-otp",
            Some(json!({ "email": "salim@example.com", "otp": code })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "OTP verified.");

        let (status, body) = send(
            &app,
            Method::POST,
            "/reset-password",
            Some(json!({ "email": "salim@example.com", "otp": code, "newPassword": "fresh" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Password reset successful.");

        let (status, _) =
            send(&app, Method::POST, "/getUser", Some(json!({ "user": "salim", "password": "fresh" })))
                .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &app,
            Method::POST,
            "/reset-password",
            Some(json!({ "email": "salim@example.com", "otp": code, "newPassword": "again" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "OTP not requested.");
    }

    #[tokio::test]
    async fn otp_for_unknown_email_is_a_not_found() {
        let (app, _) = app_with_mailer();
        let (status, body) =
            send(&app, Method::POST, "/request-otp", Some(json!({ "email": "ghost@example.com" })))
                .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "User not found.");
    }

    #[tokio::test]
    async fn mail_failure_is_reported_as_a_server_error() {
        let mailer = Arc::new(RecordingMailer { fail: true, ..RecordingMailer::default() });
        let app = router(state_with(Vec::new(), mailer));
        register(&app, "salim", "salim@example.com").await;

        let (status, body) =
            send(&app, Method::POST, "/request-otp", Some(json!({ "email": "salim@example.com" })))
                .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Failed to send OTP.");
    }
}
