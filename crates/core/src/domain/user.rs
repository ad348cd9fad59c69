use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::credentials::OtpChallenge;
use crate::validation::{self, ValidationErrors};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored account. Usernames are kept lower-case.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: UserId,
    pub user: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub img_url: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(skip)]
    pub otp: Option<OtpChallenge>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            user: self.user.clone(),
            email: self.email.clone(),
            gender: self.gender.clone(),
            img_url: self.img_url.clone(),
            is_admin: self.is_admin,
        }
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            user: self.user.clone(),
            email: self.email.clone(),
            gender: self.gender.clone(),
            img_url: self.img_url.clone(),
            is_admin: self.is_admin,
            updated_at: self.updated_at,
        }
    }
}

/// Public view returned by the profile endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user: String,
    pub email: String,
    pub gender: String,
    pub img_url: Option<String>,
    pub is_admin: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub user: String,
    pub email: String,
    pub gender: String,
    pub img_url: Option<String>,
    pub is_admin: bool,
    pub updated_at: DateTime<Utc>,
}

pub fn normalize_username(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Registration payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub img_url: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check("user", validation::validate_username(&self.user));
        errors.check("email", validation::validate_email(self.email.trim()));
        errors.check("password", validation::validate_password(&self.password));
        errors.into_result()
    }

    pub fn into_user(self, id: UserId, password_hash: String, now: DateTime<Utc>) -> User {
        User {
            id,
            user: normalize_username(&self.user),
            email: self.email.trim().to_string(),
            password_hash,
            gender: self.gender,
            img_url: self.img_url.filter(|url| !url.trim().is_empty()),
            is_admin: self.is_admin,
            otp: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
}

/// Profile update. Empty strings are treated as absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub password: Option<String>,
    pub img_url: Option<String>,
    pub gender: Option<String>,
    pub new_username: Option<String>,
    pub email: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

impl UserUpdate {
    /// The normalized new username, if it differs from the current one.
    pub fn username_change(&self, current: &str) -> Option<String> {
        present(&self.new_username).map(normalize_username).filter(|next| next != current)
    }

    /// The new email, if it differs from the current one.
    pub fn email_change(&self, current: &str) -> Option<String> {
        present(&self.email).filter(|next| *next != current).map(str::to_string)
    }

    pub fn new_password(&self) -> Option<&str> {
        self.password.as_deref().filter(|password| !password.is_empty())
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(username) = present(&self.new_username) {
            errors.check("newUsername", validation::validate_username(username));
        }
        if let Some(email) = present(&self.email) {
            errors.check("email", validation::validate_email(email));
        }
        errors.into_result()
    }

    /// Applies every field except the password, which needs hashing first.
    pub fn apply_to(&self, user: &mut User, now: DateTime<Utc>) {
        if let Some(username) = self.username_change(&user.user) {
            user.user = username;
        }
        if let Some(email) = self.email_change(&user.email) {
            user.email = email;
        }
        if let Some(gender) = present(&self.gender) {
            user.gender = gender.to_string();
        }
        if let Some(img_url) = present(&self.img_url) {
            user.img_url = Some(img_url.to_string());
        }
        user.updated_at = now;
    }
}
