//! Authentication primitives: credentials, registration payloads and the
//! token shapes the backend returns.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::domain::models::{User, UserRole};

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Identifier was missing or blank once trimmed.
    EmptyIdentifier,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyIdentifier => write!(f, "email or username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials.
///
/// The identifier is sent as `email` to the credential endpoint and as
/// `username` to the legacy token endpoint.
///
/// ## Invariants
/// - `identifier` is trimmed and must not be empty after trimming.
/// - `password` must be non-empty but keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use terrabia_client::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" ama@farm.example ", "pw").unwrap();
/// assert_eq!(creds.identifier(), "ama@farm.example");
/// assert_eq!(creds.password(), "pw");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    identifier: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw identifier/password inputs.
    pub fn try_from_parts(identifier: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = identifier.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyIdentifier);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            identifier: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email address or username.
    pub fn identifier(&self) -> &str {
        self.identifier.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    pub(crate) fn email_body(&self) -> serde_json::Value {
        serde_json::json!({ "email": self.identifier(), "password": self.password() })
    }

    pub(crate) fn username_body(&self) -> serde_json::Value {
        serde_json::json!({ "username": self.identifier(), "password": self.password() })
    }
}

/// Sign-up payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub email: String,
    pub username: String,
    #[serde(serialize_with = "serialize_secret")]
    pub password: Zeroizing<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub first_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_name: String,
    #[serde(rename = "user_type")]
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Registration {
    /// Credentials for the automatic login that follows a token-less sign-up.
    pub fn credentials(&self) -> Result<LoginCredentials, LoginValidationError> {
        LoginCredentials::try_from_parts(&self.email, &self.password)
    }
}

fn serialize_secret<S>(secret: &Zeroizing<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(secret.as_str())
}

/// Token pair issued by login, registration or refresh.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenPair {
    #[serde(alias = "token", alias = "access_token")]
    pub access: String,
    #[serde(default, alias = "refresh_token")]
    pub refresh: Option<String>,
}

/// Tokens and profile returned by login or registration.
///
/// Tokens sit either at the top level or under a `tokens` object, and either
/// part may be missing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "AuthResponse")]
pub struct AuthGrant {
    pub tokens: Option<TokenPair>,
    pub user: Option<User>,
}

#[derive(Deserialize)]
struct AuthResponse {
    #[serde(default, alias = "token", alias = "access_token")]
    access: Option<String>,
    #[serde(default, alias = "refresh_token")]
    refresh: Option<String>,
    #[serde(default)]
    tokens: Option<TokenPair>,
    #[serde(default)]
    user: Option<User>,
}

impl From<AuthResponse> for AuthGrant {
    fn from(value: AuthResponse) -> Self {
        let flat = value
            .access
            .filter(|token| !token.trim().is_empty())
            .map(|access| TokenPair {
                access,
                refresh: value.refresh,
            });
        Self {
            tokens: value.tokens.or(flat),
            user: value.user,
        }
    }
}

/// Authenticated session returned to callers of login and registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

/// Result of a sign-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// The account exists and a session is open.
    Authenticated(AuthSession),
    /// The account exists but no session could be opened automatically.
    RequiresManualLogin { user: Option<User> },
}

impl RegistrationOutcome {
    /// Session, when one was opened.
    pub fn session(&self) -> Option<&AuthSession> {
        match self {
            Self::Authenticated(session) => Some(session),
            Self::RequiresManualLogin { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Credential validation and token-shape decoding.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyIdentifier)]
    #[case("   ", "pw", LoginValidationError::EmptyIdentifier)]
    #[case("kofi", "", LoginValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] identifier: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(identifier, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[test]
    fn credential_bodies_use_endpoint_field_names() {
        let creds = LoginCredentials::try_from_parts("kofi", " pw ").expect("valid");
        assert_eq!(creds.email_body(), json!({ "email": "kofi", "password": " pw " }));
        assert_eq!(creds.username_body(), json!({ "username": "kofi", "password": " pw " }));
    }

    #[rstest]
    #[case::flat(json!({ "access": "a", "refresh": "r" }), Some(("a", Some("r"))))]
    #[case::legacy_names(json!({ "token": "a", "refresh_token": "r" }), Some(("a", Some("r"))))]
    #[case::nested(json!({ "tokens": { "access": "a" } }), Some(("a", None)))]
    #[case::missing(json!({ "user": null }), None)]
    #[case::blank(json!({ "access": "  " }), None)]
    fn auth_grant_token_shapes(
        #[case] body: serde_json::Value,
        #[case] expected: Option<(&str, Option<&str>)>,
    ) {
        let grant: AuthGrant = serde_json::from_value(body).expect("decode");
        assert_eq!(
            grant
                .tokens
                .as_ref()
                .map(|pair| (pair.access.as_str(), pair.refresh.as_deref())),
            expected
        );
    }

    #[test]
    fn registration_serializes_role_as_user_type() {
        let registration = Registration {
            email: "abena@farm.example".to_owned(),
            username: "abena".to_owned(),
            password: Zeroizing::new("secret".to_owned()),
            first_name: String::new(),
            last_name: String::new(),
            role: UserRole::Farmer,
            phone: None,
        };
        let value = serde_json::to_value(&registration).expect("encode");
        assert_eq!(
            value,
            json!({
                "email": "abena@farm.example",
                "username": "abena",
                "password": "secret",
                "user_type": "farmer",
            })
        );
        assert_eq!(
            registration.credentials().expect("credentials").identifier(),
            "abena@farm.example"
        );
    }
}
