//! Identity store records: users, roles, phones, and credentials.
//!
//! Users live outside any tenant partition; the tenant a user acts for is
//! derived from their doctor, reception, or patient link.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::Error;
use super::lockout::LoginAttempts;

/// Maximum username length in characters.
pub const USERNAME_MAX: usize = 150;

/// Validation errors returned by identity constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    InvalidId,
    EmptyUsername,
    UsernameTooLong { max: usize },
    UsernameInvalidCharacters,
    EmptyPhone,
    InvalidPhone,
    UnknownRole(String),
    PasswordRequired { role: Role },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::UsernameInvalidCharacters => write!(
                f,
                "username may only contain letters, digits, and @/./+/-/_",
            ),
            Self::EmptyPhone => write!(f, "phone must not be empty"),
            Self::InvalidPhone => write!(f, "phone must be a valid Egyptian phone number"),
            Self::UnknownRole(role) => write!(f, "unknown role: {role}"),
            Self::PasswordRequired { role } => write!(f, "{role} must have a password"),
        }
    }
}

impl std::error::Error for UserValidationError {}

impl UserValidationError {
    fn field_and_code(&self) -> (&'static str, &'static str) {
        match self {
            Self::InvalidId => ("userId", "invalid_user_id"),
            Self::EmptyUsername => ("username", "empty_username"),
            Self::UsernameTooLong { .. } => ("username", "username_too_long"),
            Self::UsernameInvalidCharacters => ("username", "invalid_username"),
            Self::EmptyPhone => ("phone", "empty_phone"),
            Self::InvalidPhone => ("phone", "invalid_phone"),
            Self::UnknownRole(_) => ("role", "unknown_role"),
            Self::PasswordRequired { .. } => ("password", "password_required"),
        }
    }
}

impl From<UserValidationError> for Error {
    fn from(err: UserValidationError) -> Self {
        let (field, code) = err.field_and_code();
        Error::invalid_request(err.to_string())
            .with_details(serde_json::json!({ "field": field, "code": code }))
    }
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from its string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Wrap an existing UUID, typically one read from storage.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();

fn username_regex() -> &'static Regex {
    USERNAME_RE.get_or_init(|| {
        // `\w` is Unicode aware, so Arabic names are accepted.
        Regex::new(r"^[\w.@+-]+$")
            .unwrap_or_else(|error| panic!("username regex failed to compile: {error}"))
    })
}

/// Login name, unique across the identity store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Trim and validate a username.
    pub fn new(username: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = username.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if trimmed.chars().count() > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        if !username_regex().is_match(trimmed) {
            return Err(UserValidationError::UsernameInvalidCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

const EGYPT_PREFIX: &str = "+20";

/// Phone number normalised to E.164 within the Egyptian numbering plan.
///
/// Accepts `+20…`, `0020…`, or national `0…` forms; spaces and dashes are
/// ignored.
///
/// # Examples
/// ```
/// use clinic::domain::PhoneNumber;
///
/// let phone = PhoneNumber::new("010 1234 5678").unwrap();
/// assert_eq!(phone.as_ref(), "+201012345678");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Normalise and validate a phone number.
    pub fn new(phone: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let compact: String = phone
            .as_ref()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();
        if compact.is_empty() {
            return Err(UserValidationError::EmptyPhone);
        }

        let subscriber = if let Some(rest) = compact.strip_prefix(EGYPT_PREFIX) {
            rest
        } else if let Some(rest) = compact.strip_prefix("0020") {
            rest
        } else if let Some(rest) = compact.strip_prefix('0') {
            rest
        } else {
            return Err(UserValidationError::InvalidPhone);
        };

        let digits_only = subscriber.chars().all(|c| c.is_ascii_digit());
        if !digits_only || !(9..=10).contains(&subscriber.len()) {
            return Err(UserValidationError::InvalidPhone);
        }
        Ok(Self(format!("{EGYPT_PREFIX}{subscriber}")))
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Doctor,
    Reception,
    Patient,
}

impl Role {
    /// Stable storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Doctor => "doctor",
            Self::Reception => "reception",
            Self::Patient => "patient",
        }
    }

    /// Only patients may sign in without a password.
    pub fn requires_password(self) -> bool {
        !matches!(self, Self::Patient)
    }

    /// Roles allowed to use the staff login.
    pub fn is_staff_member(self) -> bool {
        !matches!(self, Self::Patient)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "doctor" => Ok(Self::Doctor),
            "reception" => Ok(Self::Reception),
            "patient" => Ok(Self::Patient),
            other => Err(UserValidationError::UnknownRole(other.to_owned())),
        }
    }
}

/// Encoded password hash in PHC string format.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash produced by a credential hasher.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

/// Credential state of an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// A usable password hash.
    Password(PasswordHash),
    /// No password can ever match; passwordless patients use this.
    Unusable,
}

impl Credential {
    /// Whether a password can authenticate this account.
    pub fn is_usable(&self) -> bool {
        matches!(self, Self::Password(_))
    }

    /// The stored hash, if any.
    pub fn password_hash(&self) -> Option<&PasswordHash> {
        match self {
            Self::Password(hash) => Some(hash),
            Self::Unusable => None,
        }
    }
}

/// Components required to build a [`User`].
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub id: UserId,
    pub username: Username,
    pub phone: PhoneNumber,
    pub role: Role,
    pub credential: Credential,
    pub created_at: DateTime<Utc>,
}

/// Identity store record.
///
/// ## Invariants
/// - Roles other than [`Role::Patient`] always hold a usable password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    username: Username,
    phone: PhoneNumber,
    role: Role,
    credential: Credential,
    login_attempts: LoginAttempts,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl User {
    /// Build an active user with a clean login history.
    pub fn new(draft: UserDraft) -> Result<Self, UserValidationError> {
        let UserDraft {
            id,
            username,
            phone,
            role,
            credential,
            created_at,
        } = draft;
        if role.requires_password() && !credential.is_usable() {
            return Err(UserValidationError::PasswordRequired { role });
        }
        Ok(Self {
            id,
            username,
            phone,
            role,
            credential,
            login_attempts: LoginAttempts::default(),
            is_active: true,
            created_at,
        })
    }

    /// Restore persisted login attempt state.
    pub fn with_login_attempts(mut self, login_attempts: LoginAttempts) -> Self {
        self.login_attempts = login_attempts;
        self
    }

    /// Restore the persisted active flag.
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn phone(&self) -> &PhoneNumber {
        &self.phone
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn login_attempts(&self) -> &LoginAttempts {
        &self.login_attempts
    }

    /// Mutable access for the lockout guard.
    pub fn login_attempts_mut(&mut self) -> &mut LoginAttempts {
        &mut self.login_attempts
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests;
