//! Login payloads for staff and patients.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{PhoneNumber, Username};

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
    /// Phone was missing or not a valid number.
    InvalidPhone,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::InvalidPhone => write!(f, "phone must be a valid phone number"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated staff login credentials.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace.
///
/// # Examples
/// ```
/// use clinic::domain::StaffCredentials;
///
/// let creds = StaffCredentials::try_from_parts(" dr_mona ", "s3cret").unwrap();
/// assert_eq!(creds.username(), "dr_mona");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl StaffCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username string suitable for user lookups.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Passwordless patient login: phone plus username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientCredentials {
    phone: PhoneNumber,
    username: String,
}

impl PatientCredentials {
    pub fn try_from_parts(phone: &str, username: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        let phone = PhoneNumber::new(phone).map_err(|_| LoginValidationError::InvalidPhone)?;
        Ok(Self {
            phone,
            username: normalized.to_owned(),
        })
    }

    pub fn phone(&self) -> &PhoneNumber {
        &self.phone
    }

    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Whether the supplied username names the given account.
    pub fn matches(&self, username: &Username) -> bool {
        self.username == username.as_ref()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyUsername)]
    #[case("   ", "pw", LoginValidationError::EmptyUsername)]
    #[case("user", "", LoginValidationError::EmptyPassword)]
    fn invalid_staff_credentials(
        #[case] username: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = StaffCredentials::try_from_parts(username, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case("  dr_mona  ", "secret")]
    #[case("reception1", " spaced password ")]
    fn staff_credentials_trim_username_only(#[case] username: &str, #[case] password: &str) {
        let creds = StaffCredentials::try_from_parts(username, password)
            .expect("valid inputs should succeed");
        assert_eq!(creds.username(), username.trim());
        assert_eq!(creds.password(), password);
    }

    #[rstest]
    #[case("", "ali", LoginValidationError::InvalidPhone)]
    #[case("12345", "ali", LoginValidationError::InvalidPhone)]
    #[case("01012345678", "  ", LoginValidationError::EmptyUsername)]
    fn invalid_patient_credentials(
        #[case] phone: &str,
        #[case] username: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = PatientCredentials::try_from_parts(phone, username)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn patient_credentials_normalise_phone() {
        let creds = PatientCredentials::try_from_parts("0101 234 5678", " ali ")
            .expect("valid inputs should succeed");
        assert_eq!(creds.phone().as_ref(), "+201012345678");
        assert!(creds.matches(&Username::new("ali").expect("username")));
        assert!(!creds.matches(&Username::new("Ali").expect("username")));
    }
}
