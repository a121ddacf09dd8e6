//! Tests for the identity store model.

use super::*;
use chrono::TimeZone;
use rstest::{fixture, rstest};
use rstest_bdd_macros::{given, then, when};
use serde_json::json;

const VALID_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

#[fixture]
fn created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn draft(role: Role, credential: Credential, created_at: DateTime<Utc>) -> UserDraft {
    UserDraft {
        id: UserId::new(VALID_ID).expect("valid id"),
        username: Username::new("mona").expect("valid username"),
        phone: PhoneNumber::new("01012345678").expect("valid phone"),
        role,
        credential,
        created_at,
    }
}

#[rstest]
#[case("+201012345678", "+201012345678")]
#[case("00201012345678", "+201012345678")]
#[case("01012345678", "+201012345678")]
#[case("010-1234-5678", "+201012345678")]
#[case(" +20 2 2345 6789 ", "+20223456789")]
fn phone_numbers_normalise_to_e164(#[case] input: &str, #[case] expected: &str) {
    let phone = PhoneNumber::new(input).expect("valid phone");
    assert_eq!(phone.as_ref(), expected);
}

#[rstest]
#[case("", UserValidationError::EmptyPhone)]
#[case("   ", UserValidationError::EmptyPhone)]
#[case("+441234567890", UserValidationError::InvalidPhone)]
#[case("1012345678", UserValidationError::InvalidPhone)]
#[case("0101234", UserValidationError::InvalidPhone)]
#[case("010123456789", UserValidationError::InvalidPhone)]
#[case("010abc45678", UserValidationError::InvalidPhone)]
fn invalid_phone_numbers_are_rejected(#[case] input: &str, #[case] expected: UserValidationError) {
    assert_eq!(PhoneNumber::new(input), Err(expected));
}

#[rstest]
#[case("  mona  ", "mona")]
#[case("dr.ahmed+clinic@x", "dr.ahmed+clinic@x")]
#[case("منى_علي", "منى_علي")]
fn usernames_are_trimmed(#[case] input: &str, #[case] expected: &str) {
    let username = Username::new(input).expect("valid username");
    assert_eq!(username.as_ref(), expected);
}

#[rstest]
#[case("", UserValidationError::EmptyUsername)]
#[case("   ", UserValidationError::EmptyUsername)]
#[case("has space", UserValidationError::UsernameInvalidCharacters)]
#[case("semi;colon", UserValidationError::UsernameInvalidCharacters)]
fn invalid_usernames_are_rejected(#[case] input: &str, #[case] expected: UserValidationError) {
    assert_eq!(Username::new(input), Err(expected));
}

#[rstest]
fn overlong_usernames_are_rejected() {
    let long = "a".repeat(USERNAME_MAX + 1);
    assert_eq!(
        Username::new(long),
        Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX })
    );
}

#[rstest]
#[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6")]
#[case("not-a-uuid")]
fn user_ids_must_be_canonical(#[case] input: &str) {
    assert_eq!(UserId::new(input), Err(UserValidationError::InvalidId));
}

#[rstest]
#[case(Role::Admin)]
#[case(Role::Doctor)]
#[case(Role::Reception)]
fn staff_roles_require_a_password(#[case] role: Role, created_at: DateTime<Utc>) {
    let result = User::new(draft(role, Credential::Unusable, created_at));
    assert_eq!(result, Err(UserValidationError::PasswordRequired { role }));
}

#[rstest]
fn patients_may_be_passwordless(created_at: DateTime<Utc>) {
    let user = User::new(draft(Role::Patient, Credential::Unusable, created_at))
        .expect("passwordless patient");
    assert!(!user.credential().is_usable());
    assert!(user.is_active());
    assert_eq!(user.login_attempts().failed(), 0);
}

#[rstest]
#[case("admin", Role::Admin)]
#[case("doctor", Role::Doctor)]
#[case("reception", Role::Reception)]
#[case("patient", Role::Patient)]
fn roles_round_trip_through_storage_names(#[case] raw: &str, #[case] role: Role) {
    assert_eq!(raw.parse::<Role>(), Ok(role));
    assert_eq!(role.as_str(), raw);
}

#[rstest]
fn unknown_roles_are_rejected() {
    assert_eq!(
        "nurse".parse::<Role>(),
        Err(UserValidationError::UnknownRole("nurse".to_owned()))
    );
}

#[rstest]
fn password_hash_debug_is_redacted() {
    let hash = PasswordHash::new("$pbkdf2-sha256$i=1$salt$hash");
    assert_eq!(format!("{hash:?}"), "PasswordHash(..)");
}

#[rstest]
fn identifiers_serialise_as_strings() {
    let id = UserId::new(VALID_ID).expect("valid id");
    assert_eq!(serde_json::to_value(id).expect("serialise"), json!(VALID_ID));
    let phone: PhoneNumber = serde_json::from_value(json!("0020 101 234 5678")).expect("phone");
    assert_eq!(phone.as_ref(), "+201012345678");
}

#[given("a doctor draft without a password")]
fn a_doctor_draft_without_a_password(created_at: DateTime<Utc>) -> UserDraft {
    draft(Role::Doctor, Credential::Unusable, created_at)
}

#[when("the user is built")]
fn the_user_is_built(draft: UserDraft) -> Result<User, UserValidationError> {
    User::new(draft)
}

#[then("creation is refused for the doctor role")]
fn creation_is_refused_for_the_doctor_role(result: Result<User, UserValidationError>) {
    assert_eq!(
        result,
        Err(UserValidationError::PasswordRequired { role: Role::Doctor })
    );
}

#[rstest]
fn doctor_without_password_behaviour(created_at: DateTime<Utc>) {
    let draft = a_doctor_draft_without_a_password(created_at);
    let result = the_user_is_built(draft);
    creation_is_refused_for_the_doctor_role(result);
}

#[rstest]
#[case(UserValidationError::InvalidPhone, "phone", "invalid_phone")]
#[case(
    UserValidationError::PasswordRequired { role: Role::Reception },
    "password",
    "password_required"
)]
fn validation_errors_become_invalid_requests(
    #[case] err: UserValidationError,
    #[case] field: &str,
    #[case] code: &str,
) {
    let error = crate::domain::Error::from(err);
    assert_eq!(error.code(), crate::domain::ErrorCode::InvalidRequest);
    let details = error.details().expect("details");
    assert_eq!(details.get("field"), Some(&json!(field)));
    assert_eq!(details.get("code"), Some(&json!(code)));
}
