//! Shared validation helpers for inbound HTTP adapters.
//!
//! Path segments and loosely typed body fields are parsed here so every
//! handler reports the same `{field, code}` details on bad input.

use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidDate,
    EmptyChange,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidDate => "invalid_date",
            ErrorCode::EmptyChange => "empty_change",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, message: String, code: ErrorCode) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

fn value_error(field: FieldName, message: String, code: ErrorCode, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    field_error(
        field,
        format!("missing required field: {name}"),
        ErrorCode::MissingField,
    )
}

pub(crate) fn empty_change_error(field: FieldName) -> Error {
    field_error(
        field,
        "at least one of status or date must be supplied".to_owned(),
        ErrorCode::EmptyChange,
    )
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| {
        let name = field.as_str();
        value_error(
            field,
            format!("{name} must be a valid UUID"),
            ErrorCode::InvalidUuid,
            value,
        )
    })
}

/// Parse a calendar date in `YYYY-MM-DD` form.
pub(crate) fn parse_date(value: &str, field: FieldName) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        let name = field.as_str();
        value_error(
            field,
            format!("{name} must be a YYYY-MM-DD date"),
            ErrorCode::InvalidDate,
            value,
        )
    })
}

pub(crate) fn parse_optional_date(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<NaiveDate>, Error> {
    value.map(|raw| parse_date(raw, field)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode as DomainCode;
    use rstest::rstest;

    const DATE: FieldName = FieldName::new("date");

    #[rstest]
    #[case("2026-03-01")]
    #[case(" 2026-03-01 ")]
    fn dates_parse_in_iso_form(#[case] raw: &str) {
        let date = parse_date(raw, DATE).expect("valid date");
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 3, 1).expect("date"));
    }

    #[rstest]
    #[case("01/03/2026")]
    #[case("2026-02-30")]
    #[case("")]
    fn malformed_dates_name_the_field(#[case] raw: &str) {
        let err = parse_date(raw, DATE).expect_err("invalid date");
        assert_eq!(err.code(), DomainCode::InvalidRequest);
        let details = err.details().expect("details");
        assert_eq!(details["field"], "date");
        assert_eq!(details["code"], "invalid_date");
        assert_eq!(details["value"], raw);
    }

    #[rstest]
    fn bad_uuids_echo_the_value() {
        let err = parse_uuid("not-a-uuid", FieldName::new("userId")).expect_err("invalid");
        let details = err.details().expect("details");
        assert_eq!(details["code"], "invalid_uuid");
        assert_eq!(details["value"], "not-a-uuid");
    }

    #[rstest]
    fn absent_optional_dates_are_none() {
        assert_eq!(parse_optional_date(None, DATE).expect("ok"), None);
    }
}
