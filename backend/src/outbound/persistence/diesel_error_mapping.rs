//! Shared Diesel error mapping for every clinic repository.
//!
//! Each port error implements [`StoreError`], so adapters map pool and Diesel
//! failures through one function instead of repeating the match per table.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::{
    AppointmentRepositoryError, ClinicalNoteRepositoryError, PatientRepositoryError,
    ReceptionRepositoryError, TenantRepositoryError, UserPersistenceError,
};

use super::pool::PoolError;

/// Constructors shared by the repository port errors.
pub(crate) trait StoreError: Sized {
    fn connection(message: String) -> Self;
    fn query(message: String) -> Self;

    /// Ports without a duplicate variant report the clash as a query error.
    fn duplicate(field: &'static str) -> Self {
        Self::query(format!("{field} already exists"))
    }
}

macro_rules! store_error {
    (@impl $error:ty { $($duplicate:tt)* }) => {
        impl StoreError for $error {
            fn connection(message: String) -> Self {
                <$error>::connection(message)
            }

            fn query(message: String) -> Self {
                <$error>::query(message)
            }

            $($duplicate)*
        }
    };
    (with_duplicates: $($error:ty),+ $(,)?) => {
        $(
            store_error!(@impl $error {
                fn duplicate(field: &'static str) -> Self {
                    <$error>::duplicate(field)
                }
            });
        )+
    };
    ($($error:ty),+ $(,)?) => {
        $( store_error!(@impl $error {}); )+
    };
}

store_error!(AppointmentRepositoryError, ClinicalNoteRepositoryError);
store_error!(
    with_duplicates: UserPersistenceError,
    TenantRepositoryError,
    PatientRepositoryError,
    ReceptionRepositoryError,
);

/// Map pool errors into a repository connection error.
pub(crate) fn map_pool_error<E: StoreError>(error: PoolError) -> E {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => E::connection(message),
    }
}

/// Name the unique value a constraint protects.
fn duplicate_field(constraint: Option<&str>) -> &'static str {
    match constraint.unwrap_or_default() {
        name if name.contains("username") => "username",
        name if name.contains("phone") => "phone",
        name if name.contains("schema_name") => "schema_name",
        name if name.starts_with("tenant_domains") => "domain",
        _ => "record",
    }
}

/// Map Diesel errors into repository errors.
///
/// Unique violations become duplicates naming the clashing field; lost
/// connections become connection errors; everything else is a query error.
pub(crate) fn map_diesel_error<E: StoreError>(error: DieselError) -> E {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => E::query("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => E::query("database query error".to_owned()),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            E::duplicate(duplicate_field(info.constraint_name()))
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            E::connection("database connection error".to_owned())
        }
        _ => E::query("database error".to_owned()),
    }
}

/// Map a row that failed domain validation.
pub(crate) fn map_row_error<E: StoreError>(message: String) -> E {
    debug!(%message, "stored row failed validation");
    E::query(format!("invalid stored row: {message}"))
}

/// Convert rows, failing on the first invalid one.
pub(crate) fn collect_rows<R, T, E: StoreError>(
    rows: Vec<R>,
    convert: impl Fn(R) -> Result<T, String>,
) -> Result<Vec<T>, E> {
    rows.into_iter()
        .map(convert)
        .collect::<Result<Vec<_>, _>>()
        .map_err(map_row_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("users_username_key"), "username")]
    #[case(Some("users_phone_key"), "phone")]
    #[case(Some("tenants_schema_name_key"), "schema_name")]
    #[case(Some("tenant_domains_pkey"), "domain")]
    #[case(Some("receptions_user_id_key"), "record")]
    #[case(None, "record")]
    fn unique_constraints_name_their_field(
        #[case] constraint: Option<&str>,
        #[case] expected: &str,
    ) {
        assert_eq!(duplicate_field(constraint), expected);
    }

    #[rstest]
    fn pool_failures_are_connection_errors() {
        let err: UserPersistenceError = map_pool_error(PoolError::checkout("timed out"));
        assert!(matches!(err, UserPersistenceError::Connection { .. }));
    }

    #[rstest]
    fn not_found_is_a_query_error() {
        let err: AppointmentRepositoryError = map_diesel_error(DieselError::NotFound);
        assert!(matches!(err, AppointmentRepositoryError::Query { .. }));
    }

    #[rstest]
    fn ports_without_duplicates_fall_back_to_query() {
        let err = <ClinicalNoteRepositoryError as StoreError>::duplicate("record");
        assert!(matches!(err, ClinicalNoteRepositoryError::Query { .. }));
    }

    #[rstest]
    fn invalid_rows_surface_as_query_errors() {
        let rows = vec![Ok(1), Err("bad age".to_owned())];
        let result: Result<Vec<i32>, PatientRepositoryError> = collect_rows(rows, |row| row);
        let err = result.expect_err("invalid row");
        assert!(err.to_string().contains("bad age"));
    }
}
