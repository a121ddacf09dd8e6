//! `define_port_error!`: port error enums that know their domain error code.
//!
//! Each variant names its display message, the [`ErrorCode`] it surfaces as,
//! and optionally a JSON details object built from its fields:
//!
//! ```ignore
//! define_port_error! {
//!     pub enum PatientRepositoryError {
//!         Connection { message: String } => "connection failed: {message}"; ServiceUnavailable,
//!         Duplicate { field: String } => "{field} is taken"; Conflict {
//!             "field": field,
//!             "code": "duplicate",
//!         },
//!     }
//! }
//! ```
//!
//! The macro emits the enum, one snake-case constructor per variant taking
//! `impl Into<_>` arguments, and `From<Enum> for Error`.
//!
//! [`ErrorCode`]: crate::domain::ErrorCode

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* }) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                Self::$variant { $($field: $field.into()),* }
            }
        }
    };

    (@details $error:ident) => { $error };
    (@details $error:ident { $($detail:tt)* }) => {
        $error.with_details(::serde_json::json!({ $($detail)* }))
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )?
                    => $message:expr ; $code:ident $( { $($detail:tt)* } )?
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*

            /// Domain error code this failure surfaces as.
            pub fn code(&self) -> $crate::domain::ErrorCode {
                match self {
                    $( Self::$variant { .. } => $crate::domain::ErrorCode::$code, )*
                }
            }
        }

        impl From<$name> for $crate::domain::Error {
            #[allow(unused_variables)]
            fn from(err: $name) -> Self {
                let error = $crate::domain::Error::new(err.code(), err.to_string());
                match err {
                    $(
                        $name::$variant $( { $($field),* } )? => {
                            define_port_error!(@details error $( { $($detail)* } )?)
                        }
                    )*
                }
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    use crate::domain::{Error, ErrorCode};
    use serde_json::json;

    define_port_error! {
        pub enum BookingPortError {
            Unreachable { message: String } => "store unreachable: {message}"; ServiceUnavailable,
            Overbooked { date: String, count: u32 } => "{count} visits already on {date}"; Conflict {
                "field": "date",
                "booked": count,
            },
            Closed => "clinic closed"; Forbidden,
        }
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        let err = BookingPortError::unreachable("pool exhausted");
        assert_eq!(err.to_string(), "store unreachable: pool exhausted");
    }

    #[test]
    fn constructors_support_mixed_fields() {
        let err = BookingPortError::overbooked("2026-03-05", 12_u32);
        assert_eq!(err.to_string(), "12 visits already on 2026-03-05");
    }

    #[test]
    fn unit_variants_get_constructors() {
        assert_eq!(BookingPortError::closed(), BookingPortError::Closed);
    }

    #[test]
    fn variants_map_to_their_codes() {
        let error: Error = BookingPortError::unreachable("down").into();
        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
        assert_eq!(error.message(), "store unreachable: down");
        assert!(error.details().is_none());

        let error: Error = BookingPortError::closed().into();
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[test]
    fn details_are_built_from_fields() {
        let error: Error = BookingPortError::overbooked("2026-03-05", 12_u32).into();
        assert_eq!(error.code(), ErrorCode::Conflict);
        assert_eq!(
            error.details(),
            Some(&json!({ "field": "date", "booked": 12 }))
        );
    }
}
