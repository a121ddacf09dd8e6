//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Accounts for every role.
    users (id) {
        id -> Uuid,
        /// Unique login name (max 150 characters).
        username -> Varchar,
        /// Unique phone number in E.164 form.
        phone -> Varchar,
        /// One of `admin`, `doctor`, `reception`, `patient`.
        role -> Varchar,
        /// PHC string; `NULL` for passwordless patients.
        password_hash -> Nullable<Text>,
        failed_login_attempts -> Int4,
        last_login_attempt -> Nullable<Timestamptz>,
        account_locked_until -> Nullable<Timestamptz>,
        is_active -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// One partition per doctor.
    tenants (id) {
        id -> Uuid,
        schema_name -> Varchar,
        doctor_user_id -> Uuid,
        major -> Varchar,
        addresses -> Varchar,
        default_cost -> Int4,
        default_prior_cost -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Host names used to build post-login redirects.
    tenant_domains (domain) {
        domain -> Varchar,
        tenant_id -> Uuid,
        is_primary -> Bool,
    }
}

diesel::table! {
    receptions (id) {
        id -> Uuid,
        user_id -> Uuid,
        tenant_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    patients (id) {
        id -> Uuid,
        user_id -> Uuid,
        tenant_id -> Uuid,
        /// Validated to `[0, 100]`.
        age -> Int2,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Visits; `cost` is written once at insert time.
    appointments (id) {
        id -> Uuid,
        patient_id -> Uuid,
        tenant_id -> Uuid,
        date -> Date,
        status -> Varchar,
        is_prior -> Bool,
        cost -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Diagnoses, prescriptions, and requirements.
    clinical_notes (id) {
        id -> Uuid,
        appointment_id -> Uuid,
        tenant_id -> Uuid,
        kind -> Varchar,
        body -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(tenants -> users (doctor_user_id));
diesel::joinable!(tenant_domains -> tenants (tenant_id));
diesel::joinable!(receptions -> users (user_id));
diesel::joinable!(patients -> users (user_id));
diesel::joinable!(appointments -> patients (patient_id));
diesel::joinable!(clinical_notes -> appointments (appointment_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    tenants,
    tenant_domains,
    receptions,
    patients,
    appointments,
    clinical_notes,
);
