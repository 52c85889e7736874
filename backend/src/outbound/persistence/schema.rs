//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts. `username` and `email` carry unique constraints
    /// named `users_username_key` and `users_email_key`.
    users (id) {
        id -> Int4,
        username -> Varchar,
        email -> Text,
        /// Argon2id PHC string.
        password_hash -> Text,
        /// `caregiver` or `admin`.
        role -> Varchar,
    }
}

diesel::table! {
    /// The single patient row (`id = 1`).
    patients (id) {
        id -> Int4,
        name -> Text,
        age -> Int4,
    }
}

diesel::table! {
    care_events (id) {
        id -> Int4,
        patient_id -> Int4,
        title -> Text,
        description -> Text,
        start_time -> Timestamptz,
        end_time -> Timestamptz,
    }
}

diesel::table! {
    notes (id) {
        id -> Int4,
        patient_id -> Int4,
        content -> Text,
        timestamp -> Timestamptz,
    }
}

diesel::table! {
    images (id) {
        id -> Int4,
        patient_id -> Int4,
        /// Sanitised name of the file in the upload directory.
        filename -> Text,
        timestamp -> Timestamptz,
    }
}

diesel::joinable!(care_events -> patients (patient_id));
diesel::joinable!(notes -> patients (patient_id));
diesel::joinable!(images -> patients (patient_id));

diesel::allow_tables_to_appear_in_same_query!(users, patients, care_events, notes, images);
