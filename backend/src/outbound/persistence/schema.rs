//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly; Diesel uses
//! them for compile-time query validation. Regenerate with
//! `diesel print-schema` when migrations change.

diesel::table! {
    /// Registered user accounts.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique email address (original casing preserved).
        email -> Varchar,
        /// Argon2 hash in PHC string format.
        password_hash -> Text,
    }
}

diesel::table! {
    /// To-do items, one row per task.
    tasks (id) {
        /// Primary key: client-generated opaque identifier.
        id -> Text,
        /// Task label shown in the list.
        name -> Varchar,
        /// One of `low`, `medium`, `high`.
        priority -> Varchar,
        /// One of `in progress`, `completed`.
        status -> Varchar,
        /// Owning user.
        user_id -> Uuid,
    }
}

diesel::table! {
    /// Active login sessions.
    sessions (id) {
        /// Primary key: opaque session token.
        id -> Text,
        /// Owning user.
        user_id -> Uuid,
        /// Instant after which the session is no longer valid.
        expires_at -> Timestamptz,
    }
}

diesel::joinable!(tasks -> users (user_id));
diesel::joinable!(sessions -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, tasks, sessions);
