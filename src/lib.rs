//! # Credo
//!
//! `credo` is a small credential verification service: it registers users
//! (username uniqueness check, salted password hash, single atomic create)
//! and logs them in (constant-time hash verification, opaque token issuance).
//!
//! The core lives in [`auth`]: a stateless password hasher plus an
//! orchestrator that talks to two collaborators, a [`auth::UserStore`] and a
//! [`auth::TokenIssuer`], both passed in explicitly. The HTTP surface in
//! [`api`] is glue over that core.
//!
//! ## Storage
//!
//! The production store is PostgreSQL (`sql/schema.sql`). Username
//! uniqueness is enforced by a unique index on `lower(btrim(username))`, so
//! the check-then-create window in register is closed by the database, not
//! by application locking.

pub mod api;
pub mod auth;
pub mod cli;
