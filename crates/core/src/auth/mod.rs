//! Authentication primitives.
//!
//! Password hashing with Argon2id. Role and group membership are resolved by
//! [`crate::authz`].

mod password;

pub use password::{
    MIN_PASSWORD_LEN, PasswordError, hash_password, verify_or_dummy, verify_password,
};
