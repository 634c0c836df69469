//! # stemma-resolve
//!
//! Pure resolution steps applied to each component unit.
//!
//! Handles:
//! - **Inheritance**: single-level contract merging with exclusions.
//! - **Tokens**: cross-referencing contract prose against declared tokens.
//! - **Composition**: deciding whether one component may contain another.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod composition;
pub mod inheritance;
pub mod tokens;
