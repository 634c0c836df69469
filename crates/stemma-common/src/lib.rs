//! # stemma-common
//!
//! Shared types, error definitions, diagnostics, configuration models, and
//! constants used across the entire Stemma workspace.
//!
//! This crate is the leaf of the dependency graph. It depends on no other
//! internal crate and provides the primitives that all other crates build upon.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod constants;
pub mod diagnostic;
pub mod error;
pub mod types;
