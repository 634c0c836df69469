//! # stemma-schema
//!
//! Typed records for the three files that make up a component unit, and
//! the provider that turns unit directories into those records.
//!
//! Handles:
//! - **Records**: declaration, contracts, and annotation records.
//! - **Parsed**: the `{value | diagnostic}` result of reading one file.
//! - **Source**: directory access needed to locate and read unit files.
//! - **Provider**: YAML parsing of unit files into records.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod parsed;
pub mod provider;
pub mod records;
pub mod source;
