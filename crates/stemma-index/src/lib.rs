//! # stemma-index
//!
//! The component index orchestrator.
//!
//! Scans a component root, assembles one [`ComponentMetadata`](metadata::ComponentMetadata)
//! per unit from its declaration, merged contracts, annotations, and token
//! relationships, and keeps the result as an atomically swapped snapshot.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod health;
pub mod index;
pub mod metadata;
pub mod scheduler;
