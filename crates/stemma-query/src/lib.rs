//! # stemma-query
//!
//! Read-only queries over a [`ComponentIndex`](stemma_index::index::ComponentIndex).
//!
//! Projections come in three tiers of detail (catalog, summary, full) so
//! callers can bound response size. Every operation answers with a
//! [`QueryResult`](envelope::QueryResult) envelope; absence is reported in
//! its `error` field rather than as an `Err`.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod engine;
pub mod envelope;
pub mod metrics;
pub mod projection;
