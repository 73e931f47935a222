//! Shared infrastructure for bucket-probe integration tests.
//!
//! LocalStack client setup and bucket fixtures. In-memory doubles live in
//! `bp_auditor::testing`.

pub mod localstack;

pub use localstack::{LocalStackTestContext, probe_object};
