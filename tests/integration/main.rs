//! Integration tests for bucket-probe.
//!
//! `audit_test` runs the whole audit pipeline against the in-memory gateway
//! and always runs. `localstack_test` needs LocalStack and is marked
//! `#[ignore]` by default.
//!
//! ## Running LocalStack Tests
//!
//! 1. Start LocalStack:
//!    ```bash
//!    docker run --rm -d -p 4566:4566 localstack/localstack
//!    ```
//!
//! 2. Run the ignored tests:
//!    ```bash
//!    LOCALSTACK_ENDPOINT=http://localhost:4566 cargo test -p bp-integration-tests -- --ignored
//!    ```

mod audit_test;
mod localstack_test;
