//! SSH integration tests
//!
//! These tests need a reachable SSH server that accepts a private key and
//! provides the `sftp` subsystem. They are skipped unless
//! `SIMPLYSSH_TEST_HOST` is set.
//!
//! ## Running the tests
//!
//! ```bash
//! SIMPLYSSH_TEST_HOST=127.0.0.1 \
//! SIMPLYSSH_TEST_PORT=2222 \
//! SIMPLYSSH_TEST_USER=testuser \
//! SIMPLYSSH_TEST_KEY=~/.ssh/id_ed25519 \
//!     cargo test --test ssh_integration
//! ```

#[macro_use]
pub mod fixtures;

mod connection_tests;
mod sftp_tests;
