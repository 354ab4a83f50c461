//! Shared plumbing for the Stockline workspace.
//!
//! Currently this only hosts the [`observability`] module, which centralises
//! `tracing` initialisation so that the binary and integration tests emit
//! into the same rolling file sink. Domain errors live in the crates that
//! produce them.

pub mod observability;
