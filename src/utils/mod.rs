//! Shared helpers for the binary and storage backends.

pub mod bootstrap;
