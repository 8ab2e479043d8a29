//! Integration tests for the pic-rs crates.
//!
//! End-to-end properties that span the facade, the codec adapters, and the
//! transfer utilities together.
