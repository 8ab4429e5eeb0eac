//! Integration tests for Courier.

pub mod gate_test;
pub mod polling_test;
pub mod registry_test;
