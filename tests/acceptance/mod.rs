//! Acceptance tests against the simulated board.

mod common;
mod config_file_test;
mod cross_validation_test;
mod liveness_test;
mod serialization_test;
