//! State-level unit tests.

mod bonding_tests;
mod validator_set_tests;
