//! Whole-tick integration tests

mod editing_integration;
mod tick_integration;
