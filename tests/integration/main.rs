//! Integration test entry point.

mod duties_tests;
mod node_loop_tests;
