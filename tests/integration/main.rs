//! Integration tests for Spell-Harvest
//!
//! These tests use wiremock to serve listing and detail pages and drive the
//! loader, workers, and pipeline end-to-end over real HTTP.

mod common;
mod loader_tests;
mod pipeline_tests;
