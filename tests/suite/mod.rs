//! Integration test suite modules

mod orchestrator;
mod provider;
mod storage;
mod ui;
