//! Glow - A TUI for building AI-assisted beauty routines
//!
//! This library exposes the core types for testing.
//! The binary entry point is in main.rs.

pub mod app;
pub mod catalog;
pub mod config;
pub mod input;
pub mod markdown;
pub mod provider;
pub mod selection;
pub mod storage;
pub mod theme;
pub mod transcript;
pub mod ui;
