//! UMD Courses Library
//!
//! Course catalog client with caching and a fixture-backed mock mode, plus the
//! terminal interface built on it. Modules are public for integration tests.

pub mod app;
pub mod cache;
pub mod catalog;
pub mod cli;
pub mod clock;
pub mod display;
pub mod settings;
pub mod ui;
