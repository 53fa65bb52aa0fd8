//! UI rendering module for the UMD course browser
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components.

pub mod course_detail;
pub mod course_list;
pub mod help_overlay;

pub use course_detail::render as render_course_detail;
pub use course_list::render_course_list;
pub use help_overlay::render as render_help_overlay;
