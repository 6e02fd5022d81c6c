//! TUI widgets

pub mod help;
pub mod overview;
pub mod recommendations;
pub mod services;
pub mod spinner;
pub mod tabs;
