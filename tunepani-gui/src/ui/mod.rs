//! # UI Module
//!
//! This module contains all UI components for the Tunepani drum tuner.

pub mod gauge;
pub mod main_display;
pub mod pad_area;
pub mod sidebar;
pub mod tutorial;
