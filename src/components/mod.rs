//! UI components.

pub mod chord;
