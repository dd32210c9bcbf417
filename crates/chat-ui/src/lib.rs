//! egui presentation layer: sidebar, chat panel, theme, and the per-frame
//! UI state fed from the event bus.

pub mod format;
pub mod panels;
pub mod state;
pub mod theme;
