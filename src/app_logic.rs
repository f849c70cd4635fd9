/*
 * The application logic layer. `PasteAppLogic` owns all state and turns
 * `AppEvent`s into state transitions plus `UiCommand` notifications;
 * `ViewState` holds presentation-only state; `tree_view` groups the displayed
 * list into a folder tree. Tests for `PasteAppLogic` live in `handler_tests.rs`.
 */
pub mod handler;
pub mod tree_view;
pub mod view_state;

#[cfg(test)]
mod handler_tests;

pub use handler::{AppEvent, PasteAppLogic, UiCommand};
pub use tree_view::CheckState;
pub use view_state::{ProcessingStatus, ViewState};
