//! Wizard state machine and task board.

mod board;
mod controller;
mod steps;

pub use board::{TaskBoard, COLUMNS};
pub use controller::{Completion, WizardController, WizardStatus};
pub use steps::{UploadState, View, WizardStep};
