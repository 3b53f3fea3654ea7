//! # Planwise
//!
//! Turn a project idea into a task plan from your terminal.
//!
//! Planwise walks you through four steps (describe the project, upload a
//! requirements document, add inspiration images, pick integrations), sends
//! what you entered to a task-generation backend and shows the resulting plan
//! as a board.
//!
//! ## Features
//!
//! - **Step wizard**: move freely between steps, nothing is lost on the way
//! - **Document and image extraction**: uploads are turned into text by the backend
//! - **Saved progress**: input and tasks survive restarts
//! - **Scriptable**: `planwise generate` runs the whole wizard non-interactively
//!
//! ## Quick Start
//!
//! ```bash
//! # Open the wizard
//! planwise
//!
//! # Or generate a plan in one go
//! planwise generate --description "Voice assistant" --requirements spec.pdf
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::significant_drop_tightening)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::future_not_send)]

pub mod api;
pub mod app;
pub mod core;
pub mod tui;
pub mod wizard;

// Re-export commonly used types
pub use api::{ApiClient, TaskService};
pub use app::App;
pub use core::{Config, ProcessedTask, UserInput, UserInputStore, WizardError, WizardResult};
pub use wizard::{TaskBoard, View, WizardController, WizardStep};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "planwise";
