//! Application state for the terminal wizard.
//!
//! The `App` struct owns what only the terminal needs (edit buffers, cursors,
//! the current mode) and forwards everything else to the shared
//! [`WizardController`]. Network work is spawned on a tokio runtime so the
//! render loop never blocks on the backend.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::runtime::Handle;

use crate::core::{SubscriptionId, UploadFile, MAX_FILE_SIZE};
use crate::tui::Theme;
use crate::wizard::{TaskBoard, View, WizardController, WizardStatus, WizardStep};

/// Pause in typing after which the description is saved.
pub const DESCRIPTION_SAVE_DELAY: Duration = Duration::from_millis(400);

/// Application modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppMode {
    /// Editing the current step or browsing the board
    #[default]
    Normal,

    /// Showing keyboard shortcuts
    Help,

    /// Asking before clearing all input
    ConfirmReset,
}

/// A single-line or multi-line text buffer with a cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    text: String,
    /// Cursor position as a byte offset on a char boundary
    cursor: usize,
}

impl TextInput {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.len();
        Self { text, cursor }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn insert(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Delete the character before the cursor.
    pub fn backspace(&mut self) -> bool {
        match self.text[..self.cursor].chars().next_back() {
            Some(c) => {
                self.cursor -= c.len_utf8();
                self.text.remove(self.cursor);
                true
            }
            None => false,
        }
    }

    /// Delete the character at the cursor.
    pub fn delete(&mut self) -> bool {
        if self.cursor < self.text.len() {
            self.text.remove(self.cursor);
            true
        } else {
            false
        }
    }

    pub fn move_left(&mut self) {
        if let Some(c) = self.text[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
        }
    }

    pub fn move_right(&mut self) {
        if let Some(c) = self.text[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    pub fn move_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.len();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }
}

/// Main application state.
pub struct App {
    /// Shared wizard state machine
    pub controller: Arc<WizardController>,

    /// Runtime that runs uploads and task generation
    runtime: Handle,

    /// Integrations offered on the last step
    pub integrations: Vec<String>,

    /// Description being edited
    pub description: TextInput,

    /// Time of the last description edit not yet saved
    description_edited: Option<Instant>,

    /// File paths typed on an upload step, comma-separated
    pub path_input: TextInput,

    /// Highlighted row in the integration list
    pub integration_cursor: usize,

    /// Generated tasks and the board selection
    pub board: TaskBoard,

    /// Controller state as of the last tick
    pub status: WizardStatus,

    /// Current mode of the application
    pub mode: AppMode,

    /// Whether the application should quit
    pub should_quit: bool,

    /// Status message to display (if any)
    pub status_message: Option<String>,

    /// Current UI theme
    pub theme: Theme,

    /// Set by the store whenever tasks may have changed
    tasks_changed: Arc<AtomicBool>,

    subscription: SubscriptionId,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("status", &self.status)
            .field("mode", &self.mode)
            .field("should_quit", &self.should_quit)
            .finish_non_exhaustive()
    }
}

impl App {
    /// Create the application around a controller.
    ///
    /// `runtime` must stay alive for as long as the app runs.
    pub fn new(controller: Arc<WizardController>, integrations: Vec<String>, runtime: Handle) -> Self {
        let store = controller.store();
        let description = TextInput::new(store.user_input().description);
        let board = TaskBoard::new(store.tasks());

        let tasks_changed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&tasks_changed);
        let subscription = store.subscribe(move |_| flag.store(true, Ordering::Release));

        let status = controller.status();
        Self {
            controller,
            runtime,
            integrations,
            description,
            description_edited: None,
            path_input: TextInput::default(),
            integration_cursor: 0,
            board,
            status,
            mode: AppMode::Normal,
            should_quit: false,
            status_message: None,
            theme: Theme::default(),
            tasks_changed,
            subscription,
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// The input step on screen, if any.
    pub fn step(&self) -> Option<WizardStep> {
        self.status.view.step()
    }

    pub fn on_task_board(&self) -> bool {
        self.status.view == View::TaskBoard
    }

    /// Perform periodic updates (called on tick).
    pub fn tick(&mut self) {
        if self.description_edited.is_some_and(|at| at.elapsed() >= DESCRIPTION_SAVE_DELAY) {
            self.save_description();
        }

        let previous = self.status.view;
        self.status = self.controller.status();

        if self.tasks_changed.swap(false, Ordering::AcqRel) {
            let selected = self.board.selected_task().map(|t| t.id.clone());
            self.board = TaskBoard::new(self.controller.store().tasks());
            if let Some(id) = selected {
                self.board.select_id(&id);
            }
            // Reset clears the store; bring the editor in line with it
            let stored = self.controller.store().user_input().description;
            if self.description_edited.is_none() && stored != self.description.as_str() {
                self.description = TextInput::new(stored);
            }
        }

        if previous != self.status.view {
            self.path_input.clear();
            self.status_message = None;
        }
    }

    pub fn quit(&mut self) {
        self.save_description();
        self.should_quit = true;
    }

    // --- Text editing ---

    /// The buffer that receives typed characters on the current view.
    fn active_input(&mut self) -> Option<&mut TextInput> {
        match self.step()? {
            WizardStep::Description => Some(&mut self.description),
            WizardStep::Requirements | WizardStep::Inspiration => Some(&mut self.path_input),
            WizardStep::Integrations => None,
        }
    }

    /// Apply an edit to the active buffer.
    ///
    /// Description changes are saved once typing pauses for
    /// [`DESCRIPTION_SAVE_DELAY`], or earlier when the view changes.
    pub fn edit(&mut self, op: impl FnOnce(&mut TextInput) -> bool) {
        let on_description = self.step() == Some(WizardStep::Description);
        let changed = self.active_input().is_some_and(op);
        if changed && on_description {
            self.description_edited = Some(Instant::now());
        }
    }

    /// Save pending description edits.
    pub fn save_description(&mut self) {
        if self.description_edited.take().is_some() {
            self.controller.set_description(self.description.as_str());
        }
    }

    pub fn enter_char(&mut self, c: char) {
        self.edit(|input| {
            input.insert(c);
            true
        });
    }

    pub fn move_cursor(&mut self, op: impl FnOnce(&mut TextInput)) {
        if let Some(input) = self.active_input() {
            op(input);
        }
    }

    // --- Navigation ---

    /// Go to the next step, or generate tasks from the last one.
    pub fn advance(&mut self) {
        if self.on_task_board() {
            return;
        }
        self.save_description();
        if let Some(view) = self.controller.next_step() {
            self.status.view = view;
            self.path_input.clear();
            self.status_message = None;
            return;
        }
        if self.controller.is_busy() {
            self.status_message = Some("Still working on the last request".to_string());
            return;
        }

        self.status_message = Some("Generating tasks...".to_string());
        let controller = Arc::clone(&self.controller);
        self.runtime.spawn(async move {
            // Failures are recorded on the controller and shown from there
            let _ = controller.advance().await;
        });
    }

    pub fn back(&mut self) {
        self.save_description();
        self.controller.back();
        self.tick();
    }

    pub fn select_pill(&mut self, index: usize) {
        self.save_description();
        if let Err(e) = self.controller.select_pill(index) {
            self.status_message = Some(e.to_string());
        }
        self.tick();
    }

    pub fn back_to_wizard(&mut self) {
        self.controller.back_to_wizard();
        self.tick();
    }

    // --- Uploads ---

    /// Paths typed into the upload prompt.
    pub fn typed_paths(&self) -> Vec<PathBuf> {
        parse_paths(self.path_input.as_str())
    }

    /// Read the typed files and send them for processing.
    pub fn submit_upload(&mut self) {
        let paths = self.typed_paths();
        if paths.is_empty() {
            self.status_message = Some("Enter the path of a file to upload".to_string());
            return;
        }
        if self.controller.is_busy() {
            self.status_message = Some("Still working on the last request".to_string());
            return;
        }

        let max_size = self
            .step()
            .and_then(|step| self.controller.policy(step))
            .map_or(MAX_FILE_SIZE, |policy| policy.max_file_size);
        let mut files = Vec::with_capacity(paths.len());
        for path in &paths {
            match UploadFile::from_path(path, max_size) {
                Ok(file) => files.push(file),
                Err(e) => {
                    self.status_message = Some(e.to_string());
                    return;
                }
            }
        }

        let names: Vec<_> = files.iter().map(|f| f.name.clone()).collect();
        self.status_message = Some(format!("Uploading {}...", names.join(", ")));
        let controller = Arc::clone(&self.controller);
        self.runtime.spawn(async move {
            let _ = controller.upload_files(files).await;
        });
    }

    // --- Integrations ---

    pub fn integration_next(&mut self) {
        if !self.integrations.is_empty() {
            self.integration_cursor = (self.integration_cursor + 1) % self.integrations.len();
        }
    }

    pub fn integration_previous(&mut self) {
        if !self.integrations.is_empty() {
            self.integration_cursor =
                self.integration_cursor.checked_sub(1).unwrap_or(self.integrations.len() - 1);
        }
    }

    /// Toggle the highlighted integration.
    pub fn toggle_integration(&mut self) {
        if let Some(name) = self.integrations.get(self.integration_cursor) {
            let selected = self.controller.toggle_integration(name);
            tracing::debug!("{} {}", if selected { "Selected" } else { "Deselected" }, name);
        }
    }

    pub fn is_integration_selected(&self, name: &str) -> bool {
        self.controller.store().user_input().integrations.iter().any(|i| i == name)
    }

    // --- Reset ---

    pub fn request_reset(&mut self) {
        self.mode = AppMode::ConfirmReset;
    }

    pub fn confirm_reset(&mut self) {
        self.mode = AppMode::Normal;
        self.description_edited = None;
        match self.controller.reset() {
            Ok(()) => self.status_message = Some("Started over".to_string()),
            Err(e) => self.status_message = Some(e.to_string()),
        }
        self.description = TextInput::default();
        self.path_input.clear();
        self.integration_cursor = 0;
        self.tick();
    }

    pub fn cancel_mode(&mut self) {
        self.mode = AppMode::Normal;
    }

    pub fn show_help(&mut self) {
        self.mode = AppMode::Help;
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.save_description();
        self.controller.store().unsubscribe(self.subscription);
    }
}

/// Split a comma-separated list of paths, expanding a leading `~`.
pub fn parse_paths(input: &str) -> Vec<PathBuf> {
    input
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| match p.strip_prefix("~/") {
            Some(rest) => dirs::home_dir().map_or_else(|| PathBuf::from(p), |home| home.join(rest)),
            None => PathBuf::from(p),
        })
        .collect()
}
