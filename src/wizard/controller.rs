//! Wizard controller.
//!
//! Drives step progression, routes uploads to the right extraction call and
//! writes results into the [`UserInputStore`].
//!
//! Only one upload or generation can be in flight at a time. Every
//! navigation, reset and new request bumps an epoch counter; a response that
//! comes back under an older epoch is dropped instead of being written to
//! the store.

use std::sync::Arc;

use parking_lot::Mutex;

use super::steps::{UploadState, View, WizardStep};
use crate::api::TaskService;
use crate::core::{
    Config, PersistenceError, UploadFile, UploadPolicy, UserInputStore, ValidationError,
    WizardError, WizardResult,
};

/// What happened to a completed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The result was written to the store
    Applied,
    /// The wizard moved on while the request was in flight
    Discarded,
}

/// Snapshot of the controller for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WizardStatus {
    pub view: View,
    pub busy: bool,
    /// Last user-visible failure
    pub last_error: Option<String>,
    /// Last save failure; the in-memory state is still current
    pub warning: Option<String>,
    pub requirements_upload: UploadState,
    pub inspiration_upload: UploadState,
}

#[derive(Debug, Default)]
struct ControllerState {
    status: WizardStatus,
    epoch: u64,
}

impl ControllerState {
    fn navigate(&mut self, view: View) {
        self.status.view = view;
        self.epoch += 1;
    }

    fn upload_slot(&mut self, step: WizardStep) -> Option<&mut UploadState> {
        match step {
            WizardStep::Requirements => Some(&mut self.status.requirements_upload),
            WizardStep::Inspiration => Some(&mut self.status.inspiration_upload),
            _ => None,
        }
    }
}

/// Identifies an in-flight request.
#[derive(Debug, Clone, Copy)]
struct Ticket {
    epoch: u64,
    view: View,
}

/// The wizard state machine.
pub struct WizardController {
    store: Arc<UserInputStore>,
    service: Arc<dyn TaskService>,
    requirements_policy: UploadPolicy,
    inspiration_policy: UploadPolicy,
    state: Mutex<ControllerState>,
}

impl std::fmt::Debug for WizardController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WizardController")
            .field("status", &self.status())
            .field("requirements_policy", &self.requirements_policy)
            .field("inspiration_policy", &self.inspiration_policy)
            .finish_non_exhaustive()
    }
}

impl WizardController {
    /// Create a controller with the default upload policies.
    pub fn new(store: Arc<UserInputStore>, service: Arc<dyn TaskService>) -> Self {
        Self {
            store,
            service,
            requirements_policy: UploadPolicy::documents(),
            inspiration_policy: UploadPolicy::images(),
            state: Mutex::new(ControllerState::default()),
        }
    }

    /// Create a controller using the configured upload limits.
    pub fn from_config(
        config: &Config,
        store: Arc<UserInputStore>,
        service: Arc<dyn TaskService>,
    ) -> Self {
        Self::new(store, service)
            .with_policies(config.uploads.requirements_policy(), config.uploads.inspiration_policy())
    }

    pub fn with_policies(mut self, requirements: UploadPolicy, inspiration: UploadPolicy) -> Self {
        self.requirements_policy = requirements;
        self.inspiration_policy = inspiration;
        self
    }

    /// Start on a specific view instead of the first step.
    pub fn with_view(self, view: View) -> Self {
        self.state.lock().status.view = view;
        self
    }

    pub fn store(&self) -> &Arc<UserInputStore> {
        &self.store
    }

    pub fn status(&self) -> WizardStatus {
        self.state.lock().status.clone()
    }

    pub fn view(&self) -> View {
        self.state.lock().status.view
    }

    pub fn is_busy(&self) -> bool {
        self.state.lock().status.busy
    }

    /// Upload policy for a file step.
    pub fn policy(&self, step: WizardStep) -> Option<&UploadPolicy> {
        match step {
            WizardStep::Requirements => Some(&self.requirements_policy),
            WizardStep::Inspiration => Some(&self.inspiration_policy),
            _ => None,
        }
    }

    // --- Navigation ---

    /// Move to the next step, or generate tasks from the last one.
    ///
    /// Returns the view after the call. On a generation failure the wizard
    /// stays on the integrations step and the stored tasks are unchanged.
    pub async fn advance(&self) -> WizardResult<View> {
        let view = self.view();
        if view == View::TaskBoard {
            return Ok(view);
        }
        if let Some(next) = self.next_step() {
            return Ok(next);
        }

        let ticket = self.begin(View::Step(WizardStep::Integrations))?;
        let input = self.store.user_input();
        tracing::info!("Generating tasks for {} integrations", input.integrations.len());
        let result = self.service.generate_tasks(&input).await;

        let mut state = self.state.lock();
        state.status.busy = false;
        if state.epoch != ticket.epoch {
            tracing::info!("Discarding task generation result started on {}", ticket.view);
            return Ok(state.status.view);
        }

        match result {
            Ok(tasks) => {
                tracing::info!("Received {} tasks", tasks.len());
                let saved = self.store.set_tasks(tasks);
                Self::note_saved(&mut state, saved);
                state.status.last_error = None;
                state.navigate(View::TaskBoard);
                Ok(View::TaskBoard)
            }
            Err(e) => {
                tracing::warn!("Task generation failed: {}", e);
                state.status.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Move to the following input step.
    ///
    /// Returns `None` on the last step and on the task board, where moving
    /// on means generating tasks.
    pub fn next_step(&self) -> Option<View> {
        let mut state = self.state.lock();
        let step = state.status.view.step()?;
        let next = View::Step(step.next()?);
        state.navigate(next);
        tracing::debug!("Advanced from {} to {}", step, next);
        Some(next)
    }

    /// Jump straight to a step by index.
    pub fn select_pill(&self, index: usize) -> WizardResult<()> {
        let step = WizardStep::from_index(index).ok_or(ValidationError::UnknownStep(index))?;
        self.state.lock().navigate(View::Step(step));
        tracing::debug!("Jumped to {}", step);
        Ok(())
    }

    /// Go back one step. Does nothing on the first step.
    pub fn back(&self) {
        let mut state = self.state.lock();
        let target = match state.status.view {
            View::TaskBoard => Some(WizardStep::Integrations),
            View::Step(step) => step.previous(),
        };
        if let Some(step) = target {
            state.navigate(View::Step(step));
        }
    }

    /// Leave the task board and return to the last step.
    pub fn back_to_wizard(&self) {
        self.state.lock().navigate(View::Step(WizardStep::Integrations));
    }

    // --- Input ---

    pub fn set_description(&self, text: impl Into<String>) {
        let saved = self.store.set_description(text);
        Self::note_saved(&mut self.state.lock(), saved);
    }

    /// Add or remove an integration. Returns whether it is now selected.
    pub fn toggle_integration(&self, name: &str) -> bool {
        let mut integrations = self.store.user_input().integrations;
        let selected = if let Some(pos) = integrations.iter().position(|i| i == name) {
            integrations.remove(pos);
            false
        } else {
            integrations.push(name.to_string());
            true
        };

        let saved = self.store.set_integrations(integrations);
        Self::note_saved(&mut self.state.lock(), saved);
        selected
    }

    /// Process files dropped on the current step.
    ///
    /// The first file is sent for text extraction. On the inspiration step
    /// every file is kept as image metadata.
    pub async fn upload_files(&self, files: Vec<UploadFile>) -> WizardResult<Completion> {
        let view = self.view();
        let step = match view.step() {
            Some(step) if step.accepts_uploads() => step,
            _ => {
                let err = ValidationError::NotAnUploadStep(view.to_string());
                self.state.lock().status.last_error = Some(err.to_string());
                return Err(err.into());
            }
        };

        if self.is_busy() {
            return Err(WizardError::Busy);
        }

        let policy = self.policy(step).cloned().unwrap_or_else(UploadPolicy::documents);
        if let Err(e) = policy.validate_all(&files) {
            tracing::warn!("Rejected upload on {}: {}", step, e);
            let mut state = self.state.lock();
            state.status.last_error = Some(e.to_string());
            if let Some(slot) = state.upload_slot(step) {
                *slot = UploadState::Error;
            }
            return Err(e.into());
        }

        let ticket = self.begin(view)?;
        let first = &files[0];
        tracing::info!("Processing {} on {}", first.name, step);
        let result = match step {
            WizardStep::Requirements => self.service.process_document(first).await,
            _ => self.service.process_image(first).await,
        };

        let mut state = self.state.lock();
        state.status.busy = false;
        if state.epoch != ticket.epoch {
            tracing::info!("Discarding upload result for {} started on {}", first.name, ticket.view);
            if let Some(slot) = state.upload_slot(step) {
                *slot = UploadState::Idle;
            }
            return Ok(Completion::Discarded);
        }

        match result {
            Ok(text) => {
                let saved = match step {
                    WizardStep::Requirements => {
                        self.store.set_requirements(text, Some(first.mime_type.clone()))
                    }
                    _ => self.store.replace_inspiration(&files, text),
                };
                Self::note_saved(&mut state, saved);
                state.status.last_error = None;
                if let Some(slot) = state.upload_slot(step) {
                    *slot = UploadState::Success;
                }
                Ok(Completion::Applied)
            }
            Err(e) => {
                tracing::warn!("Processing {} failed: {}", first.name, e);
                state.status.last_error = Some(e.to_string());
                if let Some(slot) = state.upload_slot(step) {
                    *slot = UploadState::Error;
                }
                Err(e)
            }
        }
    }

    /// Clear all input and tasks and return to the first step.
    pub fn reset(&self) -> WizardResult<()> {
        let saved = self.store.reset();
        let mut state = self.state.lock();
        let busy = state.status.busy;
        state.status = WizardStatus { busy, ..WizardStatus::default() };
        state.epoch += 1;
        tracing::info!("Wizard reset");
        saved.map_err(WizardError::from)
    }

    /// Mark a request as in flight.
    fn begin(&self, view: View) -> WizardResult<Ticket> {
        let mut state = self.state.lock();
        if state.status.busy {
            return Err(WizardError::Busy);
        }
        state.status.busy = true;
        state.epoch += 1;
        if let Some(step) = view.step() {
            if let Some(slot) = state.upload_slot(step) {
                *slot = UploadState::Uploading;
            }
        }
        Ok(Ticket { epoch: state.epoch, view })
    }

    fn note_saved(state: &mut ControllerState, saved: Result<(), PersistenceError>) {
        match saved {
            Ok(()) => state.status.warning = None,
            Err(e) => state.status.warning = Some(format!("Progress was not saved: {e}")),
        }
    }
}
