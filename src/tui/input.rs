//! Input handling for the TUI.
//!
//! Processes keyboard events and updates application state.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{AppMode, TextInput};
use crate::wizard::WizardStep;
use crate::App;

/// Handle keyboard events.
pub fn handle_events(key: KeyEvent, app: &mut App) {
    match app.mode {
        AppMode::Help => handle_help_mode(key, app),
        AppMode::ConfirmReset => handle_confirm_reset_mode(key, app),
        AppMode::Normal => {
            if handle_global(key, app) {
                return;
            }
            match app.step() {
                Some(WizardStep::Description) => handle_description(key, app),
                Some(WizardStep::Requirements | WizardStep::Inspiration) => {
                    handle_upload_step(key, app);
                }
                Some(WizardStep::Integrations) => handle_integrations(key, app),
                None => handle_task_board(key, app),
            }
        }
    }
}

/// Shortcuts available on every view. Returns true if the key was used.
fn handle_global(key: KeyEvent, app: &mut App) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    match key.code {
        KeyCode::Char('c' | 'q') if ctrl => app.quit(),
        KeyCode::Char('r') if ctrl => app.request_reset(),
        KeyCode::Char('n') if ctrl => app.advance(),
        KeyCode::Char('p') if ctrl => app.back(),
        KeyCode::Tab => app.advance(),
        KeyCode::BackTab => app.back(),
        KeyCode::F(1) => app.show_help(),
        // Alt+1..4 jump to a step
        KeyCode::Char(c @ '1'..='4') if alt => {
            app.select_pill(c as usize - '1' as usize);
        }
        _ => return false,
    }
    true
}

/// Editing keys shared by the text prompts.
fn handle_text_keys(key: KeyEvent, app: &mut App) -> bool {
    match key.code {
        KeyCode::Backspace => app.edit(TextInput::backspace),
        KeyCode::Delete => app.edit(TextInput::delete),
        KeyCode::Left => app.move_cursor(TextInput::move_left),
        KeyCode::Right => app.move_cursor(TextInput::move_right),
        KeyCode::Home => app.move_cursor(TextInput::move_start),
        KeyCode::End => app.move_cursor(TextInput::move_end),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.edit(|input| {
                let had_text = !input.is_empty();
                input.clear();
                had_text
            });
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => app.enter_char(c),
        _ => return false,
    }
    true
}

fn handle_description(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Enter => app.enter_char('\n'),
        KeyCode::Esc => app.quit(),
        _ => {
            handle_text_keys(key, app);
        }
    }
}

fn handle_upload_step(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Enter => app.submit_upload(),
        KeyCode::Esc => app.quit(),
        _ => {
            handle_text_keys(key, app);
        }
    }
}

fn handle_integrations(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.integration_previous(),
        KeyCode::Down | KeyCode::Char('j') => app.integration_next(),
        KeyCode::Char(' ' | 'x') => app.toggle_integration(),
        KeyCode::Enter => app.advance(),
        KeyCode::Char('?') => app.show_help(),
        KeyCode::Esc | KeyCode::Char('q') => app.quit(),
        _ => {}
    }
}

fn handle_task_board(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.board.select_previous(),
        KeyCode::Down | KeyCode::Char('j') => app.board.select_next(),
        KeyCode::Esc | KeyCode::Char('b') => app.back_to_wizard(),
        KeyCode::Char('r') => app.request_reset(),
        KeyCode::Char('?') => app.show_help(),
        KeyCode::Char('q') => app.quit(),
        _ => {}
    }
}

/// Handle input in help mode.
fn handle_help_mode(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('?' | 'q') | KeyCode::Enter | KeyCode::F(1) => {
            app.cancel_mode();
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),
        _ => {}
    }
}

/// Handle input while asking whether to reset.
fn handle_confirm_reset_mode(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Char('y' | 'Y') | KeyCode::Enter => app.confirm_reset(),
        KeyCode::Char('n' | 'N') | KeyCode::Esc => app.cancel_mode(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),
        _ => {}
    }
}
