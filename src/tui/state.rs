use crate::form::{FormEvent, FormState};
use crate::model::StatsRequest;
use crate::orchestrator::UiEvent;
use crate::submission::SubmissionController;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Which control receives key input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Entities,
    Email,
    StatisticType,
    Submit,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Entities => Focus::Email,
            Focus::Email => Focus::StatisticType,
            Focus::StatisticType => Focus::Submit,
            Focus::Submit => Focus::Entities,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Focus::Entities => Focus::Submit,
            Focus::Email => Focus::Entities,
            Focus::StatisticType => Focus::Email,
            Focus::Submit => Focus::StatisticType,
        }
    }
}

/// What the UI loop must do after a key was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Submit(StatsRequest),
    Quit,
}

pub struct UiState {
    pub form: FormState,
    pub submission: SubmissionController,
    // Raw text-area contents; the entity list is re-split from it on every edit.
    pub entities_text: String,
    pub focus: Focus,
    pub pending: bool,
    pub show_help: bool,
    pub info: String,
    pub endpoint: String,
}

impl UiState {
    pub fn new(form: FormState, endpoint: impl Into<String>) -> Self {
        Self {
            entities_text: form.entities().join("\n"),
            form,
            submission: SubmissionController::new(),
            focus: Focus::Entities,
            pending: false,
            show_help: false,
            info: String::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> KeyAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        // The feedback dialog is modal.
        if self.submission.outcome().is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.submission.dismiss();
            }
            return KeyAction::None;
        }

        if self.show_help {
            if matches!(key.code, KeyCode::F(1) | KeyCode::Esc) {
                self.show_help = false;
            }
            return KeyAction::None;
        }

        match key.code {
            KeyCode::Esc => return KeyAction::Quit,
            KeyCode::F(1) => {
                self.show_help = true;
                return KeyAction::None;
            }
            KeyCode::Char('s') if ctrl => return self.trigger_submit(),
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return KeyAction::None;
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
                return KeyAction::None;
            }
            _ => {}
        }
        if ctrl {
            return KeyAction::None;
        }

        match self.focus {
            Focus::Entities => self.edit_entities(key.code),
            Focus::Email => self.edit_email(key.code),
            Focus::StatisticType => self.select_statistic(key.code),
            Focus::Submit => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                    return self.trigger_submit();
                }
            }
        }
        KeyAction::None
    }

    fn edit_entities(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char(c) => self.entities_text.push(c),
            KeyCode::Enter => self.entities_text.push('\n'),
            KeyCode::Backspace => {
                // Nothing to delete is not an edit.
                if self.entities_text.pop().is_none() {
                    return;
                }
            }
            _ => return,
        }
        self.form
            .apply(FormEvent::EntitiesEdited(self.entities_text.clone()));
    }

    fn edit_email(&mut self, code: KeyCode) {
        let mut email = self.form.email().to_string();
        match code {
            KeyCode::Char(c) => email.push(c),
            KeyCode::Backspace => {
                email.pop();
            }
            KeyCode::Enter => {
                self.focus = self.focus.next();
                return;
            }
            _ => return,
        }
        self.form.apply(FormEvent::EmailEdited(email));
    }

    fn select_statistic(&mut self, code: KeyCode) {
        let current = self.form.statistic_type();
        let selected = match code {
            KeyCode::Left | KeyCode::Up => current.prev(),
            KeyCode::Right | KeyCode::Down | KeyCode::Char(' ') => current.next(),
            KeyCode::Enter => {
                self.focus = self.focus.next();
                return;
            }
            _ => return,
        };
        self.form.apply(FormEvent::StatisticTypeSelected(selected));
    }

    /// Validate and hand the request to the controller, unless one is already pending.
    fn trigger_submit(&mut self) -> KeyAction {
        if self.pending {
            self.info = "A request is already pending…".into();
            return KeyAction::None;
        }
        match self.submission.prepare(&mut self.form) {
            Some(request) => {
                self.pending = true;
                self.info = "Submitting…".into();
                KeyAction::Submit(request)
            }
            None => {
                self.info = "Please correct the highlighted fields".into();
                KeyAction::None
            }
        }
    }

    pub fn apply_event(&mut self, ev: UiEvent) {
        match ev {
            UiEvent::Info(msg) => self.info = msg,
            UiEvent::SubmissionResolved(result) => {
                self.pending = false;
                self.info = match result.http_status() {
                    Some(code) => format!("Last request: HTTP {code}"),
                    None => "Last request: no response".into(),
                };
                self.submission.resolve(&result);
            }
        }
    }
}
