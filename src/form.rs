//! Form state holder.
//!
//! Owns the three field values and the two validation slots for a single session.
//! Edits never validate; only [`FormState::validate`] touches the error slots.

use crate::model::{StatisticType, StatsRequest};
use crate::validation::{self, ValidationErrors};

/// One user edit, mapped to exactly one state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    EntitiesEdited(String),
    EmailEdited(String),
    StatisticTypeSelected(StatisticType),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    entities: Vec<String>,
    email: String,
    stat_type: StatisticType,
    errors: ValidationErrors,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn statistic_type(&self) -> StatisticType {
        self.stat_type
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Split raw text on `\n`, keeping order and blank lines.
    pub fn set_entities(&mut self, raw: &str) {
        self.entities = raw.split('\n').map(str::to_string).collect();
    }

    pub fn set_email(&mut self, value: impl Into<String>) {
        self.email = value.into();
    }

    pub fn set_statistic_type(&mut self, value: StatisticType) {
        self.stat_type = value;
    }

    pub fn apply(&mut self, event: FormEvent) {
        match event {
            FormEvent::EntitiesEdited(raw) => self.set_entities(&raw),
            FormEvent::EmailEdited(value) => self.set_email(value),
            FormEvent::StatisticTypeSelected(t) => self.set_statistic_type(t),
        }
    }

    /// Recompute both error slots and report whether the form may be submitted.
    pub fn validate(&mut self) -> bool {
        self.errors = validation::validate(&self.email, &self.entities);
        self.errors.is_empty()
    }

    pub fn to_request(&self) -> StatsRequest {
        StatsRequest {
            variations: self.entities.clone(),
            replyto: self.email.clone(),
            stat_type: self.stat_type,
        }
    }
}
