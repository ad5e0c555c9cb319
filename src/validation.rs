//! Client-side checks run on every submission attempt.
//!
//! Both checks always run together so the two error slots are recomputed as a pair.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

pub const EMAIL_ERROR: &str = "Please provide a valid email address";
pub const ENTITIES_ERROR: &str = "Please provide a list of entities";

// ASCII-only word classes; the whole input must match one of the two domain forms.
// Brackets around the IPv4 literal are optional on each side, so `user@[1.2.3.4` passes.
const EMAIL_PATTERN: &str = concat!(
    r#"(?i-u)^(?:"[\w\-\s]+"|[\w-]+(?:\.[\w-]+)*|"[\w\-\s]+"[\w-]+(?:\.[\w-]+)*)"#,
    r"@(?:",
    r"(?:[\w-]+\.)*\w[\w-]{0,66}\.[a-z]{2,6}(?:\.[a-z]{2})?",
    r"|",
    r"\[?(?:(?:25[0-5]|2[0-4][0-9]|1[0-9]{2}|[0-9]{1,2})\.){3}(?:25[0-5]|2[0-4][0-9]|1[0-9]{2}|[0-9]{1,2})\]?",
    r")$",
);

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"))
}

/// Per-field validation messages. `None` means the field passed its last check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub email: Option<String>,
    pub entities: Option<String>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.entities.is_none()
    }
}

pub fn is_valid_email(value: &str) -> bool {
    !value.is_empty() && email_regex().is_match(value)
}

pub fn check_email(value: &str) -> Option<String> {
    if is_valid_email(value) {
        None
    } else {
        Some(EMAIL_ERROR.to_string())
    }
}

/// Blank entries count; only an empty sequence fails.
pub fn check_entities(entities: &[String]) -> Option<String> {
    if entities.is_empty() {
        Some(ENTITIES_ERROR.to_string())
    } else {
        None
    }
}

/// Run both checks and return the full set of errors.
pub fn validate(email: &str, entities: &[String]) -> ValidationErrors {
    let email = check_email(email);
    let entities = check_entities(entities);
    ValidationErrors { email, entities }
}
