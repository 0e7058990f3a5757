use chrono::{DateTime, Local};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

fn class_token() -> &'static Regex {
    static CLASS_TOKEN: OnceLock<Regex> = OnceLock::new();
    CLASS_TOKEN.get_or_init(|| Regex::new(r"\[([A-Z_]+)\]").expect("class_token: invalid regex"))
}

/// A single log line received from the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    /// Local time the line arrived
    pub received_at: DateTime<Local>,
    /// Raw line exactly as sent, including any `[TAG]`
    pub message: String,
    /// First bracketed uppercase token, used only for styling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
}

impl LogEntry {
    pub fn new(message: String) -> Self {
        Self::received(Local::now(), message)
    }

    pub fn received(received_at: DateTime<Local>, message: String) -> Self {
        let class = classify(&message).map(str::to_string);
        Self {
            received_at,
            message,
            class,
        }
    }
}

/// Returns the first `[TAG]` token in `line`, without brackets.
pub fn classify(line: &str) -> Option<&str> {
    class_token()
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
