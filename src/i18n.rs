use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

pub const FIELD_REQUIRED: &str = "calendar.field.required";
pub const UNAVAILABLE: &str = "calendar.unavailable";
pub const UNAVAILABLE_SOURCE: &str = "calendar.unavailable.source";
pub const UNKNOWN_SOURCE: &str = "calendar.unknown.source";
pub const FIELD_NAME: &str = "calendar.field.name";
pub const FIELD_SOURCE: &str = "calendar.field.source";
pub const FIELD_COLOR: &str = "calendar.field.color";
pub const FIELD_EVENT_START: &str = "calendar.field.event-start";

const DEFAULT_MESSAGES: &[(&str, &str)] = &[
    (FIELD_REQUIRED, "{0} is required."),
    (UNAVAILABLE, "The calendar is unavailable."),
    (UNAVAILABLE_SOURCE, "Unavailable source"),
    (UNKNOWN_SOURCE, "Unknown source"),
    (FIELD_NAME, "Name"),
    (FIELD_SOURCE, "Source"),
    (FIELD_COLOR, "Color"),
    (FIELD_EVENT_START, "Event start"),
];

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\d+)\}").expect("placeholder pattern is a valid regex"));

pub trait Localizer {
    fn text(&self, key: &str, args: &[&str]) -> String;
}

#[derive(Debug, Clone)]
pub struct MessageBundle {
    messages: HashMap<String, String>,
}

impl MessageBundle {
    pub fn new() -> Self {
        let messages = DEFAULT_MESSAGES
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self { messages }
    }

    pub fn with_overrides(mut self, overrides: &HashMap<String, String>) -> Self {
        for (key, message) in overrides {
            self.messages.insert(key.clone(), message.clone());
        }
        self
    }
}

impl Default for MessageBundle {
    fn default() -> Self {
        Self::new()
    }
}

impl Localizer for MessageBundle {
    fn text(&self, key: &str, args: &[&str]) -> String {
        let Some(message) = self.messages.get(key) else {
            return key.to_string();
        };
        PLACEHOLDER
            .replace_all(message, |caps: &Captures| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| args.get(index))
                    .map(|arg| arg.to_string())
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_positional_arguments() {
        let bundle = MessageBundle::new();

        assert_eq!(bundle.text(FIELD_REQUIRED, &["Name"]), "Name is required.");
    }

    #[test]
    fn arguments_are_not_substituted_twice() {
        let overrides = HashMap::from([("pair".to_string(), "{0} and {1}".to_string())]);
        let bundle = MessageBundle::new().with_overrides(&overrides);

        assert_eq!(bundle.text("pair", &["{1}", "x"]), "{1} and x");
    }

    #[test]
    fn missing_argument_keeps_placeholder() {
        let bundle = MessageBundle::new();

        assert_eq!(bundle.text(FIELD_REQUIRED, &[]), "{0} is required.");
    }

    #[test]
    fn unknown_key_renders_as_key() {
        let bundle = MessageBundle::new();

        assert_eq!(bundle.text("no.such.key", &[]), "no.such.key");
    }

    #[test]
    fn overrides_replace_defaults() {
        let overrides = HashMap::from([(UNAVAILABLE.to_string(), "Kalender nicht verfügbar".to_string())]);
        let bundle = MessageBundle::new().with_overrides(&overrides);

        assert_eq!(bundle.text(UNAVAILABLE, &[]), "Kalender nicht verfügbar");
        assert_eq!(bundle.text(UNAVAILABLE_SOURCE, &[]), "Unavailable source");
    }
}
