//! The rule table that drives the message formatter.

use serde::{Deserialize, Serialize};

use crate::error::{AskboxError, Result};

/// Every knob the formatter uses. Loaded from the `[format]` section of the
/// config file; any field left out falls back to its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatRules {
    /// Delimiter placed on both sides of a bold span.
    #[serde(default = "default_bold_delimiter")]
    pub bold_delimiter: String,

    /// Marker that starts a bullet item.
    #[serde(default = "default_bullet_marker")]
    pub bullet_marker: String,

    /// Glyph shown in place of the bullet marker.
    #[serde(default = "default_bullet_glyph")]
    pub bullet_glyph: String,

    /// Domain suffixes recognised as links even without a scheme or `www.`.
    #[serde(default = "default_link_suffixes")]
    pub link_suffixes: Vec<String>,

    /// Characters stripped repeatedly from the end of a link token.
    #[serde(default = "default_trailing_punctuation")]
    pub trailing_punctuation: Vec<char>,

    /// Prefixes stripped once each, in order, from the start of a link token.
    #[serde(default = "default_leading_artifacts")]
    pub leading_artifacts: Vec<String>,
}

fn default_bold_delimiter() -> String {
    "**".to_string()
}
fn default_bullet_marker() -> String {
    "* ".to_string()
}
fn default_bullet_glyph() -> String {
    "•".to_string()
}
fn default_link_suffixes() -> Vec<String> {
    vec![".ufrgs.br".to_string()]
}
fn default_trailing_punctuation() -> Vec<char> {
    vec!['.', ',', ';', '>', ')']
}
fn default_leading_artifacts() -> Vec<String> {
    vec![".".to_string(), "1.".to_string()]
}

impl Default for FormatRules {
    fn default() -> Self {
        Self {
            bold_delimiter: default_bold_delimiter(),
            bullet_marker: default_bullet_marker(),
            bullet_glyph: default_bullet_glyph(),
            link_suffixes: default_link_suffixes(),
            trailing_punctuation: default_trailing_punctuation(),
            leading_artifacts: default_leading_artifacts(),
        }
    }
}

impl FormatRules {
    /// Reject tables the scanner cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.bold_delimiter.is_empty() {
            return Err(AskboxError::Config(
                "format.bold_delimiter must not be empty".into(),
            ));
        }
        if self.bullet_marker.trim().is_empty() {
            return Err(AskboxError::Config(
                "format.bullet_marker must contain a visible character".into(),
            ));
        }
        if let Some(bad) = self
            .link_suffixes
            .iter()
            .find(|s| s.is_empty() || s.chars().any(char::is_whitespace))
        {
            return Err(AskboxError::Config(format!(
                "format.link_suffixes entry {bad:?} is not a domain suffix"
            )));
        }
        if self.leading_artifacts.iter().any(String::is_empty) {
            return Err(AskboxError::Config(
                "format.leading_artifacts must not contain empty strings".into(),
            ));
        }
        Ok(())
    }
}
