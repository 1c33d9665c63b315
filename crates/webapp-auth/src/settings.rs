//! Process-wide settings and `${name}` placeholder expansion.
//!
//! Configuration strings such as the token validation endpoint URL may embed
//! placeholders (`https://${carbon.host}:9443/oauth2/introspect`). They are
//! resolved against a [`SettingsProvider`], which is passed in explicitly so
//! tests can substitute fixed settings for the process environment.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

/// Matches `${identifier}` non-greedily; group 1 is the identifier.
#[allow(clippy::expect_used)] // Literal pattern, verified by tests
static PLACEHOLDER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{(.*?)\}").expect("placeholder pattern is valid"));

/// Source of named settings used to resolve placeholders.
pub trait SettingsProvider: Send + Sync {
    /// Look up a setting by name. `None` if it is not defined.
    fn setting(&self, name: &str) -> Option<String>;
}

/// Settings backed by the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSettings;

impl SettingsProvider for EnvSettings {
    fn setting(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl SettingsProvider for HashMap<String, String> {
    fn setting(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Expand every `${name}` placeholder in `template`.
///
/// A placeholder whose setting is defined and non-empty is replaced, at every
/// occurrence, by the setting's value. Anything else is left verbatim.
/// Replacement values are inserted as-is and never scanned for further
/// placeholders.
#[must_use]
pub fn expand(template: &str, settings: &dyn SettingsProvider) -> String {
    PLACEHOLDER_PATTERN
        .replace_all(template, |caps: &Captures<'_>| {
            let placeholder = caps.get(0).map_or("", |m| m.as_str());
            let name = caps.get(1).map_or("", |m| m.as_str());

            match settings.setting(name) {
                Some(value) if !name.is_empty() && !value.is_empty() => value,
                _ => {
                    debug!(
                        target: "webapp_auth.settings",
                        placeholder = %name,
                        "Unresolved configuration placeholder left as-is"
                    );
                    placeholder.to_string()
                }
            }
        })
        .into_owned()
}
