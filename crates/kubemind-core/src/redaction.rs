//! Secret masking for text that leaves the process or gets persisted.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

/// Key, then separator with any quoting around it, then the bare value.
///
/// Quotes may be backslash-escaped so the pattern also matches inside
/// JSON-encoded log lines.
static SECRET_ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)(api_key|token|secret|password|connection_string|auth_token)((?:\\?["'])?\s*(?:=>|=|:)\s*(?:\\?["'])?)([^\s"'\\,;&}\]]+)"#,
    )
    .expect("secret pattern is valid")
});

/// Mask the value of `key = value` style secret assignments.
///
/// Recognised keys are `api_key`, `token`, `secret`, `password`,
/// `connection_string` and `auth_token` (any case), followed by `=`, `:` or
/// `=>`. Only the value is replaced with `[REDACTED]`; keys, separators and
/// quotes are left as they were, so JSON input stays well formed.
pub fn redact_secrets(text: &str) -> Cow<'_, str> {
    SECRET_ASSIGNMENT.replace_all(text, "$1$2[REDACTED]")
}
