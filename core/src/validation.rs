//! Client-side input checks run before a request is built.

use regex::Regex;
use std::sync::LazyLock;

/// Permissive address check: printable local part, `@`, and a domain whose
/// dot-separated labels after the first are at least two characters long.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9-]+(?:\.[a-zA-Z0-9-][a-zA-Z0-9-]+)+$")
        .expect("EMAIL_REGEX is a valid regex pattern")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Part of a valid address before the `@`.
pub fn email_local_part(email: &str) -> Option<&str> {
    if !is_valid_email(email) {
        return None;
    }
    email.split_once('@').map(|(local, _)| local)
}
