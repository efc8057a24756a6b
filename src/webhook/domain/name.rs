//! Generation of webhook registration names.
//!
//! Names are `<prefix>-<suffix>-wh`: a sanitized slice of the workspace
//! name, six random alphanumerics and a fixed marker. The service rejects
//! names longer than [`MAX_WEBHOOK_NAME_LENGTH`] characters.

use rand::{Rng, distributions::Alphanumeric};
use tracing::warn;

/// Longest webhook name the service accepts, in characters.
pub const MAX_WEBHOOK_NAME_LENGTH: usize = 30;

const PREFIX_LENGTH: usize = 20;
const RANDOM_LENGTH: usize = 6;
const MARKER: &str = "-wh";
const PREFIX_BUDGET: usize = MAX_WEBHOOK_NAME_LENGTH - 1 - RANDOM_LENGTH - MARKER.len();

/// Builds a webhook name for `workspace_name` using `rng` for the suffix.
///
/// The result never exceeds [`MAX_WEBHOOK_NAME_LENGTH`] characters,
/// whatever the workspace name contains.
#[must_use]
pub fn make_webhook_name(workspace_name: &str, rng: &mut impl Rng) -> String {
    let prefix = fit_prefix(sanitize_prefix(workspace_name));
    let random: String = (0..RANDOM_LENGTH)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect();
    if prefix.is_empty() {
        format!("{random}{MARKER}")
    } else {
        format!("{prefix}-{random}{MARKER}")
    }
}

/// Shortens `prefix` so the separator, random part and marker always fit.
///
/// Lower-casing can expand a character into several, so the sanitized
/// prefix may exceed [`PREFIX_LENGTH`] characters.
fn fit_prefix(prefix: String) -> String {
    if prefix.chars().count() <= PREFIX_BUDGET {
        return prefix;
    }
    warn!(
        prefix = %prefix,
        max_length = MAX_WEBHOOK_NAME_LENGTH,
        "webhook name prefix too long, truncating"
    );
    let truncated: String = prefix.chars().take(PREFIX_BUDGET).collect();
    truncated.trim_end_matches('-').to_owned()
}

/// Kebab-cases the first characters of the workspace name.
///
/// Whitespace runs become a single hyphen, other control characters are
/// dropped, and the result is lower-cased.
fn sanitize_prefix(workspace_name: &str) -> String {
    let mut prefix = String::new();
    let mut separate = false;
    for ch in workspace_name.chars().take(PREFIX_LENGTH) {
        if ch.is_whitespace() {
            separate = !prefix.is_empty();
        } else if !ch.is_control() {
            if separate {
                prefix.push('-');
                separate = false;
            }
            prefix.extend(ch.to_lowercase());
        }
    }
    prefix
}
