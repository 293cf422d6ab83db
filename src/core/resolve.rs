//! Turning user-supplied tokens into canonical session identifiers.
//!
//! A token is either a 1-based position in the current listing (pure
//! digits) or a literal identifier. Literal tokens are passed through
//! unvalidated: existence is the locator's job, so a typo'd UUID and a
//! vanished session fail through the same `RECORD_NOT_FOUND` path.

use crate::core::error::ChatshiftError;
use crate::core::session::SessionSummary;
use regex::Regex;
use std::sync::OnceLock;

/// Resolve tokens (each possibly comma-separated) against the listing.
/// Output order matches input order, duplicates preserved as given.
pub fn resolve_tokens(
    tokens: &[String],
    listing: &[SessionSummary],
) -> Result<Vec<String>, ChatshiftError> {
    let mut resolved = Vec::new();
    for raw in tokens {
        for token in raw.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            if token.bytes().all(|b| b.is_ascii_digit()) {
                let position: usize = token.parse().map_err(|_| {
                    ChatshiftError::RecordNotFound(token.to_string())
                })?;
                let summary = position
                    .checked_sub(1)
                    .and_then(|idx| listing.get(idx))
                    .ok_or_else(|| ChatshiftError::RecordNotFound(token.to_string()))?;
                resolved.push(summary.identifier.clone());
            } else {
                resolved.push(token.to_string());
            }
        }
    }
    if resolved.is_empty() {
        return Err(ChatshiftError::InvalidInput(
            "no session identifiers given".to_string(),
        ));
    }
    Ok(resolved)
}

/// Whether a token is UUID-shaped. Diagnostic only: a non-UUID literal is
/// still resolved literally, this just lets surfaces warn about likely
/// typos.
pub fn looks_like_uuid(token: &str) -> bool {
    static UUID_RE: OnceLock<Regex> = OnceLock::new();
    let re = UUID_RE.get_or_init(|| {
        Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
            .unwrap()
    });
    re.is_match(token)
}
