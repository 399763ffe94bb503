//! Canonicalization of repository ("source") references.
//!
//! The API addresses repositories as `sources/<provider>/<owner>/<repo>`. Humans tend to type
//! `owner/repo`, `github/owner/repo` or paste a GitHub URL instead; all of those are accepted.
//! Anything unrecognized is passed through under `sources/` and left to the API to reject.

use crate::error::{ApiError, Result};

const SOURCES_PREFIX: &str = "sources/";
const GITHUB_PREFIX: &str = "github/";
const GITHUB_WEB_PREFIX: &str = "https://github.com/";

/// Normalize a user-supplied source reference into its canonical resource name.
///
/// Idempotent: canonical input is returned unchanged (after trimming).
///
/// # Errors
///
/// Returns [`ApiError::InvalidArgument`] if the input is empty or whitespace-only.
pub fn normalize_source(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidArgument("source is required".to_string()));
    }

    if trimmed.starts_with(SOURCES_PREFIX) {
        return Ok(trimmed.to_string());
    }

    if trimmed.starts_with(GITHUB_PREFIX) {
        return Ok(format!("{SOURCES_PREFIX}{trimmed}"));
    }

    if is_owner_repo(trimmed) {
        return Ok(format!("{SOURCES_PREFIX}{GITHUB_PREFIX}{trimmed}"));
    }

    if let Some(rest) = trimmed.strip_prefix(GITHUB_WEB_PREFIX) {
        let repo = rest.strip_suffix(".git").unwrap_or(rest);
        if is_owner_repo(repo) {
            return Ok(format!("{SOURCES_PREFIX}{GITHUB_PREFIX}{repo}"));
        }
    }

    Ok(format!("{SOURCES_PREFIX}{trimmed}"))
}

/// `<segment>/<segment>` with both segments non-empty and no further slashes.
fn is_owner_repo(s: &str) -> bool {
    match s.split_once('/') {
        Some((owner, repo)) => !owner.is_empty() && !repo.is_empty() && !repo.contains('/'),
        None => false,
    }
}
