//! Errors raised while compiling route templates.

use thiserror::Error;

/// A route template that cannot be compiled.
///
/// These only occur at registration time and are meant to abort startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// The template is the empty string.
    #[error("Route template is empty")]
    Empty,

    /// The template does not begin with `/`.
    #[error("Route template must start with '/': {0}")]
    MissingLeadingSlash(String),

    /// A capture segment `<>` has no name.
    #[error("Empty capture name in template: {0}")]
    EmptyCaptureName(String),

    /// A capture name contains characters other than ASCII alphanumerics and `_`.
    #[error("Invalid capture name: {0}")]
    InvalidCaptureName(String),

    /// The same capture name appears twice in one template.
    #[error("Duplicate capture name: {0}")]
    DuplicateCaptureName(String),

    /// A segment uses `<` or `>` without being a whole-segment capture.
    #[error("Malformed segment: {0}")]
    MalformedSegment(String),
}
