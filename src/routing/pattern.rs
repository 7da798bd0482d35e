//! Path templates compiled into segment matchers.
//!
//! A template such as `/users/<id>/posts` is split on `/` into literal and
//! capture segments. Matching is anchored at both ends and compares segment
//! by segment, so `/a` and `/a/` are different templates.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::routing::error::PatternError;
use crate::routing::Params;

/// One `/`-separated piece of a compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the path segment exactly.
    Literal(String),
    /// Binds any non-empty path segment under this name.
    Capture(String),
}

/// A compiled path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    template: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compile a template into a pattern.
    pub fn compile(template: &str) -> Result<Self, PatternError> {
        if template.is_empty() {
            return Err(PatternError::Empty);
        }
        let rest = template
            .strip_prefix('/')
            .ok_or_else(|| PatternError::MissingLeadingSlash(template.to_string()))?;

        let mut seen = HashSet::new();
        let mut segments = Vec::new();

        for raw in rest.split('/') {
            let segment = parse_segment(raw, template)?;
            if let Segment::Capture(name) = &segment {
                if !seen.insert(name.clone()) {
                    return Err(PatternError::DuplicateCaptureName(name.clone()));
                }
            }
            segments.push(segment);
        }

        Ok(Self {
            template: template.to_string(),
            segments,
        })
    }

    /// The template this pattern was compiled from.
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Names of the captures, in template order.
    pub fn capture_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Capture(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Whether the template has no captures at all.
    pub fn is_literal(&self) -> bool {
        self.capture_names().next().is_none()
    }

    /// Match a concrete path, returning the captured bindings.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let rest = path.strip_prefix('/')?;

        let mut params = Params::new();
        let mut parts = rest.split('/');

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Capture(_) if part.is_empty() => return None,
                Segment::Capture(name) => {
                    params.insert(name.clone(), part.to_string());
                }
            }
        }

        if parts.next().is_some() {
            return None;
        }

        Some(params)
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.matches(path).is_some()
    }
}

fn parse_segment(raw: &str, template: &str) -> Result<Segment, PatternError> {
    let inner = raw.strip_prefix('<').and_then(|s| s.strip_suffix('>'));

    let Some(name) = inner else {
        if raw.contains(['<', '>']) {
            return Err(PatternError::MalformedSegment(raw.to_string()));
        }
        return Ok(Segment::Literal(raw.to_string()));
    };

    if name.is_empty() {
        return Err(PatternError::EmptyCaptureName(template.to_string()));
    }
    if name.contains(['<', '>']) {
        return Err(PatternError::MalformedSegment(raw.to_string()));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(PatternError::InvalidCaptureName(name.to_string()));
    }

    Ok(Segment::Capture(name.to_string()))
}

impl FromStr for PathPattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}
