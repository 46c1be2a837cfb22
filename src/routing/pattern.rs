//! Path template compilation and matching.
//!
//! # Responsibilities
//! - Tokenize a template such as `/foo/:foo_id/bar/:id` into segments
//! - Match concrete request paths against the compiled segments
//! - Capture variable values in declaration order
//!
//! # Design Decisions
//! - Segment tokenizer instead of generated regexes (no escaping pitfalls)
//! - Matching is anchored: every segment must line up, no prefix matches
//! - Variable names are `[A-Za-z0-9_]+`; variable values are one or more
//!   characters other than `/`
//! - Malformed templates are rejected at compile time

use thiserror::Error;

/// Template construction failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("template {0:?} must start with '/'")]
    MissingLeadingSlash(String),

    #[error("template {template:?} has an unnamed variable in segment {segment}")]
    EmptyVariable { template: String, segment: usize },

    #[error("template {template:?} has invalid variable name {name:?}")]
    InvalidVariable { template: String, name: String },

    #[error("template {template:?} has ':' inside literal segment {literal:?}")]
    MisplacedColon { template: String, literal: String },

    #[error("template {template:?} declares variable {name:?} more than once")]
    DuplicateVariable { template: String, name: String },
}

/// One path segment of a compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Variable(String),
}

/// A compiled path template.
#[derive(Debug, Clone)]
pub struct PathPattern {
    template: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compile `template`.
    pub fn compile(template: &str) -> Result<Self, RouteError> {
        let rest = template
            .strip_prefix('/')
            .ok_or_else(|| RouteError::MissingLeadingSlash(template.to_string()))?;

        let mut segments = Vec::new();
        for (index, raw) in rest.split('/').enumerate() {
            let segment = match raw.strip_prefix(':') {
                Some("") => {
                    return Err(RouteError::EmptyVariable {
                        template: template.to_string(),
                        segment: index,
                    });
                }
                Some(name) => {
                    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                        return Err(RouteError::InvalidVariable {
                            template: template.to_string(),
                            name: name.to_string(),
                        });
                    }
                    if segments.contains(&Segment::Variable(name.to_string())) {
                        return Err(RouteError::DuplicateVariable {
                            template: template.to_string(),
                            name: name.to_string(),
                        });
                    }
                    Segment::Variable(name.to_string())
                }
                None if raw.contains(':') => {
                    return Err(RouteError::MisplacedColon {
                        template: template.to_string(),
                        literal: raw.to_string(),
                    });
                }
                None => Segment::Literal(raw.to_string()),
            };
            segments.push(segment);
        }

        Ok(Self {
            template: template.to_string(),
            segments,
        })
    }

    /// The raw template string.
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Variable names in declaration order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Variable(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// True if `path` has exactly this template's shape.
    pub fn matches(&self, path: &str) -> bool {
        self.captures(path).is_some()
    }

    /// Variable values captured from `path`, in declaration order.
    pub fn captures<'p>(&self, path: &'p str) -> Option<Vec<&'p str>> {
        let rest = path.strip_prefix('/')?;
        let mut parts = rest.split('/');
        let mut values = Vec::new();

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Variable(_) if part.is_empty() => return None,
                Segment::Variable(_) => values.push(part),
            }
        }

        if parts.next().is_some() {
            return None;
        }
        Some(values)
    }
}
