//! Non-fatal problems found while rendering.

use std::fmt;

use dbk_model::Location;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Warning,
    /// Unexpected input that indicates a bug upstream.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// A problem attached to the documentation comment it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Qualified name of the node whose text was being rendered.
    pub node: String,
    pub location: Option<Location>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{location}: {}: {}", self.severity, self.message),
            None if self.node.is_empty() => write!(f, "{}: {}", self.severity, self.message),
            None => write!(f, "{}: {}: {}", self.node, self.severity, self.message),
        }
    }
}
