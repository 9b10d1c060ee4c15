//! Placeholder syntaxes.

use serde::{Deserialize, Serialize};

/// How placeholders are written inside artifact content.
///
/// Identifiers are `[A-Za-z_][A-Za-z0-9_]*`. There is no escape sequence:
/// text that contains no placeholder renders unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderSyntax {
    /// `$name` or `${name}` (run specifications, resource manifests)
    Dollar,
    /// `${NAME}` only (OpenShift templates); a bare `$name` is literal text
    Braced,
}

impl PlaceholderSyntax {
    /// Regex with exactly one capturing group holding the identifier per alternative.
    pub(crate) fn pattern(&self) -> &'static str {
        match self {
            PlaceholderSyntax::Dollar => {
                r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)"
            }
            PlaceholderSyntax::Braced => r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceholderSyntax::Dollar => "dollar",
            PlaceholderSyntax::Braced => "braced",
        }
    }
}

impl std::fmt::Display for PlaceholderSyntax {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
