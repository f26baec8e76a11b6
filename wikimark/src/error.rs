use serde::{Deserialize, Serialize};

/// A string that is not a valid wiki page name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a valid wiki name")]
pub struct InvalidWikiName(pub String);

/// Errors a macro lookup or expansion can produce.
///
/// The compiler never surfaces these to the caller; any of them makes the
/// macro call fall back to comment rendering.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MacroError {
    #[error("Malformed macro call '{0}'")]
    Malformed(String),

    #[error("Unknown macro '{0}'")]
    Unknown(String),

    #[error("Macro '{name}' failed: {message}")]
    Failed { name: String, message: String },
}

/// Errors a page-existence oracle can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("Lookup of page '{name}' failed: {message}")]
    Lookup { name: String, message: String },
}

/// A diagnostic message produced during compilation.
///
/// Diagnostics are non-fatal: the compiler always produces balanced output,
/// these only explain where input degraded to literal or fallback text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// 1-based source line.
    pub line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Diagnostic {
    pub(crate) fn new(severity: Severity, code: &str, line: usize, message: String) -> Self {
        Self {
            severity,
            message,
            line,
            code: Some(code.to_string()),
        }
    }
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn macro_error_messages() {
        assert_eq!(MacroError::Unknown("Nope".into()).to_string(), "Unknown macro 'Nope'");
        let failed = MacroError::Failed {
            name: "PageList".into(),
            message: "store offline".into(),
        };
        assert_eq!(failed.to_string(), "Macro 'PageList' failed: store offline");
    }

    #[test]
    fn diagnostic_serializes_lowercase_severity() {
        let diag = Diagnostic::new(Severity::Warning, "W001", 3, "Unknown macro 'X'".into());
        let json = serde_json::to_string(&diag).unwrap();
        assert!(json.contains("\"severity\":\"warning\""), "{json}");
        assert!(json.contains("\"code\":\"W001\""), "{json}");
        assert!(json.contains("\"line\":3"), "{json}");
    }
}
