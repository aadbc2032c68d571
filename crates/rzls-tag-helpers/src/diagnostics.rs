use std::fmt;

use rzls_source::Span;

use crate::checksum::ChecksumBuilder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticSeverity {
    Warning,
    Error,
}

impl DiagnosticSeverity {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticSeverity::Warning => "warning",
            DiagnosticSeverity::Error => "error",
        }
    }
}

/// A validation problem attached to a descriptor when it is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RazorDiagnostic {
    id: &'static str,
    severity: DiagnosticSeverity,
    message: String,
    span: Option<Span>,
}

impl RazorDiagnostic {
    #[must_use]
    pub fn new(id: &'static str, severity: DiagnosticSeverity, message: impl Into<String>) -> Self {
        Self {
            id,
            severity,
            message: message.into(),
            span: None,
        }
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    #[must_use]
    pub fn id(&self) -> &'static str {
        self.id
    }

    #[must_use]
    pub fn severity(&self) -> DiagnosticSeverity {
        self.severity
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn span(&self) -> Option<Span> {
        self.span
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }

    pub(crate) fn append_to(&self, builder: &mut ChecksumBuilder) {
        builder
            .append_str(self.id)
            .append_str(self.severity.as_str())
            .append_str(&self.message);
        match self.span {
            Some(span) => builder.append_bool(true).append_u32(span.start()).append_u32(span.length()),
            None => builder.append_bool(false),
        };
    }
}

impl fmt::Display for RazorDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.severity.as_str(), self.id, self.message)
    }
}

/// Constructors for the descriptor validation diagnostics.
pub mod codes {
    use super::DiagnosticSeverity;
    use super::RazorDiagnostic;

    pub const INVALID_TAG_NAME: &str = "RZ3008";
    pub const INVALID_PARENT_TAG_NAME: &str = "RZ3009";
    pub const INVALID_REQUIRED_ATTRIBUTE_NAME: &str = "RZ3010";
    pub const INVALID_BOUND_ATTRIBUTE_NAME: &str = "RZ3011";
    pub const INVALID_ALLOWED_CHILD_TAG_NAME: &str = "RZ3012";

    fn error(id: &'static str, message: String) -> RazorDiagnostic {
        RazorDiagnostic::new(id, DiagnosticSeverity::Error, message)
    }

    pub(crate) fn tag_name_null_or_whitespace() -> RazorDiagnostic {
        error(
            INVALID_TAG_NAME,
            "Tag name cannot be null or whitespace.".to_string(),
        )
    }

    pub(crate) fn invalid_tag_name(name: &str, character: char) -> RazorDiagnostic {
        error(
            INVALID_TAG_NAME,
            format!("Tag helpers cannot target tag name '{name}' because it contains a '{character}' character."),
        )
    }

    pub(crate) fn invalid_parent_tag_name(name: &str, character: Option<char>) -> RazorDiagnostic {
        let message = match character {
            Some(character) => format!(
                "Tag helpers cannot target parent tag name '{name}' because it contains a '{character}' character."
            ),
            None => "Parent tag name cannot be null or whitespace.".to_string(),
        };
        error(INVALID_PARENT_TAG_NAME, message)
    }

    pub(crate) fn invalid_required_attribute_name(
        name: &str,
        character: Option<char>,
    ) -> RazorDiagnostic {
        let message = match character {
            Some(character) => format!(
                "Tag helpers cannot target attribute name '{name}' because it contains a '{character}' character."
            ),
            None => "Attribute name cannot be null or whitespace.".to_string(),
        };
        error(INVALID_REQUIRED_ATTRIBUTE_NAME, message)
    }

    pub(crate) fn invalid_bound_attribute_name(
        tag_helper: &str,
        property: &str,
        name: &str,
        reason: &str,
    ) -> RazorDiagnostic {
        error(
            INVALID_BOUND_ATTRIBUTE_NAME,
            format!(
                "Invalid tag helper bound property '{property}' on tag helper '{tag_helper}'. \
                 Tag helpers cannot bind to HTML attributes with name '{name}' because {reason}."
            ),
        )
    }

    pub(crate) fn invalid_allowed_child_tag_name(
        tag_helper: &str,
        name: &str,
        character: Option<char>,
    ) -> RazorDiagnostic {
        let message = match character {
            Some(character) => format!(
                "Invalid restricted child tag name '{name}' on tag helper '{tag_helper}' because it contains a '{character}' character."
            ),
            None => format!(
                "Invalid restricted child tag name on tag helper '{tag_helper}'. Name cannot be null or whitespace."
            ),
        };
        error(INVALID_ALLOWED_CHILD_TAG_NAME, message)
    }
}
