use thiserror::Error;


/// Lexical or syntactic failure. Returned by the parse step, never thrown
/// out of evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("no program to parse")]
    EmptyInput,

    #[error("top-level expression must be parenthesized, found `{0}`")]
    BareAtom(String),

    #[error("unbalanced parentheses")]
    Unbalanced,

    #[error("empty expression `()`")]
    EmptyForm,

    #[error("expression head must be an atom")]
    FormHead,

    #[error("unexpected input after a complete expression")]
    TrailingInput,

    #[error("malformed number `{0}`")]
    MalformedNumber(String),

    #[error("unrecognized input `{0}`")]
    InvalidToken(String),

    #[error("could not read program: {0}")]
    Unreadable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticErrorKind {
    /// Wrong number of arguments to a procedure or special form
    Arity,
    /// Wrong kind of argument (e.g. a list where a number was expected)
    Kind,
    /// Right kind, but the value is outside what the procedure accepts
    Domain,
    UnknownSymbol,
    Redefinition,
    MalformedForm,
    NotAProcedure,
    NoProgram,
}

/// Every evaluation failure. The message is what front ends print; the kind
/// lets callers tell failures apart without matching on text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SemanticError {
    kind: SemanticErrorKind,
    message: String,
}

impl SemanticError {
    pub fn new(kind: SemanticErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub(crate) fn arity(procedure: &str, expected: &str, got: usize) -> Self {
        Self::new(
            SemanticErrorKind::Arity,
            format!("Error in call to {}: wrong number of arguments, expected {} but got {}", procedure, expected, got),
        )
    }

    pub(crate) fn kind_of(procedure: &str, detail: &str) -> Self {
        Self::new(
            SemanticErrorKind::Kind,
            format!("Error in call to {}: wrong argument kind, {}", procedure, detail),
        )
    }

    pub(crate) fn domain(procedure: &str, detail: &str) -> Self {
        Self::new(
            SemanticErrorKind::Domain,
            format!("Error in call to {}: value out of domain, {}", procedure, detail),
        )
    }

    pub(crate) fn evaluation(kind: SemanticErrorKind, detail: impl AsRef<str>) -> Self {
        Self::new(kind, format!("Error during evaluation: {}", detail.as_ref()))
    }

    pub fn kind(&self) -> SemanticErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Invalid Expression. Could not parse: {0}")]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Semantic(#[from] SemanticError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_procedure_and_violation() {
        let arity = SemanticError::arity("sqrt", "1", 2);
        assert_eq!(arity.kind(), SemanticErrorKind::Arity);
        assert!(arity.message().contains("sqrt"));
        assert!(arity.message().contains("wrong number of arguments"));

        let kind = SemanticError::kind_of("real", "argument not a complex number");
        assert!(kind.to_string().contains("wrong argument kind"));

        let domain = SemanticError::domain("ln", "cannot take the natural log of a negative number");
        assert!(domain.to_string().contains("out of domain"));
    }

    #[test]
    fn wrapped_errors_keep_their_text() {
        let error: Error = SemanticError::evaluation(SemanticErrorKind::UnknownSymbol, "unknown symbol `a`").into();
        assert_eq!(error.to_string(), "Error during evaluation: unknown symbol `a`");

        let error: Error = SyntaxError::EmptyForm.into();
        assert!(error.to_string().starts_with("Invalid Expression"));
    }
}
