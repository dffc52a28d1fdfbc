use std::io::Read;

use crate::{environment::Environment, error::{Error, SemanticError, SemanticErrorKind, SyntaxError}, expression::Expression, parser::parse};


/// Parses programs and evaluates them against one persistent environment.
///
/// Definitions made by one program are visible to every program evaluated
/// after it, until [`Interpreter::reset`].
#[derive(Debug, Default)]
pub struct Interpreter {
    environment: Environment<'static>,
    program: Option<Expression>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a whole program from `stream` and keep it for [`Interpreter::evaluate`].
    /// On failure the previously parsed program is discarded.
    pub fn parse_stream<R: Read>(&mut self, mut stream: R) -> Result<(), SyntaxError> {
        let mut source = String::new();
        if let Err(error) = stream.read_to_string(&mut source) {
            self.program = None;
            return Err(SyntaxError::Unreadable(error.to_string()));
        }

        self.parse_str(&source)
    }

    pub fn parse_str(&mut self, source: &str) -> Result<(), SyntaxError> {
        self.program = None;
        self.program = Some(parse(source)?);
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub fn evaluate(&mut self) -> Result<Expression, SemanticError> {
        let Some(program) = &self.program else {
            return Err(SemanticError::evaluation(SemanticErrorKind::NoProgram, "no program has been parsed"));
        };

        program.eval(&mut self.environment)
    }

    pub fn evaluate_str(&mut self, source: &str) -> Result<Expression, Error> {
        self.parse_str(source)?;
        Ok(self.evaluate()?)
    }

    pub fn environment(&self) -> &Environment<'static> {
        &self.environment
    }

    pub fn reset(&mut self) {
        self.environment.reset();
        self.program = None;
    }
}
