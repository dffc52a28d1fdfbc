use std::collections::HashMap;

use crate::{builtin::builtin_bindings, error::{SemanticError, SemanticErrorKind}, expression::Expression};


pub type Procedure = fn(Vec<Expression>) -> Result<Expression, SemanticError>;

#[derive(Debug, Clone)]
pub(crate) enum Binding {
    Expression(Expression),
    Procedure(Procedure),
}

/// Symbol table mapping names to values or built-in procedures. A name is
/// bound one way or the other, never both.
#[derive(Debug)]
pub struct Environment<'p> {
    bindings: HashMap<String, Binding>,
    parent: Option<&'p Environment<'p>>,
}

impl Default for Environment<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'p> Environment<'p> {
    pub fn new() -> Self {
        Self { bindings: builtin_bindings(), parent: None }
    }

    pub fn snapshot(parent: &'p Environment<'p>) -> Self {
        Self { bindings: HashMap::new(), parent: Some(parent) }
    }

    fn binding(&self, name: &str) -> Option<&Binding> {
        match self.bindings.get(name) {
            Some(binding) => Some(binding),
            None => self.parent.and_then(|parent| parent.binding(name)),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.binding(name).is_some()
    }

    pub fn is_expression(&self, name: &str) -> bool {
        matches!(self.binding(name), Some(Binding::Expression(_)))
    }

    pub fn is_procedure(&self, name: &str) -> bool {
        matches!(self.binding(name), Some(Binding::Procedure(_)))
    }

    pub fn expression(&self, name: &str) -> Option<&Expression> {
        match self.binding(name)? {
            Binding::Expression(expression) => Some(expression),
            Binding::Procedure(_) => None,
        }
    }

    pub fn procedure(&self, name: &str) -> Option<Procedure> {
        match self.binding(name)? {
            Binding::Procedure(procedure) => Some(*procedure),
            Binding::Expression(_) => None,
        }
    }

    /// Bind a new name. Existing names, including inherited ones, are never
    /// overwritten.
    pub fn define(&mut self, name: &str, value: Expression) -> Result<(), SemanticError> {
        if self.contains(name) {
            return Err(SemanticError::evaluation(
                SemanticErrorKind::Redefinition,
                format!("attempt to redefine symbol `{}`", name),
            ));
        }

        self.bindings.insert(name.to_owned(), Binding::Expression(value));
        Ok(())
    }

    pub fn bind_parameter(&mut self, name: &str, value: Expression) {
        self.bindings.insert(name.to_owned(), Binding::Expression(value));
    }

    // An inherited binding is copied into this frame before it is handed out
    pub(crate) fn expression_mut(&mut self, name: &str) -> Option<&mut Expression> {
        if !self.bindings.contains_key(name) {
            let inherited = self.parent.and_then(|parent| parent.expression(name))?.clone();
            self.bindings.insert(name.to_owned(), Binding::Expression(inherited));
        }

        match self.bindings.get_mut(name) {
            Some(Binding::Expression(expression)) => Some(expression),
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        self.bindings = builtin_bindings();
        self.parent = None;
    }
}
