use core::fmt;
use std::collections::HashMap;

use itertools::Itertools;
use num_complex::Complex64;

use crate::{atom::Atom, environment::Environment, error::SemanticError, evaluator};


pub(crate) const LIST: &str = "list";
pub(crate) const LAMBDA: &str = "lambda";

/// A tree of atoms: a head followed by an ordered (possibly empty) tail.
///
/// Two head symbols are structural tags rather than ordinary symbols. A head
/// of `list` marks a literal sequence, and a head of `lambda` whose tail is a
/// list of parameter symbols followed by a body marks a closure value.
///
/// Properties are sidecar metadata. They are not part of equality, and a
/// clone owns its own copy of them.
#[derive(Debug, Clone, Default)]
pub struct Expression {
    head: Atom,
    tail: Vec<Expression>,
    properties: HashMap<String, Expression>,
}

impl Expression {
    pub fn new(head: Atom) -> Self {
        Self { head, tail: Vec::new(), properties: HashMap::new() }
    }

    pub fn with_tail(head: Atom, tail: Vec<Expression>) -> Self {
        Self { head, tail, properties: HashMap::new() }
    }

    pub fn list(items: Vec<Expression>) -> Self {
        Self::with_tail(Atom::symbol(LIST), items)
    }

    pub fn lambda(parameters: Vec<String>, body: Expression) -> Self {
        let parameters = parameters.into_iter()
            .map(|parameter| Expression::new(Atom::symbol(parameter)))
            .collect_vec();
        Self::with_tail(Atom::symbol(LAMBDA), vec![Self::list(parameters), body])
    }

    pub fn head(&self) -> &Atom {
        &self.head
    }

    pub fn tail(&self) -> &[Expression] {
        &self.tail
    }

    pub fn into_tail(self) -> Vec<Expression> {
        self.tail
    }

    pub fn push(&mut self, child: Expression) {
        self.tail.push(child);
    }

    pub fn is_leaf(&self) -> bool {
        self.tail.is_empty()
    }

    pub fn as_bare_symbol(&self) -> Option<&str> {
        if self.is_leaf() { self.head.as_symbol() } else { None }
    }

    pub fn is_list(&self) -> bool {
        self.head.as_symbol() == Some(LIST)
    }

    pub fn is_lambda(&self) -> bool {
        self.lambda_parts().is_some()
    }

    /// Parameter names and body of a lambda value
    pub(crate) fn lambda_parts(&self) -> Option<(Vec<&str>, &Expression)> {
        if self.head.as_symbol() != Some(LAMBDA) { return None; }

        match self.tail.as_slice() {
            [parameters, body] if parameters.is_list() => {
                let names = parameters.tail.iter()
                    .map(Expression::as_bare_symbol)
                    .collect::<Option<Vec<_>>>()?;
                Some((names, body))
            }
            _ => None,
        }
    }

    pub fn property(&self, key: &str) -> Option<&Expression> {
        self.properties.get(key)
    }

    pub fn get_property(&self, key: &str) -> Expression {
        self.property(key).cloned().unwrap_or_default()
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: Expression) {
        self.properties.insert(key.into(), value);
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &Expression)> {
        self.properties.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn eval(&self, environment: &mut Environment<'_>) -> Result<Expression, SemanticError> {
        evaluator::evaluate(self, environment)
    }

    /// Render like `Display`, optionally without quotes around string literals
    pub fn render(&self, strip_quotes: bool) -> String {
        let mut rendered = String::from("(");
        let tagged = self.is_list() || self.head.as_symbol() == Some(LAMBDA);
        if !tagged {
            rendered.push_str(&self.head.render(strip_quotes));
            if !self.tail.is_empty() {
                rendered.push(' ');
            }
        }
        rendered.push_str(&self.tail.iter().map(|child| child.render(strip_quotes)).join(" "));
        rendered.push(')');
        rendered
    }
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        self.head == other.head && self.tail == other.tail
    }
}

impl From<Atom> for Expression {
    fn from(head: Atom) -> Self {
        Self::new(head)
    }
}

impl From<f64> for Expression {
    fn from(value: f64) -> Self {
        Self::new(Atom::number(value))
    }
}

impl From<Complex64> for Expression {
    fn from(value: Complex64) -> Self {
        Self::new(Atom::complex(value))
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(false))
    }
}
