use core::fmt;

use num_complex::Complex64;

use crate::error::SyntaxError;


/// The smallest value kind. Numeric payloads are normalized by the
/// constructors, so build `Number` and `Complex` atoms through [`Atom::number`],
/// [`Atom::complex`] or the `From` impls rather than the variants directly.
#[derive(Debug, Clone, Default)]
pub enum Atom {
    #[default]
    None,
    Number(f64),
    Complex(Complex64),
    Symbol(String),
    /// Stored without the surrounding quotes
    StringLiteral(String),
}

// Anything this close to zero is floating point residue
fn truncate_to_zero(value: f64) -> f64 {
    if value.abs() <= f64::EPSILON { 0.0 } else { value }
}

fn approximately_equal(a: f64, b: f64) -> bool {
    let difference = (a - b).abs();
    !difference.is_nan() && difference <= f64::EPSILON
}

// Decimal and exponent forms only, so `inf` and `nan` stay symbols
fn parse_number(token: &str) -> Option<f64> {
    if !token.chars().all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')) {
        return None;
    }
    token.parse().ok()
}

// Optional sign, optional point, then a digit
fn has_numeric_prefix(token: &str) -> bool {
    let unsigned = token.strip_prefix(['+', '-']).unwrap_or(token);
    let digits = unsigned.strip_prefix('.').unwrap_or(unsigned);
    digits.starts_with(|c: char| c.is_ascii_digit())
}

fn quoted_contents(token: &str) -> Option<&str> {
    let inner = token.strip_prefix('"')?.strip_suffix('"')?;
    if inner.contains('"') { None } else { Some(inner) }
}

impl Atom {
    pub fn number(value: f64) -> Self {
        Self::Number(truncate_to_zero(value))
    }

    pub fn complex(value: Complex64) -> Self {
        Self::Complex(Complex64::new(truncate_to_zero(value.re), truncate_to_zero(value.im)))
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbol(name.into())
    }

    pub fn string_literal(text: impl Into<String>) -> Self {
        Self::StringLiteral(text.into())
    }

    /// Classify a lexeme: number first, then quoted string literal, then
    /// symbol. A lexeme with a numeric prefix must be a number.
    pub fn from_token(token: &str) -> Result<Self, SyntaxError> {
        if let Some(number) = parse_number(token) {
            return Ok(Self::number(number));
        }

        if has_numeric_prefix(token) {
            return Err(SyntaxError::MalformedNumber(token.to_owned()));
        }

        match quoted_contents(token) {
            Some(text) => Ok(Self::string_literal(text)),
            None => Ok(Self::symbol(token)),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, Self::Complex(_))
    }

    pub fn is_symbol(&self) -> bool {
        matches!(self, Self::Symbol(_))
    }

    pub fn is_string_literal(&self) -> bool {
        matches!(self, Self::StringLiteral(_))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(number) => Some(*number),
            _ => None,
        }
    }

    pub fn as_complex(&self) -> Option<Complex64> {
        match self {
            Self::Number(number) => Some(Complex64::new(*number, 0.0)),
            Self::Complex(complex) => Some(*complex),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Self::Symbol(symbol) => Some(symbol),
            _ => None,
        }
    }

    pub fn as_string_literal(&self) -> Option<&str> {
        match self {
            Self::StringLiteral(text) => Some(text),
            _ => None,
        }
    }

    pub fn render(&self, strip_quotes: bool) -> String {
        match self {
            Self::StringLiteral(text) if strip_quotes => text.clone(),
            other => other.to_string(),
        }
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Number(a), Self::Number(b)) => approximately_equal(*a, *b),
            (Self::Complex(a), Self::Complex(b))
                => approximately_equal(a.re, b.re) && approximately_equal(a.im, b.im),
            (Self::Symbol(a), Self::Symbol(b)) => a == b,
            (Self::StringLiteral(a), Self::StringLiteral(b)) => a == b,
            _ => false,
        }
    }
}

impl From<f64> for Atom {
    fn from(value: f64) -> Self {
        Self::number(value)
    }
}

impl From<Complex64> for Atom {
    fn from(value: Complex64) -> Self {
        Self::complex(value)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "NONE"),
            Self::Number(number) => write!(f, "{}", number),
            Self::Complex(complex) => write!(f, "{},{}", complex.re, complex.im),
            Self::Symbol(symbol) => write!(f, "{}", symbol),
            Self::StringLiteral(text) => write!(f, "\"{}\"", text),
        }
    }
}
