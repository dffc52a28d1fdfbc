use std::collections::HashMap;

use num_complex::Complex64;

use crate::{atom::Atom, environment::{Binding, Procedure}, error::SemanticError, expression::Expression};


type BuiltinResult = Result<Expression, SemanticError>;

// Arithmetic stays real unless at least one operand is complex
enum Numbers {
    Real(Vec<f64>),
    Complex(Vec<Complex64>),
}

fn numbers(procedure: &str, values: &[Expression]) -> Result<Numbers, SemanticError> {
    let mut complex = false;
    for value in values {
        match value.head() {
            Atom::Number(_) => {}
            Atom::Complex(_) => complex = true,
            _ => return Err(SemanticError::kind_of(procedure, "argument not a number")),
        }
    }

    Ok(if complex {
        Numbers::Complex(values.iter().filter_map(|value| value.head().as_complex()).collect())
    } else {
        Numbers::Real(values.iter().filter_map(|value| value.head().as_number()).collect())
    })
}

fn single<'v>(procedure: &str, values: &'v [Expression]) -> Result<&'v Expression, SemanticError> {
    match values {
        [value] => Ok(value),
        _ => Err(SemanticError::arity(procedure, "1", values.len())),
    }
}

fn unary_or_binary<T: Copy>(procedure: &str, values: &[T], unary: impl Fn(T) -> T, binary: impl Fn(T, T) -> T) -> Result<T, SemanticError> {
    match values {
        [a] => Ok(unary(*a)),
        [a, b] => Ok(binary(*a, *b)),
        _ => Err(SemanticError::arity(procedure, "1 or 2", values.len())),
    }
}

fn real_argument(procedure: &str, values: &[Expression]) -> Result<f64, SemanticError> {
    single(procedure, values)?.head().as_number()
        .ok_or_else(|| SemanticError::kind_of(procedure, "argument not a real number"))
}

fn complex_argument(procedure: &str, values: &[Expression]) -> Result<Complex64, SemanticError> {
    match single(procedure, values)?.head() {
        Atom::Complex(complex) => Ok(*complex),
        _ => Err(SemanticError::kind_of(procedure, "argument not a complex number")),
    }
}

fn list_argument<'v>(procedure: &str, value: &'v Expression) -> Result<&'v [Expression], SemanticError> {
    if !value.is_list() { return Err(SemanticError::kind_of(procedure, "argument not a list")); }
    Ok(value.tail())
}

fn builtin_add(values: Vec<Expression>) -> BuiltinResult {
    Ok(match numbers("+", &values)? {
        Numbers::Real(values) => values.into_iter().sum::<f64>().into(),
        Numbers::Complex(values) => values.into_iter().sum::<Complex64>().into(),
    })
}

fn builtin_mul(values: Vec<Expression>) -> BuiltinResult {
    Ok(match numbers("*", &values)? {
        Numbers::Real(values) => values.into_iter().product::<f64>().into(),
        Numbers::Complex(values) => values.into_iter().product::<Complex64>().into(),
    })
}

fn builtin_sub(values: Vec<Expression>) -> BuiltinResult {
    match numbers("-", &values)? {
        Numbers::Real(values) => unary_or_binary("-", &values, |a| -a, |a, b| a - b).map(Expression::from),
        Numbers::Complex(values) => unary_or_binary("-", &values, |a| -a, |a, b| a - b).map(Expression::from),
    }
}

fn builtin_div(values: Vec<Expression>) -> BuiltinResult {
    match numbers("/", &values)? {
        Numbers::Real(values) => unary_or_binary("/", &values, |a| 1.0 / a, |a, b| a / b).map(Expression::from),
        Numbers::Complex(values) => unary_or_binary("/", &values, |a| a.inv(), |a, b| a / b).map(Expression::from),
    }
}

fn builtin_sqrt(values: Vec<Expression>) -> BuiltinResult {
    match single("sqrt", &values)?.head() {
        Atom::Number(number) if *number >= 0.0 => Ok(number.sqrt().into()),
        Atom::Number(number) => Ok(Complex64::new(*number, 0.0).sqrt().into()),
        Atom::Complex(complex) => Ok(complex.sqrt().into()),
        _ => Err(SemanticError::kind_of("sqrt", "argument not a number")),
    }
}

fn builtin_pow(values: Vec<Expression>) -> BuiltinResult {
    let [base, exponent] = values.as_slice() else {
        return Err(SemanticError::arity("^", "2", values.len()));
    };

    match (base.head(), exponent.head()) {
        // A negative base only stays real under an integral exponent
        (Atom::Number(base), Atom::Number(exponent)) if *base >= 0.0 || exponent.fract() == 0.0
            => Ok(base.powf(*exponent).into()),
        (base, exponent) => match (base.as_complex(), exponent.as_complex()) {
            (Some(base), Some(exponent)) => Ok(base.powc(exponent).into()),
            _ => Err(SemanticError::kind_of("^", "argument not a number")),
        },
    }
}

fn builtin_ln(values: Vec<Expression>) -> BuiltinResult {
    let number = real_argument("ln", &values)?;
    if number < 0.0 {
        return Err(SemanticError::domain("ln", "cannot take the natural log of a negative number"));
    }
    Ok(number.ln().into())
}

fn builtin_sin(values: Vec<Expression>) -> BuiltinResult {
    Ok(real_argument("sin", &values)?.sin().into())
}

fn builtin_cos(values: Vec<Expression>) -> BuiltinResult {
    Ok(real_argument("cos", &values)?.cos().into())
}

fn builtin_tan(values: Vec<Expression>) -> BuiltinResult {
    Ok(real_argument("tan", &values)?.tan().into())
}

fn builtin_real(values: Vec<Expression>) -> BuiltinResult {
    Ok(complex_argument("real", &values)?.re.into())
}

fn builtin_imag(values: Vec<Expression>) -> BuiltinResult {
    Ok(complex_argument("imag", &values)?.im.into())
}

fn builtin_mag(values: Vec<Expression>) -> BuiltinResult {
    Ok(complex_argument("mag", &values)?.norm().into())
}

fn builtin_arg(values: Vec<Expression>) -> BuiltinResult {
    Ok(complex_argument("arg", &values)?.arg().into())
}

fn builtin_conj(values: Vec<Expression>) -> BuiltinResult {
    Ok(complex_argument("conj", &values)?.conj().into())
}

fn builtin_first(values: Vec<Expression>) -> BuiltinResult {
    match list_argument("first", single("first", &values)?)? {
        [first, ..] => Ok(first.clone()),
        [] => Err(SemanticError::domain("first", "argument is an empty list")),
    }
}

fn builtin_rest(values: Vec<Expression>) -> BuiltinResult {
    match list_argument("rest", single("rest", &values)?)? {
        [_, rest @ ..] => Ok(Expression::list(rest.to_vec())),
        [] => Err(SemanticError::domain("rest", "argument is an empty list")),
    }
}

fn builtin_length(values: Vec<Expression>) -> BuiltinResult {
    let list = list_argument("length", single("length", &values)?)?;
    Ok((list.len() as f64).into())
}

fn builtin_append(values: Vec<Expression>) -> BuiltinResult {
    let [list, value] = values.as_slice() else {
        return Err(SemanticError::arity("append", "2", values.len()));
    };

    let mut items = list_argument("append", list)?.to_vec();
    items.push(value.clone());
    Ok(Expression::list(items))
}

fn builtin_join(values: Vec<Expression>) -> BuiltinResult {
    let [a, b] = values.as_slice() else {
        return Err(SemanticError::arity("join", "2", values.len()));
    };

    let mut items = list_argument("join", a)?.to_vec();
    items.extend_from_slice(list_argument("join", b)?);
    Ok(Expression::list(items))
}

const RANGE_LIMIT: u32 = 1 << 20;

fn builtin_range(values: Vec<Expression>) -> BuiltinResult {
    let [begin, end, step] = values.as_slice() else {
        return Err(SemanticError::arity("range", "3", values.len()));
    };

    let (Some(begin), Some(end), Some(step)) = (begin.head().as_number(), end.head().as_number(), step.head().as_number()) else {
        return Err(SemanticError::kind_of("range", "argument not a real number"));
    };
    if !(begin.is_finite() && end.is_finite() && step.is_finite()) {
        return Err(SemanticError::domain("range", "bounds and increment must be finite"));
    }
    if end <= begin { return Err(SemanticError::domain("range", "begin greater than or equal to end")); }
    if step <= 0.0 { return Err(SemanticError::domain("range", "negative or zero increment")); }
    if (end - begin) / step > RANGE_LIMIT as f64 {
        return Err(SemanticError::domain("range", &format!("more than {} elements", RANGE_LIMIT)));
    }

    let items = (0..=RANGE_LIMIT)
        .map(|i| begin + i as f64 * step)
        .take_while(|value| *value <= end + f64::EPSILON)
        .map(Expression::from)
        .collect();
    Ok(Expression::list(items))
}

pub(crate) fn builtin_bindings() -> HashMap<String, Binding> {
    let constants = [
        ("pi", Expression::from(std::f64::consts::PI)),
        ("e", Expression::from(std::f64::consts::E)),
        ("I", Expression::from(Complex64::new(0.0, 1.0))),
    ];

    let procedures: [(&str, Procedure); 21] = [
        ("+", builtin_add),
        ("-", builtin_sub),
        ("*", builtin_mul),
        ("/", builtin_div),
        ("sqrt", builtin_sqrt),
        ("^", builtin_pow),
        ("ln", builtin_ln),
        ("sin", builtin_sin),
        ("cos", builtin_cos),
        ("tan", builtin_tan),

        ("real", builtin_real),
        ("imag", builtin_imag),
        ("mag", builtin_mag),
        ("arg", builtin_arg),
        ("conj", builtin_conj),

        ("first", builtin_first),
        ("rest", builtin_rest),
        ("length", builtin_length),
        ("append", builtin_append),
        ("join", builtin_join),
        ("range", builtin_range),
    ];

    constants.into_iter()
        .map(|(name, value)| (name.to_owned(), Binding::Expression(value)))
        .chain(procedures.into_iter().map(|(name, procedure)| (name.to_owned(), Binding::Procedure(procedure))))
        .collect()
}
