use itertools::Itertools;

use crate::{atom::Atom, environment::{Environment, Procedure}, error::{SemanticError, SemanticErrorKind}, expression::{Expression, LAMBDA, LIST}};


type EvaluationResult = Result<Expression, SemanticError>;

pub(crate) const SPECIAL_FORMS: [&str; 8] = ["begin", "define", LIST, LAMBDA, "apply", "map", "set-property", "get-property"];

// Something that can be called with already evaluated arguments
enum Callee {
    Procedure(Procedure),
    Lambda(Expression),
}

fn malformed(detail: impl AsRef<str>) -> SemanticError {
    SemanticError::evaluation(SemanticErrorKind::MalformedForm, detail)
}

fn evaluate_atom(atom: &Atom, environment: &Environment<'_>) -> EvaluationResult {
    match atom {
        Atom::Symbol(symbol) => match environment.expression(symbol) {
            Some(value) => Ok(value.clone()),
            None if environment.is_procedure(symbol) => Err(SemanticError::evaluation(
                SemanticErrorKind::Kind,
                format!("procedure `{}` used as a value", symbol),
            )),
            None => Err(SemanticError::evaluation(SemanticErrorKind::UnknownSymbol, format!("unknown symbol `{}`", symbol))),
        },
        Atom::Number(_) | Atom::Complex(_) | Atom::StringLiteral(_) => Ok(Expression::new(atom.clone())),
        Atom::None => Err(malformed("invalid type in terminal expression")),
    }
}

fn evaluate_begin(list: &[Expression], environment: &mut Environment<'_>) -> EvaluationResult {
    // Every child is evaluated for its effect, the last one is the value
    let Some((last, init)) = list.split_last() else {
        return Err(malformed("zero arguments to begin"));
    };

    for expression in init {
        evaluate(expression, environment)?;
    }
    evaluate(last, environment)
}

fn evaluate_define(list: &[Expression], environment: &mut Environment<'_>) -> EvaluationResult {
    let [name, value] = list else {
        return Err(SemanticError::arity("define", "2", list.len()));
    };

    let Some(name) = name.as_bare_symbol() else {
        return Err(malformed("first argument to define not a symbol"));
    };

    let redefinition = |detail: String| Err(SemanticError::evaluation(SemanticErrorKind::Redefinition, detail));
    if SPECIAL_FORMS.contains(&name) { return redefinition(format!("attempt to redefine special form `{}`", name)); }
    if environment.is_procedure(name) { return redefinition(format!("attempt to redefine built-in procedure `{}`", name)); }
    if environment.contains(name) { return redefinition(format!("attempt to redefine symbol `{}`", name)); }

    let value = evaluate(value, environment)?;
    environment.define(name, value.clone())?;
    Ok(value)
}

fn evaluate_list(list: &[Expression], environment: &mut Environment<'_>) -> EvaluationResult {
    Ok(Expression::list(evaluate_all(list, environment)?))
}

fn evaluate_lambda(list: &[Expression], environment: &Environment<'_>) -> EvaluationResult {
    // The parameter list parses as a form, so its head is the first parameter
    let [parameters, body] = list else {
        return Err(SemanticError::arity(LAMBDA, "2", list.len()));
    };

    let atoms = std::iter::once(Some(parameters.head()))
        .chain(parameters.tail().iter().map(|parameter| parameter.is_leaf().then(|| parameter.head())));

    let mut names = vec![];
    for atom in atoms {
        let Some(name) = atom.and_then(Atom::as_symbol) else {
            return Err(malformed("lambda parameters must be symbols"));
        };
        if SPECIAL_FORMS.contains(&name) || environment.is_procedure(name) {
            return Err(malformed(format!("lambda parameter `{}` names a procedure or special form", name)));
        }
        names.push(name.to_owned());
    }

    Ok(Expression::lambda(names, body.clone()))
}

fn resolve_callee(procedure: &str, callee: &Expression, environment: &mut Environment<'_>) -> Result<Callee, SemanticError> {
    if let Some(builtin) = callee.as_bare_symbol().and_then(|name| environment.procedure(name)) {
        return Ok(Callee::Procedure(builtin));
    }

    let value = evaluate(callee, environment)?;
    if !value.is_lambda() {
        return Err(SemanticError::evaluation(
            SemanticErrorKind::NotAProcedure,
            format!("first argument to {} not a procedure", procedure),
        ));
    }
    Ok(Callee::Lambda(value))
}

fn list_operand(procedure: &str, operand: &Expression, environment: &mut Environment<'_>) -> Result<Vec<Expression>, SemanticError> {
    let value = evaluate(operand, environment)?;
    if !value.is_list() {
        return Err(SemanticError::evaluation(
            SemanticErrorKind::Kind,
            format!("second argument to {} not a list", procedure),
        ));
    }
    Ok(value.into_tail())
}

fn evaluate_apply(list: &[Expression], environment: &mut Environment<'_>) -> EvaluationResult {
    let [callee, arguments] = list else {
        return Err(SemanticError::arity("apply", "2", list.len()));
    };

    let callee = resolve_callee("apply", callee, environment)?;
    let arguments = list_operand("apply", arguments, environment)?;
    call(&callee, arguments, environment)
}

fn evaluate_map(list: &[Expression], environment: &mut Environment<'_>) -> EvaluationResult {
    let [callee, arguments] = list else {
        return Err(SemanticError::arity("map", "2", list.len()));
    };

    let callee = resolve_callee("map", callee, environment)?;
    let results = list_operand("map", arguments, environment)?
        .into_iter()
        .map(|argument| call(&callee, vec![argument], environment))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Expression::list(results))
}

fn property_key(procedure: &str, key: &Expression, environment: &mut Environment<'_>) -> Result<String, SemanticError> {
    match evaluate(key, environment)?.head() {
        Atom::StringLiteral(key) => Ok(key.clone()),
        _ => Err(SemanticError::kind_of(procedure, "first argument not a string")),
    }
}

fn evaluate_set_property(list: &[Expression], environment: &mut Environment<'_>) -> EvaluationResult {
    let [key, value, target] = list else {
        return Err(SemanticError::arity("set-property", "3", list.len()));
    };

    let key = property_key("set-property", key, environment)?;
    let value = evaluate(value, environment)?;

    // A target addressed by name is updated where it is bound
    if let Some(name) = target.as_bare_symbol() {
        if let Some(bound) = environment.expression_mut(name) {
            bound.set_property(key, value);
            return Ok(bound.clone());
        }
    }

    let mut target = evaluate(target, environment)?;
    target.set_property(key, value);
    Ok(target)
}

fn evaluate_get_property(list: &[Expression], environment: &mut Environment<'_>) -> EvaluationResult {
    let [key, target] = list else {
        return Err(SemanticError::arity("get-property", "2", list.len()));
    };

    let key = property_key("get-property", key, environment)?;
    Ok(evaluate(target, environment)?.get_property(&key))
}

fn evaluate_application(expression: &Expression, environment: &mut Environment<'_>) -> EvaluationResult {
    let arguments = evaluate_all(expression.tail(), environment)?;

    let callee = match expression.head() {
        Atom::Symbol(name) => match (environment.procedure(name), environment.expression(name)) {
            (Some(procedure), _) => Callee::Procedure(procedure),
            (None, Some(value)) if value.is_lambda() => Callee::Lambda(value.clone()),
            (None, None) => return Err(SemanticError::evaluation(
                SemanticErrorKind::UnknownSymbol,
                format!("unknown procedure `{}`", name),
            )),
            (None, Some(_)) => return Err(not_a_procedure(expression.head())),
        },
        head => return Err(not_a_procedure(head)),
    };

    call(&callee, arguments, environment)
}

fn not_a_procedure(head: &Atom) -> SemanticError {
    SemanticError::evaluation(SemanticErrorKind::NotAProcedure, format!("`{}` is not a procedure", head))
}

fn call(callee: &Callee, arguments: Vec<Expression>, environment: &Environment<'_>) -> EvaluationResult {
    match callee {
        Callee::Procedure(procedure) => procedure(arguments),
        Callee::Lambda(lambda) => call_lambda(lambda, arguments, environment),
    }
}

/// Call a lambda value. The body runs in a snapshot of the caller's
/// environment, so it sees the bindings in scope at the call site rather
/// than at the definition site.
pub(crate) fn call_lambda(lambda: &Expression, arguments: Vec<Expression>, environment: &Environment<'_>) -> EvaluationResult {
    let Some((parameters, body)) = lambda.lambda_parts() else {
        return Err(not_a_procedure(lambda.head()));
    };

    if parameters.len() != arguments.len() {
        return Err(SemanticError::arity(LAMBDA, &parameters.len().to_string(), arguments.len()));
    }

    tracing::trace!(parameters = %parameters.iter().join(" "), "calling lambda");

    let mut frame = Environment::snapshot(environment);
    for (parameter, argument) in parameters.into_iter().zip(arguments) {
        frame.bind_parameter(parameter, argument);
    }

    evaluate(body, &mut frame)
}

fn evaluate_all(list: &[Expression], environment: &mut Environment<'_>) -> Result<Vec<Expression>, SemanticError> {
    list.iter()
        .map(|expression| evaluate(expression, environment))
        .collect()
}

pub(crate) fn evaluate(expression: &Expression, environment: &mut Environment<'_>) -> EvaluationResult {
    // Special forms are recognized by head symbol before anything else
    match expression.head().as_symbol() {
        Some("begin") => evaluate_begin(expression.tail(), environment),
        Some("define") => evaluate_define(expression.tail(), environment),
        Some("apply") => evaluate_apply(expression.tail(), environment),
        Some("map") => evaluate_map(expression.tail(), environment),
        Some(LIST) => evaluate_list(expression.tail(), environment),
        Some(LAMBDA) if expression.is_lambda() => Ok(expression.clone()),
        Some("set-property") => evaluate_set_property(expression.tail(), environment),
        Some("get-property") => evaluate_get_property(expression.tail(), environment),
        Some(LAMBDA) => evaluate_lambda(expression.tail(), environment),
        _ if expression.is_leaf() => evaluate_atom(expression.head(), environment),
        _ => evaluate_application(expression, environment),
    }
}
