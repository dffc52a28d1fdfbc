use crate::{atom::Atom, error::SyntaxError, expression::Expression, tokenizer::{tokenize, Token}};


type ParseResult<O> = Result<O, SyntaxError>;

fn parse_token<'a, 'b: 'a>(token_recognizer: impl Fn(&'a Token<'b>) -> bool) -> impl Fn(&'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], &'a Token<'b>)> {
    move |tokens| {
        // Running out of tokens mid-expression means a paren was never closed
        let Some(token) = tokens.first() else { return Err(SyntaxError::Unbalanced) };

        if !token_recognizer(token) { return Err(SyntaxError::InvalidToken(token.as_str().to_owned())) }
        Ok((&tokens[1..], token))
    }
}

fn parse_surrounds<'a, 'b: 'a, O>(
    start_recognizer: impl Fn(&'a Token<'b>) -> bool,
    internal_parser: impl Fn(&'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], O)>,
    end_recognizer: impl Fn(&'a Token<'b>) -> bool,
) -> impl Fn(&'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], O)> {
    let start_parser = parse_token(start_recognizer);
    let end_parser = parse_token(end_recognizer);

    move |tokens| {
        let (tokens, _) = start_parser(tokens)?;
        let (tokens, internal) = internal_parser(tokens)?;
        let (tokens, _) = end_parser(tokens)?;

        Ok((tokens, internal))
    }
}

// Repeats `parser` until the terminator (or the end of input) comes next.
// Unlike backtracking on failure, errors inside an element propagate.
fn parse_list_until<'a, 'b: 'a, O>(
    parser: impl Fn(&'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], O)>,
    terminator: impl Fn(&'a Token<'b>) -> bool,
) -> impl Fn(&'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], Vec<O>)> {
    move |mut tokens| {
        let mut result = vec![];

        while let Some(token) = tokens.first() {
            if terminator(token) { break; }

            let (new_tokens, value) = parser(tokens)?;
            result.push(value);
            tokens = new_tokens;
        }

        Ok((tokens, result))
    }
}

fn parse_pair<'a, 'b: 'a, A, B>(
    a: impl Fn(&'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], A)>,
    b: impl Fn(&'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], B)>,
) -> impl Fn(&'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], (A, B))> {
    move |tokens| {
        let (tokens, first) = a(tokens)?;
        let (tokens, second) = b(tokens)?;
        Ok((tokens, (first, second)))
    }
}

fn parser_map<'a, 'b: 'a, I, O>(
    parser: impl Fn(&'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], I)>,
    f: impl Fn(I) -> O
) -> impl Fn(&'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], O)> {
    move |tokens| {
        let (tokens, value) = parser(tokens)?;
        Ok((tokens, f(value)))
    }
}

fn parse_atom<'a, 'b: 'a>(tokens: &'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], Atom)> {
    let (tokens, token) = parse_token(|token| matches!(token, Token::Lexeme(_)))(tokens)?;
    Ok((tokens, Atom::from_token(token.as_str())?))
}

fn parse_head<'a, 'b: 'a>(tokens: &'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], Atom)> {
    // The first token after an open paren names the node
    match tokens.first() {
        Some(Token::Close) => Err(SyntaxError::EmptyForm),
        Some(Token::Open) => Err(SyntaxError::FormHead),
        _ => parse_atom(tokens),
    }
}

fn parse_expression<'a, 'b: 'a>(tokens: &'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], Expression)> {
    parse_surrounds(
        |token| matches!(token, Token::Open),
        parser_map(
            parse_pair(parse_head, parse_list_until(parse_sexp, |token| matches!(token, Token::Close))),
            |(head, tail)| Expression::with_tail(head, tail)
        ),
        |token| matches!(token, Token::Close)
    )(tokens)
}

fn parse_sexp<'a, 'b: 'a>(tokens: &'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], Expression)> {
    match tokens.first() {
        Some(Token::Open) => parse_expression(tokens),
        _ => parser_map(parse_atom, Expression::new)(tokens),
    }
}

/// Parse exactly one parenthesized top-level form from `input`
pub fn parse(input: &str) -> ParseResult<Expression> {
    let tokens = tokenize(input)?;

    match tokens.first() {
        None => return Err(SyntaxError::EmptyInput),
        Some(Token::Lexeme(lexeme)) => return Err(SyntaxError::BareAtom((*lexeme).to_owned())),
        Some(Token::Close) => return Err(SyntaxError::Unbalanced),
        Some(Token::Open) => {}
    }

    let (tokens, expression) = parse_expression(&tokens)?;
    if !tokens.is_empty() { return Err(SyntaxError::TrailingInput); }

    tracing::trace!(%expression, "parsed");
    Ok(expression)
}

#[cfg(test)]
mod tests {
    use anyhow::bail;
    use pretty_assertions::assert_eq;

    use crate::test_utils::{all_testcases, load_test_pair, TestOutcome};

    use super::*;

    fn leaf(atom: Atom) -> Expression {
        Expression::new(atom)
    }

    #[test]
    fn builds_a_nested_tree() {
        let expression = parse("(begin (define r 10) (* pi (* r r)))").unwrap();

        let expected = Expression::with_tail(Atom::symbol("begin"), vec![
            Expression::with_tail(Atom::symbol("define"), vec![leaf(Atom::symbol("r")), leaf(Atom::number(10.0))]),
            Expression::with_tail(Atom::symbol("*"), vec![
                leaf(Atom::symbol("pi")),
                Expression::with_tail(Atom::symbol("*"), vec![leaf(Atom::symbol("r")), leaf(Atom::symbol("r"))]),
            ]),
        ]);
        assert_eq!(expression, expected);
    }

    #[test]
    fn accepts_numeric_literals() {
        for program in ["(1)", "(+1)", "(+1e+0)", "(1e-0)"] {
            assert_eq!(parse(program).unwrap(), leaf(Atom::number(1.0)), "{}", program);
        }
    }

    #[test]
    fn string_literals_lose_their_quotes() {
        let expression = parse(r#"(define s "a b")"#).unwrap();
        assert_eq!(expression.tail()[1], leaf(Atom::string_literal("a b")));
    }

    #[test]
    fn rejects_malformed_input() {
        let cases = [
            ("", SyntaxError::EmptyInput),
            ("  ; only a comment", SyntaxError::EmptyInput),
            ("hello", SyntaxError::BareAtom("hello".into())),
            (")", SyntaxError::Unbalanced),
            ("(f", SyntaxError::Unbalanced),
            ("(begin (define r 10) (* pi (* r r", SyntaxError::Unbalanced),
            ("( )", SyntaxError::EmptyForm),
            ("(+ 1 ())", SyntaxError::EmptyForm),
            ("((f) 1)", SyntaxError::FormHead),
            ("(1abc)", SyntaxError::MalformedNumber("1abc".into())),
            ("(define x 1abc)", SyntaxError::MalformedNumber("1abc".into())),
            ("(begin (define r 10) (* pi (* r r))) )", SyntaxError::TrailingInput),
            ("(+ 1 2) (+ 3 4)", SyntaxError::TrailingInput),
        ];

        for (program, expected) in cases {
            assert_eq!(parse(program), Err(expected), "{:?}", program);
        }
    }

    #[test]
    fn nested_forms_may_start_a_tail() {
        let expression = parse("(f (g 1) 2)").unwrap();
        assert_eq!(expression.tail().len(), 2);
        assert_eq!(expression.tail()[0].head(), &Atom::symbol("g"));
    }

    #[test]
    fn parse_testcases() -> anyhow::Result<()> {
        for testcase in all_testcases()? {
            for (lineno, (input, expected)) in load_test_pair(&testcase)?.into_iter().enumerate() {
                let result = parse(&input);
                let expected: TestOutcome = expected.into();
                match (&result, expected) {
                    (Ok(_), TestOutcome::SyntaxError) | (Err(_), TestOutcome::Value(_)) | (Err(_), TestOutcome::SemanticError)
                        => bail!("Testcase {}:{} - `{}` parsed as {:?}", testcase, lineno, input, result),
                    _ => {}
                }
            }
        }

        Ok(())
    }
}
