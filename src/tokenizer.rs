use logos::Logos;

use crate::error::SyntaxError;


// A quoted span keeps its spaces and ends the lexeme at the closing quote.
// A paren inside a quote ends the span.
// Comments run to the end of the line.
#[derive(Debug, Clone, Copy, PartialEq, Logos)]
#[logos(skip r"([ \t\r\n\f]+|;[^\n]*)")]
pub enum Token<'a> {
    #[token("(")]
    Open,

    #[token(")")]
    Close,

    #[regex(r#"[^ \t\r\n\f();"]+"#, |lex| lex.slice())]
    #[regex(r#"[^ \t\r\n\f();"]*"[^"();\t\r\n\f]*"?"#, |lex| lex.slice())]
    Lexeme(&'a str),
}

impl<'a> Token<'a> {
    pub fn as_str(&self) -> &'a str {
        match self {
            Self::Open => "(",
            Self::Close => ")",
            Self::Lexeme(lexeme) => lexeme,
        }
    }
}

pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, SyntaxError> {
    let mut tokens = vec![];
    let mut lexer = Token::lexer(input);

    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push(token),
            Err(_) => return Err(SyntaxError::InvalidToken(lexer.slice().to_owned())),
        }
    }

    Ok(tokens)
}
