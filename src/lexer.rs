// ABOUTME: Tokenizer: turns raw source text into a flat token stream using nom combinators

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{char, multispace1, none_of},
    combinator::{fail, recognize, value},
    multi::many0,
    IResult, Parser,
};

use crate::error::EvalError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LParen,
    RParen,
    Quote,
    VecOpen,
    StringLit(String),
    Atom(String),
}

/// True if `input` begins with an escaped semicolon (`\;`), which stands
/// for a literal `;` everywhere outside a string literal, never a comment
/// or atom terminator.
fn is_escaped_semicolon(input: &str) -> bool {
    input.starts_with("\\;")
}

/// Skip a `;` line comment. Does not special-case `;;` or `;;;`: the
/// grammar in use here treats any run of semicolons the same way, unlike
/// the teacher's doc-comment-collecting parser. An escaped `\;` is never
/// a comment start, even if reached directly.
fn line_comment(input: &str) -> IResult<&str, ()> {
    if is_escaped_semicolon(input) {
        return fail().parse(input);
    }
    let (input, _) = char(';')(input)?;
    let (input, _) = take_while(|c| c != '\n')(input)?;
    Ok((input, ()))
}

fn ws_and_comments(input: &str) -> IResult<&str, ()> {
    many0(alt((value((), multispace1), line_comment)))
        .map(|_| ())
        .parse(input)
}

fn lparen(input: &str) -> IResult<&str, Token> {
    value(Token::LParen, char('(')).parse(input)
}

fn rparen(input: &str) -> IResult<&str, Token> {
    value(Token::RParen, char(')')).parse(input)
}

fn quote(input: &str) -> IResult<&str, Token> {
    value(Token::Quote, char('\'')).parse(input)
}

fn vec_open(input: &str) -> IResult<&str, Token> {
    value(Token::VecOpen, tag("#(")).parse(input)
}

/// String literals have no escape sequences defined: a `"` always closes
/// the string it opened.
fn string_lit(input: &str) -> IResult<&str, Token> {
    let (input, _) = char('"')(input)?;
    let (input, text) = recognize(many0(none_of("\""))).parse(input)?;
    let (input, _) = char('"')(input)?;
    Ok((input, Token::StringLit(text.to_string())))
}

fn is_atom_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '(' | ')' | '\'' | '"' | ';')
}

/// An atom is a run of ordinary atom characters, where an escaped `\;`
/// contributes a literal `;` instead of ending the atom or starting a
/// comment.
fn atom(input: &str) -> IResult<&str, Token> {
    let mut text = String::new();
    let mut rest = input;
    loop {
        if is_escaped_semicolon(rest) {
            text.push(';');
            rest = &rest[2..];
            continue;
        }
        match rest.chars().next() {
            Some(c) if is_atom_char(c) => {
                text.push(c);
                rest = &rest[c.len_utf8()..];
            }
            _ => break,
        }
    }
    if text.is_empty() {
        return fail().parse(input);
    }
    Ok((rest, Token::Atom(text)))
}

fn one_token(input: &str) -> IResult<&str, Token> {
    alt((vec_open, lparen, rparen, quote, string_lit, atom)).parse(input)
}

/// Tokenizes the full input. A `"` with no matching close anywhere in the
/// remaining input is reported as `UnterminatedString` rather than as a
/// generic parse failure.
pub fn tokenize(input: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = Vec::new();
    let mut rest = input;

    loop {
        let (after_ws, _) = ws_and_comments(rest).map_err(|_| EvalError::UnterminatedString)?;
        rest = after_ws;
        if rest.is_empty() {
            break;
        }
        if rest.starts_with('"') && !rest[1..].contains('"') {
            return Err(EvalError::UnterminatedString);
        }
        match one_token(rest) {
            Ok((after, token)) => {
                tokens.push(token);
                rest = after;
            }
            Err(_) => return Err(EvalError::UnterminatedString),
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_simple_call() {
        let tokens = tokenize("(+ 1 2)").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::LParen,
                Token::Atom("+".into()),
                Token::Atom("1".into()),
                Token::Atom("2".into()),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn tokenizes_vector_prefix_and_quote() {
        let tokens = tokenize("'#(1 2)").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Quote,
                Token::VecOpen,
                Token::Atom("1".into()),
                Token::Atom("2".into()),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn skips_line_comments() {
        let tokens = tokenize("; hello\n(+ 1 2) ; trailing\n").unwrap();
        assert_eq!(tokens.len(), 5);
    }

    #[test]
    fn escaped_semicolon_stays_part_of_the_atom() {
        let tokens = tokenize("a\\;b").unwrap();
        assert_eq!(tokens, vec![Token::Atom("a;b".into())]);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(matches!(
            tokenize("\"abc"),
            Err(EvalError::UnterminatedString)
        ));
    }

    #[test]
    fn string_literal_has_no_escapes() {
        let tokens = tokenize("\"a\\nb\"").unwrap();
        assert_eq!(tokens, vec![Token::StringLit("a\\nb".into())]);
    }
}
