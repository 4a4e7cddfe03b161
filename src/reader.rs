// ABOUTME: Builds a Value tree from a flat token stream

use crate::error::EvalError;
use crate::lexer::{tokenize, Token};
use crate::value::Value;

/// Consumes tokens left to right, building one `Value` per top-level
/// `read` call. Quoting is only permitted where the grammar expects a
/// datum (right after `'`, inside a list or vector); a bare trailing `'`
/// at end of input is `MissingEndQuote`.
pub struct Reader<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Reader { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Token> {
        let t = self.tokens.get(self.pos);
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn read(&mut self) -> Result<Value, EvalError> {
        match self.advance().cloned() {
            None => Err(EvalError::UnexpectedEof),
            Some(Token::RParen) => Err(EvalError::UnexpectedClosingParen),
            Some(Token::LParen) => self.read_list(),
            Some(Token::VecOpen) => self.read_vector(),
            Some(Token::Quote) => {
                if self.at_end() {
                    return Err(EvalError::MissingEndQuote);
                }
                let quoted = self.read()?;
                Ok(Value::from_vec(vec![
                    Value::Symbol("quote".to_string()),
                    quoted,
                ]))
            }
            Some(Token::StringLit(s)) => Ok(Value::string(s)),
            Some(Token::Atom(a)) => Ok(classify_atom(&a)),
        }
    }

    fn read_list(&mut self) -> Result<Value, EvalError> {
        let mut items = Vec::new();
        let mut tail = None;
        loop {
            match self.peek() {
                None => return Err(EvalError::UnexpectedEof),
                Some(Token::RParen) => {
                    self.advance();
                    break;
                }
                Some(Token::Atom(a)) if a == "." => {
                    self.advance();
                    tail = Some(Box::new(self.read()?));
                    match self.advance() {
                        Some(Token::RParen) => break,
                        _ => return Err(EvalError::MalformedSpecialForm(
                            "dotted list must end with exactly one closing paren".to_string(),
                        )),
                    }
                }
                _ => items.push(self.read()?),
            }
        }
        Ok(Value::List { items, tail })
    }

    fn read_vector(&mut self) -> Result<Value, EvalError> {
        let mut items = Vec::new();
        loop {
            match self.peek() {
                None => return Err(EvalError::UnexpectedEof),
                Some(Token::RParen) => {
                    self.advance();
                    break;
                }
                _ => items.push(self.read()?),
            }
        }
        Ok(Value::Vector(std::sync::Arc::new(std::sync::Mutex::new(
            items,
        ))))
    }
}

/// Reads every top-level form in `source`.
pub fn read_all(source: &str) -> Result<Vec<Value>, EvalError> {
    let tokens = tokenize(source)?;
    let mut reader = Reader::new(&tokens);
    let mut forms = Vec::new();
    while !reader.at_end() {
        forms.push(reader.read()?);
    }
    Ok(forms)
}

fn named_char(name: &str) -> Option<char> {
    match name {
        "nul" | "null" => Some('\u{00}'),
        "soh" => Some('\u{01}'),
        "stx" => Some('\u{02}'),
        "etx" => Some('\u{03}'),
        "eot" => Some('\u{04}'),
        "enq" => Some('\u{05}'),
        "ack" => Some('\u{06}'),
        "alarm" | "bel" => Some('\u{07}'),
        "backspace" | "bs" => Some('\u{08}'),
        "tab" | "ht" => Some('\t'),
        "linefeed" | "newline" | "lf" => Some('\n'),
        "vtab" | "vt" => Some('\u{0B}'),
        "page" | "ff" => Some('\u{0C}'),
        "return" | "cr" => Some('\r'),
        "so" => Some('\u{0E}'),
        "si" => Some('\u{0F}'),
        "dle" => Some('\u{10}'),
        "dc1" => Some('\u{11}'),
        "dc2" => Some('\u{12}'),
        "dc3" => Some('\u{13}'),
        "dc4" => Some('\u{14}'),
        "nak" => Some('\u{15}'),
        "syn" => Some('\u{16}'),
        "etb" => Some('\u{17}'),
        "can" => Some('\u{18}'),
        "em" => Some('\u{19}'),
        "sub" => Some('\u{1A}'),
        "esc" => Some('\u{1B}'),
        "fs" => Some('\u{1C}'),
        "gs" => Some('\u{1D}'),
        "rs" => Some('\u{1E}'),
        "us" => Some('\u{1F}'),
        "space" | "sp" => Some(' '),
        "delete" | "del" => Some('\u{7F}'),
        _ => None,
    }
}

fn classify_atom(text: &str) -> Value {
    if let Some(rest) = text.strip_prefix("#\\") {
        if rest.chars().count() == 1 {
            return Value::Character(rest.chars().next().unwrap());
        }
        if let Some(c) = named_char(rest) {
            return Value::Character(c);
        }
        return Value::Symbol(text.to_string());
    }
    match text {
        "#t" => return Value::Bool(true),
        "#f" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(n) = text.parse::<f64>() {
        return Value::Number(n);
    }
    Value::Symbol(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_nested_list() {
        let forms = read_all("(+ 1 (* 2 3))").unwrap();
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0].to_string(), "(+ 1 (* 2 3))");
    }

    #[test]
    fn reads_quote_sugar() {
        let forms = read_all("'(1 2)").unwrap();
        assert_eq!(forms[0].to_string(), "(quote (1 2))");
    }

    #[test]
    fn reads_dotted_pair() {
        let forms = read_all("(1 . 2)").unwrap();
        assert!(!forms[0].is_proper_list());
        assert_eq!(forms[0].to_string(), "(1 . 2)");
    }

    #[test]
    fn reads_vector_literal() {
        let forms = read_all("#(1 2 3)").unwrap();
        assert!(matches!(forms[0], Value::Vector(_)));
    }

    #[test]
    fn reads_named_characters() {
        let forms = read_all("#\\space #\\a").unwrap();
        assert!(matches!(forms[0], Value::Character(' ')));
        assert!(matches!(forms[1], Value::Character('a')));
    }

    #[test]
    fn unbalanced_parens_error() {
        assert!(matches!(read_all("(+ 1 2"), Err(EvalError::UnexpectedEof)));
        assert!(matches!(
            read_all(")"),
            Err(EvalError::UnexpectedClosingParen)
        ));
    }

    #[test]
    fn trailing_quote_is_missing_end_quote() {
        let tokens = tokenize("'").unwrap();
        let mut reader = Reader::new(&tokens);
        assert!(matches!(reader.read(), Err(EvalError::MissingEndQuote)));
    }
}
