// ABOUTME: Syntax highlighter for REPL with color support
// Implements rustyline's Highlighter trait to provide ANSI color codes
// for Lisp syntax elements while preserving display width

use rustyline::Helper;
use rustyline::completion::Completer;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use std::borrow::Cow;
use std::collections::HashSet;

const COLOR_RESET: &str = "\x1b[0m";
const COLOR_PARENS: &str = "\x1b[1;34m"; // Bold blue
const COLOR_SPECIAL_FORM: &str = "\x1b[1;35m"; // Bold magenta
const COLOR_BUILTIN: &str = "\x1b[36m"; // Cyan
const COLOR_NUMBER: &str = "\x1b[33m"; // Yellow
const COLOR_STRING: &str = "\x1b[32m"; // Green
const COLOR_BOOLEAN: &str = "\x1b[33m"; // Yellow
const COLOR_COMMENT: &str = "\x1b[90m"; // Bright black (gray)
const COLOR_QUOTE: &str = "\x1b[1;33m"; // Bold yellow

/// Syntax-aware color highlighting for the REPL.
pub struct LispHelper;

impl LispHelper {
    pub fn new() -> Self {
        LispHelper
    }
}

impl Default for LispHelper {
    fn default() -> Self {
        Self::new()
    }
}

impl Helper for LispHelper {}

impl Completer for LispHelper {
    type Candidate = String;
}

impl Hinter for LispHelper {
    type Hint = String;
}

impl Validator for LispHelper {}

impl Highlighter for LispHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let special_forms = special_forms();
        let builtins = builtins();
        let highlighted = highlight_line(line, &special_forms, &builtins);

        if highlighted == line {
            Cow::Borrowed(line)
        } else {
            Cow::Owned(highlighted)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }
}

fn highlight_line(
    line: &str,
    special_forms: &HashSet<&'static str>,
    builtins: &HashSet<&'static str>,
) -> String {
    let mut result = String::new();
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            ';' => {
                result.push_str(COLOR_COMMENT);
                while i < chars.len() && chars[i] != '\n' {
                    result.push(chars[i]);
                    i += 1;
                }
                result.push_str(COLOR_RESET);
            }

            '"' => {
                result.push_str(COLOR_STRING);
                result.push('"');
                i += 1;

                let mut found_close = false;
                while i < chars.len() {
                    if chars[i] == '\\' && i + 1 < chars.len() {
                        result.push(chars[i]);
                        result.push(chars[i + 1]);
                        i += 2;
                    } else if chars[i] == '"' {
                        result.push('"');
                        i += 1;
                        found_close = true;
                        break;
                    } else {
                        result.push(chars[i]);
                        i += 1;
                    }
                }

                result.push_str(COLOR_RESET);
                if !found_close {
                    while i < chars.len() && chars[i] != '\n' {
                        result.push(chars[i]);
                        i += 1;
                    }
                }
            }

            '0'..='9' => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                if i < chars.len() && chars[i] == '.' && i + 1 < chars.len() && chars[i + 1].is_ascii_digit() {
                    i += 1;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
                let num_str: String = chars[start..i].iter().collect();
                result.push_str(COLOR_NUMBER);
                result.push_str(&num_str);
                result.push_str(COLOR_RESET);
            }

            '+' | '-' if i + 1 < chars.len() && chars[i + 1].is_ascii_digit() => {
                let start = i;
                i += 1;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                if i < chars.len() && chars[i] == '.' && i + 1 < chars.len() && chars[i + 1].is_ascii_digit() {
                    i += 1;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
                let num_str: String = chars[start..i].iter().collect();
                result.push_str(COLOR_NUMBER);
                result.push_str(&num_str);
                result.push_str(COLOR_RESET);
            }

            '#' if i + 1 < chars.len() && (chars[i + 1] == 't' || chars[i + 1] == 'f') => {
                result.push_str(COLOR_BOOLEAN);
                result.push(chars[i]);
                result.push(chars[i + 1]);
                i += 2;
                result.push_str(COLOR_RESET);
            }

            '\'' | '`' => {
                result.push_str(COLOR_QUOTE);
                result.push(chars[i]);
                i += 1;
                result.push_str(COLOR_RESET);
            }

            '(' | ')' | '[' | ']' => {
                result.push_str(COLOR_PARENS);
                result.push(chars[i]);
                i += 1;
                result.push_str(COLOR_RESET);
            }

            ' ' | '\t' | '\n' | '\r' => {
                result.push(chars[i]);
                i += 1;
            }

            _ => {
                let start = i;
                while i < chars.len()
                    && !chars[i].is_whitespace()
                    && !matches!(chars[i], '(' | ')' | '[' | ']' | '"' | ';' | '\'' | '`')
                {
                    i += 1;
                }

                let symbol: String = chars[start..i].iter().collect();

                if special_forms.contains(symbol.as_str()) {
                    result.push_str(COLOR_SPECIAL_FORM);
                    result.push_str(&symbol);
                    result.push_str(COLOR_RESET);
                } else if builtins.contains(symbol.as_str()) {
                    result.push_str(COLOR_BUILTIN);
                    result.push_str(&symbol);
                    result.push_str(COLOR_RESET);
                } else {
                    result.push_str(&symbol);
                }
            }
        }
    }

    result
}

fn special_forms() -> HashSet<&'static str> {
    [
        "quote",
        "if",
        "define",
        "set!",
        "lambda",
        "define-syntax",
        "syntax-rules",
        "go",
        "time",
    ]
    .iter()
    .copied()
    .collect()
}

fn builtins() -> HashSet<&'static str> {
    [
        "+", "-", "*", "/", "modulo", "abs", "sqrt", "sin", "cos", "tan", "min", "max", "=", "<",
        ">", "<=", ">=", "number?", "string?", "bool?", "char?", "vector?", "procedure?",
        "channel?", "error?", "symbol?", "pair?", "null?", "list?", "eq?", "eqv?", "equal?",
        "not", "cons", "car", "cdr", "list", "length", "append", "reverse", "list-ref",
        "string-length", "string-append", "substring", "string->symbol", "symbol->string",
        "string->list", "list->string", "char->integer", "integer->char", "string=?",
        "make-vector", "vector", "vector-length", "vector-ref", "vector-set!", "vector-fill!",
        "vector->list", "list->vector", "current-output-port", "current-error-port", "port?",
        "write-string", "chan", "<-", "->", "close", "sleep", "begin", "eval", "apply", "error",
        "error-message", "display", "newline",
    ]
    .iter()
    .copied()
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_highlighting() {
        let highlighted = highlight_line("42", &special_forms(), &builtins());
        assert!(highlighted.contains(COLOR_NUMBER));
    }

    #[test]
    fn string_highlighting() {
        let highlighted = highlight_line("\"hello\"", &special_forms(), &builtins());
        assert!(highlighted.contains(COLOR_STRING));
    }

    #[test]
    fn special_form_highlighting() {
        let highlighted = highlight_line("(define x 5)", &special_forms(), &builtins());
        assert!(highlighted.contains(COLOR_SPECIAL_FORM));
        assert!(highlighted.contains(COLOR_PARENS));
    }

    #[test]
    fn builtin_function_highlighting() {
        let highlighted = highlight_line("(+ 1 2)", &special_forms(), &builtins());
        assert!(highlighted.contains(COLOR_BUILTIN));
    }

    #[test]
    fn boolean_highlighting() {
        let highlighted = highlight_line("#t #f", &special_forms(), &builtins());
        assert!(highlighted.contains(COLOR_BOOLEAN));
    }

    #[test]
    fn quote_highlighting() {
        let highlighted = highlight_line("'(1 2 3)", &special_forms(), &builtins());
        assert!(highlighted.contains(COLOR_QUOTE));
    }
}
