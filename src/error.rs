// ABOUTME: Error types spanning lexical, syntactic, macro and runtime failures

use crate::value::Value;
use thiserror::Error;

pub const ARITY_ONE: &str = "1";
pub const ARITY_TWO: &str = "2";
pub const ARITY_AT_LEAST_ONE: &str = "at least 1";

#[derive(Error, Debug, Clone)]
pub enum EvalError {
    // ----- Lexical -----
    #[error("unterminated string literal")]
    UnterminatedString,

    // ----- Syntactic (reader) -----
    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("unexpected closing parenthesis")]
    UnexpectedClosingParen,

    #[error("missing closing quote after '")]
    MissingEndQuote,

    #[error("malformed special form: {0}")]
    MalformedSpecialForm(String),

    // ----- Semantic / evaluation -----
    #[error("unbound variable: {0}")]
    Unbound(String),

    #[error("not a procedure: {0}")]
    NotAProcedure(String),

    #[error("{function}: expected {expected} argument{}, got {actual}", if *.expected == "1" { "" } else { "s" })]
    Arity {
        function: String,
        expected: String,
        actual: usize,
    },

    #[error("{function}: expected {expected}, got {actual} at argument {position}")]
    TypeError {
        function: String,
        expected: String,
        actual: &'static str,
        position: usize,
    },

    #[error("division by zero")]
    ZeroDivision,

    // ----- Macro / pattern engine -----
    #[error("no syntax-rules pattern matched for {0}")]
    NoPatternMatched(String),

    #[error("template expansion failed: {0}")]
    TemplateExpansionFailed(String),

    // ----- Concurrency -----
    #[error("send on closed channel")]
    SendOnClosedChannel,

    // ----- I/O -----
    #[error("read error: {0}")]
    ReadError(String),

    #[error("file not found: {0}")]
    FileNotFound(String),

    // ----- Escape hatch for (error ...) and general runtime failures -----
    #[error("{function}: {message}")]
    RuntimeError { function: String, message: String },

    #[error("{0}")]
    Custom(String),
}

impl EvalError {
    pub fn type_error(function: &str, expected: &str, actual: &Value, position: usize) -> Self {
        EvalError::TypeError {
            function: function.to_string(),
            expected: expected.to_string(),
            actual: actual.type_name(),
            position,
        }
    }

    pub fn arity_error(function: &str, expected: impl Into<String>, actual: usize) -> Self {
        EvalError::Arity {
            function: function.to_string(),
            expected: expected.into(),
            actual,
        }
    }

    pub fn runtime_error(function: &str, message: impl Into<String>) -> Self {
        EvalError::RuntimeError {
            function: function.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_error_message_names_function_and_position() {
        let err = EvalError::type_error("car", "pair", &Value::Number(1.0), 0);
        assert!(err.to_string().contains("car"));
        assert!(err.to_string().contains("number"));
    }

    #[test]
    fn arity_error_pluralizes_correctly() {
        let one = EvalError::arity_error("car", ARITY_ONE, 0);
        assert!(one.to_string().contains("1 argument,"));
        let many = EvalError::arity_error("+", ARITY_AT_LEAST_ONE, 0);
        assert!(many.to_string().contains("at least 1 argument,"));
    }
}
