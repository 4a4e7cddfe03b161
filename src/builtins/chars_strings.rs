// ABOUTME: Character and string operations: predicates, conversions, concatenation

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use lisp_macros::builtin;
use std::sync::Arc;

fn as_string(v: &Value, fname: &str, pos: usize) -> Result<String, EvalError> {
    match v {
        Value::String(s) => Ok(s.lock().unwrap().clone()),
        other => Err(EvalError::type_error(fname, "string", other, pos)),
    }
}

fn as_char(v: &Value, fname: &str, pos: usize) -> Result<char, EvalError> {
    match v {
        Value::Character(c) => Ok(*c),
        other => Err(EvalError::type_error(fname, "character", other, pos)),
    }
}

#[builtin(name = "string-length", min = 1, max = 1)]
pub fn string_length(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Number(as_string(&args[0], "string-length", 0)?.chars().count() as f64))
}

#[builtin(name = "string-append", min = 0, max = -1)]
pub fn string_append(args: &[Value]) -> Result<Value, EvalError> {
    let mut out = String::new();
    for (i, a) in args.iter().enumerate() {
        out.push_str(&as_string(a, "string-append", i)?);
    }
    Ok(Value::string(out))
}

#[builtin(name = "substring", min = 3, max = 3)]
pub fn substring(args: &[Value]) -> Result<Value, EvalError> {
    let s = as_string(&args[0], "substring", 0)?;
    let chars: Vec<char> = s.chars().collect();
    let start = match &args[1] {
        Value::Number(n) => *n as usize,
        other => return Err(EvalError::type_error("substring", "number", other, 1)),
    };
    let end = match &args[2] {
        Value::Number(n) => *n as usize,
        other => return Err(EvalError::type_error("substring", "number", other, 2)),
    };
    if start > end || end > chars.len() {
        return Err(EvalError::runtime_error("substring", "index out of range"));
    }
    Ok(Value::string(chars[start..end].iter().collect::<String>()))
}

#[builtin(name = "string->symbol", min = 1, max = 1)]
pub fn string_to_symbol(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Symbol(as_string(&args[0], "string->symbol", 0)?))
}

#[builtin(name = "symbol->string", min = 1, max = 1)]
pub fn symbol_to_string(args: &[Value]) -> Result<Value, EvalError> {
    match &args[0] {
        Value::Symbol(s) => Ok(Value::string(s.clone())),
        other => Err(EvalError::type_error("symbol->string", "symbol", other, 0)),
    }
}

#[builtin(name = "string->list", min = 1, max = 1)]
pub fn string_to_list(args: &[Value]) -> Result<Value, EvalError> {
    let s = as_string(&args[0], "string->list", 0)?;
    Ok(Value::from_vec(s.chars().map(Value::Character).collect()))
}

#[builtin(name = "list->string", min = 1, max = 1)]
pub fn list_to_string(args: &[Value]) -> Result<Value, EvalError> {
    let items = args[0]
        .to_vec()
        .ok_or_else(|| EvalError::type_error("list->string", "proper list", &args[0], 0))?;
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        out.push(as_char(item, "list->string", i)?);
    }
    Ok(Value::string(out))
}

#[builtin(name = "char->integer", min = 1, max = 1)]
pub fn char_to_integer(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Number(as_char(&args[0], "char->integer", 0)? as u32 as f64))
}

#[builtin(name = "integer->char", min = 1, max = 1)]
pub fn integer_to_char(args: &[Value]) -> Result<Value, EvalError> {
    let n = match &args[0] {
        Value::Number(n) => *n as u32,
        other => return Err(EvalError::type_error("integer->char", "number", other, 0)),
    };
    char::from_u32(n)
        .map(Value::Character)
        .ok_or_else(|| EvalError::runtime_error("integer->char", "not a valid code point"))
}

#[builtin(name = "char-alphabetic?", min = 1, max = 1)]
pub fn char_alphabetic_p(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(as_char(&args[0], "char-alphabetic?", 0)?.is_alphabetic()))
}

#[builtin(name = "char-numeric?", min = 1, max = 1)]
pub fn char_numeric_p(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(as_char(&args[0], "char-numeric?", 0)?.is_numeric()))
}

#[builtin(name = "char-whitespace?", min = 1, max = 1)]
pub fn char_whitespace_p(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(as_char(&args[0], "char-whitespace?", 0)?.is_whitespace()))
}

#[builtin(name = "char-upper-case?", min = 1, max = 1)]
pub fn char_upper_case_p(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(as_char(&args[0], "char-upper-case?", 0)?.is_uppercase()))
}

#[builtin(name = "char-lower-case?", min = 1, max = 1)]
pub fn char_lower_case_p(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(as_char(&args[0], "char-lower-case?", 0)?.is_lowercase()))
}

#[builtin(name = "char-upcase", min = 1, max = 1)]
pub fn char_upcase(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Character(
        as_char(&args[0], "char-upcase", 0)?.to_ascii_uppercase(),
    ))
}

#[builtin(name = "char-downcase", min = 1, max = 1)]
pub fn char_downcase(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Character(
        as_char(&args[0], "char-downcase", 0)?.to_ascii_lowercase(),
    ))
}

#[builtin(name = "string->number", min = 1, max = 1)]
pub fn string_to_number(args: &[Value]) -> Result<Value, EvalError> {
    let s = as_string(&args[0], "string->number", 0)?;
    Ok(match s.trim().parse::<f64>() {
        Ok(n) => Value::Number(n),
        Err(_) => Value::Bool(false),
    })
}

#[builtin(name = "number->string", min = 1, max = 1)]
pub fn number_to_string(args: &[Value]) -> Result<Value, EvalError> {
    match &args[0] {
        Value::Number(_) => Ok(Value::string(args[0].to_string())),
        other => Err(EvalError::type_error("number->string", "number", other, 0)),
    }
}

#[builtin(name = "string=?", min = 2, max = -1)]
pub fn string_eq(args: &[Value]) -> Result<Value, EvalError> {
    let first = as_string(&args[0], "string=?", 0)?;
    for (i, a) in args.iter().enumerate().skip(1) {
        if as_string(a, "string=?", i)? != first {
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
}

pub fn register(env: &Arc<Environment>) {
    register_string_length(env);
    register_string_append(env);
    register_substring(env);
    register_string_to_symbol(env);
    register_symbol_to_string(env);
    register_string_to_list(env);
    register_list_to_string(env);
    register_char_to_integer(env);
    register_integer_to_char(env);
    register_string_eq(env);
    register_char_alphabetic_p(env);
    register_char_numeric_p(env);
    register_char_whitespace_p(env);
    register_char_upper_case_p(env);
    register_char_lower_case_p(env);
    register_char_upcase(env);
    register_char_downcase(env);
    register_string_to_number(env);
    register_number_to_string(env);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_append_concatenates() {
        let result = string_append(&[Value::string("foo"), Value::string("bar")]).unwrap();
        assert_eq!(result.to_string(), "foobar");
    }

    #[test]
    fn substring_extracts_a_slice() {
        let result = substring(&[Value::string("hello"), Value::Number(1.0), Value::Number(3.0)]).unwrap();
        assert_eq!(result.to_string(), "el");
    }

    #[test]
    fn char_integer_round_trip() {
        let code = char_to_integer(&[Value::Character('A')]).unwrap();
        assert_eq!(code.to_string(), "65");
        let back = integer_to_char(&[code]).unwrap();
        assert!(matches!(back, Value::Character('A')));
    }
}
