// ABOUTME: display/newline — unquoted output to the current output port

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use lisp_macros::builtin;
use std::io::Write;
use std::sync::Arc;

/// Writes `args` space-separated to stdout without quoting strings or
/// characters, and without a trailing newline.
#[builtin(name = "display", min = 1, max = -1)]
pub fn display(args: &[Value]) -> Result<Value, EvalError> {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            print!(" ");
        }
        match arg {
            Value::String(s) => print!("{}", s.lock().unwrap()),
            Value::Character(c) => print!("{c}"),
            other => print!("{other}"),
        }
    }
    let _ = std::io::stdout().flush();
    Ok(Value::unspecified())
}

#[builtin(name = "newline", min = 0, max = 0)]
pub fn newline(_args: &[Value]) -> Result<Value, EvalError> {
    println!();
    Ok(Value::unspecified())
}

pub fn register(env: &Arc<Environment>) {
    register_display(env);
    register_newline(env);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_of_string_is_unquoted() {
        assert!(display(&[Value::string("hi")]).unwrap().is_unspecified());
    }
}
