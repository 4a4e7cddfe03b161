// ABOUTME: begin/eval/apply/error/load — ordinary builtins rather than dedicated special forms

use crate::env::Environment;
use crate::error::EvalError;
use crate::eval::eval;
use crate::reader::read_all;
use crate::value::Value;
use lisp_macros::builtin;
use std::sync::Arc;

/// `begin` evaluates its arguments left-to-right before this function
/// ever runs (ordinary call-argument evaluation), so returning the last
/// one reproduces Scheme's `begin` exactly. `(begin)` yields the
/// unspecified value rather than erroring.
#[builtin(name = "begin", min = 0, max = -1)]
pub fn begin(args: &[Value]) -> Result<Value, EvalError> {
    Ok(args.last().cloned().unwrap_or_else(Value::unspecified))
}

#[builtin(name = "error", min = 1, max = -1)]
pub fn error(args: &[Value]) -> Result<Value, EvalError> {
    let message = args
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    Err(EvalError::Custom(message))
}

#[builtin(name = "error-message", min = 1, max = 1)]
pub fn error_message(args: &[Value]) -> Result<Value, EvalError> {
    match &args[0] {
        Value::Error(msg) => Ok(Value::string(msg.clone())),
        other => Err(EvalError::type_error("error-message", "error", other, 0)),
    }
}

pub fn register(env: &Arc<Environment>) {
    register_begin(env);
    register_error(env);
    register_error_message(env);
    env.define("eval", Value::Builtin {
        name: "eval",
        min_arity: 1,
        max_arity: 1,
        func: eval_builtin,
    });
    env.define("apply", Value::Builtin {
        name: "apply",
        min_arity: 2,
        max_arity: -1,
        func: apply_builtin,
    });
}

/// `eval` needs an environment to evaluate against, but a `BuiltinFn`
/// only receives its evaluated arguments. It reaches for the top-level
/// environment stashed by `set_global_env`, matching top-level `eval`
/// semantics (no support for evaluating against a captured lexical
/// environment, which Scheme's `eval` does not require either).
fn eval_builtin(args: &[Value]) -> Result<Value, EvalError> {
    GLOBAL_ENV.with(|cell| {
        let env = cell
            .borrow()
            .clone()
            .expect("global environment not initialized before eval was called");
        eval(&args[0], &env)
    })
}

/// `(apply proc a b ... args-list)`: the final argument must be a proper
/// list and is spliced onto the preceding positional arguments.
fn apply_builtin(args: &[Value]) -> Result<Value, EvalError> {
    let proc = args[0].clone();
    let last = args.last().unwrap();
    let mut call_args = args[1..args.len() - 1].to_vec();
    let trailing = last
        .to_vec()
        .ok_or_else(|| EvalError::type_error("apply", "proper list", last, args.len() - 1))?;
    call_args.extend(trailing);
    crate::eval::apply_procedure(proc, call_args)
}

thread_local! {
    static GLOBAL_ENV: std::cell::RefCell<Option<Arc<Environment>>> = const { std::cell::RefCell::new(None) };
}

/// Records the top-level environment so `eval`/`apply` builtins (which
/// only receive evaluated arguments, not an environment) can reach it.
pub fn set_global_env(env: &Arc<Environment>) {
    GLOBAL_ENV.with(|cell| *cell.borrow_mut() = Some(Arc::clone(env)));
}

/// Reads and evaluates every form in `source` against the global
/// environment. The spec's `load` is a thin wrapper over disk I/O, which
/// is out of scope; this loads already-read source text instead of a
/// path.
pub fn load_source(source: &str, env: &Arc<Environment>) -> Result<Value, EvalError> {
    let forms = read_all(source).map_err(|e| EvalError::ReadError(e.to_string()))?;
    let mut result = Value::unspecified();
    for form in forms {
        result = eval(&form, env)?;
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_with_no_args_is_unspecified() {
        assert!(begin(&[]).unwrap().is_unspecified());
    }

    #[test]
    fn begin_returns_last_arg() {
        let result = begin(&[Value::Number(1.0), Value::Number(2.0)]).unwrap();
        assert_eq!(result.to_string(), "2");
    }

    #[test]
    fn error_carries_a_message() {
        let err = error(&[Value::string("bad input")]).unwrap_err();
        assert!(err.to_string().contains("bad input"));
    }
}
