// ABOUTME: Numeric relational operators: =, <, >, <=, >=

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use lisp_macros::builtin;
use std::sync::Arc;

fn numbers(args: &[Value], fname: &str) -> Result<Vec<f64>, EvalError> {
    args.iter()
        .enumerate()
        .map(|(i, v)| match v {
            Value::Number(n) => Ok(*n),
            other => Err(EvalError::type_error(fname, "number", other, i)),
        })
        .collect()
}

fn pairwise(args: &[Value], fname: &str, op: impl Fn(f64, f64) -> bool) -> Result<Value, EvalError> {
    let ns = numbers(args, fname)?;
    Ok(Value::Bool(ns.windows(2).all(|w| op(w[0], w[1]))))
}

#[builtin(name = "=", min = 1, max = -1)]
pub fn num_eq(args: &[Value]) -> Result<Value, EvalError> {
    pairwise(args, "=", |a, b| a == b)
}

#[builtin(name = "<", min = 1, max = -1)]
pub fn lt(args: &[Value]) -> Result<Value, EvalError> {
    pairwise(args, "<", |a, b| a < b)
}

#[builtin(name = ">", min = 1, max = -1)]
pub fn gt(args: &[Value]) -> Result<Value, EvalError> {
    pairwise(args, ">", |a, b| a > b)
}

#[builtin(name = "<=", min = 1, max = -1)]
pub fn le(args: &[Value]) -> Result<Value, EvalError> {
    pairwise(args, "<=", |a, b| a <= b)
}

#[builtin(name = ">=", min = 1, max = -1)]
pub fn ge(args: &[Value]) -> Result<Value, EvalError> {
    pairwise(args, ">=", |a, b| a >= b)
}

pub fn register(env: &Arc<Environment>) {
    register_num_eq(env);
    register_lt(env);
    register_gt(env);
    register_le(env);
    register_ge(env);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chained_less_than() {
        let result = lt(&[Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)]).unwrap();
        assert_eq!(result.to_string(), "#t");
        let result = lt(&[Value::Number(1.0), Value::Number(3.0), Value::Number(2.0)]).unwrap();
        assert_eq!(result.to_string(), "#f");
    }

    #[test]
    fn equality_on_single_arg_is_true() {
        assert_eq!(num_eq(&[Value::Number(5.0)]).unwrap().to_string(), "#t");
    }
}
