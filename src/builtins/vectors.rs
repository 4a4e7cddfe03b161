// ABOUTME: Vector constructors, accessors and in-place mutators

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use lisp_macros::builtin;
use std::sync::{Arc, Mutex};

fn as_vector<'a>(v: &'a Value, fname: &str, pos: usize) -> Result<&'a Mutex<Vec<Value>>, EvalError> {
    match v {
        Value::Vector(cell) => Ok(cell),
        other => Err(EvalError::type_error(fname, "vector", other, pos)),
    }
}

fn as_index(v: &Value, fname: &str, pos: usize) -> Result<usize, EvalError> {
    match v {
        Value::Number(n) if *n >= 0.0 => Ok(*n as usize),
        other => Err(EvalError::type_error(fname, "non-negative integer", other, pos)),
    }
}

#[builtin(name = "make-vector", min = 1, max = 2)]
pub fn make_vector(args: &[Value]) -> Result<Value, EvalError> {
    let len = as_index(&args[0], "make-vector", 0)?;
    let fill = args.get(1).cloned().unwrap_or(Value::Number(0.0));
    Ok(Value::Vector(Arc::new(Mutex::new(vec![fill; len]))))
}

#[builtin(name = "vector", min = 0, max = -1)]
pub fn vector(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Vector(Arc::new(Mutex::new(args.to_vec()))))
}

#[builtin(name = "vector-length", min = 1, max = 1)]
pub fn vector_length(args: &[Value]) -> Result<Value, EvalError> {
    let cell = as_vector(&args[0], "vector-length", 0)?;
    Ok(Value::Number(cell.lock().unwrap().len() as f64))
}

#[builtin(name = "vector-ref", min = 2, max = 2)]
pub fn vector_ref(args: &[Value]) -> Result<Value, EvalError> {
    let cell = as_vector(&args[0], "vector-ref", 0)?;
    let idx = as_index(&args[1], "vector-ref", 1)?;
    cell.lock()
        .unwrap()
        .get(idx)
        .cloned()
        .ok_or_else(|| EvalError::runtime_error("vector-ref", "index out of range"))
}

/// `vector-set!` mutates in place: every alias of this vector observes
/// the write, per the reference-semantics invariant on vectors.
#[builtin(name = "vector-set!", min = 3, max = 3)]
pub fn vector_set(args: &[Value]) -> Result<Value, EvalError> {
    let cell = as_vector(&args[0], "vector-set!", 0)?;
    let idx = as_index(&args[1], "vector-set!", 1)?;
    let mut guard = cell.lock().unwrap();
    if idx >= guard.len() {
        return Err(EvalError::runtime_error("vector-set!", "index out of range"));
    }
    guard[idx] = args[2].clone();
    Ok(Value::unspecified())
}

#[builtin(name = "vector-fill!", min = 2, max = 2)]
pub fn vector_fill(args: &[Value]) -> Result<Value, EvalError> {
    let cell = as_vector(&args[0], "vector-fill!", 0)?;
    let mut guard = cell.lock().unwrap();
    for slot in guard.iter_mut() {
        *slot = args[1].clone();
    }
    Ok(Value::unspecified())
}

#[builtin(name = "vector->list", min = 1, max = 1)]
pub fn vector_to_list(args: &[Value]) -> Result<Value, EvalError> {
    let cell = as_vector(&args[0], "vector->list", 0)?;
    Ok(Value::from_vec(cell.lock().unwrap().clone()))
}

#[builtin(name = "list->vector", min = 1, max = 1)]
pub fn list_to_vector(args: &[Value]) -> Result<Value, EvalError> {
    let items = args[0]
        .to_vec()
        .ok_or_else(|| EvalError::type_error("list->vector", "proper list", &args[0], 0))?;
    Ok(Value::Vector(Arc::new(Mutex::new(items))))
}

pub fn register(env: &Arc<Environment>) {
    register_make_vector(env);
    register_vector(env);
    register_vector_length(env);
    register_vector_ref(env);
    register_vector_set(env);
    register_vector_fill(env);
    register_vector_to_list(env);
    register_list_to_vector(env);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_set_mutates_every_alias() {
        let v = vector(&[Value::Number(1.0), Value::Number(2.0)]).unwrap();
        let alias = v.clone();
        vector_set(&[v, Value::Number(0.0), Value::Number(9.0)]).unwrap();
        assert_eq!(vector_ref(&[alias, Value::Number(0.0)]).unwrap().to_string(), "9");
    }

    #[test]
    fn vector_ref_out_of_range_errors() {
        let v = vector(&[Value::Number(1.0)]).unwrap();
        assert!(vector_ref(&[v, Value::Number(5.0)]).is_err());
    }

    #[test]
    fn make_vector_fills_with_default() {
        let v = make_vector(&[Value::Number(3.0)]).unwrap();
        assert_eq!(vector_length(&[v]).unwrap().to_string(), "3");
    }
}
