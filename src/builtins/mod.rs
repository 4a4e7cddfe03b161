//! # Built-in Functions Module
//!
//! Core built-in procedures for the interpreter, organized by category.
//! Each sub-module owns a `register(env: &Arc<Environment>)` function that
//! binds its procedures into the given environment.
//!
//! - [arithmetic]: `+ - * / modulo abs sqrt sin cos tan min max`
//! - [comparison]: `= < > <= >=`
//! - [types]: type predicates and the equivalence family (`eq? eqv? equal?`)
//! - [lists]: `cons car cdr list length append reverse list-ref`
//! - [chars_strings]: string/character conversions and operations
//! - [vectors]: vector constructors, accessors, in-place mutation
//! - [ports]: the minimal stdio port model
//! - [concurrency]: channel operations (`go` itself is an evaluator special form)
//! - [control]: `begin eval apply error`
//! - [console]: `display newline`

use crate::env::Environment;
use std::sync::Arc;

pub mod arithmetic;
pub mod chars_strings;
pub mod comparison;
pub mod concurrency;
pub mod console;
pub mod control;
pub mod lists;
pub mod ports;
pub mod types;
pub mod vectors;

/// Registers every builtin procedure into `env`, which is expected to be
/// the top-level environment a program runs against.
pub fn register_builtins(env: &Arc<Environment>) {
    arithmetic::register(env);
    comparison::register(env);
    types::register(env);
    lists::register(env);
    chars_strings::register(env);
    vectors::register(env);
    ports::register(env);
    concurrency::register(env);
    control::register(env);
    console::register(env);
    control::set_global_env(env);
}
