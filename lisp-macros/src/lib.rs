//! Procedural macros for goscheme-rs builtin functions.
//!
//! Provides the `#[builtin]` attribute macro that generates a
//! `register_<fn>` function binding a `Value::Builtin` (name + arity
//! bounds) into an `Environment`, from a plain
//! `fn(&[Value]) -> Result<Value, EvalError>`.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, ItemFn};

/// Parsed `#[builtin(name = "...", min = N, max = M)]` arguments.
/// `max = -1` (or omitting `max`) means unbounded arity.
struct BuiltinArgs {
    name: String,
    min: usize,
    max: i64,
}

fn parse_builtin_args(attr_stream: TokenStream, fallback_name: &str) -> BuiltinArgs {
    let attr_str = attr_stream.to_string();

    let name = find_quoted(&attr_str, "name").unwrap_or_else(|| fallback_name.to_string());
    let min = find_number(&attr_str, "min").unwrap_or(0) as usize;
    let max = find_number(&attr_str, "max").unwrap_or(-1);

    BuiltinArgs { name, min, max }
}

fn find_quoted(haystack: &str, key: &str) -> Option<String> {
    let needle = format!("{key} = \"");
    let start = haystack.find(&needle)? + needle.len();
    let rest = &haystack[start..];
    let end = rest.find('"')?;
    Some(rest[..end].to_string())
}

fn find_number(haystack: &str, key: &str) -> Option<i64> {
    let needle = format!("{key} = ");
    let start = haystack.find(&needle)? + needle.len();
    let rest = haystack[start..].trim_start();
    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '-'))
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}

/// Attribute macro for defining a Lisp builtin function.
///
/// ```ignore
/// #[builtin(name = "+", min = 0, max = -1)]
/// pub fn add(args: &[Value]) -> Result<Value, EvalError> { ... }
/// ```
///
/// generates `pub fn register_add(env: &Arc<Environment>)` which binds
/// `"+"` to a `Value::Builtin` wrapping `add` with the given arity bounds.
#[proc_macro_attribute]
pub fn builtin(attr: TokenStream, item: TokenStream) -> TokenStream {
    let func = parse_macro_input!(item as ItemFn);
    let fn_name = func.sig.ident.clone();
    let args = parse_builtin_args(attr, &fn_name.to_string());

    let lisp_name = args.name;
    let min_arity = args.min;
    let max_arity = args.max;
    let register_fn_name = quote::format_ident!("register_{}", fn_name);

    let expanded = quote! {
        #func

        #[allow(dead_code)]
        pub fn #register_fn_name(env: &std::sync::Arc<crate::env::Environment>) {
            env.define(
                #lisp_name,
                crate::value::Value::Builtin {
                    name: #lisp_name,
                    min_arity: #min_arity,
                    max_arity: #max_arity,
                    func: #fn_name,
                },
            );
        }
    };

    TokenStream::from(expanded)
}
