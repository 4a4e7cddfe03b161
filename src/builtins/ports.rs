// ABOUTME: Minimal port model wrapping stdio; file ports are out of scope

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::{Port, PortKind, Value};
use lisp_macros::builtin;
use std::io::Write;
use std::sync::{Arc, Mutex};

#[builtin(name = "current-output-port", min = 0, max = 0)]
pub fn current_output_port(_args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Port(Port {
        kind: Arc::new(Mutex::new(PortKind::Stdout)),
    }))
}

#[builtin(name = "current-error-port", min = 0, max = 0)]
pub fn current_error_port(_args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Port(Port {
        kind: Arc::new(Mutex::new(PortKind::Stderr)),
    }))
}

#[builtin(name = "port?", min = 1, max = 1)]
pub fn port_p(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(&args[0], Value::Port(_))))
}

#[builtin(name = "input-port?", min = 1, max = 1)]
pub fn input_port_p(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(
        &args[0],
        Value::Port(p) if matches!(&*p.kind.lock().unwrap(), PortKind::Stdin)
    )))
}

#[builtin(name = "output-port?", min = 1, max = 1)]
pub fn output_port_p(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(
        &args[0],
        Value::Port(p) if matches!(&*p.kind.lock().unwrap(), PortKind::Stdout | PortKind::Stderr)
    )))
}

#[builtin(name = "current-input-port", min = 0, max = 0)]
pub fn current_input_port(_args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Port(Port {
        kind: Arc::new(Mutex::new(PortKind::Stdin)),
    }))
}

#[builtin(name = "write-string", min = 1, max = 2)]
pub fn write_string(args: &[Value]) -> Result<Value, EvalError> {
    let text = match &args[0] {
        Value::String(s) => s.lock().unwrap().clone(),
        other => other.to_string(),
    };
    let to_stderr = match args.get(1) {
        Some(Value::Port(p)) => matches!(&*p.kind.lock().unwrap(), PortKind::Stderr),
        _ => false,
    };
    if to_stderr {
        eprint!("{text}");
        let _ = std::io::stderr().flush();
    } else {
        print!("{text}");
        let _ = std::io::stdout().flush();
    }
    Ok(Value::unspecified())
}

/// Writes a value in `read`-able form (strings/characters quoted), unlike
/// `display`.
#[builtin(name = "write", min = 1, max = 2)]
pub fn write(args: &[Value]) -> Result<Value, EvalError> {
    let to_stderr = match args.get(1) {
        Some(Value::Port(p)) => matches!(&*p.kind.lock().unwrap(), PortKind::Stderr),
        _ => false,
    };
    let text = match &args[0] {
        Value::String(s) => format!("\"{}\"", s.lock().unwrap()),
        Value::Character(c) => format!("#\\{c}"),
        other => other.to_string(),
    };
    if to_stderr {
        eprint!("{text}");
    } else {
        print!("{text}");
    }
    let _ = std::io::stdout().flush();
    Ok(Value::unspecified())
}

#[builtin(name = "write-char", min = 1, max = 2)]
pub fn write_char(args: &[Value]) -> Result<Value, EvalError> {
    let c = match &args[0] {
        Value::Character(c) => *c,
        other => return Err(EvalError::type_error("write-char", "character", other, 0)),
    };
    print!("{c}");
    let _ = std::io::stdout().flush();
    Ok(Value::unspecified())
}

#[builtin(name = "flush", min = 0, max = 1)]
pub fn flush(_args: &[Value]) -> Result<Value, EvalError> {
    let _ = std::io::stdout().flush();
    Ok(Value::unspecified())
}

/// Reads a single character from stdin, returning `#f` at end of input.
#[builtin(name = "read-char", min = 0, max = 1)]
pub fn read_char(_args: &[Value]) -> Result<Value, EvalError> {
    use std::io::Read as _;
    let mut buf = [0u8; 1];
    match std::io::stdin().read(&mut buf) {
        Ok(0) => Ok(Value::Bool(false)),
        Ok(_) => Ok(Value::Character(buf[0] as char)),
        Err(e) => Err(EvalError::ReadError(e.to_string())),
    }
}

pub fn register(env: &Arc<Environment>) {
    register_current_output_port(env);
    register_current_error_port(env);
    register_current_input_port(env);
    register_port_p(env);
    register_input_port_p(env);
    register_output_port_p(env);
    register_write_string(env);
    register_write(env);
    register_write_char(env);
    register_flush(env);
    register_read_char(env);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_output_port_is_a_port() {
        let p = current_output_port(&[]).unwrap();
        assert!(matches!(p, Value::Port(_)));
        assert_eq!(port_p(&[p]).unwrap().to_string(), "#t");
    }
}
