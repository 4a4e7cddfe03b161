// ABOUTME: User-facing channel operations; `go` itself is an evaluator special form

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::{Channel, Value};
use lisp_macros::builtin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn as_channel<'a>(v: &'a Value, fname: &str, pos: usize) -> Result<&'a Channel, EvalError> {
    match v {
        Value::Channel(c) => Ok(c),
        other => Err(EvalError::type_error(fname, "channel", other, pos)),
    }
}

/// `(chan)`: a fresh multi-message rendezvous channel (0 capacity, so a
/// send blocks until a matching receive and vice versa).
#[builtin(name = "chan", min = 0, max = 0)]
pub fn chan(_args: &[Value]) -> Result<Value, EvalError> {
    let (sender, receiver) = crossbeam_channel::bounded(0);
    Ok(Value::Channel(Channel {
        sender,
        receiver,
        closed: Arc::new(Mutex::new(false)),
    }))
}

/// `(-> ch)`: blocking receive. Returns `#f` once the channel is closed
/// and drained, per the closed-channel receive contract.
#[builtin(name = "->", min = 1, max = 1)]
pub fn recv(args: &[Value]) -> Result<Value, EvalError> {
    let channel = as_channel(&args[0], "->", 0)?;
    if *channel.closed.lock().unwrap() {
        return Ok(channel.receiver.try_recv().unwrap_or(Value::Bool(false)));
    }
    Ok(channel.receiver.recv().unwrap_or(Value::Bool(false)))
}

/// `(<- ch value)`: blocking send. Errors if the channel has been closed.
#[builtin(name = "<-", min = 2, max = 2)]
pub fn send(args: &[Value]) -> Result<Value, EvalError> {
    let channel = as_channel(&args[0], "<-", 0)?;
    if *channel.closed.lock().unwrap() {
        return Err(EvalError::SendOnClosedChannel);
    }
    channel
        .sender
        .send(args[1].clone())
        .map_err(|_| EvalError::SendOnClosedChannel)?;
    Ok(Value::unspecified())
}

#[builtin(name = "close", min = 1, max = 1)]
pub fn close(args: &[Value]) -> Result<Value, EvalError> {
    let channel = as_channel(&args[0], "close", 0)?;
    *channel.closed.lock().unwrap() = true;
    Ok(Value::unspecified())
}

/// `(sleep seconds)`: blocks the calling OS thread only, leaving other
/// `go` tasks free to run.
#[builtin(name = "sleep", min = 1, max = 1)]
pub fn sleep(args: &[Value]) -> Result<Value, EvalError> {
    let seconds = match &args[0] {
        Value::Number(n) => *n,
        other => return Err(EvalError::type_error("sleep", "number", other, 0)),
    };
    std::thread::sleep(Duration::from_secs_f64(seconds.max(0.0)));
    Ok(Value::unspecified())
}

pub fn register(env: &Arc<Environment>) {
    register_chan(env);
    register_recv(env);
    register_send(env);
    register_close(env);
    register_sleep(env);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn send_and_receive_rendezvous() {
        let ch = chan(&[]).unwrap();
        let sender_ch = ch.clone();
        let handle = thread::spawn(move || {
            send(&[sender_ch, Value::Number(42.0)]).unwrap();
        });
        let received = recv(&[ch]).unwrap();
        handle.join().unwrap();
        assert_eq!(received.to_string(), "42");
    }

    #[test]
    fn send_after_close_errors() {
        let ch = chan(&[]).unwrap();
        close(&[ch.clone()]).unwrap();
        assert!(matches!(
            send(&[ch, Value::Number(1.0)]),
            Err(EvalError::SendOnClosedChannel)
        ));
    }

    #[test]
    fn receive_after_close_returns_sentinel() {
        let ch = chan(&[]).unwrap();
        close(&[ch.clone()]).unwrap();
        assert_eq!(recv(&[ch]).unwrap().to_string(), "#f");
    }
}
