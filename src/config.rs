// ABOUTME: Version and REPL welcome-banner constants

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const WELCOME_MESSAGE: &str = "goscheme-rs";
pub const WELCOME_SUBTITLE: &str = "A Scheme-flavored Lisp with syntax-rules macros and Go-style concurrency";
pub const PROMPT: &str = ">> ";
