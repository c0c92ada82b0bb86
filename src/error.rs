//! Centralised error hierarchy for the **Lox interpreter**.
//!
//! All subsystems (scanner, parser, resolver, runtime, CLI) must convert their
//! internal failure modes into one of the variants defined here.  This enables a
//! uniform `Result<T>` alias throughout the crate and ergonomic inter‑operation
//! with `anyhow`, while still preserving rich diagnostic detail.
//!
//! Parser and resolver diagnostics carry a `location` segment (" at 'lexeme'"
//! or " at end") derived from the offending token, so the rendered form is
//! `[line N] Error at 'x': message`.  Runtime faults record the offending
//! token's lexeme and render as `message` followed by `[line N]` on the
//! next line.
//!
//! The module **does not** print diagnostics itself

use std::io;
use thiserror::Error;

use log::info;

use crate::token::{Token, TokenType};

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error, pinned to the offending token.
    #[error("[line {line}] Error{location}: {message}")]
    Parse {
        message: String,
        location: String,
        line: usize,
    },

    /// Static‑analysis or resolution failure (e.g. early‑binding errors).
    #[error("[line {line}] Error{location}: {message}")]
    Resolve {
        message: String,
        location: String,
        line: usize,
    },

    /// Runtime evaluation error, pinned to the offending token.  The lexeme
    /// is part of the record only; rendering stays message + line.
    #[error("{message}\n[line {line}]")]
    Runtime {
        message: String,
        lexeme: String,
        line: usize,
    },

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF‑8 decoding failure when ingesting external text.
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl LoxError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        LoxError::Lex { message, line }
    }

    /// Helper constructor for the **parser**.  The location segment is
    /// derived from the token: " at end" for `EOF`, " at 'lexeme'" otherwise.
    pub fn parse<S: Into<String>>(token: &Token<'_>, msg: S) -> Self {
        let message: String = msg.into();
        let location: String = locate(token);

        info!(
            "Creating Parse error: line={}, loc={}, msg={}",
            token.line, location, message
        );

        LoxError::Parse {
            message,
            location,
            line: token.line,
        }
    }

    /// Helper constructor for the **resolver**.
    pub fn resolve<S: Into<String>>(token: &Token<'_>, msg: S) -> Self {
        let message: String = msg.into();
        let location: String = locate(token);

        info!(
            "Creating Resolve error: line={}, loc={}, msg={}",
            token.line, location, message
        );

        LoxError::Resolve {
            message,
            location,
            line: token.line,
        }
    }

    /// Helper constructor for **runtime** faults, pinned to the offending
    /// token.
    pub fn runtime<S: Into<String>>(token: &Token<'_>, msg: S) -> Self {
        let message: String = msg.into();

        info!(
            "Creating Runtime error: line={}, lexeme={}, msg={}",
            token.line, token.lexeme, message
        );

        LoxError::Runtime {
            message,
            lexeme: token.lexeme.to_string(),
            line: token.line,
        }
    }
}

/// Render the diagnostic location segment for `token`.
fn locate(token: &Token<'_>) -> String {
    if token.token_type == TokenType::EOF {
        String::from(" at end")
    } else {
        format!(" at '{}'", token.lexeme)
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, LoxError>;
