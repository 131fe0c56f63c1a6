//! Error taxonomy for the Codecks integration.
//!
//! Config and Startup errors are fatal to the process. Every other variant is
//! caught at the tool boundary and rendered as an error-text reply.

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum CodecksError {
    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(codecks::config),
        help(
            "Set CODECKS_SUBDOMAIN and CODECKS_AUTH_TOKEN (or pass --subdomain / --auth-token)."
        )
    )]
    Config { message: String },

    #[error("Startup failed while {step}")]
    #[diagnostic(code(codecks::startup))]
    Startup {
        step: &'static str,
        #[source]
        source: Box<CodecksError>,
    },

    #[error("Transport error: {message}")]
    #[diagnostic(
        code(codecks::transport),
        help("The request could not be completed or the response was not valid JSON.")
    )]
    Transport { message: String },

    #[error("Remote API error (status {status}): {body}")]
    #[diagnostic(code(codecks::remote))]
    Remote { status: u16, body: String },

    #[error("Not found: {message}")]
    #[diagnostic(code(codecks::not_found))]
    NotFound { message: String },

    #[error("Illegal state: {message}")]
    #[diagnostic(code(codecks::illegal_state))]
    IllegalState { message: String },

    #[error("Validation error: {message}")]
    #[diagnostic(code(codecks::validation))]
    Validation { message: String },
}

impl CodecksError {
    pub fn not_found(message: impl Into<String>) -> Self {
        CodecksError::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CodecksError::Validation {
            message: message.into(),
        }
    }

    pub fn illegal_state(message: impl Into<String>) -> Self {
        CodecksError::IllegalState {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        CodecksError::Config {
            message: message.into(),
        }
    }

    pub(crate) fn startup(step: &'static str, source: CodecksError) -> Self {
        CodecksError::Startup {
            step,
            source: Box::new(source),
        }
    }
}

impl From<reqwest::Error> for CodecksError {
    fn from(e: reqwest::Error) -> Self {
        let message = if e.is_timeout() {
            format!("request timed out: {e}")
        } else if e.is_connect() {
            format!("failed to connect: {e}")
        } else {
            e.to_string()
        };
        CodecksError::Transport { message }
    }
}

impl From<serde_json::Error> for CodecksError {
    fn from(e: serde_json::Error) -> Self {
        CodecksError::Transport {
            message: format!("malformed JSON: {e}"),
        }
    }
}

pub type CodecksResult<T> = Result<T, CodecksError>;
