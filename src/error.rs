use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidRange,
    InvalidDomain,
    IndexOutOfRange,
    EmptyScene,
    RenderFailure,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FigureError {
    pub kind: ErrorKind,
    pub message: String,
}

impl FigureError {
    pub fn invalid_range<S: Into<String>>(message: S) -> Self {
        Self {
            kind: ErrorKind::InvalidRange,
            message: message.into(),
        }
    }

    pub fn invalid_domain<S: Into<String>>(message: S) -> Self {
        Self {
            kind: ErrorKind::InvalidDomain,
            message: message.into(),
        }
    }

    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self {
            kind: ErrorKind::IndexOutOfRange,
            message: format!("Trace index {index} out of range (scene has {len} traces)"),
        }
    }

    pub fn empty_scene<S: Into<String>>(message: S) -> Self {
        Self {
            kind: ErrorKind::EmptyScene,
            message: message.into(),
        }
    }

    pub fn render_failure<S: Into<String>>(message: S) -> Self {
        Self {
            kind: ErrorKind::RenderFailure,
            message: message.into(),
        }
    }
}

impl fmt::Display for FigureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for FigureError {}
