use std::io;
use std::path::{Path, PathBuf};

use goimpl_syntax::{Diag, ParseFailure};
use thiserror::Error;

pub type Result<T, E = ImplError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ImplError {
    #[error("{0}")]
    Usage(String),

    #[error("invalid receiver: {receiver:?}: {reason}")]
    InvalidReceiver { receiver: String, reason: String },

    #[error("invalid interface: {iface:?}: {reason}")]
    InvalidInterface { iface: String, reason: String },

    #[error("couldn't find package {path:?}")]
    PackageNotFound { path: String },

    #[error("{}: {message}", path.display())]
    Load {
        path: PathBuf,
        message: String,
        diags: Vec<Diag>,
    },

    #[error("type {name} not found in package {package}")]
    Undeclared { name: String, package: String },

    #[error("{name} is not an interface")]
    NotAnInterface { name: String },

    #[error("interface embedding cycle: {}", chain.join(" -> "))]
    Cycle { chain: Vec<String> },

    #[error("internal error: {0}")]
    Internal(String),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ImplError {
    /// Errors caused by the command line rather than by the source tree.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Self::Usage(_) | Self::InvalidReceiver { .. } | Self::InvalidInterface { .. }
        )
    }

    pub(crate) fn invalid_receiver(receiver: &str, reason: impl Into<String>) -> Self {
        Self::InvalidReceiver {
            receiver: receiver.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_interface(iface: &str, reason: impl Into<String>) -> Self {
        Self::InvalidInterface {
            iface: iface.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn load(path: &Path, message: impl Into<String>) -> Self {
        Self::Load {
            path: path.to_path_buf(),
            message: message.into(),
            diags: Vec::new(),
        }
    }

    /// Load error for a file that failed to parse, positioned at the first
    /// diagnostic.
    pub(crate) fn parse(path: &Path, src: &str, failure: ParseFailure) -> Self {
        let message = match (failure.first_position(src), failure.diags.first()) {
            (Some((line, col)), Some(d)) => format!("{line}:{col}: {}", d.message),
            _ => failure.to_string(),
        };
        Self::Load {
            path: path.to_path_buf(),
            message,
            diags: failure.diags,
        }
    }
}
