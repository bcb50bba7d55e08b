//! Command Error Types
//!
//! Each variant carries the kind raised by the crate that failed, and the
//! crate's own `Exn` frame stays a child in the error tree.

use derive_more::{Display, Error};
use facesort_catalog::error::{Error as CatalogError, ErrorKind as CatalogErrorKind};
use facesort_config::error::{Error as ConfigError, ErrorKind as ConfigErrorKind};
use facesort_interchange::error::{Error as InterchangeError, ErrorKind as InterchangeErrorKind};
use facesort_organize::error::{Error as OrganizeError, ErrorKind as OrganizeErrorKind};

/// A command error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for commands.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("{_0}")]
    Config(ConfigErrorKind),
    #[display("{_0}")]
    Catalog(CatalogErrorKind),
    #[display("{_0}")]
    Interchange(InterchangeErrorKind),
    #[display("{_0}")]
    Organize(OrganizeErrorKind),
}

impl ErrorKind {
    #[track_caller]
    pub fn config(err: ConfigError) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Config(inner))
    }

    #[track_caller]
    pub fn catalog(err: CatalogError) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Catalog(inner))
    }

    #[track_caller]
    pub fn interchange(err: InterchangeError) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Interchange(inner))
    }

    #[track_caller]
    pub fn organize(err: OrganizeError) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Organize(inner))
    }
}
