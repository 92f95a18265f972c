//! Error taxonomy for the classifier-training pipeline.
//!
//! Each subsystem gets a paired `XxxErrorCode` (stable, `Copy`, matchable by
//! callers that only care about the failure category) and `XxxError`
//! (carries the data needed for a useful message). [`ClassifierError`]
//! aggregates every subsystem error so CLI and driver code can handle one
//! type.

use thiserror::Error;

/// Stable identifier for a [`ConfigError`] variant.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorCode {
    /// A fractional tuning parameter fell outside `[0, 1]`.
    FractionOutOfRange,
    /// `confidence` fell outside `(0, 1]`.
    ConfidenceOutOfRange,
}

impl ConfigErrorCode {
    /// Returns the machine-readable code string.
    #[rustfmt::skip]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FractionOutOfRange => "fraction_out_of_range",
            Self::ConfidenceOutOfRange => "confidence_out_of_range",
        }
    }
}

impl std::fmt::Display for ConfigErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while validating [`crate::config::ClusterConfigBuilder`].
#[derive(Debug, Clone, Copy, Error)]
pub enum ConfigError {
    /// `min_samples`, `max_illegal`, or `independence` was outside `[0, 1]`.
    #[error("`{field}` must be within [0, 1], got {got}")]
    FractionOutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// Supplied value.
        got: f32,
    },
    /// `confidence` (alpha) was outside `(0, 1e-200]..=1.0`.
    #[error("`confidence` must be within (0, 1], got {got}")]
    ConfidenceOutOfRange {
        /// Supplied value.
        got: f64,
    },
}

impl ConfigError {
    /// Returns the stable error code for this variant.
    #[rustfmt::skip]
    #[must_use]
    pub const fn code(&self) -> ConfigErrorCode {
        match self {
            Self::FractionOutOfRange { .. } => ConfigErrorCode::FractionOutOfRange,
            Self::ConfidenceOutOfRange { .. } => ConfigErrorCode::ConfidenceOutOfRange,
        }
    }
}

/// Stable identifier for a [`KdTreeError`] variant.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KdTreeErrorCode {
    /// Attempted to delete a key/data pair not present in the tree.
    KeyNotFound,
}

impl KdTreeErrorCode {
    /// Returns the machine-readable code string.
    #[rustfmt::skip]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::KeyNotFound => "key_not_found",
        }
    }
}

impl std::fmt::Display for KdTreeErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by [`crate::kdtree::KdIndex`].
#[derive(Debug, Clone, Copy, Error)]
pub enum KdTreeError {
    /// [`crate::kdtree::KdIndex::delete`] found no node matching the
    /// supplied key and data identity.
    #[error("no node with slot {slot} matched the supplied key for deletion")]
    KeyNotFound {
        /// Arena slot that was requested for deletion.
        slot: usize,
    },
}

impl KdTreeError {
    /// Returns the stable error code for this variant.
    #[rustfmt::skip]
    #[must_use]
    pub const fn code(&self) -> KdTreeErrorCode {
        match self {
            Self::KeyNotFound { .. } => KdTreeErrorCode::KeyNotFound,
        }
    }
}

/// Stable identifier for an [`IoError`] variant.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoErrorCode {
    /// A record could not be parsed as the expected field count/type.
    MalformedRecord,
    /// A distribution tag token was not one of `n`/`u`/`r`.
    UnknownDistribution,
    /// A prototype style token was not one of `s`/`e`/`m`/`a`.
    UnknownStyle,
    /// The underlying reader/writer failed.
    Transport,
}

impl IoErrorCode {
    /// Returns the machine-readable code string.
    #[rustfmt::skip]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MalformedRecord => "malformed_record",
            Self::UnknownDistribution => "unknown_distribution",
            Self::UnknownStyle => "unknown_style",
            Self::Transport => "transport",
        }
    }
}

impl std::fmt::Display for IoErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while reading or writing the ParamDesc, normproto, or
/// Microfeat file formats (see `SPEC_FULL.md` §6.1).
#[derive(Debug, Error)]
pub enum IoError {
    /// A record did not contain the expected number or shape of fields.
    #[error("malformed `{what}` record: {detail}")]
    MalformedRecord {
        /// What was being parsed (e.g. `"ParamDesc"`, `"prototype mean"`).
        what: &'static str,
        /// Human-readable detail.
        detail: String,
    },
    /// A distribution tag token did not match `n`/`u`/`r`.
    #[error("unknown distribution tag `{token}`")]
    UnknownDistribution {
        /// Raw token read from the file.
        token: String,
    },
    /// A prototype style token did not match `s`/`e`/`m`/`a`.
    #[error("unknown prototype style `{token}`")]
    UnknownStyle {
        /// Raw token read from the file.
        token: String,
    },
    /// The underlying reader or writer failed.
    #[error("I/O transport failure: {source}")]
    Transport {
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl IoError {
    /// Returns the stable error code for this variant.
    #[rustfmt::skip]
    #[must_use]
    pub const fn code(&self) -> IoErrorCode {
        match self {
            Self::MalformedRecord { .. } => IoErrorCode::MalformedRecord,
            Self::UnknownDistribution { .. } => IoErrorCode::UnknownDistribution,
            Self::UnknownStyle { .. } => IoErrorCode::UnknownStyle,
            Self::Transport { .. } => IoErrorCode::Transport,
        }
    }
}

impl From<std::io::Error> for IoError {
    fn from(source: std::io::Error) -> Self {
        Self::Transport { source }
    }
}

/// Stable identifier for a [`MergeError`] variant.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeErrorCode {
    /// The class library already holds `MAX_NUM_PROTOS` prototypes.
    LibraryFull,
}

impl MergeErrorCode {
    /// Returns the machine-readable code string.
    #[rustfmt::skip]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LibraryFull => "library_full",
        }
    }
}

impl std::fmt::Display for MergeErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by [`crate::merge::ProtoMerger`].
#[derive(Debug, Clone, Copy, Error)]
pub enum MergeError {
    /// Appending a new prototype would exceed `MAX_NUM_PROTOS` for the class.
    #[error("class library already holds the maximum of {max} prototypes")]
    LibraryFull {
        /// Configured maximum.
        max: usize,
    },
}

impl MergeError {
    /// Returns the stable error code for this variant.
    #[rustfmt::skip]
    #[must_use]
    pub const fn code(&self) -> MergeErrorCode {
        match self {
            Self::LibraryFull { .. } => MergeErrorCode::LibraryFull,
        }
    }
}

/// Top-level error returned by pipeline entry points.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// A configuration value failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The k-d tree reported an error.
    #[error(transparent)]
    KdTree(#[from] KdTreeError),
    /// A file-format reader or writer failed.
    #[error(transparent)]
    Io(#[from] IoError),
    /// The prototype merger reported an error.
    #[error(transparent)]
    Merge(#[from] MergeError),
}

/// Convenience alias for `Result<T, ClassifierError>`.
pub type Result<T> = core::result::Result<T, ClassifierError>;
