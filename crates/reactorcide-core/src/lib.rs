//! # Reactorcide Core
//!
//! Domain logic for the Reactorcide continuous-integration coordinator: webhook
//! normalization, eval-job synthesis, CI-source allowlisting, and the
//! per-tenant encrypted secret store.
//!
//! ## Architecture
//!
//! The core follows the same shape as the rest of the workspace: business
//! logic depends only on trait abstractions (`ProjectRegistry`, `JobStore`,
//! `DispatcherClient`, `ObjectStore`); infrastructure implementations are
//! injected at runtime by the service crate.
//!
//! ## Usage
//!
//! ```rust
//! use reactorcide_core::{JobId, ProjectId};
//!
//! let job_id = JobId::new();
//! let project_id = ProjectId::new();
//! assert_ne!(job_id.to_string(), project_id.to_string());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Standard result type for reactorcide-core operations.
pub type CoreResult<T> = Result<T, CoreError>;

// ============================================================================
// Shared identifier and timestamp types
// ============================================================================

macro_rules! opaque_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|_| ParseError::InvalidFormat {
                        expected: "UUID".to_string(),
                        actual: s.to_string(),
                    })
            }
        }
    };
}

opaque_id!(JobId);
opaque_id!(ProjectId);

/// Timestamp wrapper ensuring all stored instants are UTC and RFC3339-round-trippable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }

    /// Duration between `self` and `other`, as whole seconds, when both are present.
    pub fn seconds_since(&self, other: &Timestamp) -> i64 {
        (self.0 - other.0).num_seconds()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_rfc3339())
    }
}

// ============================================================================
// Error types
// ============================================================================

/// Parse failures for newtype identifiers and wire formats.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid format: expected {expected}, got '{actual}'")]
    InvalidFormat { expected: String, actual: String },
}

/// The error kinds surfaced across the core, mirrored 1:1 onto HTTP status
/// codes by the service crate (see `reactorcide_service::errors`).
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("cannot decommission the primary master key")]
    CannotDecommissionPrimary,

    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// A short, stable machine-readable kind string for the `{"error": "<kind>"}` envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::AlreadyExists(_) => "already_exists",
            Self::Forbidden(_) => "forbidden",
            Self::Unauthorized(_) => "unauthorized",
            Self::ServiceUnavailable(_) => "service_unavailable",
            Self::PreconditionFailed(_) => "precondition_failed",
            Self::InvalidSignature => "invalid_signature",
            Self::InvalidPath(_) => "invalid_path",
            Self::InvalidKey(_) => "invalid_key",
            Self::CannotDecommissionPrimary => "cannot_decommission_primary",
            Self::Internal(_) => "internal",
        }
    }
}

// ============================================================================
// Module declarations
// ============================================================================

/// URL canonicalization for clone-URL matching across provider forms.
pub mod url_canon;

/// Generic event taxonomy and provider-event classification.
pub mod event_classifier;

/// Normalized, provider-agnostic webhook event shape.
pub mod event;

/// Project configuration data model and registry contract.
pub mod project;

/// Job data model.
pub mod job;

/// Deterministic eval-job synthesis from a project and a normalized event.
pub mod job_builder;

/// CI-source allowlist enforcement.
pub mod allowlist;

/// Job persistence contract.
pub mod job_store;

/// External task-queue dispatcher contract.
pub mod dispatcher;

/// Runner log object-store contract.
pub mod object_store;

/// Typed job `notes` metadata blob.
pub mod notes;

/// Envelope-encrypted per-tenant secret store.
pub mod secrets;

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
