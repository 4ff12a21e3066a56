// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::gcm::Phase;
use core::fmt;

pub type Result<T = (), E = Error> = core::result::Result<T, E>;

/// Error returned by a cipher operation
///
/// Authentication failures are reported separately from mechanical ones so callers
/// never mistake unauthenticated plaintext for a transient engine problem.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// An argument was rejected before any engine was invoked
    InvalidArgument { reason: &'static str },
    /// The engine reported a failure
    ///
    /// `phase` is set when the failure happened during a GCM phase. The engine state is
    /// undefined afterwards and the engine must be re-initialized before it is used again.
    Engine {
        phase: Option<Phase>,
        reason: &'static str,
    },
    /// The engine did not complete within the configured bounded wait
    Timeout { phase: Option<Phase> },
    /// The recomputed tag did not match the supplied one
    Authentication,
}

impl Error {
    pub const fn invalid_argument(reason: &'static str) -> Self {
        Self::InvalidArgument { reason }
    }

    pub const fn engine(reason: &'static str) -> Self {
        Self::Engine {
            phase: None,
            reason,
        }
    }

    /// Attributes the error to the given GCM phase, if it isn't attributed already
    #[must_use]
    pub fn at_phase(self, phase: Phase) -> Self {
        match self {
            Self::Engine { phase: None, reason } => Self::Engine {
                phase: Some(phase),
                reason,
            },
            Self::Timeout { phase: None } => Self::Timeout { phase: Some(phase) },
            other => other,
        }
    }

    #[inline]
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidArgument { reason } => write!(f, "invalid argument: {reason}"),
            Self::Engine {
                phase: Some(phase),
                reason,
            } => write!(f, "engine failure during {phase} phase: {reason}"),
            Self::Engine {
                phase: None,
                reason,
            } => write!(f, "engine failure: {reason}"),
            Self::Timeout { phase: Some(phase) } => {
                write!(f, "engine timed out during {phase} phase")
            }
            Self::Timeout { phase: None } => "engine timed out".fmt(f),
            Self::Authentication => "authentication failed".fmt(f),
        }
    }
}

impl std::error::Error for Error {}

/// Error returned when an engine cannot be brought up
///
/// This is a boot-time invariant violation: an engine that fails to initialize must not
/// be used.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InitError {
    pub engine: &'static str,
    pub reason: &'static str,
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} engine failed to initialize: {}", self.engine, self.reason)
    }
}

impl std::error::Error for InitError {}
