// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::{error::Error, key::DEFAULT_HEADER};
use core::{fmt, str::FromStr, time::Duration};
use std::env::VarError;

/// Environment variable selecting the backend (`hardware` or `software`)
pub const BACKEND_ENV: &str = "AES_DISPATCH_BACKEND";
/// Environment variable bounding the hardware wait, in milliseconds
pub const WAIT_ENV: &str = "AES_DISPATCH_WAIT_MS";

/// The engine a [`crate::Dispatcher`] is bound to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Backend {
    #[default]
    Hardware,
    Software,
}

impl Backend {
    pub const ALL: [Backend; 2] = [Backend::Hardware, Backend::Software];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hardware => "hardware",
            Self::Software => "software",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hardware" | "hw" => Ok(Self::Hardware),
            "software" | "sw" => Ok(Self::Software),
            _ => Err(Error::invalid_argument(
                "backend must be `hardware` or `software`",
            )),
        }
    }
}

/// How long a caller is willing to block on the engine
///
/// `Indefinite` mirrors the peripheral driver's maximum delay: a stuck engine blocks the
/// caller forever. `Bounded` turns that into [`Error::Timeout`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Wait {
    #[default]
    Indefinite,
    Bounded(Duration),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    backend: Backend,
    header: Vec<u8>,
    wait: Wait,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            header: DEFAULT_HEADER.to_vec(),
            wait: Wait::default(),
        }
    }
}

impl Config {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Reads the configuration from the environment, falling back to defaults for
    /// variables that aren't set
    pub fn from_env() -> Result<Self, Error> {
        let mut builder = Self::builder();

        if let Some(backend) = env_var(BACKEND_ENV)? {
            builder = builder.with_backend(backend.parse()?);
        }

        if let Some(wait) = env_var(WAIT_ENV)? {
            let millis: u64 = wait.trim().parse().map_err(|_| {
                Error::invalid_argument("wait must be a number of milliseconds")
            })?;
            builder = builder.with_wait(Wait::Bounded(Duration::from_millis(millis)));
        }

        Ok(builder.build())
    }

    #[inline]
    pub fn backend(&self) -> Backend {
        self.backend
    }

    #[inline]
    pub fn header(&self) -> &[u8] {
        &self.header
    }

    #[inline]
    pub fn wait(&self) -> Wait {
        self.wait
    }
}

/// Returns `None` if `name` isn't set; a value that isn't unicode is rejected
fn env_var(name: &str) -> Result<Option<String>, Error> {
    match std::env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(Error::invalid_argument(
            "environment variable must be valid unicode",
        )),
    }
}

#[derive(Debug, Default)]
pub struct Builder {
    config: Config,
}

impl Builder {
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.config.backend = backend;
        self
    }

    /// Sets the authentication header used by GCM operations that don't take one
    pub fn with_header(mut self, header: &[u8]) -> Result<Self, Error> {
        if header.is_empty() {
            return Err(Error::invalid_argument("header must not be empty"));
        }
        self.config.header = header.to_vec();
        Ok(self)
    }

    pub fn with_wait(mut self, wait: Wait) -> Self {
        self.config.wait = wait;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
