// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Driver for the AES coprocessor
//!
//! GCM on the coprocessor is a four step protocol: the driver programs the control
//! register for a phase, feeds that phase's data, and then blocks on the completion flag
//! before the next phase may start. CTR is a single processing step.

use crate::{
    config::Wait,
    engine::Engine,
    error::{Error, InitError, Result},
    gcm::{self, Direction, Phase, Phased},
    key::{CtrIv, Key, Nonce},
};
use peripheral::{Chaining, Peripheral};
use std::time::Instant;

mod arch;
mod peripheral;

pub use arch::is_accelerated;

const NAME: &str = "hardware";

/// A fault the peripheral model can be told to raise
///
/// `None` targets CTR processing, `Some(phase)` the given GCM phase. Faults fire once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    /// The peripheral doesn't come out of reset
    Reset,
    /// The peripheral raises its error flag
    Error(Option<Phase>),
    /// The peripheral never raises its completion flag
    Stall(Option<Phase>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Uninitialized,
    Ready,
    /// A mechanical failure left the peripheral in an undefined state
    Faulted,
}

pub struct Hardware {
    peripheral: Peripheral,
    wait: Wait,
    state: State,
}

impl Hardware {
    pub fn new(wait: Wait) -> Self {
        Self {
            peripheral: Peripheral::new(),
            wait,
            state: State::Uninitialized,
        }
    }

    #[cfg(any(test, feature = "testing"))]
    pub fn inject_fault(&mut self, fault: Fault) {
        self.peripheral.inject(fault);
    }

    fn ensure_ready(&self) -> Result {
        match self.state {
            State::Ready => Ok(()),
            State::Uninitialized => Err(Error::engine("engine is not initialized")),
            State::Faulted => Err(Error::engine("engine requires re-initialization")),
        }
    }

    /// Polls the status register until the current step completes
    fn wait_for_completion(&mut self) -> Result {
        let start = Instant::now();

        loop {
            if self.peripheral.error_flag() {
                return Err(self.fault(Error::engine("peripheral raised its error flag")));
            }

            if self.peripheral.take_completion() {
                return Ok(());
            }

            if let Wait::Bounded(limit) = self.wait {
                if start.elapsed() >= limit {
                    return Err(self.fault(Error::Timeout { phase: None }));
                }
            }

            core::hint::spin_loop();
        }
    }

    /// Marks the engine as faulted; only [`Engine::init`] recovers it
    fn fault(&mut self, error: Error) -> Error {
        tracing::warn!(%error, "hardware engine faulted");
        self.peripheral.disable();
        self.state = State::Faulted;
        error
    }
}

impl Engine for Hardware {
    fn name(&self) -> &'static str {
        NAME
    }

    fn init(&mut self) -> Result<(), InitError> {
        self.peripheral.enable_clock();

        if !self.peripheral.reset() || !self.peripheral.is_clocked() {
            self.state = State::Uninitialized;
            return Err(InitError {
                engine: NAME,
                reason: "peripheral did not come out of reset",
            });
        }

        self.state = State::Ready;
        tracing::debug!(accelerated = is_accelerated(), "hardware engine initialized");

        Ok(())
    }

    fn ctr(&mut self, key: &Key, iv: &CtrIv, input: &[u8], output: &mut [u8]) -> Result {
        self.ensure_ready()?;

        self.peripheral
            .configure(Chaining::Ctr, Direction::Encrypt, key, *iv.as_bytes());

        let result = self
            .peripheral
            .process_ctr(input, output)
            .and_then(|()| self.wait_for_completion());

        self.peripheral.disable();

        result
    }

    fn gcm(&mut self) -> gcm::Model<'_> {
        gcm::Model::Phased(self)
    }
}

impl Phased for Hardware {
    fn configure(&mut self, key: &Key, nonce: &Nonce, direction: Direction) -> Result {
        self.ensure_ready()?;
        self.peripheral
            .configure(Chaining::Gcm, direction, key, nonce.j0());
        Ok(())
    }

    fn run(&mut self, phase: Phase, input: &[u8], output: &mut [u8]) -> Result {
        self.ensure_ready()?;

        self.peripheral.process_phase(phase, input, output)?;
        self.wait_for_completion().map_err(|error| error.at_phase(phase))?;

        if phase == Phase::Final {
            self.peripheral.disable();
        }

        Ok(())
    }
}
