// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Register-level model of the AES coprocessor
//!
//! The peripheral is programmed through its control register (chaining mode, direction,
//! GCM phase), its key registers and its IV registers, and reports progress through the
//! computation-complete and error flags of its status register. The driver in
//! [`super::Hardware`] is responsible for polling those flags.

use super::Fault;
use crate::{
    error::{Error, Result},
    gcm::{Direction, Phase},
    key::{Key, BLOCK_LEN, TAG_LEN},
};
use aes::{
    cipher::{BlockEncrypt, KeyInit},
    Aes128, Block,
};
use ghash::{universal_hash::UniversalHash, GHash};
use zeroize::Zeroize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Chaining {
    #[default]
    Ctr,
    Gcm,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Control {
    enabled: bool,
    chaining: Chaining,
    direction: Direction,
    phase: Option<Phase>,
}

impl Default for Control {
    fn default() -> Self {
        Self {
            enabled: false,
            chaining: Chaining::default(),
            direction: Direction::Encrypt,
            phase: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Status {
    /// Computation complete
    ccf: bool,
    err: bool,
}

/// Authentication state accumulated across the GCM phases
struct GcmState {
    ghash: GHash,
    /// `E(K, J0)`, applied to the hash in the FINAL phase
    ek0: Block,
    header_len: u64,
    payload_len: u64,
    /// Set once a chunk that isn't block aligned has been fed in the current phase
    unaligned: bool,
}

pub struct Peripheral {
    clock: bool,
    cr: Control,
    key: Option<Aes128>,
    ivr: [u8; BLOCK_LEN],
    gcm: Option<GcmState>,
    sr: Status,
    fault: Option<Fault>,
}

impl Peripheral {
    pub fn new() -> Self {
        Self {
            clock: false,
            cr: Control::default(),
            key: None,
            ivr: [0; BLOCK_LEN],
            gcm: None,
            sr: Status::default(),
            fault: None,
        }
    }

    pub fn enable_clock(&mut self) {
        self.clock = true;
    }

    #[inline]
    pub fn is_clocked(&self) -> bool {
        self.clock
    }

    /// Pulses the reset line and returns `true` once the peripheral is out of reset
    pub fn reset(&mut self) -> bool {
        self.disable();

        if matches!(self.fault, Some(Fault::Reset)) {
            self.fault = None;
            return false;
        }

        true
    }

    #[cfg(any(test, feature = "testing"))]
    pub fn inject(&mut self, fault: Fault) {
        self.fault = Some(fault);
    }

    /// Programs the control, key and IV registers and enables the peripheral
    pub fn configure(
        &mut self,
        chaining: Chaining,
        direction: Direction,
        key: &Key,
        iv: [u8; BLOCK_LEN],
    ) {
        self.disable();

        self.cr = Control {
            enabled: true,
            chaining,
            direction,
            phase: None,
        };
        self.key = Some(Aes128::new(&(*key.as_bytes()).into()));
        self.ivr = iv;
    }

    /// Clears the enable bit and wipes every data register
    pub fn disable(&mut self) {
        self.cr = Control::default();
        self.key = None;
        self.ivr.zeroize();
        self.gcm = None;
        self.sr = Status::default();
    }

    /// Returns and clears the computation-complete flag
    #[inline]
    pub fn take_completion(&mut self) -> bool {
        core::mem::take(&mut self.sr.ccf)
    }

    #[inline]
    pub fn error_flag(&self) -> bool {
        self.sr.err
    }

    /// Runs the CTR keystream over `input`, advancing the 128-bit counter per block
    pub fn process_ctr(&mut self, input: &[u8], output: &mut [u8]) -> Result {
        if !self.clock || !self.cr.enabled || self.cr.chaining != Chaining::Ctr {
            return Err(Error::engine("peripheral not configured for CTR"));
        }

        if input.len() != output.len() {
            return Err(Error::invalid_argument("output must match the input length"));
        }

        if self.trip(None) {
            return Ok(());
        }

        let aes = self.key.as_ref().ok_or(Error::engine("key registers are empty"))?;

        for (input, output) in input.chunks(BLOCK_LEN).zip(output.chunks_mut(BLOCK_LEN)) {
            let keystream = keystream(aes, &self.ivr);
            xor(output, input, &keystream);

            let counter = u128::from_be_bytes(self.ivr).wrapping_add(1);
            self.ivr = counter.to_be_bytes();
        }

        self.sr.ccf = true;
        Ok(())
    }

    /// Runs a single GCM phase
    ///
    /// Phases are accepted strictly in order: INIT after configuration, HEADER after INIT
    /// or HEADER, PAYLOAD after HEADER or PAYLOAD, and FINAL after PAYLOAD. Anything else
    /// discards the session.
    pub fn process_phase(&mut self, phase: Phase, input: &[u8], output: &mut [u8]) -> Result {
        if !self.clock || !self.cr.enabled || self.cr.chaining != Chaining::Gcm {
            self.disable();
            return Err(Error::engine("peripheral not configured for GCM"));
        }

        let in_order = matches!(
            (self.cr.phase, phase),
            (None, Phase::Init)
                | (Some(Phase::Init), Phase::Header)
                | (Some(Phase::Header), Phase::Header)
                | (Some(Phase::Header), Phase::Payload)
                | (Some(Phase::Payload), Phase::Payload)
                | (Some(Phase::Payload), Phase::Final)
        );

        if !in_order {
            self.disable();
            return Err(Error::engine("phase out of order"));
        }

        if let Err(error) = check_shape(phase, input, output) {
            self.disable();
            return Err(error);
        }

        let repeated = self.cr.phase == Some(phase);
        self.cr.phase = Some(phase);

        if self.trip(Some(phase)) {
            return Ok(());
        }

        let result = match phase {
            Phase::Init => self.gcm_init(),
            Phase::Header => self.gcm_header(input, repeated),
            Phase::Payload => self.gcm_payload(input, output, repeated),
            Phase::Final => self.gcm_final(output),
        };

        if let Err(error) = result {
            self.disable();
            return Err(error);
        }

        self.sr.ccf = true;
        Ok(())
    }

    fn gcm_init(&mut self) -> Result {
        let aes = self.key.as_ref().ok_or(Error::engine("key registers are empty"))?;

        // the hash subkey is the encryption of the all-zero block
        let h = keystream(aes, &[0; BLOCK_LEN]);
        // the IV registers hold J0 after configuration
        let ek0 = keystream(aes, &self.ivr);

        self.gcm = Some(GcmState {
            ghash: <GHash as ghash::universal_hash::KeyInit>::new(&h),
            ek0,
            header_len: 0,
            payload_len: 0,
            unaligned: false,
        });

        Ok(())
    }

    fn gcm_header(&mut self, input: &[u8], repeated: bool) -> Result {
        let state = self.gcm.as_mut().ok_or(Error::engine("no GCM session"))?;

        if repeated && state.unaligned {
            return Err(Error::engine("only the last header chunk may be unaligned"));
        }

        state.ghash.update_padded(input);
        state.header_len += input.len() as u64;
        state.unaligned = input.len() % BLOCK_LEN != 0;

        Ok(())
    }

    fn gcm_payload(&mut self, input: &[u8], output: &mut [u8], repeated: bool) -> Result {
        let aes = self.key.as_ref().ok_or(Error::engine("key registers are empty"))?;
        let state = self.gcm.as_mut().ok_or(Error::engine("no GCM session"))?;

        if !repeated {
            // the header is padded out to a block boundary when the payload starts
            state.unaligned = false;
        } else if state.unaligned {
            return Err(Error::engine("only the last payload chunk may be unaligned"));
        }

        for (input, output) in input.chunks(BLOCK_LEN).zip(output.chunks_mut(BLOCK_LEN)) {
            inc32(&mut self.ivr);
            let keystream = keystream(aes, &self.ivr);
            xor(output, input, &keystream);

            // the tag is always computed over the ciphertext
            let ciphertext: &[u8] = match self.cr.direction {
                Direction::Encrypt => output,
                Direction::Decrypt => input,
            };
            state.ghash.update_padded(ciphertext);
        }

        state.payload_len += input.len() as u64;
        state.unaligned = input.len() % BLOCK_LEN != 0;

        Ok(())
    }

    fn gcm_final(&mut self, output: &mut [u8]) -> Result {
        let GcmState {
            mut ghash,
            ek0,
            header_len,
            payload_len,
            ..
        } = self.gcm.take().ok_or(Error::engine("no GCM session"))?;

        let mut lengths = [0u8; BLOCK_LEN];
        lengths[..8].copy_from_slice(&(header_len * 8).to_be_bytes());
        lengths[8..].copy_from_slice(&(payload_len * 8).to_be_bytes());
        ghash.update(&[Block::from(lengths)]);

        let hash = ghash.finalize();
        debug_assert_eq!(output.len(), TAG_LEN);
        xor(output, &hash, &ek0);

        Ok(())
    }

    /// Applies an injected fault for the given processing step
    ///
    /// Returns `true` if the step must not run. An error fault raises the error flag, a
    /// stall fault leaves the completion flag clear forever.
    fn trip(&mut self, at: Option<Phase>) -> bool {
        match self.fault {
            Some(Fault::Error(phase)) if phase == at => {
                self.fault = None;
                self.sr.err = true;
                true
            }
            Some(Fault::Stall(phase)) if phase == at => {
                self.fault = None;
                true
            }
            _ => false,
        }
    }
}

fn check_shape(phase: Phase, input: &[u8], output: &[u8]) -> Result {
    let valid = match phase {
        Phase::Init => input.is_empty() && output.is_empty(),
        Phase::Header => output.is_empty(),
        Phase::Payload => input.len() == output.len(),
        Phase::Final => input.is_empty() && output.len() == TAG_LEN,
    };

    if valid {
        Ok(())
    } else {
        Err(Error::invalid_argument("buffer shape does not match the phase"))
    }
}

#[inline]
fn keystream(aes: &Aes128, counter: &[u8; BLOCK_LEN]) -> Block {
    let mut block = Block::from(*counter);
    aes.encrypt_block(&mut block);
    block
}

#[inline]
fn xor(output: &mut [u8], input: &[u8], keystream: &[u8]) {
    for ((out, a), b) in output.iter_mut().zip(input).zip(keystream) {
        *out = a ^ b;
    }
}

/// Increments the low 32 bits of the counter block, wrapping on overflow
#[inline]
fn inc32(block: &mut [u8; BLOCK_LEN]) {
    let mut counter = [0u8; 4];
    counter.copy_from_slice(&block[BLOCK_LEN - 4..]);
    let counter = u32::from_be_bytes(counter).wrapping_add(1);
    block[BLOCK_LEN - 4..].copy_from_slice(&counter.to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inc32_wraps_test() {
        let mut block = [0xff; BLOCK_LEN];
        inc32(&mut block);
        assert_eq!(&block[..12], &[0xff; 12]);
        assert_eq!(&block[12..], &[0, 0, 0, 0]);

        let mut block = [0; BLOCK_LEN];
        block[15] = 1;
        inc32(&mut block);
        assert_eq!(block[15], 2);
    }

    #[test]
    fn disable_wipes_registers_test() {
        let mut peripheral = Peripheral::new();
        peripheral.enable_clock();
        peripheral.configure(
            Chaining::Gcm,
            Direction::Encrypt,
            &Key::new([7; 16]),
            [9; BLOCK_LEN],
        );
        peripheral.process_phase(Phase::Init, &[], &mut []).unwrap();
        assert!(peripheral.take_completion());

        peripheral.disable();
        assert!(peripheral.key.is_none());
        assert!(peripheral.gcm.is_none());
        assert_eq!(peripheral.ivr, [0; BLOCK_LEN]);
        assert!(!peripheral.cr.enabled);
    }

    #[test]
    fn unclocked_peripheral_test() {
        let mut peripheral = Peripheral::new();
        peripheral.configure(
            Chaining::Ctr,
            Direction::Encrypt,
            &Key::new([0; 16]),
            [0; BLOCK_LEN],
        );
        let mut output = [0u8; 4];
        assert!(peripheral.process_ctr(&[1, 2, 3, 4], &mut output).is_err());
    }
}
