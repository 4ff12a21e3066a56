// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Latency report over the reference operations
//!
//! Each backend runs `ctr`, `gcm_e` and `gcm_d` on the reference fixtures. For every
//! operation the report prints the elapsed time, with the cost of reading the clock
//! subtracted, the success flag, and a hex dump of the output.

use crate::fixture;
use aes_dispatch::{engine::hardware, Backend, Config, Dispatcher, Tag, TAG_LEN};
use core::{fmt, str::FromStr};
use pretty_hex::simple_hex;
use std::{
    io::{self, Write},
    time::{Duration, Instant},
};
use structopt::StructOpt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    One(Backend),
    Both,
}

impl Selection {
    pub fn backends(&self) -> Vec<Backend> {
        match self {
            Self::One(backend) => vec![*backend],
            Self::Both => Backend::ALL.to_vec(),
        }
    }
}

impl FromStr for Selection {
    type Err = aes_dispatch::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("both") {
            return Ok(Self::Both);
        }
        s.parse().map(Self::One)
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::One(backend) => backend.fmt(f),
            Self::Both => "both".fmt(f),
        }
    }
}

#[derive(Debug, StructOpt)]
#[structopt(name = "aes-dispatch-report")]
pub struct Report {
    /// Backend to measure: `hardware`, `software` or `both`
    #[structopt(short, long, default_value = "both")]
    pub backend: Selection,

    /// Payload length in bytes
    #[structopt(short, long, default_value = "256")]
    pub length: usize,

    /// Number of times each backend runs the operations
    #[structopt(short, long, default_value = "1")]
    pub iterations: usize,

    /// Only print timings and results, without hex dumps
    #[structopt(short, long)]
    pub quiet: bool,
}

impl Default for Report {
    fn default() -> Self {
        Self {
            backend: Selection::Both,
            length: fixture::LENGTH,
            iterations: 1,
            quiet: false,
        }
    }
}

/// A single timed operation
#[derive(Clone, Debug)]
pub struct Measurement {
    pub name: &'static str,
    pub elapsed: Duration,
    pub success: bool,
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: t = {}, r = {}",
            self.name,
            self.elapsed.as_nanos(),
            self.success
        )
    }
}

/// The cost of taking two consecutive clock readings
pub fn timer_overhead() -> Duration {
    let t0 = Instant::now();
    let t1 = Instant::now();
    t1 - t0
}

/// Times `f`, minus `overhead`
pub fn measure<R>(overhead: Duration, f: impl FnOnce() -> R) -> (Duration, R) {
    let t0 = Instant::now();
    let result = f();
    let t1 = Instant::now();
    ((t1 - t0).saturating_sub(overhead), result)
}

impl Report {
    pub fn run(&self) -> anyhow::Result<()> {
        tracing::info!(accelerated = hardware::is_accelerated(), "starting report");

        let stdout = io::stdout();
        let mut out = stdout.lock();
        for backend in self.backend.backends() {
            self.run_backend(backend, &mut out)?;
        }
        out.flush()?;

        Ok(())
    }

    /// Runs every operation on `backend` and writes the report to `out`
    ///
    /// Returns the measurements of the last iteration.
    pub fn run_backend<W: Write>(
        &self,
        backend: Backend,
        out: &mut W,
    ) -> anyhow::Result<Vec<Measurement>> {
        let config = Config::builder().with_backend(backend).build();
        let mut dispatcher = Dispatcher::try_new(&config)?;

        let overhead = timer_overhead();
        let len = self.length;

        // buffers leave room for an appended tag
        let plaintext = fixture::plaintext(len);
        let mut ciphertext = vec![0u8; len + TAG_LEN];
        let mut recovered = vec![0u8; len + TAG_LEN];

        writeln!(out, "# {backend}")?;

        let mut measurements = vec![];
        for _ in 0..self.iterations {
            measurements.clear();

            let (elapsed, result) = measure(overhead, || {
                dispatcher.ctr_encrypt(&fixture::KEY, &fixture::IV, &plaintext, &mut ciphertext)
            });
            let ctr = self.record("ctr", elapsed, result.is_ok(), &mut measurements);
            log_failure(backend, ctr.name, result.err());
            writeln!(out, "\n{ctr}")?;
            self.dump(out, &ciphertext[..len])?;

            let (elapsed, result) = measure(overhead, || {
                dispatcher.gcm_encrypt(&fixture::KEY, fixture::nonce(), &plaintext, &mut ciphertext)
            });
            let gcm_e = self.record("gcm_e", elapsed, result.is_ok(), &mut measurements);
            let mic: Tag = match result {
                Ok(tag) => tag,
                Err(error) => {
                    log_failure(backend, gcm_e.name, Some(error));
                    [0; TAG_LEN]
                }
            };
            writeln!(out, "\n{gcm_e}")?;
            self.dump(out, &ciphertext[..len])?;
            self.dump(out, &mic)?;

            let (elapsed, result) = measure(overhead, || {
                dispatcher.gcm_decrypt(
                    &fixture::KEY,
                    fixture::nonce(),
                    &ciphertext[..len],
                    &mut recovered,
                    &mic,
                )
            });
            let gcm_d = self.record("gcm_d", elapsed, result.is_ok(), &mut measurements);
            log_failure(backend, gcm_d.name, result.err());
            writeln!(out, "\n{gcm_d}")?;
            self.dump(out, &recovered[..len])?;
            self.dump(out, &mic)?;
        }

        Ok(measurements)
    }

    fn record(
        &self,
        name: &'static str,
        elapsed: Duration,
        success: bool,
        measurements: &mut Vec<Measurement>,
    ) -> Measurement {
        let measurement = Measurement {
            name,
            elapsed,
            success,
        };
        measurements.push(measurement.clone());
        measurement
    }

    fn dump<W: Write>(&self, out: &mut W, bytes: &[u8]) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        writeln!(out, "{}", simple_hex(&bytes))
    }
}

fn log_failure(backend: Backend, name: &str, error: Option<aes_dispatch::Error>) {
    if let Some(error) = error {
        tracing::warn!(%backend, operation = name, %error, "operation failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_test() {
        assert_eq!("both".parse::<Selection>().unwrap(), Selection::Both);
        assert_eq!(
            "hw".parse::<Selection>().unwrap(),
            Selection::One(Backend::Hardware)
        );
        assert_eq!(
            "software".parse::<Selection>().unwrap().backends(),
            vec![Backend::Software]
        );
        assert!("all".parse::<Selection>().is_err());
    }

    #[test]
    fn report_test() {
        let report = Report {
            iterations: 2,
            ..Default::default()
        };

        for backend in Backend::ALL {
            let mut out = vec![];
            let measurements = report.run_backend(backend, &mut out).unwrap();

            let names: Vec<_> = measurements.iter().map(|m| m.name).collect();
            assert_eq!(names, ["ctr", "gcm_e", "gcm_d"]);
            assert!(measurements.iter().all(|m| m.success), "{measurements:?}");

            let out = String::from_utf8(out).unwrap();
            assert_eq!(out.matches("r = true").count(), 6);
        }
    }

    #[test]
    fn quiet_test() {
        let report = Report {
            backend: Selection::One(Backend::Software),
            length: 0,
            quiet: true,
            ..Default::default()
        };

        let mut out = vec![];
        report
            .run_backend(Backend::Software, &mut out)
            .unwrap();
        let out = String::from_utf8(out).unwrap();

        // a header plus a blank line and a result line per operation
        assert_eq!(out.lines().count(), 7, "{out}");
    }
}
