// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Helpers for checking the engines against each other

use crate::{
    config::Wait,
    engine::{hardware::Hardware, software::Software, Engine},
};
use core::fmt;
use lazy_static::lazy_static;
use pretty_hex::pretty_hex;

/// Upper bound for generated payloads
pub const MAX_PAYLOAD: usize = 1024 * 2;

pub struct Implementation {
    name: &'static str,
    new: fn() -> Box<dyn Engine>,
}

impl Implementation {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns a freshly initialized engine
    #[allow(clippy::new_ret_no_self)]
    pub fn new(&self) -> Box<dyn Engine> {
        let mut engine = (self.new)();
        if let Err(error) = engine.init() {
            panic!("{error}");
        }
        engine
    }
}

lazy_static! {
    static ref IMPLEMENTATIONS: Vec<Implementation> = vec![
        Implementation {
            name: "hardware",
            new: || Box::new(Hardware::new(Wait::Indefinite)),
        },
        Implementation {
            name: "software",
            new: || Box::new(Software::new()),
        },
    ];
}

pub fn implementations() -> &'static [Implementation] {
    &*IMPLEMENTATIONS
}

/// The bytes a single implementation produced for some input
pub struct Outcome {
    pub name: &'static str,
    pub output: Vec<u8>,
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.name)?;
        writeln!(f, "{}", pretty_hex(&self.output))
    }
}

/// Panics with a dump of every outcome unless they're all identical
pub fn assert_all_match(outcomes: &[Outcome]) {
    let Some((first, rest)) = outcomes.split_first() else {
        return;
    };

    let all_match = rest.iter().all(|outcome| outcome.output == first.output);

    assert!(all_match, "{outcomes:#?}");
}
