// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use aes_dispatch::{
    config::{BACKEND_ENV, WAIT_ENV},
    Backend, Config, Dispatcher, Wait,
};
use std::{env, time::Duration};

// the environment is process-wide so everything lives in a single test
#[test]
fn from_env() {
    env::remove_var(BACKEND_ENV);
    env::remove_var(WAIT_ENV);
    assert_eq!(Config::from_env().unwrap(), Config::default());

    env::set_var(BACKEND_ENV, "sw");
    env::set_var(WAIT_ENV, "250");
    let config = Config::from_env().unwrap();
    assert_eq!(config.backend(), Backend::Software);
    assert_eq!(config.wait(), Wait::Bounded(Duration::from_millis(250)));
    assert_eq!(Dispatcher::new(&config).backend(), Backend::Software);

    env::set_var(WAIT_ENV, "soon");
    assert!(Config::from_env().is_err());

    env::set_var(WAIT_ENV, "250");
    env::set_var(BACKEND_ENV, "gpu");
    assert!(Config::from_env().is_err());

    // a backend that can't be read is rejected rather than defaulted
    #[cfg(unix)]
    {
        use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

        env::set_var(BACKEND_ENV, OsStr::from_bytes(&[b's', b'w', 0xff]));
        assert!(Config::from_env().is_err());
        env::remove_var(BACKEND_ENV);

        env::set_var(WAIT_ENV, OsStr::from_bytes(&[b'1', 0xff]));
        assert!(Config::from_env().is_err());
    }

    env::remove_var(BACKEND_ENV);
    env::remove_var(WAIT_ENV);
}
