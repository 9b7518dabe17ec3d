// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use clap::Parser;
use pulse_sync::Cli;

fn main() {
    let cli = Cli::parse();
    pulse_sync::logging::init(cli.verbose);
    if let Err(e) = pulse_sync::run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
