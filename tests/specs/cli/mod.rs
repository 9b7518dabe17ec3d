// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod common;
mod config;
mod help;
mod queue;
mod watch;
