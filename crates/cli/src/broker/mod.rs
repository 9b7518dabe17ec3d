// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Per-endpoint event broker.

#[allow(clippy::module_inception)]
mod broker;
mod registry;

pub use broker::{Broker, Callback, Subscription};
pub use registry::{normalize_endpoint, BrokerRegistry};
