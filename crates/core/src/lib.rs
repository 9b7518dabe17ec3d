// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! pulse-core: Shared primitives for the pulse sync layer
//!
//! This crate provides the wire envelopes, the typed event model, pending
//! operation descriptors, and the clock abstraction used by the `pulse`
//! library and tool.

pub mod clock;
pub mod error;
pub mod event;
pub mod op;
pub mod protocol;

pub use clock::{ClockSource, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use event::{Event, Topic};
pub use op::{Method, OpDescriptor, PendingOp};
pub use protocol::{InboundEnvelope, OutboundEnvelope};
