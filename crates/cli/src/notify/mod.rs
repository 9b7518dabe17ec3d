// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Notification history, transient alerts and audible cues.

mod alert;
mod center;
mod chime;
mod classify;

pub use alert::{Alert, AlertBoard, AlertEvent, AlertId, DismissReason};
pub use center::{Notification, NotificationCenter, NotificationState, NotifyConfig};
pub use chime::{Chime, ChimeError, SilentChime, TerminalBell};
pub use classify::{Classifier, DEFAULT_CRITICAL_KEYWORDS};
