// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Audible cue for critical notifications.

use std::io::Write;

/// Error returned when a cue cannot be played.
#[derive(Debug, thiserror::Error)]
#[error("chime failed: {0}")]
pub struct ChimeError(#[from] std::io::Error);

/// Plays an audible cue.
pub trait Chime: Send + Sync {
    fn play(&self) -> Result<(), ChimeError>;
}

/// Rings the terminal bell on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl Chime for TerminalBell {
    fn play(&self) -> Result<(), ChimeError> {
        let mut stderr = std::io::stderr().lock();
        stderr.write_all(b"\x07")?;
        stderr.flush()?;
        Ok(())
    }
}

/// Plays nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentChime;

impl Chime for SilentChime {
    fn play(&self) -> Result<(), ChimeError> {
        Ok(())
    }
}
