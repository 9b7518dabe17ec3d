// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Plain-text rendering for `pulse watch` and `pulse queue list`.

use chrono::DateTime;
use pulse_core::{Event, PendingOp};

/// Payloads longer than this are cut with an ellipsis.
const DETAIL_WIDTH: usize = 96;

/// Shortens `text` to at most `width` characters.
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Human-readable summary of an event's content.
pub fn event_detail(event: &Event) -> String {
    match event {
        Event::Connected => "connected".to_string(),
        Event::Disconnected { reason } => format!("disconnected: {reason}"),
        Event::ConnectError { attempt, message } => format!("attempt {attempt} failed: {message}"),
        Event::Reconnecting { attempt, delay_ms } => {
            format!("reconnect attempt {attempt} in {delay_ms}ms")
        }
        Event::GaveUp { attempts } => format!("gave up after {attempts} reconnect attempts"),
        Event::Error { message } => message.clone(),
        other => other.payload().map(|p| truncate(&p.to_string(), DETAIL_WIDTH)).unwrap_or_default(),
    }
}

/// One line per event: `! topic  detail`, with `!` marking critical events.
pub fn format_event_line(event: &Event, critical: bool) -> String {
    let marker = if critical { '!' } else { ' ' };
    format!("{marker} {:<20} {}", event.topic().as_str(), event_detail(event))
}

/// Renders a millisecond timestamp as UTC, or the raw number if out of range.
pub fn format_timestamp(ms: u64) -> String {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ms.to_string())
}

/// One line per queued operation.
///
/// Operations at or past `attention_threshold` failures are flagged.
pub fn format_op_line(op: &PendingOp, attention_threshold: u32) -> String {
    let mut line = format!("{}  {}  {}", op.id, format_timestamp(op.timestamp), op.operation);
    if op.failures > 0 {
        line.push_str(&format!("  failures={}", op.failures));
    }
    if op.failures >= attention_threshold {
        line.push_str("  (needs attention)");
    }
    line
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
