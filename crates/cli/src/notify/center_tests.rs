// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::connection::ConnectionConfig;
use crate::notify::{ChimeError, DismissReason, SilentChime};
use crate::test_support::{clock, MockServer};
use serde_json::json;
use std::sync::atomic::AtomicUsize;

#[derive(Default)]
struct CountingChime {
    plays: AtomicUsize,
    fail: bool,
}

impl Chime for CountingChime {
    fn play(&self) -> Result<(), ChimeError> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ChimeError::from(std::io::Error::other("no audio device")));
        }
        Ok(())
    }
}

fn center() -> NotificationCenter {
    NotificationCenter::new(NotifyConfig::default(), Arc::new(SilentChime))
}

fn routine(n: u64) -> Event {
    Event::ItemUpdated(json!({"id": n, "name": "widget"}))
}

#[test]
fn test_history_is_bounded_newest_first() {
    let center = center();
    let mut ids = Vec::new();
    for n in 0..60 {
        ids.push(center.record(&routine(n)).id);
    }
    for id in &ids[50..55] {
        center.mark_read(*id);
    }

    let state = center.state();
    assert_eq!(state.history.len(), 50);
    assert_eq!(state.history[0].id, ids[59]);
    assert_eq!(state.history[49].id, ids[10]);
    assert!(state.history.iter().all(|n| ids[10..].contains(&n.id)));
    assert_eq!(state.unread_count, 45);
    assert_eq!(center.unread_count(), 45);
}

#[test]
fn test_mark_read_updates_unread_count() {
    let center = center();
    let a = center.record(&routine(1));
    center.record(&routine(2));
    assert_eq!(center.unread_count(), 2);

    assert!(center.mark_read(a.id));
    assert!(center.mark_read(a.id));
    assert_eq!(center.unread_count(), 1);
    assert!(!center.mark_read(999));

    center.mark_all_read();
    assert_eq!(center.state().unread_count, 0);
}

#[tokio::test(start_paused = true)]
async fn test_clear_all_empties_history_and_alerts() {
    let center = center();
    center.record(&routine(1));
    center.display(&routine(1));

    center.clear_all();

    let state = center.state();
    assert!(state.history.is_empty());
    assert_eq!(state.unread_count, 0);
    assert!(center.alerts().is_empty());
}

#[test]
fn test_critical_event_plays_chime() {
    let chime = Arc::new(CountingChime::default());
    let center = NotificationCenter::new(NotifyConfig::default(), chime.clone());

    let n = center.record(&Event::InventoryUpdated(json!({"status": "Low stock on bolts"})));
    assert!(n.critical);
    center.record(&routine(1));

    assert_eq!(chime.plays.load(Ordering::SeqCst), 1);
}

#[test]
fn test_chime_failure_is_swallowed() {
    let chime = Arc::new(CountingChime { fail: true, ..CountingChime::default() });
    let center = NotificationCenter::new(NotifyConfig::default(), chime.clone());

    let n = center.record(&Event::TransactionCreated(json!({"note": "payment FAILED"})));

    assert!(n.critical);
    assert_eq!(chime.plays.load(Ordering::SeqCst), 1);
    assert_eq!(center.state().history.len(), 1);
}

#[test]
fn test_sound_disabled_skips_chime() {
    let chime = Arc::new(CountingChime::default());
    let config = NotifyConfig { sound: false, ..NotifyConfig::default() };
    let center = NotificationCenter::new(config, chime.clone());

    center.record(&Event::ItemCreated(json!({"name": "urgent recall"})));
    assert_eq!(chime.plays.load(Ordering::SeqCst), 0);
}

#[test]
fn test_custom_keywords() {
    let config = NotifyConfig { critical_keywords: vec!["recall".into()], ..NotifyConfig::default() };
    let center = NotificationCenter::new(config, Arc::new(SilentChime));
    assert!(center.classify(&Event::ItemCreated(json!({"name": "Recall notice"}))));
    assert!(!center.classify(&Event::ItemCreated(json!({"name": "urgent"}))));
}

#[tokio::test(start_paused = true)]
async fn test_display_auto_dismisses() {
    let center = center();
    let mut rx = center.alert_events();

    let id = center.display(&routine(3));
    assert_eq!(center.alerts().len(), 1);
    assert!(!center.alerts()[0].critical);

    tokio::time::sleep(Duration::from_millis(5001)).await;
    assert!(center.alerts().is_empty());
    assert_eq!(rx.recv().await.unwrap(), AlertEvent::Shown { id });
    assert_eq!(rx.recv().await.unwrap(), AlertEvent::Dismissed { id, reason: DismissReason::Timeout });
}

#[tokio::test(start_paused = true)]
async fn test_attach_records_and_displays_server_events() {
    let server = MockServer::new();
    let broker = Broker::new(ConnectionConfig::default(), server.connector(), clock(), None);
    let center = center();
    let subs = center.attach(&broker);
    assert_eq!(subs.len(), 5);

    broker.publish(&Event::ItemCreated(json!({"id": 7, "name": "Bolt"})));
    broker.publish(&Event::Connected);

    let state = center.state();
    assert_eq!(state.history.len(), 1);
    assert_eq!(state.history[0].event, Event::ItemCreated(json!({"id": 7, "name": "Bolt"})));
    assert_eq!(center.alerts().len(), 1);
}

#[test]
fn test_notification_serializes() {
    let center = center();
    let n = center.record(&routine(4));
    let value = serde_json::to_value(&n).unwrap();
    assert_eq!(value["event"]["topic"], "item_updated");
    assert_eq!(value["read"], false);
}
