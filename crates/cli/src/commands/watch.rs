// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::future::Future;
use std::io::Write;
use std::sync::Arc;

use pulse_core::{Event, SystemClock, Topic};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::info;

use crate::broker::{Broker, BrokerRegistry};
use crate::config::Config;
use crate::connection::WebSocketConnector;
use crate::display::format_event_line;
use crate::error::{Error, Result};
use crate::notify::{Chime, NotificationCenter, SilentChime, TerminalBell};

/// Connects and prints events until Ctrl-C or until reconnection gives up.
pub fn run(
    config: Config,
    endpoint: Option<String>,
    token: Option<String>,
    json: bool,
) -> Result<()> {
    let config = config.with_overrides(endpoint, token);
    let endpoint = config.endpoint()?.to_string();

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(async {
        let registry = BrokerRegistry::new(
            config.connection_config(),
            Arc::new(WebSocketConnector),
            Arc::new(SystemClock),
            config.token().map(str::to_string),
        );
        let chime: Arc<dyn Chime> =
            if config.notifications.sound { Arc::new(TerminalBell) } else { Arc::new(SilentChime) };
        let center = NotificationCenter::new(config.notify_config(), chime);
        let broker = registry.get(&endpoint);
        info!(endpoint = %endpoint, "watching");

        let interrupted = async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupted");
            }
        };
        let result = stream(&broker, &center, json, &mut std::io::stdout(), interrupted).await;
        registry.shutdown().await;
        result
    })
}

/// Renders one event for output.
pub(crate) fn render(event: &Event, critical: bool, json: bool) -> Result<String> {
    if !json {
        return Ok(format_event_line(event, critical));
    }
    let mut value = serde_json::to_value(event)?;
    if let Value::Object(map) = &mut value {
        map.insert("critical".to_string(), Value::Bool(critical));
    }
    Ok(value.to_string())
}

/// Writes every event published on `broker` to `out` until `stop` resolves.
///
/// Server events are also recorded in `center`. Returns
/// [`Error::GaveUp`] once reconnection is exhausted.
pub(crate) async fn stream<W, F>(
    broker: &Broker,
    center: &NotificationCenter,
    json: bool,
    out: &mut W,
    stop: F,
) -> Result<()>
where
    W: Write,
    F: Future<Output = ()>,
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    let topics: Vec<Topic> = Topic::SERVER.into_iter().chain(Topic::STATUS).collect();
    let forward = broker.subscribe_all(&topics, move |event| {
        let _ = tx.send(event.clone());
    });
    let notify = center.attach(broker);
    tokio::pin!(stop);

    let result = loop {
        tokio::select! {
            _ = &mut stop => break Ok(()),
            event = rx.recv() => {
                let Some(event) = event else { break Ok(()) };
                let critical = event.topic().is_server() && center.classify(&event);
                if let Err(e) = render(&event, critical, json)
                    .and_then(|line| writeln!(out, "{line}").map_err(Error::from))
                {
                    break Err(e);
                }
                if let Event::GaveUp { attempts } = event {
                    break Err(Error::GaveUp { endpoint: broker.endpoint().to_string(), attempts });
                }
            }
        }
    };

    for sub in forward.iter().chain(notify.iter()) {
        sub.unsubscribe();
    }
    result
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
