// Replays a recorded stream of outbound messages against a port table.
//
// Script format is one JSON object per line:
// `{"channel": "cacheLives", "value": 2, "delay_ms": 50}`.
// `value` defaults to `null` and `delay_ms` to zero. Blank lines and lines
// starting with `#` are ignored.

use crate::adapters::ports::LocalPortTable;
use crate::domain::model::Payload;
use crate::utils::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptEvent {
    pub channel: String,
    #[serde(default)]
    pub value: Payload,
    #[serde(default)]
    pub delay_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub delivered: usize,
    pub dropped: usize,
    pub rejected: usize,
    /// Events left unplayed because the host reloaded
    pub skipped: usize,
    pub halted_by_reload: bool,
}

pub fn parse_script(content: &str) -> Result<Vec<ScriptEvent>> {
    let mut events = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let event = serde_json::from_str(line).map_err(|e| BridgeError::ConfigValidationError {
            field: format!("script line {}", index + 1),
            message: e.to_string(),
        })?;
        events.push(event);
    }
    Ok(events)
}

/// Emits each event in order. Stops as soon as `reloaded` reports true, since a
/// reload ends the current application instance.
pub async fn replay<F>(
    ports: &LocalPortTable,
    events: Vec<ScriptEvent>,
    reloaded: F,
) -> ReplaySummary
where
    F: Fn() -> bool,
{
    let mut summary = ReplaySummary::default();
    let total = events.len();

    for (index, event) in events.into_iter().enumerate() {
        if reloaded() {
            summary.halted_by_reload = true;
            summary.skipped = total - index;
            tracing::info!("Host reloaded, skipping {} remaining events", summary.skipped);
            break;
        }

        if event.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(event.delay_ms)).await;
        }

        match ports.emit(&event.channel, event.value) {
            Ok(true) => summary.delivered += 1,
            Ok(false) => summary.dropped += 1,
            Err(e) => {
                tracing::warn!("⚠️ {}", e);
                summary.rejected += 1;
            }
        }
    }

    if !summary.halted_by_reload && reloaded() {
        summary.halted_by_reload = true;
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::PortTable;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_parse_script() {
        let script = r#"
# intro
{"channel": "playIntroMusic"}
{"channel": "cacheLives", "value": 2, "delay_ms": 10}

"#;
        let events = parse_script(script).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].value, Payload::Null);
        assert_eq!(events[0].delay_ms, 0);
        assert_eq!(events[1].value, json!(2));
        assert_eq!(events[1].delay_ms, 10);
    }

    #[test]
    fn test_parse_script_reports_line() {
        let err = parse_script("{\"channel\": \"fadeMusic\"}\nnot json").unwrap_err();
        assert!(err.to_string().contains("script line 2"));
    }

    #[tokio::test]
    async fn test_replay_counts_outcomes() {
        let ports = LocalPortTable::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        ports
            .outbound("cacheLives")
            .unwrap()
            .subscribe(Box::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();

        let events = parse_script(
            "{\"channel\": \"cacheLives\", \"value\": 1}\n\
             {\"channel\": \"fadeMusic\"}\n\
             {\"channel\": \"bogus\"}\n",
        )
        .unwrap();

        let summary = replay(&ports, events, || false).await;
        assert_eq!(
            summary,
            ReplaySummary {
                delivered: 1,
                dropped: 1,
                rejected: 1,
                skipped: 0,
                halted_by_reload: false,
            }
        );
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_replay_stops_after_reload() {
        let ports = LocalPortTable::new();
        let reloaded = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&reloaded);
        ports
            .outbound("clearCache_")
            .unwrap()
            .subscribe(Box::new(move |_| flag.store(true, Ordering::SeqCst)))
            .unwrap();

        let events = parse_script(
            "{\"channel\": \"clearCache_\"}\n\
             {\"channel\": \"cacheLives\", \"value\": 3}\n\
             {\"channel\": \"fadeMusic\"}\n",
        )
        .unwrap();

        let summary = replay(&ports, events, || reloaded.load(Ordering::SeqCst)).await;
        assert!(summary.halted_by_reload);
        assert_eq!(summary.delivered, 1);
        assert_eq!(summary.skipped, 2);
    }
}
