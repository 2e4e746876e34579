use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The persisted snapshot of one full run. Written once, fully overwriting
/// any previous file; key names match the downstream consumers (camelCase).
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputDocument {
    pub last_updated: String,
    pub total_events: usize,
    pub events: Vec<Value>,
}

impl OutputDocument {
    pub fn new(events: Vec<Value>) -> Self {
        Self {
            last_updated: Utc::now().to_rfc3339(),
            total_events: events.len(),
            events,
        }
    }
}

/// Collapse the accumulated event sequence to one record per URL and attach
/// card tags to the survivors.
///
/// For a duplicate URL the later record wins, but the entry keeps the
/// position where that URL was first seen. Events without a string `url`
/// cannot be keyed or tagged and are dropped. Survivors without a tag-map
/// entry get no `tags` key at all.
pub fn merge_events(events: Vec<Value>, tags: &HashMap<String, Vec<String>>) -> Vec<Value> {
    let mut order: Vec<String> = Vec::new();
    let mut by_url: HashMap<String, Value> = HashMap::new();

    for event in events {
        let Some(url) = event.get("url").and_then(Value::as_str).map(str::to_owned) else {
            continue;
        };
        if !by_url.contains_key(&url) {
            order.push(url.clone());
        }
        by_url.insert(url, event);
    }

    order
        .into_iter()
        .filter_map(|url| {
            let mut event = by_url.remove(&url)?;
            if let Some(labels) = tags.get(&url) {
                if let Some(obj) = event.as_object_mut() {
                    obj.insert("tags".to_string(), serde_json::json!(labels));
                }
            }
            Some(event)
        })
        .collect()
}

pub fn write_output(path: &Path, doc: &OutputDocument) -> Result<()> {
    let json =
        serde_json::to_string_pretty(doc).context("Failed to serialize output document")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

pub fn read_output(path: &Path) -> Result<OutputDocument> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(url: &str, name: &str) -> Value {
        json!({ "url": url, "name": name })
    }

    #[test]
    fn duplicate_url_keeps_later_record_at_first_seen_position() {
        let events = vec![
            event("https://calendar.niu.edu/event/a", "A v1"),
            event("https://calendar.niu.edu/event/b", "B"),
            event("https://calendar.niu.edu/event/a", "A v2"),
        ];
        let merged = merge_events(events, &HashMap::new());
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0]["name"], "A v2");
        assert_eq!(merged[1]["name"], "B");
    }

    #[test]
    fn tags_attached_by_exact_url() {
        let mut tags = HashMap::new();
        tags.insert(
            "https://calendar.niu.edu/event/b".to_string(),
            vec!["Lecture".to_string(), "Free".to_string()],
        );
        let merged = merge_events(
            vec![
                event("https://calendar.niu.edu/event/a", "A"),
                event("https://calendar.niu.edu/event/b", "B"),
            ],
            &tags,
        );
        assert!(merged[0].get("tags").is_none());
        assert_eq!(merged[1]["tags"], json!(["Lecture", "Free"]));
    }

    #[test]
    fn untagged_event_has_no_tags_key() {
        let merged = merge_events(
            vec![event("https://calendar.niu.edu/event/a", "A")],
            &HashMap::new(),
        );
        assert!(merged[0].as_object().unwrap().get("tags").is_none());
    }

    #[test]
    fn events_without_url_are_dropped() {
        let events = vec![
            json!({ "name": "no url" }),
            event("https://calendar.niu.edu/event/a", "A"),
            json!({ "url": 42, "name": "numeric url" }),
        ];
        let merged = merge_events(events, &HashMap::new());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0]["name"], "A");
    }

    #[test]
    fn merge_is_deterministic_for_fixed_inputs() {
        let mut tags = HashMap::new();
        tags.insert(
            "https://calendar.niu.edu/event/a".to_string(),
            vec!["Music".to_string()],
        );
        let events = vec![
            event("https://calendar.niu.edu/event/a", "A"),
            event("https://calendar.niu.edu/event/b", "B"),
            event("https://calendar.niu.edu/event/a", "A again"),
        ];
        let first = merge_events(events.clone(), &tags);
        let second = merge_events(events, &tags);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn output_document_serializes_camel_case() {
        let doc = OutputDocument::new(vec![event("https://calendar.niu.edu/event/a", "A")]);
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("\"lastUpdated\""));
        assert!(json.contains("\"totalEvents\":1"));
        assert!(json.contains("\"events\""));
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("niu-events.json");

        let doc = OutputDocument::new(vec![event("https://calendar.niu.edu/event/a", "A")]);
        write_output(&path, &doc).unwrap();

        let back = read_output(&path).unwrap();
        assert_eq!(back.total_events, 1);
        assert_eq!(back.events[0]["url"], "https://calendar.niu.edu/event/a");
    }

    #[test]
    fn write_fully_overwrites_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("niu-events.json");

        let first = OutputDocument::new(vec![
            event("https://calendar.niu.edu/event/a", "A"),
            event("https://calendar.niu.edu/event/b", "B"),
        ]);
        write_output(&path, &first).unwrap();

        let second = OutputDocument::new(vec![event("https://calendar.niu.edu/event/c", "C")]);
        write_output(&path, &second).unwrap();

        let back = read_output(&path).unwrap();
        assert_eq!(back.total_events, 1);
        assert_eq!(back.events[0]["name"], "C");
    }

    #[test]
    fn write_to_missing_directory_fails() {
        let doc = OutputDocument::new(vec![]);
        let err = write_output(Path::new("/nonexistent/dir/out.json"), &doc);
        assert!(err.is_err());
    }
}
