//! Ordered NDJSON status stream for callers that drive the CLI.
//!
//! Events go to stdout, one JSON object per line; `tracing` output stays on
//! stderr so the two never interleave.

use serde::Serialize;
use serde_json::Value;
use std::cell::RefCell;
use std::io::Write;

#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProgressEvent {
    Progress { value: f64 },
    Result { payload: Value },
    Error { message: String },
}

impl ProgressEvent {
    pub fn to_line(&self) -> String {
        // Serialising these variants cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Writes one event per line, or nothing when disabled.
pub struct EventStream<W: Write> {
    out: Option<RefCell<W>>,
}

impl<W: Write> EventStream<W> {
    pub fn new(out: W, enabled: bool) -> Self {
        Self {
            out: enabled.then(|| RefCell::new(out)),
        }
    }

    pub fn emit(&self, event: &ProgressEvent) {
        let Some(out) = &self.out else {
            return;
        };
        let mut out = out.borrow_mut();
        // A closed pipe must not abort planning.
        if writeln!(out, "{}", event.to_line()).is_ok() {
            let _ = out.flush();
        }
    }

    pub fn into_inner(self) -> Option<W> {
        self.out.map(RefCell::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn events_are_tagged_by_kind() {
        assert_eq!(
            ProgressEvent::Progress { value: 30.0 }.to_line(),
            r#"{"kind":"progress","value":30.0}"#
        );
        assert_eq!(
            ProgressEvent::Result {
                payload: json!({"nodes": 3})
            }
            .to_line(),
            r#"{"kind":"result","payload":{"nodes":3}}"#
        );
        assert_eq!(
            ProgressEvent::Error {
                message: "drill hole 5 cannot be reached".into()
            }
            .to_line(),
            r#"{"kind":"error","message":"drill hole 5 cannot be reached"}"#
        );
    }

    #[test]
    fn disabled_stream_writes_nothing() {
        let stream = EventStream::new(Vec::new(), false);
        stream.emit(&ProgressEvent::Progress { value: 1.0 });
        assert!(stream.into_inner().is_none());

        let stream = EventStream::new(Vec::new(), true);
        stream.emit(&ProgressEvent::Progress { value: 1.0 });
        stream.emit(&ProgressEvent::Progress { value: 2.0 });
        let text = String::from_utf8(stream.into_inner().unwrap()).unwrap();
        assert_eq!(text.lines().count(), 2);
    }
}
