//! Encoder worker protocol messages
//!
//! Requests flow adapter -> worker, responses worker -> adapter. Both are
//! tagged by a `cmd` field on the wire. Responses the adapter does not
//! understand are kept verbatim as [`WorkerResponse::Unrecognized`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::domain::recording::SessionConfig;

/// Command posted to the encoder worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "lowercase")]
pub enum WorkerRequest {
    /// Configure the encoder. Sent exactly once, before any `Encode`.
    Init { config: SessionConfig },
    /// One block of single-channel samples
    Encode { buf: Vec<f32> },
    /// Flush and reply with the whole recording
    Finish,
}

impl WorkerRequest {
    /// The wire tag of this request
    pub const fn command(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init",
            Self::Encode { .. } => "encode",
            Self::Finish => "finish",
        }
    }
}

/// Message posted back by the encoder worker
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerResponse {
    /// Encoding finished; chunks in output order
    End { buf: Vec<Vec<u8>> },
    /// Encoding failed; payload is worker-defined
    Error { error: Value },
    /// Anything that is not a well-formed `end` or `error`
    Unrecognized(Value),
}

impl WorkerResponse {
    /// Build an error response from a message
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: Value::String(message.into()),
        }
    }

    /// The wire tag of this response, if it has a known one
    pub fn command(&self) -> Option<&'static str> {
        match self {
            Self::End { .. } => Some("end"),
            Self::Error { .. } => Some("error"),
            Self::Unrecognized(_) => None,
        }
    }

    /// Wire representation. `end` chunks are base64 strings.
    pub fn to_value(&self) -> Value {
        match self {
            Self::End { buf } => {
                let chunks: Vec<String> = buf.iter().map(|c| STANDARD.encode(c)).collect();
                json!({ "cmd": "end", "buf": chunks })
            }
            Self::Error { error } => json!({ "cmd": "error", "error": error }),
            Self::Unrecognized(raw) => raw.clone(),
        }
    }

    /// Classify a wire message. Never fails: unknown shapes are kept raw.
    pub fn from_value(value: Value) -> Self {
        let parsed = value.as_object().and_then(|obj| match command_of(obj) {
            Some("end") => obj
                .get("buf")
                .and_then(decode_chunks)
                .map(|buf| Self::End { buf }),
            Some("error") => Some(Self::Error {
                error: obj.get("error").cloned().unwrap_or(Value::Null),
            }),
            _ => None,
        });

        parsed.unwrap_or(Self::Unrecognized(value))
    }

    /// Classify one line of the line-delimited wire format
    pub fn from_line(line: &str) -> Self {
        match serde_json::from_str::<Value>(line) {
            Ok(value) => Self::from_value(value),
            Err(_) => Self::Unrecognized(Value::String(line.to_string())),
        }
    }
}

fn command_of(obj: &Map<String, Value>) -> Option<&str> {
    obj.get("cmd").and_then(Value::as_str)
}

/// Chunks are accepted as base64 strings or as arrays of byte values
fn decode_chunks(value: &Value) -> Option<Vec<Vec<u8>>> {
    value
        .as_array()?
        .iter()
        .map(|chunk| match chunk {
            Value::String(encoded) => STANDARD.decode(encoded).ok(),
            Value::Array(bytes) => bytes
                .iter()
                .map(|b| b.as_u64().and_then(|b| u8::try_from(b).ok()))
                .collect(),
            _ => None,
        })
        .collect()
}

impl Serialize for WorkerResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for WorkerResponse {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_wire_shape() {
        let request = WorkerRequest::Init {
            config: SessionConfig::new(true, 44100),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"cmd": "init", "config": {"debug": true, "sampleRate": 44100}})
        );
    }

    #[test]
    fn encode_and_finish_wire_shape() {
        let encode = WorkerRequest::Encode {
            buf: vec![0.5, -0.25],
        };
        assert_eq!(
            serde_json::to_value(&encode).unwrap(),
            json!({"cmd": "encode", "buf": [0.5, -0.25]})
        );
        assert_eq!(
            serde_json::to_value(&WorkerRequest::Finish).unwrap(),
            json!({"cmd": "finish"})
        );
    }

    #[test]
    fn requests_parse_from_wire() {
        let request: WorkerRequest = serde_json::from_str(r#"{"cmd":"finish"}"#).unwrap();
        assert_eq!(request, WorkerRequest::Finish);
        assert_eq!(request.command(), "finish");

        assert!(serde_json::from_str::<WorkerRequest>(r#"{"cmd":"pause"}"#).is_err());
    }

    #[test]
    fn end_chunks_are_base64_on_the_wire() {
        let response = WorkerResponse::End {
            buf: vec![vec![0xff, 0xfb], vec![1, 2, 3]],
        };
        let value = response.to_value();
        assert_eq!(value, json!({"cmd": "end", "buf": ["//s=", "AQID"]}));
        assert_eq!(WorkerResponse::from_value(value), response);
    }

    #[test]
    fn end_accepts_byte_arrays() {
        let response = WorkerResponse::from_value(json!({"cmd": "end", "buf": [[1, 2], [3]]}));
        assert_eq!(
            response,
            WorkerResponse::End {
                buf: vec![vec![1, 2], vec![3]]
            }
        );
    }

    #[test]
    fn error_payload_is_kept_verbatim() {
        let response = WorkerResponse::from_value(json!({"cmd": "error", "error": "disk full"}));
        assert_eq!(response, WorkerResponse::error("disk full"));

        let structured = json!({"cmd": "error", "error": {"code": 5}});
        assert_eq!(
            WorkerResponse::from_value(structured),
            WorkerResponse::Error {
                error: json!({"code": 5})
            }
        );
    }

    #[test]
    fn unknown_shapes_are_unrecognized() {
        for raw in [
            json!({"cmd": "progress", "pct": 50}),
            json!({"buf": []}),
            json!({"cmd": "end", "buf": "not-a-list"}),
            json!({"cmd": "end", "buf": [[300]]}),
            json!(42),
        ] {
            assert_eq!(
                WorkerResponse::from_value(raw.clone()),
                WorkerResponse::Unrecognized(raw)
            );
        }
    }

    #[test]
    fn non_json_line_is_unrecognized() {
        assert_eq!(
            WorkerResponse::from_line("lame: warning"),
            WorkerResponse::Unrecognized(Value::String("lame: warning".to_string()))
        );
    }

    #[test]
    fn response_deserializes_through_serde() {
        let response: WorkerResponse =
            serde_json::from_str(r#"{"cmd":"error","error":"boom"}"#).unwrap();
        assert_eq!(response.command(), Some("error"));
    }
}
