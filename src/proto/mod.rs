// src/proto/mod.rs

//! Control-channel protocol shared between packhost and service packs.
//!
//! The channel is newline-delimited JSON over the child's stdin/stdout.
//! The first line the child writes is a [`HandshakeFrame`]; after the host
//! verifies it, traffic is [`Request`]/[`Response`] pairs.
//!
//! The handshake is a usability guard, not a security boundary: it exists
//! so that launching an incompatible or unrelated binary produces a clear
//! diagnostic instead of garbage on the wire.

use serde::{Deserialize, Serialize};

/// Protocol version both sides must agree on.
pub const PROTOCOL_VERSION: u32 = 1;

/// Environment variable carrying the magic cookie to the child.
pub const COOKIE_ENV: &str = "PACKHOST_SERVICEPACK_COOKIE";

/// Magic cookie value namespaced to this system.
pub const COOKIE_VALUE: &str = "packhost.servicepack";

/// The single capability every service pack exposes.
pub const SERVICE_PACK_CAPABILITY: &str = "service_pack";

/// Operation name for the one exported call.
pub const RUN_PROBES_OPERATION: &str = "run_probes";

/// First line written by a launching pack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandshakeFrame {
    pub protocol_version: u32,
    pub cookie: String,
    pub capabilities: Vec<String>,
}

impl HandshakeFrame {
    /// Check the frame against this host's expectations.
    ///
    /// Returns a human-readable reason on mismatch; the caller wraps it
    /// into its handshake error with the pack identity attached.
    pub fn verify(&self) -> std::result::Result<(), String> {
        if self.protocol_version != PROTOCOL_VERSION {
            return Err(format!(
                "protocol version mismatch: pack speaks {}, host speaks {}",
                self.protocol_version, PROTOCOL_VERSION
            ));
        }
        if self.cookie != COOKIE_VALUE {
            return Err("magic cookie mismatch: binary does not look like a service pack".into());
        }
        Ok(())
    }
}

/// Host → pack messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    Dispense { capability: String },
    Invoke { operation: String },
    Shutdown,
}

/// Pack → host messages (after the handshake line).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Dispensed {
        capability: String,
    },
    /// Outcome of an invoked operation. `error: None` means full success;
    /// a message means the pack's own probes found problems.
    Result {
        error: Option<String>,
    },
    Error {
        message: String,
    },
}

/// Parse the handshake line a pack wrote on stdout.
pub fn parse_handshake(line: &str) -> std::result::Result<HandshakeFrame, String> {
    serde_json::from_str(line.trim())
        .map_err(|e| format!("unparseable handshake line ({e}): {:?}", truncate(line, 120)))
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_well_formed_handshake() {
        let line = r#"{"protocol_version":1,"cookie":"packhost.servicepack","capabilities":["service_pack"]}"#;
        let frame = parse_handshake(line).unwrap();
        assert!(frame.verify().is_ok());
        assert_eq!(frame.capabilities, vec![SERVICE_PACK_CAPABILITY]);
    }

    #[test]
    fn rejects_version_mismatch() {
        let frame = HandshakeFrame {
            protocol_version: 2,
            cookie: COOKIE_VALUE.into(),
            capabilities: vec![],
        };
        let reason = frame.verify().unwrap_err();
        assert!(reason.contains("protocol version"));
    }

    #[test]
    fn rejects_foreign_cookie() {
        let frame = HandshakeFrame {
            protocol_version: PROTOCOL_VERSION,
            cookie: "someoneelse.plugin".into(),
            capabilities: vec![],
        };
        assert!(frame.verify().is_err());
    }

    #[test]
    fn rejects_noise_from_an_unrelated_binary() {
        // e.g. launching `ls` by mistake
        let err = parse_handshake("bin  lib  share").unwrap_err();
        assert!(err.contains("unparseable handshake"));
    }

    #[test]
    fn requests_serialize_with_a_type_tag() {
        let req = Request::Invoke {
            operation: RUN_PROBES_OPERATION.into(),
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"type":"invoke","operation":"run_probes"}"#);
    }
}
