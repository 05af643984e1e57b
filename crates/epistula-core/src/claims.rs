//! Best-effort, unverified decoding of bearer token claims.
//!
//! The token is a compact `header.payload.signature` string. Only the payload
//! is looked at, and the signature is never checked, so nothing decoded here
//! may be used to make a trust decision. The backend re-checks every request.
//! The claims are only good for gating what the UI *shows*.


use std::sync::LazyLock;

use data_encoding::Encoding;
use serde_json::{Map, Value};
use tracing::trace;

use crate::LOG_TARGET;

/// Keys holding the numeric user id, checked in order.
const USER_ID_KEYS: &[&str] = &["sub", "user_id", "uid"];

const ROOT_ROLE: &str = "root";

/// Standard base64 alphabet, without requiring padding and ignoring
/// non-zero trailing bits, matching what browsers' `atob` accepts.
static BASE64_FORGIVING: LazyLock<Encoding> = LazyLock::new(|| {
    let mut spec = data_encoding::BASE64.specification();
    spec.padding = None;
    spec.check_trailing_bits = false;
    spec.encoding().expect("Can't fail")
});

/// Claims read from a token payload, without any verification.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TokenClaims(Map<String, Value>);

impl TokenClaims {
    /// Decode the payload segment of `token`.
    ///
    /// Returns `None` on any failure: wrong segment count, invalid base64,
    /// invalid UTF-8 or a payload that is not a JSON object.
    pub fn decode(token: &str) -> Option<Self> {
        let mut segments = token.split('.');
        let (Some(_header), Some(payload), Some(_signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            trace!(target: LOG_TARGET, "Token does not have three segments");
            return None;
        };

        let bytes = decode_base64url(payload)?;
        let text = String::from_utf8(bytes)
            .inspect_err(|_| trace!(target: LOG_TARGET, "Token payload is not utf8"))
            .ok()?;

        serde_json::from_str::<Map<String, Value>>(&text)
            .inspect_err(|err| trace!(target: LOG_TARGET, %err, "Token payload is not a json object"))
            .ok()
            .map(Self)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// User id from the first of `sub`, `user_id`, `uid` that is present and
    /// not `null`, coerced to an integer.
    ///
    /// A value that does not coerce to a finite integer yields `None`; the
    /// chain does not move on to the next key in that case.
    pub fn user_id(&self) -> Option<i64> {
        USER_ID_KEYS
            .iter()
            .find_map(|key| self.0.get(*key).filter(|v| !v.is_null()))
            .and_then(coerce_to_integer)
    }

    /// `role == "root"`, or a truthy `is_root` flag.
    pub fn is_root(&self) -> bool {
        self.0.get("role").and_then(Value::as_str) == Some(ROOT_ROLE)
            || self.0.get("is_root").is_some_and(is_truthy)
    }
}

impl From<Map<String, Value>> for TokenClaims {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn decode_base64url(segment: &str) -> Option<Vec<u8>> {
    let standard: String = segment
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            c => c,
        })
        .collect();

    BASE64_FORGIVING
        .decode(standard.as_bytes())
        .inspect_err(|err| trace!(target: LOG_TARGET, %err, "Token payload is not base64"))
        .ok()
}

fn coerce_to_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(integral_f64_to_i64)),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral_f64_to_i64))
        }
        _ => None,
    }
}

fn integral_f64_to_i64(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
