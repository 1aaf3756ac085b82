// Opaque, tamper-evident pagination cursors.
//
// Format: base64url(json payload) "." base64url(HMAC-SHA256(payload))
// The payload carries the last-seen sort key, never a raw offset.

use crate::error::{ConfigError, CursorError};
use crate::models::{FeedSort, PostId};
use crate::services::ranking::SortKey;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const CURSOR_VERSION: u8 = 1;

/// Sort value travels as raw bits so the decoded key compares exactly equal
#[derive(Debug, Serialize, Deserialize)]
struct CursorPayload {
    v: u8,
    sort: FeedSort,
    value_bits: u64,
    engagement_total: u64,
    created_at_ms: i64,
    id: PostId,
}

impl CursorPayload {
    fn new(sort: FeedSort, key: &SortKey) -> Self {
        Self {
            v: CURSOR_VERSION,
            sort,
            value_bits: key.value.to_bits(),
            engagement_total: key.engagement_total,
            created_at_ms: key.created_at_ms,
            id: key.id.clone(),
        }
    }

    fn into_key(self) -> SortKey {
        SortKey {
            value: f64::from_bits(self.value_bits),
            engagement_total: self.engagement_total,
            created_at_ms: self.created_at_ms,
            id: self.id,
        }
    }
}

/// Signs and verifies cursors with a server-side secret
#[derive(Clone)]
pub struct CursorCodec {
    mac: HmacSha256,
}

impl std::fmt::Debug for CursorCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorCodec").finish_non_exhaustive()
    }
}

impl CursorCodec {
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, ConfigError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(ConfigError::EmptyCursorSecret);
        }
        let mac = HmacSha256::new_from_slice(secret).map_err(|_| ConfigError::EmptyCursorSecret)?;
        Ok(Self { mac })
    }

    pub fn encode(&self, sort: FeedSort, key: &SortKey) -> Result<String, CursorError> {
        let payload = CursorPayload::new(sort, key);
        let json = serde_json::to_vec(&payload).map_err(|e| CursorError::Payload(e.to_string()))?;

        let mut mac = self.mac.clone();
        mac.update(&json);
        let signature = mac.finalize().into_bytes();

        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&json),
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    /// Verify and decode a cursor issued for `sort`
    pub fn decode(&self, token: &str, sort: FeedSort) -> Result<SortKey, CursorError> {
        let (payload_b64, signature_b64) = token
            .split_once('.')
            .ok_or_else(|| CursorError::Encoding("missing signature segment".to_string()))?;

        let json = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|e| CursorError::Encoding(e.to_string()))?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|e| CursorError::Encoding(e.to_string()))?;

        // Constant-time comparison
        let mut mac = self.mac.clone();
        mac.update(&json);
        mac.verify_slice(&signature)
            .map_err(|_| CursorError::Signature)?;

        let payload: CursorPayload =
            serde_json::from_slice(&json).map_err(|e| CursorError::Payload(e.to_string()))?;

        if payload.v != CURSOR_VERSION {
            return Err(CursorError::Version(payload.v));
        }
        if payload.sort != sort {
            return Err(CursorError::SortMismatch {
                issued: payload.sort.as_str(),
                requested: sort.as_str(),
            });
        }

        Ok(payload.into_key())
    }
}
