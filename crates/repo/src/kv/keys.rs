//! Key layout and value codec for the embedded store.
//!
//! - `service:{uuid}` - Service by id
//! - `translation:{uuid}:{language}` - Translation of a service in one language
//!
//! Uuids are written hyphenated and lower-case, so key order matches uuid byte order.

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::errors::{RepoResult, RepositoryError};

pub const SERVICE_PREFIX: &str = "service:";
pub const TRANSLATION_PREFIX: &str = "translation:";

/// Schema: `service:{id}`
#[inline]
pub fn service(id: Uuid) -> String {
    format!("{SERVICE_PREFIX}{id}")
}

/// Schema: `translation:{service_id}:{language}`
#[inline]
pub fn translation(service_id: Uuid, language: &str) -> String {
    format!("{TRANSLATION_PREFIX}{service_id}:{language}")
}

/// Schema: `translation:{service_id}:`
#[inline]
pub fn translation_prefix(service_id: Uuid) -> String {
    format!("{TRANSLATION_PREFIX}{service_id}:")
}

pub fn encode<T: Serialize>(value: &T) -> RepoResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| RepositoryError::storage("encode value", e))
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> RepoResult<T> {
    serde_json::from_slice(bytes).map_err(|e| RepositoryError::storage("decode value", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Message, MessageStatus, Translation};

    #[test]
    fn key_schema() {
        let id = Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        assert_eq!(service(id), "service:67e55044-10b1-426f-9247-bb680e5fe0c8");
        assert_eq!(translation(id, "en-US"), "translation:67e55044-10b1-426f-9247-bb680e5fe0c8:en-US");
        assert!(translation(id, "lv").starts_with(&translation_prefix(id)));
    }

    #[test]
    fn prefix_does_not_match_other_services() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert!(!translation(b, "en").starts_with(&translation_prefix(a)));
    }

    #[test]
    fn codec_keeps_every_message_field() {
        let tr = Translation {
            language: "lv".into(),
            original: true,
            messages: vec![Message {
                id: "checkout.pay".into(),
                message: "Maksāt {amount}".into(),
                description: "Pay button".into(),
                positions: vec!["src/pay.tsx:12".into(), "src/cart.tsx:40".into()],
                status: MessageStatus::Fuzzy,
            }],
        };
        let decoded: Translation = decode(&encode(&tr).unwrap()).unwrap();
        assert_eq!(decoded, tr);
    }

    #[test]
    fn decode_garbage_is_storage_failure() {
        let err = decode::<Translation>(b"not json").unwrap_err();
        assert!(!err.is_not_found());
    }
}
