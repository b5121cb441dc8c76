//! Opaque identifiers exposed to clients.
//!
//! An entity id crosses the API boundary as `base64("<TypeName>:<uuid>")`.
//! Tokens are decoded and type-checked before any lookup, so an event id can
//! never be used where an occurrence id is expected. List cursors use the
//! same encoding around `arrayconnection:<offset>`.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};

const CURSOR_PREFIX: &str = "arrayconnection";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Event,
    Occurrence,
    Venue,
    Child,
    Enrolment,
}

impl NodeType {
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeType::Event => "EventNode",
            NodeType::Occurrence => "OccurrenceNode",
            NodeType::Venue => "VenueNode",
            NodeType::Child => "ChildNode",
            NodeType::Enrolment => "EnrolmentNode",
        }
    }
}

pub fn to_global_id(node_type: NodeType, id: Uuid) -> String {
    STANDARD.encode(format!("{}:{}", node_type.type_name(), id))
}

pub fn from_global_id(node_type: NodeType, token: &str) -> DomainResult<Uuid> {
    let invalid = || {
        DomainError::validation(format!(
            "Invalid {} id: {}",
            node_type.type_name(),
            token
        ))
    };

    let decoded = STANDARD.decode(token.trim()).map_err(|_| invalid())?;
    let decoded = String::from_utf8(decoded).map_err(|_| invalid())?;
    let (type_name, raw_id) = decoded.split_once(':').ok_or_else(invalid)?;

    if type_name != node_type.type_name() {
        return Err(invalid());
    }

    Uuid::parse_str(raw_id).map_err(|_| invalid())
}

pub fn encode_cursor(offset: u64) -> String {
    STANDARD.encode(format!("{}:{}", CURSOR_PREFIX, offset))
}

pub fn decode_cursor(cursor: &str) -> DomainResult<u64> {
    let invalid = || DomainError::validation(format!("Invalid cursor: {}", cursor));

    let decoded = STANDARD.decode(cursor.trim()).map_err(|_| invalid())?;
    let decoded = String::from_utf8(decoded).map_err(|_| invalid())?;
    let offset: u64 = match decoded.split_once(':') {
        Some((CURSOR_PREFIX, offset)) => offset.parse().map_err(|_| invalid())?,
        _ => return Err(invalid()),
    };

    // The next page starts at offset + 1, which must still fit SQLite's i64 OFFSET.
    if offset >= i64::MAX as u64 {
        return Err(invalid());
    }
    Ok(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_id_matches_relay_format() {
        let id = Uuid::parse_str("6a6b2bd4-8a5f-4b8e-9d8e-3c7a2d9c1f00").unwrap();
        let token = to_global_id(NodeType::Occurrence, id);

        assert_eq!(
            STANDARD.decode(&token).unwrap(),
            b"OccurrenceNode:6a6b2bd4-8a5f-4b8e-9d8e-3c7a2d9c1f00"
        );
        assert_eq!(from_global_id(NodeType::Occurrence, &token).unwrap(), id);
    }

    #[test]
    fn test_global_id_rejects_wrong_type() {
        let token = to_global_id(NodeType::Event, Uuid::new_v4());
        let result = from_global_id(NodeType::Occurrence, &token);
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_global_id_rejects_garbage() {
        assert!(from_global_id(NodeType::Child, "not base64!").is_err());
        assert!(from_global_id(NodeType::Child, &STANDARD.encode("ChildNode")).is_err());
        assert!(from_global_id(NodeType::Child, &STANDARD.encode("ChildNode:42")).is_err());
    }

    #[test]
    fn test_cursor() {
        assert_eq!(decode_cursor(&encode_cursor(40)).unwrap(), 40);
        assert!(decode_cursor(&STANDARD.encode("offset:3")).is_err());
    }

    #[test]
    fn test_cursor_beyond_storage_range_is_rejected() {
        let last_valid = i64::MAX as u64 - 1;
        assert_eq!(decode_cursor(&encode_cursor(last_valid)).unwrap(), last_valid);

        for offset in [i64::MAX as u64, 1 << 63, u64::MAX] {
            let result = decode_cursor(&encode_cursor(offset));
            assert!(matches!(result, Err(DomainError::Validation(_))), "offset {}", offset);
        }
    }
}
