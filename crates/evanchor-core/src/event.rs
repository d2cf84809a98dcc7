//! # Event Data Model
//!
//! The immutable business event record and its target reference.
//!
//! ## Design Decision
//!
//! On the wire an event carries up to three mutually exclusive reference
//! fields (`thng`, `product`, `collection`), one per target kind. Rather
//! than letting downstream code duck-type on field presence, the ambiguity
//! is resolved exactly once via [`Event::target_ref()`] into a tagged
//! [`TargetRef`], and every subsequent store call works with the uniform
//! `(kind, id)` pair.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identity::{EventId, TargetId};

/// The kind of entity an event targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// An individual connected thing ("thng" in the platform's vocabulary).
    #[serde(rename = "thng")]
    Thing,
    /// A product definition.
    Product,
    /// A collection of things.
    Collection,
}

impl TargetKind {
    /// The platform's string form for this kind, as used in wire fields
    /// and store paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Thing => "thng",
            Self::Product => "product",
            Self::Collection => "collection",
        }
    }
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved reference to exactly one target entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetRef {
    /// Which kind of entity is referenced.
    pub kind: TargetKind,
    /// The entity's identifier.
    pub id: TargetId,
}

impl TargetRef {
    /// Build a reference from kind and id.
    pub fn new(kind: TargetKind, id: impl Into<TargetId>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl std::fmt::Display for TargetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

/// The event references no recognized target kind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("event {event_id} references no target")]
pub struct NoTargetError {
    /// The offending event.
    pub event_id: EventId,
}

/// An immutable business event, created by the external platform and
/// read-only to this stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique event identifier.
    pub id: EventId,
    /// The event's type tag.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Reference to a thing, if that is the target kind.
    #[serde(rename = "thng", default, skip_serializing_if = "Option::is_none")]
    pub thing: Option<TargetId>,
    /// Reference to a product, if that is the target kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<TargetId>,
    /// Reference to a collection, if that is the target kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<TargetId>,
    /// Arbitrary structured payload. Key order is semantically
    /// insignificant; canonicalization handles ordering before hashing.
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Event {
    /// Resolve which target entity this event references.
    ///
    /// At most one of the reference fields is set by the platform. If more
    /// than one is present the precedence is thing, then product, then
    /// collection, matching upstream behavior.
    ///
    /// # Errors
    ///
    /// [`NoTargetError`] if no reference field is set. Callers must treat
    /// this as fatal before performing any mutation.
    pub fn target_ref(&self) -> Result<TargetRef, NoTargetError> {
        let (kind, id) = if let Some(id) = &self.thing {
            (TargetKind::Thing, id)
        } else if let Some(id) = &self.product {
            (TargetKind::Product, id)
        } else if let Some(id) = &self.collection {
            (TargetKind::Collection, id)
        } else {
            return Err(NoTargetError {
                event_id: self.id.clone(),
            });
        };
        Ok(TargetRef {
            kind,
            id: id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_with(thing: Option<&str>, product: Option<&str>, collection: Option<&str>) -> Event {
        Event {
            id: EventId::new("e1"),
            event_type: "scans".to_string(),
            thing: thing.map(TargetId::from),
            product: product.map(TargetId::from),
            collection: collection.map(TargetId::from),
            payload: serde_json::json!({"x": 1}),
        }
    }

    #[test]
    fn resolves_thing_reference() {
        let event = event_with(Some("t1"), None, None);
        let target = event.target_ref().unwrap();
        assert_eq!(target.kind, TargetKind::Thing);
        assert_eq!(target.id.as_str(), "t1");
    }

    #[test]
    fn resolves_product_and_collection() {
        assert_eq!(
            event_with(None, Some("p1"), None).target_ref().unwrap().kind,
            TargetKind::Product
        );
        assert_eq!(
            event_with(None, None, Some("c1")).target_ref().unwrap().kind,
            TargetKind::Collection
        );
    }

    #[test]
    fn thing_takes_precedence_when_multiple_set() {
        let target = event_with(Some("t1"), Some("p1"), None).target_ref().unwrap();
        assert_eq!(target.kind, TargetKind::Thing);
    }

    #[test]
    fn no_reference_is_an_error() {
        let err = event_with(None, None, None).target_ref().unwrap_err();
        assert_eq!(err.event_id, EventId::new("e1"));
    }

    #[test]
    fn wire_field_names() {
        let event: Event = serde_json::from_value(serde_json::json!({
            "id": "e9",
            "type": "scans",
            "thng": "t9",
            "payload": {"x": 2}
        }))
        .unwrap();
        assert_eq!(event.thing.as_ref().unwrap().as_str(), "t9");
        let back = serde_json::to_value(&event).unwrap();
        assert_eq!(back["thng"], "t9");
        assert!(back.get("product").is_none());
    }

    #[test]
    fn target_ref_display() {
        let target = TargetRef::new(TargetKind::Thing, TargetId::new("t1"));
        assert_eq!(target.to_string(), "thng/t1");
    }
}
