use serde::Serialize;
use serde_json::{Map, Value};

use crate::utils::date;

/// Caller-supplied event fields. Key order is preserved.
pub type Fields = Map<String, Value>;

/// Field holding the event start timestamp.
pub const START_FIELD: &str = "start";

/// Key under which the document identifier is exposed to clients.
pub const ID_FIELD: &str = "id";

/// A document as returned by the store: identifier plus stored fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

/// Response shape for an event: stored fields followed by `id`.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    #[serde(flatten)]
    pub fields: Fields,
    pub id: String,
}

impl Event {
    /// Attach an identifier to a set of fields without touching their values.
    pub fn new(id: String, mut fields: Fields) -> Self {
        fields.remove(ID_FIELD);
        Self { fields, id }
    }

    /// Build the listing view of a stored document, with `start` reformatted.
    pub fn from_document(doc: Document) -> Self {
        let Document { id, mut fields } = doc;

        if let Some(start) = fields.get_mut(START_FIELD) {
            match date::format_start(start) {
                Some(formatted) => *start = Value::String(formatted),
                None => {
                    tracing::warn!("Event {} has an unrecognised start value: {}", id, start);
                }
            }
        }

        Self::new(id, fields)
    }
}

/// Remove any `id` key so it is never persisted as a field.
pub fn strip_id(mut fields: Fields) -> Fields {
    fields.remove(ID_FIELD);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn serializes_fields_then_id() {
        let event = Event::new(
            "abc".to_string(),
            fields(json!({"title": "Meetup", "start": "2024-01-15T10:30:00Z"})),
        );
        assert_eq!(
            serde_json::to_string(&event).unwrap(),
            r#"{"title":"Meetup","start":"2024-01-15T10:30:00Z","id":"abc"}"#
        );
    }

    #[test]
    fn listing_view_reformats_start() {
        let event = Event::from_document(Document {
            id: "abc".to_string(),
            fields: fields(json!({"title": "Meetup", "start": "2024-01-15T10:30:00Z"})),
        });
        assert_eq!(event.fields["start"], json!("2024-01-15T10:30:00"));
        assert_eq!(event.fields["title"], json!("Meetup"));
    }

    #[test]
    fn listing_view_keeps_unparseable_start_and_missing_start() {
        let event = Event::from_document(Document {
            id: "a".to_string(),
            fields: fields(json!({"start": "soon"})),
        });
        assert_eq!(event.fields["start"], json!("soon"));

        let event = Event::from_document(Document {
            id: "b".to_string(),
            fields: fields(json!({"title": "No date"})),
        });
        assert!(!event.fields.contains_key("start"));
    }

    #[test]
    fn stored_id_field_never_shadows_document_id() {
        let event = Event::from_document(Document {
            id: "real".to_string(),
            fields: fields(json!({"id": "fake", "title": "x"})),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["id"], json!("real"));
    }

    #[test]
    fn strip_id_removes_only_id() {
        let stripped = strip_id(fields(json!({"id": "x", "title": "t"})));
        assert_eq!(Value::Object(stripped), json!({"title": "t"}));
    }
}
