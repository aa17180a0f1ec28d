use super::{send_json, ApiError, ApiResult, FirebaseAuth, NoteStore};
use crate::config::FirebaseConfig;
use crate::models::{NewNote, Note, NoteUpdate};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use std::sync::Arc;

pub(crate) const NOTES_COLLECTION: &str = "notes";

/// Fields overwritten by an update, in `updateMask` order.
const UPDATE_MASK: [&str; 5] = ["title", "content", "tags", "color", "updatedAt"];

/// Firestore REST client for the `notes` collection. Requests carry the
/// current session's id token.
#[derive(Clone)]
pub(crate) struct FirestoreNotes {
    config: Arc<FirebaseConfig>,
    auth: FirebaseAuth,
}

impl FirestoreNotes {
    pub fn new(config: Arc<FirebaseConfig>, auth: FirebaseAuth) -> Self {
        Self { config, auth }
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.config.documents_url(), NOTES_COLLECTION)
    }

    fn document_url(&self, id: &str) -> String {
        format!("{}/{}", self.collection_url(), urlencoding::encode(id))
    }

    async fn token(&self) -> ApiResult<String> {
        self.auth.active_session().await.map(|s| s.id_token)
    }
}

impl NoteStore for FirestoreNotes {
    async fn add(&self, note: &NewNote) -> ApiResult<String> {
        let token = self.token().await?;
        let req = reqwest::Client::new()
            .post(self.collection_url())
            .json(&json!({ "fields": encode_new_note(note) }));

        let data = send_json(req, Some(&token)).await?;
        let id = data
            .get("name")
            .and_then(|v| v.as_str())
            .map(document_id)
            .unwrap_or_default();

        if id.trim().is_empty() {
            return Err(ApiError::parse(format!(
                "Create note succeeded but response is missing the document name: {}",
                data
            )));
        }
        Ok(id)
    }

    async fn update(&self, id: &str, update: &NoteUpdate) -> ApiResult<()> {
        let token = self.token().await?;
        let mut query: Vec<(&str, &str)> = UPDATE_MASK
            .iter()
            .map(|field| ("updateMask.fieldPaths", *field))
            .collect();
        query.push(("currentDocument.exists", "true"));

        let req = reqwest::Client::new()
            .patch(self.document_url(id))
            .query(&query)
            .json(&json!({ "fields": encode_update(update) }));

        send_json(req, Some(&token)).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> ApiResult<()> {
        let token = self.token().await?;
        let req = reqwest::Client::new().delete(self.document_url(id));
        send_json(req, Some(&token)).await?;
        Ok(())
    }

    async fn list_for_user(&self, user_id: &str) -> ApiResult<Vec<Note>> {
        let token = self.token().await?;
        let req = reqwest::Client::new()
            .post(format!("{}:runQuery", self.config.documents_url()))
            .json(&notes_by_owner_query(user_id));

        let data = send_json(req, Some(&token)).await?;
        Ok(parse_run_query_response(&data))
    }
}

/// `where userId == user_id order by updatedAt desc`.
pub(crate) fn notes_by_owner_query(user_id: &str) -> Value {
    json!({
        "structuredQuery": {
            "from": [{ "collectionId": NOTES_COLLECTION }],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": "userId" },
                    "op": "EQUAL",
                    "value": { "stringValue": user_id }
                }
            },
            "orderBy": [{
                "field": { "fieldPath": "updatedAt" },
                "direction": "DESCENDING"
            }]
        }
    })
}

fn string_value(s: &str) -> Value {
    json!({ "stringValue": s })
}

fn tags_value(tags: &[String]) -> Value {
    let values: Vec<Value> = tags.iter().map(|t| string_value(t)).collect();
    json!({ "arrayValue": { "values": values } })
}

fn timestamp_value(t: &DateTime<Utc>) -> Value {
    json!({ "timestampValue": t.to_rfc3339_opts(SecondsFormat::Micros, true) })
}

pub(crate) fn encode_new_note(note: &NewNote) -> Value {
    json!({
        "userId": string_value(&note.user_id),
        "title": string_value(&note.title),
        "content": string_value(&note.content),
        "tags": tags_value(&note.tags),
        "color": string_value(&note.color),
        "createdAt": timestamp_value(&note.created_at),
        "updatedAt": timestamp_value(&note.updated_at),
    })
}

pub(crate) fn encode_update(update: &NoteUpdate) -> Value {
    json!({
        "title": string_value(&update.title),
        "content": string_value(&update.content),
        "tags": tags_value(&update.tags),
        "color": string_value(&update.color),
        "updatedAt": timestamp_value(&update.updated_at),
    })
}

/// Last path segment of a document resource name.
pub(crate) fn document_id(name: &str) -> String {
    name.rsplit('/').next().unwrap_or_default().to_string()
}

pub(crate) fn decode_document(doc: &Value) -> Option<Note> {
    let id = doc.get("name").and_then(|v| v.as_str()).map(document_id)?;
    if id.trim().is_empty() {
        return None;
    }

    let empty = Map::new();
    let fields = doc
        .get("fields")
        .and_then(|f| f.as_object())
        .unwrap_or(&empty);

    let get_s = |k: &str| {
        fields
            .get(k)
            .and_then(|v| v.get("stringValue"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_default()
    };
    let get_ts = |k: &str| {
        fields
            .get(k)
            .and_then(|v| v.get("timestampValue"))
            .and_then(|v| v.as_str())
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc))
    };

    let tags = fields
        .get("tags")
        .and_then(|v| v.get("arrayValue"))
        .and_then(|v| v.get("values"))
        .and_then(|v| v.as_array())
        .map(|values| {
            values
                .iter()
                .filter_map(|v| v.get("stringValue").and_then(|s| s.as_str()))
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default();

    Some(Note {
        id,
        user_id: get_s("userId"),
        title: get_s("title"),
        content: get_s("content"),
        tags,
        color: get_s("color"),
        created_at: get_ts("createdAt"),
        updated_at: get_ts("updatedAt"),
    })
}

/// `runQuery` streams one row per match; rows without a `document`
/// (e.g. the lone `readTime` row of an empty result) are skipped.
pub(crate) fn parse_run_query_response(data: &Value) -> Vec<Note> {
    data.as_array()
        .map(|rows| {
            rows.iter()
                .filter_map(|row| row.get("document"))
                .filter_map(decode_document)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, h, m, 0).unwrap()
    }

    #[test]
    fn test_encode_new_note_sets_owner_and_both_timestamps() {
        let fields = encode_new_note(&NewNote {
            user_id: "uid-1".to_string(),
            title: "Shop".to_string(),
            content: "Milk".to_string(),
            tags: vec!["food".to_string(), "home".to_string()],
            color: "#ffcc00".to_string(),
            created_at: at(9, 0),
            updated_at: at(9, 0),
        });

        assert_eq!(fields["userId"]["stringValue"], "uid-1");
        assert_eq!(fields["tags"]["arrayValue"]["values"][1]["stringValue"], "home");
        assert_eq!(fields["createdAt"]["timestampValue"], "2026-03-01T09:00:00.000000Z");
        assert_eq!(fields["updatedAt"], fields["createdAt"]);
    }

    #[test]
    fn test_encode_update_leaves_owner_and_created_at_alone() {
        let fields = encode_update(&NoteUpdate {
            title: "Shop".to_string(),
            content: "Milk, eggs".to_string(),
            tags: vec![],
            color: "#ffffff".to_string(),
            updated_at: at(10, 30),
        });

        let obj = fields.as_object().expect("object");
        assert!(!obj.contains_key("userId"));
        assert!(!obj.contains_key("createdAt"));
        let mut keys: Vec<&str> = obj.keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        let mut mask = UPDATE_MASK.to_vec();
        mask.sort_unstable();
        assert_eq!(keys, mask);
        assert_eq!(fields["tags"]["arrayValue"]["values"], json!([]));
    }

    #[test]
    fn test_owner_query_filters_and_orders() {
        let q = notes_by_owner_query("uid-1");
        let sq = &q["structuredQuery"];
        assert_eq!(sq["from"][0]["collectionId"], "notes");
        assert_eq!(sq["where"]["fieldFilter"]["op"], "EQUAL");
        assert_eq!(sq["where"]["fieldFilter"]["value"]["stringValue"], "uid-1");
        assert_eq!(sq["orderBy"][0]["field"]["fieldPath"], "updatedAt");
        assert_eq!(sq["orderBy"][0]["direction"], "DESCENDING");
    }

    #[test]
    fn test_document_id_is_last_segment() {
        assert_eq!(
            document_id("projects/p/databases/(default)/documents/notes/abc123"),
            "abc123"
        );
        assert_eq!(document_id("abc"), "abc");
    }

    #[test]
    fn test_parse_run_query_response_keeps_order_and_skips_bare_rows() {
        let data = json!([
            {
                "document": {
                    "name": "projects/p/databases/(default)/documents/notes/n2",
                    "fields": {
                        "userId": { "stringValue": "uid-1" },
                        "title": { "stringValue": "Newer" },
                        "content": { "stringValue": "" },
                        "tags": { "arrayValue": { "values": [
                            { "stringValue": "a" }, { "stringValue": "b" }
                        ] } },
                        "color": { "stringValue": "#ffcc00" },
                        "createdAt": { "timestampValue": "2026-03-01T09:00:00.123456Z" },
                        "updatedAt": { "timestampValue": "2026-03-01T10:00:00Z" }
                    }
                },
                "readTime": "2026-03-01T10:00:01Z"
            },
            {
                "document": {
                    "name": "projects/p/databases/(default)/documents/notes/n1",
                    "fields": {
                        "userId": { "stringValue": "uid-1" },
                        "content": { "stringValue": "legacy note" },
                        "tags": { "arrayValue": {} }
                    }
                }
            },
            { "readTime": "2026-03-01T10:00:01Z" }
        ]);

        let notes = parse_run_query_response(&data);
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].id, "n2");
        assert_eq!(notes[0].tags, vec!["a", "b"]);
        assert_eq!(notes[0].updated_at, Some(at(10, 0)));
        assert_eq!(notes[1].id, "n1");
        assert_eq!(notes[1].title, "");
        assert!(notes[1].tags.is_empty());
        assert!(notes[1].updated_at.is_none());
        assert_eq!(notes[1].display_color(), "#ffffff");
    }

    #[test]
    fn test_parse_run_query_response_empty_result() {
        assert!(parse_run_query_response(&json!([{ "readTime": "2026-03-01T10:00:01Z" }])).is_empty());
        assert!(parse_run_query_response(&Value::Null).is_empty());
    }
}
