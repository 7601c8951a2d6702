use std::collections::HashMap;
use std::env;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{Filter, OrderBy, RemoteStore};
use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct FirestoreConfig {
    pub project_id: String,
    /// Web API key, passed as the `key` query parameter.
    pub api_key: Option<String>,
    /// Bearer token for authenticated access (the signed-in user's id token).
    pub id_token: Option<String>,
}

impl FirestoreConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let project_id = env::var("FIREBASE_PROJECT_ID")
            .map_err(|_| AppError::Validation("FIREBASE_PROJECT_ID is not set".to_string()))?;

        Ok(Self {
            project_id,
            api_key: env::var("FIREBASE_API_KEY").ok(),
            id_token: env::var("FIREBASE_ID_TOKEN").ok(),
        })
    }
}

/// Remote store backed by the Firestore REST API.
pub struct FirestoreClient {
    client: Client,
    config: FirestoreConfig,
    base_url: String,
}

impl FirestoreClient {
    pub fn new(config: FirestoreConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Transient(format!("failed to build http client: {e}")))?;
        let base_url = format!(
            "https://firestore.googleapis.com/v1/projects/{}/databases/(default)/documents",
            config.project_id
        );
        Ok(Self {
            client,
            config,
            base_url,
        })
    }

    fn doc_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.base_url, collection, id)
    }

    /// Splits a collection path into the runQuery parent document path and
    /// the leaf collection id (`users/u1/enrollments` queries collection
    /// `enrollments` under the parent `users/u1`).
    fn query_parent(&self, collection: &str) -> (String, String) {
        match collection.rfind('/') {
            Some(i) => (
                format!("{}/{}", self.base_url, &collection[..i]),
                collection[i + 1..].to_string(),
            ),
            None => (self.base_url.clone(), collection.to_string()),
        }
    }

    fn authorize(&self, mut request: RequestBuilder) -> RequestBuilder {
        if let Some(key) = &self.config.api_key {
            request = request.query(&[("key", key)]);
        }
        if let Some(token) = &self.config.id_token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }
        request
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, AppError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| AppError::Transient(format!("firestore request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Transient(format!(
                "Firestore API error {status}: {body}"
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl RemoteStore for FirestoreClient {
    async fn insert(&self, collection: &str, doc: Value) -> Result<String, AppError> {
        let url = format!("{}/{}", self.base_url, collection);
        let body = Document::from_json(&doc)?;
        let response = self.send(self.client.post(&url).json(&body)).await?;
        let created: Document = response
            .json()
            .await
            .map_err(|e| AppError::Transient(format!("failed to parse Firestore response: {e}")))?;
        Ok(created.doc_id().to_string())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, AppError> {
        let request = self.authorize(self.client.get(self.doc_url(collection, id)));
        let response = request
            .send()
            .await
            .map_err(|e| AppError::Transient(format!("firestore request failed: {e}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Transient(format!(
                "Firestore API error {status}: {body}"
            )));
        }

        let document: Document = response
            .json()
            .await
            .map_err(|e| AppError::Transient(format!("failed to parse Firestore response: {e}")))?;
        Ok(Some(document.into_json()))
    }

    async fn query(
        &self,
        collection: &str,
        filters: &[Filter],
        order_by: Option<OrderBy>,
    ) -> Result<Vec<Value>, AppError> {
        let (parent, collection_id) = self.query_parent(collection);
        let url = format!("{parent}:runQuery");

        let field_filters: Vec<Value> = filters
            .iter()
            .map(|f| {
                Ok(json!({
                    "fieldFilter": {
                        "field": { "fieldPath": f.field },
                        "op": "EQUAL",
                        "value": serde_json::to_value(FsValue::from_json(&f.equals))?,
                    }
                }))
            })
            .collect::<Result<_, serde_json::Error>>()?;

        let where_clause = match field_filters.len() {
            0 => None,
            1 => Some(field_filters.into_iter().next().unwrap_or_default()),
            _ => Some(json!({
                "compositeFilter": { "op": "AND", "filters": field_filters }
            })),
        };

        let request_body = RunQueryRequest {
            structured_query: StructuredQuery {
                from: vec![CollectionSelector { collection_id }],
                r#where: where_clause,
                order_by: order_by.map(|o| {
                    vec![json!({
                        "field": { "fieldPath": o.field },
                        "direction": if o.descending { "DESCENDING" } else { "ASCENDING" },
                    })]
                }),
            },
        };

        let response = self.send(self.client.post(&url).json(&request_body)).await?;
        let rows: Vec<RunQueryRow> = response
            .json()
            .await
            .map_err(|e| AppError::Transient(format!("failed to parse Firestore response: {e}")))?;

        Ok(rows
            .into_iter()
            .filter_map(|row| row.document)
            .map(Document::into_json)
            .collect())
    }

    async fn upsert(&self, collection: &str, id: &str, doc: Value) -> Result<(), AppError> {
        // PATCH without an update mask replaces the whole document, creating
        // it when absent.
        let body = Document::from_json(&doc)?;
        self.send(self.client.patch(self.doc_url(collection, id)).json(&body))
            .await?;
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), AppError> {
        let fields = patch
            .as_object()
            .ok_or_else(|| AppError::Validation("partial update must be an object".to_string()))?;
        let mask: Vec<(&str, String)> = fields
            .keys()
            .map(|key| ("updateMask.fieldPaths", key.clone()))
            .collect();

        let body = Document::from_json(&patch)?;
        self.send(
            self.client
                .patch(self.doc_url(collection, id))
                .query(&mask)
                .json(&body),
        )
        .await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), AppError> {
        self.send(self.client.delete(self.doc_url(collection, id)))
            .await?;
        Ok(())
    }
}

/// Firestore document resource: a `fields` map of typed values plus the
/// full resource name.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    name: String,
    #[serde(default)]
    fields: HashMap<String, FsValue>,
}

impl Document {
    fn from_json(doc: &Value) -> Result<Self, AppError> {
        let map = doc
            .as_object()
            .ok_or_else(|| AppError::Validation("document must be a JSON object".to_string()))?;
        Ok(Self {
            name: String::new(),
            fields: map
                .iter()
                .map(|(k, v)| (k.clone(), FsValue::from_json(v)))
                .collect(),
        })
    }

    /// Last path segment of the resource name.
    fn doc_id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    fn into_json(self) -> Value {
        let id = self.doc_id().to_string();
        let mut map = serde_json::Map::new();
        for (key, value) in self.fields {
            map.insert(key, value.into_json());
        }
        map.insert("id".to_string(), Value::String(id));
        Value::Object(map)
    }
}

/// Firestore's typed value union. Integers travel as strings on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
enum FsValue {
    #[serde(rename = "nullValue")]
    Null(()),
    #[serde(rename = "booleanValue")]
    Boolean(bool),
    #[serde(rename = "integerValue")]
    Integer(String),
    #[serde(rename = "doubleValue")]
    Double(f64),
    #[serde(rename = "stringValue")]
    Str(String),
    #[serde(rename = "timestampValue")]
    Timestamp(String),
    #[serde(rename = "arrayValue")]
    Array(FsArray),
    #[serde(rename = "mapValue")]
    Map(FsMap),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct FsArray {
    #[serde(default)]
    values: Vec<FsValue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct FsMap {
    #[serde(default)]
    fields: HashMap<String, FsValue>,
}

impl FsValue {
    fn from_json(value: &Value) -> FsValue {
        match value {
            Value::Null => FsValue::Null(()),
            Value::Bool(b) => FsValue::Boolean(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FsValue::Integer(i.to_string()),
                None => FsValue::Double(n.as_f64().unwrap_or(0.0)),
            },
            Value::String(s) => FsValue::Str(s.clone()),
            Value::Array(items) => FsValue::Array(FsArray {
                values: items.iter().map(FsValue::from_json).collect(),
            }),
            Value::Object(map) => FsValue::Map(FsMap {
                fields: map
                    .iter()
                    .map(|(k, v)| (k.clone(), FsValue::from_json(v)))
                    .collect(),
            }),
        }
    }

    fn into_json(self) -> Value {
        match self {
            FsValue::Null(()) => Value::Null,
            FsValue::Boolean(b) => Value::Bool(b),
            FsValue::Integer(s) => s
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or(Value::String(s)),
            FsValue::Double(f) => json!(f),
            FsValue::Str(s) | FsValue::Timestamp(s) => Value::String(s),
            FsValue::Array(array) => {
                Value::Array(array.values.into_iter().map(FsValue::into_json).collect())
            }
            FsValue::Map(map) => {
                let mut out = serde_json::Map::new();
                for (key, value) in map.fields {
                    out.insert(key, value.into_json());
                }
                Value::Object(out)
            }
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunQueryRequest {
    structured_query: StructuredQuery,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StructuredQuery {
    from: Vec<CollectionSelector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    r#where: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    order_by: Option<Vec<Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CollectionSelector {
    collection_id: String,
}

#[derive(Debug, Deserialize)]
struct RunQueryRow {
    #[serde(default)]
    document: Option<Document>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_round_trip_through_firestore_typing() {
        let doc = json!({
            "title": "CS101",
            "price": 15000,
            "rating": 4.8,
            "archived": false,
            "teacherId": null,
            "tags": ["intro", "cs"],
            "meta": { "weeks": 12 },
        });

        let encoded = Document::from_json(&doc).expect("encode");
        assert!(matches!(encoded.fields["price"], FsValue::Integer(_)));
        assert!(matches!(encoded.fields["rating"], FsValue::Double(_)));

        let mut decoded = encoded.into_json();
        decoded
            .as_object_mut()
            .and_then(|m| m.remove("id"))
            .expect("injected id");
        assert_eq!(decoded, doc);
    }

    #[test]
    fn document_id_is_last_name_segment() {
        let document = Document {
            name: "projects/p/databases/(default)/documents/courses/c1".to_string(),
            fields: HashMap::new(),
        };
        assert_eq!(document.doc_id(), "c1");
    }

    #[test]
    fn wire_shape_matches_rest_api() {
        let value = serde_json::to_value(FsValue::Str("x".to_string())).expect("encode");
        assert_eq!(value, json!({ "stringValue": "x" }));
        let value = serde_json::to_value(FsValue::Integer("5".to_string())).expect("encode");
        assert_eq!(value, json!({ "integerValue": "5" }));
    }
}
