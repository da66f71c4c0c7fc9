//! The pluggable serialization/checksum/depth/shard policy.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use objstore_fs::checksum::compute_bytes_checksum;
use serde_json::{Map, Value};
use uuid::Uuid;

/// How child records are written relative to the root being stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildWritePolicy {
    /// Every visited child is written, even if already on disk.
    Always,
    /// Only the root is written; children are assumed already persisted.
    Never,
    /// A child is written only if no record exists for its UUID yet.
    IfNotExist,
}

/// A flattened node ready for (or freshly read from) serialization:
/// the class name plus an ordered map of field values, where children
/// have already been replaced by [`RecordValue::Ref`] markers.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub class: String,
    pub fields: IndexMap<String, RecordValue>,
}

impl NodeRecord {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            fields: IndexMap::new(),
        }
    }
}

/// A field value as it appears in an on-disk object record.
///
/// Distinct from [`crate::graph::FieldValue`]: a live graph holds
/// `Child(NodeRef)`, a record holds `Ref(Uuid)` in its place.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<RecordValue>),
    Map(IndexMap<String, RecordValue>),
    Ref(Uuid),
}

const REF_KEY: &str = "$ref";

impl RecordValue {
    /// Converts to the JSON wire form, encoding a reference as the
    /// single-key marker object `{"$ref": "<uuid>"}`.
    pub fn to_json(&self) -> Value {
        match self {
            RecordValue::Null => Value::Null,
            RecordValue::Bool(b) => Value::Bool(*b),
            RecordValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            RecordValue::String(s) => Value::String(s.clone()),
            RecordValue::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            RecordValue::Map(fields) => {
                let mut map = Map::new();
                for (k, v) in fields {
                    map.insert(k.clone(), v.to_json());
                }
                Value::Object(map)
            }
            RecordValue::Ref(uuid) => {
                let mut map = Map::new();
                map.insert(REF_KEY.to_string(), Value::String(uuid.to_string()));
                Value::Object(map)
            }
        }
    }

    /// Parses a JSON value back into a [`RecordValue`], recognizing
    /// the single-key `{"$ref": "..."}` shape as a reference marker
    /// rather than a generic nested map.
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(RecordValue::Null),
            Value::Bool(b) => Ok(RecordValue::Bool(*b)),
            Value::Number(n) => Ok(RecordValue::Number(n.as_f64().ok_or_else(|| {
                Error::Serialization(format!("number field is not representable as f64: {n}"))
            })?)),
            Value::String(s) => Ok(RecordValue::String(s.clone())),
            Value::Array(items) => {
                let converted: Result<Vec<_>> = items.iter().map(Self::from_json).collect();
                Ok(RecordValue::Array(converted?))
            }
            Value::Object(map) => {
                if map.len() == 1 {
                    if let Some(Value::String(uuid_str)) = map.get(REF_KEY) {
                        let uuid = Uuid::parse_str(uuid_str)
                            .map_err(|e| Error::Serialization(format!("invalid $ref uuid: {e}")))?;
                        return Ok(RecordValue::Ref(uuid));
                    }
                }
                let mut fields = IndexMap::new();
                for (k, v) in map {
                    fields.insert(k.clone(), Self::from_json(v)?);
                }
                Ok(RecordValue::Map(fields))
            }
        }
    }
}

/// Policy injected into the engine: codec, checksum algorithm, depth
/// and shard bounds, and child-write/lifetime-inheritance behavior.
pub trait Strategy: Send + Sync {
    fn checksum_algorithm(&self) -> &'static str;
    fn serialize(&self, record: &NodeRecord) -> Result<Vec<u8>>;
    fn deserialize(&self, bytes: &[u8]) -> Result<NodeRecord>;
    fn checksum(&self, bytes: &[u8]) -> String;
    fn max_depth(&self) -> usize;
    fn shard_depth(&self) -> usize;
    fn child_write_policy(&self) -> ChildWritePolicy;
    /// Whether a stored child should inherit the root's TTL by default.
    /// `false` unless overridden per `store` call via `StoreOptions`.
    fn inherit_lifetime(&self) -> bool {
        false
    }
}

/// Default strategy: JSON codec, SHA-256 checksums, depth 64, shard
/// depth 2, children always written.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonStrategy;

impl Strategy for JsonStrategy {
    fn checksum_algorithm(&self) -> &'static str {
        "sha256"
    }

    fn serialize(&self, record: &NodeRecord) -> Result<Vec<u8>> {
        let mut fields = Map::new();
        for (k, v) in &record.fields {
            fields.insert(k.clone(), v.to_json());
        }
        let wire = serde_json::json!({
            "class": record.class,
            "fields": Value::Object(fields),
        });
        serde_json::to_vec(&wire).map_err(|e| Error::Serialization(e.to_string()))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<NodeRecord> {
        let wire: Value =
            serde_json::from_slice(bytes).map_err(|e| Error::Serialization(e.to_string()))?;
        let class = wire
            .get("class")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Serialization("missing class field".into()))?
            .to_string();
        let fields_value = wire
            .get("fields")
            .ok_or_else(|| Error::Serialization("missing fields map".into()))?;
        let Value::Object(raw_fields) = fields_value else {
            return Err(Error::Serialization("fields is not an object".into()));
        };
        let mut fields = IndexMap::new();
        for (k, v) in raw_fields {
            fields.insert(k.clone(), RecordValue::from_json(v)?);
        }
        Ok(NodeRecord { class, fields })
    }

    fn checksum(&self, bytes: &[u8]) -> String {
        compute_bytes_checksum(bytes)
    }

    fn max_depth(&self) -> usize {
        64
    }

    fn shard_depth(&self) -> usize {
        2
    }

    fn child_write_policy(&self) -> ChildWritePolicy {
        ChildWritePolicy::Always
    }
}

/// JSON codec and SHA-256 checksums like [`JsonStrategy`], but with
/// depth/shard/child-write settings taken from a loaded
/// [`crate::config::StoreConfig`] instead of hardcoded.
#[derive(Debug, Clone, Copy)]
pub struct ConfiguredJsonStrategy {
    max_depth: usize,
    shard_depth: usize,
    child_write_policy: ChildWritePolicy,
}

impl From<&crate::config::StoreConfig> for ConfiguredJsonStrategy {
    fn from(config: &crate::config::StoreConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            shard_depth: config.shard_depth,
            child_write_policy: config.child_write_policy.into(),
        }
    }
}

impl Strategy for ConfiguredJsonStrategy {
    fn checksum_algorithm(&self) -> &'static str {
        "sha256"
    }

    fn serialize(&self, record: &NodeRecord) -> Result<Vec<u8>> {
        JsonStrategy.serialize(record)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<NodeRecord> {
        JsonStrategy.deserialize(bytes)
    }

    fn checksum(&self, bytes: &[u8]) -> String {
        compute_bytes_checksum(bytes)
    }

    fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn shard_depth(&self) -> usize {
        self.shard_depth
    }

    fn child_write_policy(&self) -> ChildWritePolicy {
        self.child_write_policy
    }
}
