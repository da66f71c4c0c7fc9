//! Loads a root UUID back into a live, identity-preserving object graph.

use crate::error::{Error, Result};
use crate::graph::{FieldValue, Node, NodeRef, PostDeserialize};
use crate::strategy::{RecordValue, Strategy};
use indexmap::IndexMap;
use objstore_meta::{ClassRenameMap, ClassResolution};
use std::collections::HashMap;
use uuid::Uuid;

/// A class unknown to the caller's registry rehydrates under this name,
/// preserving every field as dynamic data for later class resurrection.
pub const PLACEHOLDER_CLASS: &str = "Placeholder";

/// Reads a record's raw bytes for a given uuid. Supplied by the
/// façade, which knows how to find and lock the sibling files; this
/// module only knows how to turn bytes into a live graph.
pub trait RecordSource {
    fn read_record(&self, uuid: Uuid) -> Result<Vec<u8>>;
}

/// Rehydrates the graph rooted at `root_uuid`, resolving child `Ref`
/// markers recursively and preserving identity: within one call, a
/// given uuid yields exactly one [`NodeRef`] no matter how many times
/// it's referenced.
pub fn rehydrate(
    root_uuid: Uuid,
    source: &dyn RecordSource,
    strategy: &dyn Strategy,
    renames: &ClassRenameMap,
    known_classes: &dyn Fn(&str) -> bool,
) -> Result<NodeRef> {
    let mut identity_map: HashMap<Uuid, NodeRef> = HashMap::new();
    load_node(root_uuid, source, strategy, renames, known_classes, &mut identity_map)
}

fn load_node(
    uuid: Uuid,
    source: &dyn RecordSource,
    strategy: &dyn Strategy,
    renames: &ClassRenameMap,
    known_classes: &dyn Fn(&str) -> bool,
    identity_map: &mut HashMap<Uuid, NodeRef>,
) -> Result<NodeRef> {
    if let Some(existing) = identity_map.get(&uuid) {
        return Ok(NodeRef::clone(existing));
    }

    let bytes = source.read_record(uuid)?;
    let record = strategy.deserialize(&bytes)?;

    let class = match renames.resolve(&record.class, known_classes) {
        ClassResolution::Known(name) | ClassResolution::Renamed(name) => name,
        ClassResolution::Unknown => PLACEHOLDER_CLASS.to_string(),
    };

    // Register the bare node before populating fields: this is what
    // makes a cycle resolve instead of recursing forever.
    let node_ref = Node::bare(class, uuid).wrap();
    identity_map.insert(uuid, NodeRef::clone(&node_ref));

    let mut fields = IndexMap::new();
    for (name, value) in record.fields {
        let resolved = load_value(value, source, strategy, renames, known_classes, identity_map)?;
        fields.insert(name, resolved);
    }
    node_ref.borrow_mut().fields = fields;
    node_ref.borrow_mut().post_deserialize();

    Ok(node_ref)
}

fn load_value(
    value: RecordValue,
    source: &dyn RecordSource,
    strategy: &dyn Strategy,
    renames: &ClassRenameMap,
    known_classes: &dyn Fn(&str) -> bool,
    identity_map: &mut HashMap<Uuid, NodeRef>,
) -> Result<FieldValue> {
    Ok(match value {
        RecordValue::Null => FieldValue::Null,
        RecordValue::Bool(b) => FieldValue::Bool(b),
        RecordValue::Number(n) => FieldValue::Number(n),
        RecordValue::String(s) => FieldValue::String(s),
        RecordValue::Array(items) => {
            let mut converted = Vec::with_capacity(items.len());
            for item in items {
                converted.push(load_value(item, source, strategy, renames, known_classes, identity_map)?);
            }
            FieldValue::Array(converted)
        }
        RecordValue::Map(fields) => {
            let mut converted = IndexMap::new();
            for (k, v) in fields {
                converted.insert(k, load_value(v, source, strategy, renames, known_classes, identity_map)?);
            }
            FieldValue::Map(converted)
        }
        RecordValue::Ref(child_uuid) => {
            let child = load_node(child_uuid, source, strategy, renames, known_classes, identity_map)?;
            FieldValue::Child(child)
        }
    })
}
