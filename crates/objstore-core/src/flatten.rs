//! Walks a live object graph into an ordered list of UUID-addressed records.

use crate::error::Result;
use crate::graph::{identity, FieldValue, Node, NodeRef, PreSerialize};
use crate::strategy::{NodeRecord, RecordValue, Strategy};
use crate::uuid_service::UuidService;
use indexmap::IndexMap;
use std::collections::{HashMap, VecDeque};
use uuid::Uuid;

/// One node's flattened record plus the uuid it was assigned.
pub struct FlattenedNode {
    pub uuid: Uuid,
    pub record: NodeRecord,
}

/// Breadth-first flattening of the graph rooted at `root`.
///
/// Returns the records in discovery order (root first); the caller
/// decides which to actually persist based on
/// [`crate::strategy::ChildWritePolicy`].
pub fn flatten(root: &NodeRef, strategy: &dyn Strategy, uuids: &UuidService) -> Result<Vec<FlattenedNode>> {
    let mut visited: HashMap<*const _, Uuid> = HashMap::new();
    let mut out = Vec::new();
    let mut queue = VecDeque::new();
    queue.push_back((NodeRef::clone(root), 0usize));

    // Assign the root's uuid up front so the first record can be emitted
    // with a stable identity even before its own fields are walked.
    let root_uuid = ensure_uuid(root, &mut visited, uuids)?;
    let _ = root_uuid;

    while let Some((node_ref, depth)) = queue.pop_front() {
        let node_uuid = ensure_uuid(&node_ref, &mut visited, uuids)?;
        node_ref.borrow_mut().pre_serialize();
        let node = node_ref.borrow();
        let record = flatten_fields(&node, depth, strategy, uuids, &mut visited, &mut queue)?;
        out.push(FlattenedNode {
            uuid: node_uuid,
            record,
        });
    }

    Ok(out)
}

fn ensure_uuid(
    node_ref: &NodeRef,
    visited: &mut HashMap<*const std::cell::RefCell<Node>, Uuid>,
    uuids: &UuidService,
) -> Result<Uuid> {
    let key = identity(node_ref);
    if let Some(existing) = visited.get(&key) {
        return Ok(*existing);
    }
    let uuid = node_ref.borrow().uuid.unwrap_or(uuids.generate()?);
    visited.insert(key, uuid);
    Ok(uuid)
}

fn flatten_fields(
    node: &Node,
    depth: usize,
    strategy: &dyn Strategy,
    uuids: &UuidService,
    visited: &mut HashMap<*const std::cell::RefCell<Node>, Uuid>,
    queue: &mut VecDeque<(NodeRef, usize)>,
) -> Result<NodeRecord> {
    let mut record = NodeRecord::new(node.class.clone());
    for (name, value) in &node.fields {
        let converted = flatten_value(value, depth, strategy, uuids, visited, queue)?;
        record.fields.insert(name.clone(), converted);
    }
    Ok(record)
}

fn flatten_value(
    value: &FieldValue,
    depth: usize,
    strategy: &dyn Strategy,
    uuids: &UuidService,
    visited: &mut HashMap<*const std::cell::RefCell<Node>, Uuid>,
    queue: &mut VecDeque<(NodeRef, usize)>,
) -> Result<RecordValue> {
    Ok(match value {
        FieldValue::Null => RecordValue::Null,
        FieldValue::Bool(b) => RecordValue::Bool(*b),
        FieldValue::Number(n) => RecordValue::Number(*n),
        FieldValue::String(s) => RecordValue::String(s.clone()),
        FieldValue::Array(items) => {
            let mut converted = Vec::with_capacity(items.len());
            for item in items {
                converted.push(flatten_value(item, depth, strategy, uuids, visited, queue)?);
            }
            RecordValue::Array(converted)
        }
        FieldValue::Map(fields) => {
            let mut converted = IndexMap::new();
            for (k, v) in fields {
                converted.insert(k.clone(), flatten_value(v, depth, strategy, uuids, visited, queue)?);
            }
            RecordValue::Map(converted)
        }
        FieldValue::Child(child) => {
            let child_depth = depth + 1;
            let key = identity(child);
            if let Some(existing_uuid) = visited.get(&key) {
                // Already assigned: either already enqueued or fully
                // inlined elsewhere. Either way a reference is safe
                // and avoids infinite recursion on a cycle.
                return Ok(RecordValue::Ref(*existing_uuid));
            }
            if child_depth <= strategy.max_depth() {
                let child_uuid = ensure_uuid(child, visited, uuids)?;
                queue.push_back((NodeRef::clone(child), child_depth));
                RecordValue::Ref(child_uuid)
            } else {
                // Past the depth bound: inline the child's own fields
                // in place rather than enqueuing a separate record.
                // `visited` is still consulted first above, so a cycle
                // reached only through an over-depth path still
                // resolves to a reference instead of looping forever.
                let child_uuid = ensure_uuid(child, visited, uuids)?;
                visited.insert(key, child_uuid);
                let borrowed = child.borrow();
                let mut fields = IndexMap::new();
                for (name, v) in &borrowed.fields {
                    fields.insert(
                        name.clone(),
                        flatten_value(v, child_depth, strategy, uuids, visited, queue)?,
                    );
                }
                RecordValue::Map(fields)
            }
        }
    })
}
