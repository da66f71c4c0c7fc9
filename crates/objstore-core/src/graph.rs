//! In-memory object graph: nodes, fields, and the identity they carry.

use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;
use uuid::Uuid;

/// A reference-counted, mutably-shared node. Pointer identity
/// (`Rc::as_ptr`) stands in for object identity during flattening and
/// rehydration, the way the source system uses object identity for
/// cycle detection.
pub type NodeRef = Rc<RefCell<Node>>;

/// A single graph node: a class name, an optional pre-assigned UUID,
/// and an ordered map of named field values.
#[derive(Debug, Clone)]
pub struct Node {
    pub class: String,
    pub uuid: Option<Uuid>,
    pub fields: IndexMap<String, FieldValue>,
}

impl Node {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            uuid: None,
            fields: IndexMap::new(),
        }
    }

    /// A node with no fields yet, registered under a known uuid and
    /// class before its fields are populated. Used by the rehydrator
    /// to break cycles: the node exists in the identity map before
    /// any field references it.
    pub fn bare(class: impl Into<String>, uuid: Uuid) -> Self {
        Self {
            class: class.into(),
            uuid: Some(uuid),
            fields: IndexMap::new(),
        }
    }

    pub fn set(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    pub fn wrap(self) -> NodeRef {
        Rc::new(RefCell::new(self))
    }
}

/// A field value within a node. `Child` holds a live reference to
/// another node; every other variant is data the strategy can
/// serialize directly.
#[derive(Debug, Clone)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<FieldValue>),
    Map(IndexMap<String, FieldValue>),
    Child(NodeRef),
}

/// Identity of a `NodeRef` for visited-map purposes: the address the
/// `Rc` points at, stable for the node's lifetime.
pub fn identity(node: &NodeRef) -> *const RefCell<Node> {
    Rc::as_ptr(node)
}

/// Hook invoked on a node immediately before it is flattened into a
/// record. Classes with no preparation step need not implement it;
/// the flattener treats its absence as a no-op.
pub trait PreSerialize {
    fn pre_serialize(&mut self) {}
}

/// Hook invoked on a node immediately after its fields are populated
/// during rehydration.
pub trait PostDeserialize {
    fn post_deserialize(&mut self) {}
}

// `Node` is the one concrete node type this engine materializes; it
// carries both hooks via their no-op defaults so the flattener and
// rehydrator always have something to call, whether or not a given
// class cares about the lifecycle events.
impl PreSerialize for Node {}
impl PostDeserialize for Node {}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counting {
        pre_calls: u32,
        post_calls: u32,
    }

    impl PreSerialize for Counting {
        fn pre_serialize(&mut self) {
            self.pre_calls += 1;
        }
    }

    impl PostDeserialize for Counting {
        fn post_deserialize(&mut self) {
            self.post_calls += 1;
        }
    }

    #[test]
    fn hooks_are_overridable_and_default_to_a_no_op() {
        let mut counting = Counting {
            pre_calls: 0,
            post_calls: 0,
        };
        counting.pre_serialize();
        counting.post_deserialize();
        assert_eq!(counting.pre_calls, 1);
        assert_eq!(counting.post_calls, 1);

        // Node relies on the trait defaults: calling the hooks must not panic
        // and must leave the node otherwise untouched.
        let mut node = Node::new("User");
        node.set("name", FieldValue::String("Ada".into()));
        node.pre_serialize();
        node.post_deserialize();
        assert_eq!(node.fields.len(), 1);
    }

    #[test]
    fn identity_is_stable_across_clones_of_the_rc() {
        let node = Node::new("User").wrap();
        let clone = Rc::clone(&node);
        assert_eq!(identity(&node), identity(&clone));
    }

    #[test]
    fn distinct_nodes_have_distinct_identity() {
        let a = Node::new("User").wrap();
        let b = Node::new("User").wrap();
        assert_ne!(identity(&a), identity(&b));
    }

    #[test]
    fn set_overwrites_existing_field_in_place() {
        let mut node = Node::new("User");
        node.set("name", FieldValue::String("a".into()));
        node.set("name", FieldValue::String("b".into()));
        assert_eq!(node.fields.len(), 1);
    }
}
