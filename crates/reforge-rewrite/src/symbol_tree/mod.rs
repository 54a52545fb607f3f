//! The symbol tree: a mutable representation of one network class.
//!
//! Parsers populate a tree through a small contract (`set_class_ast`,
//! `set_imports`, `push_class_item`, `set_forward`, `append_node`). Once
//! populated, the forward method's statements are IR [`Node`]s in body order
//! that can be inserted, erased and replaced before the class is regenerated.

mod names;
mod namer;
mod node;
mod order;
mod regenerate;

use reforge_syntax::{Param, SyntaxNode};
use rustc_hash::FxHashMap;

use crate::error::{Result, RewriteError};
use crate::network::Network;

pub use names::{analyze_statement, free_names};
pub use namer::Namer;
pub use node::{Branches, Node, NodeId, NodeType};

/// A member of the class body, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassItem {
    /// A method or class-level statement carried over unchanged
    Verbatim(SyntaxNode),
    /// Slot of the forward method, regenerated from the IR nodes
    Forward,
}

/// Signature of the forward method. Its parameters other than the receiver
/// live on as Input nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardDef {
    pub name: String,
    /// The receiver, `self`, when the method has one
    pub receiver: Option<Param>,
    pub returns: Option<SyntaxNode>,
    pub decorators: Vec<SyntaxNode>,
}

pub struct SymbolTree<'net> {
    origin: &'net dyn Network,
    module_ast: Option<SyntaxNode>,
    class_ast: Option<SyntaxNode>,
    imports: Vec<SyntaxNode>,
    class_items: Vec<ClassItem>,
    forward: Option<ForwardDef>,
    nodes: FxHashMap<NodeId, Node>,
    order: Vec<NodeId>,
    next_id: u32,
    node_names: Namer,
    variables: Namer,
}

impl<'net> SymbolTree<'net> {
    pub fn new(origin: &'net dyn Network) -> Self {
        Self {
            origin,
            module_ast: None,
            class_ast: None,
            imports: Vec::new(),
            class_items: Vec::new(),
            forward: None,
            nodes: FxHashMap::default(),
            order: Vec::new(),
            next_id: 0,
            node_names: Namer::new(),
            variables: Namer::new(),
        }
    }

    pub fn origin_network(&self) -> &'net dyn Network {
        self.origin
    }

    /// Records the class this tree represents. The last write wins.
    pub fn set_class_ast(&mut self, class: SyntaxNode) {
        for name in free_names(&class) {
            self.variables.reserve(&name);
        }
        self.class_ast = Some(class);
    }

    pub fn class_ast(&self) -> Option<&SyntaxNode> {
        self.class_ast.as_ref()
    }

    pub fn set_module_ast(&mut self, module: SyntaxNode) {
        self.module_ast = Some(module);
    }

    /// The module as augmented with the canonical and recovered imports.
    pub fn module_ast(&self) -> Option<&SyntaxNode> {
        self.module_ast.as_ref()
    }

    pub fn set_imports(&mut self, imports: Vec<SyntaxNode>) {
        self.imports = imports;
    }

    pub fn imports(&self) -> &[SyntaxNode] {
        &self.imports
    }

    pub fn push_class_item(&mut self, item: ClassItem) {
        self.class_items.push(item);
    }

    pub fn class_items(&self) -> &[ClassItem] {
        &self.class_items
    }

    pub fn set_forward(&mut self, forward: ForwardDef) {
        self.forward = Some(forward);
    }

    pub fn forward(&self) -> Option<&ForwardDef> {
        self.forward.as_ref()
    }

    /// A variable name not used anywhere in the class, derived from `base`.
    pub fn fresh_variable(&mut self, base: &str) -> String {
        self.variables.unique(base)
    }

    /// Gives a detached node its id and a unique name.
    pub(crate) fn adopt(&mut self, node: &mut Node) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        node.id = Some(id);
        node.name = self.node_names.unique(&node.name);
        for target in node.targets() {
            self.variables.reserve(target);
        }
        id
    }

    fn insert_at(&mut self, index: usize, mut node: Node) -> NodeId {
        let id = self.adopt(&mut node);
        self.nodes.insert(id, node);
        self.order.insert(index, id);
        id
    }

    /// Appends a node at the end of the body.
    pub fn append_node(&mut self, node: Node) -> NodeId {
        self.insert_at(self.order.len(), node)
    }

    fn position(&self, id: NodeId) -> Result<usize> {
        self.order
            .iter()
            .position(|&candidate| candidate == id)
            .ok_or_else(|| RewriteError::NodeNotFound(id.to_string()))
    }

    pub fn insert_before(&mut self, anchor: NodeId, node: Node) -> Result<NodeId> {
        let index = self.position(anchor)?;
        Ok(self.insert_at(index, node))
    }

    pub fn insert_after(&mut self, anchor: NodeId, node: Node) -> Result<NodeId> {
        let index = self.position(anchor)?;
        Ok(self.insert_at(index + 1, node))
    }

    /// Removes a node that no other node depends on.
    pub fn erase_node(&mut self, id: NodeId) -> Result<Node> {
        let index = self.position(id)?;
        if let Some(user) = self.users(id).first() {
            return Err(RewriteError::NodeInUse {
                node: self.nodes[&id].name.clone(),
                user: self.nodes[user].name.clone(),
            });
        }
        Ok(self.remove_at(index))
    }

    fn remove_at(&mut self, index: usize) -> Node {
        let id = self.order.remove(index);
        match self.nodes.remove(&id) {
            Some(node) => {
                self.node_names.release(&node.name);
                log::debug!("Erased node {} ({})", node.name, id);
                node
            }
            None => unreachable!("body order refers to a live node"),
        }
    }

    /// Replaces a node by `nodes`, placed at its position in order. Users of
    /// the old node are not checked; the replacement is expected to bind the
    /// same names.
    pub fn replace_node(&mut self, id: NodeId, nodes: Vec<Node>) -> Result<Vec<NodeId>> {
        let index = self.position(id)?;
        self.remove_at(index);
        Ok(nodes
            .into_iter()
            .enumerate()
            .map(|(offset, node)| self.insert_at(index + offset, node))
            .collect())
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Looks up a body node by name. Nodes nested in control flow are not
    /// searched.
    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes().find(|node| node.name == name)
    }

    /// Body nodes in order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    pub fn node_ids(&self) -> &[NodeId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl std::fmt::Debug for SymbolTree<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymbolTree")
            .field("network", &self.origin.class_name())
            .field("imports", &self.imports.len())
            .field("class_items", &self.class_items)
            .field("nodes", &self.nodes().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::NetworkDef;

    fn network() -> NetworkDef {
        NetworkDef::without_source("Net")
    }

    #[test]
    fn appended_nodes_keep_order_and_get_unique_names() {
        let net = network();
        let mut tree = SymbolTree::new(&net);
        let a = tree.append_node(Node::call_cell(&["x"], "conv", &["x"]));
        let b = tree.append_node(Node::call_cell(&["x"], "conv", &["x"]));
        assert_eq!(tree.node_ids(), [a, b]);
        let names: Vec<_> = tree.nodes().map(Node::name).collect();
        assert_eq!(names, ["conv", "conv_1"]);
        assert_eq!(tree.node_by_name("conv_1").and_then(Node::id), Some(b));
    }

    #[test]
    fn insert_relative_to_anchor() {
        let net = network();
        let mut tree = SymbolTree::new(&net);
        let first = tree.append_node(Node::call_function(&["y"], "ops.relu", &["x"]));
        let last = tree.append_node(Node::call_function(&["z"], "ops.relu", &["y"]));
        let before = tree.insert_before(first, Node::call_function(&["x"], "ops.ones", &[])).unwrap();
        let after = tree.insert_after(first, Node::call_function(&["w"], "ops.relu", &["y"])).unwrap();
        assert_eq!(tree.node_ids(), [before, first, after, last]);
    }

    #[test]
    fn erase_refuses_nodes_in_use() {
        let net = network();
        let mut tree = SymbolTree::new(&net);
        let producer = tree.append_node(Node::call_cell(&["y"], "fc", &["x"]));
        let consumer = tree.append_node(Node::call_cell(&["z"], "fc", &["y"]));
        match tree.erase_node(producer) {
            Err(RewriteError::NodeInUse { node, user }) => {
                assert_eq!(node, "fc");
                assert_eq!(user, "fc_1");
            }
            other => panic!("Expected NodeInUse, got {:?}", other),
        }
        tree.erase_node(consumer).unwrap();
        tree.erase_node(producer).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn unknown_ids_are_reported() {
        let net = network();
        let mut tree = SymbolTree::new(&net);
        let id = tree.append_node(Node::call_cell(&[], "fc", &[]));
        tree.erase_node(id).unwrap();
        assert!(matches!(tree.erase_node(id), Err(RewriteError::NodeNotFound(_))));
        assert!(tree.node(id).is_none());
    }

    #[test]
    fn replace_keeps_position() {
        let net = network();
        let mut tree = SymbolTree::new(&net);
        let a = tree.append_node(Node::call_cell(&["y"], "fc", &["x"]));
        let b = tree.append_node(Node::call_cell(&["z"], "fc", &["y"]));
        let new = tree
            .replace_node(
                a,
                vec![
                    Node::call_cell(&["t"], "fc", &["x"]),
                    Node::call_function(&["y"], "ops.relu", &["t"]),
                ],
            )
            .unwrap();
        assert_eq!(tree.node_ids(), [new[0], new[1], b]);
        assert_eq!(tree.node(new[0]).map(Node::name), Some("fc"));
    }
}
