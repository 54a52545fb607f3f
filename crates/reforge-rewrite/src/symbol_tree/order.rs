use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rustc_hash::{FxHashMap, FxHashSet};

use super::{NodeId, SymbolTree};
use crate::error::{Result, RewriteError};

impl SymbolTree<'_> {
    /// Producers each body node depends on.
    ///
    /// An input is produced by the closest earlier node binding that name.
    /// When no earlier node binds it, the first later node that does is the
    /// producer, so a consumer inserted ahead of its producer is ordered
    /// after it. Names nobody binds are globals and add no dependency.
    pub fn dependencies(&self) -> FxHashMap<NodeId, Vec<NodeId>> {
        let body: Vec<_> = self.nodes().collect();
        let mut deps = FxHashMap::default();
        for (index, node) in body.iter().enumerate() {
            let mut producers: Vec<NodeId> = Vec::new();
            for input in node.inputs() {
                let binds = |candidate: &&&super::Node| candidate.targets().contains(input);
                let producer = body[..index]
                    .iter()
                    .rev()
                    .find(binds)
                    .or_else(|| body[index + 1..].iter().find(binds));
                if let Some(id) = producer.and_then(|p| p.id()) {
                    if !producers.contains(&id) {
                        producers.push(id);
                    }
                }
            }
            if let Some(id) = node.id() {
                deps.insert(id, producers);
            }
        }
        deps
    }

    /// Body nodes that read a name produced by `id`, in body order.
    pub fn users(&self, id: NodeId) -> Vec<NodeId> {
        let deps = self.dependencies();
        self.order
            .iter()
            .copied()
            .filter(|user| deps.get(user).is_some_and(|d| d.contains(&id)))
            .collect()
    }

    /// Body node ids ordered so that every node follows its producers.
    /// Independent nodes keep their body order.
    pub fn topological_order(&self) -> Result<Vec<NodeId>> {
        let deps = self.dependencies();
        let rank: FxHashMap<NodeId, usize> =
            self.order.iter().enumerate().map(|(i, &id)| (id, i)).collect();

        let mut pending: FxHashMap<NodeId, usize> = FxHashMap::default();
        let mut dependents: FxHashMap<NodeId, Vec<NodeId>> = FxHashMap::default();
        for (&id, producers) in &deps {
            pending.insert(id, producers.len());
            for &producer in producers {
                dependents.entry(producer).or_default().push(id);
            }
        }

        let mut ready: BinaryHeap<Reverse<(usize, NodeId)>> = pending
            .iter()
            .filter(|&(_, &count)| count == 0)
            .map(|(&id, _)| Reverse((rank[&id], id)))
            .collect();
        let mut sorted = Vec::with_capacity(self.order.len());
        while let Some(Reverse((_, id))) = ready.pop() {
            sorted.push(id);
            for &dependent in dependents.get(&id).into_iter().flatten() {
                if let Some(count) = pending.get_mut(&dependent) {
                    *count -= 1;
                    if *count == 0 {
                        ready.push(Reverse((rank[&dependent], dependent)));
                    }
                }
            }
        }

        if sorted.len() < self.order.len() {
            let done: FxHashSet<NodeId> = sorted.iter().copied().collect();
            let nodes = self
                .nodes()
                .filter(|node| node.id().is_some_and(|id| !done.contains(&id)))
                .map(|node| node.name().to_string())
                .collect();
            return Err(RewriteError::CyclicDependency { nodes });
        }
        Ok(sorted)
    }

    /// Reorders the body into [`topological_order`](Self::topological_order).
    pub fn sort_topologically(&mut self) -> Result<()> {
        self.order = self.topological_order()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::NetworkDef;
    use crate::symbol_tree::Node;

    #[test]
    fn independent_nodes_keep_body_order() {
        let net = NetworkDef::without_source("Net");
        let mut tree = SymbolTree::new(&net);
        let a = tree.append_node(Node::call_cell(&["a"], "fc", &["x"]));
        let b = tree.append_node(Node::call_cell(&["b"], "fc", &["x"]));
        let c = tree.append_node(Node::call_function(&["c"], "ops.add", &["a", "b"]));
        assert_eq!(tree.topological_order().unwrap(), [a, b, c]);
    }

    #[test]
    fn consumers_move_after_late_producers() {
        let net = NetworkDef::without_source("Net");
        let mut tree = SymbolTree::new(&net);
        let producer = tree.append_node(Node::call_cell(&["y"], "fc", &["x"]));
        let output = tree.append_node(Node::call_function(&["z"], "ops.relu", &["y"]));
        let early = tree
            .insert_before(producer, Node::call_function(&["w"], "ops.neg", &["y"]))
            .unwrap();
        assert_eq!(tree.dependencies()[&early], [producer]);
        tree.sort_topologically().unwrap();
        assert_eq!(tree.node_ids(), [producer, early, output]);
    }

    #[test]
    fn cycles_are_reported() {
        let net = NetworkDef::without_source("Net");
        let mut tree = SymbolTree::new(&net);
        tree.append_node(Node::call_function(&["a"], "f", &["b"]));
        tree.append_node(Node::call_function(&["b"], "g", &["a"]));
        match tree.topological_order() {
            Err(RewriteError::CyclicDependency { nodes }) => assert_eq!(nodes, ["f", "g"]),
            other => panic!("Expected CyclicDependency, got {:?}", other),
        }
    }
}
