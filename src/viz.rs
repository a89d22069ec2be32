//! Graphviz rendering of a computation graph.

use crate::engine::{Value, ValueId};
use itertools::Itertools;
use std::collections::{HashMap, HashSet};

type Edge = (ValueId, ValueId);

/// Renders the graph that produced `root` in DOT format.
///
/// Every value becomes a record node showing its data and gradient; every
/// operation becomes a separate node between its operands and its result.
pub fn render_dot(root: &Value) -> String {
    let (nodes, edges) = trace(root);

    let mut nodes_str = String::new();
    let mut edges_str = String::new();
    for (node_id, node) in nodes.iter().sorted_by_key(|(id, _)| **id) {
        let id_str = format!("{:08}", node_id);
        nodes_str += &format!(
            "    \"{}\" [label=\"{{ data {:.06} | grad {:.06} }}\" shape=record]\n",
            id_str,
            node.data(),
            node.grad(),
        );
        if !node.is_leaf() {
            let op_name = node.op().to_string();
            nodes_str += &format!("    \"{}{}\" [label=\"{}\"]\n", id_str, op_name, op_name);
            edges_str += &format!("    \"{}{}\" -> \"{}\"\n", id_str, op_name, id_str);
        }
    }

    for (n1, n2) in edges.into_iter().sorted() {
        let op_name = nodes[&n2].op().to_string();
        edges_str += &format!("    \"{:08}\" -> \"{:08}{}\"\n", n1, n2, op_name);
    }

    format!(
        "strict digraph {{\n    graph [rankdir=LR]\n\n{}{}}}",
        nodes_str, edges_str
    )
}

fn trace(root: &Value) -> (HashMap<ValueId, Value>, HashSet<Edge>) {
    let mut nodes = HashMap::new();
    let mut edges = HashSet::new();
    let mut stack = vec![root.clone()];

    while let Some(node) = stack.pop() {
        if nodes.contains_key(&node.id()) {
            continue;
        }
        for child in node.op_args() {
            edges.insert((child.id(), node.id()));
            stack.push(child.clone());
        }
        nodes.insert(node.id(), node);
    }

    (nodes, edges)
}
