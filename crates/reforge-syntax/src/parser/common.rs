use miette::SourceSpan;
use tree_sitter::Node;

use crate::error::SyntaxError;

/// Creates a SourceSpan from a Node's byte range
pub fn create_span(node: &Node) -> SourceSpan {
    SourceSpan::new(node.start_byte().into(), node.end_byte() - node.start_byte())
}

/// Extracts text from a Node, handling UTF-8 conversion and errors
pub fn node_text(node: &Node, source: &str) -> Result<String, SyntaxError> {
    node.utf8_text(source.as_bytes())
        .map(|s| s.to_string())
        .map_err(|e| SyntaxError::NodeError {
            message: format!("Invalid UTF-8 in node text: {}", e),
            span: Some(create_span(node)),
            node_type: node.kind().to_string(),
        })
}

/// Gets a required child node by field name, with error handling
pub fn require_child<'a>(node: &Node<'a>, field_name: &str) -> Result<Node<'a>, SyntaxError> {
    node.child_by_field_name(field_name)
        .ok_or_else(|| SyntaxError::NodeError {
            message: format!("{} missing {}", node.kind(), field_name),
            span: Some(create_span(node)),
            node_type: node.kind().to_string(),
        })
}

/// Named children of a node, comments excluded
pub fn named_children<'a>(node: &Node<'a>) -> Vec<Node<'a>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// All children stored under one field name, in source order
pub fn children_by_field<'a>(node: &Node<'a>, field_name: &str) -> Vec<Node<'a>> {
    let mut cursor = node.walk();
    node.children_by_field_name(field_name, &mut cursor).collect()
}

/// Finds first child node of a specific kind
pub fn find_first_child<'a>(node: &Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| child.kind() == kind);
    found
}

/// The operator token(s) of a binary node lying between its two operands.
///
/// Only anonymous children are read, so comments and line continuations
/// between the operands are skipped. Two-token operators such as `not in`
/// come back joined by a single space.
pub fn operator_between(node: &Node, left: &Node, right: &Node) -> Option<String> {
    let mut cursor = node.walk();
    let tokens: Vec<&str> = node
        .children(&mut cursor)
        .filter(|child| child.start_byte() >= left.end_byte() && child.end_byte() <= right.start_byte())
        .filter(|child| !child.is_named())
        .map(|child| child.kind())
        .collect();
    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(" "))
    }
}

/// Creates a node error with a custom message
pub fn node_error(node: &Node, message: &str) -> SyntaxError {
    SyntaxError::NodeError {
        message: message.to_string(),
        span: Some(create_span(node)),
        node_type: node.kind().to_string(),
    }
}

/// Collects tree-sitter ERROR and MISSING nodes, walking with an explicit stack
pub fn collect_ts_errors(root: &Node, source: &str, errors: &mut Vec<SyntaxError>) {
    let mut stack = vec![*root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            errors.push(SyntaxError::SyntaxError {
                message: format!(
                    "unexpected {} near \"{}\" at {}:{}",
                    if node.is_missing() { "MISSING" } else { "token" },
                    node.utf8_text(source.as_bytes()).unwrap_or("[invalid UTF-8]"),
                    node.start_position().row + 1,
                    node.start_position().column + 1,
                ),
                span: Some(create_span(&node)),
                expected: if node.is_missing() {
                    Some(format!("expected `{}`", node.kind()))
                } else {
                    None
                },
                found: if node.is_error() { Some(node.kind().to_string()) } else { None },
            });
            // The children of an ERROR node are the tokens it swallowed; one report is enough.
            continue;
        }
        if !node.has_error() {
            continue;
        }
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
}
