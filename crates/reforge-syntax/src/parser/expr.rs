use tree_sitter::Node;

use super::common::{named_children, operator_between, require_child};
use super::{Lowerer, ParseResult};
use crate::ast::{Keyword, SyntaxKind, SyntaxNode};

impl<'s> Lowerer<'s> {
    pub(crate) fn lower_expr(&mut self, node: &Node) -> ParseResult<SyntaxNode> {
        self.nested(node, |this| match node.kind() {
            "identifier" => {
                let id = this.text(node)?;
                Ok(this.make(SyntaxKind::Name { id }, node))
            }
            "attribute" => {
                let value = this.lower_expr(&require_child(node, "object")?)?;
                let attr = this.text(&require_child(node, "attribute")?)?;
                Ok(this.make(SyntaxKind::Attribute { value: Box::new(value), attr }, node))
            }
            "call" => this.lower_call(node),
            "integer" | "float" | "string" | "concatenated_string" | "true" | "false" | "none"
            | "ellipsis" => {
                let value = this.text(node)?;
                Ok(this.make(SyntaxKind::Constant { value }, node))
            }
            "binary_operator" | "boolean_operator" => this.lower_binary(node),
            // Chained comparisons such as `a < b < c` stay verbatim.
            "comparison_operator" if named_children(node).len() == 2 => this.lower_binary(node),
            "unary_operator" => {
                let op = this.text(&require_child(node, "operator")?)?;
                let operand = this.lower_expr(&require_child(node, "argument")?)?;
                Ok(this.make(SyntaxKind::UnaryOp { op, operand: Box::new(operand) }, node))
            }
            "not_operator" => {
                let operand = this.lower_expr(&require_child(node, "argument")?)?;
                let kind = SyntaxKind::UnaryOp { op: "not".to_string(), operand: Box::new(operand) };
                Ok(this.make(kind, node))
            }
            "lambda" => {
                let params = match node.child_by_field_name("parameters") {
                    Some(params) => this.lower_parameters(&params)?,
                    None => Vec::new(),
                };
                let body = this.lower_expr(&require_child(node, "body")?)?;
                Ok(this.make(SyntaxKind::Lambda { params, body: Box::new(body) }, node))
            }
            // `[a, b] = ...` binds exactly like `a, b = ...`.
            "tuple" | "expression_list" | "pattern_list" | "tuple_pattern" | "list_pattern" => {
                let elts = named_children(node)
                    .iter()
                    .map(|elt| this.lower_expr(elt))
                    .collect::<ParseResult<Vec<_>>>()?;
                Ok(this.make(SyntaxKind::Tuple { elts }, node))
            }
            "parenthesized_expression" | "type" => match named_children(node).as_slice() {
                [inner] => this.lower_expr(inner),
                _ => this.verbatim(node),
            },
            _ => this.verbatim(node),
        })
    }

    fn lower_binary(&mut self, node: &Node) -> ParseResult<SyntaxNode> {
        let children = named_children(node);
        let (left, right) = match (node.child_by_field_name("left"), node.child_by_field_name("right")) {
            (Some(left), Some(right)) => (left, right),
            _ => match children.as_slice() {
                [left, right] => (*left, *right),
                _ => return self.verbatim(node),
            },
        };
        let Some(op) = operator_between(node, &left, &right) else {
            return self.verbatim(node);
        };
        let left = self.lower_expr(&left)?;
        let right = self.lower_expr(&right)?;
        let kind = SyntaxKind::BinOp { left: Box::new(left), op, right: Box::new(right) };
        Ok(self.make(kind, node))
    }

    fn lower_call(&mut self, node: &Node) -> ParseResult<SyntaxNode> {
        let func = self.lower_expr(&require_child(node, "function")?)?;
        let arguments = require_child(node, "arguments")?;
        let (args, keywords) = match arguments.kind() {
            "argument_list" => self.lower_arguments(&arguments)?,
            // `f(x for x in xs)`
            _ => (vec![self.verbatim(&arguments)?], Vec::new()),
        };
        let kind = SyntaxKind::Call { func: Box::new(func), args, keywords };
        Ok(self.make(kind, node))
    }

    /// Splits an `argument_list` into positional arguments and keywords.
    pub(crate) fn lower_arguments(&mut self, node: &Node) -> ParseResult<(Vec<SyntaxNode>, Vec<Keyword>)> {
        let mut args = Vec::new();
        let mut keywords = Vec::new();
        for child in named_children(node) {
            match child.kind() {
                "keyword_argument" => {
                    let arg = self.text(&require_child(&child, "name")?)?;
                    let value = self.lower_expr(&require_child(&child, "value")?)?;
                    keywords.push(Keyword { arg: Some(arg), value });
                }
                "dictionary_splat" => match named_children(&child).first() {
                    Some(inner) => {
                        let value = self.lower_expr(inner)?;
                        keywords.push(Keyword { arg: None, value });
                    }
                    None => args.push(self.verbatim(&child)?),
                },
                _ => args.push(self.lower_expr(&child)?),
            }
        }
        Ok((args, keywords))
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{NodeKind, SyntaxKind};
    use crate::parser::parse_module;

    fn value_of(source: &str) -> SyntaxKind {
        let module = parse_module(source).unwrap();
        match &module.body().unwrap()[0].kind {
            SyntaxKind::Assign { value, .. } => value.kind.clone(),
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn comparison_keeps_two_word_operators() {
        match value_of("y = a not in b\n") {
            SyntaxKind::BinOp { op, .. } => assert_eq!(op, "not in"),
            other => panic!("expected BinOp, got {:?}", other),
        }
    }

    #[test]
    fn operator_skips_comments_between_operands() {
        match value_of("out = (self.a(x) +  # residual\n       self.b(x))\n") {
            SyntaxKind::BinOp { left, op, right } => {
                assert_eq!(op, "+");
                assert_eq!(left.node_kind(), NodeKind::Call);
                assert_eq!(right.node_kind(), NodeKind::Call);
            }
            other => panic!("expected BinOp, got {:?}", other),
        }
    }

    #[test]
    fn operator_skips_line_continuations() {
        match value_of("y = a + \\\n    b\n") {
            SyntaxKind::BinOp { op, right, .. } => {
                assert_eq!(op, "+");
                assert_eq!(right.kind, SyntaxKind::Name { id: "b".to_string() });
            }
            other => panic!("expected BinOp, got {:?}", other),
        }
    }

    #[test]
    fn list_targets_lower_like_tuples() {
        let module = parse_module("[a, b] = pair\n").unwrap();
        match &module.body().unwrap()[0].kind {
            SyntaxKind::Assign { targets, .. } => match &targets[0].kind {
                SyntaxKind::Tuple { elts } => assert_eq!(elts.len(), 2),
                other => panic!("expected Tuple, got {:?}", other),
            },
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn chained_comparison_is_verbatim() {
        match value_of("y = a < b < c\n") {
            SyntaxKind::Other { kind, text } => {
                assert_eq!(kind, "comparison_operator");
                assert_eq!(text, "a < b < c");
            }
            other => panic!("expected Other, got {:?}", other),
        }
    }

    #[test]
    fn call_splits_keywords() {
        match value_of("y = f(x, 2, axis=1, **extra)\n") {
            SyntaxKind::Call { func, args, keywords } => {
                assert_eq!(func.dotted_path().as_deref(), Some("f"));
                assert_eq!(args.len(), 2);
                assert_eq!(args[1].node_kind(), NodeKind::Constant);
                assert_eq!(keywords.len(), 2);
                assert_eq!(keywords[0].arg.as_deref(), Some("axis"));
                assert_eq!(keywords[1].arg, None);
            }
            other => panic!("expected Call, got {:?}", other),
        }
    }

    #[test]
    fn parentheses_are_dropped() {
        match value_of("y = (a + b) * c\n") {
            SyntaxKind::BinOp { left, op, .. } => {
                assert_eq!(op, "*");
                assert_eq!(left.node_kind(), NodeKind::BinOp);
            }
            other => panic!("expected BinOp, got {:?}", other),
        }
    }
}
