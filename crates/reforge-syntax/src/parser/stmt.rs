use tree_sitter::Node;

use super::common::{children_by_field, find_first_child, named_children, node_error, require_child};
use super::{Lowerer, ParseResult};
use crate::ast::{Alias, Param, ParamKind, SyntaxKind, SyntaxNode};

impl<'s> Lowerer<'s> {
    pub(crate) fn lower_statement(&mut self, node: &Node) -> ParseResult<SyntaxNode> {
        self.nested(node, |this| match node.kind() {
            "expression_statement" => this.lower_expression_statement(node),
            "return_statement" => {
                let value = match named_children(node).first() {
                    Some(value) => Some(Box::new(this.lower_expr(value)?)),
                    None => None,
                };
                Ok(this.make(SyntaxKind::Return { value }, node))
            }
            "pass_statement" => Ok(this.make(SyntaxKind::Pass, node)),
            "if_statement" => this.lower_if(node),
            "import_statement" => this.lower_import(node),
            "import_from_statement" => this.lower_import_from(node),
            "class_definition" => this.lower_class(node, node, Vec::new()),
            "function_definition" => this.lower_function(node, node, Vec::new()),
            "decorated_definition" => this.lower_decorated(node),
            _ => this.verbatim(node),
        })
    }

    fn lower_expression_statement(&mut self, node: &Node) -> ParseResult<SyntaxNode> {
        let children = named_children(node);
        match children.as_slice() {
            [single] if single.kind() == "assignment" => self.lower_assignment(single, node),
            [single] if single.kind() == "augmented_assignment" => {
                let target = self.lower_expr(&require_child(single, "left")?)?;
                let op = self.text(&require_child(single, "operator")?)?;
                let value = self.lower_expr(&require_child(single, "right")?)?;
                let kind = SyntaxKind::AugAssign {
                    target: Box::new(target),
                    op,
                    value: Box::new(value),
                };
                Ok(self.make(kind, node))
            }
            [single] => {
                let value = self.lower_expr(single)?;
                Ok(self.make(SyntaxKind::Expr { value: Box::new(value) }, node))
            }
            _ => {
                let elts = children
                    .iter()
                    .map(|child| self.lower_expr(child))
                    .collect::<ParseResult<Vec<_>>>()?;
                let tuple = self.make(SyntaxKind::Tuple { elts }, node);
                Ok(self.make(SyntaxKind::Expr { value: Box::new(tuple) }, node))
            }
        }
    }

    /// `a = b = value` becomes one `Assign` with two targets. Annotated
    /// assignments are kept verbatim.
    fn lower_assignment(&mut self, assignment: &Node, stmt: &Node) -> ParseResult<SyntaxNode> {
        let mut targets = Vec::new();
        let mut current = *assignment;
        loop {
            if current.child_by_field_name("type").is_some() {
                return self.verbatim(stmt);
            }
            targets.push(self.lower_expr(&require_child(&current, "left")?)?);
            let Some(right) = current.child_by_field_name("right") else {
                return self.verbatim(stmt);
            };
            if right.kind() == "assignment" {
                current = right;
                continue;
            }
            let value = self.lower_expr(&right)?;
            let kind = SyntaxKind::Assign { targets, value: Box::new(value) };
            return Ok(self.make(kind, stmt));
        }
    }

    fn lower_if(&mut self, node: &Node) -> ParseResult<SyntaxNode> {
        let test = self.lower_expr(&require_child(node, "condition")?)?;
        let body = self.lower_block(&require_child(node, "consequence")?)?;

        // Fold `elif` clauses from the back so each becomes the `orelse` of the previous test.
        let mut orelse = Vec::new();
        for clause in children_by_field(node, "alternative").iter().rev() {
            match clause.kind() {
                "else_clause" => {
                    orelse = self.lower_block(&require_child(clause, "body")?)?;
                }
                "elif_clause" => {
                    let test = self.lower_expr(&require_child(clause, "condition")?)?;
                    let body = self.lower_block(&require_child(clause, "consequence")?)?;
                    let kind = SyntaxKind::If { test: Box::new(test), body, orelse };
                    orelse = vec![self.make(kind, clause)];
                }
                other => return Err(node_error(clause, &format!("unexpected if clause {}", other))),
            }
        }

        Ok(self.make(SyntaxKind::If { test: Box::new(test), body, orelse }, node))
    }

    fn lower_import(&mut self, node: &Node) -> ParseResult<SyntaxNode> {
        let names = children_by_field(node, "name")
            .iter()
            .map(|name| self.lower_alias(name))
            .collect::<ParseResult<Vec<_>>>()?;
        Ok(self.make(SyntaxKind::Import { names }, node))
    }

    fn lower_import_from(&mut self, node: &Node) -> ParseResult<SyntaxNode> {
        let module_node = require_child(node, "module_name")?;
        let (module, level) = match module_node.kind() {
            "relative_import" => {
                let level = match find_first_child(&module_node, "import_prefix") {
                    Some(prefix) => self.text(&prefix)?.chars().filter(|c| *c == '.').count(),
                    None => 0,
                };
                let module = match find_first_child(&module_node, "dotted_name") {
                    Some(name) => Some(self.text(&name)?),
                    None => None,
                };
                (module, level)
            }
            _ => (Some(self.text(&module_node)?), 0),
        };

        let mut names = children_by_field(node, "name")
            .iter()
            .map(|name| self.lower_alias(name))
            .collect::<ParseResult<Vec<_>>>()?;
        if find_first_child(node, "wildcard_import").is_some() {
            names.push(Alias::new("*"));
        }

        Ok(self.make(SyntaxKind::ImportFrom { module, names, level }, node))
    }

    fn lower_alias(&mut self, node: &Node) -> ParseResult<Alias> {
        match node.kind() {
            "aliased_import" => {
                let name = self.text(&require_child(node, "name")?)?;
                let alias = self.text(&require_child(node, "alias")?)?;
                Ok(Alias::with_asname(name, alias))
            }
            _ => Ok(Alias::new(self.text(node)?)),
        }
    }

    fn lower_decorated(&mut self, node: &Node) -> ParseResult<SyntaxNode> {
        let mut decorators = Vec::new();
        for decorator in named_children(node).iter().filter(|c| c.kind() == "decorator") {
            let expr = named_children(decorator)
                .into_iter()
                .next()
                .ok_or_else(|| node_error(decorator, "decorator without expression"))?;
            decorators.push(self.lower_expr(&expr)?);
        }

        let definition = require_child(node, "definition")?;
        match definition.kind() {
            "class_definition" => self.lower_class(&definition, node, decorators),
            "function_definition" => self.lower_function(&definition, node, decorators),
            _ => self.verbatim(node),
        }
    }

    /// `outer` is the node whose location the definition takes, which differs
    /// from `node` for decorated definitions.
    fn lower_class(&mut self, node: &Node, outer: &Node, decorators: Vec<SyntaxNode>) -> ParseResult<SyntaxNode> {
        let name = self.text(&require_child(node, "name")?)?;
        let (bases, keywords) = match node.child_by_field_name("superclasses") {
            Some(arguments) => self.lower_arguments(&arguments)?,
            None => (Vec::new(), Vec::new()),
        };
        let body = self.lower_block(&require_child(node, "body")?)?;
        let kind = SyntaxKind::ClassDef { name, bases, keywords, decorators, body };
        Ok(self.make(kind, outer))
    }

    fn lower_function(&mut self, node: &Node, outer: &Node, decorators: Vec<SyntaxNode>) -> ParseResult<SyntaxNode> {
        // `async def` is outside the modelled subset.
        if find_first_child(node, "async").is_some() {
            return self.verbatim(outer);
        }
        let name = self.text(&require_child(node, "name")?)?;
        let params = self.lower_parameters(&require_child(node, "parameters")?)?;
        let returns = match node.child_by_field_name("return_type") {
            Some(ty) => Some(Box::new(self.lower_expr(&ty)?)),
            None => None,
        };
        let body = self.lower_block(&require_child(node, "body")?)?;
        let kind = SyntaxKind::FunctionDef { name, params, returns, decorators, body };
        Ok(self.make(kind, outer))
    }

    /// Lowers `parameters` and `lambda_parameters` nodes.
    pub(crate) fn lower_parameters(&mut self, node: &Node) -> ParseResult<Vec<Param>> {
        let mut params = Vec::new();
        for child in named_children(node) {
            let param = match child.kind() {
                "identifier" => Param::new(self.text(&child)?),
                "default_parameter" => Param {
                    default: Some(self.lower_expr(&require_child(&child, "value")?)?),
                    ..Param::new(self.text(&require_child(&child, "name")?)?)
                },
                "typed_default_parameter" => Param {
                    annotation: Some(self.lower_expr(&require_child(&child, "type")?)?),
                    default: Some(self.lower_expr(&require_child(&child, "value")?)?),
                    ..Param::new(self.text(&require_child(&child, "name")?)?)
                },
                "typed_parameter" => {
                    let inner = named_children(&child)
                        .into_iter()
                        .next()
                        .ok_or_else(|| node_error(&child, "typed parameter without name"))?;
                    let mut param = self.lower_simple_param(&inner)?;
                    param.annotation = Some(self.lower_expr(&require_child(&child, "type")?)?);
                    param
                }
                _ => self.lower_simple_param(&child)?,
            };
            params.push(param);
        }
        Ok(params)
    }

    fn lower_simple_param(&mut self, node: &Node) -> ParseResult<Param> {
        let splat_name = |this: &Self| -> ParseResult<String> {
            let ident = named_children(node)
                .into_iter()
                .next()
                .ok_or_else(|| node_error(node, "splat parameter without name"))?;
            this.text(&ident)
        };
        let (name, kind) = match node.kind() {
            "identifier" => (self.text(node)?, ParamKind::Normal),
            "list_splat_pattern" => (splat_name(self)?, ParamKind::VarArgs),
            "dictionary_splat_pattern" => (splat_name(self)?, ParamKind::KwArgs),
            "keyword_separator" => ("*".to_string(), ParamKind::KeywordSeparator),
            "positional_separator" => ("/".to_string(), ParamKind::PositionalSeparator),
            other => return Err(node_error(node, &format!("unsupported parameter {}", other))),
        };
        Ok(Param { kind, ..Param::new(name) })
    }
}
