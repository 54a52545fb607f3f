use std::fmt;

use reforge_syntax::{unparse_expr, Param, ParamKind, SyntaxKind, SyntaxNode};

use super::names::{analyze_statement, free_names};

/// Identifier of a node within one symbol tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// A parameter of the forward method
    Input,
    /// A call of a sub-network, `self.<attr>(...)`
    CallCell,
    /// A call of anything else
    CallFunction,
    /// A statement kept as plain Python
    Python,
    Output,
    /// An `if` statement owning the nodes of its branches
    ControlFlow,
}

/// Nested nodes of a control-flow node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Branches {
    pub body: Vec<Node>,
    pub orelse: Vec<Node>,
}

/// One IR node of a symbol tree.
///
/// `targets` are the names the node binds and `inputs` the free names it
/// reads. Both are derived from the node's statement when it is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) id: Option<NodeId>,
    pub(crate) name: String,
    node_type: NodeType,
    targets: Vec<String>,
    inputs: Vec<String>,
    callee: Option<String>,
    ast: SyntaxNode,
    param: Option<Param>,
    branches: Option<Branches>,
}

impl Node {
    fn from_statement(node_type: NodeType, name: String, ast: SyntaxNode) -> Self {
        let (targets, inputs) = analyze_statement(&ast);
        Self {
            id: None,
            name,
            node_type,
            targets,
            inputs,
            callee: None,
            ast,
            param: None,
            branches: None,
        }
    }

    /// A forward-method parameter.
    pub fn input(param: Param) -> Self {
        let name = match param.kind {
            ParamKind::KeywordSeparator => "kwonly_marker".to_string(),
            ParamKind::PositionalSeparator => "posonly_marker".to_string(),
            _ => param.name.clone(),
        };
        let targets = if param.is_separator() { Vec::new() } else { vec![param.name.clone()] };
        // Defaults and annotations are evaluated at definition time, outside
        // the forward method's body.
        Self {
            id: None,
            name,
            node_type: NodeType::Input,
            targets,
            inputs: Vec::new(),
            callee: None,
            ast: SyntaxNode::name(&param.name),
            param: Some(param),
            branches: None,
        }
    }

    /// A call node for `stmt`, an assignment or expression statement whose
    /// value is a call of `func`.
    pub(crate) fn call(stmt: SyntaxNode, func: &SyntaxNode) -> Self {
        let (node_type, name) = match func.self_attribute() {
            Some(attr) => (NodeType::CallCell, attr.to_string()),
            None => {
                let name = func
                    .dotted_path()
                    .and_then(|path| path.rsplit('.').next().map(str::to_string))
                    .unwrap_or_else(|| "call".to_string());
                (NodeType::CallFunction, name)
            }
        };
        let mut node = Self::from_statement(node_type, name, stmt);
        node.callee = func.dotted_path().or_else(|| Some(unparse_expr(func)));
        node
    }

    /// Builds `targets = self.<cell>(args)`.
    pub fn call_cell(targets: &[&str], cell: &str, args: &[&str]) -> Self {
        let func = SyntaxNode::dotted(&format!("self.{}", cell));
        Self::call(call_statement(targets, func.clone(), args), &func)
    }

    /// Builds `targets = <function>(args)` for a dotted function path.
    pub fn call_function(targets: &[&str], function: &str, args: &[&str]) -> Self {
        let func = SyntaxNode::dotted(function);
        Self::call(call_statement(targets, func.clone(), args), &func)
    }

    /// A statement kept as plain Python.
    pub fn python(stmt: SyntaxNode) -> Self {
        let name = match &stmt.kind {
            SyntaxKind::Assign { targets, .. } => targets
                .first()
                .and_then(SyntaxNode::dotted_path)
                .unwrap_or_else(|| "python".to_string()),
            _ => "python".to_string(),
        };
        Self::from_statement(NodeType::Python, name, stmt)
    }

    /// The `return` statement of the forward method.
    pub fn output(stmt: SyntaxNode) -> Self {
        Self::from_statement(NodeType::Output, "output".to_string(), stmt)
    }

    /// An `if` statement whose branches were parsed into `branches`.
    pub fn control_flow(stmt: SyntaxNode, branches: Branches) -> Self {
        let test_names = match &stmt.kind {
            SyntaxKind::If { test, .. } => free_names(test),
            _ => free_names(&stmt),
        };
        let mut inputs = Vec::new();
        let mut targets = Vec::new();
        for name in test_names {
            push_unique(&mut inputs, name);
        }
        for arm in [&branches.body, &branches.orelse] {
            // Names bound earlier in the same arm are not free.
            let mut bound: Vec<&str> = Vec::new();
            for node in arm {
                for input in &node.inputs {
                    if !bound.contains(&input.as_str()) {
                        push_unique(&mut inputs, input.clone());
                    }
                }
                for target in &node.targets {
                    bound.push(target);
                    push_unique(&mut targets, target.clone());
                }
            }
        }
        Self {
            id: None,
            name: "control_flow".to_string(),
            node_type: NodeType::ControlFlow,
            targets,
            inputs,
            callee: None,
            ast: stmt,
            param: None,
            branches: Some(branches),
        }
    }

    /// `None` until the node is placed in a symbol tree.
    pub fn id(&self) -> Option<NodeId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    /// Dotted path of the called object, for call nodes.
    pub fn callee(&self) -> Option<&str> {
        self.callee.as_deref()
    }

    /// The statement this node stands for. Input nodes hold the parameter name.
    pub fn ast(&self) -> &SyntaxNode {
        &self.ast
    }

    pub fn param(&self) -> Option<&Param> {
        self.param.as_ref()
    }

    pub fn branches(&self) -> Option<&Branches> {
        self.branches.as_ref()
    }

    /// Statements regenerated for this node. Input nodes produce none.
    pub fn to_statements(&self) -> Vec<SyntaxNode> {
        match (&self.node_type, &self.branches, &self.ast.kind) {
            (NodeType::Input, _, _) => Vec::new(),
            (NodeType::ControlFlow, Some(branches), SyntaxKind::If { test, .. }) => {
                let kind = SyntaxKind::If {
                    test: test.clone(),
                    body: branches.body.iter().flat_map(Node::to_statements).collect(),
                    orelse: branches.orelse.iter().flat_map(Node::to_statements).collect(),
                };
                vec![SyntaxNode::new(kind, self.ast.span, self.ast.position)]
            }
            _ => vec![self.ast.clone()],
        }
    }
}

fn push_unique(names: &mut Vec<String>, name: String) {
    if !names.contains(&name) {
        names.push(name);
    }
}

fn call_statement(targets: &[&str], func: SyntaxNode, args: &[&str]) -> SyntaxNode {
    let call = SyntaxNode::call(func, args.iter().map(|a| SyntaxNode::name(*a)).collect(), Vec::new());
    if targets.is_empty() {
        SyntaxNode::synthesized(SyntaxKind::Expr { value: Box::new(call) })
    } else {
        SyntaxNode::assign(targets.iter().map(|t| SyntaxNode::name(*t)).collect(), call)
    }
}
