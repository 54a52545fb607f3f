use std::io::Write;

use expect_test::expect;
use reforge_rewrite::{
    NetworkDef, Node, NodeType, ParseContext, Parser, ParserRegistry, RewriteConfig, RewriteError,
    Rewriter, SymbolTree,
};
use reforge_syntax::{parse_module, unparse, NodeKind, SyntaxNode};
use tempfile::NamedTempFile;

const LENET: &str = r#"import math
from mindspore import nn, ops


class LeNet(nn.Cell):
    """LeNet-5."""

    def __init__(self, num_class=10):
        super().__init__()
        self.conv1 = nn.Conv2d(1, 6, 5)
        self.fc = nn.Dense(120, num_class)

    def construct(self, x, y=None):
        x = self.conv1(x)
        x = ops.relu(x)
        if y is not None:
            x = x + y
        return self.fc(x)


def helper():
    return 1
"#;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn origin_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".py").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn names(nodes: &[Node]) -> Vec<&str> {
    nodes.iter().map(Node::name).collect()
}

#[test]
fn single_class_module_is_parsed() {
    init_logger();
    let file = origin_file("class Net:\n    def construct(self, x):\n        return x + 1\n");
    let net = NetworkDef::new("Net", file.path());
    let rewriter = Rewriter::default();
    let tree = rewriter.parse_network(&net).unwrap();

    assert_eq!(tree.class_ast().and_then(SyntaxNode::def_name), Some("Net"));
    assert!(rewriter.registry().get_parser(NodeKind::ClassDef).is_ok());
    assert!(std::ptr::addr_eq(tree.origin_network(), &net));

    let body = tree.module_ast().and_then(SyntaxNode::body).unwrap();
    let printed: Vec<String> = body[..3].iter().map(unparse).collect();
    assert_eq!(
        printed,
        ["import mindspore\n", "from mindspore import nn\n", "from mindspore.nn import Cell\n"]
    );
    assert_eq!(body[3].def_name(), Some("Net"));

    let types: Vec<NodeType> = tree.nodes().map(Node::node_type).collect();
    assert_eq!(types, [NodeType::Input, NodeType::Output]);
    assert_eq!(tree.node_by_name("output").map(Node::inputs), Some(&["x".to_string()][..]));
}

#[test]
fn module_without_class_is_rejected() {
    let file = origin_file("import os\n");
    let net = NetworkDef::new("Net", file.path());
    let mut tree = SymbolTree::new(&net);
    let module = parse_module("x = 1\n").unwrap();
    let err = Rewriter::default().parse_module(&mut tree, &module).unwrap_err();
    assert!(matches!(err, RewriteError::NoClassFound { ref network } if network == "Net"));
    assert!(tree.is_empty());
}

#[test]
fn module_with_two_classes_is_rejected() {
    let file = origin_file("class A:\n    pass\n\nclass B:\n    pass\n");
    let net = NetworkDef::new("A", file.path());
    let module = parse_module("class A:\n    pass\n\nclass B:\n    pass\n").unwrap();
    let mut tree = SymbolTree::new(&net);
    match Rewriter::default().parse_module(&mut tree, &module) {
        Err(RewriteError::MultiClassUnsupported { classes }) => assert_eq!(classes, ["A", "B"]),
        other => panic!("Expected MultiClassUnsupported, got {:?}", other),
    }
    // Only the import injection happened before the class check.
    assert_eq!(tree.module_ast().and_then(SyntaxNode::body).map(<[SyntaxNode]>::len), Some(5));
    assert!(tree.class_ast().is_none());
    assert!(tree.is_empty());
}

#[test]
fn origin_imports_follow_the_canonical_ones_in_order() {
    let source = r#"import os
from collections import OrderedDict
import numpy as np


class Net(nn.Cell):
    def construct(self, x):
        from mindspore import ops
        return ops.relu(x)


def build():
    import json
    return Net()
"#;
    let file = origin_file(source);
    let net = NetworkDef::new("Net", file.path());
    let tree = Rewriter::default().parse_network(&net).unwrap();

    let imports: Vec<String> = tree.imports().iter().map(|s| unparse(s).trim_end().to_string()).collect();
    assert_eq!(
        imports,
        [
            "import mindspore",
            "from mindspore import nn",
            "from mindspore.nn import Cell",
            "import os",
            "from collections import OrderedDict",
            "import numpy as np",
            "from mindspore import ops",
            "import json",
        ]
    );
    let module_head = &tree.module_ast().and_then(SyntaxNode::body).unwrap()[..imports.len()];
    assert_eq!(module_head, tree.imports());
}

#[test]
fn unregistered_value_kind_keeps_prior_siblings() {
    let source = "class Net:\n    def construct(self, x):\n        y = self.fc(x)\n        f = lambda a: a\n        return f(y)\n";
    let file = origin_file(source);
    let net = NetworkDef::new("Net", file.path());
    let module = parse_module(source).unwrap();
    let mut tree = SymbolTree::new(&net);

    match Rewriter::default().parse_module(&mut tree, &module) {
        Err(RewriteError::UnregisteredKind { kind, position, .. }) => {
            assert_eq!(kind, NodeKind::Lambda);
            assert_eq!(position.map(|p| p.line), Some(4));
        }
        other => panic!("Expected UnregisteredKind, got {:?}", other),
    }
    let names: Vec<&str> = tree.nodes().map(Node::name).collect();
    assert_eq!(names, ["x", "fc"]);
}

struct LambdaAsPython;

impl Parser for LambdaAsPython {
    fn target(&self) -> NodeKind {
        NodeKind::Lambda
    }

    fn process(
        &self,
        cx: &mut ParseContext<'_>,
        tree: &mut SymbolTree<'_>,
        node: &SyntaxNode,
    ) -> reforge_rewrite::Result<()> {
        let statement = cx.take_pending().map(|p| p.statement).unwrap_or_else(|| node.clone());
        cx.emit(tree, Node::python(statement));
        Ok(())
    }
}

#[test]
fn custom_parsers_extend_the_registry() {
    let source = "class Net:\n    def construct(self, x):\n        f = lambda a: a\n        return f(x)\n";
    let file = origin_file(source);
    let net = NetworkDef::new("Net", file.path());
    let mut rewriter = Rewriter::default();
    rewriter.registry_mut().register(LambdaAsPython);
    let tree = rewriter.parse_network(&net).unwrap();

    let types: Vec<NodeType> = tree.nodes().map(Node::node_type).collect();
    assert_eq!(
        types,
        [NodeType::Input, NodeType::Python, NodeType::CallFunction, NodeType::Output]
    );
    assert_eq!(tree.node_by_name("f").map(Node::node_type), Some(NodeType::Python));
    let call = tree.node_by_name("f_1").unwrap();
    assert_eq!(call.callee(), Some("f"));
    assert_eq!(call.targets(), ["f_out"]);
}

#[test]
fn lenet_forward_becomes_ir_nodes() {
    let file = origin_file(LENET);
    let net = NetworkDef::new("LeNet", file.path());
    let tree = Rewriter::default().parse_network(&net).unwrap();

    let summary: Vec<(&str, NodeType)> = tree.nodes().map(|n| (n.name(), n.node_type())).collect();
    assert_eq!(
        summary,
        [
            ("x", NodeType::Input),
            ("y", NodeType::Input),
            ("conv1", NodeType::CallCell),
            ("relu", NodeType::CallFunction),
            ("control_flow", NodeType::ControlFlow),
            ("fc", NodeType::CallCell),
            ("output", NodeType::Output),
        ]
    );

    let relu = tree.node_by_name("relu").unwrap();
    assert_eq!(relu.callee(), Some("ops.relu"));
    assert_eq!(relu.targets(), ["x"]);

    let branch = tree.node_by_name("control_flow").and_then(Node::branches).unwrap();
    assert_eq!(names(&branch.body), ["x_1"]);
    assert!(branch.orelse.is_empty());

    let fc = tree.node_by_name("fc").unwrap();
    assert_eq!(fc.targets(), ["fc_out"]);
    assert_eq!(tree.node_by_name("output").unwrap().inputs(), ["fc_out"]);

    assert_eq!(tree.topological_order().unwrap(), tree.node_ids());
}

#[test]
fn lenet_regenerates() {
    let file = origin_file(LENET);
    let net = NetworkDef::new("LeNet", file.path());
    let tree = Rewriter::default().parse_network(&net).unwrap();

    expect![[r#"
        import mindspore
        from mindspore import nn
        from mindspore.nn import Cell
        import math
        from mindspore import nn, ops

        class LeNet(nn.Cell):
            """LeNet-5."""

            def __init__(self, num_class=10):
                super().__init__()
                self.conv1 = nn.Conv2d(1, 6, 5)
                self.fc = nn.Dense(120, num_class)

            def construct(self, x, y=None):
                x = self.conv1(x)
                x = ops.relu(x)
                if y is not None:
                    x = x + y
                fc_out = self.fc(x)
                return fc_out
    "#]]
    .assert_eq(&tree.regenerate().unwrap());
}

#[test]
fn edits_are_reflected_in_regenerated_source() {
    let file = origin_file(LENET);
    let net = NetworkDef::new("LeNet", file.path());
    let mut tree = Rewriter::default().parse_network(&net).unwrap();

    let relu = tree.node_by_name("relu").and_then(Node::id).unwrap();
    match tree.erase_node(relu) {
        Err(RewriteError::NodeInUse { node, user }) => {
            assert_eq!(node, "relu");
            assert_eq!(user, "control_flow");
        }
        other => panic!("Expected NodeInUse, got {:?}", other),
    }

    let conv1 = tree.node_by_name("conv1").and_then(Node::id).unwrap();
    let sigmoid = tree
        .insert_after(conv1, Node::call_function(&["x"], "ops.sigmoid", &["x"]))
        .unwrap();
    let relu_again = tree
        .insert_after(sigmoid, Node::call_function(&["x"], "ops.relu", &["x"]))
        .unwrap();
    assert_eq!(tree.node(relu_again).map(Node::name), Some("relu_1"));

    let output = tree.node_by_name("output").and_then(Node::id).unwrap();
    let new_output = Node::output(SyntaxNode::ret(Some(SyntaxNode::call(
        SyntaxNode::dotted("ops.tanh"),
        vec![SyntaxNode::name("fc_out")],
        Vec::new(),
    ))));
    tree.replace_node(output, vec![new_output]).unwrap();

    expect![[r#"
        def construct(self, x, y=None):
            x = self.conv1(x)
            x = ops.sigmoid(x)
            x = ops.relu(x)
            x = ops.relu(x)
            if y is not None:
                x = x + y
            fc_out = self.fc(x)
            return ops.tanh(fc_out)
    "#]]
    .assert_eq(&forward_source(&tree));
}

#[test]
fn starred_targets_keep_their_producer_alive() {
    let file = origin_file(
        "class Split(nn.Cell):\n    def construct(self, x):\n        a, *rest = self.split(x)\n        return rest\n",
    );
    let net = NetworkDef::new("Split", file.path());
    let mut tree = Rewriter::default().parse_network(&net).unwrap();

    let split = tree.node_by_name("split").unwrap();
    assert_eq!(split.targets(), ["a", "rest"]);
    let split = split.id().unwrap();
    match tree.erase_node(split) {
        Err(RewriteError::NodeInUse { node, user }) => {
            assert_eq!(node, "split");
            assert_eq!(user, "output");
        }
        other => panic!("Expected NodeInUse, got {:?}", other),
    }

    expect![[r#"
        def construct(self, x):
            a, *rest = self.split(x)
            return rest
    "#]]
    .assert_eq(&forward_source(&tree));
}

/// The regenerated forward method, dedented to column zero.
fn forward_source(tree: &SymbolTree<'_>) -> String {
    let source = tree.regenerate().unwrap();
    let start = source.find("    def construct").unwrap();
    source[start..]
        .lines()
        .map(|line| line.strip_prefix("    ").unwrap_or(line))
        .map(|line| format!("{}\n", line))
        .collect()
}

#[test]
fn elif_chains_nest_control_flow() {
    let source = r#"class Gate(nn.Cell):
    def construct(self, x, mode):
        if mode == 0:
            x = self.a(x)
        elif mode == 1:
            x = ops.neg(x)
        else:
            x = x * 2
        return x
"#;
    let file = origin_file(source);
    let net = NetworkDef::new("Gate", file.path());
    let tree = Rewriter::default().parse_network(&net).unwrap();

    let outer = tree.nodes().find(|n| n.node_type() == NodeType::ControlFlow).unwrap();
    assert_eq!(outer.inputs(), ["mode", "x"]);
    assert_eq!(outer.targets(), ["x"]);
    let branches = outer.branches().unwrap();
    assert_eq!(names(&branches.body), ["a"]);
    let inner = branches.orelse[0].branches().unwrap();
    assert_eq!(names(&inner.body), ["neg"]);
    assert_eq!(names(&inner.orelse), ["x_1"]);

    expect![[r#"
        def construct(self, x, mode):
            if mode == 0:
                x = self.a(x)
            elif mode == 1:
                x = ops.neg(x)
            else:
                x = x * 2
            return x
    "#]]
    .assert_eq(&forward_source(&tree));
}

#[test]
fn dispatch_depth_is_bounded() {
    let net = NetworkDef::without_source("Net");
    let module = parse_module("class Net:\n    def construct(self, x):\n        return x\n").unwrap();
    let class = &module.body().unwrap()[0];

    let registry = ParserRegistry::with_defaults();
    let config = RewriteConfig { max_depth: 2, ..RewriteConfig::default() };
    let mut cx = ParseContext::new(&registry, &config);
    let mut tree = SymbolTree::new(&net);
    let err = cx.dispatch(&mut tree, class).unwrap_err();
    assert!(matches!(err, RewriteError::TraversalDepthExceeded { limit: 2 }));
    assert_eq!(cx.depth(), 0);
}

#[test]
fn missing_sources_and_classes_are_reported() {
    let net = NetworkDef::new("Net", "/nonexistent/reforge/net.py");
    let err = Rewriter::default().parse_network(&net).unwrap_err();
    assert!(
        matches!(err, RewriteError::SourceFileNotFound { ref network, ref path }
            if network == "Net" && path == "/nonexistent/reforge/net.py")
    );

    let file = origin_file("class Other:\n    pass\n");
    let net = NetworkDef::new("Net", file.path());
    let err = Rewriter::default().parse_network(&net).unwrap_err();
    assert!(matches!(err, RewriteError::ClassNotFound { ref class, .. } if class == "Net"));
}

#[test]
fn class_level_statements_and_methods_are_kept() {
    let source = r#"class Net(nn.Cell):
    scale = 2

    @staticmethod
    def helper(v):
        return v * 2

    def construct(self, x):
        return self.helper(x)
"#;
    let file = origin_file(source);
    let net = NetworkDef::new("Net", file.path());
    let tree = Rewriter::default().parse_network(&net).unwrap();
    let regenerated = tree.regenerate().unwrap();
    assert!(regenerated.contains("    scale = 2\n"));
    assert!(regenerated.contains("    @staticmethod\n    def helper(v):\n        return v * 2\n"));
    assert!(regenerated.contains("        helper_out = self.helper(x)\n        return helper_out\n"));
}
