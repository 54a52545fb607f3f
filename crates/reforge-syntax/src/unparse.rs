//! Pretty printer turning [`SyntaxNode`]s back into Python source.
//!
//! Parentheses are not stored in the tree; they are re-derived from operator
//! precedence, so `(a + b) * c` survives a round trip while redundant
//! parentheses are dropped.

use crate::ast::{Keyword, Param, ParamKind, SyntaxKind, SyntaxNode};

const INDENT: &str = "    ";

mod prec {
    pub const TUPLE: u8 = 0;
    pub const LAMBDA: u8 = 1;
    pub const TEST: u8 = 2;
    pub const OR: u8 = 3;
    pub const AND: u8 = 4;
    pub const NOT: u8 = 5;
    pub const CMP: u8 = 6;
    pub const BOR: u8 = 7;
    pub const BXOR: u8 = 8;
    pub const BAND: u8 = 9;
    pub const SHIFT: u8 = 10;
    pub const ARITH: u8 = 11;
    pub const TERM: u8 = 12;
    pub const UNARY: u8 = 13;
    pub const POWER: u8 = 14;
    pub const AWAIT: u8 = 15;
    pub const ATOM: u8 = 16;
}

/// Un-parses any node. Statements end with a newline, expressions do not.
pub fn unparse(node: &SyntaxNode) -> String {
    let mut printer = Printer::default();
    if node.node_kind().is_statement() {
        printer.stmt(node);
    } else {
        printer.out.push_str(&expr(node, prec::TUPLE));
    }
    printer.out
}

/// Un-parses a statement sequence at indentation level zero.
pub fn unparse_block(stmts: &[SyntaxNode]) -> String {
    let mut printer = Printer::default();
    printer.block(stmts);
    printer.out
}

/// Un-parses an expression without surrounding parentheses.
pub fn unparse_expr(node: &SyntaxNode) -> String {
    expr(node, prec::TUPLE)
}

#[derive(Default)]
struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn block(&mut self, stmts: &[SyntaxNode]) {
        for (index, stmt) in stmts.iter().enumerate() {
            let is_def = matches!(stmt.kind, SyntaxKind::ClassDef { .. } | SyntaxKind::FunctionDef { .. });
            if is_def && index > 0 {
                self.out.push('\n');
            }
            self.stmt(stmt);
        }
    }

    fn suite(&mut self, stmts: &[SyntaxNode]) {
        self.indent += 1;
        if stmts.is_empty() {
            self.line("pass");
        } else {
            self.block(stmts);
        }
        self.indent -= 1;
    }

    fn stmt(&mut self, node: &SyntaxNode) {
        match &node.kind {
            SyntaxKind::Module { body } => self.block(body),
            SyntaxKind::ClassDef { name, bases, keywords, decorators, body } => {
                self.decorators(decorators);
                let header = if bases.is_empty() && keywords.is_empty() {
                    format!("class {}:", name)
                } else {
                    format!("class {}({}):", name, arguments(bases, keywords))
                };
                self.line(&header);
                self.suite(body);
            }
            SyntaxKind::FunctionDef { name, params, returns, decorators, body } => {
                self.decorators(decorators);
                let mut header = format!("def {}({})", name, parameters(params));
                if let Some(returns) = returns {
                    header.push_str(" -> ");
                    header.push_str(&expr(returns, prec::TEST));
                }
                header.push(':');
                self.line(&header);
                self.suite(body);
            }
            SyntaxKind::Return { value } => match value {
                Some(value) => self.line(&format!("return {}", expr(value, prec::TUPLE))),
                None => self.line("return"),
            },
            SyntaxKind::Assign { targets, value } => {
                let mut text = String::new();
                for target in targets {
                    text.push_str(&expr(target, prec::TUPLE));
                    text.push_str(" = ");
                }
                text.push_str(&expr(value, prec::TUPLE));
                self.line(&text);
            }
            SyntaxKind::AugAssign { target, op, value } => {
                let text = format!("{} {} {}", expr(target, prec::TUPLE), op, expr(value, prec::TUPLE));
                self.line(&text);
            }
            SyntaxKind::If { .. } => self.if_chain(node, "if"),
            SyntaxKind::Expr { value } => self.line(&expr(value, prec::TUPLE)),
            SyntaxKind::Pass => self.line("pass"),
            SyntaxKind::Import { names } => {
                let names: Vec<String> = names.iter().map(alias).collect();
                self.line(&format!("import {}", names.join(", ")));
            }
            SyntaxKind::ImportFrom { module, names, level } => {
                let names: Vec<String> = names.iter().map(alias).collect();
                let module = format!("{}{}", ".".repeat(*level), module.as_deref().unwrap_or_default());
                self.line(&format!("from {} import {}", module, names.join(", ")));
            }
            SyntaxKind::Other { text, .. } => self.verbatim(text, node.position.indent()),
            _ => self.line(&expr(node, prec::TUPLE)),
        }
    }

    fn if_chain(&mut self, node: &SyntaxNode, keyword: &str) {
        let SyntaxKind::If { test, body, orelse } = &node.kind else {
            return;
        };
        self.line(&format!("{} {}:", keyword, expr(test, prec::TEST)));
        self.suite(body);
        match orelse.as_slice() {
            [] => {}
            [nested @ SyntaxNode { kind: SyntaxKind::If { .. }, .. }] => self.if_chain(nested, "elif"),
            stmts => {
                self.line("else:");
                self.suite(stmts);
            }
        }
    }

    fn decorators(&mut self, decorators: &[SyntaxNode]) {
        for decorator in decorators {
            self.line(&format!("@{}", expr(decorator, prec::TEST)));
        }
    }

    /// Re-indents verbatim statement text whose continuation lines carry the
    /// indentation of their original location.
    /// Lines that begin inside a string literal are copied unchanged.
    fn verbatim(&mut self, text: &str, original_indent: usize) {
        let in_string = lines_in_strings(text);
        for (index, raw) in text.lines().enumerate() {
            if in_string.get(index).copied().unwrap_or(false) {
                self.out.push_str(raw);
                self.out.push('\n');
                continue;
            }
            let line = if index == 0 {
                raw
            } else {
                let leading = raw.bytes().take_while(|b| matches!(b, b' ' | b'\t')).count();
                &raw[leading.min(original_indent)..]
            };
            if line.trim().is_empty() {
                self.out.push('\n');
            } else {
                self.line(line);
            }
        }
    }
}

/// For each line of `text`, whether it begins inside a string literal.
fn lines_in_strings(text: &str) -> Vec<bool> {
    let bytes = text.as_bytes();
    let mut lines = vec![false];
    // Quote byte and delimiter length of the open string
    let mut open: Option<(u8, usize)> = None;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match open {
            Some((quote, len)) => {
                if b == b'\\' {
                    if bytes.get(i + 1) == Some(&b'\n') {
                        lines.push(true);
                    }
                    i += 2;
                    continue;
                }
                if b == quote && bytes[i..].iter().take(len).filter(|&&c| c == quote).count() == len {
                    open = None;
                    i += len;
                    continue;
                }
                if b == b'\n' {
                    // An unterminated single-quoted string ends at the newline.
                    if len == 1 {
                        open = None;
                    }
                    lines.push(open.is_some());
                }
                i += 1;
            }
            None => {
                match b {
                    b'#' => {
                        while i < bytes.len() && bytes[i] != b'\n' {
                            i += 1;
                        }
                        continue;
                    }
                    b'\'' | b'"' => {
                        let len = if bytes[i..].starts_with(&[b, b, b]) { 3 } else { 1 };
                        open = Some((b, len));
                        i += len;
                        continue;
                    }
                    b'\n' => lines.push(false),
                    _ => {}
                }
                i += 1;
            }
        }
    }
    lines
}

/// `1.real` lexes as the float `1.` followed by a name.
fn is_decimal_integer(text: &str) -> bool {
    text.starts_with(|c: char| c.is_ascii_digit()) && text.bytes().all(|b| b.is_ascii_digit() || b == b'_')
}

fn alias(alias: &crate::ast::Alias) -> String {
    match &alias.asname {
        Some(asname) => format!("{} as {}", alias.name, asname),
        None => alias.name.clone(),
    }
}

fn parameters(params: &[Param]) -> String {
    params.iter().map(parameter).collect::<Vec<_>>().join(", ")
}

fn parameter(param: &Param) -> String {
    let mut text = match param.kind {
        ParamKind::Normal => param.name.clone(),
        ParamKind::VarArgs => format!("*{}", param.name),
        ParamKind::KwArgs => format!("**{}", param.name),
        ParamKind::KeywordSeparator => return "*".to_string(),
        ParamKind::PositionalSeparator => return "/".to_string(),
    };
    if let Some(annotation) = &param.annotation {
        text.push_str(": ");
        text.push_str(&expr(annotation, prec::TEST));
    }
    if let Some(default) = &param.default {
        text.push_str(if param.annotation.is_some() { " = " } else { "=" });
        text.push_str(&expr(default, prec::TEST));
    }
    text
}

fn arguments(args: &[SyntaxNode], keywords: &[Keyword]) -> String {
    let mut parts: Vec<String> = args.iter().map(|arg| expr(arg, prec::LAMBDA)).collect();
    for keyword in keywords {
        parts.push(match &keyword.arg {
            Some(arg) => format!("{}={}", arg, expr(&keyword.value, prec::LAMBDA)),
            None => format!("**{}", expr(&keyword.value, prec::LAMBDA)),
        });
    }
    parts.join(", ")
}

fn binary_precedence(op: &str) -> u8 {
    match op {
        "or" => prec::OR,
        "and" => prec::AND,
        "|" => prec::BOR,
        "^" => prec::BXOR,
        "&" => prec::BAND,
        "<<" | ">>" => prec::SHIFT,
        "+" | "-" => prec::ARITH,
        "*" | "/" | "//" | "%" | "@" => prec::TERM,
        "**" => prec::POWER,
        _ => prec::CMP,
    }
}

/// Verbatim expressions that never need wrapping.
fn is_atomic_kind(kind: &str) -> bool {
    matches!(
        kind,
        "subscript"
            | "list"
            | "dictionary"
            | "set"
            | "list_comprehension"
            | "dictionary_comprehension"
            | "set_comprehension"
            | "generator_expression"
            | "parenthesized_expression"
            | "list_splat"
            | "list_splat_pattern"
            | "dictionary_splat"
            | "string"
            | "concatenated_string"
            | "slice"
    )
}

fn precedence(node: &SyntaxNode) -> u8 {
    match &node.kind {
        SyntaxKind::Tuple { elts } if elts.is_empty() => prec::ATOM,
        SyntaxKind::Tuple { .. } => prec::TUPLE,
        SyntaxKind::Lambda { .. } => prec::LAMBDA,
        SyntaxKind::BinOp { op, .. } => binary_precedence(op),
        SyntaxKind::UnaryOp { op, .. } if op == "not" => prec::NOT,
        SyntaxKind::UnaryOp { .. } => prec::UNARY,
        SyntaxKind::Other { kind, .. } if is_atomic_kind(kind) => prec::ATOM,
        SyntaxKind::Other { kind, .. } if kind == "await" => prec::AWAIT,
        SyntaxKind::Other { kind, .. } if kind == "conditional_expression" => prec::TEST,
        SyntaxKind::Other { .. } => prec::TUPLE,
        _ => prec::ATOM,
    }
}

fn expr(node: &SyntaxNode, min_prec: u8) -> String {
    let text = raw_expr(node);
    if precedence(node) < min_prec {
        format!("({})", text)
    } else {
        text
    }
}

fn raw_expr(node: &SyntaxNode) -> String {
    match &node.kind {
        SyntaxKind::Name { id } => id.clone(),
        SyntaxKind::Constant { value } => value.clone(),
        SyntaxKind::Attribute { value, attr } => match &value.kind {
            SyntaxKind::Constant { value: literal } if is_decimal_integer(literal) => {
                format!("({}).{}", literal, attr)
            }
            _ => format!("{}.{}", expr(value, prec::ATOM), attr),
        },
        SyntaxKind::Call { func, args, keywords } => {
            format!("{}({})", expr(func, prec::ATOM), arguments(args, keywords))
        }
        SyntaxKind::BinOp { left, op, right } => {
            let p = binary_precedence(op);
            let (left_min, right_min) = match op.as_str() {
                "**" => (p + 1, p),
                _ if p == prec::CMP => (p + 1, p + 1),
                _ => (p, p + 1),
            };
            format!("{} {} {}", expr(left, left_min), op, expr(right, right_min))
        }
        SyntaxKind::UnaryOp { op, operand } if op == "not" => format!("not {}", expr(operand, prec::NOT)),
        SyntaxKind::UnaryOp { op, operand } => format!("{}{}", op, expr(operand, prec::UNARY)),
        SyntaxKind::Lambda { params, body } => {
            if params.is_empty() {
                format!("lambda: {}", expr(body, prec::LAMBDA))
            } else {
                format!("lambda {}: {}", parameters(params), expr(body, prec::LAMBDA))
            }
        }
        SyntaxKind::Tuple { elts } => match elts.as_slice() {
            [] => "()".to_string(),
            [single] => format!("{},", expr(single, prec::LAMBDA)),
            elts => elts.iter().map(|e| expr(e, prec::LAMBDA)).collect::<Vec<_>>().join(", "),
        },
        SyntaxKind::Other { text, .. } => text.clone(),
        // Statements in expression position only occur in malformed trees.
        _ => unparse(node).trim_end().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use expect_test::expect;

    use super::*;
    use crate::parser::parse_module;

    fn round_trip(source: &str) -> String {
        unparse(&parse_module(source).unwrap())
    }

    #[test]
    fn precedence_restores_needed_parentheses() {
        let module = parse_module("y = (a + b) * c\nz = a + (b * c)\nw = (-x) ** 2\n").unwrap();
        expect![[r#"
            y = (a + b) * c
            z = a + b * c
            w = (-x) ** 2
        "#]]
        .assert_eq(&unparse(&module));
    }

    #[test]
    fn network_class_round_trips() {
        let source = r#"import numpy as np
from mindspore import nn, ops


class Net(nn.Cell):
    def __init__(self, channels=3, *, bias: bool = True):
        super().__init__()
        self.conv = nn.Conv2d(channels, 8, 3, has_bias=bias)

    def construct(self, x):
        x = self.conv(x)
        if x.shape[0] > 1:
            x = ops.relu(x)
        elif self.training:
            x += 1
        else:
            pass
        return x, lambda a: a
"#;
        expect![[r#"
            import numpy as np
            from mindspore import nn, ops

            class Net(nn.Cell):
                def __init__(self, channels=3, *, bias: bool = True):
                    super().__init__()
                    self.conv = nn.Conv2d(channels, 8, 3, has_bias=bias)

                def construct(self, x):
                    x = self.conv(x)
                    if x.shape[0] > 1:
                        x = ops.relu(x)
                    elif self.training:
                        x += 1
                    else:
                        pass
                    return x, lambda a: a
        "#]]
        .assert_eq(&round_trip(source));
    }

    #[test]
    fn verbatim_statements_are_reindented() {
        let source = "def f(xs):\n    for x in xs:\n        print(x)\n";
        let module = parse_module(source).unwrap();
        let body = module.body().unwrap()[0].body().unwrap().to_vec();
        expect![[r#"
            for x in xs:
                print(x)
        "#]]
        .assert_eq(&unparse_block(&body));
    }

    #[test]
    fn verbatim_string_lines_are_left_alone() {
        let source = "def f(xs):\n    for x in xs:\n        s = \"\"\"\n   \u{3000}a\n        b\"\"\"\n        print(s)\n";
        let module = parse_module(source).unwrap();
        let body = module.body().unwrap()[0].body().unwrap().to_vec();
        assert_eq!(
            unparse_block(&body),
            "for x in xs:\n    s = \"\"\"\n   \u{3000}a\n        b\"\"\"\n    print(s)\n"
        );
    }

    #[test]
    fn verbatim_indent_only_strips_ascii_whitespace() {
        // Indented by two spaces and an ideographic space; only the spaces go.
        let body = [SyntaxNode::new(
            SyntaxKind::Other { kind: "while_statement".to_string(), text: "while x:\n  \u{3000}y()".to_string() },
            (0..0).into(),
            crate::location::Position::new(1, 4),
        )];
        assert_eq!(unparse_block(&body), "while x:\n\u{3000}y()\n");
    }

    #[test]
    fn integer_attribute_base_is_parenthesized() {
        let module = parse_module("y = (1).real\nz = 1.5.real\n").unwrap();
        expect![[r#"
            y = (1).real
            z = 1.5.real
        "#]]
        .assert_eq(&unparse(&module));
        assert!(parse_module(&unparse(&module)).is_ok());
    }

    #[test]
    fn multi_line_operators_regenerate_on_one_line() {
        let source = "out = (self.a(x) +  # residual\n       self.b(x))\ny = a + \\\n    b\n";
        let printed = round_trip(source);
        expect![[r#"
            out = self.a(x) + self.b(x)
            y = a + b
        "#]]
        .assert_eq(&printed);
        assert!(parse_module(&printed).is_ok());
    }

    #[test]
    fn relative_imports_keep_their_level() {
        expect![[r#"
            from ..layers import Dense as D, Conv
            from . import utils
        "#]]
        .assert_eq(&round_trip("from ..layers import Dense as D, Conv\nfrom . import utils\n"));
    }
}
