//! Name analysis of statements: which names a statement binds and which
//! free names it reads.

use std::convert::Infallible;
use std::sync::OnceLock;

use regex::Regex;
use reforge_syntax::{walk_node, SyntaxKind, SyntaxNode, Visitor};
use rustc_hash::{FxHashMap, FxHashSet};

const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

fn identifier_regex() -> &'static Regex {
    static IDENT: OnceLock<Regex> = OnceLock::new();
    // Strings are matched first so that their contents are skipped.
    IDENT.get_or_init(|| {
        Regex::new(r#"'(?:[^'\\]|\\.)*'|"(?:[^"\\]|\\.)*"|(\.\s*)?\b([A-Za-z_][A-Za-z0-9_]*)\b"#)
            .expect("identifier pattern is a valid regex")
    })
}

/// Collects `Name` reads in source order, without duplicates.
#[derive(Default)]
struct NameCollector {
    names: Vec<String>,
    seen: FxHashSet<String>,
    /// Names bound by enclosing lambdas, with their nesting count
    shadowed: FxHashMap<String, usize>,
}

impl NameCollector {
    fn record(&mut self, id: &str) {
        if id == "self" || self.shadowed.contains_key(id) {
            return;
        }
        if self.seen.insert(id.to_string()) {
            self.names.push(id.to_string());
        }
    }
}

impl Visitor for NameCollector {
    type Error = Infallible;

    fn visit_name(&mut self, _node: &SyntaxNode, id: &str) -> Result<(), Self::Error> {
        self.record(id);
        Ok(())
    }

    fn visit_lambda(&mut self, node: &SyntaxNode) -> Result<(), Self::Error> {
        let SyntaxKind::Lambda { params, body } = &node.kind else {
            return walk_node(self, node);
        };
        for param in params {
            for default in param.default.iter().chain(param.annotation.iter()) {
                self.visit_node(default)?;
            }
        }
        for param in params {
            *self.shadowed.entry(param.name.clone()).or_default() += 1;
        }
        self.visit_node(body)?;
        for param in params {
            if let Some(count) = self.shadowed.get_mut(&param.name) {
                *count -= 1;
                if *count == 0 {
                    self.shadowed.remove(&param.name);
                }
            }
        }
        Ok(())
    }

    fn visit_other(&mut self, _node: &SyntaxNode, _kind: &str, text: &str) -> Result<(), Self::Error> {
        for ident in verbatim_identifiers(text) {
            self.record(ident);
        }
        Ok(())
    }
}

/// Identifiers a verbatim snippet may read. Attribute names after a `.`,
/// keywords and string contents are skipped. The result over-approximates,
/// which only ever adds dependencies.
fn verbatim_identifiers(text: &str) -> impl Iterator<Item = &str> {
    identifier_regex().captures_iter(text).filter_map(|caps| {
        if caps.get(1).is_some() {
            return None;
        }
        let ident = caps.get(2)?.as_str();
        (!KEYWORDS.contains(&ident)).then_some(ident)
    })
}

/// Free names read by `node`, in source order. `self` is never reported.
pub fn free_names(node: &SyntaxNode) -> Vec<String> {
    let mut collector = NameCollector::default();
    match collector.visit_node(node) {
        Ok(()) => collector.names,
        Err(never) => match never {},
    }
}

/// Names bound by an assignment target: plain names and starred names,
/// possibly nested in tuples or lists.
pub fn bound_names(target: &SyntaxNode, out: &mut Vec<String>) {
    fn bind(id: &str, out: &mut Vec<String>) {
        if !out.iter().any(|name| name == id) {
            out.push(id.to_string());
        }
    }

    match &target.kind {
        SyntaxKind::Name { id } => bind(id, out),
        SyntaxKind::Tuple { elts } => {
            for elt in elts {
                bound_names(elt, out);
            }
        }
        // `*rest` inside an unpacking target
        SyntaxKind::Other { kind, text } if kind == "list_splat_pattern" || kind == "list_splat" => {
            let name = text.trim_start_matches('*').trim();
            if is_identifier(name) {
                bind(name, out);
            }
        }
        _ => {}
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
        && !KEYWORDS.contains(&text)
}

/// Returns `(targets, inputs)` of a statement.
pub fn analyze_statement(stmt: &SyntaxNode) -> (Vec<String>, Vec<String>) {
    fn push_inputs(node: &SyntaxNode, inputs: &mut Vec<String>) {
        for name in free_names(node) {
            if !inputs.contains(&name) {
                inputs.push(name);
            }
        }
    }

    let mut targets = Vec::new();
    let mut inputs = Vec::new();

    match &stmt.kind {
        SyntaxKind::Assign { targets: lhs, value } => {
            push_inputs(value, &mut inputs);
            for target in lhs {
                bound_names(target, &mut targets);
                // Subscript and attribute targets read their base.
                if !matches!(target.kind, SyntaxKind::Name { .. } | SyntaxKind::Tuple { .. }) {
                    push_inputs(target, &mut inputs);
                }
            }
        }
        SyntaxKind::AugAssign { target, value, .. } => {
            push_inputs(target, &mut inputs);
            push_inputs(value, &mut inputs);
            bound_names(target, &mut targets);
        }
        SyntaxKind::Import { names } | SyntaxKind::ImportFrom { names, .. } => {
            targets.extend(
                names
                    .iter()
                    .filter(|alias| alias.name != "*")
                    .map(|alias| alias.bound_name().to_string()),
            );
        }
        _ => push_inputs(stmt, &mut inputs),
    }
    (targets, inputs)
}

#[cfg(test)]
mod tests {
    use reforge_syntax::parse_module;

    use super::*;

    fn first_statement(source: &str) -> SyntaxNode {
        let module = parse_module(source).unwrap();
        module.body().unwrap()[0].clone()
    }

    #[test]
    fn assignment_binds_targets_and_reads_value() {
        let stmt = first_statement("a, b = self.split(x, y=z)\n");
        let (targets, inputs) = analyze_statement(&stmt);
        assert_eq!(targets, ["a", "b"]);
        assert_eq!(inputs, ["x", "z"]);
    }

    #[test]
    fn starred_and_list_targets_are_bound() {
        let (targets, inputs) = analyze_statement(&first_statement("a, *rest = self.split(x)\n"));
        assert_eq!(targets, ["a", "rest"]);
        assert_eq!(inputs, ["x"]);

        let (targets, _) = analyze_statement(&first_statement("[head, *tail] = xs\n"));
        assert_eq!(targets, ["head", "tail"]);
    }

    #[test]
    fn augmented_assignment_reads_its_target() {
        let (targets, inputs) = analyze_statement(&first_statement("x += y\n"));
        assert_eq!(targets, ["x"]);
        assert_eq!(inputs, ["x", "y"]);
    }

    #[test]
    fn lambda_parameters_are_not_free() {
        let (targets, inputs) = analyze_statement(&first_statement("f = lambda a, b=c: a + b + d\n"));
        assert_eq!(targets, ["f"]);
        assert_eq!(inputs, ["c", "d"]);
    }

    #[test]
    fn verbatim_text_is_scanned_for_identifiers() {
        let stmt = first_statement("for i in range(n):\n    x = self.fc(x, 'not_a_name')\n");
        assert_eq!(free_names(&stmt), ["i", "range", "n", "x"]);
    }
}
