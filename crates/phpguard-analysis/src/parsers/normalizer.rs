//! Lowers a tree-sitter-php CST into the engine's [`Node`] sum type.
//!
//! Grammar nodes with a dedicated [`NodeKind`] variant are mapped explicitly;
//! everything else becomes `NodeKind::Other` and keeps its named children so
//! traversal still reaches nested calls and declarations.

use tree_sitter::Node as TsNode;

use super::ast::{Node, NodeKind, Param, Visibility};

/// Nesting beyond this depth is truncated to a childless `Other` node.
const MAX_DEPTH: usize = 256;

/// Stateless CST → AST lowering for PHP.
pub struct PhpNormalizer;

impl PhpNormalizer {
    /// Normalize a whole tree-sitter tree.
    pub fn normalize(&self, tree: &tree_sitter::Tree, source: &[u8]) -> Node {
        let root = tree.root_node();
        let children = self.normalize_children(&root, source, 1);
        Node::new(NodeKind::Program, start_line(&root), end_line(&root), children)
    }

    fn normalize_node(&self, node: &TsNode, source: &[u8], depth: usize) -> Node {
        if depth > MAX_DEPTH {
            return self.leaf(node, NodeKind::Other { kind: node.kind().to_string() });
        }

        let kind = match node.kind() {
            "namespace_definition" => NodeKind::Namespace {
                name: field_text(node, "name", source).unwrap_or_default(),
            },
            "namespace_use_declaration" => return self.normalize_use_declaration(node, source),
            "class_declaration" => self.class_kind(node, source),
            "interface_declaration" => NodeKind::Interface {
                name: field_text(node, "name", source).unwrap_or_default(),
            },
            "trait_declaration" => NodeKind::Trait {
                name: field_text(node, "name", source).unwrap_or_default(),
            },
            "enum_declaration" => NodeKind::Enum {
                name: field_text(node, "name", source).unwrap_or_default(),
            },
            "method_declaration" => NodeKind::Method {
                name: field_text(node, "name", source).unwrap_or_default(),
                visibility: visibility_of(node, source),
                is_static: has_child_kind(node, "static_modifier"),
                params: self.params_of(node, source),
            },
            "function_definition" => NodeKind::Function {
                name: field_text(node, "name", source).unwrap_or_default(),
                params: self.params_of(node, source),
            },
            "anonymous_function" | "anonymous_function_creation_expression" | "arrow_function" => {
                NodeKind::Closure {
                    params: self.params_of(node, source),
                }
            }
            "const_element" => NodeKind::ClassConstant {
                name: first_child_text(node, &["name"], source).unwrap_or_default(),
            },
            "property_element" => NodeKind::Property {
                name: first_child_text(node, &["variable_name"], source)
                    .map(|s| s.trim_start_matches('$').to_string())
                    .unwrap_or_default(),
            },
            "object_creation_expression" => NodeKind::New {
                class: first_child_text(node, &["qualified_name", "name"], source)
                    .unwrap_or_default(),
            },
            "function_call_expression" => NodeKind::FunctionCall {
                name: field_text(node, "function", source).unwrap_or_default(),
            },
            "member_call_expression" | "nullsafe_member_call_expression" => NodeKind::MethodCall {
                method: field_text(node, "name", source).unwrap_or_default(),
            },
            "scoped_call_expression" => NodeKind::StaticCall {
                class: field_text(node, "scope", source).unwrap_or_default(),
                method: field_text(node, "name", source).unwrap_or_default(),
            },
            "variable_name" => NodeKind::Variable {
                name: node_text(node, source).trim_start_matches('$').to_string(),
            },
            "string" | "encapsed_string" => NodeKind::StringLiteral {
                value: strip_quotes(node_text(node, source)).to_string(),
            },
            "compound_statement" => NodeKind::Block,
            other => NodeKind::Other { kind: other.to_string() },
        };

        let children = self.normalize_children(node, source, depth + 1);
        Node::new(kind, start_line(node), end_line(node), children)
    }

    fn normalize_children(&self, node: &TsNode, source: &[u8], depth: usize) -> Vec<Node> {
        let mut children = Vec::new();
        let count = node.child_count();
        for i in 0..count {
            if let Some(child) = node.child(i) {
                // Keywords and punctuation carry no information once lowered.
                if child.is_named() && child.kind() != "comment" {
                    children.push(self.normalize_node(&child, source, depth));
                }
            }
        }
        children
    }

    fn leaf(&self, node: &TsNode, kind: NodeKind) -> Node {
        Node::new(kind, start_line(node), end_line(node), Vec::new())
    }

    fn class_kind(&self, node: &TsNode, source: &[u8]) -> NodeKind {
        let extends = find_child_node(node, "base_clause")
            .and_then(|base| first_child_text(&base, &["qualified_name", "name"], source));
        let implements = find_child_node(node, "class_interface_clause")
            .map(|clause| children_text(&clause, &["qualified_name", "name"], source))
            .unwrap_or_default();
        let is_abstract = has_child_kind(node, "abstract_modifier")
            || node_text(node, source).trim_start().starts_with("abstract");

        NodeKind::Class {
            name: field_text(node, "name", source).unwrap_or_default(),
            extends,
            implements,
            is_abstract,
        }
    }

    /// `use A\B;`, `use A\B as C, D\E;` and `use A\{B, C as D};`.
    fn normalize_use_declaration(&self, node: &TsNode, source: &[u8]) -> Node {
        let mut uses = Vec::new();
        let prefix = find_child_node(node, "namespace_name")
            .map(|n| node_text(&n, source).trim_matches('\\').to_string());

        let count = node.child_count();
        for i in 0..count {
            let Some(child) = node.child(i) else { continue };
            match child.kind() {
                "namespace_use_clause" => {
                    if let Some(u) = self.use_clause(&child, None, source) {
                        uses.push(u);
                    }
                }
                "namespace_use_group" => {
                    let inner = child.child_count();
                    for j in 0..inner {
                        let Some(clause) = child.child(j) else { continue };
                        if matches!(
                            clause.kind(),
                            "namespace_use_clause" | "namespace_use_group_clause"
                        ) {
                            if let Some(u) = self.use_clause(&clause, prefix.as_deref(), source) {
                                uses.push(u);
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        Node::new(
            NodeKind::Other { kind: node.kind().to_string() },
            start_line(node),
            end_line(node),
            uses,
        )
    }

    fn use_clause(&self, clause: &TsNode, prefix: Option<&str>, source: &[u8]) -> Option<Node> {
        let name = first_child_text(clause, &["qualified_name", "namespace_name", "name"], source)?;
        let name = name.trim_start_matches('\\');
        let full = match prefix {
            Some(p) if !p.is_empty() => format!("{p}\\{name}"),
            _ => name.to_string(),
        };

        let alias = field_text(clause, "alias", source)
            .or_else(|| {
                find_child_node(clause, "namespace_aliasing_clause")
                    .and_then(|a| first_child_text(&a, &["name"], source))
            })
            .or_else(|| {
                // Older grammars: `name` `as` `name` directly under the clause.
                if has_child_kind(clause, "as") {
                    children_text(clause, &["name"], source).into_iter().last()
                } else {
                    None
                }
            });

        Some(self.leaf(clause, NodeKind::Use { name: full, alias }))
    }

    fn params_of(&self, node: &TsNode, source: &[u8]) -> Vec<Param> {
        let Some(params) = find_child_node(node, "parameters") else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let count = params.child_count();
        for i in 0..count {
            let Some(p) = params.child(i) else { continue };
            let (is_variadic, is_promoted) = match p.kind() {
                "simple_parameter" => (false, false),
                "variadic_parameter" => (true, false),
                "property_promotion_parameter" => (false, true),
                _ => continue,
            };
            let name = field_text(&p, "name", source)
                .or_else(|| first_child_text(&p, &["variable_name"], source))
                .unwrap_or_default()
                .trim_start_matches('$')
                .to_string();
            let type_hint = field_text(&p, "type", source);
            out.push(Param {
                name,
                type_hint,
                is_variadic,
                is_promoted,
            });
        }
        out
    }
}

fn visibility_of(node: &TsNode, source: &[u8]) -> Visibility {
    match find_child_node(node, "visibility_modifier").map(|n| node_text(&n, source).to_ascii_lowercase()) {
        Some(v) if v == "private" => Visibility::Private,
        Some(v) if v == "protected" => Visibility::Protected,
        _ => Visibility::Public,
    }
}

fn start_line(node: &TsNode) -> u32 {
    node.start_position().row as u32 + 1
}

fn end_line(node: &TsNode) -> u32 {
    node.end_position().row as u32 + 1
}

fn node_text<'a>(node: &TsNode, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

fn field_text(node: &TsNode, field: &str, source: &[u8]) -> Option<String> {
    node.child_by_field_name(field)
        .map(|n| node_text(&n, source).to_string())
        .filter(|s| !s.is_empty())
}

fn find_child_node<'a>(node: &TsNode<'a>, kind: &str) -> Option<TsNode<'a>> {
    node.child_by_field_name(kind).or_else(|| {
        let count = node.child_count();
        for i in 0..count {
            if let Some(child) = node.child(i) {
                if child.kind() == kind {
                    return Some(child);
                }
            }
        }
        None
    })
}

/// Text of the first direct child whose kind is in `kinds`.
fn first_child_text(node: &TsNode, kinds: &[&str], source: &[u8]) -> Option<String> {
    let count = node.child_count();
    for i in 0..count {
        if let Some(child) = node.child(i) {
            if kinds.contains(&child.kind()) {
                return Some(node_text(&child, source).to_string());
            }
        }
    }
    None
}

/// Text of every direct child whose kind is in `kinds`.
fn children_text(node: &TsNode, kinds: &[&str], source: &[u8]) -> Vec<String> {
    let mut out = Vec::new();
    let count = node.child_count();
    for i in 0..count {
        if let Some(child) = node.child(i) {
            if kinds.contains(&child.kind()) {
                out.push(node_text(&child, source).to_string());
            }
        }
    }
    out
}

fn has_child_kind(node: &TsNode, kind: &str) -> bool {
    let count = node.child_count();
    for i in 0..count {
        if let Some(child) = node.child(i) {
            if child.kind() == kind {
                return true;
            }
        }
    }
    false
}

fn strip_quotes(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| s.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
        .unwrap_or(s)
}
