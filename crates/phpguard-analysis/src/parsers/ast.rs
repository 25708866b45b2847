//! Normalized PHP syntax tree.
//!
//! The tree-sitter CST is lowered into this sum type once per parse, so rules
//! match on `NodeKind` variants instead of grammar node names.

use serde::Serialize;

/// Member visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

/// A function or method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param {
    /// Name without the leading `$`.
    pub name: String,
    pub type_hint: Option<String>,
    pub is_variadic: bool,
    /// Constructor property promotion (`public function __construct(private Foo $foo)`).
    pub is_promoted: bool,
}

/// Node kind plus its per-kind payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    Program,
    Namespace { name: String },
    /// One imported symbol; a grouped `use A\{B, C};` yields one node per symbol.
    Use { name: String, alias: Option<String> },
    Class {
        name: String,
        extends: Option<String>,
        implements: Vec<String>,
        is_abstract: bool,
    },
    Interface { name: String },
    Trait { name: String },
    Enum { name: String },
    Method {
        name: String,
        visibility: Visibility,
        is_static: bool,
        params: Vec<Param>,
    },
    Function { name: String, params: Vec<Param> },
    Closure { params: Vec<Param> },
    ClassConstant { name: String },
    Property { name: String },
    /// `new Foo(...)`; `class` is the name as written.
    New { class: String },
    FunctionCall { name: String },
    /// `$obj->method(...)` or `$obj?->method(...)`.
    MethodCall { method: String },
    /// `Foo::method(...)`.
    StaticCall { class: String, method: String },
    /// Variable name without the leading `$`.
    Variable { name: String },
    StringLiteral { value: String },
    Block,
    /// Any grammar node without a dedicated variant; keeps its tree-sitter kind.
    Other { kind: String },
}

impl NodeKind {
    /// Declared name for named declarations.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Namespace { name }
            | Self::Use { name, .. }
            | Self::Class { name, .. }
            | Self::Interface { name }
            | Self::Trait { name }
            | Self::Enum { name }
            | Self::Method { name, .. }
            | Self::Function { name, .. }
            | Self::ClassConstant { name }
            | Self::Property { name }
            | Self::Variable { name } => Some(name),
            _ => None,
        }
    }

    /// Parameters of callable nodes.
    pub fn params(&self) -> Option<&[Param]> {
        match self {
            Self::Method { params, .. } | Self::Function { params, .. } | Self::Closure { params } => {
                Some(params)
            }
            _ => None,
        }
    }

    pub fn is_class_like(&self) -> bool {
        matches!(
            self,
            Self::Class { .. } | Self::Interface { .. } | Self::Trait { .. } | Self::Enum { .. }
        )
    }
}

/// One node of the normalized tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    /// 1-based start line.
    pub line: u32,
    /// 1-based end line.
    pub end_line: u32,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind, line: u32, end_line: u32, children: Vec<Node>) -> Self {
        Self {
            kind,
            line: line.max(1),
            end_line: end_line.max(line.max(1)),
            children,
        }
    }

    /// Pre-order depth-first traversal.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Node)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }

    /// Every node (self included) matching `pred`, in document order.
    pub fn find_all(&self, pred: impl Fn(&Node) -> bool) -> Vec<&Node> {
        let mut found = Vec::new();
        self.walk(&mut |n| {
            if pred(n) {
                found.push(n);
            }
        });
        found
    }

    /// First node (self included) matching `pred`, in document order.
    pub fn find_first(&self, pred: impl Fn(&Node) -> bool) -> Option<&Node> {
        self.descendants().find(|&n| pred(n))
    }

    /// Pre-order iterator over this node and all its descendants.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Drive a [`Visitor`] over this subtree.
    pub fn walk_with<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        visitor.enter(self);
        for child in &self.children {
            child.walk_with(visitor);
        }
        visitor.exit(self);
    }
}

/// Iterator returned by [`Node::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Enter/exit hooks for rules that track enclosing scope while walking.
pub trait Visitor {
    fn enter(&mut self, node: &Node);

    fn exit(&mut self, _node: &Node) {}
}

/// Immutable parse result shared between rules through the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTree {
    root: Node,
    source: String,
}

impl ParsedTree {
    pub fn new(root: Node, source: impl Into<String>) -> Self {
        Self {
            root,
            source: source.into(),
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Text of the 1-based line `line`, without its terminator. Empty when out of range.
    pub fn line_text(&self, line: u32) -> &str {
        line.checked_sub(1)
            .and_then(|idx| self.source.lines().nth(idx as usize))
            .unwrap_or("")
    }

    pub fn line_count(&self) -> usize {
        self.source.lines().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(kind: NodeKind, line: u32) -> Node {
        Node::new(kind, line, line, vec![])
    }

    fn sample() -> Node {
        Node::new(
            NodeKind::Program,
            1,
            5,
            vec![
                Node::new(
                    NodeKind::Class {
                        name: "A".into(),
                        extends: None,
                        implements: vec![],
                        is_abstract: false,
                    },
                    2,
                    5,
                    vec![leaf(NodeKind::FunctionCall { name: "dd".into() }, 3)],
                ),
                leaf(NodeKind::FunctionCall { name: "dump".into() }, 5),
            ],
        )
    }

    #[test]
    fn walk_is_preorder() {
        let tree = sample();
        let mut lines = Vec::new();
        tree.walk(&mut |n| lines.push(n.line));
        assert_eq!(lines, vec![1, 2, 3, 5]);
    }

    #[test]
    fn descendants_matches_walk_order() {
        let tree = sample();
        let mut walked = Vec::new();
        tree.walk(&mut |n| walked.push(n.line));
        let iterated: Vec<u32> = tree.descendants().map(|n| n.line).collect();
        assert_eq!(walked, iterated);
    }

    #[test]
    fn find_all_filters_by_kind() {
        let tree = sample();
        let calls = tree.find_all(|n| matches!(n.kind, NodeKind::FunctionCall { .. }));
        assert_eq!(calls.len(), 2);
        assert!(tree
            .find_first(|n| n.kind.is_class_like())
            .is_some_and(|n| n.kind.name() == Some("A")));
    }

    #[test]
    fn visitor_sees_enter_and_exit() {
        struct Depth {
            current: usize,
            max: usize,
        }
        impl Visitor for Depth {
            fn enter(&mut self, _node: &Node) {
                self.current += 1;
                self.max = self.max.max(self.current);
            }
            fn exit(&mut self, _node: &Node) {
                self.current -= 1;
            }
        }
        let mut v = Depth { current: 0, max: 0 };
        sample().walk_with(&mut v);
        assert_eq!(v.current, 0);
        assert_eq!(v.max, 3);
    }

    #[test]
    fn line_text_is_one_based() {
        let tree = ParsedTree::new(leaf(NodeKind::Program, 1), "<?php\necho 1;\n");
        assert_eq!(tree.line_text(2), "echo 1;");
        assert_eq!(tree.line_text(0), "");
        assert_eq!(tree.line_text(9), "");
        assert_eq!(tree.line_count(), 2);
    }
}
