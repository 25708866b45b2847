//! PHP parser adapter over tree-sitter-php.

use phpguard_core::errors::ParseError;
use tree_sitter::{Node as TsNode, Parser};

use super::ast::ParsedTree;
use super::normalizer::PhpNormalizer;

/// Longest offending-token snippet quoted in a syntax error message.
const SNIPPET_MAX_CHARS: usize = 40;

/// Parses PHP source text into a [`ParsedTree`].
///
/// Pure with respect to its input: the same text always yields an equal tree
/// or the same error.
#[derive(Clone)]
pub struct PhpParser {
    language: tree_sitter::Language,
}

impl PhpParser {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_php::LANGUAGE_PHP.into(),
        }
    }

    /// Parse `content`, failing on the first syntax error in document order.
    pub fn parse(&self, content: &str) -> Result<ParsedTree, ParseError> {
        // tree_sitter::Parser is not Sync; one per call keeps the adapter shareable.
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|_| ParseError::GrammarUnavailable {
                language: "php".to_string(),
            })?;

        let source = content.as_bytes();
        let tree = parser.parse(source, None).ok_or_else(|| ParseError::NoTree {
            message: "tree-sitter returned None".to_string(),
        })?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(syntax_error(root, source));
        }

        let lowered = PhpNormalizer.normalize(&tree, source);
        Ok(ParsedTree::new(lowered, content))
    }
}

impl Default for PhpParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a [`ParseError`] from the first ERROR or MISSING node.
fn syntax_error(root: TsNode, source: &[u8]) -> ParseError {
    let Some(bad) = first_error_node(root) else {
        return ParseError::syntax("syntax error", root.start_position().row as u32 + 1);
    };
    let line = bad.start_position().row as u32 + 1;

    if bad.is_missing() {
        return ParseError::syntax(
            format!("syntax error, missing '{}' on line {line}", bad.kind()),
            line,
        );
    }

    let text = bad.utf8_text(source).unwrap_or("");
    if is_unterminated(text) {
        return ParseError::syntax(
            format!("syntax error, unterminated string or comment starting on line {line}"),
            line,
        );
    }

    let snippet: String = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("")
        .chars()
        .take(SNIPPET_MAX_CHARS)
        .collect();
    if snippet.is_empty() {
        ParseError::syntax(format!("syntax error, unexpected end of file on line {line}"), line)
    } else {
        ParseError::syntax(format!("syntax error, unexpected '{snippet}' on line {line}"), line)
    }
}

fn first_error_node(root: TsNode) -> Option<TsNode> {
    let mut cursor = root.walk();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if !node.has_error() {
            continue;
        }
        let children: Vec<TsNode> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    None
}

/// An error region that opens a string or block comment it never closes.
fn is_unterminated(text: &str) -> bool {
    if let Some(open) = text.find("/*") {
        if !text[open + 2..].contains("*/") {
            return true;
        }
    }
    unescaped_count(text, '"') % 2 == 1 || unescaped_count(text, '\'') % 2 == 1
}

fn unescaped_count(text: &str, quote: char) -> usize {
    let mut count = 0;
    let mut escaped = false;
    for c in text.chars() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            count += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unterminated_detection() {
        assert!(is_unterminated("\"abc"));
        assert!(is_unterminated("/* open"));
        assert!(is_unterminated("$x = 'abc;"));
        assert!(!is_unterminated("/* closed */ }"));
        assert!(!is_unterminated("}"));
        assert!(!is_unterminated("'it\\'s'"));
    }
}
