//! Minimal XPath evaluator over parsed HTML.
//!
//! Step schemas address page content with XPath-style location paths. The
//! subset implemented here covers what the observed schemas use: child and
//! descendant axes, name/`*`/`text()` node tests, attribute equality,
//! `contains(@attr, ...)`, bare-attribute and positional predicates, plus
//! `.`-anchored relative paths. Expressions are parsed once and evaluated
//! against any context node of a [`PageTree`].

use std::collections::HashSet;

use ego_tree::{NodeId, NodeRef};
use scraper::{Html, Node};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum XPathError {
    #[error("empty xpath expression")]
    Empty,
    #[error("invalid xpath step '{0}'")]
    InvalidStep(String),
    #[error("invalid xpath predicate '{0}'")]
    InvalidPredicate(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq)]
enum NodeTest {
    Name(String),
    Any,
    Text,
}

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    AttrEquals { name: String, value: String },
    AttrContains { name: String, value: String },
    HasAttr(String),
    Position(usize),
}

#[derive(Debug, Clone, PartialEq)]
struct LocationStep {
    axis: Axis,
    test: NodeTest,
    predicates: Vec<Predicate>,
}

/// Where evaluation starts: the document root (absolute paths) or the
/// caller-supplied context node (relative paths).
#[derive(Debug, Clone, Copy, PartialEq)]
enum Anchor {
    Root,
    Context,
}

/// A parsed location path.
#[derive(Debug, Clone, PartialEq)]
pub struct XPathExpr {
    anchor: Anchor,
    steps: Vec<LocationStep>,
}

impl XPathExpr {
    /// Parse an expression. `.` selects the context node itself; paths
    /// starting with `/` or `//` are absolute regardless of context.
    pub fn parse(input: &str) -> Result<Self, XPathError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(XPathError::Empty);
        }
        if s == "." {
            return Ok(Self {
                anchor: Anchor::Context,
                steps: Vec::new(),
            });
        }

        let (anchor, mut rem) = if let Some(rest) = s.strip_prefix('.') {
            if !rest.starts_with('/') {
                return Err(XPathError::InvalidStep(s.to_string()));
            }
            (Anchor::Context, rest)
        } else if s.starts_with('/') {
            (Anchor::Root, s)
        } else {
            (Anchor::Context, s)
        };

        let mut steps = Vec::new();
        let mut first = true;
        while !rem.is_empty() {
            let axis = if let Some(rest) = rem.strip_prefix("//") {
                rem = rest;
                Axis::Descendant
            } else if let Some(rest) = rem.strip_prefix('/') {
                rem = rest;
                Axis::Child
            } else if first {
                Axis::Child
            } else {
                return Err(XPathError::InvalidStep(rem.to_string()));
            };
            first = false;

            let token_end = rem.find(['/', '[']).unwrap_or(rem.len());
            let token = &rem[..token_end];
            rem = &rem[token_end..];

            let test = match token {
                "" => return Err(XPathError::InvalidStep(input.to_string())),
                "*" => NodeTest::Any,
                "text()" => NodeTest::Text,
                name if is_name(name) => NodeTest::Name(name.to_ascii_lowercase()),
                other => return Err(XPathError::InvalidStep(other.to_string())),
            };

            let mut predicates = Vec::new();
            while rem.starts_with('[') {
                let close = closing_bracket(rem)
                    .ok_or_else(|| XPathError::InvalidPredicate(rem.to_string()))?;
                predicates.push(parse_predicate(&rem[1..close])?);
                rem = &rem[close + 1..];
            }

            steps.push(LocationStep {
                axis,
                test,
                predicates,
            });
        }

        Ok(Self { anchor, steps })
    }
}

fn is_name(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':'))
}

/// Index of the `]` closing the bracket at position 0, skipping quoted text.
fn closing_bracket(s: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices().skip(1) {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, ']') => return Some(i),
            (None, _) => {}
        }
    }
    None
}

fn parse_predicate(body: &str) -> Result<Predicate, XPathError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(XPathError::InvalidPredicate(body.to_string()));
    }

    if body.chars().all(|c| c.is_ascii_digit()) {
        let position: usize = body
            .parse()
            .map_err(|_| XPathError::InvalidPredicate(body.to_string()))?;
        if position == 0 {
            return Err(XPathError::InvalidPredicate(body.to_string()));
        }
        return Ok(Predicate::Position(position));
    }

    if let Some(inner) = body
        .strip_prefix("contains(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let (name, value) = inner
            .split_once(',')
            .ok_or_else(|| XPathError::InvalidPredicate(body.to_string()))?;
        let name = name
            .trim()
            .strip_prefix('@')
            .ok_or_else(|| XPathError::InvalidPredicate(body.to_string()))?;
        let value = unquote(value.trim())
            .ok_or_else(|| XPathError::InvalidPredicate(body.to_string()))?;
        return Ok(Predicate::AttrContains {
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    if let Some(rest) = body.strip_prefix('@') {
        return match rest.split_once('=') {
            Some((name, value)) => {
                let value = unquote(value.trim())
                    .ok_or_else(|| XPathError::InvalidPredicate(body.to_string()))?;
                Ok(Predicate::AttrEquals {
                    name: name.trim().to_string(),
                    value: value.to_string(),
                })
            }
            None => Ok(Predicate::HasAttr(rest.trim().to_string())),
        };
    }

    Err(XPathError::InvalidPredicate(body.to_string()))
}

fn unquote(s: &str) -> Option<&str> {
    if s.len() >= 2 {
        let bytes = s.as_bytes();
        if (bytes[0] == b'\'' && bytes[s.len() - 1] == b'\'')
            || (bytes[0] == b'"' && bytes[s.len() - 1] == b'"')
        {
            return Some(&s[1..s.len() - 1]);
        }
    }
    None
}

/// Parsed page markup plus expression evaluation over it.
pub struct PageTree {
    document: Html,
}

impl PageTree {
    pub fn parse(markup: &str) -> Self {
        Self {
            document: Html::parse_document(markup),
        }
    }

    /// The document root, used as context for absolute container paths.
    pub fn root_id(&self) -> NodeId {
        self.document.tree.root().id()
    }

    fn node(&self, id: NodeId) -> Option<NodeRef<'_, Node>> {
        self.document.tree.get(id)
    }

    /// Evaluate `expr` with `context` as the starting node. Results are in
    /// first-seen document order, deduplicated.
    pub fn evaluate(&self, expr: &XPathExpr, context: NodeId) -> Vec<NodeId> {
        let start = match expr.anchor {
            Anchor::Root => self.root_id(),
            Anchor::Context => context,
        };

        let mut current = vec![start];
        for step in &expr.steps {
            let mut next = Vec::new();
            let mut seen = HashSet::new();
            for &ctx in &current {
                let Some(node) = self.node(ctx) else { continue };
                let mut local: Vec<NodeId> = match step.axis {
                    Axis::Child => node
                        .children()
                        .filter(|n| matches_test(n, &step.test))
                        .map(|n| n.id())
                        .collect(),
                    Axis::Descendant => node
                        .descendants()
                        .skip(1)
                        .filter(|n| matches_test(n, &step.test))
                        .map(|n| n.id())
                        .collect(),
                };
                for predicate in &step.predicates {
                    local = self.filter_by(local, predicate);
                }
                for id in local {
                    if seen.insert(id) {
                        next.push(id);
                    }
                }
            }
            current = next;
        }
        current
    }

    fn filter_by(&self, candidates: Vec<NodeId>, predicate: &Predicate) -> Vec<NodeId> {
        match predicate {
            // Position applies to the candidate list produced for one
            // context node, after any preceding predicates.
            Predicate::Position(n) => candidates.get(n - 1).copied().into_iter().collect(),
            Predicate::AttrEquals { name, value } => candidates
                .into_iter()
                .filter(|&id| self.attr(id, name).is_some_and(|a| a == value))
                .collect(),
            Predicate::AttrContains { name, value } => candidates
                .into_iter()
                .filter(|&id| self.attr(id, name).is_some_and(|a| a.contains(value.as_str())))
                .collect(),
            Predicate::HasAttr(name) => candidates
                .into_iter()
                .filter(|&id| self.attr(id, name).is_some())
                .collect(),
        }
    }

    fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id)?.value().as_element()?.attr(name)
    }

    /// Concatenated text of the node and all its descendants (the node's own
    /// text when it is a text node), untrimmed.
    pub fn text_content(&self, id: NodeId) -> String {
        let Some(node) = self.node(id) else {
            return String::new();
        };
        if let Some(text) = node.value().as_text() {
            return text.to_string();
        }
        let mut out = String::new();
        for descendant in node.descendants() {
            if let Some(text) = descendant.value().as_text() {
                out.push_str(text);
            }
        }
        out
    }
}

fn matches_test(node: &NodeRef<'_, Node>, test: &NodeTest) -> bool {
    match test {
        NodeTest::Name(name) => node
            .value()
            .as_element()
            .is_some_and(|e| e.name().eq_ignore_ascii_case(name)),
        NodeTest::Any => node.value().is_element(),
        NodeTest::Text => node.value().is_text(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div id="results">
            <ul>
              <li class="fare"><span class="p">100</span><span class="c">BRL</span></li>
              <li class="fare promo"><span class="p">80</span></li>
              <li class="ad">sponsored</li>
            </ul>
          </div>
        </body></html>
    "#;

    fn eval_all(tree: &PageTree, path: &str) -> Vec<NodeId> {
        let expr = XPathExpr::parse(path).unwrap();
        tree.evaluate(&expr, tree.root_id())
    }

    #[test]
    fn descendant_axis_finds_all_matches_in_document_order() {
        let tree = PageTree::parse(PAGE);
        let nodes = eval_all(&tree, "//li");
        assert_eq!(nodes.len(), 3);
        assert_eq!(tree.text_content(nodes[2]), "sponsored");
    }

    #[test]
    fn attribute_equality_is_exact() {
        let tree = PageTree::parse(PAGE);
        // "fare promo" is not an exact match for "fare".
        assert_eq!(eval_all(&tree, "//li[@class='fare']").len(), 1);
        assert_eq!(eval_all(&tree, "//li[contains(@class,'fare')]").len(), 2);
    }

    #[test]
    fn relative_paths_stay_within_their_context() {
        let tree = PageTree::parse(PAGE);
        let items = eval_all(&tree, "//li");
        let expr = XPathExpr::parse(".//span[@class='p']").unwrap();

        assert_eq!(tree.evaluate(&expr, items[0]).len(), 1);
        assert_eq!(tree.evaluate(&expr, items[1]).len(), 1);
        assert!(tree.evaluate(&expr, items[2]).is_empty());
    }

    #[test]
    fn absolute_field_paths_escape_the_context() {
        let tree = PageTree::parse(PAGE);
        let items = eval_all(&tree, "//li");
        let expr = XPathExpr::parse("//span").unwrap();
        // From any context, an absolute path sees the whole document.
        assert_eq!(tree.evaluate(&expr, items[2]).len(), 3);
    }

    #[test]
    fn dot_selects_the_context_node() {
        let tree = PageTree::parse(PAGE);
        let items = eval_all(&tree, "//li");
        let expr = XPathExpr::parse(".").unwrap();
        assert_eq!(tree.evaluate(&expr, items[0]), vec![items[0]]);
    }

    #[test]
    fn positional_predicate_is_one_based_per_context() {
        let tree = PageTree::parse(PAGE);
        let nodes = eval_all(&tree, "//ul/li[2]");
        assert_eq!(nodes.len(), 1);
        assert_eq!(tree.text_content(nodes[0]), "80");
    }

    #[test]
    fn child_axis_does_not_recurse() {
        let tree = PageTree::parse(PAGE);
        assert!(eval_all(&tree, "/html/body/span").is_empty());
        assert!(eval_all(&tree, "/html/li").is_empty());
        assert_eq!(eval_all(&tree, "/html/body/div/ul/li").len(), 3);
    }

    #[test]
    fn wildcard_and_has_attr() {
        let tree = PageTree::parse(PAGE);
        assert_eq!(eval_all(&tree, "//ul/*").len(), 3);
        assert_eq!(eval_all(&tree, "//*[@id]").len(), 1);
    }

    #[test]
    fn text_test_selects_text_nodes() {
        let tree = PageTree::parse(PAGE);
        let items = eval_all(&tree, "//li");
        let expr = XPathExpr::parse(".//span/text()").unwrap();
        let texts = tree.evaluate(&expr, items[0]);
        assert_eq!(texts.len(), 2);
        assert_eq!(tree.text_content(texts[0]), "100");
    }

    #[test]
    fn text_content_concatenates_descendants() {
        let tree = PageTree::parse(PAGE);
        let items = eval_all(&tree, "//li");
        assert_eq!(tree.text_content(items[0]), "100BRL");
    }

    #[test]
    fn malformed_expressions_are_typed_errors() {
        assert_eq!(XPathExpr::parse(""), Err(XPathError::Empty));
        assert!(matches!(
            XPathExpr::parse("//li[@class="),
            Err(XPathError::InvalidPredicate(_))
        ));
        assert!(matches!(
            XPathExpr::parse("//li[position()=1]"),
            Err(XPathError::InvalidPredicate(_))
        ));
        assert!(matches!(
            XPathExpr::parse("//li/..|//div"),
            Err(XPathError::InvalidStep(_))
        ));
    }
}
