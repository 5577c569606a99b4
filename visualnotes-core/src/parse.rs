// Heuristic note parser: free-form lines into a topic/subtopic/detail forest

use crate::hierarchy::{Forest, Level, NodeIndex};
use tracing::debug;

/// Separators between items on a header, numbered or delimited line
const ITEM_SEPARATORS: [char; 2] = [',', ';'];

/// Items must be longer than this after cleaning
const MIN_ITEM_LEN: usize = 2;

/// Shape of a single trimmed, non-empty line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineShape<'a> {
    /// `Title: item, item` starts a new root
    Header { title: &'a str, items: Option<&'a str> },
    /// `1. Label: item, item` adds a subtopic to the current root
    Numbered { label: &'a str, items: Option<&'a str> },
    /// `term, term; term` with no colon
    Delimited(&'a str),
    Plain(&'a str),
}

impl<'a> LineShape<'a> {
    /// Classify a trimmed line; the first matching rule wins
    pub fn classify(line: &'a str) -> Self {
        let numbered = strip_numeral(line);
        let has_colon = line.contains(':');

        if has_colon && numbered.is_none() && !line.starts_with('-') {
            let (title, items) = split_label(line);
            LineShape::Header { title, items }
        } else if let Some(content) = numbered {
            let (label, items) = split_label(content);
            LineShape::Numbered { label, items }
        } else if !has_colon && line.contains(ITEM_SEPARATORS) {
            LineShape::Delimited(line)
        } else {
            LineShape::Plain(line)
        }
    }
}

/// `"12. rest"` → `Some("rest")`
fn strip_numeral(line: &str) -> Option<&str> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    line[digits..].strip_prefix('.').map(str::trim_start)
}

/// Split at the first colon. Items stop at the next colon; anything after it
/// is dropped. An empty or blank item segment means no items.
fn split_label(text: &str) -> (&str, Option<&str>) {
    let mut parts = text.split(':');
    let label = parts.next().unwrap_or_default();
    match parts.next() {
        Some(rest) => {
            let rest = rest.trim();
            (label.trim(), (!rest.is_empty()).then_some(rest))
        }
        None => (label.trim(), None),
    }
}

/// Trim, drop a leading `and`/`or` word, and reject items of two characters or fewer
pub fn clean_item(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    let cleaned = match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) if word.eq_ignore_ascii_case("and") || word.eq_ignore_ascii_case("or") => {
            rest.trim_start()
        }
        _ => trimmed,
    };

    (cleaned.chars().count() > MIN_ITEM_LEN).then_some(cleaned)
}

fn split_items(items: &str) -> impl Iterator<Item = &str> {
    items.split(ITEM_SEPARATORS).filter_map(clean_item)
}

/// The most recent subtopic. Orphans swallow whatever is attached to them.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Attached(NodeIndex),
    Orphan,
}

#[derive(Debug, Default)]
struct Cursor {
    root: Option<NodeIndex>,
    child: Option<Slot>,
}

impl Cursor {
    /// Where loose items go: the current child first, then the current root
    fn target(&self) -> Option<NodeIndex> {
        match self.child {
            Some(Slot::Attached(child)) => Some(child),
            Some(Slot::Orphan) => None,
            None => self.root,
        }
    }
}

/// Parse free-form notes into an ordered forest.
///
/// Never fails: text that matches no rule produces fewer nodes, and input with
/// no recognisable topic produces an empty forest.
pub fn parse(text: &str) -> Forest {
    let lines: Vec<&str> = text
        .split(['\n', '\r'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let forest = match lines.as_slice() {
        [single] if is_flat_list(single) => parse_flat_list(single),
        _ => parse_lines(&lines),
    };

    debug!(
        roots = forest.root_count(),
        nodes = forest.node_count(),
        lines = lines.len(),
        "parsed notes"
    );
    forest
}

/// A lone line with commas is a list of topics, whatever else it contains
fn is_flat_list(line: &str) -> bool {
    line.contains(',')
}

fn parse_flat_list(line: &str) -> Forest {
    let mut forest = Forest::new();
    for item in line.split(',').map(str::trim).filter(|item| !item.is_empty()) {
        forest.push_root(item);
    }
    forest
}

fn parse_lines(lines: &[&str]) -> Forest {
    let mut forest = Forest::new();
    let mut cursor = Cursor::default();

    for &line in lines {
        match LineShape::classify(line) {
            LineShape::Header { title, items } => {
                if title.is_empty() {
                    debug!(line, "skipping header without a title");
                    continue;
                }
                let root = forest.push_root(title);
                cursor.root = Some(root);
                cursor.child = None;

                for item in items.into_iter().flat_map(split_items) {
                    forest.push_child(root, item, Level::Subtopic);
                }
            }
            LineShape::Numbered { label, items } => {
                if label.is_empty() {
                    continue;
                }
                let Some(root) = cursor.root else {
                    debug!(line, "dropping numbered subtopic with no topic above it");
                    cursor.child = Some(Slot::Orphan);
                    continue;
                };
                let Some(child) = forest.push_child(root, label, Level::Subtopic) else {
                    continue;
                };
                cursor.child = Some(Slot::Attached(child));

                for item in items.into_iter().flat_map(split_items) {
                    forest.push_child(child, item, Level::Detail);
                }
            }
            LineShape::Delimited(terms) => {
                let Some(target) = cursor.target() else {
                    continue;
                };
                for term in split_items(terms) {
                    forest.push_child(target, term, Level::Detail);
                }
            }
            LineShape::Plain(text) => {
                let (Some(target), Some(item)) = (cursor.target(), clean_item(text)) else {
                    continue;
                };
                let level = if cursor.child.is_some() {
                    Level::Detail
                } else {
                    Level::Subtopic
                };
                forest.push_child(target, item, level);
            }
        }
    }

    forest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_priority() {
        assert_eq!(
            LineShape::classify("Topic: a, b"),
            LineShape::Header { title: "Topic", items: Some("a, b") }
        );
        assert_eq!(
            LineShape::classify("2. Decision making"),
            LineShape::Numbered { label: "Decision making", items: None }
        );
        assert_eq!(
            LineShape::classify("3. Sub: x; y"),
            LineShape::Numbered { label: "Sub", items: Some("x; y") }
        );
        assert_eq!(LineShape::classify("one, two"), LineShape::Delimited("one, two"));
        assert_eq!(LineShape::classify("- note: aside"), LineShape::Plain("- note: aside"));
        assert_eq!(LineShape::classify("just words"), LineShape::Plain("just words"));
    }

    #[test]
    fn test_numeral_needs_a_period() {
        assert_eq!(strip_numeral("10. ten"), Some("ten"));
        assert_eq!(strip_numeral("10 ten"), None);
        assert_eq!(strip_numeral("ten. 10"), None);
    }

    #[test]
    fn test_items_stop_at_second_colon() {
        assert_eq!(split_label("Meeting: notes: alpha, beta"), ("Meeting", Some("notes")));
        assert_eq!(split_label("Meeting:: alpha"), ("Meeting", None));
        assert_eq!(split_label("no colon"), ("no colon", None));
    }

    #[test]
    fn test_header_with_blank_remainder_has_no_items() {
        assert_eq!(
            LineShape::classify("Topic:   "),
            LineShape::Header { title: "Topic", items: None }
        );
    }

    #[test]
    fn test_clean_item() {
        assert_eq!(clean_item("  and inductive "), Some("inductive"));
        assert_eq!(clean_item("OR deductive"), Some("deductive"));
        assert_eq!(clean_item("android"), Some("android"));
        assert_eq!(clean_item("and ab"), None);
        assert_eq!(clean_item("ab"), None);
        assert_eq!(clean_item("and"), Some("and"));
    }
}
