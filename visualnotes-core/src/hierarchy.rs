// Pre-layout tree form of parsed notes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Depth of a node in the topic → subtopic → detail hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Level {
    Topic,
    Subtopic,
    Detail,
}

impl Level {
    pub fn as_u8(&self) -> u8 {
        match self {
            Level::Topic => 0,
            Level::Subtopic => 1,
            Level::Detail => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Topic => "topic",
            Level::Subtopic => "subtopic",
            Level::Detail => "detail",
        }
    }

    /// Level one step further from the root, saturating at `Detail`
    pub fn deeper(&self) -> Level {
        match self {
            Level::Topic => Level::Subtopic,
            Level::Subtopic | Level::Detail => Level::Detail,
        }
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.as_u8()
    }
}

impl TryFrom<u8> for Level {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Level::Topic),
            1 => Ok(Level::Subtopic),
            2 => Ok(Level::Detail),
            other => Err(format!("invalid hierarchy level {}", other)),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Index of a node inside its owning [`Forest`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeIndex(usize);

impl NodeIndex {
    pub fn get(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyNode {
    pub label: String,
    pub level: Level,
    pub children: Vec<NodeIndex>,
    /// Owning node, `None` for roots
    pub parent: Option<NodeIndex>,
}

/// Ordered forest of hierarchy nodes.
///
/// Nodes live in a flat arena and refer to each other by [`NodeIndex`], so the
/// parent back-reference never owns anything. Roots are kept in source order.
/// Only the methods below create nodes, and indices from another forest
/// resolve to nothing rather than panicking.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Forest {
    nodes: Vec<HierarchyNode>,
    roots: Vec<NodeIndex>,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new level-0 root
    pub fn push_root(&mut self, label: impl Into<String>) -> NodeIndex {
        let index = self.alloc(label.into(), Level::Topic, None);
        self.roots.push(index);
        index
    }

    /// Append a child to `parent`, keeping source order.
    ///
    /// Returns `None` when `parent` is not a node of this forest.
    pub fn push_child(&mut self, parent: NodeIndex, label: impl Into<String>, level: Level) -> Option<NodeIndex> {
        let index = NodeIndex(self.nodes.len());
        self.nodes.get_mut(parent.0)?.children.push(index);
        Some(self.alloc(label.into(), level, Some(parent)))
    }

    fn alloc(&mut self, label: String, level: Level, parent: Option<NodeIndex>) -> NodeIndex {
        let index = NodeIndex(self.nodes.len());
        self.nodes.push(HierarchyNode {
            label,
            level,
            children: Vec::new(),
            parent,
        });
        index
    }

    pub fn roots(&self) -> impl Iterator<Item = (NodeIndex, &HierarchyNode)> + '_ {
        self.roots.iter().filter_map(|&index| self.entry(index))
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    pub fn get(&self, index: NodeIndex) -> Option<&HierarchyNode> {
        self.nodes.get(index.0)
    }

    pub fn children(&self, index: NodeIndex) -> impl Iterator<Item = (NodeIndex, &HierarchyNode)> + '_ {
        self.nodes
            .get(index.0)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|&child| self.entry(child))
    }

    pub fn parent(&self, index: NodeIndex) -> Option<(NodeIndex, &HierarchyNode)> {
        let parent = self.nodes.get(index.0)?.parent?;
        self.entry(parent)
    }

    fn entry(&self, index: NodeIndex) -> Option<(NodeIndex, &HierarchyNode)> {
        self.nodes.get(index.0).map(|node| (index, node))
    }

    /// Nodes at every level, roots included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// True when there are no roots. Every node hangs off a root, so this
    /// matches `node_count() == 0`.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Depth-first, pre-order walk across all roots in source order
    pub fn depth_first(&self) -> Vec<(NodeIndex, usize)> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(NodeIndex, usize)> = self.roots.iter().rev().map(|&r| (r, 0)).collect();

        while let Some((index, depth)) = stack.pop() {
            order.push((index, depth));
            for (child, _) in self.children(index).collect::<Vec<_>>().into_iter().rev() {
                stack.push((child, depth + 1));
            }
        }

        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_round_trips_through_u8() {
        for level in [Level::Topic, Level::Subtopic, Level::Detail] {
            assert_eq!(Level::try_from(level.as_u8()), Ok(level));
        }
        assert!(Level::try_from(3).is_err());
    }

    #[test]
    fn test_parent_is_a_lookup_not_an_owner() {
        let mut forest = Forest::new();
        let root = forest.push_root("Root");
        let child = forest.push_child(root, "Child", Level::Subtopic).unwrap();

        let (parent_index, parent) = forest.parent(child).unwrap();
        assert_eq!(parent_index, root);
        assert_eq!(parent.label, "Root");
        assert!(forest.parent(root).is_none());
    }

    #[test]
    fn test_foreign_index_resolves_to_nothing() {
        let mut big = Forest::new();
        big.push_root("A");
        big.push_root("B");
        let foreign = big.push_root("C");

        let mut small = Forest::new();
        small.push_root("Only");

        assert!(small.get(foreign).is_none());
        assert!(small.parent(foreign).is_none());
        assert_eq!(small.children(foreign).count(), 0);
        assert!(small.push_child(foreign, "stray", Level::Subtopic).is_none());
        assert_eq!(small.node_count(), 1);
    }

    #[test]
    fn test_node_count_and_is_empty_agree() {
        let mut forest = Forest::new();
        assert!(forest.is_empty());
        assert_eq!(forest.node_count(), 0);

        let root = forest.push_root("Root");
        forest.push_child(root, "Child", Level::Subtopic).unwrap();
        assert!(!forest.is_empty());
        assert_eq!(forest.node_count(), 2);
        assert_eq!(forest.root_count(), 1);
        assert_eq!(forest.depth_first().len(), forest.node_count());
    }

    #[test]
    fn test_depth_first_order() {
        let mut forest = Forest::new();
        let a = forest.push_root("A");
        let a1 = forest.push_child(a, "A1", Level::Subtopic).unwrap();
        forest.push_child(a1, "A1x", Level::Detail);
        forest.push_child(a, "A2", Level::Subtopic);
        forest.push_root("B");

        let labels: Vec<(&str, usize)> = forest
            .depth_first()
            .into_iter()
            .map(|(index, depth)| (forest.get(index).unwrap().label.as_str(), depth))
            .collect();

        assert_eq!(
            labels,
            vec![("A", 0), ("A1", 1), ("A1x", 2), ("A2", 1), ("B", 0)]
        );
    }
}
