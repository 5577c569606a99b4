// Post-layout flat form consumed by renderers and enrichment

use crate::hierarchy::Level;
use serde::{Deserialize, Serialize};

/// A node with absolute canvas coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedNode {
    pub id: String,
    /// Display label, possibly truncated
    pub label: String,
    pub level: Level,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Untruncated label, used to look up an illustration
    pub search_query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trivia: Option<String>,
}

impl PositionedNode {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

/// Parent → child connector, keyed by node id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

/// Canvas extent covering every card
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

/// Ordered output of one layout call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MindMap {
    nodes: Vec<PositionedNode>,
}

impl MindMap {
    pub fn new(nodes: Vec<PositionedNode>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[PositionedNode] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<PositionedNode> {
        self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&PositionedNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn children_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a PositionedNode> + 'a {
        self.nodes
            .iter()
            .filter(move |node| node.parent_id.as_deref() == Some(id))
    }

    pub fn roots(&self) -> impl Iterator<Item = &PositionedNode> + '_ {
        self.nodes.iter().filter(|node| node.is_root())
    }

    /// One edge per non-root node, in output order
    pub fn edges(&self) -> Vec<Edge> {
        self.nodes
            .iter()
            .filter_map(|node| {
                node.parent_id.as_ref().map(|parent| Edge {
                    from: parent.clone(),
                    to: node.id.clone(),
                })
            })
            .collect()
    }

    pub fn bounds(&self) -> Bounds {
        self.nodes.iter().fold(Bounds::default(), |bounds, node| Bounds {
            width: bounds.width.max(node.right()),
            height: bounds.height.max(node.bottom()),
        })
    }

    /// Node counts indexed by level
    pub fn count_by_level(&self) -> [usize; 3] {
        let mut counts = [0; 3];
        for node in &self.nodes {
            counts[node.level.as_u8() as usize] += 1;
        }
        counts
    }

    pub fn image_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.image.is_some()).count()
    }
}

impl From<Vec<PositionedNode>> for MindMap {
    fn from(nodes: Vec<PositionedNode>) -> Self {
        Self::new(nodes)
    }
}
