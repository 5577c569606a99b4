// Deterministic three-column layout of a parsed forest

use crate::error::{CoreError, LayoutError, Result};
use crate::hierarchy::{Forest, HierarchyNode, Level};
use crate::model::{MindMap, PositionedNode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

const ELLIPSIS: &str = "...";

/// Layout parameters. Only their relative sizes matter to the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// First root's vertical position
    pub origin_y: f64,
    /// x of the topic, subtopic and detail columns
    pub columns: [f64; 3],
    /// Vertical step between details of one subtopic
    pub row_height: f64,
    pub min_child_height: f64,
    pub min_root_height: f64,
    /// Gap below a root's last subtopic block before the next root
    pub root_margin: f64,
    /// Details beyond this many per subtopic are not laid out
    pub max_grandchildren: usize,
    /// Labels longer than this many characters are truncated
    pub max_label_len: usize,
    pub card_height: f64,
    pub card_widths: [f64; 3],
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            origin_y: 60.0,
            columns: [60.0, 380.0, 680.0],
            row_height: 260.0,
            min_child_height: 260.0,
            min_root_height: 300.0,
            root_margin: 120.0,
            max_grandchildren: 6,
            max_label_len: 35,
            card_height: 220.0,
            card_widths: [240.0, 220.0, 200.0],
        }
    }
}

impl LayoutConfig {
    /// Load a JSON config; missing fields keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| CoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: LayoutConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject parameters that would let cards collide
    pub fn validate(&self) -> std::result::Result<(), LayoutError> {
        let dimensions = [
            ("origin_y", self.origin_y),
            ("columns[0]", self.columns[0]),
            ("columns[1]", self.columns[1]),
            ("columns[2]", self.columns[2]),
            ("row_height", self.row_height),
            ("min_child_height", self.min_child_height),
            ("min_root_height", self.min_root_height),
            ("root_margin", self.root_margin),
            ("card_height", self.card_height),
            ("card_widths[0]", self.card_widths[0]),
            ("card_widths[1]", self.card_widths[1]),
            ("card_widths[2]", self.card_widths[2]),
        ];
        for (name, value) in dimensions {
            if !value.is_finite() || value < 0.0 {
                return Err(LayoutError::InvalidDimension { name, value });
            }
        }

        let [x0, x1, x2] = self.columns;
        if !(x0 < x1 && x1 < x2) {
            return Err(LayoutError::ColumnsNotOrdered(self.columns));
        }
        for column in 0..2 {
            let width = self.card_widths[column];
            if self.columns[column] + width > self.columns[column + 1] {
                return Err(LayoutError::ColumnTooNarrow { column, width });
            }
        }

        for (name, value) in [
            ("row_height", self.row_height),
            ("min_child_height", self.min_child_height),
            ("min_root_height", self.min_root_height),
        ] {
            if value < self.card_height {
                return Err(LayoutError::RowTooShort {
                    name,
                    value,
                    card_height: self.card_height,
                });
            }
        }

        if self.max_grandchildren == 0 {
            return Err(LayoutError::ZeroLimit("max_grandchildren"));
        }
        if self.max_label_len == 0 {
            return Err(LayoutError::ZeroLimit("max_label_len"));
        }

        Ok(())
    }
}

/// Truncate to `max_len` characters, marking the cut with an ellipsis
pub fn truncate_label(label: &str, max_len: usize) -> String {
    match label.char_indices().nth(max_len) {
        Some((cut, _)) => format!("{}{}", &label[..cut], ELLIPSIS),
        None => label.to_string(),
    }
}

/// A validated layout engine
#[derive(Debug, Clone, Default)]
pub struct Layout {
    config: LayoutConfig,
}

impl Layout {
    pub fn new(config: LayoutConfig) -> std::result::Result<Self, LayoutError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Position every node of `forest`.
    ///
    /// Roots go in the first column in source order, each followed by its
    /// subtopics in the second column and up to `max_grandchildren` details per
    /// subtopic in the third. Vertical cursors only move down, so no two cards
    /// in one column overlap.
    pub fn apply(&self, forest: &Forest) -> MindMap {
        let config = &self.config;
        let mut emitter = Emitter::new(config, forest.node_count());
        let mut global_y = config.origin_y;

        for (root_index, root) in forest.roots() {
            let root_id = emitter.emit(root, Level::Topic, global_y, None);
            let mut child_y = global_y;

            for (child_index, child) in forest.children(root_index) {
                let child_id = emitter.emit(child, Level::Subtopic, child_y, Some(root_id.as_str()));
                let mut grand_y = child_y;
                let mut shown = 0usize;

                for (_, grand) in forest.children(child_index).take(config.max_grandchildren) {
                    emitter.emit(grand, Level::Detail, grand_y, Some(child_id.as_str()));
                    grand_y += config.row_height;
                    shown += 1;
                }

                child_y += config
                    .min_child_height
                    .max(shown as f64 * config.row_height);
            }

            global_y = (global_y + config.min_root_height).max(child_y + config.root_margin);
        }

        let map = MindMap::new(emitter.nodes);
        debug!(nodes = map.len(), height = global_y, "laid out mind map");
        map
    }
}

/// Lay out with the default configuration
pub fn layout(forest: &Forest) -> MindMap {
    Layout::default().apply(forest)
}

struct Emitter<'c> {
    config: &'c LayoutConfig,
    next_id: usize,
    nodes: Vec<PositionedNode>,
}

impl<'c> Emitter<'c> {
    fn new(config: &'c LayoutConfig, capacity: usize) -> Self {
        Self {
            config,
            next_id: 0,
            nodes: Vec::with_capacity(capacity),
        }
    }

    fn emit(&mut self, node: &HierarchyNode, level: Level, y: f64, parent_id: Option<&str>) -> String {
        let id = format!("node-{}", self.next_id);
        self.next_id += 1;

        let column = level.as_u8() as usize;
        self.nodes.push(PositionedNode {
            id: id.clone(),
            label: truncate_label(&node.label, self.config.max_label_len),
            level,
            x: self.config.columns[column],
            y,
            width: self.config.card_widths[column],
            height: self.config.card_height,
            parent_id: parent_id.map(str::to_string),
            search_query: node.label.clone(),
            image: None,
            trivia: None,
        });

        id
    }
}
