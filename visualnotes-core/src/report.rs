// Report generation from a laid-out mind map

use crate::error::Result;
use crate::hierarchy::{Forest, Level, NodeIndex};
use crate::model::{MindMap, PositionedNode};
use colored::{ColoredString, Colorize};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
    Csv,
    Markdown,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "csv" => Some(ReportFormat::Csv),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            _ => None,
        }
    }
}

pub fn render_report(map: &MindMap, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(map)),
        ReportFormat::Json => generate_json_report(map),
        ReportFormat::Csv => Ok(generate_csv_report(map)),
        ReportFormat::Markdown => Ok(generate_markdown_report(map)),
    }
}

pub fn generate_text_report(map: &MindMap) -> String {
    let mut report = String::new();
    let [topics, subtopics, details] = map.count_by_level();
    let bounds = map.bounds();

    report.push_str(RULE);
    report.push('\n');
    report.push_str("                           VISUALNOTES MIND MAP\n");
    report.push_str(RULE);
    report.push_str("\n\n");

    report.push_str(&format!("Topics:       {}\n", topics));
    report.push_str(&format!("Subtopics:    {}\n", subtopics));
    report.push_str(&format!("Details:      {}\n", details));
    report.push_str(&format!("Images:       {}/{}\n", map.image_count(), map.len()));
    report.push_str(&format!("Canvas:       {} x {}\n\n", bounds.width, bounds.height));

    report.push_str(RULE);
    report.push_str("\nOUTLINE\n");
    report.push_str(RULE);
    report.push_str("\n\n");

    if map.is_empty() {
        report.push_str("  (empty)\n");
    }

    for root in map.roots() {
        report.push_str(&format!(
            "{} {}  {}\n",
            "●".bright_blue(),
            level_style(root),
            coordinates(root).bright_black()
        ));
        if let Some(ref image) = root.image {
            report.push_str(&format!("  {}\n", image.bright_black()));
        }
        push_trivia(&mut report, root, "  ");
        push_children(&mut report, map, root, "");
        report.push('\n');
    }

    report
}

fn push_children(report: &mut String, map: &MindMap, parent: &PositionedNode, prefix: &str) {
    let children: Vec<&PositionedNode> = map.children_of(&parent.id).collect();

    for (idx, child) in children.iter().enumerate() {
        let is_last = idx == children.len() - 1;
        let branch = if is_last { "└── " } else { "├── " };
        let continuation = if is_last { "    " } else { "│   " };

        report.push_str(&format!(
            "{}{}{}  {}\n",
            prefix,
            branch,
            level_style(child),
            coordinates(child).bright_black()
        ));

        let nested = format!("{}{}", prefix, continuation);
        if let Some(ref image) = child.image {
            report.push_str(&format!("{}  {}\n", nested, image.bright_black()));
        }
        push_trivia(report, child, &format!("{}  ", nested));
        push_children(report, map, child, &nested);
    }
}

fn push_trivia(report: &mut String, node: &PositionedNode, indent: &str) {
    if let Some(ref trivia) = node.trivia {
        report.push_str(&wrap_text(trivia, 80, indent));
    }
}

fn level_style(node: &PositionedNode) -> ColoredString {
    match node.level {
        Level::Topic => node.label.bright_white().bold(),
        Level::Subtopic => node.label.magenta(),
        Level::Detail => node.label.normal(),
    }
}

fn coordinates(node: &PositionedNode) -> String {
    format!("({}, {})", node.x, node.y)
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generator: &'static str,
    version: &'static str,
    summary: JsonSummary,
    nodes: &'a [PositionedNode],
    edges: Vec<crate::model::Edge>,
    bounds: crate::model::Bounds,
}

#[derive(Serialize)]
struct JsonSummary {
    topics: usize,
    subtopics: usize,
    details: usize,
    images: usize,
}

pub fn generate_json_report(map: &MindMap) -> Result<String> {
    let [topics, subtopics, details] = map.count_by_level();
    let report = JsonReport {
        generator: "VisualNotes",
        version: env!("CARGO_PKG_VERSION"),
        summary: JsonSummary {
            topics,
            subtopics,
            details,
            images: map.image_count(),
        },
        nodes: map.nodes(),
        edges: map.edges(),
        bounds: map.bounds(),
    };

    Ok(serde_json::to_string_pretty(&report)?)
}

pub fn generate_csv_report(map: &MindMap) -> String {
    let mut report = String::from("id,parent_id,level,label,x,y,search_query,image\n");

    for node in map.nodes() {
        let row = [
            csv_field(&node.id),
            csv_field(node.parent_id.as_deref().unwrap_or_default()),
            node.level.as_u8().to_string(),
            csv_field(&node.label),
            node.x.to_string(),
            node.y.to_string(),
            csv_field(&node.search_query),
            csv_field(node.image.as_deref().unwrap_or_default()),
        ];
        report.push_str(&row.join(","));
        report.push('\n');
    }

    report
}

/// Quote a field when it contains a delimiter, quote or line break
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn generate_markdown_report(map: &MindMap) -> String {
    let mut report = String::from("# Mind map\n\n");

    for root in map.roots() {
        report.push_str(&format!("## {}\n\n", root.label));
        if let Some(ref image) = root.image {
            report.push_str(&format!("![{}]({})\n\n", root.search_query, image));
        }
        if let Some(ref trivia) = root.trivia {
            report.push_str(&format!("> {}\n\n", trivia.replace('\n', " ")));
        }

        for child in map.children_of(&root.id) {
            report.push_str(&markdown_item(child, 0));
            for grand in map.children_of(&child.id) {
                report.push_str(&markdown_item(grand, 1));
            }
        }
        report.push('\n');
    }

    report
}

fn markdown_item(node: &PositionedNode, depth: usize) -> String {
    let mut item = format!("{}- **{}**", "  ".repeat(depth), node.label);
    if let Some(ref image) = node.image {
        item.push_str(&format!(" ([image]({}))", image));
    }
    if let Some(ref trivia) = node.trivia {
        item.push_str(&format!(" - {}", trivia.replace('\n', " ")));
    }
    item.push('\n');
    item
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Indented tree of the parsed notes, before layout
pub fn render_outline(forest: &Forest) -> String {
    let mut outline = String::new();

    for (index, root) in forest.roots() {
        outline.push_str(&format!("{}\n", root.label));
        push_outline_children(&mut outline, forest, index, "");
    }

    outline
}

fn push_outline_children(outline: &mut String, forest: &Forest, parent: NodeIndex, prefix: &str) {
    let children: Vec<_> = forest.children(parent).collect();

    for (idx, (index, child)) in children.iter().enumerate() {
        let is_last = idx == children.len() - 1;
        let branch = if is_last { "└── " } else { "├── " };
        outline.push_str(&format!("{}{}{} [{}]\n", prefix, branch, child.label, child.level));

        let nested = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
        push_outline_children(outline, forest, *index, &nested);
    }
}

#[derive(Serialize)]
struct OutlineNode<'a> {
    label: &'a str,
    level: Level,
    children: Vec<OutlineNode<'a>>,
}

/// Nested JSON form of the parsed notes
pub fn outline_json(forest: &Forest) -> Result<String> {
    fn build<'a>(forest: &'a Forest, index: NodeIndex) -> Option<OutlineNode<'a>> {
        let node = forest.get(index)?;
        Some(OutlineNode {
            label: &node.label,
            level: node.level,
            children: node
                .children
                .iter()
                .filter_map(|&child| build(forest, child))
                .collect(),
        })
    }

    let roots: Vec<OutlineNode> = forest
        .roots()
        .filter_map(|(index, _)| build(forest, index))
        .collect();
    Ok(serde_json::to_string_pretty(&roots)?)
}

fn wrap_text(text: &str, width: usize, indent: &str) -> String {
    let mut result = String::new();
    let mut current_line = String::new();
    let available = width.saturating_sub(indent.chars().count()).max(20);

    for word in text.split_whitespace() {
        if !current_line.is_empty() && current_line.chars().count() + word.chars().count() + 1 > available {
            result.push_str(indent);
            result.push_str(&current_line);
            result.push('\n');
            current_line.clear();
        }

        if !current_line.is_empty() {
            current_line.push(' ');
        }
        current_line.push_str(word);
    }

    if !current_line.is_empty() {
        result.push_str(indent);
        result.push_str(&current_line);
        result.push('\n');
    }

    result
}
