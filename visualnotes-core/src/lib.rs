pub mod error;
pub mod hierarchy;
pub mod layout;
pub mod model;
pub mod parse;
pub mod report;

use colored::Colorize;

pub use error::{CoreError, LayoutError};
pub use hierarchy::{Forest, HierarchyNode, Level, NodeIndex};
pub use layout::{Layout, LayoutConfig, layout, truncate_label};
pub use model::{Bounds, Edge, MindMap, PositionedNode};
pub use parse::{LineShape, parse};
pub use report::{ReportFormat, render_report};

pub fn print_banner() {
    eprintln!(
        "{}",
        r#"
 __   ___               _ _  _       _
 \ \ / (_)____  _ __ _| | \| |___  | |_ ___ ___
  \ V /| (_-< || / _` | | .` / _ \ |  _/ -_|_-<
   \_/ |_/__/\_,_\__,_|_|_|\_\___/  \__\___/__/
"#
        .bright_blue()
        .bold()
    );
    eprintln!(
        "  {} {}\n",
        "notes in, mind map out".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
}
