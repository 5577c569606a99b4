// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    EXAMPLE_NOTES, GenerateOptions, build_map, load_layout_config, load_notes_from_file,
    load_notes_from_source, parse_notes, read_notes, write_output,
};
