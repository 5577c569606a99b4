use crate::CLAP_STYLING;
use clap::{arg, command};
use std::path::PathBuf;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("visualnotes")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("visualnotes")
        .about("Turn loosely structured notes into a laid-out mind map")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("generate")
                .about("Parse notes, lay them out as a mind map and print a report")
                .arg(
                    arg!(-i --"input" <PATH>)
                        .required(false)
                        .help("Notes file to read ('-' or omitted reads stdin)")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)"),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, csv, markdown")
                        .value_parser(["text", "json", "csv", "markdown"])
                        .default_value("text"),
                )
                .arg(
                    arg!(--"images")
                        .required(false)
                        .help("Look up an illustration for every card (uses UNSPLASH_ACCESS_KEY)")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"trivia")
                        .required(false)
                        .help("Ask for a short fact blurb for every card (uses ANTHROPIC_API_KEY)")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Per-request timeout in seconds (default: ENRICH_TIMEOUT_SECS or 5)")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(-t --"threads" <NUM_WORKERS>)
                        .required(false)
                        .help("The number of lookups allowed in flight at once (default: ENRICH_CONCURRENCY or 10)")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(-c --"config" <PATH>)
                        .required(false)
                        .help("JSON layout configuration overriding the defaults")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            command!("parse")
                .about("Show how the notes are read, before layout")
                .arg(
                    arg!(-i --"input" <PATH>)
                        .required(false)
                        .help("Notes file to read ('-' or omitted reads stdin)")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--"json")
                        .required(false)
                        .help("Print the parsed tree as JSON")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(command!("example").about("Print a sample set of notes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_definition_is_consistent() {
        command_argument_builder().debug_assert();
    }

    #[test]
    fn test_generate_defaults() {
        let matches = command_argument_builder()
            .try_get_matches_from(["visualnotes", "generate"])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "generate");
        assert_eq!(sub.get_one::<String>("format").map(String::as_str), Some("text"));
        assert_eq!(sub.get_one::<u64>("timeout"), None);
        assert_eq!(sub.get_one::<usize>("threads"), None);
        assert!(!sub.get_flag("images"));
    }

    #[test]
    fn test_explicit_timeout_and_threads() {
        let matches = command_argument_builder()
            .try_get_matches_from(["visualnotes", "generate", "--timeout", "2", "-t", "3"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        assert_eq!(sub.get_one::<u64>("timeout"), Some(&2));
        assert_eq!(sub.get_one::<usize>("threads"), Some(&3));
    }

    #[test]
    fn test_unknown_format_rejected() {
        let result = command_argument_builder().try_get_matches_from([
            "visualnotes",
            "generate",
            "--format",
            "html",
        ]);
        assert!(result.is_err());
    }
}
