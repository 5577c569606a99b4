use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use visualnotes_core::report::{outline_json, render_outline, save_report};
use visualnotes_core::{Forest, Layout, LayoutConfig, MindMap, ReportFormat, parse, render_report};
use visualnotes_enrich::{
    AnthropicTrivia, EnrichConfig, EnrichSummary, Enricher, ImageSource, NoImages, ProgressCallback,
    TriviaSource, UnsplashClient,
};

pub const EXAMPLE_NOTES: &str = include_str!("../notes/example.txt");

pub const PARSE_FAILURE: &str = "Could not parse text. Check format.";

/// Log to stderr so reports on stdout stay clean. `RUST_LOG` overrides the level.
pub fn init_tracing(quiet: bool) {
    let default = if quiet { "error" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

// Helper functions for the generate and parse handlers

/// Read notes from a file, or from stdin when no path (or `-`) is given
pub fn load_notes_from_source(input: Option<&PathBuf>) -> Result<String> {
    match input {
        Some(path) if path.as_os_str() != "-" => load_notes_from_file(path),
        _ => read_notes(io::stdin().lock()).context("Failed to read notes from stdin"),
    }
}

pub fn load_notes_from_file(path: &Path) -> Result<String> {
    let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
    fs::read_to_string(&expanded).with_context(|| format!("Failed to read notes file {}", expanded))
}

pub fn read_notes<R: Read>(mut reader: R) -> io::Result<String> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Ok(text)
}

pub fn load_layout_config(path: Option<&PathBuf>) -> Result<LayoutConfig> {
    match path {
        Some(path) => {
            let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref());
            let config = LayoutConfig::load(&expanded)
                .with_context(|| format!("Failed to load layout config {}", expanded.display()))?;
            debug!("Loaded layout config from {}", expanded.display());
            Ok(config)
        }
        None => Ok(LayoutConfig::default()),
    }
}

/// Parse notes, failing when no topic could be found
pub fn parse_notes(text: &str) -> Result<Forest> {
    let forest = parse(text);
    if forest.is_empty() {
        bail!(PARSE_FAILURE);
    }
    Ok(forest)
}

pub fn build_map(text: &str, config: LayoutConfig) -> Result<MindMap> {
    let forest = parse_notes(text)?;
    let layout = Layout::new(config).context("Invalid layout configuration")?;
    Ok(layout.apply(&forest))
}

/// Write to `output` (tilde-expanded) or return `None` when the report belongs on stdout
pub fn write_output(report: &str, output: Option<&str>) -> Result<Option<PathBuf>> {
    let Some(output) = output else {
        return Ok(None);
    };

    let path = PathBuf::from(shellexpand::tilde(output).as_ref());
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    save_report(report, &path).with_context(|| format!("Failed to write report to {}", path.display()))?;
    Ok(Some(path))
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateOptions {
    pub input: Option<PathBuf>,
    pub output: Option<String>,
    pub format: ReportFormat,
    pub images: bool,
    pub trivia: bool,
    /// `None` keeps the environment or built-in default
    pub timeout: Option<Duration>,
    pub threads: Option<usize>,
    pub config: Option<PathBuf>,
    pub quiet: bool,
}

impl GenerateOptions {
    pub fn from_matches(args: &ArgMatches, quiet: bool) -> Result<Self> {
        let format_name = args.get_one::<String>("format").map(String::as_str).unwrap_or("text");
        let format = ReportFormat::from_str(format_name)
            .with_context(|| format!("Unknown report format: {}", format_name))?;

        Ok(Self {
            input: args.get_one::<PathBuf>("input").cloned(),
            output: args.get_one::<String>("output").cloned(),
            format,
            images: args.get_flag("images"),
            trivia: args.get_flag("trivia"),
            timeout: args.get_one::<u64>("timeout").copied().map(Duration::from_secs),
            threads: args.get_one::<usize>("threads").copied(),
            config: args.get_one::<PathBuf>("config").cloned(),
            quiet,
        })
    }

    pub fn wants_enrichment(&self) -> bool {
        self.images || self.trivia
    }

    /// Apply `--timeout` and `--threads` on top of `base`, only where given
    pub fn enrich_config(&self, base: EnrichConfig) -> EnrichConfig {
        let config = match self.timeout {
            Some(timeout) => base.with_timeout(timeout),
            None => base,
        };
        match self.threads {
            Some(threads) => config.with_concurrency(threads),
            None => config,
        }
    }
}

fn configure<I, T>(
    enricher: Enricher<I, T>,
    config: &EnrichConfig,
    progress: Option<ProgressCallback>,
) -> Enricher<I, T>
where
    I: ImageSource + 'static,
    T: TriviaSource + 'static,
{
    let enricher = enricher
        .with_timeout(config.timeout)
        .with_concurrency(config.concurrency);
    match progress {
        Some(callback) => enricher.with_progress_callback(callback),
        None => enricher,
    }
}

/// Run the requested lookups over every node of `map`
pub async fn enrich_map(
    map: MindMap,
    options: &GenerateOptions,
    config: &EnrichConfig,
    progress: Option<ProgressCallback>,
) -> Result<(MindMap, EnrichSummary)> {
    let trivia = if options.trivia {
        match AnthropicTrivia::from_config(config) {
            Ok(trivia) => Some(trivia),
            Err(e) => {
                warn!("Skipping trivia: {}", e);
                None
            }
        }
    } else {
        None
    };

    let nodes = map.into_nodes();
    let (nodes, summary) = match (options.images, trivia) {
        (true, Some(trivia)) => {
            let images = UnsplashClient::from_config(config)?;
            configure(Enricher::new(images).with_trivia(trivia), config, progress)
                .enrich(nodes)
                .await
        }
        (true, None) => {
            let images = UnsplashClient::from_config(config)?;
            configure(Enricher::new(images), config, progress).enrich(nodes).await
        }
        (false, Some(trivia)) => {
            configure(Enricher::new(NoImages).with_trivia(trivia), config, progress)
                .enrich(nodes)
                .await
        }
        (false, None) => (nodes, EnrichSummary::default()),
    };

    Ok((MindMap::from(nodes), summary))
}

fn progress_bar(len: usize, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) =
        ProgressStyle::default_bar().template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("=> "));
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn print_enrich_summary(summary: &EnrichSummary) {
    eprintln!(
        "{} Enriched {} cards: {} images, {} placeholders, {} trivia",
        "✓".green().bold(),
        summary.nodes.to_string().bright_white(),
        summary.images_found.to_string().cyan(),
        summary.placeholders.to_string().cyan(),
        summary.trivia_found.to_string().cyan()
    );
    let failures = summary.image_failures + summary.trivia_failures + summary.panicked;
    if failures > 0 {
        eprintln!(
            "{} {} lookups failed or timed out",
            "⚠".yellow().bold(),
            failures.to_string().yellow()
        );
    }
}

/// Generate a mind map report from notes; returns the rendered report
pub async fn run_generate(options: &GenerateOptions) -> Result<String> {
    let text = load_notes_from_source(options.input.as_ref())?;
    let config = load_layout_config(options.config.as_ref())?;
    let mut map = build_map(&text, config)?;
    debug!("Laid out {} cards", map.len());

    if options.wants_enrichment() {
        let enrich_config = options.enrich_config(EnrichConfig::from_env());

        let pb = progress_bar(map.len(), options.quiet);
        let bar = pb.clone();
        let callback: ProgressCallback = Arc::new(move |done: usize, query: String| {
            bar.set_position(done as u64);
            bar.set_message(query);
        });

        let (enriched, summary) = enrich_map(map, options, &enrich_config, Some(callback)).await?;
        pb.finish_and_clear();
        if !options.quiet {
            print_enrich_summary(&summary);
        }
        map = enriched;
    }

    // Escape codes only belong on a terminal
    if options.output.is_some() {
        colored::control::set_override(false);
    }
    let report = render_report(&map, options.format).context("Failed to render report")?;
    Ok(report)
}

pub async fn handle_generate(args: &ArgMatches, quiet: bool) -> Result<()> {
    let options = GenerateOptions::from_matches(args, quiet)?;
    let report = run_generate(&options).await?;

    match write_output(&report, options.output.as_deref())? {
        Some(path) => {
            if !quiet {
                eprintln!(
                    "{} Report saved to: {}",
                    "✓".green().bold(),
                    path.display().to_string().bright_white()
                );
            }
        }
        None => print!("{}", report),
    }
    Ok(())
}

pub fn handle_parse(args: &ArgMatches) -> Result<()> {
    let text = load_notes_from_source(args.get_one::<PathBuf>("input"))?;
    let forest = parse_notes(&text)?;

    if args.get_flag("json") {
        println!("{}", outline_json(&forest)?);
    } else {
        print!("{}", render_outline(&forest));
    }
    Ok(())
}

pub fn handle_example() {
    print!("{}", EXAMPLE_NOTES);
}
