use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use glean_core::{CountMode, DiscoveryPolicy, Extractor, MatchConfig, MatchResult, SnippetLimit};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;
use url::Url;

mod echo;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Find the content blocks of an HTML page that mention your keywords
#[derive(Parser, Debug)]
#[command(name = "glean")]
#[command(author = "Glean Contributors")]
#[command(version)]
#[command(about = "Match keywords against the content blocks of HTML documents", long_about = None)]
struct Args {
    /// Local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT", default_value = "-")]
    input: String,

    /// Keyword to look for (repeatable, or comma separated)
    #[arg(
        short,
        long = "keyword",
        value_name = "KEYWORD",
        value_delimiter = ',',
        required_unless_present = "clean"
    )]
    keywords: Vec<String>,

    /// Report every qualifying block instead of the best one
    #[arg(long)]
    all: bool,

    /// Minimum occurrences for a keyword to count (default: 1, or 2 with --all)
    #[arg(long, value_name = "N")]
    threshold: Option<usize>,

    /// Count whole words only
    #[arg(long)]
    whole_word: bool,

    /// Strip punctuation before matching
    #[arg(long)]
    strict: bool,

    /// Only consider <article> elements
    #[arg(long)]
    semantic: bool,

    /// With --all, keep collecting from <section> and <div> after <article> matches
    #[arg(long)]
    accumulate: bool,

    /// Resolve publication dates (always on with --all)
    #[arg(long)]
    date: bool,

    /// Snippet length in words
    #[arg(long, value_name = "N", conflicts_with = "chars")]
    words: Option<usize>,

    /// Snippet length in characters
    #[arg(long, value_name = "N")]
    chars: Option<usize>,

    /// Base URL for resolving relative links
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Print the cleaned text of the whole document instead of matching
    #[arg(long)]
    clean: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn match_config(&self) -> anyhow::Result<MatchConfig> {
        let mut builder = MatchConfig::builder();
        if let Some(base_url) = &self.base_url {
            let base_url = Url::parse(base_url).with_context(|| format!("Invalid base URL: {}", base_url))?;
            builder = builder.base_url(base_url);
        }
        if self.all {
            builder = builder.all_matches();
        }
        if let Some(threshold) = self.threshold {
            builder = builder.match_threshold(threshold);
        }
        if self.whole_word {
            builder = builder.count_mode(CountMode::WholeWord);
        }
        if self.semantic {
            builder = builder.discovery_policy(DiscoveryPolicy::SemanticFirst);
        }
        if self.date {
            builder = builder.want_date(true);
        }
        if let Some(words) = self.words {
            builder = builder.snippet_limit(SnippetLimit::Words(words));
        }
        if let Some(chars) = self.chars {
            builder = builder.snippet_limit(SnippetLimit::Chars(chars));
        }

        Ok(builder.strict_text(self.strict).accumulate_passes(self.accumulate).build())
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("glean_core=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer).context("Failed to read from stdin")?;
        Ok(buffer)
    } else {
        fs::read_to_string(input).with_context(|| format!("Failed to read file: {}", input))
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let start = Instant::now();

    if args.verbose {
        init_tracing();
        echo::print_banner();
        echo::print_info("Debug logging enabled");
        eprintln!();
    }

    if args.verbose {
        let source = if args.input == "-" { "stdin".to_string() } else { format!("file {}", args.input) };
        echo::print_step(1, 3, &format!("Reading from {}", source.bright_white()));
    }

    let html = read_input(&args.input)?;

    if args.verbose {
        echo::print_field("Size", &echo::format_size(html.len()));
        eprintln!();
    }

    let config = args.match_config()?;
    let extractor = Extractor::with_config(config);

    let output = if args.clean {
        if args.verbose {
            echo::print_step(2, 3, "Cleaning document text");
        }
        let mut text = extractor.clean(&html).context("Failed to clean document")?;
        text.push('\n');
        text
    } else {
        if args.verbose {
            echo::print_step(2, 3, &format!("Matching {} keyword(s)", args.keywords.len()));
        }
        let result = extractor.run(&html, &args.keywords).context("Failed to match keywords")?;

        if args.verbose {
            echo::print_match_summary(&result);
            if result.matched_blocks() == 0 {
                echo::print_warning("No block met the keyword threshold");
            }
        }
        render(&result, args.pretty)?
    };

    if args.verbose {
        echo::print_step(3, 3, "Writing output");
        echo::print_timing("Total", start.elapsed());
        eprintln!();
    }

    match args.output {
        Some(path) => {
            fs::write(&path, output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            echo::print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => {
            print!("{}", output);
        }
    }

    Ok(())
}

fn render(result: &MatchResult, pretty: bool) -> anyhow::Result<String> {
    let mut json = if pretty { serde_json::to_string_pretty(result) } else { serde_json::to_string(result) }
        .context("Failed to serialize result")?;
    json.push('\n');
    Ok(json)
}
