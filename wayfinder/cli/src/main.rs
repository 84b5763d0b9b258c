use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use wayfinder_lib::config::{CONFIG_FILE_NAME, WayfinderConfig};
use wayfinder_lib::html::parse_fragment;
use wayfinder_lib::markdown::parse;
use wayfinder_lib::pipeline::{TocArtifact, TransformPipeline};

#[derive(Parser)]
#[command(
    name = "wayfinder",
    about = "Outline extraction and rendered-page rewrites for documentation builds",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase verbosity (-v INFO, -vv DEBUG, -vvv TRACE, -vvvv TRACE with file/line)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Extract the table of contents of the input document into the artifact file
    Toc {
        /// Config file (defaults to wayfinder.toml in the build root)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Build root that relative paths are resolved against
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Markdown document to outline (overrides [toc] input)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Artifact path (overrides [toc] output)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Deepest heading level to include, 1-6 (overrides [toc] max_depth)
        #[arg(long)]
        max_depth: Option<u8>,

        /// Print the outline instead of writing the artifact
        #[arg(long)]
        stdout: bool,
    },

    /// Run the page transforms over a rendered HTML fragment
    Wrap {
        /// HTML file, or "-" for stdin
        file: PathBuf,

        /// Config file supplying the [wrap] and [autolink] sections
        #[arg(long)]
        config: Option<PathBuf>,

        /// Selector for the nodes to wrap
        #[arg(long)]
        selector: Option<String>,

        /// Wrapper element template, e.g. div.mermaid-container
        #[arg(long)]
        wrapper: Option<String>,
    },

    /// Print the syntax tree of a document as JSON
    Ast {
        /// Markdown file, or "-" for stdin
        file: PathBuf,

        /// Parse the input as an HTML fragment instead of markdown
        #[arg(long)]
        html: bool,
    },
}

/// Initialize tracing subscriber based on verbosity level.
///
/// Verbosity levels:
/// - 0 (default): no subscriber
/// - 1 (-v): INFO
/// - 2 (-vv): DEBUG
/// - 3 (-vvv): TRACE
/// - 4+ (-vvvv): TRACE with file/line numbers
fn init_tracing(verbose: u8) {
    if verbose == 0 {
        return;
    }

    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            1 => "warn,wayfinder=info,wayfinder_lib=info".to_string(),
            2 => "warn,wayfinder=debug,wayfinder_lib=debug".to_string(),
            _ => "info,wayfinder=trace,wayfinder_lib=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_file(verbose >= 4)
                .with_line_number(verbose >= 4)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Toc {
            config,
            root,
            input,
            output,
            max_depth,
            stdout,
        } => {
            let config_path = config.unwrap_or_else(|| root.join(CONFIG_FILE_NAME));
            let mut config = WayfinderConfig::load(&config_path)
                .wrap_err_with(|| format!("Failed to load config from {}", config_path.display()))?;
            if let Some(input) = input {
                config.toc.input = input;
            }
            if let Some(output) = output {
                config.toc.output = output;
            }
            if let Some(depth) = max_depth {
                config.toc.options.max_depth = depth;
            }

            let artifact = TocArtifact::from_config(&config, &root);
            tracing::debug!(
                input = %artifact.input.display(),
                output = %artifact.output.display(),
                "Resolved outline paths"
            );
            if stdout {
                print!("{}", artifact.render().wrap_err("Failed to extract outline")?);
            } else {
                artifact.generate().wrap_err("Failed to write outline artifact")?;
                eprintln!("Wrote outline to {}", artifact.output.display());
            }
        }
        Command::Wrap {
            file,
            config,
            selector,
            wrapper,
        } => {
            let mut config = match config {
                Some(path) => WayfinderConfig::load(&path)
                    .wrap_err_with(|| format!("Failed to load config from {}", path.display()))?,
                None => WayfinderConfig::default(),
            };
            if let Some(selector) = selector {
                config.wrap.selector = selector;
            }
            if let Some(wrapper) = wrapper {
                config.wrap.wrapper = wrapper;
            }

            let pipeline = TransformPipeline::standard(&config)?;
            let html = read_input(&file)?;
            println!("{}", pipeline.run_html(&html)?);
        }
        Command::Ast { file, html } => {
            let content = read_input(&file)?;
            let tree = if html {
                parse_fragment(&content)
            } else {
                parse(&content)
            };
            println!("{}", serde_json::to_string_pretty(&tree)?);
        }
    }

    Ok(())
}

/// Reads a file, or stdin when the path is `-`.
fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .wrap_err("Failed to read stdin")?;
        return Ok(buffer);
    }
    std::fs::read_to_string(path).wrap_err_with(|| format!("Failed to read {}", path.display()))
}
