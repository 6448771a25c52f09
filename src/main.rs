use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use taan::config::BuildConfig;
use taan::watch::{NotifyBackend, Watcher};
use taan::{build, output, post};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
enum CliError {
    #[error("no action given: expected `build` or `post`")]
    NoAction,
}

#[derive(Parser)]
#[command(name = "taan")]
#[command(about = "Static site generator for a personal site and blog")]
#[command(long_about = "\
Static site generator for a personal site and blog

Markdown in Content/ is rendered through the templates in Views/, and
everything in Static/ is copied to the output root as-is.

Source structure:

  site/
  ├── config.json          # {\"title\": \"...\", \"blog_title\": \"...\"}
  ├── Content/
  │   ├── index.md         # Page → index.html
  │   ├── about.md         # Page → about.html
  │   └── blog/
  │       └── Hello.md     # Post → blog/Hello.html
  ├── Views/
  │   ├── page.html        # Page template
  │   ├── post.html        # Post template
  │   └── blog.html        # Post index template → blog/index.html
  └── Static/              # Copied verbatim

Post header:

  ---
  Title: Hello
  Date: 2020-01-02
  Draft: true              # optional; drafts are never published
  ---

After building, 'taan build' keeps watching the source and rebuilds on
every change. Pass --no-watch to build once and exit.")]
#[command(version)]
struct Cli {
    /// Source directory
    #[arg(short, long, default_value = ".", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = "output", global = true)]
    output: PathBuf,

    /// Name of the new post
    #[arg(short, long, global = true)]
    name: Option<String>,

    /// Build once and exit instead of watching
    #[arg(long, global = true)]
    no_watch: bool,

    /// Fold changes arriving within this many milliseconds into one rebuild
    #[arg(long, global = true)]
    debounce_ms: Option<u64>,

    /// Log watcher and build details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Build the site, then rebuild on every change
    Build,
    /// Create a new draft post in Content/blog
    Post,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Some(Command::Build) => {
            let config = BuildConfig::load(&cli.source, &cli.output)?;
            let report = build::build_site(&config)?;
            output::print_build_report(&report);

            if cli.no_watch || !cli.source.exists() {
                return Ok(());
            }
            watch_and_rebuild(&config, cli.debounce_ms)?;
        }
        Some(Command::Post) => {
            let today = chrono::Local::now().date_naive();
            let path = post::new_post(&cli.source, cli.name.as_deref(), today)?;
            output::print_new_post(&path);
        }
        None => return Err(CliError::NoAction.into()),
    }

    Ok(())
}

/// Watch the source tree forever, rebuilding on every change.
///
/// Rebuild failures are logged by the watcher and never end the session.
fn watch_and_rebuild(
    config: &BuildConfig,
    debounce_ms: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = std::fs::canonicalize(&config.source)?;
    let output_dir = std::fs::canonicalize(&config.output)?;
    let debounce = match debounce_ms {
        Some(0) => None,
        Some(ms) => Some(Duration::from_millis(ms)),
        None => config.settings.watch.debounce(),
    };

    let (backend, events) = NotifyBackend::new()?;
    let mut watcher = Watcher::new(&root, backend)
        .ignore_names(&config.settings.watch.ignore)
        .ignore_path(&output_dir);
    let summary = watcher.resync();
    info!(
        generation = summary.generation,
        registered = summary.registered,
        "watch session started"
    );
    output::print_watch_summary(watcher.root(), &summary);

    watcher.run(&events, debounce, || rebuild(&config.source, &config.output));
    Ok(())
}

/// Reload `config.json` and build again.
fn rebuild(source: &Path, output_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = BuildConfig::load(source, output_dir)?;
    let report = build::build_site(&config)?;
    output::print_build_report(&report);
    Ok(())
}
