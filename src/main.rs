//! ebookmaker - build EPUB/MOBI books from a `toc.md` directory

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use serde::Deserialize;

use ebookmaker::legacy::book_from_dir;
use ebookmaker::{Format, ImageConfig, PackageConfig};

#[derive(Parser)]
#[command(name = "ebookmaker")]
#[command(version, about = "Build EPUB and Kindle ebooks from HTML chapters", long_about = None)]
#[command(after_help = "SOURCE LAYOUT:
    toc.md          Title on the first line, `# Chapter` and `## Section` headings
    <title>.html    One file per chapter and section
    cover.jpg       Optional cover image
    *               Anything else is copied into the book

EXAMPLES:
    ebookmaker book/                Build book/<title>.mobi with kindlegen
    ebookmaker book/ -f epub -o out Build out/<title>.epub")]
struct Cli {
    /// Directory containing toc.md and chapter files
    #[arg(value_name = "SOURCE_DIR")]
    source: PathBuf,

    /// Output directory (defaults to the current directory)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Output format: epub or mobi
    #[arg(short, long)]
    format: Option<Format>,

    /// Download remote images referenced by chapters
    #[arg(long)]
    download_images: bool,

    /// Path to the kindlegen executable
    #[arg(long, value_name = "PATH")]
    kindlegen: Option<PathBuf>,

    /// JSON settings file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Open the book with the default viewer after building
    #[arg(long)]
    show: bool,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,
}

/// Settings file contents; command-line flags take precedence.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Settings {
    format: Option<Format>,
    author: Option<String>,
    language: Option<String>,
    images: Option<ImageConfig>,
    package: PackageConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let mut settings = match &cli.config {
        Some(path) => load_settings(path)?,
        None => Settings::default(),
    };
    if let Some(ref kindlegen) = cli.kindlegen {
        settings.package.mobi.converter = kindlegen.clone();
    }
    if cli.download_images && settings.images.is_none() {
        settings.images = Some(ImageConfig::default());
    }
    let format = cli.format.or(settings.format).unwrap_or_default();

    let mut book = book_from_dir(&cli.source, format).map_err(|e| e.to_string())?;
    book.set_package_config(settings.package);
    if let Some(author) = settings.author {
        book.set_author(author);
    }
    if let Some(language) = settings.language {
        book.set_language(language);
    }
    if let Some(images) = settings.images {
        book.enable_image_download(images);
    }

    let output = cli.output.clone().unwrap_or_else(|| PathBuf::from("."));
    let dest = output.join(book.file_name());
    book.save(&dest).map_err(|e| e.to_string())?;
    if !cli.quiet {
        println!("{}", dest.display());
    }

    if cli.show {
        let status = book.show().map_err(|e| e.to_string())?;
        if !status.success() {
            return Err(format!("viewer exited with {status}"));
        }
    }
    Ok(())
}

fn load_settings(path: &Path) -> Result<Settings, String> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("{}: {e}", path.display()))
}
