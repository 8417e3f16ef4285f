//! `shapy` entry point.

use clap::{Parser, Subcommand};
use shapy_cli::{CliResult, commands};
use shapy_core::EditorConfig;
use shapy_core::storage::FileStorage;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "shapy", version, about = "Headless tools for Shapy documents")]
struct Cli {
    /// Editor configuration file (JSON).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Project directory for `import` and `list` (default: the user data dir).
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export a document as PNG, JPEG, SVG or JSON (by output extension).
    Export { document: PathBuf, output: PathBuf },
    /// Stretch an image over the workspace and save the document.
    PlaceImage {
        document: PathBuf,
        image: String,
        output: PathBuf,
    },
    /// Save a document into the project store.
    Import { document: PathBuf, name: Option<String> },
    /// List stored projects.
    List,
}

fn storage(store: Option<PathBuf>) -> CliResult<FileStorage> {
    let storage = match store {
        Some(path) => FileStorage::new(path)?,
        None => FileStorage::default_location()?,
    };
    Ok(storage)
}

fn run(cli: Cli) -> CliResult<()> {
    let config = match &cli.config {
        Some(path) => EditorConfig::from_file(path)?,
        None => EditorConfig::default(),
    };

    match cli.command {
        Command::Export { document, output } => {
            commands::export(config, &document, &output)?;
            println!("{}", output.display());
        }
        Command::PlaceImage { document, image, output } => {
            commands::place_image(config, &document, &image, &output)?;
            println!("{}", output.display());
        }
        Command::Import { document, name } => {
            let storage = storage(cli.store)?;
            let record = commands::import(config, &storage, &document, name.as_deref())?;
            println!("{}", record.id);
        }
        Command::List => {
            for id in commands::list(&storage(cli.store)?)? {
                println!("{id}");
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::debug!("starting shapy {}", env!("CARGO_PKG_VERSION"));

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
