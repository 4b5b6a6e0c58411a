use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "wordlens")]
#[command(about = "Convert word-processing documents to HTML and back", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Produce HTML from a word document
    Get {
        /// The word document to read
        concrete: PathBuf,

        /// The HTML file to write
        abstract_path: PathBuf,
    },
    /// Update a word document from edited HTML previously produced by `get`
    Put {
        /// The word document to update
        concrete: PathBuf,

        /// The edited HTML file
        abstract_path: PathBuf,
    },
    /// Create a fresh word document from HTML
    Create {
        /// The word document to create
        concrete: PathBuf,

        /// The HTML file to read
        abstract_path: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Get { concrete, abstract_path } => {
            wordlens_core::get_file(&concrete, &abstract_path)
        }
        Commands::Put { concrete, abstract_path } => {
            wordlens_core::put_file(&concrete, &abstract_path)
        }
        Commands::Create { concrete, abstract_path } => {
            wordlens_core::create_file(&concrete, &abstract_path)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
