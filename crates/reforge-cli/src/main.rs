mod commands;
mod error;
mod utils;

use std::path::PathBuf;

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

use crate::commands::regen::handle_regen;
use crate::commands::show::{handle_show, ShowFormat};

#[derive(Parser, Debug)]
#[command(name = "reforge")]
#[command(about = "Parse, inspect and regenerate network class definitions", long_about = None)]
struct Args {
    #[clap(subcommand)]
    command: Command,

    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Show the symbol tree of a network class
    Show {
        /// Source file defining the network
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Class to parse (defaults to the only class in the file)
        #[arg(short, long)]
        class: Option<String>,
        /// Configuration file (defaults to the nearest reforge.toml)
        #[arg(long, value_name = "CONFIG")]
        config: Option<PathBuf>,
        /// What to display
        #[arg(value_enum, default_value_t = ShowFormat::Nodes)]
        format: ShowFormat,
    },

    /// Regenerate the source of a network class from its symbol tree
    Regen {
        /// Source file defining the network
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Class to parse (defaults to the only class in the file)
        #[arg(short, long)]
        class: Option<String>,
        /// Configuration file (defaults to the nearest reforge.toml)
        #[arg(long, value_name = "CONFIG")]
        config: Option<PathBuf>,
        /// Output file (defaults to stdout)
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
    },
}

fn main() -> miette::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    match args.command {
        Command::Show { file, class, config, format } => {
            handle_show(&file, class, config.as_deref(), format)?;
        }
        Command::Regen { file, class, config, output } => {
            handle_regen(&file, class, config.as_deref(), output)?;
        }
    }
    Ok(())
}
