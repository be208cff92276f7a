//! anyon CLI - numeric canonicalization and content hashing of JSON payloads.

use clap::{Parser, Subcommand};

mod commands;
mod input;
mod logging;
mod policy_args;

use commands::{canonicalize, hash, hash_attach, num};
use policy_args::PolicyArgs;

#[derive(Parser)]
#[command(name = "anyon", version)]
#[command(about = "Canonicalize and content-address JSON-shaped scientific data")]
struct Cli {
    /// Print environment info and exit
    #[arg(long)]
    info: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect the numeric policy resolved from the environment and flags
    Num {
        /// Print the policy snapshot as JSON
        #[arg(long)]
        show_policy: bool,
        #[command(flatten)]
        policy: PolicyArgs,
    },
    /// Print the canonical form of a JSON object
    Canonicalize {
        /// Input JSON file (or stdin if not provided)
        input: Option<String>,
        /// Quantize floats with the numeric policy first
        #[arg(long)]
        normalize: bool,
        /// Sort arrays whose elements are all scalars
        #[arg(long)]
        reorder_arrays: bool,
        #[command(flatten)]
        policy: PolicyArgs,
    },
    /// Print the content digest of a JSON object
    Hash {
        /// Input JSON file (or stdin if not provided)
        input: Option<String>,
        /// Quantize floats with the numeric policy first
        #[arg(long)]
        normalize: bool,
        /// Prefix the digest with a kind (`<kind>:sha256:<hex>`)
        #[arg(long)]
        kind: Option<String>,
        #[command(flatten)]
        policy: PolicyArgs,
    },
    /// Fill the `hashes` member of a payload and print it canonically
    HashAttach {
        /// Input JSON file (or stdin if not provided)
        input: Option<String>,
        /// Field to hash (repeatable; defaults to objects, qdim, global_dim, twist, S, T)
        #[arg(long = "field")]
        fields: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init();

    let result: Result<(), Box<dyn std::error::Error>> = match cli.command {
        _ if cli.info => {
            println!(
                "anyon={}  system={}-{}",
                env!("CARGO_PKG_VERSION"),
                std::env::consts::OS,
                std::env::consts::ARCH
            );
            Ok(())
        }
        Some(Commands::Num {
            show_policy,
            policy,
        }) => num::run(show_policy, &policy),
        Some(Commands::Canonicalize {
            input,
            normalize,
            reorder_arrays,
            policy,
        }) => canonicalize::run(input, normalize, reorder_arrays, &policy),
        Some(Commands::Hash {
            input,
            normalize,
            kind,
            policy,
        }) => hash::run(input, normalize, kind, &policy),
        Some(Commands::HashAttach { input, fields }) => hash_attach::run(input, fields),
        None => {
            use clap::CommandFactory;
            Cli::command().print_help().map_err(Into::into)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
