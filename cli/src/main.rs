use anyhow::Result;
use cip_core::reader::{PropertyPairs, open_cip_lines};
use cip_core::{ScanConfig, load_monster_directory, parse_monster_file};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "cipmon",
    version = "0.1.0",
    about = "CLI tool for inspecting CIP monster files",
    long_about = None
)]
struct Cli {
    /// Path to log file
    #[arg(long, global = true, default_value = "/tmp/cipmon.log")]
    log_file: std::path::PathBuf,

    /// Verbosity level (repeat for more verbose output)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode one monster file and print it as JSON
    Parse {
        /// Path to the .mon file
        #[arg(long)]
        file: std::path::PathBuf,
        /// Pretty-print the JSON output
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },

    /// Print the raw property pairs of a file
    Pairs {
        /// Path to the CIP file
        #[arg(long)]
        file: std::path::PathBuf,
    },

    /// Decode every monster file in a directory
    Scan {
        /// Directory containing monster files
        #[arg(long)]
        dir: std::path::PathBuf,
        /// Path to TOML scan configuration (optional)
        #[arg(long)]
        config: Option<std::path::PathBuf>,
    },
}

fn setup_logging(verbose: u8, log_file: &std::path::Path) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let filter_level = match verbose {
        0 => tracing::Level::ERROR,
        1 => tracing::Level::WARN,
        2 => tracing::Level::INFO,
        3 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let filter = EnvFilter::from_default_env().add_directive(filter_level.into());

    let file_appender = tracing_appender::rolling::never(
        log_file.parent().unwrap_or(std::path::Path::new(".")),
        log_file.file_name().unwrap_or(std::ffi::OsStr::new("cipmon.log")),
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::Layer::new().with_writer(std::io::stderr).with_ansi(true))
        .with(fmt::Layer::new().with_writer(non_blocking).with_ansi(false));

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(guard)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = setup_logging(cli.verbose, &cli.log_file)?;

    info!("Starting cipmon CLI");

    match cli.command {
        Commands::Parse { file, pretty } => {
            let Some(monster) = parse_monster_file(&file)? else {
                anyhow::bail!("file not found: {:?}", file);
            };
            println!("{}", monster.to_json(pretty)?);
        }
        Commands::Pairs { file } => {
            let Some(lines) = open_cip_lines(&file)? else {
                anyhow::bail!("file not found: {:?}", file);
            };
            for pair in PropertyPairs::new(lines) {
                let (name, value) = pair?;
                println!("{} = {}", name, value);
            }
        }
        Commands::Scan { dir, config } => {
            if !dir.exists() {
                anyhow::bail!("Monster directory not found at {:?}", dir);
            }

            let config = match config {
                Some(path) => ScanConfig::from_file(&path)
                    .map_err(|e| anyhow::anyhow!("Failed to load scan config: {}", e))?,
                None => ScanConfig::default(),
            };

            let monsters = load_monster_directory(&dir, &config)?;
            for (_, monster) in &monsters {
                println!("{} {}", monster.race_id, monster.name);
            }

            info!("Decoded {} monsters from {:?}", monsters.len(), dir);
            println!("{} monsters", monsters.len());
        }
    }

    info!("cipmon CLI finished");
    Ok(())
}
