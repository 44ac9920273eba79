use anyhow::bail;
use clap::{Parser, Subcommand};
use image_phash_core::{logging, Config, Error, LogLevel, Phasher};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use walkdir::WalkDir;

/// Extensions picked up when a directory is given instead of a file
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "tif", "tiff"];

#[derive(Parser)]
#[command(name = "image-phash")]
#[command(about = "Compute perceptual hashes of image files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Number of worker threads (0 = one per CPU)
    #[arg(short, long, global = true)]
    threads: Option<usize>,

    /// Write rolling log files to this directory instead of stderr
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// 64-bit DCT hash, printed as hex
    Dct {
        /// Image files or directories to hash
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Print the hash as a decimal integer instead of hex
        #[arg(long)]
        decimal: bool,
    },

    /// 72-byte multi-resolution hash, printed as hex
    Mh {
        /// Image files or directories to hash
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Generate default configuration file
    GenerateConfig {
        /// Path to save configuration file
        #[arg(default_value = "image-phash.json")]
        path: PathBuf,
    },
}

/// One delivered result: the path and either the printable hash or the error
type Outcome = (PathBuf, Result<String, Error>);

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => Config::default(),
    };

    // Override config with command line arguments
    if let Some(threads) = cli.threads {
        config.threads = threads;
    }
    if cli.log_dir.is_some() {
        config.log_dir = cli.log_dir.clone();
    }
    config.log_level = match cli.verbose {
        0 => config.log_level,
        1 => LogLevel::Debug,
        _ => LogLevel::Trace,
    };
    config.validate()?;

    init_logging(&config)?;

    match cli.command {
        Commands::Dct { paths, decimal } => {
            run_hashes(&config, &expand_paths(&paths), submit_dct(decimal))
        }

        Commands::Mh { paths } => run_hashes(&config, &expand_paths(&paths), submit_mh()),

        Commands::GenerateConfig { path } => {
            let config = Config::default();
            config.save_to_file(&path)?;
            println!("Configuration file generated at: {}", path.display());
            Ok(())
        }
    }
}

fn init_logging(config: &Config) -> Result<(), anyhow::Error> {
    let level: log::LevelFilter = config.log_level.into();
    match &config.log_dir {
        Some(dir) => {
            if let Err(e) = logging::init_logger(dir, level) {
                bail!("Failed to initialize logging in {}: {}", dir.display(), e);
            }
        }
        None => {
            env_logger::Builder::new()
                .filter_level(level)
                .parse_env(env_logger::Env::new().filter(logging::LOG_LEVEL_ENV))
                .init();
        }
    }
    Ok(())
}

/// Queue a DCT hash whose handler forwards the hex or decimal form
fn submit_dct(decimal: bool) -> impl Fn(&Phasher, &Path, mpsc::Sender<Outcome>) {
    move |phasher: &Phasher, file: &Path, tx: mpsc::Sender<Outcome>| {
        let tag = file.to_path_buf();
        phasher.image_hash(file, move |error, buffer, decimal_string| {
            let outcome = match error {
                Some(e) => Err(e),
                None if decimal => Ok(decimal_string),
                None => Ok(to_hex(&buffer)),
            };
            let _ = tx.send((tag, outcome));
        });
    }
}

/// Queue a multi-resolution hash whose handler forwards the hex form
fn submit_mh() -> impl Fn(&Phasher, &Path, mpsc::Sender<Outcome>) {
    |phasher: &Phasher, file: &Path, tx: mpsc::Sender<Outcome>| {
        let tag = file.to_path_buf();
        phasher.image_hash_mh(file, move |error, buffer| {
            let outcome = match error {
                Some(e) => Err(e),
                None => Ok(to_hex(&buffer)),
            };
            let _ = tx.send((tag, outcome));
        });
    }
}

/// Submit every file, then print results in completion order
fn run_hashes<S>(config: &Config, files: &[PathBuf], submit: S) -> Result<(), anyhow::Error>
where
    S: Fn(&Phasher, &Path, mpsc::Sender<Outcome>),
{
    if files.is_empty() {
        bail!("No image files found");
    }

    let phasher = Phasher::new(config.clone())?;
    info!(
        "Hashing {} files on {} threads",
        files.len(),
        phasher.context().threads()
    );

    let progress = (files.len() > 1).then(|| {
        let bar = ProgressBar::new(files.len() as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{eta}] {bar:40.cyan/blue} {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("##-"),
        );
        bar
    });

    let (tx, rx) = mpsc::channel();
    for file in files {
        submit(&phasher, file, tx.clone());
    }
    drop(tx);

    let failures = Cell::new(0usize);
    let report = |(path, outcome): Outcome| {
        match outcome {
            Ok(hash) => {
                let line = format!("{}\t{}", path.display(), hash);
                match &progress {
                    Some(bar) => bar.println(line),
                    None => println!("{}", line),
                }
            }
            Err(e) => {
                error!("{}: {}", path.display(), e);
                eprintln!("{}: {}", path.display(), e);
                failures.set(failures.get() + 1);
            }
        }
        if let Some(bar) = &progress {
            bar.inc(1);
        }
    };

    // Handlers fire on this thread while the loop drains completions
    while phasher.context().run_next() {
        rx.try_iter().for_each(&report);
    }
    rx.try_iter().for_each(&report);

    if let Some(bar) = &progress {
        bar.finish_with_message("done");
    }

    let failures = failures.get();
    if failures > 0 {
        bail!("{} of {} files could not be hashed", failures, files.len());
    }
    Ok(())
}

/// Expand directories into the image files below them
fn expand_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).follow_links(true) {
                match entry {
                    Ok(entry) if entry.file_type().is_file() && is_image(entry.path()) => {
                        files.push(entry.into_path());
                    }
                    Ok(_) => {}
                    Err(e) => warn!("Skipping unreadable entry under {}: {}", path.display(), e),
                }
            }
        } else {
            // Missing files are passed through so the hash job reports them
            files.push(path.clone());
        }
    }
    files
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
