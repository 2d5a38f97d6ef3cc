//! # CLI Module
//!
//! Command-line interface for the media indexer.
//!
//! ## Usage
//! ```bash
//! # Index a library into the default database
//! media-atlas scan ~/Pictures
//!
//! # Add a second tree without clearing the first
//! media-atlas scan /mnt/phone --keep
//!
//! # Duplicates, bursts, places and live photos
//! media-atlas analyze --threshold 8
//!
//! # JSON output
//! media-atlas analyze --output json
//!
//! # Collection statistics
//! media-atlas stats
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use media_atlas::core::analytics::{
    analyze, AnalysisConfig, AnalysisReport, DEFAULT_GPS_DISTANCE_M, DEFAULT_TIME_GAP_SECS,
};
use media_atlas::core::comparator::{SimilarityConfig, DEFAULT_SIMILARITY_THRESHOLD};
use media_atlas::core::hasher::HashAlgorithmKind;
use media_atlas::core::metadata::ToolConfig;
use media_atlas::core::pipeline::{CancellationToken, ScanOutcome, Scanner, WorkerPool};
use media_atlas::core::scanner::ScanConfig;
use media_atlas::core::store::{SqliteStore, BRIGHT_THRESHOLD, DARK_THRESHOLD};
use media_atlas::error::{Result, StoreError};
use media_atlas::events::{EventChannel, ScanEvent};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// Media Atlas - Index a photo and video library
#[derive(Parser, Debug)]
#[command(name = "media-atlas")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a directory tree into the index
    Scan {
        /// Directory to scan
        root: PathBuf,

        /// Index database path
        #[arg(long)]
        db: Option<PathBuf>,

        /// Worker threads (default: half the CPUs, at least 2)
        #[arg(short, long)]
        threads: Option<usize>,

        /// Directory holding ffprobe and ffmpeg
        #[arg(long)]
        bin_dir: Option<PathBuf>,

        /// Keep existing records instead of starting fresh
        #[arg(long)]
        keep: bool,

        /// Follow symbolic links
        #[arg(long)]
        follow_symlinks: bool,
    },

    /// Find duplicates, similar shots, bursts, places and live photos
    Analyze {
        /// Index database path
        #[arg(long)]
        db: Option<PathBuf>,

        /// Similarity threshold in Hamming bits (lower = stricter)
        #[arg(long, default_value_t = DEFAULT_SIMILARITY_THRESHOLD)]
        threshold: u32,

        /// Hash used for similarity
        #[arg(short, long, default_value = "perceptual")]
        algorithm: Algorithm,

        /// Largest gap inside a time group, in seconds
        #[arg(
            long,
            default_value_t = DEFAULT_TIME_GAP_SECS,
            value_parser = clap::value_parser!(i64).range(0..)
        )]
        gap: i64,

        /// Location cluster radius, in metres
        #[arg(long, default_value_t = DEFAULT_GPS_DISTANCE_M)]
        distance: f64,

        /// Leave corrupted-but-usable files out of similarity
        #[arg(long)]
        exclude_degraded: bool,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Print collection statistics from the index
    Stats {
        /// Index database path
        #[arg(long)]
        db: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Algorithm {
    /// Average Hash - Fast, good for exact duplicates
    Average,
    /// Difference Hash - Good balance
    Difference,
    /// Perceptual Hash - Most robust to edits (default)
    Perceptual,
    /// Wavelet Hash - Robust to scaling
    Wavelet,
}

impl From<Algorithm> for HashAlgorithmKind {
    fn from(algo: Algorithm) -> Self {
        match algo {
            Algorithm::Average => HashAlgorithmKind::Average,
            Algorithm::Difference => HashAlgorithmKind::Difference,
            Algorithm::Perceptual => HashAlgorithmKind::Perceptual,
            Algorithm::Wavelet => HashAlgorithmKind::Wavelet,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    media_atlas::init_tracing(cli.verbose);

    match cli.command {
        Commands::Scan {
            root,
            db,
            threads,
            bin_dir,
            keep,
            follow_symlinks,
        } => {
            let mut tools = ToolConfig::new();
            if let Some(dir) = bin_dir {
                tools = tools.bin_dir(dir);
            }
            let config = ScanConfig::default()
                .follow_symlinks(follow_symlinks)
                .tools(tools);
            run_scan(&root, &database_path(db), threads, config, keep)
        }
        Commands::Analyze {
            db,
            threshold,
            algorithm,
            gap,
            distance,
            exclude_degraded,
            output,
        } => {
            let similarity = SimilarityConfig::default()
                .threshold(threshold)
                .hash_kind(algorithm.into())
                .include_degraded(!exclude_degraded);
            let config = AnalysisConfig::default()
                .similarity(similarity)
                .time_gap_secs(gap)
                .gps_distance_m(distance);
            run_analyze(&database_path(db), &config, output)
        }
        Commands::Stats { db, output } => run_stats(&database_path(db), output),
    }
}

/// `--db` if given, otherwise the per-user data directory
fn database_path(db: Option<PathBuf>) -> PathBuf {
    db.unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("media-atlas")
            .join("media_index.db")
    })
}

fn run_scan(
    root: &Path,
    db_path: &Path,
    threads: Option<usize>,
    config: ScanConfig,
    keep: bool,
) -> Result<()> {
    let term = Term::stderr();

    term.write_line(&format!(
        "{} {}",
        style("Media Atlas").bold().cyan(),
        style(env!("CARGO_PKG_VERSION")).dim()
    ))
    .ok();
    term.write_line("").ok();

    let mut store = SqliteStore::open(db_path)?;
    if !keep {
        store.reset()?;
    }

    let pool = match threads {
        Some(workers) => WorkerPool::with_workers(workers)?,
        None => WorkerPool::new()?,
    };
    let scanner = Scanner::builder(&pool).config(config).build();
    let cancel = CancellationToken::new();

    let (sender, receiver) = EventChannel::new();

    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::with_template("{spinner:.green} {pos} files {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    progress.enable_steady_tick(Duration::from_millis(120));

    let progress_clone = progress.clone();

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            match event {
                ScanEvent::Progress(p) => {
                    progress_clone.set_position(p.files_processed as u64);
                    progress_clone.set_message(
                        p.current_path
                            .file_name()
                            .unwrap_or_default()
                            .to_string_lossy()
                            .into_owned(),
                    );
                }
                ScanEvent::WalkError { path, message } => {
                    progress_clone.println(format!(
                        "  {} {}: {}",
                        style("!").yellow(),
                        path.display(),
                        message
                    ));
                }
                ScanEvent::Completed(_) | ScanEvent::Cancelled { .. } => {
                    progress_clone.finish_and_clear();
                }
                ScanEvent::Started { .. } => {}
            }
        }
    });

    let result = scanner.scan_with_events(root, &mut store, &cancel, &sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    progress.finish_and_clear();

    let outcome = result?;
    print_scan_summary(&term, &outcome, db_path);
    Ok(())
}

fn print_scan_summary(term: &Term, outcome: &ScanOutcome, db_path: &Path) {
    let summary = &outcome.summary;

    let heading = if outcome.is_cancelled() {
        format!("{} Scan Cancelled", style("✗").red().bold())
    } else {
        format!("{} Scan Complete", style("✓").green().bold())
    };
    term.write_line(&heading).ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} files indexed in {:.1}s",
        style(summary.files_processed).cyan(),
        summary.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&format!(
        "  {} images, {} videos",
        style(summary.images).cyan(),
        style(summary.videos).cyan()
    ))
    .ok();

    if summary.corrupted > 0 {
        term.write_line(&format!(
            "  {} corrupted ({} unusable)",
            style(summary.corrupted).yellow(),
            style(summary.unusable).red()
        ))
        .ok();
    }

    if !outcome.walk_errors.is_empty() {
        term.write_line(&format!(
            "  {} unreadable entries skipped",
            style(outcome.walk_errors.len()).yellow()
        ))
        .ok();
    }

    term.write_line("").ok();
    term.write_line(&format!(
        "{}",
        style(format!("Index: {}", db_path.display())).dim()
    ))
    .ok();
}

fn run_analyze(db_path: &Path, config: &AnalysisConfig, output: OutputFormat) -> Result<()> {
    let store = SqliteStore::open(db_path)?;
    let records = store.load_records()?;
    let report = analyze(&records, config);

    match output {
        OutputFormat::Pretty => print_pretty_report(&Term::stdout(), &report),
        OutputFormat::Json => print_json(&report)?,
    }

    Ok(())
}

fn print_pretty_report(term: &Term, report: &AnalysisReport) {
    term.write_line(&format!(
        "{} {} records analyzed",
        style("✓").green().bold(),
        style(report.records).cyan()
    ))
    .ok();
    term.write_line("").ok();

    section(term, "Exact Duplicates", report.exact_duplicates.len());
    for (i, group) in report.exact_duplicates.iter().enumerate() {
        term.write_line(&format!(
            "  {} {} copies, {} reclaimable",
            style(format!("Group {}:", i + 1)).bold(),
            group.paths.len(),
            style(format_bytes(group.reclaimable_bytes())).yellow()
        ))
        .ok();
        for path in &group.paths {
            term.write_line(&format!("    {} {}", style("○").dim(), display_path(path)))
                .ok();
        }
    }

    section(term, "Similar Images", report.similarity_clusters.len());
    for (i, cluster) in report.similarity_clusters.iter().enumerate() {
        term.write_line(&format!(
            "  {} {} ({} files, avg distance {:.1})",
            style(format!("Cluster {}:", i + 1)).bold(),
            style(cluster.match_type).yellow(),
            cluster.members.len(),
            cluster.average_distance
        ))
        .ok();
        for path in &cluster.members {
            term.write_line(&format!("    {} {}", style("○").dim(), display_path(path)))
                .ok();
        }
    }

    section(term, "Time Groups", report.time_groups.len());
    for group in report.time_groups.iter().filter(|g| g.members.len() > 1) {
        term.write_line(&format!(
            "  {} → {}  {} files",
            style(group.start).cyan(),
            style(group.end).cyan(),
            group.members.len()
        ))
        .ok();
    }

    section(term, "Places", report.location_clusters.len());
    for cluster in &report.location_clusters {
        term.write_line(&format!(
            "  {:.5}, {:.5}  {} files",
            cluster.latitude,
            cluster.longitude,
            cluster.members.len()
        ))
        .ok();
    }

    section(term, "Live Photos", report.live_pairs.len());
    for pair in &report.live_pairs {
        term.write_line(&format!(
            "  {} {} + {} ({:.1}s apart)",
            style(&pair.stem).bold(),
            display_path(&pair.image),
            display_path(&pair.video),
            pair.delta_seconds
        ))
        .ok();
    }

    term.write_line("").ok();
    term.write_line(&format!(
        "{}",
        style("Nothing was moved or deleted.").dim()
    ))
    .ok();
}

fn run_stats(db_path: &Path, output: OutputFormat) -> Result<()> {
    let store = SqliteStore::open(db_path)?;

    match output {
        OutputFormat::Json => print_json_stats(&store),
        OutputFormat::Pretty => print_pretty_stats(&Term::stdout(), &store),
    }
}

fn print_json_stats(store: &SqliteStore) -> Result<()> {
    let stats = serde_json::json!({
        "basic": store.basic_stats()?,
        "year_month": store.year_month_counts()?,
        "resolutions": store.resolution_stats()?,
        "cameras": store.camera_ranking()?,
        "lenses": store.lens_ranking()?,
        "dark_images": store.dark_images(DARK_THRESHOLD)?,
        "bright_images": store.bright_images(BRIGHT_THRESHOLD)?,
        "truncated_videos": store.truncated_videos()?,
        "corrupted_files": store.corrupted_files()?,
        "sha_duplicates": store.sha_duplicates()?,
    });
    print_json(&stats)
}

fn print_pretty_stats(term: &Term, store: &SqliteStore) -> Result<()> {
    let basic = store.basic_stats()?;
    term.write_line(&format!(
        "  {} files: {} images, {} videos, {} corrupted",
        style(basic.total).cyan(),
        style(basic.images).cyan(),
        style(basic.videos).cyan(),
        style(basic.corrupted).yellow()
    ))
    .ok();

    section(term, "By Month", 0);
    for row in store.year_month_counts()? {
        let label = format!("{}-{:02}", row.year, row.month);
        term.write_line(&format!("  {:<8} {}", label, row.count)).ok();
    }

    section(term, "Resolutions", 0);
    for row in store.resolution_stats()?.iter().take(10) {
        let size = match (row.width, row.height) {
            (Some(w), Some(h)) => format!("{w}x{h}"),
            _ => "unknown".to_string(),
        };
        term.write_line(&format!("  {:<12} {}", size, row.count)).ok();
    }

    section(term, "Cameras", 0);
    for row in store.camera_ranking()? {
        term.write_line(&format!("  {:<24} {}", row.name, row.count)).ok();
    }

    section(term, "Lenses", 0);
    for row in store.lens_ranking()? {
        term.write_line(&format!("  {:<24} {}", row.name, row.count)).ok();
    }

    let dark = store.dark_images(DARK_THRESHOLD)?;
    let bright = store.bright_images(BRIGHT_THRESHOLD)?;
    section(term, "Exposure Outliers", dark.len() + bright.len());
    for entry in dark.iter().chain(bright.iter()) {
        term.write_line(&format!(
            "  {:.3}  {}",
            entry.brightness_mean,
            display_path(&entry.path)
        ))
        .ok();
    }

    let truncated = store.truncated_videos()?;
    section(term, "Truncated Videos", truncated.len());
    for video in &truncated {
        term.write_line(&format!(
            "  {}  frames={} bitrate={}",
            display_path(&video.path),
            video.frame_count.map_or("-".to_string(), |n| n.to_string()),
            video.bitrate.map_or("-".to_string(), |b| b.to_string())
        ))
        .ok();
    }

    let corrupted = store.corrupted_files()?;
    section(term, "Corrupted Files", corrupted.len());
    for file in &corrupted {
        let marker = if file.usable {
            style("~").yellow()
        } else {
            style("✗").red()
        };
        term.write_line(&format!(
            "  {} {}: {}",
            marker,
            display_path(&file.path),
            file.read_error.as_deref().unwrap_or("unknown error")
        ))
        .ok();
    }

    let duplicates = store.sha_duplicates()?;
    section(term, "Identical Content", duplicates.len());
    for row in &duplicates {
        term.write_line(&format!(
            "  {}…  {} copies",
            &row.content_hash[..row.content_hash.len().min(16)],
            row.count
        ))
        .ok();
    }

    Ok(())
}

fn section(term: &Term, title: &str, count: usize) {
    term.write_line("").ok();
    let heading = if count > 0 {
        format!("{} ({})", title, count)
    } else {
        title.to_string()
    };
    term.write_line(&format!("{}", style(heading).bold().underlined()))
        .ok();
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| StoreError::SerializationFailed(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

fn display_path(path: &Path) -> String {
    match dirs::home_dir().and_then(|home| path.strip_prefix(home).ok().map(Path::to_path_buf)) {
        Some(relative) => format!("~/{}", relative.display()),
        None => path.display().to_string(),
    }
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
