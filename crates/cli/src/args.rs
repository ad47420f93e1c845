use std::collections::HashSet;
use std::env;
use std::path::PathBuf;

use clap::Parser;
use code_plagiarism_core::{
    DEFAULT_KGRAM_LEN, DEFAULT_MAX_FILE_SIZE_BYTES, DEFAULT_MAX_OCCURRENCES_PER_HASH,
    DEFAULT_WINDOW_SIZE, IndexOptions, ScanOptions,
};

/// Finds source files that share copied fragments, using winnowing
/// fingerprints over normalized token streams.
#[derive(Parser, Debug, Clone)]
#[command(name = "code-plagiarism", author, version, about, long_about = None)]
#[command(after_help = concat!(
    "Examples:\n",
    "  code-plagiarism submissions/\n",
    "  code-plagiarism -k 12 -w 8 --threshold 0.4 --ext c --ext h a/ b/\n",
    "  code-plagiarism --json --stats --strict .\n",
))]
pub(crate) struct Cli {
    /// Roots to scan (default: current directory)
    pub(crate) roots: Vec<PathBuf>,

    /// Tokens per k-gram
    #[arg(short = 'k', long, default_value_t = DEFAULT_KGRAM_LEN, value_parser = parse_positive)]
    pub(crate) kgram_len: usize,

    /// k-grams per winnowing window
    #[arg(short = 'w', long, default_value_t = DEFAULT_WINDOW_SIZE, value_parser = parse_positive)]
    pub(crate) window_size: usize,

    /// Minimum similarity (0..1) for a pair to be reported
    #[arg(long, default_value_t = 0.0, value_parser = parse_threshold)]
    pub(crate) threshold: f64,

    /// Limit the number of reported pairs
    #[arg(long, default_value_t = 200)]
    pub(crate) max_report_items: usize,

    /// Per-file occurrence cap for one hash during region reconstruction
    #[arg(long = "max-occurrences", default_value_t = DEFAULT_MAX_OCCURRENCES_PER_HASH, value_parser = parse_positive)]
    pub(crate) max_occurrences: usize,

    /// Do not keep literal k-gram tokens in the index
    #[arg(long)]
    pub(crate) no_kgrams: bool,

    /// Only scan files with this extension (repeatable, case-insensitive)
    #[arg(long = "ext", value_name = "EXT")]
    pub(crate) extensions: Vec<String>,

    /// Add an ignored directory name (repeatable)
    #[arg(long = "ignore-dir", value_name = "NAME")]
    pub(crate) ignore_dirs: Vec<String>,

    /// Do not respect .gitignore rules
    #[arg(long)]
    pub(crate) no_gitignore: bool,

    /// Skip files larger than n bytes
    #[arg(long, default_value_t = DEFAULT_MAX_FILE_SIZE_BYTES)]
    pub(crate) max_file_size: u64,

    /// Stop after scanning n files
    #[arg(long)]
    pub(crate) max_files: Option<usize>,

    /// Output JSON
    #[arg(long)]
    pub(crate) json: bool,

    /// Include the normalized tokens of each region in JSON output
    #[arg(long)]
    pub(crate) show_tokens: bool,

    /// Include scan stats (JSON) or print them to stderr
    #[arg(long)]
    pub(crate) stats: bool,

    /// Exit non-zero if the scan was incomplete
    #[arg(long)]
    pub(crate) strict: bool,

    /// Log debug events to stderr (RUST_LOG overrides)
    #[arg(short = 'v', long)]
    pub(crate) verbose: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct ParsedArgs {
    pub(crate) json: bool,
    pub(crate) show_tokens: bool,
    pub(crate) stats: bool,
    pub(crate) strict: bool,
    pub(crate) roots: Vec<PathBuf>,
    pub(crate) options: ScanOptions,
}

fn parse_positive(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("invalid number: {raw}")),
    }
}

fn parse_threshold(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|_| "threshold must be a number".to_string())?;
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err("threshold must be 0..1".to_string());
    }
    Ok(value)
}

fn normalize_extension(raw: &str) -> String {
    raw.trim().trim_start_matches('.').to_ascii_lowercase()
}

impl Cli {
    pub(crate) fn into_parsed(self) -> Result<ParsedArgs, String> {
        let extensions: HashSet<String> = self
            .extensions
            .iter()
            .map(|e| normalize_extension(e))
            .filter(|e| !e.is_empty())
            .collect();

        let mut options = ScanOptions {
            extensions: (!extensions.is_empty()).then_some(extensions),
            max_file_size: Some(self.max_file_size),
            max_files: self.max_files,
            respect_gitignore: !self.no_gitignore,
            similarity_threshold: self.threshold,
            max_report_items: self.max_report_items,
            index: IndexOptions {
                kgram_len: self.kgram_len,
                window_size: self.window_size,
                keep_kgrams: !self.no_kgrams,
                max_occurrences_per_hash: self.max_occurrences,
            },
            ..ScanOptions::default()
        };
        options.ignore_dirs.extend(self.ignore_dirs);

        let roots = if self.roots.is_empty() {
            vec![env::current_dir().map_err(|e| format!("failed to get cwd: {e}"))?]
        } else {
            self.roots
        };

        Ok(ParsedArgs {
            json: self.json,
            show_tokens: self.show_tokens,
            stats: self.stats,
            strict: self.strict,
            roots,
            options,
        })
    }
}
