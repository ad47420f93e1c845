mod args;
mod json;
mod path;
mod text;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use code_plagiarism_core::analyze_paths_with_stats;
use tracing_subscriber::EnvFilter;

use crate::args::{Cli, ParsedArgs};
use crate::json::{JsonAnalysisWithStats, JsonScanStats, map_analysis, write_json};
use crate::path::resolve_path;
use crate::text::{format_scan_stats, format_text_analysis, has_fatal_skips};

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { 2 } else { 0 };
            let _ = err.print();
            return ExitCode::from(code);
        }
    };
    init_tracing(cli.verbose);

    let parsed = match cli.into_parsed() {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("Error: {message}");
            return ExitCode::from(2);
        }
    };

    match run(&parsed) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(1)
        }
    }
}

fn run(parsed: &ParsedArgs) -> anyhow::Result<u8> {
    let roots: Vec<PathBuf> = parsed
        .roots
        .iter()
        .map(|p| resolve_path(p).with_context(|| format!("failed to resolve {}", p.display())))
        .collect::<anyhow::Result<_>>()?;
    tracing::debug!(roots = roots.len(), "scanning");

    let outcome =
        analyze_paths_with_stats(&roots, &parsed.options).context("plagiarism scan failed")?;
    let stats = outcome.stats;
    let analysis = map_analysis(outcome.result, parsed.show_tokens);

    if parsed.json {
        if parsed.stats {
            write_json(&JsonAnalysisWithStats {
                analysis,
                scan_stats: JsonScanStats::from(stats.clone()),
            })?;
        } else {
            write_json(&analysis)?;
        }
    } else {
        print!("{}", format_text_analysis(&analysis));
    }

    if parsed.stats && !parsed.json {
        eprint!("{}", format_scan_stats(&stats));
    }
    if parsed.strict && has_fatal_skips(&stats) {
        if !parsed.stats {
            eprint!("{}", format_scan_stats(&stats));
        }
        return Ok(1);
    }

    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(roots: Vec<PathBuf>, max_files: Option<usize>, strict: bool) -> ParsedArgs {
        let mut args = vec!["code-plagiarism".to_string(), "--json".to_string()];
        if strict {
            args.push("--strict".to_string());
        }
        if let Some(n) = max_files {
            args.push("--max-files".to_string());
            args.push(n.to_string());
        }
        args.extend(roots.iter().map(|r| r.display().to_string()));
        Cli::try_parse_from(args).unwrap().into_parsed().unwrap()
    }

    #[test]
    fn strict_fails_when_the_file_budget_is_hit() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        for name in ["a.c", "b.c", "c.c"] {
            std::fs::write(dir.path().join(name), "int x = 1;")?;
        }
        let roots = vec![dir.path().to_path_buf()];

        assert_eq!(run(&parsed(roots.clone(), None, true))?, 0);
        assert_eq!(run(&parsed(roots.clone(), Some(1), false))?, 0);
        assert_eq!(run(&parsed(roots, Some(1), true))?, 1);
        Ok(())
    }

    #[test]
    fn missing_root_is_an_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let err = run(&parsed(vec![dir.path().join("missing")], None, false)).unwrap_err();
        assert!(format!("{err:#}").contains("plagiarism scan failed"));
        Ok(())
    }
}
