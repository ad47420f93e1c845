use super::*;

use std::collections::HashSet;

use tempfile::TempDir;

fn write(root: &Path, rel: &str, contents: impl AsRef<[u8]>) -> io::Result<()> {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}

fn labels(outcome: &ScanOutcome<Vec<TokenizedFile>>) -> Vec<&str> {
    outcome.result.iter().map(TokenizedFile::path).collect()
}

fn repo() -> io::Result<TempDir> {
    tempfile::Builder::new().prefix("proj").tempdir()
}

#[test]
fn scans_text_files_in_name_order() -> Result<(), ScanError> {
    let dir = repo()?;
    write(dir.path(), "b.c", "int b = 2;")?;
    write(dir.path(), "a.c", "int a = 1;")?;
    write(dir.path(), "sub/c.c", "return 3;")?;

    let outcome = scan_files(&[dir.path().to_path_buf()], &ScanOptions::default())?;
    let label = root_label(dir.path(), 0);
    assert_eq!(
        labels(&outcome),
        vec![
            format!("{label}/a.c"),
            format!("{label}/b.c"),
            format!("{label}/sub/c.c")
        ]
    );
    assert_eq!(outcome.result[0].tokens(), ["ID", "ID", "=", "NUM", ";"]);
    assert_eq!(outcome.stats.candidate_files, 3);
    assert_eq!(outcome.stats.scanned_files, 3);
    Ok(())
}

#[test]
fn skips_binary_non_utf8_and_large_files() -> Result<(), ScanError> {
    let dir = repo()?;
    write(dir.path(), "ok.txt", "x = 1;")?;
    write(dir.path(), "bin.dat", [b'a', 0, b'b'])?;
    write(dir.path(), "latin1.txt", [0xff, 0xfe, b'a'])?;
    write(dir.path(), "big.txt", "y".repeat(64))?;

    let options = ScanOptions {
        max_file_size: Some(32),
        ..ScanOptions::default()
    };
    let outcome = scan_files(&[dir.path().to_path_buf()], &options)?;
    assert_eq!(outcome.result.len(), 1);
    assert!(outcome.result[0].path().ends_with("/ok.txt"));
    assert_eq!(outcome.stats.skipped_binary, 1);
    assert_eq!(outcome.stats.skipped_not_utf8, 1);
    assert_eq!(outcome.stats.skipped_too_large, 1);
    assert_eq!(outcome.stats.candidate_files, 4);
    Ok(())
}

#[test]
fn honors_ignore_dirs_and_gitignore() -> Result<(), ScanError> {
    let dir = repo()?;
    write(dir.path(), ".gitignore", "generated/\n*.log\n")?;
    write(dir.path(), "main.c", "int main;")?;
    write(dir.path(), "node_modules/dep.js", "var x;")?;
    write(dir.path(), "generated/out.c", "int out;")?;
    write(dir.path(), "debug.log", "log")?;

    let root = vec![dir.path().to_path_buf()];
    let outcome = scan_files(&root, &ScanOptions::default())?;
    let found: HashSet<String> = outcome
        .result
        .iter()
        .map(|f| f.path().rsplit('/').next().unwrap_or_default().to_string())
        .collect();
    assert_eq!(
        found,
        HashSet::from([".gitignore".to_string(), "main.c".to_string()])
    );

    let options = ScanOptions {
        respect_gitignore: false,
        ..ScanOptions::default()
    };
    let outcome = scan_files(&root, &options)?;
    assert_eq!(outcome.result.len(), 4);
    Ok(())
}

#[test]
fn extension_filter_is_case_insensitive() -> Result<(), ScanError> {
    let dir = repo()?;
    write(dir.path(), "a.C", "int a;")?;
    write(dir.path(), "b.py", "b = 1")?;
    write(dir.path(), "README", "text")?;

    let options = ScanOptions {
        extensions: Some(HashSet::from(["c".to_string()])),
        ..ScanOptions::default()
    };
    let outcome = scan_files(&[dir.path().to_path_buf()], &options)?;
    assert_eq!(outcome.result.len(), 1);
    assert!(outcome.result[0].path().ends_with("/a.C"));
    assert_eq!(outcome.stats.skipped_extension, 2);
    Ok(())
}

#[test]
fn max_files_stops_the_walk() -> Result<(), ScanError> {
    let dir = repo()?;
    for i in 0..5 {
        write(dir.path(), &format!("f{i}.c"), "int x;")?;
    }
    let options = ScanOptions {
        max_files: Some(2),
        ..ScanOptions::default()
    };
    let outcome = scan_files(&[dir.path().to_path_buf()], &options)?;
    assert_eq!(outcome.result.len(), 2);
    assert_eq!(outcome.stats.skipped_budget_max_files, 1);

    let options = ScanOptions {
        max_files: Some(0),
        ..ScanOptions::default()
    };
    let outcome = scan_files(&[dir.path().to_path_buf()], &options)?;
    assert!(outcome.result.is_empty());
    Ok(())
}

#[test]
fn rejects_missing_and_file_roots() -> io::Result<()> {
    let dir = repo()?;
    write(dir.path(), "file.c", "int a;")?;

    let missing = dir.path().join("missing");
    let err = scan_files(&[missing.clone()], &ScanOptions::default()).unwrap_err();
    assert!(matches!(err, ScanError::InvalidRoot { path, .. } if path == missing));

    let file = dir.path().join("file.c");
    let err = scan_files(&[file], &ScanOptions::default()).unwrap_err();
    assert!(matches!(err, ScanError::InvalidRoot { reason, .. } if reason == "not a directory"));
    Ok(())
}

#[test]
fn rejects_invalid_threshold() -> io::Result<()> {
    let dir = repo()?;
    let options = ScanOptions {
        similarity_threshold: 1.5,
        ..ScanOptions::default()
    };
    let err = scan_files(&[dir.path().to_path_buf()], &options).unwrap_err();
    assert!(matches!(
        err,
        ScanError::Fingerprint(crate::error::FingerprintError::InvalidThreshold(_))
    ));
    Ok(())
}

#[test]
fn repeated_root_names_get_distinct_labels() {
    let roots = vec![PathBuf::from("/a/src"), PathBuf::from("/b/src"), PathBuf::from("/")];
    let labels: Vec<String> = label_roots(&roots).into_iter().map(|r| r.label).collect();
    assert_eq!(labels, vec!["src", "src~1", "root2"]);
}

#[test]
fn rel_paths_use_forward_slashes() {
    let root = Path::new("/repo");
    assert_eq!(make_rel_path(root, &root.join("a").join("b.c")), "a/b.c");
    assert_eq!(make_rel_path(root, Path::new("/elsewhere/x.c")), "x.c");
}
