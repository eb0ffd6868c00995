//! Interactive CSV picker.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker provides the "run `spc` and choose a CSV" UX
//!
//! Only `.csv` paths are accepted, whether picked from the list or typed in.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Default directory recursion depth for finding CSV files.
const DEFAULT_SEARCH_DEPTH: usize = 4;

/// Prompt on stdin/stdout for a CSV file under the current directory tree.
pub fn prompt_for_csv_path() -> Result<PathBuf, AppError> {
    let files = discover_csv_files();
    let stdin = io::stdin();
    prompt_from(&files, &mut stdin.lock(), &mut io::stdout())
}

/// Prompt loop over explicit streams.
///
/// Behavior:
/// - list `files`
/// - accept either a number (from the list) or an explicit path
/// - `q` cancels
fn prompt_from<R: BufRead, W: Write>(
    files: &[PathBuf],
    input: &mut R,
    output: &mut W,
) -> Result<PathBuf, AppError> {
    if files.is_empty() {
        return Err(AppError::usage(
            "No .csv files found. Provide one with `spc analyze -f <file.csv>`.",
        ));
    }

    let write_err = |e: io::Error| AppError::usage(format!("Failed to write prompt: {e}"));

    writeln!(output, "Found {} CSV file(s):", files.len()).map_err(write_err)?;
    for (idx, path) in files.iter().enumerate() {
        writeln!(output, "{:>3}) {}", idx + 1, pretty_path(path)).map_err(write_err)?;
    }

    loop {
        write!(
            output,
            "Select a file by number (1-{}) or type a path (q to quit): ",
            files.len()
        )
        .map_err(write_err)?;
        output.flush().map_err(write_err)?;

        let mut line = String::new();
        let bytes = input
            .read_line(&mut line)
            .map_err(|e| AppError::usage(format!("Failed to read input: {e}")))?;

        if bytes == 0 {
            return Err(AppError::usage(
                "No input received. Provide a CSV path with `spc analyze -f <file.csv>`.",
            ));
        }

        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Err(AppError::usage("Canceled."));
        }

        if let Ok(choice) = line.parse::<usize>() {
            if (1..=files.len()).contains(&choice) {
                return validate_csv_path(&files[choice - 1]);
            }
            writeln!(
                output,
                "Invalid choice: {choice}. Enter a number between 1 and {}.",
                files.len()
            )
            .map_err(write_err)?;
            continue;
        }

        match validate_csv_path(Path::new(line)) {
            Ok(path) => return Ok(path),
            Err(err) => writeln!(output, "{err}").map_err(write_err)?,
        }
    }
}

/// Validate the provided path points to an existing `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !has_csv_extension(path) {
        return Err(AppError::usage(format!(
            "Expected a .csv file (got: {}). Use -f to pass a CSV path.",
            path.display()
        )));
    }
    if !path.exists() {
        return Err(AppError::usage(format!(
            "CSV file not found: {}",
            path.display()
        )));
    }
    if path.is_dir() {
        return Err(AppError::usage(format!(
            "Expected a file, got a directory: {}",
            path.display()
        )));
    }

    Ok(path.to_path_buf())
}

/// Discover `*.csv` files under the current directory (deterministic order).
///
/// This is used by both the basic text prompt and the TUI.
pub fn discover_csv_files() -> Vec<PathBuf> {
    find_csv_files(Path::new("."), DEFAULT_SEARCH_DEPTH)
}

/// `*.csv` files under `root`, at most `max_depth` directories deep.
pub fn find_csv_files(root: &Path, max_depth: usize) -> Vec<PathBuf> {
    let mut out = Vec::new();
    find_csv_files_inner(root, 0, max_depth, &mut out);
    out.sort_by_key(|p| pretty_path(p));
    out
}

fn find_csv_files_inner(root: &Path, depth: usize, max_depth: usize, out: &mut Vec<PathBuf>) {
    if depth > max_depth {
        return;
    }

    let Ok(entries) = fs::read_dir(root) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            if !should_skip_dir(&path) {
                find_csv_files_inner(&path, depth + 1, max_depth, out);
            }
        } else if file_type.is_file() && has_csv_extension(&path) {
            out.push(path);
        }
    }
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn should_skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    matches!(name, ".git" | "target" | "node_modules")
}

pub fn pretty_path(path: &Path) -> String {
    let stripped = path.strip_prefix("./").unwrap_or(path);
    stripped.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::unique_temp_dir;

    fn tree() -> (PathBuf, Vec<PathBuf>) {
        let root = unique_temp_dir("picker");
        fs::create_dir_all(root.join("nested")).unwrap();
        fs::create_dir_all(root.join("target")).unwrap();
        let files = vec![root.join("b.csv"), root.join("nested").join("a.CSV")];
        for f in &files {
            fs::write(f, "layer,mean_ir_pwr\n1,0.1\n").unwrap();
        }
        fs::write(root.join("notes.txt"), "x").unwrap();
        fs::write(root.join("target").join("skip.csv"), "x").unwrap();
        (root, files)
    }

    #[test]
    fn finds_only_csv_files_outside_skipped_dirs() {
        let (root, files) = tree();
        let found = find_csv_files(&root, DEFAULT_SEARCH_DEPTH);
        assert_eq!(found.len(), 2);
        for f in &files {
            assert!(found.contains(f), "missing {}", f.display());
        }
    }

    #[test]
    fn validate_rejects_other_extensions_and_missing_files() {
        let (root, files) = tree();
        assert!(validate_csv_path(&files[0]).is_ok());
        assert_eq!(validate_csv_path(&root.join("notes.txt")).unwrap_err().exit_code(), 2);
        assert!(validate_csv_path(&root.join("absent.csv")).is_err());
    }

    #[test]
    fn prompt_accepts_a_number_after_a_bad_choice() {
        let (_root, files) = tree();
        let mut input = "9\n1\n".as_bytes();
        let mut output = Vec::new();

        let picked = prompt_from(&files, &mut input, &mut output).unwrap();
        assert_eq!(picked, files[0]);

        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("Found 2 CSV file(s):"));
        assert!(shown.contains("Invalid choice: 9."));
    }

    #[test]
    fn prompt_can_be_canceled() {
        let (_root, files) = tree();
        let err = prompt_from(&files, &mut "q\n".as_bytes(), &mut Vec::new()).unwrap_err();
        assert_eq!(err.message(), "Canceled.");
    }

    #[test]
    fn prompt_fails_without_files() {
        assert!(prompt_from(&[], &mut "".as_bytes(), &mut Vec::new()).is_err());
    }
}
