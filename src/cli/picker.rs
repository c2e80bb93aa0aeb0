//! Interactive prompts.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker provides the "run `lv` and choose a catalog CSV" UX
//! - manual entry of the two statement URLs when a name doesn't resolve
//!
//! The picker searches for `*.csv` files under the current working directory.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::domain::StatementRefs;
use crate::error::AppError;

/// Default directory recursion depth for finding CSV files.
const DEFAULT_SEARCH_DEPTH: usize = 4;

/// Prompt the user to select a catalog CSV from the current directory tree.
///
/// Behavior:
/// - list discovered `*.csv` files
/// - accept either a number (from the list) or an explicit path
/// - `q` cancels
pub fn prompt_for_catalog_path() -> Result<PathBuf, AppError> {
    let files = discover_csv_files();
    if files.is_empty() {
        return Err(AppError::input("No .csv files found. Build one with `lv build-catalog -i <master.csv>` or pass `--catalog`."));
    }

    println!("Found {} CSV file(s):", files.len());
    for (idx, path) in files.iter().enumerate() {
        println!("{:>3}) {}", idx + 1, pretty_path(path));
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    loop {
        let prompt = format!("Select a catalog by number (1-{}) or type a path (q to quit): ", files.len());
        let Some(answer) = ask(&mut input, &mut output, &prompt)? else {
            return Err(AppError::input("No input received. Provide a catalog with `--catalog <file.csv>`."));
        };

        if answer.eq_ignore_ascii_case("q") {
            return Err(AppError::input("Canceled."));
        }

        if let Ok(choice) = answer.parse::<usize>() {
            if (1..=files.len()).contains(&choice) {
                return validate_csv_path(&files[choice - 1]);
            }
            println!("Invalid choice: {choice}. Enter a number between 1 and {}.", files.len());
            continue;
        }

        match validate_csv_path(Path::new(&answer)) {
            Ok(path) => return Ok(path),
            Err(err) => println!("{err}"),
        }
    }
}

/// Ask for the two statement page URLs on stdin.
pub fn prompt_for_manual_refs() -> Result<StatementRefs, AppError> {
    let stdin = io::stdin();
    read_manual_refs(&mut stdin.lock(), &mut io::stdout())
}

/// Read both URLs from `input`, re-asking on blank lines.
pub fn read_manual_refs(input: &mut impl BufRead, output: &mut impl Write) -> Result<StatementRefs, AppError> {
    let balance_sheet = ask_non_empty(input, output, "Balance Sheet URL: ")?;
    let profit_loss = ask_non_empty(input, output, "Profit & Loss URL: ")?;
    Ok(StatementRefs {
        balance_sheet,
        profit_loss,
    })
}

fn ask_non_empty(input: &mut impl BufRead, output: &mut impl Write, prompt: &str) -> Result<String, AppError> {
    loop {
        match ask(input, output, prompt)? {
            Some(answer) if !answer.is_empty() => return Ok(answer),
            Some(_) => continue,
            None => {
                return Err(AppError::input("No input received. Pass `--bs-url` and `--pl-url` instead."));
            }
        }
    }
}

/// Print `prompt` and read one trimmed line; `None` on EOF.
fn ask(input: &mut impl BufRead, output: &mut impl Write, prompt: &str) -> Result<Option<String>, AppError> {
    write!(output, "{prompt}")
        .and_then(|_| output.flush())
        .map_err(|e| AppError::input(format!("Failed to write prompt: {e}")))?;

    let mut line = String::new();
    let bytes = input
        .read_line(&mut line)
        .map_err(|e| AppError::input(format!("Failed to read input: {e}")))?;
    if bytes == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Validate the provided path points to a `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::input(format!("CSV file not found: {}", path.display())));
    }
    if path.is_dir() {
        return Err(AppError::input(format!("Expected a file, got a directory: {}", path.display())));
    }
    if !has_csv_extension(path) {
        return Err(AppError::input(format!("Expected a .csv file (got: {}).", path.display())));
    }

    Ok(path.to_path_buf())
}

/// Discover `*.csv` files under the current directory (deterministic order).
pub fn discover_csv_files() -> Vec<PathBuf> {
    find_csv_files(Path::new("."), DEFAULT_SEARCH_DEPTH)
}

fn find_csv_files(root: &Path, max_depth: usize) -> Vec<PathBuf> {
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

fn pretty_path(path: &Path) -> String {
    let stripped = path.strip_prefix("./").unwrap_or(path);
    stripped.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_refs_skip_blank_lines() {
        let mut input = "\n  http://bs  \nhttp://pl\n".as_bytes();
        let mut output = Vec::new();
        let refs = read_manual_refs(&mut input, &mut output).unwrap();
        assert_eq!(refs.balance_sheet, "http://bs");
        assert_eq!(refs.profit_loss, "http://pl");
        let shown = String::from_utf8(output).unwrap();
        assert_eq!(shown.matches("Balance Sheet URL: ").count(), 2);
    }

    #[test]
    fn manual_refs_eof_is_an_input_error() {
        let mut input = "http://bs\n".as_bytes();
        let err = read_manual_refs(&mut input, &mut Vec::new()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn csv_discovery_and_validation() {
        let root = std::env::temp_dir().join(format!("lv-picker-{}", std::process::id()));
        let nested = root.join("data");
        fs::create_dir_all(&nested).unwrap();
        fs::write(root.join("b.CSV"), "x").unwrap();
        fs::write(nested.join("a.csv"), "x").unwrap();
        fs::write(root.join("notes.txt"), "x").unwrap();

        let found = find_csv_files(&root, 2);
        assert_eq!(found.len(), 2);
        assert!(validate_csv_path(&found[0]).is_ok());
        assert_eq!(validate_csv_path(&root.join("notes.txt")).unwrap_err().exit_code(), 2);
        assert!(validate_csv_path(&nested).is_err());
        assert!(validate_csv_path(&root.join("missing.csv")).is_err());

        fs::remove_dir_all(&root).unwrap();
    }
}
