//! Interactive company picker for `shipdash report`.
//!
//! Kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker provides the "run `shipdash report` and choose a company" UX

use std::io::{self, BufRead, Write};

use crate::error::AppError;

/// Prompt the user on stdin/stdout to select one of `companies`.
pub fn prompt_for_company(companies: &[String]) -> Result<String, AppError> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    pick_company(companies, stdin.lock(), stdout.lock())
}

/// Behavior:
/// - list the companies
/// - accept either a number (from the list) or a name (case-insensitive)
/// - `q` cancels
pub fn pick_company<R: BufRead, W: Write>(companies: &[String], mut input: R, mut out: W) -> Result<String, AppError> {
    if companies.is_empty() {
        return Err(AppError::new(
            2,
            "No companies available. Pass one with `shipdash report -c <company>`.",
        ));
    }

    let write_err = |e: io::Error| AppError::new(2, format!("Failed to write prompt: {e}"));

    writeln!(out, "Available companies:").map_err(write_err)?;
    for (idx, name) in companies.iter().enumerate() {
        writeln!(out, "{:>3}) {name}", idx + 1).map_err(write_err)?;
    }

    loop {
        write!(out, "Select a company by number (1-{}) or name (q to quit): ", companies.len())
            .map_err(write_err)?;
        out.flush().map_err(write_err)?;

        let mut line = String::new();
        let bytes = input
            .read_line(&mut line)
            .map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;

        if bytes == 0 {
            return Err(AppError::new(
                2,
                "No input received. Pass a company with `shipdash report -c <company>`.",
            ));
        }

        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Err(AppError::new(2, "Canceled."));
        }

        if let Ok(choice) = line.parse::<usize>() {
            if (1..=companies.len()).contains(&choice) {
                return Ok(companies[choice - 1].clone());
            }
            writeln!(out, "Invalid choice: {choice}. Enter a number between 1 and {}.", companies.len())
                .map_err(write_err)?;
            continue;
        }

        if let Some(name) = companies.iter().find(|c| c.eq_ignore_ascii_case(line)) {
            return Ok(name.clone());
        }
        writeln!(out, "Unknown company: {line}").map_err(write_err)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn companies() -> Vec<String> {
        vec!["JVS".to_string(), "WOM".to_string()]
    }

    #[test]
    fn picks_by_number() {
        let mut out = Vec::new();
        let got = pick_company(&companies(), "2\n".as_bytes(), &mut out).unwrap();
        assert_eq!(got, "WOM");
        assert!(String::from_utf8(out).unwrap().contains("  1) JVS"));
    }

    #[test]
    fn retries_then_picks_by_name() {
        let mut out = Vec::new();
        let got = pick_company(&companies(), "7\nnope\njvs\n".as_bytes(), &mut out).unwrap();
        assert_eq!(got, "JVS");
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Invalid choice: 7"));
        assert!(text.contains("Unknown company: nope"));
    }

    #[test]
    fn quit_and_eof_cancel() {
        assert!(pick_company(&companies(), "q\n".as_bytes(), Vec::new()).is_err());
        assert!(pick_company(&companies(), "".as_bytes(), Vec::new()).is_err());
        assert!(pick_company(&[], "1\n".as_bytes(), Vec::new()).is_err());
    }
}
