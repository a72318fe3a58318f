//! The process boundary every unit honours: read the payload from a file or
//! stdin, write the result to a file or stdout, exit non-zero on failure.
//!
//! `sluice unit <name>` is the entrypoint baked into each unit image.

use anyhow::{Context, Result};
use std::io::{self, Read, Write};
use std::path::PathBuf;

use super::{UnitName, UnitParams};

/// One run of a unit from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitInvocation {
    pub unit: UnitName,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub params: UnitParams,
}

/// Interpret a positional sentence count. Bad values fall back to the default.
pub fn parse_sentences(raw: Option<&str>) -> Option<usize> {
    let raw = raw?;
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            tracing::warn!(
                "invalid number of sentences '{}', using default of {}",
                raw,
                crate::consts::DEFAULT_SUMMARY_SENTENCES
            );
            None
        }
    }
}

pub fn run(invocation: &UnitInvocation) -> Result<()> {
    let text = match &invocation.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("error reading input file {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("error reading stdin")?;
            buf
        }
    };

    let result = super::apply(invocation.unit, &text, &invocation.params)?;

    match &invocation.output {
        Some(path) => std::fs::write(path, &result)
            .with_context(|| format!("error writing output file {}", path.display()))?,
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", result).context("error writing stdout")?;
            stdout.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_sentences_accepts_positive_integers() {
        assert_eq!(parse_sentences(Some("5")), Some(5));
        assert_eq!(parse_sentences(Some(" 2 ")), Some(2));
    }

    #[test]
    fn parse_sentences_rejects_garbage() {
        assert_eq!(parse_sentences(Some("five")), None);
        assert_eq!(parse_sentences(Some("0")), None);
        assert_eq!(parse_sentences(Some("-1")), None);
    }

    #[test]
    fn parse_sentences_absent() {
        assert_eq!(parse_sentences(None), None);
    }

    #[test]
    fn file_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.txt");
        let output = dir.path().join("output.txt");
        std::fs::write(&input, "Hello,   World!").unwrap();

        run(&UnitInvocation {
            unit: UnitName::DataCleaning,
            input: Some(input),
            output: Some(output.clone()),
            params: UnitParams::default(),
        })
        .unwrap();

        assert_eq!(std::fs::read_to_string(output).unwrap(), "hello world");
    }

    #[test]
    fn missing_input_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(&UnitInvocation {
            unit: UnitName::DataCleaning,
            input: Some(dir.path().join("nope.txt")),
            output: Some(dir.path().join("out.txt")),
            params: UnitParams::default(),
        })
        .unwrap_err();
        assert!(err.to_string().contains("error reading input file"));
    }
}
