//! Minimal CLI: validate JSON documents against a Draft-04 schema.
//!
//! Exit status is zero only when the schema parses and every data file
//! validates. Valid documents are echoed to stdout, pretty-printed, unless
//! `--quiet` is given.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::Value;

use crate::schema::Document;

/// validate JSON documents against a JSON Schema (Draft-04)
#[derive(Parser, Debug)]
#[command(name = "jscheck", version)]
pub struct CommandLineInterface {
    /// JSON Schema file
    schema: PathBuf,

    /// One or more data files. May be literal paths or quoted glob patterns
    #[arg(required = true, num_args = 1..)]
    data: Vec<String>,

    /// Do not echo valid documents to stdout
    #[arg(long, short)]
    quiet: bool,
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        let doc = read_schema(&self.schema)?;

        for path in resolve_file_path_patterns(&self.data)? {
            let value = read_json(&path)?;
            if let Err(error) = doc.validate(&value) {
                bail!("validation failed for {}: {error}", path.display());
            }
            if !self.quiet {
                println!("{}", serde_json::to_string_pretty(&value)?);
            }
        }
        Ok(())
    }
}

fn read_schema(path: &Path) -> Result<Document> {
    let raw = read_json(path)?;
    Document::parse(&raw).with_context(|| format!("failed to read schema {}", path.display()))
}

fn read_json(path: &Path) -> Result<Value> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    serde_json::from_str(&source).with_context(|| format!("failed to decode {}", path.display()))
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern).context("bad glob pattern")? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                // An explicit glob that matches nothing is an error, not a no-op.
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
