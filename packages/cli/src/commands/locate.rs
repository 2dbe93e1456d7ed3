use super::resolve;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use htmled_editor::{CodeRange, Document};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct LocateArgs {
    /// Markup file
    pub file: PathBuf,

    /// 1-based line
    pub line: usize,

    /// 1-based column, in characters
    pub column: usize,
}

/// Identity, tag and range of the element under a position
fn locate_in(doc: &Document, line: usize, column: usize) -> Option<(String, String, CodeRange)> {
    let id = doc.node_at_position(line, column)?;
    let element = doc.element(id.as_str())?;
    let range = doc.node_range(id.as_str())?;
    Some((id.to_string(), element.tag_name.clone(), range))
}

pub fn locate(args: LocateArgs, cwd: &str) -> Result<()> {
    if args.line == 0 || args.column == 0 {
        return Err(anyhow!("Lines and columns start at 1"));
    }

    let path = resolve(cwd, &args.file);
    let doc = Document::load(&path)?;

    match locate_in(&doc, args.line, args.column) {
        Some((id, tag_name, range)) => {
            println!(
                "{} {} {}:{}-{}:{}",
                format!("<{}>", tag_name).cyan(),
                id.bold(),
                range.start_line,
                range.start_column,
                range.end_line,
                range.end_column
            );
        }
        None => {
            println!(
                "{} No element at {}:{}",
                "⚠️".yellow(),
                args.line,
                args.column
            );
        }
    }

    Ok(())
}
