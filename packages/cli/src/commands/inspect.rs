use super::resolve;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use htmled_core_ast::format_issues;
use htmled_editor::{CodeRange, Document};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Markup file to inspect
    pub file: PathBuf,

    /// Emit the element index as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IndexEntry {
    id: String,
    tag_name: String,
    path: String,
    range: Option<CodeRange>,
}

#[derive(Debug, Serialize)]
struct Report {
    issues: Vec<String>,
    elements: Vec<IndexEntry>,
}

fn build_report(doc: &Document) -> Report {
    let elements = doc
        .index()
        .ids()
        .filter_map(|id| {
            let element = doc.element(id.as_str())?;
            Some(IndexEntry {
                id: id.to_string(),
                tag_name: element.tag_name.clone(),
                path: doc.index().path(id.as_str())?.to_string(),
                range: doc.node_range(id.as_str()),
            })
        })
        .collect();

    Report {
        issues: doc.issues().iter().map(ToString::to_string).collect(),
        elements,
    }
}

pub fn inspect(args: InspectArgs, cwd: &str) -> Result<()> {
    let path = resolve(cwd, &args.file);
    let doc = Document::load(&path)?;
    let report = build_report(&doc);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown");

    println!("🔍 {} {}", "Inspecting".green().bold(), path.display());
    println!();

    if doc.issues().is_empty() {
        println!("   {} No parse issues", "✓".green());
    } else {
        println!("   {} {}", "Recovered issues:".yellow(), doc.issues().len());
        eprint!("{}", format_issues(doc.source(), file_name, doc.issues()));
    }
    println!();

    println!("   {} {}", "Elements:".bold(), report.elements.len());
    for entry in &report.elements {
        let depth = entry.path.matches('/').count().saturating_sub(1);
        let range = entry
            .range
            .map(|r| {
                format!(
                    "{}:{}-{}:{}",
                    r.start_line, r.start_column, r.end_line, r.end_column
                )
            })
            .unwrap_or_else(|| "-".to_string());

        println!(
            "   {}{} {} {}",
            "  ".repeat(depth),
            format!("<{}>", entry.tag_name).cyan(),
            entry.id.dimmed(),
            range
        );
    }

    Ok(())
}
