use super::resolve;
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use htmled_core_ast::{
    assign_identities, normalize, parse_with_issues, serialize, IdGenerator, ParseIssue,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Args)]
pub struct FormatArgs {
    /// File or directory to format
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Indent nested block content
    #[arg(long)]
    pub pretty: bool,

    /// Neither assign nor emit `data-id` attributes
    #[arg(long)]
    pub strip_ids: bool,

    /// Keep whitespace-only text and redundant wrappers
    #[arg(long)]
    pub no_normalize: bool,

    /// Leave text content unescaped
    #[arg(long)]
    pub raw: bool,

    /// Rewrite files in place instead of printing
    #[arg(short, long)]
    pub write: bool,
}

/// Config with command-line flags applied on top
fn effective_config(args: &FormatArgs, cwd: &str) -> Result<Config> {
    let mut config = Config::load(cwd)?;

    if args.pretty {
        config.pretty = true;
    }
    if args.strip_ids {
        config.assign_ids = false;
        config.include_ids = false;
    }
    if args.no_normalize {
        config.normalize = false;
    }
    if args.raw {
        config.escape_text = false;
    }

    Ok(config)
}

pub fn format(args: FormatArgs, cwd: &str) -> Result<()> {
    let config = effective_config(&args, cwd)?;
    let input = resolve(cwd, &args.path);

    let files = if input.is_file() {
        vec![input.clone()]
    } else if input.is_dir() {
        find_markup_files(&input, &config)
    } else {
        return Err(anyhow!("Input path does not exist: {}", input.display()));
    };

    if files.is_empty() {
        eprintln!("{}", "⚠️  No markup files found".yellow());
        return Ok(());
    }

    let mut error_count = 0;

    for file in &files {
        let relative_path = file.strip_prefix(&input).unwrap_or(file);
        let relative_path = if relative_path.as_os_str().is_empty() {
            file.as_path()
        } else {
            relative_path
        };

        match format_file(file, &config) {
            Ok((output, issues)) => {
                if args.write {
                    fs::write(file, &output)?;
                    println!("  {} {}", "✓".green(), relative_path.display());
                } else {
                    if files.len() > 1 {
                        println!("{}", format!("── {}", relative_path.display()).dimmed());
                    }
                    println!("{}", output);
                }

                if !issues.is_empty() {
                    eprintln!(
                        "  {} {} recovered {} issue(s), see `htmled inspect`",
                        "⚠".yellow(),
                        relative_path.display(),
                        issues.len()
                    );
                }
            }
            Err(e) => {
                error_count += 1;
                eprintln!(
                    "  {} {} - {}",
                    "✗".red(),
                    relative_path.display(),
                    e.to_string().red()
                );
            }
        }
    }

    if args.write {
        println!();
        if error_count == 0 {
            println!("{} Formatted {} files", "✅".green(), files.len());
        } else {
            println!(
                "{} Formatted {} files, {} errors",
                "⚠️".yellow(),
                files.len() - error_count,
                error_count
            );
        }
    }

    Ok(())
}

fn format_file(path: &Path, config: &Config) -> Result<(String, Vec<ParseIssue>)> {
    let source = fs::read_to_string(path)?;
    debug!(path = %path.display(), bytes = source.len(), "formatting");
    Ok(format_source(&source, config))
}

/// Run the configured pipeline over one document
pub fn format_source(source: &str, config: &Config) -> (String, Vec<ParseIssue>) {
    let output = parse_with_issues(source);
    let mut root = output.root;

    if config.assign_ids {
        assign_identities(&mut root, &mut IdGenerator::new());
    }
    if config.normalize {
        normalize(&mut root);
    }

    (serialize(&root, &config.serialize_options()), output.issues)
}

fn find_markup_files(dir: &Path, config: &Config) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file() && config.matches_extension(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_source_defaults() {
        let (output, issues) =
            format_source("<div>\n  <span>Hi</span>\n</div>", &Config::default());

        assert!(issues.is_empty());
        assert_eq!(output, r#"<div data-id="node-1">Hi</div>"#);
    }

    #[test]
    fn test_format_source_without_ids_or_normalize() {
        let config = Config {
            assign_ids: false,
            include_ids: false,
            normalize: false,
            ..Config::default()
        };
        let (output, _) = format_source(r#"<p data-id="x">a &lt; b</p>"#, &config);

        assert_eq!(output, "<p>a &lt; b</p>");
    }

    #[test]
    fn test_format_source_reports_issues() {
        let (output, issues) = format_source("<div>open", &Config::default());

        assert_eq!(issues.len(), 1);
        assert_eq!(output, r#"<div data-id="node-1">open</div>"#);
    }

    #[test]
    fn test_find_markup_files_uses_extensions() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("a.html"), "<p></p>").unwrap();
        fs::write(dir.path().join("nested/b.htm"), "<p></p>").unwrap();
        fs::write(dir.path().join("c.css"), "p {}").unwrap();

        let files = find_markup_files(dir.path(), &Config::default());

        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.extension().is_some_and(|e| e != "css")));
    }
}
