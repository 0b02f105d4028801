use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use sdd_core::sync::SpecParser;
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum SpecSubcommand {
    /// List specs with their requirement counts
    List,

    /// Show the requirements extracted from one spec
    Show {
        /// Spec id (directory name under .sdd/specs)
        id: String,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: SpecSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        SpecSubcommand::List => list(root, json),
        SpecSubcommand::Show { id } => show(root, &id, json),
    }
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let specs = SpecParser::new(root).parse_all_specs();

    if json {
        let items: Vec<_> = specs
            .iter()
            .map(|s| {
                serde_json::json!({
                    "id": s.id,
                    "title": s.title,
                    "requirementCount": s.requirements.len(),
                })
            })
            .collect();
        print_json(&items)?;
        return Ok(());
    }

    if specs.is_empty() {
        println!("No specs found under .sdd/specs.");
        return Ok(());
    }

    let rows = specs
        .iter()
        .map(|s| {
            vec![
                s.id.clone(),
                s.title.clone().unwrap_or_default(),
                s.requirements.len().to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "TITLE", "REQUIREMENTS"], rows);
    Ok(())
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let spec = SpecParser::new(root)
        .parse_spec(id)
        .context("failed to load spec")?;

    if json {
        print_json(&spec)?;
        return Ok(());
    }

    match &spec.title {
        Some(title) => println!("{}: {}", spec.id, title),
        None => println!("{}", spec.id),
    }

    if spec.requirements.is_empty() {
        println!("No requirements found.");
        return Ok(());
    }

    println!();
    let rows = spec
        .requirements
        .iter()
        .map(|r| {
            vec![
                r.id.clone(),
                r.keyword.map(|k| k.to_string()).unwrap_or_default(),
                r.line.to_string(),
                r.title.clone().unwrap_or_default(),
            ]
        })
        .collect();
    print_table(&["ID", "KEYWORD", "LINE", "TITLE"], rows);
    Ok(())
}
