use std::path::PathBuf;

use anyhow::{Context, Result};

use quiniela_terminal::config::Config;
use quiniela_terminal::persist;

const DEFAULT_LIMIT: usize = 20;

fn main() -> Result<()> {
    let cfg = Config::from_env();
    let db_path = parse_db_path_arg().unwrap_or(cfg.db_path);
    let limit = parse_limit_arg().unwrap_or(DEFAULT_LIMIT);

    if !db_path.exists() {
        println!("No submissions yet ({} does not exist)", db_path.display());
        return Ok(());
    }

    let conn = persist::open_db(&db_path)?;
    let rows = persist::list_submissions(&conn, limit)
        .with_context(|| format!("list submissions from {}", db_path.display()))?;

    println!("DB: {}", db_path.display());
    println!("Submissions: {}", rows.len());
    for row in rows {
        println!();
        println!(
            "#{} {} | {} | {} | mode={}",
            row.id, row.created_at, row.name, row.phone, row.mode
        );
        for line in row.summary.lines() {
            println!("  {line}");
        }
        match row.predictions() {
            Ok(stored) => {
                let picks: usize = stored
                    .predictions
                    .iter()
                    .flat_map(|entry| entry.values())
                    .map(|sel| sel.values().len())
                    .sum();
                println!(
                    "  {} sheet(s), {picks} pick(s), {} selection",
                    stored.predictions.len(),
                    stored.mode.label()
                );
            }
            Err(err) => println!("  [WARN] {err:#}"),
        }
    }
    Ok(())
}

fn parse_db_path_arg() -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix("--db=") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == "--db" {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(PathBuf::from(next));
            }
        }
    }
    None
}

fn parse_limit_arg() -> Option<usize> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        let raw = if let Some(val) = arg.strip_prefix("--limit=") {
            Some(val)
        } else if arg == "--limit" {
            args.get(idx + 1).map(String::as_str)
        } else {
            None
        };
        if let Some(limit) = raw.and_then(|val| val.trim().parse::<usize>().ok()) {
            return Some(limit.max(1));
        }
    }
    None
}
