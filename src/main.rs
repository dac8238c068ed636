use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use courtlog::{export, ingest, metrics, persist, roster, season};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let games_dir = parse_path_arg("--games")
        .or_else(|| path_env("COURTLOG_GAMES_DIR"))
        .unwrap_or_else(|| PathBuf::from("games"));

    let roster = roster::roster_from_env()?;
    let (games, report) = ingest::load_games(&games_dir, &roster)?;

    if games.is_empty() {
        println!("No games parsed from {}", games_dir.display());
        print_diagnostics(&report);
        return Ok(());
    }

    let mut table = season::aggregate(&roster, &games);
    metrics::attach(&mut table);

    println!(
        "Season: {} games parsed from {}",
        games.len(),
        games_dir.display()
    );
    for game in &games {
        println!(
            "  {} {} {} {}-{}{}",
            game.date,
            game.home_away.as_str(),
            game.opponent,
            game.own_score,
            game.opp_score,
            if game.is_close { " (close)" } else { "" }
        );
    }

    println!();
    println!(
        "{:<18} {:>2} {:>3} {:>5} {:>5} {:>5} {:>5} {:>6} {:>6} {:>10} {:>8}",
        "Player", "GP", "Pos", "PPG", "RPG", "APG", "FG%", "eFG%", "PER", "Consist.", "Clutch"
    );
    for player in &roster.players {
        let Some(s) = table.get(&player.name) else {
            continue;
        };
        let d = &s.derived;
        println!(
            "{:<18} {:>2} {:>3} {:>5.1} {:>5.1} {:>5.1} {:>5.1} {:>6.1} {:>6.1} {:>10} {:>8}",
            s.name,
            s.games,
            s.position,
            d.ppg,
            d.rpg,
            d.apg,
            d.fg_pct,
            d.efg_pct,
            d.per,
            d.consistency.as_str(),
            d.close_impact.as_str(),
        );
    }

    print_diagnostics(&report);

    if let Some(path) = parse_path_arg("--csv") {
        fs::write(&path, export::flat_csv(&roster, &table))
            .with_context(|| format!("write csv export {}", path.display()))?;
        println!("CSV export written to {}", path.display());
    }

    if let Some(path) = parse_path_arg("--xlsx") {
        let out = export::write_workbook(&path, &roster, &table)?;
        println!(
            "Workbook written to {} ({} players, {} game rows, {} assist links)",
            path.display(),
            out.players,
            out.game_rows,
            out.assist_rows
        );
    }

    if let Some(path) = parse_path_arg("--db") {
        let mut conn = persist::open_db(&path)?;
        let summary = persist::record_season(&mut conn, &games, &table, &report)?;
        println!(
            "DB {} updated: {} games, {} players ({} games stored total)",
            path.display(),
            summary.games_upserted,
            summary.players_upserted,
            persist::stored_game_count(&conn)?
        );
    }

    Ok(())
}

fn print_diagnostics(report: &ingest::IngestReport) {
    if !report.has_diagnostics() {
        return;
    }
    println!();
    println!("Diagnostics:");
    if report.overtime_documents > 0 {
        println!(
            "  {} document(s) had overtime periods beyond the 4-quarter model; extra periods dropped",
            report.overtime_documents
        );
    }
    for (identifier, count) in &report.dropped_identifiers {
        println!("  dropped unresolved participant {identifier} ({count}x); stats not aggregated");
    }
    for (file, reason) in &report.skipped {
        println!("  skipped {file}: {reason}");
    }
}

fn parse_path_arg(flag: &str) -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix(&prefix) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(PathBuf::from(next.trim()));
        }
    }
    None
}

fn path_env(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
}
