use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::roster::Roster;
use crate::season::SeasonStats;

/// Column set of the flat export, in order. One row per roster player, roster
/// order, rates at one decimal. Byte-stable for a given input batch so runs
/// can be compared against golden files.
pub const FLAT_COLUMNS: &[&str] = &[
    "player",
    "jersey",
    "pos",
    "gp",
    "min",
    "pts",
    "reb",
    "ast",
    "stl",
    "blk",
    "ppg",
    "rpg",
    "apg",
    "fg_pct",
    "fg3_pct",
    "efg_pct",
    "ts_pct",
    "pts_per_40",
    "per",
    "consistency_rating",
    "consistency",
    "close_impact",
];

pub fn flat_csv(roster: &Roster, table: &BTreeMap<String, SeasonStats>) -> String {
    let mut out = String::new();
    out.push_str(&FLAT_COLUMNS.join(","));
    out.push('\n');

    for player in &roster.players {
        let Some(s) = table.get(&player.name) else {
            continue;
        };
        let d = &s.derived;
        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{},{},{},{},{:.1},{:.1},{:.1},{:.1},{:.1},{:.1},{:.1},{:.1},{:.1},{:.1},{},{}",
            s.name,
            s.jersey,
            s.position,
            s.games,
            s.minutes,
            s.points,
            s.rebounds(),
            s.assists,
            s.steals,
            s.blocks,
            d.ppg,
            d.rpg,
            d.apg,
            d.fg_pct,
            d.fg3_pct,
            d.efg_pct,
            d.ts_pct,
            d.pts_per_40,
            d.per,
            d.consistency_rating,
            d.consistency.as_str(),
            d.close_impact.as_str(),
        );
    }

    out
}

#[derive(Debug, Clone, Copy)]
pub struct WorkbookReport {
    pub players: usize,
    pub game_rows: usize,
    pub assist_rows: usize,
}

/// Multi-sheet season report: totals, per-game logs, quarter splits, and the
/// assist network ranked by connection count.
pub fn write_workbook(
    path: &Path,
    roster: &Roster,
    table: &BTreeMap<String, SeasonStats>,
) -> Result<WorkbookReport> {
    let mut season_rows = vec![vec![
        "Player".to_string(),
        "#".to_string(),
        "Pos".to_string(),
        "GP".to_string(),
        "Min".to_string(),
        "Pts".to_string(),
        "FGM".to_string(),
        "FGA".to_string(),
        "3PM".to_string(),
        "3PA".to_string(),
        "FTM".to_string(),
        "FTA".to_string(),
        "OReb".to_string(),
        "DReb".to_string(),
        "Ast".to_string(),
        "Stl".to_string(),
        "Blk".to_string(),
        "TO".to_string(),
        "+/-".to_string(),
        "Paint Pts".to_string(),
        "Fastbreak Pts".to_string(),
        "2nd Chance Pts".to_string(),
        "PPG".to_string(),
        "FG%".to_string(),
        "eFG%".to_string(),
        "TS%".to_string(),
        "PER".to_string(),
        "Consistency".to_string(),
        "Close-Game Impact".to_string(),
    ]];

    let mut log_rows = vec![vec![
        "Player".to_string(),
        "Date".to_string(),
        "Opponent".to_string(),
        "Result".to_string(),
        "Pts".to_string(),
        "Reb".to_string(),
        "Ast".to_string(),
        "+/-".to_string(),
        "Close".to_string(),
    ]];

    let mut quarter_rows = vec![vec![
        "Player".to_string(),
        "Quarter".to_string(),
        "Min".to_string(),
        "Pts".to_string(),
        "FGM".to_string(),
        "FGA".to_string(),
    ]];

    let mut assist_rows = vec![vec![
        "Passer".to_string(),
        "Scorer".to_string(),
        "Assists".to_string(),
    ]];

    for player in &roster.players {
        let Some(s) = table.get(&player.name) else {
            continue;
        };
        season_rows.push(season_row(s));

        for entry in &s.game_log {
            log_rows.push(vec![
                s.name.clone(),
                entry.date.clone(),
                entry.opponent.clone(),
                entry.result.as_str().to_string(),
                entry.points.to_string(),
                entry.rebounds.to_string(),
                entry.assists.to_string(),
                entry.plus_minus.to_string(),
                yes_no(entry.is_close),
            ]);
        }

        for (prd, quarter) in &s.quarter_totals {
            quarter_rows.push(vec![
                s.name.clone(),
                format!("Q{prd}"),
                quarter.minutes.to_string(),
                quarter.points.to_string(),
                quarter.fgm.to_string(),
                quarter.fga.to_string(),
            ]);
        }

        for (scorer, count) in s.assists_to.ranked() {
            assist_rows.push(vec![
                s.name.clone(),
                scorer.to_string(),
                count.to_string(),
            ]);
        }
    }

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Season")?;
        write_rows(sheet, &season_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("GameLog")?;
        write_rows(sheet, &log_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Quarters")?;
        write_rows(sheet, &quarter_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("AssistNetwork")?;
        write_rows(sheet, &assist_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(WorkbookReport {
        players: season_rows.len().saturating_sub(1),
        game_rows: log_rows.len().saturating_sub(1),
        assist_rows: assist_rows.len().saturating_sub(1),
    })
}

fn season_row(s: &SeasonStats) -> Vec<String> {
    let d = &s.derived;
    vec![
        s.name.clone(),
        s.jersey.to_string(),
        s.position.clone(),
        s.games.to_string(),
        s.minutes.to_string(),
        s.points.to_string(),
        s.fgm.to_string(),
        s.fga.to_string(),
        s.fgm3.to_string(),
        s.fga3.to_string(),
        s.ftm.to_string(),
        s.fta.to_string(),
        s.oreb.to_string(),
        s.dreb.to_string(),
        s.assists.to_string(),
        s.steals.to_string(),
        s.blocks.to_string(),
        s.turnovers.to_string(),
        s.plus_minus.to_string(),
        s.paint_points.to_string(),
        s.fastbreak_points.to_string(),
        s.second_chance_points.to_string(),
        format!("{:.1}", d.ppg),
        format!("{:.1}", d.fg_pct),
        format!("{:.1}", d.efg_pct),
        format!("{:.1}", d.ts_pct),
        format!("{:.1}", d.per),
        d.consistency.as_str().to_string(),
        d.close_impact.as_str().to_string(),
    ]
}

fn yes_no(value: bool) -> String {
    if value { "yes" } else { "no" }.to_string()
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet.write(row_idx as u32, col_idx as u16, value.as_str())?;
        }
    }
    Ok(())
}
