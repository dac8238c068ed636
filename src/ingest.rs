use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::game_parse::{self, GameRecord};
use crate::roster::Roster;

/// What the batch kept and what it dropped. A malformed document never fails
/// the batch; it lands here instead.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub parsed: usize,
    /// (file name, reason) for documents that yielded no record.
    pub skipped: Vec<(String, String)>,
    /// Unresolved participant identifiers and how often each was dropped.
    /// Their stats are missing from the season totals; no reconciliation
    /// against team totals is attempted.
    pub dropped_identifiers: BTreeMap<String, u32>,
    /// Documents whose score line carried periods past the fourth quarter.
    /// The extra periods are discarded by the fixed-width quarter model.
    pub overtime_documents: usize,
}

impl IngestReport {
    pub fn has_diagnostics(&self) -> bool {
        !self.skipped.is_empty() || !self.dropped_identifiers.is_empty() || self.overtime_documents > 0
    }
}

/// Parse every `*.xml` document under `dir` and return the records in
/// chronological order. Per-document parsing is independent, so the batch is
/// parsed in parallel and re-sorted afterwards; game-log ordering depends on
/// this sort, not on fold order. Zero valid documents is an empty batch, not
/// an error.
pub fn load_games(dir: &Path, roster: &Roster) -> Result<(Vec<GameRecord>, IngestReport)> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("read games directory {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
        })
        .collect();
    paths.sort();

    let outcomes: Vec<(PathBuf, Result<game_parse::ParsedGame>)> = paths
        .par_iter()
        .map(|path| (path.clone(), parse_game_file(path, roster)))
        .collect();

    let mut games = Vec::new();
    let mut report = IngestReport::default();
    for (path, outcome) in outcomes {
        let file = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        match outcome {
            Ok(parsed) => {
                debug!(file = %file, opponent = %parsed.record.opponent, "parsed game document");
                if parsed.truncated_periods > 0 {
                    warn!(
                        file = %file,
                        periods = parsed.truncated_periods,
                        "score line carried overtime periods; quarter model keeps the first four"
                    );
                    report.overtime_documents += 1;
                }
                for raw in parsed.dropped_identifiers {
                    warn!(file = %file, identifier = %raw, "dropped unresolved participant");
                    *report.dropped_identifiers.entry(raw).or_insert(0) += 1;
                }
                report.parsed += 1;
                games.push(parsed.record);
            }
            Err(err) => {
                warn!(file = %file, error = %err, "skipping unparseable game document");
                report.skipped.push((file, format!("{err:#}")));
            }
        }
    }

    // Stable sort: undated records keep their (file-name) input order, after
    // every dated one.
    games.sort_by_key(|game| (game.day.is_none(), game.day));

    Ok((games, report))
}

pub fn parse_game_file(path: &Path, roster: &Roster) -> Result<game_parse::ParsedGame> {
    let xml = fs::read_to_string(path)
        .with_context(|| format!("read game document {}", path.display()))?;
    game_parse::parse_game(&xml, roster)
}
