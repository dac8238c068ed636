use std::collections::BTreeMap;

use crate::game_parse::{GameRecord, GameResult, PlayEvent, PlayerGameStats, QuarterLine, ShotKind};
use crate::metrics::DerivedMetrics;
use crate::roster::{CanonicalPlayer, Roster};

/// Keyed counter that remembers first-encounter order so ranked views can
/// break count ties deterministically.
#[derive(Debug, Clone, Default)]
pub struct CountTable {
    entries: Vec<(String, u32)>,
}

impl CountTable {
    pub fn bump(&mut self, key: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == key) {
            entry.1 += 1;
        } else {
            self.entries.push((key.to_string(), 1));
        }
    }

    pub fn get(&self, key: &str) -> u32 {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(k, count)| (k.as_str(), *count))
    }

    /// Count-descending; the stable sort keeps first-encounter order on ties.
    pub fn ranked(&self) -> Vec<(&str, u32)> {
        let mut out: Vec<(&str, u32)> = self.iter().collect();
        out.sort_by(|a, b| b.1.cmp(&a.1));
        out
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CloseGameTotals {
    pub points: u32,
    pub fgm: u32,
    pub fga: u32,
    pub plus_minus: i32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OpponentTotals {
    pub games: u32,
    pub points: u32,
    pub fgm: u32,
    pub fga: u32,
}

#[derive(Debug, Clone)]
pub struct GameLogEntry {
    pub date: String,
    pub opponent: String,
    pub result: GameResult,
    pub points: u32,
    pub rebounds: u32,
    pub assists: u32,
    pub plus_minus: i32,
    pub is_close: bool,
}

/// Cumulative season line for one roster player. Counting fields are filled
/// by [`aggregate`]; `derived` stays zeroed until the metrics pass runs.
#[derive(Debug, Clone, Default)]
pub struct SeasonStats {
    pub name: String,
    pub jersey: u8,
    pub position: String,

    /// Games with recorded minutes; a 0-minute box line appears in the game
    /// log but does not count here.
    pub games: u32,
    pub minutes: u32,
    pub points: u32,
    pub fgm: u32,
    pub fga: u32,
    pub fgm3: u32,
    pub fga3: u32,
    pub ftm: u32,
    pub fta: u32,
    pub oreb: u32,
    pub dreb: u32,
    pub assists: u32,
    pub steals: u32,
    pub blocks: u32,
    pub turnovers: u32,
    pub plus_minus: i32,
    pub paint_points: u32,
    pub fastbreak_points: u32,
    pub second_chance_points: u32,

    /// Per-quarter buckets, created on first use. Sums are not reconciled
    /// against the game totals; partial quarter feeds stay partial.
    pub quarter_totals: BTreeMap<u8, QuarterLine>,
    pub close_game: CloseGameTotals,
    pub vs_opponent: BTreeMap<String, OpponentTotals>,
    pub game_log: Vec<GameLogEntry>,

    // Play-by-play derived shot location and assist network. Attempt counts
    // come from a different source than the box score and may diverge from
    // `fga`; the divergence is kept as-is.
    pub paint_fgm: u32,
    pub paint_fga: u32,
    pub perimeter_fgm: u32,
    pub perimeter_fga: u32,
    pub assisted_fgm: u32,
    pub unassisted_fgm: u32,
    pub assisted_by: CountTable,
    pub assists_to: CountTable,

    pub derived: DerivedMetrics,
}

impl SeasonStats {
    pub fn for_player(player: &CanonicalPlayer) -> Self {
        SeasonStats {
            name: player.name.clone(),
            jersey: player.jersey,
            position: player.position.clone(),
            ..SeasonStats::default()
        }
    }

    pub fn rebounds(&self) -> u32 {
        self.oreb + self.dreb
    }

    fn fold_box_line(&mut self, game: &GameRecord, line: &PlayerGameStats) {
        if line.minutes > 0 {
            self.games += 1;
        }
        self.minutes += line.minutes;
        self.points += line.points;
        self.fgm += line.fgm;
        self.fga += line.fga;
        self.fgm3 += line.fgm3;
        self.fga3 += line.fga3;
        self.ftm += line.ftm;
        self.fta += line.fta;
        self.oreb += line.oreb;
        self.dreb += line.dreb;
        self.assists += line.assists;
        self.steals += line.steals;
        self.blocks += line.blocks;
        self.turnovers += line.turnovers;
        self.plus_minus += line.plus_minus;
        self.paint_points += line.paint_points;
        self.fastbreak_points += line.fastbreak_points;
        self.second_chance_points += line.second_chance_points;

        self.game_log.push(GameLogEntry {
            date: game.date.clone(),
            opponent: game.opponent.clone(),
            result: game.result,
            points: line.points,
            rebounds: line.rebounds(),
            assists: line.assists,
            plus_minus: line.plus_minus,
            is_close: game.is_close,
        });

        for (prd, quarter) in &line.quarters {
            let bucket = self.quarter_totals.entry(*prd).or_default();
            bucket.minutes += quarter.minutes;
            bucket.points += quarter.points;
            bucket.fgm += quarter.fgm;
            bucket.fga += quarter.fga;
        }

        if game.is_close && line.minutes > 0 {
            self.close_game.points += line.points;
            self.close_game.fgm += line.fgm;
            self.close_game.fga += line.fga;
            self.close_game.plus_minus += line.plus_minus;
        }

        let opp = self.vs_opponent.entry(game.opponent.clone()).or_default();
        opp.games += 1;
        opp.points += line.points;
        opp.fgm += line.fgm;
        opp.fga += line.fga;
    }
}

/// Fold an ordered game list into season totals for every roster player.
/// Players who never appear still get a zero-valued entry.
///
/// Pass 1 folds box lines; pass 2 folds play-by-play separately, since a
/// single shot touches two players' records and comes from an independent
/// data source.
pub fn aggregate(roster: &Roster, games: &[GameRecord]) -> BTreeMap<String, SeasonStats> {
    let mut table: BTreeMap<String, SeasonStats> = roster
        .players
        .iter()
        .map(|p| (p.name.clone(), SeasonStats::for_player(p)))
        .collect();

    for game in games {
        for line in &game.players {
            let Some(stats) = table.get_mut(&line.name) else {
                continue;
            };
            stats.fold_box_line(game, line);
        }
    }

    for game in games {
        for play in &game.plays {
            fold_play(roster, &mut table, play);
        }
    }

    table
}

fn fold_play(roster: &Roster, table: &mut BTreeMap<String, SeasonStats>, play: &PlayEvent) {
    // An unresolvable shooter drops the whole event, giver included.
    let Some(shooter) = roster.resolve_name(&play.shooter).map(str::to_string) else {
        return;
    };
    let giver = play
        .assist_by
        .as_deref()
        .map(|raw| roster.resolve_name(raw).map(str::to_string));

    let Some(stats) = table.get_mut(&shooter) else {
        return;
    };

    match play.kind {
        ShotKind::Made => {
            if play.paint {
                stats.paint_fgm += 1;
                stats.paint_fga += 1;
            } else {
                stats.perimeter_fgm += 1;
                stats.perimeter_fga += 1;
            }
            match &giver {
                Some(Some(giver_name)) => {
                    stats.assisted_fgm += 1;
                    stats.assisted_by.bump(giver_name);
                }
                Some(None) => {
                    // Assist recorded but the giver is not on the roster:
                    // the make still counts as assisted, the tables don't move.
                    stats.assisted_fgm += 1;
                }
                None => stats.unassisted_fgm += 1,
            }
        }
        ShotKind::Missed => {
            if play.paint {
                stats.paint_fga += 1;
            } else {
                stats.perimeter_fga += 1;
            }
        }
    }

    if play.kind == ShotKind::Made
        && let Some(Some(giver_name)) = giver
        && let Some(giver_stats) = table.get_mut(&giver_name)
    {
        giver_stats.assists_to.bump(&shooter);
    }
}
