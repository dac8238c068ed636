use std::collections::BTreeMap;

use crate::season::SeasonStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Consistency {
    Reliable,
    Streaky,
    BoomBust,
    /// Fewer than two logged games; the 100 rating next to this is a
    /// sentinel, not a genuine perfect score.
    #[default]
    NotApplicable,
}

impl Consistency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Consistency::Reliable => "Reliable",
            Consistency::Streaky => "Streaky",
            Consistency::BoomBust => "Boom-Bust",
            Consistency::NotApplicable => "N/A",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CloseImpact {
    Elite,
    Strong,
    Good,
    /// Zero and negative close-game plus-minus alike.
    #[default]
    Average,
}

impl CloseImpact {
    pub fn as_str(&self) -> &'static str {
        match self {
            CloseImpact::Elite => "Elite",
            CloseImpact::Strong => "Strong",
            CloseImpact::Good => "Good",
            CloseImpact::Average => "Average",
        }
    }
}

/// Rates and classifications derived from the counting totals. Recomputing
/// from the same totals always yields the same values, so the pass is
/// idempotent by construction.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DerivedMetrics {
    pub mpg: f64,
    pub ppg: f64,
    pub rpg: f64,
    pub apg: f64,
    pub spg: f64,
    pub bpg: f64,
    pub fg_pct: f64,
    pub fg3_pct: f64,
    pub efg_pct: f64,
    pub ts_pct: f64,
    pub pts_per_40: f64,
    pub per: f64,
    pub paint_fg_pct: f64,
    pub perimeter_fg_pct: f64,
    pub assisted_fg_pct: f64,
    pub scoring_std_dev: f64,
    pub consistency_rating: f64,
    pub consistency: Consistency,
    pub close_impact: CloseImpact,
}

/// Attach derived metrics to every entry. Counting totals are never touched.
pub fn attach(table: &mut BTreeMap<String, SeasonStats>) {
    for stats in table.values_mut() {
        stats.derived = derive(stats);
    }
}

fn derive(s: &SeasonStats) -> DerivedMetrics {
    let mut d = DerivedMetrics {
        mpg: per_game(s.minutes, s.games),
        ppg: per_game(s.points, s.games),
        rpg: per_game(s.rebounds(), s.games),
        apg: per_game(s.assists, s.games),
        spg: per_game(s.steals, s.games),
        bpg: per_game(s.blocks, s.games),
        fg_pct: pct(s.fgm as f64, s.fga as f64),
        fg3_pct: pct(s.fgm3 as f64, s.fga3 as f64),
        efg_pct: pct(s.fgm as f64 + 0.5 * s.fgm3 as f64, s.fga as f64),
        ts_pct: pct(s.points as f64, 2.0 * (s.fga as f64 + 0.44 * s.fta as f64)),
        paint_fg_pct: pct(s.paint_fgm as f64, s.paint_fga as f64),
        perimeter_fg_pct: pct(s.perimeter_fgm as f64, s.perimeter_fga as f64),
        assisted_fg_pct: pct(s.assisted_fgm as f64, s.fgm as f64),
        ..DerivedMetrics::default()
    };

    if s.minutes > 0 {
        let factor = 40.0 / s.minutes as f64;
        d.pts_per_40 = round1(s.points as f64 * factor);
        // Linear efficiency composite on a 40-minute basis.
        let missed_fg = s.fga as f64 - s.fgm as f64;
        let missed_ft = s.fta as f64 - s.ftm as f64;
        let raw = s.points as f64 + s.assists as f64 + s.rebounds() as f64 + s.steals as f64
            + s.blocks as f64
            - missed_fg
            - missed_ft
            - s.turnovers as f64;
        d.per = round1(raw * factor);
    }

    attach_consistency(s, &mut d);

    d.close_impact = if s.close_game.plus_minus > 20 {
        CloseImpact::Elite
    } else if s.close_game.plus_minus > 10 {
        CloseImpact::Strong
    } else if s.close_game.plus_minus > 0 {
        CloseImpact::Good
    } else {
        CloseImpact::Average
    };

    d
}

fn attach_consistency(s: &SeasonStats, d: &mut DerivedMetrics) {
    if s.game_log.len() < 2 {
        // One game (or none) says nothing about volatility.
        d.consistency_rating = 100.0;
        d.consistency = Consistency::NotApplicable;
        return;
    }

    let n = s.game_log.len() as f64;
    let mean = s.game_log.iter().map(|g| g.points as f64).sum::<f64>() / n;
    let variance = s
        .game_log
        .iter()
        .map(|g| {
            let delta = g.points as f64 - mean;
            delta * delta
        })
        .sum::<f64>()
        / n;
    d.scoring_std_dev = round2(variance.sqrt());

    if mean > 0.0 {
        let cv = d.scoring_std_dev / mean;
        d.consistency_rating = round1(100.0 - cv * 50.0).clamp(0.0, 100.0);
    } else {
        d.consistency_rating = 0.0;
    }

    d.consistency = if d.consistency_rating >= 75.0 {
        Consistency::Reliable
    } else if d.consistency_rating >= 50.0 {
        Consistency::Streaky
    } else {
        Consistency::BoomBust
    };
}

fn per_game(total: u32, games: u32) -> f64 {
    if games == 0 {
        return 0.0;
    }
    round1(total as f64 / games as f64)
}

/// Ratio rounded at three fractional digits, then scaled to a display
/// percentage. Zero attempts yield 0, never NaN.
fn pct(made: f64, attempts: f64) -> f64 {
    if attempts <= 0.0 {
        return 0.0;
    }
    round3(made / attempts) * 100.0
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}
