use std::collections::BTreeMap;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use roxmltree::{Document, Node};

use crate::roster::{Roster, TEAM_SENTINEL};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Win,
    Loss,
}

impl GameResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameResult::Win => "W",
            GameResult::Loss => "L",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeAway {
    Home,
    Away,
}

impl HomeAway {
    pub fn as_str(&self) -> &'static str {
        match self {
            HomeAway::Home => "Home",
            HomeAway::Away => "Away",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotKind {
    Made,
    Missed,
}

/// One shot from the owning team's play-by-play. Assist markers never become
/// events of their own; they only annotate the pending made shot.
#[derive(Debug, Clone)]
pub struct PlayEvent {
    pub kind: ShotKind,
    /// Raw shooter identifier; resolved against the roster at aggregation.
    pub shooter: String,
    pub paint: bool,
    pub assist_by: Option<String>,
}

/// Minutes/points/field-goal line for a single quarter. Doubles as the
/// cumulative per-quarter bucket in season totals.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuarterLine {
    pub minutes: u32,
    pub points: u32,
    pub fgm: u32,
    pub fga: u32,
}

#[derive(Debug, Clone, Default)]
pub struct PlayerGameStats {
    /// Canonical display name from the roster.
    pub name: String,
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
    /// Quarter sub-lines (1-4), present only for quarters the feed reported.
    pub quarters: BTreeMap<u8, QuarterLine>,
}

impl PlayerGameStats {
    pub fn rebounds(&self) -> u32 {
        self.oreb + self.dreb
    }
}

/// Canonical record of one game, immutable once parsed.
#[derive(Debug, Clone)]
pub struct GameRecord {
    pub date: String,
    /// Parsed game date used for chronological ordering; None when the venue
    /// date string is unreadable.
    pub day: Option<NaiveDate>,
    pub opponent: String,
    pub home_away: HomeAway,
    pub own_score: u32,
    pub opp_score: u32,
    pub own_quarters: [u32; 4],
    pub opp_quarters: [u32; 4],
    pub result: GameResult,
    pub is_close: bool,
    pub players: Vec<PlayerGameStats>,
    pub plays: Vec<PlayEvent>,
}

/// Parse result plus the per-document diagnostics the batch layer reports.
#[derive(Debug, Clone)]
pub struct ParsedGame {
    pub record: GameRecord,
    /// Participant identifiers that resolved to no roster player and were
    /// dropped (the team-aggregate sentinel is expected and not listed).
    pub dropped_identifiers: Vec<String>,
    /// Score-line tokens beyond the fourth quarter, discarded by the
    /// fixed-width quarter model. Overtime data is lost when this is nonzero.
    pub truncated_periods: usize,
}

const MARGIN_CLOSE: u32 = 5;

/// Parse one game document. Fails only on structural problems (missing venue
/// anchor or owning-team section); everything else degrades to defaults so a
/// sparse feed still yields a record.
pub fn parse_game(xml: &str, roster: &Roster) -> Result<ParsedGame> {
    let doc = Document::parse(xml).context("invalid game xml")?;
    let root = doc.root_element();

    let venue = child_element(root, "venue").ok_or_else(|| anyhow!("missing venue element"))?;
    let own_team = root
        .children()
        .find(|n| n.has_tag_name("team") && n.attribute("id") == Some(roster.team_id.as_str()))
        .ok_or_else(|| anyhow!("missing team section for {}", roster.team_id))?;
    let opp_team = root
        .children()
        .find(|n| n.has_tag_name("team") && n.attribute("id") != Some(roster.team_id.as_str()));

    let date = venue.attribute("date").unwrap_or_default().to_string();
    let home = venue.attribute("homeid") == Some(roster.team_id.as_str());
    let opponent = if home {
        venue.attribute("visname").unwrap_or_default().to_string()
    } else {
        venue.attribute("homename").unwrap_or_default().to_string()
    };

    let (own_score, own_quarters, truncated_periods) = read_linescore(own_team);
    let (opp_score, opp_quarters, _) = opp_team.map(read_linescore).unwrap_or_default();

    // Tie counts as a loss; a tie is also trivially close.
    let result = if own_score > opp_score {
        GameResult::Win
    } else {
        GameResult::Loss
    };
    let is_close = own_score.abs_diff(opp_score) <= MARGIN_CLOSE;

    let mut players = Vec::new();
    let mut dropped_identifiers = Vec::new();
    for node in own_team.children().filter(|n| n.has_tag_name("player")) {
        let raw = node.attribute("checkname").unwrap_or_default().trim();
        if raw.is_empty() || raw == TEAM_SENTINEL {
            continue;
        }
        let Some(player) = roster.resolve(raw) else {
            dropped_identifiers.push(raw.to_string());
            continue;
        };
        let Some(stats) = child_element(node, "stats") else {
            continue;
        };
        players.push(read_player_stats(&player.name, node, stats));
    }

    let plays = root
        .children()
        .find(|n| n.has_tag_name("plays"))
        .map(|plays| resolve_plays(plays, &roster.team_id))
        .unwrap_or_default();

    Ok(ParsedGame {
        record: GameRecord {
            date: date.clone(),
            day: parse_game_date(&date),
            opponent,
            home_away: if home { HomeAway::Home } else { HomeAway::Away },
            own_score,
            opp_score,
            own_quarters,
            opp_quarters,
            result,
            is_close,
            players,
            plays,
        },
        dropped_identifiers,
        truncated_periods,
    })
}

fn read_linescore(team: Node) -> (u32, [u32; 4], usize) {
    let Some(linescore) = child_element(team, "linescore") else {
        return (0, [0; 4], 0);
    };
    let score = attr_count(linescore, "score");
    let (quarters, truncated) = parse_quarter_line(linescore.attribute("line").unwrap_or_default());
    (score, quarters, truncated)
}

/// First four comma-separated tokens become the quarter scores; missing
/// tokens default to 0 and anything past the fourth is counted as truncated.
fn parse_quarter_line(raw: &str) -> ([u32; 4], usize) {
    let mut quarters = [0u32; 4];
    let mut truncated = 0;
    for (idx, token) in raw.split(',').enumerate() {
        if idx < 4 {
            quarters[idx] = parse_count(token);
        } else if !token.trim().is_empty() {
            truncated += 1;
        }
    }
    (quarters, truncated)
}

fn read_player_stats(name: &str, player: Node, stats: Node) -> PlayerGameStats {
    let mut out = PlayerGameStats {
        name: name.to_string(),
        minutes: attr_count(stats, "min"),
        points: attr_count(stats, "tp"),
        fgm: attr_count(stats, "fgm"),
        fga: attr_count(stats, "fga"),
        fgm3: attr_count(stats, "fgm3"),
        fga3: attr_count(stats, "fga3"),
        ftm: attr_count(stats, "ftm"),
        fta: attr_count(stats, "fta"),
        oreb: attr_count(stats, "oreb"),
        dreb: attr_count(stats, "dreb"),
        assists: attr_count(stats, "ast"),
        steals: attr_count(stats, "stl"),
        blocks: attr_count(stats, "blk"),
        turnovers: attr_count(stats, "to"),
        plus_minus: attr_signed(stats, "plusminus"),
        paint_points: attr_count(stats, "pts_paint"),
        fastbreak_points: attr_count(stats, "pts_fastb"),
        second_chance_points: attr_count(stats, "pts_ch2"),
        quarters: BTreeMap::new(),
    };

    // Quarters are looked up independently; absent quarters stay absent
    // rather than being zero-filled.
    for prd in 1..=4u8 {
        let Some(node) = player.children().find(|n| {
            n.has_tag_name("statsbyprd") && n.attribute("prd") == Some(prd.to_string().as_str())
        }) else {
            continue;
        };
        out.quarters.insert(
            prd,
            QuarterLine {
                minutes: attr_count(node, "min"),
                points: attr_count(node, "tp"),
                fgm: attr_count(node, "fgm"),
                fga: attr_count(node, "fga"),
            },
        );
    }

    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssistState {
    AwaitingShot,
    ShotPendingAssist,
}

/// Two-state resolver over the owning team's ordered play-by-play. A made
/// shot leaves an assist slot open; the next event either fills it (assist
/// marker) or closes it (anything else). Markers with no eligible shot are
/// discarded. Only made/missed shots are materialized.
fn resolve_plays(plays: Node, team_id: &str) -> Vec<PlayEvent> {
    let mut out: Vec<PlayEvent> = Vec::new();
    let mut state = AssistState::AwaitingShot;

    for play in plays.children().filter(|n| n.has_tag_name("play")) {
        if play.attribute("team") != Some(team_id) {
            continue;
        }
        let shooter = play.attribute("checkname").unwrap_or_default().to_string();
        let paint = play.attribute("paint") == Some("Y");

        match play.attribute("action").unwrap_or_default() {
            "GOOD" => {
                out.push(PlayEvent {
                    kind: ShotKind::Made,
                    shooter,
                    paint,
                    assist_by: None,
                });
                state = AssistState::ShotPendingAssist;
            }
            "MISS" => {
                out.push(PlayEvent {
                    kind: ShotKind::Missed,
                    shooter,
                    paint,
                    assist_by: None,
                });
                state = AssistState::AwaitingShot;
            }
            "ASSIST" => {
                if state == AssistState::ShotPendingAssist {
                    // The pending slot is always the just-emitted made shot.
                    if let Some(last) = out.last_mut() {
                        last.assist_by = Some(shooter);
                    }
                }
                state = AssistState::AwaitingShot;
            }
            _ => {
                // Rebounds, turnovers, subs, etc. close the assist window.
                state = AssistState::AwaitingShot;
            }
        }
    }

    out
}

fn parse_game_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    for format in ["%m/%d/%Y", "%m/%d/%y", "%Y-%m-%d"] {
        if let Ok(day) = NaiveDate::parse_from_str(raw, format) {
            return Some(day);
        }
    }
    None
}

fn child_element<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(tag))
}

fn attr_count(node: Node, name: &str) -> u32 {
    node.attribute(name).map(parse_count).unwrap_or(0)
}

fn attr_signed(node: Node, name: &str) -> i32 {
    node.attribute(name)
        .and_then(|raw| raw.trim().parse::<i32>().ok())
        .unwrap_or(0)
}

fn parse_count(raw: &str) -> u32 {
    raw.trim().parse::<u32>().unwrap_or(0)
}
