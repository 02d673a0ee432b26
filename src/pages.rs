//! Server-rendered HTML pages.
//!
//! Templates are compiled into the binary and rendered with handlebars from
//! small view structs. Every page carries an optional `warning`, shown as the
//! demo-mode banner.

use handlebars::{Handlebars, RenderError, TemplateError};
use serde::Serialize;
use std::collections::HashSet;

use crate::catalog::{BUSINESS_TYPES, CATEGORIES, Category, PositionOption, positions};
use crate::records::{
    BazaarEntry, BazaarFilter, BazaarStats, CompetitionResult, Participant, ParticipantFilter, ParticipantStats,
};
use crate::standings::{Medal, Standing, ranked, short_team_name};

const RECENT_RESULTS: usize = 10;
const CATEGORY_GROUPS: [&str; 3] = ["Anak-anak", "Ibu-ibu", "Bapak-bapak"];

fn medal_icon(medal: Medal) -> &'static str {
    match medal {
        Medal::Gold => "🥇",
        Medal::Silver => "🥈",
        Medal::Bronze => "🥉",
    }
}

#[derive(Debug, Serialize)]
pub struct HomeView {
    title: &'static str,
    warning: Option<String>,
    teams: Vec<String>,
    categories: &'static [Category],
    positions: Vec<PositionOption>,
}

impl HomeView {
    pub fn new(teams: &[String]) -> Self {
        HomeView {
            title: "Beranda",
            warning: None,
            teams: teams.to_vec(),
            categories: &CATEGORIES,
            positions: positions(),
        }
    }
}

#[derive(Debug, Serialize)]
struct StandingRow {
    rank: usize,
    icon: Option<&'static str>,
    team: String,
    short_name: String,
    points: i64,
    played: u32,
    gold: u32,
    silver: u32,
    bronze: u32,
}

#[derive(Debug, Serialize)]
struct TeamResultRow {
    competition: String,
    placing: String,
    points: i64,
    notes: String,
}

impl TeamResultRow {
    fn new(result: &CompetitionResult) -> Self {
        let placing = match Medal::for_position(result.position) {
            Some(medal) => medal_icon(medal).to_string(),
            None if result.position > 3 => format!("#{}", result.position),
            None => String::new(),
        };
        TeamResultRow {
            competition: result.competition.clone(),
            placing,
            points: result.points,
            notes: result.notes.clone(),
        }
    }
}

/// A team and its own results, newest first
#[derive(Debug, Serialize)]
struct TeamCard {
    rank: usize,
    team: String,
    short_name: String,
    points: i64,
    results: Vec<TeamResultRow>,
}

/// Headline counts under the table
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct LeaderboardSummary {
    /// Distinct competition names in the log
    pub competitions: usize,
    /// Results in the log
    pub results: usize,
    /// Roster teams with at least one matched result
    pub active_teams: usize,
}

#[derive(Debug, Serialize)]
struct RecentRow {
    competition: String,
    short_name: String,
    position: i64,
    points: i64,
    timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardView {
    title: &'static str,
    warning: Option<String>,
    podium: Vec<StandingRow>,
    rows: Vec<StandingRow>,
    teams: Vec<TeamCard>,
    summary: LeaderboardSummary,
    recent: Vec<RecentRow>,
}

impl LeaderboardView {
    /// Build the page from ranked standings and the result log they came from
    ///
    /// The podium lists the top three teams that scored at least one point. Team
    /// cards only show results whose team matches the standing exactly.
    pub fn new(standings: &[Standing], results: &[CompetitionResult], warning: Option<String>) -> Self {
        let row = |(rank, standing): (usize, &Standing)| StandingRow {
            rank,
            icon: Medal::for_rank(rank).map(medal_icon),
            team: standing.team.clone(),
            short_name: short_team_name(&standing.team).to_string(),
            points: standing.total_points,
            played: standing.competitions_played,
            gold: standing.gold_count,
            silver: standing.silver_count,
            bronze: standing.bronze_count,
        };

        let podium = ranked(standings)
            .take(3)
            .filter(|(_, s)| s.total_points > 0)
            .map(row)
            .collect();
        let rows = ranked(standings).map(row).collect();

        let mut latest: Vec<&CompetitionResult> = results.iter().collect();
        latest.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let teams = ranked(standings)
            .map(|(rank, standing)| TeamCard {
                rank,
                team: standing.team.clone(),
                short_name: short_team_name(&standing.team).to_string(),
                points: standing.total_points,
                results: latest
                    .iter()
                    .filter(|r| r.team == standing.team)
                    .map(|r| TeamResultRow::new(r))
                    .collect(),
            })
            .collect();

        let summary = LeaderboardSummary {
            competitions: results.iter().map(|r| r.competition.as_str()).collect::<HashSet<_>>().len(),
            results: results.len(),
            active_teams: standings.iter().filter(|s| s.competitions_played > 0).count(),
        };

        let recent = latest
            .into_iter()
            .take(RECENT_RESULTS)
            .map(|r| RecentRow {
                competition: r.competition.clone(),
                short_name: short_team_name(&r.team).to_string(),
                position: r.position,
                points: r.points,
                timestamp: r.timestamp.clone(),
            })
            .collect();

        LeaderboardView {
            title: "Klasemen",
            warning,
            podium,
            rows,
            teams,
            summary,
            recent,
        }
    }
}

#[derive(Debug, Serialize)]
struct Choice {
    name: String,
    selected: bool,
}

#[derive(Debug, Serialize)]
struct FilterView {
    q: String,
    confirmed: bool,
    pending: bool,
}

#[derive(Debug, Serialize)]
pub struct ParticipantsView {
    title: &'static str,
    warning: Option<String>,
    stats: ParticipantStats,
    filter: FilterView,
    teams: Vec<Choice>,
    categories: Vec<Choice>,
    participants: Vec<Participant>,
}

impl ParticipantsView {
    /// Stats cover every participant; the list shows only those matching `filter`
    pub fn new(all: &[Participant], filter: &ParticipantFilter, teams: &[String], warning: Option<String>) -> Self {
        let chosen = |value: &Option<String>, name: &str| value.as_deref() == Some(name);
        ParticipantsView {
            title: "Peserta",
            warning,
            stats: ParticipantStats::summarize(all),
            filter: FilterView {
                q: filter.search.clone().unwrap_or_default(),
                confirmed: chosen(&filter.status, "confirmed"),
                pending: chosen(&filter.status, "pending"),
            },
            teams: teams
                .iter()
                .map(|team| Choice {
                    name: team.clone(),
                    selected: chosen(&filter.team, team),
                })
                .collect(),
            categories: CATEGORY_GROUPS
                .iter()
                .map(|group| Choice {
                    name: group.to_string(),
                    selected: chosen(&filter.category, group),
                })
                .collect(),
            participants: filter.apply(all).into_iter().cloned().collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BazaarView {
    title: &'static str,
    warning: Option<String>,
    stats: BazaarStats,
    filter: FilterView,
    teams: Vec<Choice>,
    business_types: Vec<Choice>,
    shown: usize,
    stands: Vec<BazaarEntry>,
}

impl BazaarView {
    /// Same split as the participants page: stats over every stand, list filtered
    pub fn new(all: &[BazaarEntry], filter: &BazaarFilter, teams: &[String], warning: Option<String>) -> Self {
        let chosen = |value: &Option<String>, name: &str| value.as_deref() == Some(name);
        let stands: Vec<BazaarEntry> = filter.apply(all).into_iter().cloned().collect();
        BazaarView {
            title: "Bazaar",
            warning,
            stats: BazaarStats::summarize(all),
            filter: FilterView {
                q: filter.search.clone().unwrap_or_default(),
                confirmed: chosen(&filter.status, "confirmed"),
                pending: chosen(&filter.status, "pending"),
            },
            teams: teams
                .iter()
                .map(|team| Choice {
                    name: team.clone(),
                    selected: chosen(&filter.team, team),
                })
                .collect(),
            business_types: BUSINESS_TYPES
                .iter()
                .map(|kind| Choice {
                    name: kind.to_string(),
                    selected: chosen(&filter.business_type, kind),
                })
                .collect(),
            shown: stands.len(),
            stands,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorView {
    title: &'static str,
    warning: Option<String>,
    message: String,
    suggestions: Vec<&'static str>,
}

impl ErrorView {
    pub fn new(message: String, suggestions: Vec<&'static str>) -> Self {
        ErrorView {
            title: "Galat",
            warning: None,
            message,
            suggestions,
        }
    }
}

/// The compiled page templates
pub struct Pages {
    registry: Handlebars<'static>,
}

impl Pages {
    pub fn new() -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();
        registry.register_partial("layout_head", include_str!("./templates/layout_head.hbs"))?;
        registry.register_partial("layout_foot", include_str!("./templates/layout_foot.hbs"))?;
        registry.register_template_string("home", include_str!("./templates/home.hbs"))?;
        registry.register_template_string("leaderboard", include_str!("./templates/leaderboard.hbs"))?;
        registry.register_template_string("participants", include_str!("./templates/participants.hbs"))?;
        registry.register_template_string("bazaar", include_str!("./templates/bazaar.hbs"))?;
        registry.register_template_string("error", include_str!("./templates/error.hbs"))?;
        Ok(Pages { registry })
    }

    pub fn home(&self, view: &HomeView) -> Result<String, RenderError> {
        self.registry.render("home", view)
    }

    pub fn leaderboard(&self, view: &LeaderboardView) -> Result<String, RenderError> {
        self.registry.render("leaderboard", view)
    }

    pub fn participants(&self, view: &ParticipantsView) -> Result<String, RenderError> {
        self.registry.render("participants", view)
    }

    pub fn bazaar(&self, view: &BazaarView) -> Result<String, RenderError> {
        self.registry.render("bazaar", view)
    }

    pub fn error(&self, view: &ErrorView) -> Result<String, RenderError> {
        self.registry.render("error", view)
    }
}
