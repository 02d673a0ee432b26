use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::records::CompetitionResult;

/// Aggregated rank-relevant statistics for one roster team
///
/// Standings are derived from the result log on every call to
/// [`compute_standings`] and are never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    /// Team name exactly as it appears in the roster
    pub team: String,

    /// Sum of the points of every matched result, saturating at the `i64` bounds
    pub total_points: i64,

    /// Number of matched results
    pub competitions_played: u32,

    /// Results with position 1
    pub gold_count: u32,

    /// Results with position 2
    pub silver_count: u32,

    /// Results with position 3
    pub bronze_count: u32,
}

impl Standing {
    pub fn new(team: &str) -> Self {
        Standing {
            team: team.to_string(),
            total_points: 0,
            competitions_played: 0,
            gold_count: 0,
            silver_count: 0,
            bronze_count: 0,
        }
    }

    fn record(&mut self, result: &CompetitionResult) {
        self.total_points = self.total_points.saturating_add(result.points);
        self.competitions_played = self.competitions_played.saturating_add(1);
        match Medal::for_position(result.position) {
            Some(Medal::Gold) => self.gold_count += 1,
            Some(Medal::Silver) => self.silver_count += 1,
            Some(Medal::Bronze) => self.bronze_count += 1,
            None => {}
        }
    }

    /// Total number of podium finishes
    pub fn medal_count(&self) -> u32 {
        self.gold_count + self.silver_count + self.bronze_count
    }
}

/// Podium placing, shared by result positions and table ranks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
}

impl Medal {
    pub fn for_position(position: i64) -> Option<Self> {
        match position {
            1 => Some(Medal::Gold),
            2 => Some(Medal::Silver),
            3 => Some(Medal::Bronze),
            _ => None,
        }
    }

    pub fn for_rank(rank: usize) -> Option<Self> {
        Self::for_position(rank as i64)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Medal::Gold => "gold",
            Medal::Silver => "silver",
            Medal::Bronze => "bronze",
        }
    }
}

/// Order two standings: points, then gold, silver and bronze counts, all descending
///
/// Returns `Ordering::Equal` on a full tie so that a stable sort keeps roster order.
pub fn compare_standings(a: &Standing, b: &Standing) -> Ordering {
    b.total_points
        .cmp(&a.total_points)
        .then_with(|| b.gold_count.cmp(&a.gold_count))
        .then_with(|| b.silver_count.cmp(&a.silver_count))
        .then_with(|| b.bronze_count.cmp(&a.bronze_count))
}

/// Compute the ranked standings of a roster from a result log
///
/// Every roster team gets exactly one standing, even with no results. A result
/// counts for a team only when its `team` field equals the roster name
/// byte-for-byte (no trimming, case-sensitive); results naming any other team
/// are dropped. The `points` field is trusted verbatim.
///
/// # Arguments
/// * `roster` - Ordered team names; ties in the output keep this order
/// * `results` - The result log snapshot
///
/// # Returns
/// * `Vec<Standing>` - Standings best first; rank is the 1-based index
///
/// # Examples
/// ```
/// use gumbira::records::CompetitionResult;
/// use gumbira::standings::compute_standings;
///
/// let roster = ["Boulevard", "Cendana"];
/// let results = vec![CompetitionResult::scored("Tenis Meja", "Cendana", 1, 5)];
/// let table = compute_standings(&roster, &results);
/// assert_eq!(table[0].team, "Cendana");
/// assert_eq!(table[1].total_points, 0);
/// ```
pub fn compute_standings<T: AsRef<str>>(roster: &[T], results: &[CompetitionResult]) -> Vec<Standing> {
    let mut standings: Vec<Standing> = roster.iter().map(|team| Standing::new(team.as_ref())).collect();

    // A roster name may in principle be listed twice; each entry then sees the same results.
    let mut slots: HashMap<&str, Vec<usize>> = HashMap::with_capacity(roster.len());
    for (index, team) in roster.iter().enumerate() {
        slots.entry(team.as_ref()).or_default().push(index);
    }

    for result in results {
        if let Some(indices) = slots.get(result.team.as_str()) {
            for &index in indices {
                standings[index].record(result);
            }
        }
    }

    // sort_by is stable
    standings.sort_by(compare_standings);
    standings
}

/// Pair each standing with its 1-based rank
pub fn ranked(standings: &[Standing]) -> impl Iterator<Item = (usize, &Standing)> {
    standings.iter().enumerate().map(|(index, standing)| (index + 1, standing))
}

/// Compact display name: everything before the first space
///
/// `"Boulevard (Soedirman)"` becomes `"Boulevard"`; a name without spaces is returned whole.
pub fn short_team_name(team: &str) -> &str {
    team.split(' ').next().unwrap_or(team)
}
