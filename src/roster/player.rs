// Domain player snapshot and per-team grouping.

use serde::{Deserialize, Serialize};

/// Team affiliation used for players the backend left unassigned.
pub const UNASSIGNED_TEAM: &str = "Unassigned";

/// Roster category a player belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// The wire representation used by the players endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    /// Parse the wire representation, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// A player in the builder pool. Fetched once per session and immutable
/// within it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    /// Never empty: the loader substitutes [`UNASSIGNED_TEAM`].
    pub team: String,
    pub gender: Gender,
    /// Slot display name (e.g. "Men"), used as the role label.
    pub role: String,
    pub points: f64,
    pub price: f64,
    pub image_url: Option<String>,
    /// Advisory popularity flag; never consulted by selection rules.
    pub is_hot: bool,
}

/// Players of one team affiliation, in pool order.
#[derive(Debug, Clone)]
pub struct TeamGroup<'a> {
    pub name: &'a str,
    pub players: Vec<&'a Player>,
}

/// Group the players of one gender by team affiliation, teams ordered by
/// first appearance in the pool and players kept in pool order within each
/// team.
pub fn group_by_team(players: &[Player], gender: Gender) -> Vec<TeamGroup<'_>> {
    let mut groups: Vec<TeamGroup<'_>> = Vec::new();
    for player in players.iter().filter(|p| p.gender == gender) {
        match groups.iter_mut().find(|g| g.name == player.team) {
            Some(group) => group.players.push(player),
            None => groups.push(TeamGroup {
                name: &player.team,
                players: vec![player],
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: &str, team: &str, gender: Gender) -> Player {
        Player {
            id: id.to_string(),
            name: format!("Player {id}"),
            team: team.to_string(),
            gender,
            role: match gender {
                Gender::Male => "Men".to_string(),
                Gender::Female => "Women".to_string(),
            },
            points: 0.0,
            price: 0.0,
            image_url: None,
            is_hot: false,
        }
    }

    #[test]
    fn gender_parse_is_case_insensitive() {
        assert_eq!(Gender::parse("male"), Some(Gender::Male));
        assert_eq!(Gender::parse("FEMALE"), Some(Gender::Female));
        assert_eq!(Gender::parse(" Male "), Some(Gender::Male));
        assert_eq!(Gender::parse("other"), None);
        assert_eq!(Gender::parse(""), None);
    }

    #[test]
    fn gender_serde_uses_lowercase() {
        assert_eq!(serde_json::to_string(&Gender::Male).unwrap(), r#""male""#);
        let g: Gender = serde_json::from_str(r#""female""#).unwrap();
        assert_eq!(g, Gender::Female);
    }

    #[test]
    fn group_by_team_first_appearance_order() {
        let pool = vec![
            player("m1", "Beta", Gender::Male),
            player("m2", "Alpha", Gender::Male),
            player("m3", "Beta", Gender::Male),
            player("w1", "Alpha", Gender::Female),
            player("m4", "Gamma", Gender::Male),
        ];
        let groups = group_by_team(&pool, Gender::Male);
        let names: Vec<&str> = groups.iter().map(|g| g.name).collect();
        assert_eq!(names, vec!["Beta", "Alpha", "Gamma"]);
        assert_eq!(groups[0].players.len(), 2);
        assert_eq!(groups[0].players[0].id, "m1");
        assert_eq!(groups[0].players[1].id, "m3");
    }

    #[test]
    fn group_by_team_filters_other_gender() {
        let pool = vec![
            player("m1", "Alpha", Gender::Male),
            player("w1", "Alpha", Gender::Female),
        ];
        let groups = group_by_team(&pool, Gender::Female);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].players.len(), 1);
        assert_eq!(groups[0].players[0].id, "w1");
    }

    #[test]
    fn group_by_team_empty_pool() {
        let groups = group_by_team(&[], Gender::Male);
        assert!(groups.is_empty());
    }
}
