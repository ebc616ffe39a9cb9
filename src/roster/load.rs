// Roster pool loading.
//
// The primary load (slots + both gender player lists) is all-or-nothing:
// a missing designated slot or an invalid gender tag is a data-integrity
// error and yields no partial pool. The hot-ids fetch that follows is
// advisory and its failure is absorbed.

use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, info};

use crate::api::types::{ApiPlayer, ApiSlot};
use crate::api::{ApiError, ContestApi};
use crate::roster::player::{Gender, Player, UNASSIGNED_TEAM};

/// Slot code designating the men's player pool.
pub const MEN_SLOT_CODE: &str = "MEN";
/// Slot code designating the women's player pool.
pub const WOMEN_SLOT_CODE: &str = "WOMEN";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("slot with code `{code}` not found; configure slots in the admin panel")]
    MissingSlot { code: String },

    #[error("players missing or mismatching gender: {}", names.join(", "))]
    InvalidGender { names: Vec<String> },

    #[error(transparent)]
    Api(#[from] ApiError),
}

// ---------------------------------------------------------------------------
// Pool
// ---------------------------------------------------------------------------

/// The loaded player pool for one builder session.
#[derive(Debug, Clone)]
pub struct RosterPool {
    pub men_slot: ApiSlot,
    pub women_slot: ApiSlot,
    /// Men first, then women, each in backend order.
    pub players: Vec<Player>,
}

impl RosterPool {
    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn of_gender(&self, gender: Gender) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(move |p| p.gender == gender)
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load the full roster pool for a builder session.
///
/// Fetches the slot list, requires the MEN and WOMEN slots, fetches both
/// gender player lists concurrently, validates gender tags, and finally
/// decorates the pool with best-effort hot-player flags.
pub async fn load_roster<A: ContestApi>(
    api: &A,
    contest_id: Option<&str>,
) -> Result<RosterPool, LoadError> {
    let slots = api.fetch_slots().await?;
    let men_slot = find_slot(&slots, MEN_SLOT_CODE)?;
    let women_slot = find_slot(&slots, WOMEN_SLOT_CODE)?;

    let (men_raw, women_raw) = tokio::try_join!(
        api.fetch_players_by_slot(&men_slot.id, contest_id, Some(Gender::Male.as_str())),
        api.fetch_players_by_slot(&women_slot.id, contest_id, Some(Gender::Female.as_str())),
    )?;

    let mut pool = build_pool(men_slot, women_slot, men_raw, women_raw)?;

    // Advisory only: a failure here must never block the builder.
    match api.fetch_hot_player_ids(contest_id).await {
        Ok(hot) => mark_hot(&mut pool.players, &hot.player_ids),
        Err(e) => debug!("hot player ids unavailable: {e}"),
    }

    info!(
        men = pool.of_gender(Gender::Male).count(),
        women = pool.of_gender(Gender::Female).count(),
        "roster pool loaded"
    );
    Ok(pool)
}

fn find_slot(slots: &[ApiSlot], code: &str) -> Result<ApiSlot, LoadError> {
    slots
        .iter()
        .find(|s| s.code == code)
        .cloned()
        .ok_or_else(|| LoadError::MissingSlot {
            code: code.to_string(),
        })
}

/// Assemble the domain pool from the raw player lists, validating that every
/// player carries the gender its slot expects.
fn build_pool(
    men_slot: ApiSlot,
    women_slot: ApiSlot,
    men_raw: Vec<ApiPlayer>,
    women_raw: Vec<ApiPlayer>,
) -> Result<RosterPool, LoadError> {
    let mut invalid: Vec<String> = Vec::new();
    let mut players = Vec::with_capacity(men_raw.len() + women_raw.len());

    for (raw, expected, role) in men_raw
        .into_iter()
        .map(|p| (p, Gender::Male, men_slot.name.as_str()))
        .chain(
            women_raw
                .into_iter()
                .map(|p| (p, Gender::Female, women_slot.name.as_str())),
        )
    {
        match raw.gender.as_deref().and_then(Gender::parse) {
            Some(gender) if gender == expected => players.push(map_player(raw, gender, role)),
            _ => invalid.push(raw.name),
        }
    }

    if !invalid.is_empty() {
        return Err(LoadError::InvalidGender { names: invalid });
    }

    Ok(RosterPool {
        men_slot,
        women_slot,
        players,
    })
}

fn map_player(raw: ApiPlayer, gender: Gender, role: &str) -> Player {
    let team = match raw.team {
        Some(t) if !t.trim().is_empty() => t,
        _ => UNASSIGNED_TEAM.to_string(),
    };
    Player {
        id: raw.id,
        name: raw.name,
        team,
        gender,
        role: role.to_string(),
        points: raw.points.unwrap_or(0.0),
        price: raw.price.unwrap_or(0.0),
        image_url: raw.image_url,
        is_hot: false,
    }
}

fn mark_hot(players: &mut [Player], hot_ids: &[String]) {
    let hot: HashSet<&str> = hot_ids.iter().map(String::as_str).collect();
    for player in players {
        player.is_hot = hot.contains(player.id.as_str());
    }
}
