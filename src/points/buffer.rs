// Two-layer points buffer: server-confirmed values plus raw per-field edit
// text. Text is free-form while a field has focus and only normalized on
// blur or save, so typing never fights reformatting.

use std::collections::HashMap;

use crate::api::types::PlayerPointsItem;
use crate::points::format::{format_points, parse_points};

#[derive(Debug, Clone, Default)]
pub struct PointsBuffer {
    /// Last known server truth per player.
    server: HashMap<String, f64>,
    /// Raw, possibly invalid, user input per field.
    edit_text: HashMap<String, String>,
}

impl PointsBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.server.is_empty() && self.edit_text.is_empty()
    }

    pub fn clear(&mut self) {
        self.server.clear();
        self.edit_text.clear();
    }

    pub fn server_value(&self, player_id: &str) -> Option<f64> {
        self.server.get(player_id).copied()
    }

    /// The text a field should display: in-progress edit text when present,
    /// otherwise the canonical rendering of the server value (0 if unknown).
    pub fn display_text(&self, player_id: &str) -> String {
        match self.edit_text.get(player_id) {
            Some(text) => text.clone(),
            None => format_points(self.server_value(player_id).unwrap_or(0.0)),
        }
    }

    /// The normalized value a save would submit for this player right now.
    pub fn resolved_value(&self, player_id: &str) -> f64 {
        parse_points(&self.display_text(player_id))
    }

    /// Whether the field holds an edit that has not been committed: its text
    /// differs from the canonical rendering of the server value.
    pub fn is_dirty(&self, player_id: &str) -> bool {
        match self.edit_text.get(player_id) {
            Some(text) => *text != format_points(self.server_value(player_id).unwrap_or(0.0)),
            None => false,
        }
    }

    /// The typing path: store the raw text verbatim, no parsing.
    pub fn edit(&mut self, player_id: &str, raw_text: &str) {
        self.edit_text
            .insert(player_id.to_string(), raw_text.to_string());
    }

    /// The blur path: normalize the field's current text and write the
    /// result into both layers, speculatively ahead of any server response.
    /// Returns the committed value.
    pub fn commit(&mut self, player_id: &str) -> f64 {
        let value = self.resolved_value(player_id);
        self.server.insert(player_id.to_string(), value);
        self.edit_text
            .insert(player_id.to_string(), format_points(value));
        value
    }

    /// Replace the whole buffer with server truth (initial load).
    pub fn replace_from_server(&mut self, items: &[PlayerPointsItem]) {
        self.clear();
        for item in items {
            let value = item.points.unwrap_or(0.0);
            self.server.insert(item.player_id.clone(), value);
            self.edit_text
                .insert(item.player_id.clone(), format_points(value));
        }
    }

    /// Merge server truth into the buffer (refresh after a save): server
    /// values always win, but edit text is only refreshed for fields with no
    /// uncommitted edit, so unrelated in-progress edits survive.
    pub fn merge_from_server(&mut self, items: &[PlayerPointsItem]) {
        for item in items {
            let value = item.points.unwrap_or(0.0);
            let was_dirty = self.is_dirty(&item.player_id);
            self.server.insert(item.player_id.clone(), value);
            if !was_dirty {
                self.edit_text
                    .insert(item.player_id.clone(), format_points(value));
            }
        }
    }
}
