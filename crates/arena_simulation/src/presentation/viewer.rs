//! Viewer UI state: то, что видит один игрок (HUD, kill feed, death screen).
//!
//! Только подписчик на события. Решений не принимает, поэтому крутится и на mirror.

use std::collections::VecDeque;

use bevy::prelude::*;

use crate::components::TeamId;

/// Сколько строк kill feed держим
pub const KILL_FEED_CAPACITY: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct DeathScreenInfo {
    pub killer_name: String,
    pub respawn_secs: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewerUi {
    pub scores: Vec<(TeamId, u32)>,
    pub kill_feed: VecDeque<String>,
    pub death_screen: Option<DeathScreenInfo>,
    /// Some(true) = victory, Some(false) = defeat
    pub outcome: Option<bool>,
    pub health_fraction: f32,
    /// (current, magazine)
    pub ammo: (u32, u32),
    pub remaining_secs: Option<f32>,
}

impl ViewerUi {
    pub fn set_score(&mut self, team: TeamId, score: u32) {
        match self.scores.iter_mut().find(|(t, _)| *t == team) {
            Some(entry) => entry.1 = score,
            None => self.scores.push((team, score)),
        }
    }

    pub fn score(&self, team: TeamId) -> u32 {
        self.scores
            .iter()
            .find(|(t, _)| *t == team)
            .map(|(_, score)| *score)
            .unwrap_or(0)
    }

    pub fn push_kill(&mut self, killer_name: &str, victim_name: &str) {
        if self.kill_feed.len() == KILL_FEED_CAPACITY {
            self.kill_feed.pop_front();
        }
        self.kill_feed
            .push_back(format!("{killer_name} killed {victim_name}"));
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// UI одного игрока. Висит на entity контроллера
#[derive(Component, Debug, Clone, Default)]
pub struct Viewer {
    pub ui: ViewerUi,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kill_feed_is_capped() {
        let mut ui = ViewerUi::default();
        for i in 0..(KILL_FEED_CAPACITY + 2) {
            ui.push_kill(&format!("k{i}"), "v");
        }
        assert_eq!(ui.kill_feed.len(), KILL_FEED_CAPACITY);
        assert_eq!(ui.kill_feed.front().map(String::as_str), Some("k2 killed v"));
    }

    #[test]
    fn test_scores_update_in_place() {
        let mut ui = ViewerUi::default();
        ui.set_score(TeamId(0), 1);
        ui.set_score(TeamId(1), 1);
        ui.set_score(TeamId(0), 2);
        assert_eq!(ui.scores.len(), 2);
        assert_eq!(ui.score(TeamId(0)), 2);
        assert_eq!(ui.score(TeamId(7)), 0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut ui = ViewerUi::default();
        ui.set_score(TeamId(0), 3);
        ui.push_kill("a", "b");
        ui.outcome = Some(true);
        ui.reset();
        assert_eq!(ui, ViewerUi::default());
    }
}
