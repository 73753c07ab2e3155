//! MatchState: очки команд, статистика игроков, лимит времени, победитель.
//!
//! После `has_ended` счёт и победитель заморожены до `restart`.
//! Порядок команд = порядок первого очка (threshold победа: первая найденная).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::components::TeamId;

/// Допуск на f32 накопление match clock
const CLOCK_EPSILON: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchRules {
    pub target_score: u32,
    /// Лимит времени (секунды). ≤ 0 = без лимита
    pub time_limit_secs: f32,
    /// Период match clock (секунды)
    pub clock_tick_secs: f32,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            target_score: 10,
            time_limit_secs: 600.0,
            clock_tick_secs: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VictoryReason {
    ScoreLimit,
    TimeLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamScore {
    pub team: TeamId,
    pub score: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub name: String,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
}

/// Итог матча (сериализуется для логов / headless вывода)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// None = ничья / нет команд
    pub winning_team: Option<TeamId>,
    pub reason: VictoryReason,
    pub final_scores: Vec<TeamScore>,
    pub player_stats: Vec<PlayerStats>,
    pub ended_at_secs: f32,
}

/// Результат `increment_team_score`
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreUpdate {
    pub team: TeamId,
    pub score: u32,
    pub outcome: Option<MatchOutcome>,
}

/// Результат тика match clock
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClockTick {
    /// Some на каждом периоде clock'а
    pub remaining_secs: Option<f32>,
    pub outcome: Option<MatchOutcome>,
}

#[derive(Resource, Debug, Clone)]
pub struct MatchState {
    rules: MatchRules,
    team_scores: Vec<TeamScore>,
    player_stats: Vec<(Entity, PlayerStats)>,
    started_at: f32,
    remaining_secs: f32,
    has_ended: bool,
    winning_team: Option<TeamId>,
    clock: Timer,
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new(MatchRules::default())
    }
}

impl MatchState {
    pub fn new(rules: MatchRules) -> Self {
        Self {
            rules,
            team_scores: Vec::new(),
            player_stats: Vec::new(),
            started_at: 0.0,
            remaining_secs: rules.time_limit_secs.max(0.0),
            has_ended: false,
            winning_team: None,
            clock: Timer::from_seconds(rules.clock_tick_secs.max(0.01), TimerMode::Repeating),
        }
    }

    /// Полный сброс: очки, статистика, clock
    pub fn restart(&mut self, now: f32) {
        *self = Self::new(self.rules);
        self.started_at = now;
    }

    pub fn rules(&self) -> &MatchRules {
        &self.rules
    }

    pub fn has_ended(&self) -> bool {
        self.has_ended
    }

    pub fn winning_team(&self) -> Option<TeamId> {
        self.winning_team
    }

    /// Как на wire: 255 если победителя нет
    pub fn winning_team_or_unassigned(&self) -> TeamId {
        self.winning_team.unwrap_or(TeamId::UNASSIGNED)
    }

    pub fn remaining_secs(&self) -> f32 {
        self.remaining_secs
    }

    pub fn team_scores(&self) -> &[TeamScore] {
        &self.team_scores
    }

    pub fn team_score(&self, team: TeamId) -> Option<u32> {
        self.team_scores
            .iter()
            .find(|entry| entry.team == team)
            .map(|entry| entry.score)
    }

    pub fn player_stats(&self, player: Entity) -> Option<&PlayerStats> {
        self.player_stats
            .iter()
            .find(|(entity, _)| *entity == player)
            .map(|(_, stats)| stats)
    }

    /// +1 команде. No-op после конца матча и для unassigned
    pub fn increment_team_score(&mut self, team: TeamId, now: f32) -> Option<ScoreUpdate> {
        if self.has_ended || !team.is_assigned() {
            return None;
        }

        let score = match self.team_scores.iter_mut().find(|entry| entry.team == team) {
            Some(entry) => {
                entry.score += 1;
                entry.score
            }
            None => {
                self.team_scores.push(TeamScore { team, score: 1 });
                1
            }
        };

        let outcome = self.check_victory_condition(now);
        Some(ScoreUpdate {
            team,
            score,
            outcome,
        })
    }

    pub fn record_kill(&mut self, player: Entity, name: &str) {
        self.stats_entry(player, name).kills += 1;
    }

    pub fn record_death(&mut self, player: Entity, name: &str) {
        self.stats_entry(player, name).deaths += 1;
    }

    fn stats_entry(&mut self, player: Entity, name: &str) -> &mut PlayerStats {
        let index = match self.player_stats.iter().position(|(e, _)| *e == player) {
            Some(index) => index,
            None => {
                self.player_stats.push((
                    player,
                    PlayerStats {
                        name: name.to_string(),
                        ..PlayerStats::default()
                    },
                ));
                self.player_stats.len() - 1
            }
        };
        &mut self.player_stats[index].1
    }

    /// Time limit первым, затем первая команда ≥ target (порядок вставки).
    /// Some только в момент окончания матча
    pub fn check_victory_condition(&mut self, now: f32) -> Option<MatchOutcome> {
        if self.has_ended {
            return None;
        }

        if let Some(outcome) = self.evaluate_time_limit(now) {
            return Some(outcome);
        }

        let target = self.rules.target_score;
        let winner = self
            .team_scores
            .iter()
            .find(|entry| entry.score >= target)
            .map(|entry| entry.team)?;

        Some(self.end(Some(winner), VictoryReason::ScoreLimit, now))
    }

    /// Периодический тик: пересчёт remaining, конец по времени
    pub fn tick_clock(&mut self, delta: Duration, now: f32) -> ClockTick {
        if self.has_ended || self.rules.time_limit_secs <= 0.0 {
            return ClockTick::default();
        }
        if !self.clock.tick(delta).just_finished() {
            return ClockTick::default();
        }

        let outcome = self.evaluate_time_limit(now);
        ClockTick {
            remaining_secs: Some(self.remaining_secs),
            outcome,
        }
    }

    fn evaluate_time_limit(&mut self, now: f32) -> Option<MatchOutcome> {
        if self.rules.time_limit_secs <= 0.0 {
            return None;
        }

        let elapsed = now - self.started_at;
        self.remaining_secs = (self.rules.time_limit_secs - elapsed).max(0.0);
        if self.remaining_secs > CLOCK_EPSILON {
            return None;
        }
        self.remaining_secs = 0.0;

        let winner = self.strictly_highest();
        Some(self.end(winner, VictoryReason::TimeLimit, now))
    }

    /// Строго лучший счёт; ничья или пустая таблица → None
    fn strictly_highest(&self) -> Option<TeamId> {
        let best = self.team_scores.iter().map(|entry| entry.score).max()?;
        let mut leaders = self.team_scores.iter().filter(|entry| entry.score == best);
        let leader = leaders.next()?;
        if leaders.next().is_some() {
            return None;
        }
        Some(leader.team)
    }

    fn end(&mut self, winner: Option<TeamId>, reason: VictoryReason, now: f32) -> MatchOutcome {
        self.has_ended = true;
        self.winning_team = winner;
        MatchOutcome {
            winning_team: winner,
            reason,
            final_scores: self.team_scores.clone(),
            player_stats: self
                .player_stats
                .iter()
                .map(|(_, stats)| stats.clone())
                .collect(),
            ended_at_secs: now,
        }
    }
}
