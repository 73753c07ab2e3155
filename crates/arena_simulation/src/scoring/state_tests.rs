//! Tests for MatchState scoring and victory.

#[cfg(test)]
mod tests {
    use super::super::state::*;
    use crate::components::TeamId;
    use bevy::prelude::*;
    use std::time::Duration;

    fn rules(target_score: u32, time_limit_secs: f32) -> MatchRules {
        MatchRules {
            target_score,
            time_limit_secs,
            clock_tick_secs: 1.0,
        }
    }

    #[test]
    fn test_rules_defaults() {
        let rules = MatchRules::default();
        assert_eq!(rules.target_score, 10);
        assert_eq!(rules.time_limit_secs, 600.0);
    }

    #[test]
    fn test_find_or_create_team_score() {
        let mut state = MatchState::new(rules(10, 600.0));
        state.increment_team_score(TeamId(1), 0.0);
        state.increment_team_score(TeamId(0), 0.0);
        state.increment_team_score(TeamId(1), 0.0);

        assert_eq!(state.team_score(TeamId(1)), Some(2));
        assert_eq!(state.team_score(TeamId(0)), Some(1));
        // Порядок вставки сохранён
        assert_eq!(state.team_scores()[0].team, TeamId(1));
    }

    #[test]
    fn test_unassigned_team_never_scores() {
        let mut state = MatchState::new(rules(10, 600.0));
        assert_eq!(state.increment_team_score(TeamId::UNASSIGNED, 0.0), None);
        assert!(state.team_scores().is_empty());
    }

    #[test]
    fn test_threshold_victory_ends_exactly_once() {
        let mut state = MatchState::new(rules(10, 600.0));
        let mut endings = 0;

        for _ in 0..15 {
            if let Some(update) = state.increment_team_score(TeamId(2), 1.0) {
                if update.outcome.is_some() {
                    endings += 1;
                }
            }
        }

        assert_eq!(endings, 1);
        assert!(state.has_ended());
        assert_eq!(state.winning_team(), Some(TeamId(2)));
        // Очки заморожены на 10
        assert_eq!(state.team_score(TeamId(2)), Some(10));
        assert_eq!(state.check_victory_condition(2.0), None);
    }

    #[test]
    fn test_threshold_outcome_payload() {
        let mut state = MatchState::new(rules(1, 600.0));
        let update = state.increment_team_score(TeamId(3), 12.5);
        let outcome = update.and_then(|u| u.outcome);

        let Some(outcome) = outcome else {
            panic!("match should have ended");
        };
        assert_eq!(outcome.winning_team, Some(TeamId(3)));
        assert_eq!(outcome.reason, VictoryReason::ScoreLimit);
        assert_eq!(outcome.final_scores, vec![TeamScore { team: TeamId(3), score: 1 }]);
        assert_eq!(outcome.ended_at_secs, 12.5);
    }

    #[test]
    fn test_first_team_to_reach_target_wins() {
        let mut state = MatchState::new(rules(3, 600.0));
        for _ in 0..2 {
            state.increment_team_score(TeamId(4), 0.0);
            state.increment_team_score(TeamId(5), 0.0);
        }
        state.increment_team_score(TeamId(5), 0.0);
        // Матч окончен: очко команде 4 уже не засчитывается
        assert_eq!(state.increment_team_score(TeamId(4), 0.0), None);

        assert_eq!(state.winning_team(), Some(TeamId(5)));
        assert_eq!(state.team_score(TeamId(4)), Some(2));
    }

    #[test]
    fn test_time_limit_tie_has_no_winner() {
        let mut state = MatchState::new(rules(10, 3.0));
        for _ in 0..5 {
            state.increment_team_score(TeamId(0), 0.5);
            state.increment_team_score(TeamId(1), 0.5);
        }

        let mut outcome = None;
        for second in 1..=3 {
            let tick = state.tick_clock(Duration::from_secs(1), second as f32);
            if tick.outcome.is_some() {
                outcome = tick.outcome;
            }
        }

        let Some(outcome) = outcome else {
            panic!("time limit should end the match");
        };
        assert_eq!(outcome.reason, VictoryReason::TimeLimit);
        assert_eq!(outcome.winning_team, None);
        assert_eq!(state.winning_team_or_unassigned(), TeamId::UNASSIGNED);
        assert_eq!(state.remaining_secs(), 0.0);
    }

    #[test]
    fn test_time_limit_strict_leader_wins() {
        let mut state = MatchState::new(rules(10, 2.0));
        state.increment_team_score(TeamId(0), 0.0);
        state.increment_team_score(TeamId(1), 0.0);
        state.increment_team_score(TeamId(1), 0.0);

        state.tick_clock(Duration::from_secs(1), 1.0);
        let tick = state.tick_clock(Duration::from_secs(1), 2.0);

        assert_eq!(tick.outcome.map(|o| o.winning_team), Some(Some(TeamId(1))));
    }

    #[test]
    fn test_time_limit_with_no_teams() {
        let mut state = MatchState::new(rules(10, 1.0));
        let tick = state.tick_clock(Duration::from_secs(1), 1.0);
        assert_eq!(tick.outcome.map(|o| o.winning_team), Some(None));
    }

    #[test]
    fn test_clock_reports_remaining() {
        let mut state = MatchState::new(rules(10, 600.0));
        assert_eq!(state.tick_clock(Duration::from_millis(500), 0.5).remaining_secs, None);
        let tick = state.tick_clock(Duration::from_millis(500), 1.0);
        assert_eq!(tick.remaining_secs, Some(599.0));
        assert_eq!(tick.outcome, None);
    }

    #[test]
    fn test_stats_independent_of_team_score() {
        let mut state = MatchState::new(rules(10, 600.0));
        let player = Entity::from_raw(10);
        state.record_kill(player, "Alice");
        state.record_kill(player, "Alice");
        state.record_death(player, "Alice");

        let stats = state.player_stats(player).cloned().unwrap_or_default();
        assert_eq!(stats.name, "Alice");
        assert_eq!((stats.kills, stats.deaths, stats.assists), (2, 1, 0));
        assert!(state.team_scores().is_empty());
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut state = MatchState::new(rules(1, 600.0));
        state.record_kill(Entity::from_raw(1), "Bob");
        state.increment_team_score(TeamId(0), 5.0);
        assert!(state.has_ended());

        state.restart(20.0);
        assert!(!state.has_ended());
        assert_eq!(state.winning_team(), None);
        assert!(state.team_scores().is_empty());
        assert_eq!(state.player_stats(Entity::from_raw(1)), None);
        assert_eq!(state.remaining_secs(), 600.0);
        assert_eq!(state.rules().target_score, 1);
    }

    #[test]
    fn test_outcome_serializes_to_json() {
        let mut state = MatchState::new(rules(1, 600.0));
        let outcome = state
            .increment_team_score(TeamId(7), 3.0)
            .and_then(|u| u.outcome);
        let json = serde_json::to_string(&outcome).unwrap_or_default();
        assert!(json.contains("\"ScoreLimit\""));
        assert!(json.contains("\"winning_team\":7"));
    }
}
