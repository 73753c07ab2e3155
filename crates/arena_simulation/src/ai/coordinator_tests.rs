//! Tests for AiCoordinator binding state.

#[cfg(test)]
mod tests {
    use super::super::coordinator::*;
    use crate::components::TeamId;
    use bevy::prelude::*;

    fn body() -> Entity {
        Entity::from_raw(11)
    }

    fn enemy() -> Entity {
        Entity::from_raw(12)
    }

    #[test]
    fn test_new_coordinator_unbound() {
        let coordinator = AiCoordinator::new("Bot", TeamId(1));
        assert!(!coordinator.is_bound());
        assert!(!coordinator.can_issue_commands());
        assert!(!coordinator.logic().is_running());
        assert_eq!(coordinator.logic().generation(), 0);
    }

    #[test]
    fn test_bind_starts_logic_fresh() {
        let mut coordinator = AiCoordinator::new("Bot", TeamId(1));
        coordinator.bind(body());

        assert_eq!(coordinator.controlled_body(), Some(body()));
        assert!(coordinator.can_issue_commands());
        assert_eq!(coordinator.logic().state(), BehaviorState::Idle);
        assert_eq!(coordinator.logic().generation(), 1);
    }

    #[test]
    fn test_death_with_respawn_awaits() {
        let mut coordinator = AiCoordinator::new("Bot", TeamId(1));
        coordinator.bind(body());
        coordinator.engage(enemy());

        let handoff = coordinator.on_body_death(true);

        assert_eq!(handoff, DeathHandoff::AwaitRespawn);
        assert!(!coordinator.is_bound());
        assert_eq!(coordinator.current_target(), None);
        assert!(!coordinator.logic().is_running());
    }

    #[test]
    fn test_death_without_respawn_tears_down() {
        let mut coordinator = AiCoordinator::new("Bot", TeamId(1));
        coordinator.bind(body());
        assert_eq!(coordinator.on_body_death(false), DeathHandoff::TearDown);
    }

    #[test]
    fn test_rebind_after_respawn_resets_target() {
        let mut coordinator = AiCoordinator::new("Bot", TeamId(1));
        coordinator.bind(body());
        coordinator.engage(enemy());
        coordinator.on_body_death(true);

        assert_eq!(coordinator.rebind_path(body()), RebindPath::Bind);
        coordinator.bind(body());

        assert_eq!(coordinator.current_target(), None);
        assert_eq!(coordinator.logic().state(), BehaviorState::Idle);
        assert_eq!(coordinator.logic().generation(), 2);
        assert!(coordinator.can_issue_commands());
    }

    #[test]
    fn test_rebind_same_body_restarts_logic() {
        let mut coordinator = AiCoordinator::new("Bot", TeamId(1));
        coordinator.bind(body());
        coordinator.engage(enemy());

        assert_eq!(coordinator.rebind_path(body()), RebindPath::Restart);
        coordinator.restart_logic();

        assert_eq!(coordinator.controlled_body(), Some(body()));
        assert_eq!(coordinator.current_target(), None);
        assert_eq!(coordinator.logic().state(), BehaviorState::Idle);
        assert_eq!(coordinator.logic().generation(), 2);
    }

    #[test]
    fn test_stop_for_match_end_keeps_binding() {
        let mut coordinator = AiCoordinator::new("Bot", TeamId(1));
        coordinator.bind(body());
        coordinator.engage(enemy());

        assert_eq!(coordinator.stop_for_match_end(), Some(body()));
        assert!(coordinator.is_bound());
        assert!(!coordinator.can_issue_commands());
        assert_eq!(coordinator.current_target(), None);
    }

    #[test]
    fn test_stopped_logic_ignores_state_changes() {
        let mut process = DecisionProcess::default();
        process.set_state(BehaviorState::Engage { target: enemy() });
        assert_eq!(process.state(), BehaviorState::Idle);
    }

    #[test]
    fn test_set_and_clear_target_are_plain_assignment() {
        let mut coordinator = AiCoordinator::new("Bot", TeamId(1));
        coordinator.set_target(enemy());
        assert_eq!(coordinator.current_target(), Some(enemy()));
        coordinator.clear_target();
        assert_eq!(coordinator.current_target(), None);
    }
}
