//! Loadout: одно активное оружие + набор неактивных.

use bevy::prelude::*;

#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct Loadout {
    active: Option<Entity>,
    owned: Vec<Entity>,
}

impl Loadout {
    pub fn with_weapons(owned: Vec<Entity>) -> Self {
        Self {
            active: owned.first().copied(),
            owned,
        }
    }

    pub fn active(&self) -> Option<Entity> {
        self.active
    }

    pub fn owned(&self) -> &[Entity] {
        &self.owned
    }

    /// Добавить и сделать активным. false если уже есть
    pub fn add_and_equip(&mut self, weapon: Entity) -> bool {
        if self.owned.contains(&weapon) {
            return false;
        }
        self.owned.push(weapon);
        self.active = Some(weapon);
        true
    }

    /// Следующее оружие по кругу после активного. None если менять не на что
    pub fn next_after_active(&self) -> Option<Entity> {
        if self.owned.len() < 2 {
            return None;
        }
        let index = self
            .active
            .and_then(|active| self.owned.iter().position(|w| *w == active))
            .map_or(0, |i| (i + 1) % self.owned.len());
        self.owned.get(index).copied()
    }

    pub fn set_active(&mut self, weapon: Entity) -> bool {
        if !self.owned.contains(&weapon) {
            return false;
        }
        self.active = Some(weapon);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_wraps_around() {
        let a = Entity::from_raw(1);
        let b = Entity::from_raw(2);
        let c = Entity::from_raw(3);
        let mut loadout = Loadout::with_weapons(vec![a, b, c]);

        assert_eq!(loadout.active(), Some(a));
        assert_eq!(loadout.next_after_active(), Some(b));

        loadout.set_active(c);
        assert_eq!(loadout.next_after_active(), Some(a));
    }

    #[test]
    fn test_single_weapon_does_not_cycle() {
        let loadout = Loadout::with_weapons(vec![Entity::from_raw(1)]);
        assert_eq!(loadout.next_after_active(), None);
    }

    #[test]
    fn test_add_skips_duplicates() {
        let a = Entity::from_raw(1);
        let mut loadout = Loadout::default();
        assert!(loadout.add_and_equip(a));
        assert!(!loadout.add_and_equip(a));
        assert_eq!(loadout.owned().len(), 1);
    }
}
