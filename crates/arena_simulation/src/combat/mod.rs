//! Combat module: оружие, снаряды, урон, смерть, respawn.
//!
//! Порядок внутри тика (FixedUpdate, см. `ArenaSet`):
//! 1. Input: intents игроков, приказы AI, выдача оружия
//! 2. Weapons: refire/reload таймеры, aim + spawn снарядов
//! 3. Projectiles: sweep, попадания → DamageRequest
//! 4. Damage: HP, смерть, scoring
//! 5. Lifecycle: invulnerability, respawn / destruction, re-spawn игроков
//!
//! На mirror работает только `handle_weapon_commands` (intent флаги).

use bevy::prelude::*;

pub mod events;
pub mod holder;
pub mod loadout;
pub mod projectile;
pub mod systems;
pub mod weapon;


pub use events::*;
pub use holder::{as_weapon_holder, WeaponHolder};
pub use loadout::Loadout;
pub use projectile::Projectile;
pub use weapon::{FiredRound, RefireAction, Weapon, WeaponKind, WeaponOwner, WeaponRejection, WeaponTick};

use crate::arena::populate_arena;
use crate::authority::is_authority;
use crate::ArenaSet;

pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<WeaponCommand>()
            .add_event::<AddWeapon>()
            .add_event::<ShootingOrder>()
            .add_event::<ShotReleased>()
            .add_event::<ProjectileSpawned>()
            .add_event::<ProjectileHit>()
            .add_event::<DamageRequest>()
            .add_event::<HealRequest>()
            .add_event::<NoiseEmitted>()
            .add_event::<PredictedFire>()
            .add_event::<CombatantKilled>()
            .add_event::<CombatantDied>()
            .add_event::<BodyRespawned>()
            .add_event::<StopMovement>();

        // Фаза 1: input (обе роли)
        app.add_systems(
            FixedUpdate,
            systems::handle_weapon_commands.in_set(ArenaSet::Input),
        );
        app.add_systems(
            FixedUpdate,
            (systems::handle_add_weapon, systems::apply_shooting_orders)
                .chain()
                .in_set(ArenaSet::Input)
                .after(systems::handle_weapon_commands)
                .run_if(is_authority),
        );

        // Фаза 2: weapon timers + released shots
        app.add_systems(
            FixedUpdate,
            (systems::tick_weapon_timers, systems::resolve_released_shots)
                .chain()
                .in_set(ArenaSet::Weapons)
                .run_if(is_authority),
        );

        // Фаза 3: projectiles
        app.add_systems(
            FixedUpdate,
            (
                systems::spawn_projectiles,
                systems::advance_projectiles,
                systems::convert_projectile_hits,
            )
                .chain()
                .in_set(ArenaSet::Projectiles)
                .run_if(is_authority),
        );

        // Фаза 4: damage / heal + death resolution
        app.add_systems(
            FixedUpdate,
            (
                systems::apply_damage_requests,
                systems::apply_heal_requests,
                systems::resolve_deaths,
            )
                .chain()
                .in_set(ArenaSet::Damage)
                .run_if(is_authority),
        );

        // Фаза 5: lifecycle
        app.add_systems(
            FixedUpdate,
            (
                systems::tick_lifecycle_timers,
                systems::despawn_orphaned_weapons,
                systems::spawn_missing_player_pawns,
                populate_arena,
            )
                .chain()
                .in_set(ArenaSet::Lifecycle)
                .run_if(is_authority),
        );
    }
}
