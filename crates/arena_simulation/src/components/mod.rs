//! Компоненты тел и контроллеров

pub mod combatant;
pub mod lifecycle;
pub mod npc;
pub mod player;


pub use combatant::*;
pub use lifecycle::*;
pub use npc::*;
pub use player::*;
