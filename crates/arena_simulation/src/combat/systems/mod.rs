//! Combat systems (authoritative layer + mirror intent handling)

pub mod damage;
pub mod lifecycle;
pub mod projectile;
pub mod weapon;

pub use damage::*;
pub use lifecycle::*;
pub use projectile::*;
pub use weapon::*;
