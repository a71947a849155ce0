//! Контактный урон, отбрасывание и здоровье

pub mod contact;
pub mod health;

pub use contact::{
    apply_contact_damage, apply_contact_knockback, detect_actor_contacts,
    flip_patrol_on_enemy_contact, ContactDamage, ContactStarted, ContactTracker, KnockbackConfig,
};
pub use health::{poll_health, DamageTaken, Health, LivesChanged};
