//! Core combat logic, independent of Discord and of the storage backend.
//!
//! The modules here form the adventure state machine: item and enemy models,
//! level scaling, pure turn resolution, the async engine orchestrating
//! transitions against a [`crate::store::CombatStore`], and the render-input
//! contract for the presentation layer.

/// Pure turn resolution - attack/defend exchanges, rewards
pub mod combat;
/// The adventure state machine and its async orchestrator
pub mod engine;
/// Item templates and combat instances
pub mod items;
/// Render-input contract for combat status displays
pub mod render;
/// Level-dependent magnitude scaling
pub mod scaling;
/// The persisted per-user `AdventureState`
pub mod state;
