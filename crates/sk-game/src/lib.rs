//! Reference gameplay for Skirmish, built only on the public `sk-core` API.
//!
//! Declares the component schemas of the tactics game, the systems that act
//! on them each frame, and a headless frame driver that stands in for the
//! window loop.

/// Component schemas used by the game.
pub mod components;
/// Match configuration.
pub mod config;
/// The per-frame driver contract and a headless implementation.
pub mod driver;
/// Match setup: registry, singletons, prototypes, and system mounting.
pub mod setup;
/// Gameplay systems.
pub mod systems;

/// Re-export of [`config::MatchConfig`].
pub use config::MatchConfig;
/// Re-exports of the driver types.
pub use driver::{FrameDriver, FrameSummary, HeadlessDriver, run_loop};
/// Re-exports of the setup entry points.
pub use setup::{build_match, declare_components};
