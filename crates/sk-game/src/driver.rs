use sk_core::{Component, EcsResult, EntityGroup};
use tracing::{debug, info_span};

use crate::components::{Controls, Enemy, Game, Health, Level, Mixer, Player, Turn};

/// The outer loop's view of a window, terminal, or test harness.
///
/// Each frame the loop asks the driver to feed pending input into the group,
/// runs every mounted system once, then lets the driver present the result.
pub trait FrameDriver {
    /// Write this frame's input into the group, typically the controls singleton.
    fn handle_events(&mut self, group: &mut EntityGroup) -> EcsResult<()>;

    /// Show the state of the group after the systems ran.
    fn present(&mut self, group: &EntityGroup) -> EcsResult<()>;

    /// True once the driver wants the loop to stop.
    fn exited(&self) -> bool;
}

/// Drive frames until the driver exits or `max_frames` have run (0 = no cap).
///
/// Returns the number of frames run. A failing system aborts the loop.
pub fn run_loop<D: FrameDriver>(
    group: &mut EntityGroup,
    driver: &mut D,
    max_frames: u64,
) -> EcsResult<u64> {
    let span = info_span!("run_loop", max_frames);
    let _guard = span.enter();

    let mut frames = 0;
    while !driver.exited() && (max_frames == 0 || frames < max_frames) {
        driver.handle_events(group)?;
        group.run_systems()?;
        driver.present(group)?;
        frames += 1;
    }
    debug!(frames, "loop finished");
    Ok(frames)
}

/// What a headless run observed at the end of one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSummary {
    /// Frame number as counted by the group.
    pub frame: u64,
    /// Turn counter.
    pub turn: i64,
    /// Level being played, 0 before the first.
    pub level: i64,
    /// Live entities.
    pub entities: usize,
    /// Live enemies.
    pub enemies: usize,
    /// Player hit points.
    pub player_health: i64,
    /// One of the `Game::STATE_*` constants.
    pub game_state: i64,
}

impl FrameSummary {
    /// Summarize the group as it stands.
    pub fn capture(group: &EntityGroup) -> EcsResult<Self> {
        let turn: Turn = group.singleton(&[Turn::TAG])?.get()?;
        let game: Game = group.singleton(&[Game::TAG])?.get()?;
        let level: Level = group.singleton(&[Level::TAG])?.get()?;
        let player: Health = group.singleton(&[Player::TAG, Health::TAG])?.get()?;
        Ok(Self {
            frame: group.frame(),
            turn: turn.number,
            level: level.current_level,
            entities: group.len(),
            enemies: group.query(&[Enemy::TAG]).len(),
            player_health: player.health,
            game_state: game.state,
        })
    }
}

/// A driver with no window: it presses start on the first frame, drains the
/// mixer instead of playing audio, records a [`FrameSummary`] per frame, and
/// exits once the match is decided.
#[derive(Debug, Default)]
pub struct HeadlessDriver {
    frames: Vec<FrameSummary>,
    clips_played: usize,
    exited: bool,
}

impl HeadlessDriver {
    /// Create a driver that has not seen any frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Summaries of every presented frame, oldest first.
    pub fn frames(&self) -> &[FrameSummary] {
        &self.frames
    }

    /// The most recent summary.
    pub fn last(&self) -> Option<&FrameSummary> {
        self.frames.last()
    }

    /// Clips taken off the mixer so far.
    pub fn clips_played(&self) -> usize {
        self.clips_played
    }
}

impl FrameDriver for HeadlessDriver {
    fn handle_events(&mut self, group: &mut EntityGroup) -> EcsResult<()> {
        let clips = group
            .singleton_mut(&[Mixer::TAG])?
            .modify(|mixer: &mut Mixer| std::mem::take(&mut mixer.queue))?;
        self.clips_played += clips.len();

        let press_start = self.frames.is_empty();
        group
            .singleton_mut(&[Controls::TAG])?
            .modify(|controls: &mut Controls| {
                controls.actions.clear();
                if press_start {
                    controls.actions.push("start".to_string());
                }
            })
    }

    fn present(&mut self, group: &EntityGroup) -> EcsResult<()> {
        let summary = FrameSummary::capture(group)?;
        self.exited = matches!(
            summary.game_state,
            Game::STATE_GAME_OVER | Game::STATE_WIN
        );
        self.frames.push(summary);
        Ok(())
    }

    fn exited(&self) -> bool {
        self.exited
    }
}
