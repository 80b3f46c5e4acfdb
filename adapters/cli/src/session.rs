//! Interactive session wiring intents to the world, the selection controller
//! and the playback gate.

use anyhow::{Context, Result};
use tactics_sandbox_core::{Command, Event, UnitRole};
use tactics_sandbox_rendering::{InputGate, Playback, PlaybackStep, Scene};
use tactics_sandbox_system_range::RangeSplit;
use tactics_sandbox_system_selection::{SelectionController, SelectionEvent};
use tactics_sandbox_world::{self as world, query, World, WorldConfig};

use crate::intent::Intent;

/// What the caller should do after an intent was dispatched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Render,
    Quit,
}

#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    controller: SelectionController,
    gate: InputGate,
    highlight: Option<RangeSplit>,
}

impl Session {
    pub(crate) fn new(config: WorldConfig) -> Result<Self> {
        let world = World::new(config).context("failed to generate the initial grid")?;
        Ok(Self {
            world,
            controller: SelectionController::new(),
            gate: InputGate::new(),
            highlight: None,
        })
    }

    /// Scene reflecting the world, the current highlight and any playback in flight.
    pub(crate) fn scene(&self) -> Scene {
        let scene = Scene::compose(
            query::terrain_view(&self.world),
            query::player(&self.world).cell(),
            query::enemy(&self.world).cell(),
            self.highlight.as_ref(),
        );
        match self.gate.playback() {
            Some(playback) => scene.with_playback(playback),
            None => scene,
        }
    }

    /// Executes a single intent, appending human-readable notices.
    pub(crate) fn dispatch(&mut self, intent: Intent, notices: &mut Vec<String>) -> Flow {
        match intent {
            Intent::Select(cell) => {
                if let Err(refused) = self.gate.check() {
                    notices.push(format!("select ignored: {refused}"));
                    return Flow::Continue;
                }
                let player = query::player(&self.world);
                let enemy = query::enemy(&self.world).cell();
                let mut events = Vec::new();
                self.controller.select_cell(
                    cell,
                    query::terrain_view(&self.world),
                    &player,
                    enemy,
                    &mut events,
                );
                if events.is_empty() {
                    notices.push(format!("{cell} lies outside the grid"));
                    return Flow::Continue;
                }
                for event in events {
                    self.on_selection(event, notices);
                }
                Flow::Render
            }
            Intent::Edit(cell) => {
                if let Err(refused) = self.gate.check() {
                    notices.push(format!("edit ignored: {refused}"));
                    return Flow::Continue;
                }
                let mut commands = Vec::new();
                self.controller
                    .edit_terrain(cell, query::terrain_view(&self.world), &mut commands);
                if commands.is_empty() {
                    notices.push(format!("{cell} lies outside the grid"));
                    return Flow::Continue;
                }
                self.apply_all(commands, notices);
                Flow::Render
            }
            Intent::Generate => {
                if let Err(refused) = self.gate.check() {
                    notices.push(format!("generate ignored: {refused}"));
                    return Flow::Continue;
                }
                self.apply_all([Command::Generate], notices);
                Flow::Render
            }
            Intent::Resize { width, height } => {
                self.apply_all([Command::SetDimensions { width, height }], notices);
                Flow::Continue
            }
            Intent::Weights(weights) => {
                self.apply_all([Command::SetTerrainWeights { weights }], notices);
                Flow::Continue
            }
            Intent::Ranges {
                move_range,
                attack_range,
            } => {
                self.apply_all(
                    [Command::SetUnitRanges {
                        move_range,
                        attack_range,
                    }],
                    notices,
                );
                Flow::Continue
            }
            Intent::Step => match self.gate.tick() {
                Some(PlaybackStep::Advanced(cell)) => {
                    notices.push(format!("animation entered {cell}"));
                    Flow::Render
                }
                Some(PlaybackStep::Finished(command)) => {
                    self.apply_all([command], notices);
                    Flow::Render
                }
                None => {
                    notices.push("nothing to animate".to_owned());
                    Flow::Continue
                }
            },
            Intent::Show => Flow::Render,
            Intent::Quit => Flow::Quit,
        }
    }

    fn on_selection(&mut self, event: SelectionEvent, notices: &mut Vec<String>) {
        match &event {
            SelectionEvent::PathComputed {
                target,
                outcome,
                split,
                is_attack,
            } => {
                let action = action_name(*is_attack);
                match outcome.path() {
                    Some(path) => notices.push(format!(
                        "{action} path to {target}: {} step(s), {} within range; select again to confirm",
                        path.len(),
                        split.in_range.len()
                    )),
                    None => notices.push(format!("no {action} path to {target}")),
                }
                self.highlight = Some(split.clone());
            }
            SelectionEvent::RangeExceeded {
                target,
                path_length,
                range_limit,
                is_attack,
            } => {
                notices.push(format!(
                    "{} to {target} needs {path_length} step(s) but the range is {range_limit}",
                    action_name(*is_attack)
                ));
                self.highlight = None;
            }
            SelectionEvent::Unreachable { target, is_attack } => {
                notices.push(format!(
                    "cannot {} {target}",
                    if *is_attack { "attack" } else { "move to" }
                ));
                self.highlight = None;
            }
            SelectionEvent::MoveConfirmed { path } | SelectionEvent::AttackConfirmed { path } => {
                notices.push(format!(
                    "{} confirmed along {} step(s); use `step` to animate",
                    action_name(matches!(event, SelectionEvent::AttackConfirmed { .. })),
                    path.len()
                ));
                self.highlight = None;
                if let Some(playback) = Playback::from_event(&event) {
                    if let Err(refused) = self.gate.begin(playback) {
                        tracing::warn!(%refused, "confirmation arrived during playback");
                    }
                }
            }
        }
    }

    fn apply_all<I>(&mut self, commands: I, notices: &mut Vec<String>)
    where
        I: IntoIterator<Item = Command>,
    {
        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }
        self.controller.handle(&events);
        if events.iter().any(invalidates_highlight) {
            self.highlight = None;
        }
        notices.extend(events.iter().map(describe));
    }
}

fn invalidates_highlight(event: &Event) -> bool {
    matches!(
        event,
        Event::GridGenerated { .. } | Event::TerrainChanged { .. } | Event::UnitRelocated { .. }
    )
}

const fn action_name(is_attack: bool) -> &'static str {
    if is_attack {
        "attack"
    } else {
        "move"
    }
}

fn describe(event: &Event) -> String {
    match event {
        Event::DimensionsQueued { size } => {
            format!("next grid will be {size}; use `generate` to apply")
        }
        Event::TerrainWeightsChanged { weights } => format!(
            "terrain weights set to traversable {}, obstacle {}, cover {}",
            weights.traversable, weights.obstacle, weights.cover
        ),
        Event::UnitRangesChanged {
            move_range,
            attack_range,
        } => format!("player ranges set to move {move_range}, attack {attack_range}"),
        Event::GridGenerated {
            size,
            player,
            enemy,
        } => format!("generated {size} grid; player at {player}, enemy at {enemy}"),
        Event::GenerationRejected { reason } => format!("generation rejected: {reason}"),
        Event::TerrainChanged { cell, from, to } => {
            format!("{cell} changed from {from:?} to {to:?}")
        }
        Event::UnitRelocated { role, from, to } => {
            let unit = match role {
                UnitRole::Player => "player",
                UnitRole::Enemy => "enemy",
            };
            format!("{unit} moved from {from} to {to}")
        }
    }
}
