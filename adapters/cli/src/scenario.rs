//! Scripted movement scenarios loaded from TOML.

use std::{fmt, fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tilebound_core::{
    Hitbox, MovementProperties, ObjectId, Point, TICKS_PER_SECOND,
};
use tilebound_system_ledges::get_ledge_delta;
use tilebound_system_movement::move_by;
use tilebound_world::{Actor, ActorAction, Area, AreaDefinition};
use tracing::{debug, info};

const DEFAULT_ACTOR_ID: u32 = 1000;

/// An area, one actor and the velocities that drive it tick by tick.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct Scenario {
    area: AreaDefinition,
    actor: ActorDefinition,
    #[serde(default)]
    script: Vec<ScriptStep>,
}

#[derive(Clone, Debug, Deserialize)]
struct ActorDefinition {
    #[serde(default = "default_actor_id")]
    id: u32,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    #[serde(default)]
    preset: Preset,
    #[serde(default)]
    needs_full_tile: bool,
}

fn default_actor_id() -> u32 {
    DEFAULT_ACTOR_ID
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum Preset {
    #[default]
    Hero,
    Walker,
    Projectile,
}

/// Constant velocity held for a number of ticks.
#[derive(Clone, Copy, Debug, Deserialize)]
struct ScriptStep {
    #[serde(default)]
    dx: f32,
    #[serde(default)]
    dy: f32,
    ticks: u32,
}

impl ActorDefinition {
    fn properties(&self) -> MovementProperties {
        let id = ObjectId::new(self.id);
        let mut properties = match self.preset {
            Preset::Hero => MovementProperties::hero(id),
            Preset::Walker => MovementProperties::for_mover(id),
            Preset::Projectile => MovementProperties::projectile(id),
        };
        properties.needs_full_tile = self.needs_full_tile;
        properties
    }
}

impl Scenario {
    /// Reads and parses a scenario file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to load scenario at {}", path.display()))
    }

    /// Parses scenario TOML.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse scenario toml contents")
    }

    /// Plays the script to the end.
    pub(crate) fn run(&self) -> Result<Report> {
        let mut area = Area::from_definition(&self.area).context("invalid area definition")?;
        let id = ObjectId::new(self.actor.id);
        if area.object(id).is_some() {
            bail!("actor id {} is already used by an area object", self.actor.id);
        }
        if self.actor.width <= 0.0 || self.actor.height <= 0.0 {
            bail!(
                "actor hitbox must have a positive size, got {}x{}",
                self.actor.width,
                self.actor.height
            );
        }

        let mut actor = Actor::new(
            id,
            Point::new(self.actor.x, self.actor.y),
            Hitbox::new(0.0, 0.0, self.actor.width, self.actor.height),
        );
        let properties = self.actor.properties();
        let start = actor.movement_hitbox().center();

        let mut ticks = 0;
        for (index, step) in self.script.iter().enumerate() {
            debug!(step = index, dx = step.dx, dy = step.dy, ticks = step.ticks, "script_step");
            for _ in 0..step.ticks {
                let _ = move_by(&mut area, &mut actor, &properties, step.dx, step.dy);
                actor.advance_action_time();
                area.end_tick();
                ticks += 1;
            }
        }

        let end = actor.movement_hitbox().center();
        let ledge_delta = get_ledge_delta(&area, start, end);
        info!(ticks, ledge_delta, "scenario_finished");

        Ok(Report {
            ticks,
            actor_id: id,
            actor: actor.position(),
            action: actor.action(),
            objects: area
                .objects()
                .map(|object| (object.id(), object.hitbox()))
                .collect(),
            ledge_delta,
        })
    }
}

/// Final state of a played scenario.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Report {
    ticks: u32,
    actor_id: ObjectId,
    actor: Point,
    action: ActorAction,
    objects: Vec<(ObjectId, Hitbox)>,
    ledge_delta: i32,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let seconds = self.ticks as f32 / TICKS_PER_SECOND as f32;
        writeln!(f, "ticks: {} ({seconds:.2}s)", self.ticks)?;
        writeln!(
            f,
            "actor {}: ({:.2}, {:.2}) {:?}",
            self.actor_id.get(),
            self.actor.x,
            self.actor.y,
            self.action
        )?;
        for (id, hitbox) in &self.objects {
            writeln!(f, "object {}: ({:.2}, {:.2})", id.get(), hitbox.x, hitbox.y)?;
        }
        write!(f, "ledge delta: {}", self.ledge_delta)
    }
}
