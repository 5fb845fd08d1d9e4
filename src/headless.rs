use crate::command_script::CommandScript;
use crate::commands::{execute_command, CommandOutput, CommandSender, ConsoleSender, PlayerSender};
use crate::config::AppConfig;
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::BufRead;
use std::path::Path;
use tracing::{debug, info};
use voxedit_core::SimTick;
use voxedit_edit::EditEngine;
use voxedit_world::{Universe, WorldEffect};

/// One executed command and what it printed.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptEntry {
    pub tick: u64,
    pub sender: String,
    pub command: String,
    pub output: CommandOutput,
}

/// Runs edit commands against an in-memory universe without a client.
pub struct HeadlessRunner {
    universe: Universe,
    engine: EditEngine,
    player: PlayerSender,
    tick: SimTick,
    transcript: Vec<TranscriptEntry>,
}

impl HeadlessRunner {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let universe = config
            .world
            .build_universe()
            .context("failed to build world from config")?;
        info!(
            worlds = universe.len(),
            chunk_radius = config.world.chunk_radius,
            "world ready"
        );
        Ok(Self {
            universe,
            engine: EditEngine::new(config.edit.clone()),
            player: config.player.sender(),
            tick: SimTick::ZERO,
            transcript: Vec::new(),
        })
    }

    #[cfg(test)]
    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn execute(&mut self, command: &str, console: bool) -> &CommandOutput {
        let (sender, output) = if console {
            let output = execute_command(&ConsoleSender, &mut self.universe, &mut self.engine, command);
            (ConsoleSender.name().to_string(), output)
        } else {
            let output = execute_command(&self.player, &mut self.universe, &mut self.engine, command);
            (self.player.name().to_string(), output)
        };
        self.transcript.push(TranscriptEntry {
            tick: self.tick.0,
            sender,
            command: command.to_string(),
            output,
        });
        &self.transcript[self.transcript.len() - 1].output
    }

    /// Advance every world one tick and drain what the tick produced.
    pub fn step(&mut self) {
        self.universe.tick_all();
        self.tick = self.tick.advance(1);
        for world in self.universe.worlds_mut() {
            for effect in world.take_effects() {
                match effect {
                    WorldEffect::Lightning { x, y, z, tick } => {
                        info!(dimension = %world.dimension(), x, y, z, tick, "lightning");
                    }
                }
            }
            let dirty = world.take_dirty_chunks();
            if !dirty.is_empty() {
                debug!(
                    dimension = %world.dimension(),
                    chunks = dirty.len(),
                    resident = world.loaded_chunks(),
                    evicted = world.chunk_evictions(),
                    "chunks changed"
                );
            }
        }
    }

    /// Play a script to completion, ticking between due commands.
    pub fn run_script(&mut self, script: &mut CommandScript, max_ticks: Option<u64>) -> Result<()> {
        while let Some(next) = script.next_tick() {
            if let Some(max) = max_ticks.filter(|&max| next.0 > max) {
                anyhow::bail!("command script step at tick {} runs past --max-ticks ({max})", next.0);
            }
            while self.tick < next {
                self.step();
            }
            for step in script.drain_ready(self.tick) {
                self.execute(&step.command, step.console);
            }
        }
        self.step();
        Ok(())
    }

    /// Run one command per non-empty input line, one tick apart. Lines
    /// starting with `#` are skipped; `console:` runs the rest as the console.
    pub fn run_lines<R: BufRead>(&mut self, reader: R) -> Result<()> {
        for line in reader.lines() {
            let line = line.context("failed to read command input")?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match line.strip_prefix("console:") {
                Some(command) => self.execute(command.trim(), true),
                None => self.execute(line, false),
            };
            self.step();
        }
        Ok(())
    }

    pub fn write_transcript(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.transcript)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write transcript {}", path.display()))
    }
}
