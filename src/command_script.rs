use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{collections::VecDeque, fs, path::Path};
use voxedit_core::SimTick;

#[derive(Debug, Deserialize)]
struct ScriptFile {
    steps: Vec<ScriptStepDef>,
}

#[derive(Debug, Clone, Deserialize)]
struct ScriptStepDef {
    tick: u64,
    command: String,
    #[serde(default)]
    console: bool,
}

/// A command due at a given tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedCommand {
    pub tick: SimTick,
    pub command: String,
    /// Run as the console instead of the configured player.
    pub console: bool,
}

/// Edit script runner.
///
/// Scripts are a list of `{tick, command}` steps sorted by tick; steps that
/// share a tick run in file order.
#[derive(Debug)]
pub struct CommandScript {
    pending: VecDeque<ScriptedCommand>,
}

impl CommandScript {
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read command script {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid command script {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let file: ScriptFile = serde_json::from_str(contents)?;
        if file.steps.is_empty() {
            bail!("command script contains no steps");
        }

        let mut pending = VecDeque::with_capacity(file.steps.len());
        let mut last_tick = 0;
        for step in file.steps {
            let command = step.command.trim().to_string();
            if command.is_empty() {
                bail!("command script contains an empty command");
            }
            if step.tick < last_tick {
                bail!("command script steps must be sorted by tick");
            }
            last_tick = step.tick;
            pending.push_back(ScriptedCommand {
                tick: SimTick(step.tick),
                command,
                console: step.console,
            });
        }

        Ok(Self { pending })
    }

    /// Drain every command scheduled for ticks `<= tick`.
    pub fn drain_ready(&mut self, tick: SimTick) -> Vec<ScriptedCommand> {
        let ready = self
            .pending
            .iter()
            .take_while(|step| step.tick <= tick)
            .count();
        self.pending.drain(..ready).collect()
    }

    /// Tick of the next pending command.
    pub fn next_tick(&self) -> Option<SimTick> {
        self.pending.front().map(|step| step.tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unsorted_ticks() {
        let json = r#"{
            "steps": [
                {"tick": 2, "command": "//drain 5"},
                {"tick": 1, "command": "/snow"}
            ]
        }"#;
        let err = CommandScript::parse(json).unwrap_err();
        assert!(
            err.to_string().contains("sorted by tick"),
            "unexpected error: {err:#}"
        );
    }

    #[test]
    fn rejects_blank_commands() {
        let err = CommandScript::parse(r#"{"steps": [{"tick": 0, "command": "  "}]}"#).unwrap_err();
        assert!(err.to_string().contains("empty command"), "{err:#}");
    }

    #[test]
    fn drains_in_order() {
        let json = r#"{
            "steps": [
                {"tick": 1, "command": "//fill stone 4"},
                {"tick": 1, "command": "butcher -a", "console": true},
                {"tick": 3, "command": "//undo"}
            ]
        }"#;
        let mut script = CommandScript::parse(json).unwrap();

        assert!(script.drain_ready(SimTick(0)).is_empty());
        assert_eq!(script.next_tick(), Some(SimTick(1)));
        let ready = script.drain_ready(SimTick(1));
        assert_eq!(
            ready.iter().map(|s| s.command.as_str()).collect::<Vec<_>>(),
            vec!["//fill stone 4", "butcher -a"]
        );
        assert!(!ready[0].console && ready[1].console);
        assert!(script.drain_ready(SimTick(2)).is_empty());
        assert_eq!(script.drain_ready(SimTick(5)).len(), 1);
        assert_eq!(script.next_tick(), None);
    }
}
