//! Timed command scripts.
//!
//! A script is a JSON array of `{ "tick": n, "command": { "type": ... } }`
//! entries. Each command is handed to the engine when the simulation reaches
//! its tick.

use std::collections::VecDeque;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use holdfast_core::commands::UnitCommand;

/// A command and the simulation tick it fires on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledCommand {
    pub tick: u64,
    pub command: UnitCommand,
}

/// Pending scripted commands, in firing order.
#[derive(Debug, Default)]
pub struct CommandScript {
    pending: VecDeque<ScheduledCommand>,
}

impl CommandScript {
    /// Commands sharing a tick keep their listed order.
    pub fn new(mut commands: Vec<ScheduledCommand>) -> Self {
        commands.sort_by_key(|c| c.tick);
        Self {
            pending: commands.into(),
        }
    }

    pub fn parse(json: &str) -> anyhow::Result<Self> {
        let commands: Vec<ScheduledCommand> =
            serde_json::from_str(json).context("malformed command script")?;
        Ok(Self::new(commands))
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read command script {}", path.display()))?;
        Self::parse(&text)
    }

    /// Take every command due at or before `tick`.
    pub fn due(&mut self, tick: u64) -> Vec<UnitCommand> {
        let mut due = Vec::new();
        while self.pending.front().is_some_and(|c| c.tick <= tick) {
            if let Some(next) = self.pending.pop_front() {
                due.push(next.command);
            }
        }
        due
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holdfast_core::types::{CoverPointId, UnitId};

    #[test]
    fn test_parse_and_fire_in_tick_order() {
        let mut script = CommandScript::parse(
            r#"[
                { "tick": 90, "command": { "type": "KillUnit", "unit": 2 } },
                { "tick": 30, "command": { "type": "DestroyCover", "point": 1 } },
                { "tick": 30, "command": { "type": "ClearThreat" } }
            ]"#,
        )
        .unwrap();
        assert_eq!(script.len(), 3);

        assert!(script.due(29).is_empty());
        let due = script.due(30);
        assert_eq!(due.len(), 2);
        assert!(matches!(
            due[0],
            UnitCommand::DestroyCover {
                point: CoverPointId(1)
            }
        ));
        assert!(matches!(due[1], UnitCommand::ClearThreat));

        // A late check still fires everything overdue.
        let due = script.due(500);
        assert!(matches!(due[0], UnitCommand::KillUnit { unit: UnitId(2) }));
        assert!(script.is_empty());
    }

    #[test]
    fn test_malformed_script_reports_context() {
        let err = CommandScript::parse(r#"[{ "tick": 1 }]"#).unwrap_err();
        assert!(err.to_string().contains("malformed command script"));
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = CommandScript::load(Path::new("/nonexistent/script.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/script.json"));
    }
}
