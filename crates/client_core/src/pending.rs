use std::collections::HashMap;

use shared::protocol::{Command, CommandName};

/// Commands sent but not yet answered by an event carrying their id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingCommands {
    by_id: HashMap<String, CommandName>,
}

impl PendingCommands {
    pub fn record(&mut self, command: &Command) {
        self.by_id.insert(command.id.to_string(), command.name());
    }

    pub fn resolve(&mut self, correlation_id: &str) -> Option<CommandName> {
        self.by_id.remove(correlation_id)
    }

    pub fn contains_name(&self, name: CommandName) -> bool {
        self.by_id.values().any(|pending| *pending == name)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
