use super::context::{CommandResult, ShellContext};

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

pub struct CommandEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub aliases: &'static [&'static str],
    pub handler: CommandHandler,
}

impl CommandEntry {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            aliases: &[],
            handler,
        }
    }

    pub const fn with_aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    fn answers_to(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(name))
    }
}

/// Shell commands in registration order. Names and aliases match case-insensitively.
#[derive(Default)]
pub struct CommandRegistry {
    entries: Vec<CommandEntry>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a command; registering a name again replaces the earlier entry in place.
    pub fn register(&mut self, entry: CommandEntry) {
        match self.entries.iter().position(|existing| existing.name == entry.name) {
            Some(index) => self.entries[index] = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn resolve(&self, name: &str) -> Option<&CommandEntry> {
        self.entries.iter().find(|entry| entry.answers_to(name))
    }

    pub fn list(&self) -> impl Iterator<Item = &CommandEntry> + '_ {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.name)
    }

    pub fn handler(&self, name: &str) -> Option<CommandHandler> {
        self.resolve(name).map(|entry| entry.handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
        Ok(())
    }

    #[test]
    fn aliases_resolve_to_their_command() {
        let mut registry = CommandRegistry::new();
        registry.register(CommandEntry::new("help", "Show help", "help", noop).with_aliases(&["h"]));
        registry.register(CommandEntry::new("exit", "Leave", "exit", noop).with_aliases(&["quit"]));

        assert_eq!(registry.resolve("QUIT").map(|entry| entry.name), Some("exit"));
        assert_eq!(registry.resolve("H").map(|entry| entry.name), Some("help"));
        assert!(registry.handler("start").is_none());
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["help", "exit"]);
    }

    #[test]
    fn re_registering_keeps_position() {
        let mut registry = CommandRegistry::new();
        registry.register(CommandEntry::new("flows", "old", "flows", noop));
        registry.register(CommandEntry::new("drafts", "List drafts", "drafts", noop));
        registry.register(CommandEntry::new("flows", "List flows", "flows", noop));

        let described: Vec<_> = registry
            .list()
            .map(|entry| (entry.name, entry.description))
            .collect();
        assert_eq!(described, vec![("flows", "List flows"), ("drafts", "List drafts")]);
    }
}
