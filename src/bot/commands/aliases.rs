use std::collections::{BTreeMap, BTreeSet};

/// Two-way map between what users type and the canonical command names.
///
/// A table is never edited after it is built. Reconfiguration builds a fresh
/// one and swaps it in, so readers always see a single generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    by_command: BTreeMap<String, BTreeSet<String>>,
    by_alias: BTreeMap<String, String>,
}

impl AliasTable {
    /// Builds a table from `canonical -> aliases` pairs. An alias claimed by
    /// two commands belongs to whichever came last.
    pub fn from_mapping<I, A>(mapping: I) -> Self
    where
        I: IntoIterator<Item = (String, A)>,
        A: IntoIterator<Item = String>,
    {
        let mut table = Self::default();
        for (command, aliases) in mapping {
            for alias in aliases {
                table.insert(alias, command.clone());
            }
        }
        table
    }

    fn insert(&mut self, alias: String, command: String) {
        if let Some(previous) = self.by_alias.insert(alias.clone(), command.clone()) {
            if let Some(aliases) = self.by_command.get_mut(&previous) {
                aliases.remove(&alias);
                if aliases.is_empty() {
                    self.by_command.remove(&previous);
                }
            }
        }
        self.by_command.entry(command).or_default().insert(alias);
    }

    pub fn resolve(&self, token: &str) -> Option<&str> {
        self.by_alias.get(token).map(String::as_str)
    }

    pub fn aliases_for(&self, command: &str) -> Vec<&str> {
        self.by_command
            .get(command)
            .map(|aliases| aliases.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Every `(alias, canonical)` pair, ordered by alias.
    pub fn list_all(&self) -> Vec<(&str, &str)> {
        self.by_alias.iter().map(|(alias, command)| (alias.as_str(), command.as_str())).collect()
    }

    /// Aliases that `text` begins with, for messages typed without a space
    /// between the alias and its argument.
    pub fn prefix_matches(&self, text: &str) -> Vec<(&str, &str)> {
        self.by_alias
            .iter()
            .filter(|(alias, _)| text.starts_with(alias.as_str()))
            .map(|(alias, command)| (alias.as_str(), command.as_str()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_alias.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> AliasTable {
        AliasTable::from_mapping(vec![
            ("play".to_string(), vec!["p".to_string(), "!!".to_string(), "play".to_string()]),
            ("help".to_string(), vec!["help".to_string(), "h".to_string()]),
        ])
    }

    #[test]
    fn resolves_every_alias_to_its_command() {
        let table = table();
        assert_eq!(table.resolve("p"), Some("play"));
        assert_eq!(table.resolve("!!"), Some("play"));
        assert_eq!(table.resolve("h"), Some("help"));
        assert_eq!(table.resolve("nope"), None);
        assert_eq!(table.len(), 5);
    }

    #[test]
    fn resolving_twice_gives_the_same_command() {
        let table = table();
        assert_eq!(table.resolve("p"), table.resolve("p"));
    }

    #[test]
    fn later_command_wins_a_shared_alias() {
        let table = AliasTable::from_mapping(vec![
            ("play".to_string(), vec!["x".to_string(), "p".to_string()]),
            ("stop".to_string(), vec!["x".to_string()]),
        ]);

        assert_eq!(table.resolve("x"), Some("stop"));
        assert_eq!(table.aliases_for("play"), vec!["p"]);
        assert_eq!(table.aliases_for("stop"), vec!["x"]);
    }

    #[test]
    fn list_all_is_ordered_by_alias() {
        let table = table();
        let listed = table.list_all();
        assert_eq!(
            listed,
            vec![("!!", "play"), ("h", "help"), ("help", "help"), ("p", "play"), ("play", "play")]
        );
    }

    #[test]
    fn prefix_matches_finds_aliases_glued_to_arguments() {
        let table = table();
        let matches = table.prefix_matches("!!air");
        assert_eq!(matches, vec![("!!", "play")]);

        let matches = table.prefix_matches("playair");
        assert_eq!(matches, vec![("p", "play"), ("play", "play")]);
    }

    #[test]
    fn empty_mapping_builds_empty_table() {
        let table = AliasTable::from_mapping(Vec::<(String, Vec<String>)>::new());
        assert_eq!(table.len(), 0);
        assert!(table.list_all().is_empty());
        assert!(table.aliases_for("play").is_empty());
    }
}
