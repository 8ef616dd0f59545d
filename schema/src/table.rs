use crate::abilities::{AttackAbility, ChargedAbility, SupportAbility};
use crate::birds::{Bird, ClassName};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const BUILTIN_TABLE: &str = include_str!("../../data/abilities.ron");

/// Base stats and charged ability shared by every class of one bird.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirdData {
    pub hp: i32,
    pub attack: i32,
    pub charged: ChargedAbility,
}

/// The two class-specific abilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassData {
    pub attack: AttackAbility,
    pub support: SupportAbility,
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read ability table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed ability table: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("ability table defines no classes")]
    Empty,
    #[error("class {class} belongs to {bird}, which has no entry in the table")]
    MissingBird { class: ClassName, bird: Bird },
}

/// Every ability value the engine reads, keyed by bird and class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityTable {
    pub birds: HashMap<Bird, BirdData>,
    pub classes: HashMap<ClassName, ClassData>,
}

impl AbilityTable {
    /// The table compiled into the binary.
    pub fn builtin() -> Result<Self, TableError> {
        Self::from_ron_str(BUILTIN_TABLE)
    }

    /// Read an alternative table from disk.
    pub fn load(path: &Path) -> Result<Self, TableError> {
        let content = fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&content)
    }

    pub fn from_ron_str(content: &str) -> Result<Self, TableError> {
        let table: AbilityTable = ron::from_str(content)?;
        table.validate()?;
        Ok(table)
    }

    fn validate(&self) -> Result<(), TableError> {
        if self.classes.is_empty() {
            return Err(TableError::Empty);
        }

        for class in self.classes.keys() {
            let bird = class.bird();
            if !self.birds.contains_key(&bird) {
                return Err(TableError::MissingBird { class: *class, bird });
            }
        }

        Ok(())
    }

    pub fn get_bird(&self, bird: Bird) -> Option<&BirdData> {
        self.birds.get(&bird)
    }

    pub fn get_class(&self, class: ClassName) -> Option<&ClassData> {
        self.classes.get(&class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn builtin_table_covers_every_class() {
        let table = AbilityTable::builtin().expect("builtin table should parse");

        for class in ClassName::iter() {
            assert!(table.get_class(class).is_some(), "missing class {class}");
        }
        for bird in Bird::iter() {
            assert!(table.get_bird(bird).is_some(), "missing bird {bird}");
        }
    }

    #[test]
    fn empty_table_is_rejected() {
        let result = AbilityTable::from_ron_str("(birds: {}, classes: {})");
        assert!(matches!(result, Err(TableError::Empty)));
    }

    #[test]
    fn class_without_bird_is_rejected() {
        let content = r#"(
            birds: {},
            classes: {
                Knight: (
                    attack: Attack(damage: 100, force_turns: 3),
                    support: Protect(effectiveness: 55, turns: 2),
                ),
            },
        )"#;

        let result = AbilityTable::from_ron_str(content);
        assert!(matches!(
            result,
            Err(TableError::MissingBird { class: ClassName::Knight, bird: Bird::Red })
        ));
    }

    #[test]
    fn malformed_table_reports_parse_error() {
        let result = AbilityTable::from_ron_str("(birds: oops)");
        assert!(matches!(result, Err(TableError::Parse(_))));
    }
}
