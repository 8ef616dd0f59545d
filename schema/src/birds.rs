use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// The five playable birds. Each bird owns a charged ability and a set of classes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Bird {
    Red,
    Chuck,
    Matilda,
    Bomb,
    Blues,
}

/// Every class a bird can be played as. The class name doubles as the ally's
/// roster key, so it must be unique across all birds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum ClassName {
    // Red
    Knight,
    Guardian,
    Samurai,
    Avenger,
    Paladin,
    StoneGuard,
    // Chuck
    Mage,
    LightningBird,
    Rainbird,
    Wizard,
    Thunderbird,
    Illusionist,
    // Matilda
    Cleric,
    Druid,
    Princess,
    Priestess,
    Bard,
    Witch,
    // Bomb
    Pirate,
    Cannoneer,
    Berserker,
    #[strum(to_string = "capt'n", serialize = "captn")]
    Captn,
    SeaDog,
    FrostSavage,
    // Blues
    Marksmen,
}

impl ClassName {
    /// The bird this class belongs to.
    pub fn bird(self) -> Bird {
        use ClassName::*;

        match self {
            Knight | Guardian | Samurai | Avenger | Paladin | StoneGuard => Bird::Red,
            Mage | LightningBird | Rainbird | Wizard | Thunderbird | Illusionist => Bird::Chuck,
            Cleric | Druid | Princess | Priestess | Bard | Witch => Bird::Matilda,
            Pirate | Cannoneer | Berserker | Captn | SeaDog | FrostSavage => Bird::Bomb,
            Marksmen => Bird::Blues,
        }
    }
}
