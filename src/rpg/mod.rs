pub mod dice;
mod error;
pub mod initiative;
pub mod sheet;

pub use dice::{DiceExpression, DiceSource, RngDice, RollResult, evaluate};
pub use error::TableError;
pub use initiative::{Contender, Encounters, InitiativeOrder, Participant, Turn};
pub use sheet::{CharacterSheet, SheetChange, Sheets};
