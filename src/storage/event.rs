use crate::rpg::{CharacterSheet, Contender, InitiativeOrder, SheetChange, TableError, Turn};

kstool_helper_generator::oneshot_helper! {
#[derive(Debug)]
pub enum StorageEvent {
    #[ret(CharacterSheet)]
    SheetCreate {
        chat: i64,
        user: u64,
        name: String,
    },

    #[ret(Option<CharacterSheet>)]
    SheetQuery {
        chat: i64,
        user: u64,
    },

    #[ret(Option<CharacterSheet>)]
    SheetModify {
        chat: i64,
        user: u64,
        change: SheetChange,
    },

    #[ret(Result<InitiativeOrder, TableError>)]
    EncounterStart {
        chat: i64,
        extra: Vec<Contender>,
    },

    #[ret(Result<Turn, TableError>)]
    EncounterNext {
        chat: i64,
    },

    #[ret(Option<InitiativeOrder>)]
    EncounterQuery {
        chat: i64,
    },

    #[ret(bool)]
    EncounterEnd {
        chat: i64,
    },

    Terminate,
}
}
