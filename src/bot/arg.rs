use crate::{compendium::Compendium, storage::StorageHelper};

#[derive(Clone, Debug)]
pub(super) struct NecessaryArg {
    storage: StorageHelper,
    compendium: Compendium,
}

impl NecessaryArg {
    pub(super) fn new(storage: StorageHelper, compendium: Compendium) -> Self {
        Self {
            storage,
            compendium,
        }
    }

    pub fn storage(&self) -> &StorageHelper {
        &self.storage
    }

    pub fn compendium(&self) -> &Compendium {
        &self.compendium
    }
}
