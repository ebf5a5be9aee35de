use std::path::PathBuf;

use log::error;

use super::{
    event::{StorageEvent, StorageEventReceiver, StorageHelper},
    store::Store,
};
use crate::rpg::{CharacterSheet, DiceSource, RngDice};

pub type BoxedDice = Box<dyn DiceSource + Send>;

pub struct StorageHandle {
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
}

impl StorageHandle {
    pub async fn open(file: Option<PathBuf>) -> anyhow::Result<(Self, StorageHelper)> {
        Self::open_with_dice(file, Box::new(RngDice::from_os())).await
    }

    pub async fn open_with_dice(
        file: Option<PathBuf>,
        dice: BoxedDice,
    ) -> anyhow::Result<(Self, StorageHelper)> {
        let store = Store::load(file).await?;
        let (sender, receiver) = StorageHelper::new(16);
        Ok((
            Self {
                handle: tokio::spawn(Self::run(store, dice, receiver)),
            },
            sender,
        ))
    }

    async fn persist(store: &Store) {
        store
            .flush()
            .await
            .inspect_err(|e| log::warn!("Flush sheets error: {e:?}"))
            .ok();
    }

    async fn handle_event(
        store: &mut Store,
        dice: &mut (dyn DiceSource + Send),
        event: StorageEvent,
    ) -> anyhow::Result<()> {
        match event {
            StorageEvent::SheetCreate {
                chat,
                user,
                name,
                __private_sender,
            } => {
                let sheet = CharacterSheet::new(name);
                store.sheets.insert(chat, user, sheet.clone());
                Self::persist(store).await;
                __private_sender.send(sheet).ok();
            }
            StorageEvent::SheetQuery {
                chat,
                user,
                __private_sender,
            } => {
                __private_sender
                    .send(store.sheets.get(chat, user).cloned())
                    .ok();
            }
            StorageEvent::SheetModify {
                chat,
                user,
                change,
                __private_sender,
            } => {
                let Some(sheet) = store.sheets.get_mut(chat, user) else {
                    __private_sender.send(None).ok();
                    return Ok(());
                };
                change.apply(sheet);
                let sheet = sheet.clone();
                Self::persist(store).await;
                __private_sender.send(Some(sheet)).ok();
            }
            StorageEvent::EncounterStart {
                chat,
                extra,
                __private_sender,
            } => {
                let mut roster = store.sheets.roster(chat);
                roster.extend(extra);
                let ret = store.encounters.start(chat, roster, dice).cloned();
                if let Ok(order) = &ret {
                    log::debug!(
                        "Encounter started in {chat} with {} participants",
                        order.participants().len()
                    );
                }
                __private_sender.send(ret).ok();
            }
            StorageEvent::EncounterNext {
                chat,
                __private_sender,
            } => {
                __private_sender
                    .send(store.encounters.next_turn(chat))
                    .ok();
            }
            StorageEvent::EncounterQuery {
                chat,
                __private_sender,
            } => {
                __private_sender
                    .send(store.encounters.get(chat).cloned())
                    .ok();
            }
            StorageEvent::EncounterEnd {
                chat,
                __private_sender,
            } => {
                __private_sender.send(store.encounters.end(chat)).ok();
            }
            StorageEvent::Terminate => {
                unreachable!()
            }
        }
        Ok(())
    }

    async fn run(
        mut store: Store,
        mut dice: BoxedDice,
        mut receiver: StorageEventReceiver,
    ) -> anyhow::Result<()> {
        while let Some(event) = receiver.recv().await {
            if let StorageEvent::Terminate = event {
                break;
            }
            Self::handle_event(&mut store, dice.as_mut(), event)
                .await
                .inspect_err(|e| error!("Storage error: {e:?}"))
                .ok();
        }
        store.flush().await?;
        Ok(())
    }

    pub async fn wait(self) -> anyhow::Result<()> {
        self.handle.await?
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::rpg::{Contender, SheetChange, TableError, dice::fixed::FixedDice};

    #[tokio::test]
    async fn test_sheet_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fichas.json");
        let (handle, helper) =
            StorageHandle::open_with_dice(Some(path.clone()), Box::new(FixedDice::new([])))
                .await
                .unwrap();

        assert_eq!(helper.sheet_query(1, 2).await, Some(None));
        assert_eq!(
            helper.sheet_modify(1, 2, SheetChange::Damage(5)).await,
            Some(None)
        );

        let sheet = helper.sheet_create(1, 2, "Aria".into()).await.unwrap();
        assert_eq!(sheet.hp(), 100);
        let sheet = helper
            .sheet_modify(1, 2, SheetChange::Damage(30))
            .await
            .flatten()
            .unwrap();
        assert_eq!(sheet.hp(), 70);

        helper.terminate().await;
        handle.wait().await.unwrap();

        let (handle, helper) = StorageHandle::open(Some(path)).await.unwrap();
        let sheet = helper.sheet_query(1, 2).await.flatten().unwrap();
        assert_eq!((sheet.name(), sheet.hp()), ("Aria", 70));
        helper.terminate().await;
        handle.wait().await.unwrap();
    }

    #[tokio::test]
    async fn test_encounter_flow() {
        let (handle, helper) =
            StorageHandle::open_with_dice(None, Box::new(FixedDice::new([8, 15, 3, 20])))
                .await
                .unwrap();

        assert_eq!(
            helper.encounter_next(10).await,
            Some(Err(TableError::NoActiveEncounter))
        );
        assert_eq!(
            helper.encounter_start(10, vec![]).await,
            Some(Err(TableError::EmptyRoster))
        );

        helper.sheet_create(10, 1, "Aria".into()).await.unwrap();
        helper
            .sheet_modify(10, 1, SheetChange::SetAttribute("des".into(), 14))
            .await;
        helper.sheet_create(99, 1, "Other chat".into()).await.unwrap();

        // Aria 8+2, Goblin 15-1, Orc 3
        let order = helper
            .encounter_start(
                10,
                vec![Contender::new("Goblin", -1), Contender::new("Orc", 0)],
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            order
                .participants()
                .iter()
                .map(|p| (p.name(), p.roll()))
                .collect::<Vec<_>>(),
            [("Goblin", 14), ("Aria", 10), ("Orc", 3)]
        );

        let turn = helper.encounter_next(10).await.unwrap().unwrap();
        assert_eq!(turn.participant().name(), "Goblin");
        let order = helper.encounter_query(10).await.flatten().unwrap();
        assert_eq!(order.turn(), 1);

        assert_eq!(
            helper.encounter_next(11).await,
            Some(Err(TableError::NoActiveEncounter))
        );

        let order = helper
            .encounter_start(11, vec![Contender::new("Lobo", 0)])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.participants()[0].draw(), 20);

        assert_eq!(helper.encounter_end(10).await, Some(true));
        assert_eq!(helper.encounter_end(10).await, Some(false));
        assert!(helper.encounter_query(10).await.flatten().is_none());

        helper.terminate().await;
        handle.wait().await.unwrap();
    }
}
