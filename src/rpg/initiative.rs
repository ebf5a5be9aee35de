//! Initiative order: roll a d20 per contender, sort descending, cycle the turn pointer.

use std::collections::HashMap;

use super::{DiceSource, TableError};

pub const INITIATIVE_DIE: u32 = 20;

/// Opaque scope of one encounter, the chat id in practice.
pub type EncounterKey = i64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contender {
    name: String,
    modifier: i32,
    owner: Option<i64>,
}

impl Contender {
    pub fn new(name: impl Into<String>, modifier: i32) -> Self {
        Self {
            name: name.into(),
            modifier,
            owner: None,
        }
    }

    pub fn owned_by(mut self, owner: i64) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn modifier(&self) -> i32 {
        self.modifier
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Participant {
    name: String,
    draw: u32,
    modifier: i32,
    owner: Option<i64>,
}

impl Participant {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn draw(&self) -> u32 {
        self.draw
    }

    pub fn modifier(&self) -> i32 {
        self.modifier
    }

    pub fn roll(&self) -> i64 {
        i64::from(self.draw) + i64::from(self.modifier)
    }

    pub fn owner(&self) -> Option<i64> {
        self.owner
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Turn {
    participant: Participant,
    position: usize,
    round: u32,
}

impl Turn {
    pub fn participant(&self) -> &Participant {
        &self.participant
    }

    /// 1-based position in the order.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn round(&self) -> u32 {
        self.round
    }
}

/// Participants sorted by roll, highest first. Never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitiativeOrder {
    participants: Vec<Participant>,
    turn: usize,
    round: u32,
}

impl InitiativeOrder {
    pub fn start(roster: Vec<Contender>, dice: &mut dyn DiceSource) -> Result<Self, TableError> {
        if roster.is_empty() {
            return Err(TableError::EmptyRoster);
        }

        let mut participants = roster
            .into_iter()
            .map(|contender| Participant {
                draw: dice.roll_die(INITIATIVE_DIE),
                name: contender.name,
                modifier: contender.modifier,
                owner: contender.owner,
            })
            .collect::<Vec<_>>();
        // Stable: ties keep roster order.
        participants.sort_by_key(|p| std::cmp::Reverse(p.roll()));

        Ok(Self {
            participants,
            turn: 0,
            round: 1,
        })
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Index of the participant the next call to [`Self::next_turn`] returns.
    pub fn turn(&self) -> usize {
        self.turn
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn next_turn(&mut self) -> Turn {
        let turn = Turn {
            participant: self.participants[self.turn].clone(),
            position: self.turn + 1,
            round: self.round,
        };
        self.turn = (self.turn + 1) % self.participants.len();
        if self.turn == 0 {
            self.round += 1;
        }
        turn
    }
}

pub fn start_encounter(
    roster: Vec<Contender>,
    dice: &mut dyn DiceSource,
) -> Result<InitiativeOrder, TableError> {
    InitiativeOrder::start(roster, dice)
}

/// One initiative order per encounter key.
#[derive(Debug, Default)]
pub struct Encounters {
    orders: HashMap<EncounterKey, InitiativeOrder>,
}

impl Encounters {
    /// Replaces whatever encounter `key` had before. On error the previous encounter is kept.
    pub fn start(
        &mut self,
        key: EncounterKey,
        roster: Vec<Contender>,
        dice: &mut dyn DiceSource,
    ) -> Result<&InitiativeOrder, TableError> {
        let order = start_encounter(roster, dice)?;
        self.orders.insert(key, order);
        Ok(&self.orders[&key])
    }

    pub fn next_turn(&mut self, key: EncounterKey) -> Result<Turn, TableError> {
        self.orders
            .get_mut(&key)
            .map(InitiativeOrder::next_turn)
            .ok_or(TableError::NoActiveEncounter)
    }

    pub fn get(&self, key: EncounterKey) -> Option<&InitiativeOrder> {
        self.orders.get(&key)
    }

    pub fn end(&mut self, key: EncounterKey) -> bool {
        self.orders.remove(&key).is_some()
    }
}
