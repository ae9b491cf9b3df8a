use std::fmt;

use crate::inventory::{ItemId, Slot};
use crate::resources::Pool;
use crate::stats::Stat;

/// A change to a character that a listener may want to redraw for.
#[derive(Clone, Debug, PartialEq)]
pub enum SheetEvent {
    LevelUpStarted { level: u32, hp_roll: f64 },
    PointAllocated { stat: Stat, remaining: u32 },
    LevelUpFinished { level: u32 },
    ItemAdded(ItemId),
    ItemRemoved(ItemId),
    Equipped {
        id: ItemId,
        slot: Option<Slot>,
        evicted: Vec<ItemId>,
    },
    Unequipped(ItemId),
    Enchanted { id: ItemId, level: i32 },
    Spent(Pool),
    ShortRest,
    LongRest,
    StatOverridesChanged,
    Reset,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type Listener = Box<dyn FnMut(&SheetEvent) + Send>;

/// Listeners of one character. Nothing here is shared between characters.
#[derive(Default)]
pub struct Observers {
    next: u64,
    listeners: Vec<(ListenerId, Listener)>,
}

impl Observers {
    pub fn subscribe(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next);
        self.next += 1;
        self.listeners.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn notify(&mut self, event: &SheetEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
