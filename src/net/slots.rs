//! Fixed-capacity slot tables with strongly typed indices.
//!
//! Ids are handed out by first-free-slot search, so a freed id is reused by
//! the next insert of the same kind.
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Trait implemented by identifier types that can index into [`SlotTable`].
pub trait Idx: Copy + Eq + PartialEq + Ord + fmt::Debug {
    fn index(self) -> usize;
    fn from_usize(idx: usize) -> Self;
}

/// A bounded arena indexed by strongly typed identifiers. Slots never move:
/// an id stays valid until the entry it names is removed.
#[derive(Clone, PartialEq, Eq)]
pub struct SlotTable<I, T> {
    slots: Vec<Option<T>>,
    occupied: usize,
    _marker: PhantomData<I>,
}

impl<I, T> SlotTable<I, T>
where
    I: Idx,
{
    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots,
            occupied: 0,
            _marker: PhantomData,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.occupied
    }

    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    pub fn is_full(&self) -> bool {
        self.occupied == self.slots.len()
    }

    /// Lowest vacant id, if any.
    pub fn first_free(&self) -> Option<I> {
        self.slots
            .iter()
            .position(|slot| slot.is_none())
            .map(I::from_usize)
    }

    /// Inserts into the first free slot, building the value from the id it
    /// will receive. Returns `None` without calling `build` when full.
    pub fn insert_with(&mut self, build: impl FnOnce(I) -> T) -> Option<I> {
        let id = self.first_free()?;
        self.slots[id.index()] = Some(build(id));
        self.occupied += 1;
        Some(id)
    }

    /// Places a value at a specific id, returning the displaced occupant.
    /// Ids outside the table are ignored and the value is dropped.
    pub fn insert_at(&mut self, id: I, value: T) -> Option<T> {
        let slot = self.slots.get_mut(id.index())?;
        let previous = slot.replace(value);
        if previous.is_none() {
            self.occupied += 1;
        }
        previous
    }

    pub fn remove(&mut self, id: I) -> Option<T> {
        let taken = self.slots.get_mut(id.index())?.take();
        if taken.is_some() {
            self.occupied -= 1;
        }
        taken
    }

    pub fn contains(&self, id: I) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: I) -> Option<&T> {
        self.slots.get(id.index())?.as_ref()
    }

    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.slots.get_mut(id.index())?.as_mut()
    }

    /// Occupied entries in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| Some((I::from_usize(idx), slot.as_ref()?)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (I, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(idx, slot)| Some((I::from_usize(idx), slot.as_mut()?)))
    }

    pub fn ids(&self) -> impl Iterator<Item = I> + '_ {
        self.iter().map(|(id, _)| id)
    }
}

impl<I, T> fmt::Debug for SlotTable<I, T>
where
    I: Idx,
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<I, T> Index<I> for SlotTable<I, T>
where
    I: Idx,
{
    type Output = T;

    fn index(&self, id: I) -> &Self::Output {
        match self.get(id) {
            Some(value) => value,
            None => panic!("no entry for id {:?}", id),
        }
    }
}

impl<I, T> IndexMut<I> for SlotTable<I, T>
where
    I: Idx,
{
    fn index_mut(&mut self, id: I) -> &mut Self::Output {
        match self.slots.get_mut(id.index()).and_then(Option::as_mut) {
            Some(value) => value,
            None => panic!("no entry for id {:?}", id),
        }
    }
}

impl<I, T> Serialize for SlotTable<I, T>
where
    I: Idx,
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.slots.serialize(serializer)
    }
}

impl<'de, I, T> Deserialize<'de> for SlotTable<I, T>
where
    I: Idx,
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let slots = Vec::<Option<T>>::deserialize(deserializer)?;
        let occupied = slots.iter().filter(|slot| slot.is_some()).count();
        Ok(Self {
            slots,
            occupied,
            _marker: PhantomData,
        })
    }
}
