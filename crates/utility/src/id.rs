use std::{cmp, fmt, hash, marker::PhantomData};

use serde::{Deserialize, Serialize};

pub trait HasId {
    type IdType;
}

/// Identifier tagged with the type it identifies, so ids of different
/// entities can not be mixed up.
pub struct Id<T: HasId>(T::IdType, PhantomData<T>);

impl<T: HasId> Id<T> {
    pub fn new(inner: T::IdType) -> Self {
        Self(inner, PhantomData)
    }
}

impl<T: HasId> Id<T>
where
    T::IdType: Clone,
{
    pub fn raw(&self) -> T::IdType {
        self.0.clone()
    }
}

/// Hands out strictly increasing numeric ids, starting at 1.
pub struct IdSequence<T: HasId<IdType = u64>> {
    last: u64,
    _phantom: PhantomData<T>,
}

impl<T: HasId<IdType = u64>> IdSequence<T> {
    pub fn new() -> Self {
        Self::starting_after(0)
    }

    /// Continues after `last`; the next id handed out is `last + 1`.
    pub fn starting_after(last: u64) -> Self {
        Self {
            last,
            _phantom: PhantomData,
        }
    }

    /// `None` once `u64::MAX` has been handed out.
    pub fn next_id(&mut self) -> Option<Id<T>> {
        self.last = self.last.checked_add(1)?;
        Some(Id::new(self.last))
    }

    /// Makes sure `id` is never handed out again.
    pub fn advance_past(&mut self, id: &Id<T>) {
        self.last = self.last.max(id.0);
    }
}

impl<T: HasId<IdType = u64>> Clone for IdSequence<T> {
    fn clone(&self) -> Self {
        Self::starting_after(self.last)
    }
}

impl<T: HasId<IdType = u64>> fmt::Debug for IdSequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdSequence").field("last", &self.last).finish()
    }
}

impl<T: HasId<IdType = u64>> Default for IdSequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: HasId> fmt::Debug for Id<T>
where
    T::IdType: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Id").field(&self.0).finish()
    }
}

impl<T: HasId> fmt::Display for Id<T>
where
    T::IdType: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<T: HasId> Clone for Id<T>
where
    T::IdType: Clone,
{
    fn clone(&self) -> Self {
        Self(self.0.clone(), PhantomData)
    }
}

impl<T: HasId> Copy for Id<T> where T::IdType: Copy {}

impl<T: HasId> hash::Hash for Id<T>
where
    T::IdType: hash::Hash,
{
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl<T: HasId> PartialEq for Id<T>
where
    T::IdType: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl<T: HasId> Eq for Id<T> where T::IdType: Eq {}

impl<T: HasId> PartialOrd for Id<T>
where
    T::IdType: Ord,
{
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: HasId> Ord for Id<T>
where
    T::IdType: Ord,
{
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl<'de, T: HasId> Deserialize<'de> for Id<T>
where
    T::IdType: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        T::IdType::deserialize(deserializer).map(|id| Id::new(id))
    }
}

impl<T: HasId> Serialize for Id<T>
where
    T::IdType: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}
