//! Typed hierarchical IDs.
//!
//! An [`Id`] is an immutable, validated value addressing one entity under a
//! [`Context`]. Its canonical string form joins the present component values
//! with each component's separator; parsing that string against the same
//! context yields an equal ID.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::{self, DeserializeSeed};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::entity::{Entity, EntityKind};
use crate::{Context, IdError};

/// One present component: the slot it occupies and its value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Segment {
    slot: usize,
    value: String,
}

impl Segment {
    pub(crate) fn new(slot: usize, value: impl Into<String>) -> Self {
        Self {
            slot,
            value: value.into(),
        }
    }
}

/// A validated identifier for an entity of type `T` under a context.
///
/// `T` is a compile-time tag only (see [`entity`](crate::entity)). Two IDs
/// are equal when they share the same context instance and the same ordered
/// component values.
pub struct Id<T> {
    context: Arc<Context>,
    segments: Vec<Segment>,
    _owner: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    pub(crate) fn from_parts(context: Arc<Context>, segments: Vec<Segment>) -> Self {
        Self {
            context,
            segments,
            _owner: PhantomData,
        }
    }

    /// Context this ID was created or parsed against.
    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }

    /// Number of present component values.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Present components as `(name, value)` pairs, in address order.
    ///
    /// A repeatable component yields one pair per repetition.
    pub fn components(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.segments.iter().map(|segment| {
            (
                self.context.spec(segment.slot).name(),
                segment.value.as_str(),
            )
        })
    }

    /// Present component values, in address order.
    pub fn values(&self) -> impl Iterator<Item = &str> + '_ {
        self.segments.iter().map(|segment| segment.value.as_str())
    }

    /// First value of the named component, if present.
    pub fn component(&self, name: &str) -> Option<&str> {
        self.components()
            .find(|(component, _)| *component == name)
            .map(|(_, value)| value)
    }

    /// Every value of the named component (several for a repeatable one).
    pub fn component_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.components()
            .filter(move |(component, _)| *component == name)
            .map(|(_, value)| value)
    }

    /// Value of the deepest present component.
    pub fn last_value(&self) -> &str {
        self.segments
            .last()
            .map(|segment| segment.value.as_str())
            .unwrap_or_default()
    }

    /// Kind of entity the deepest present component addresses.
    pub fn owner(&self) -> Option<EntityKind> {
        self.segments
            .last()
            .map(|segment| self.context.spec(segment.slot).owner())
    }

    /// Derives the ID one level below this one.
    ///
    /// If the deepest present component is repeatable, `value` becomes another
    /// repetition; otherwise it fills the next declared component.
    pub fn child<C: Entity>(&self, value: impl Into<String>) -> Result<Id<C>, IdError> {
        let value = value.into();
        let slot = match self.segments.last() {
            Some(last) if self.context.spec(last.slot).is_repeatable() => last.slot,
            Some(last) => last.slot + 1,
            None => 0,
        };

        if slot >= self.context.components().len() {
            let deepest = self.context.components().len() - 1;
            return Err(IdError::NoChildComponent {
                context: self.context.name().to_string(),
                component: self.context.spec(deepest).name().to_string(),
            });
        }
        self.context.check_value(slot, &value)?;

        let mut segments = self.segments.clone();
        segments.push(Segment::new(slot, value));
        Ok(Id::from_parts(Arc::clone(&self.context), segments))
    }

    /// Drops the deepest component.
    ///
    /// Returns `None` when only one component is present, or when dropping the
    /// last one would leave a required component without a value.
    pub fn parent<P: Entity>(&self) -> Option<Id<P>> {
        let (last, rest) = self.segments.split_last()?;
        let spec = self.context.spec(last.slot);
        let removable = rest.last().is_some_and(|previous| {
            spec.is_optional() || (spec.is_repeatable() && previous.slot == last.slot)
        });
        if !removable {
            return None;
        }
        Some(Id::from_parts(Arc::clone(&self.context), rest.to_vec()))
    }

    /// Returns the compile-time entity kind of this ID.
    pub fn entity_kind() -> EntityKind
    where
        T: Entity,
    {
        T::KIND
    }
}

impl<T: Entity> Id<T> {
    /// Creates an ID from component values; see [`Context::create`].
    pub fn create<I, S>(context: &Arc<Context>, values: I) -> Result<Self, IdError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        context.create(values)
    }

    /// Parses an ID; see [`Context::parse`].
    pub fn parse(context: &Arc<Context>, candidate: &str) -> Result<Self, IdError> {
        context.parse(candidate)
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self::from_parts(Arc::clone(&self.context), self.segments.clone())
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.context, &other.context) && self.segments == other.segments
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.context.name().hash(state);
        self.segments.hash(state);
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut segments = self.segments.iter().peekable();
        while let Some(segment) = segments.next() {
            f.write_str(&segment.value)?;
            if segments.peek().is_some() {
                f.write_str(self.context.spec(segment.slot).separator())?;
            }
        }
        Ok(())
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({}: {:?})", self.context.name(), self.to_string())
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Deserializes an [`Id`] from its string form against a known context.
///
/// ```ignore
/// let id: Id<Group> = IdSeed::new(ids.group()).deserialize(&mut deserializer)?;
/// ```
pub struct IdSeed<'a, T> {
    context: &'a Arc<Context>,
    _owner: PhantomData<fn() -> T>,
}

impl<'a, T> IdSeed<'a, T> {
    pub fn new(context: &'a Arc<Context>) -> Self {
        Self {
            context,
            _owner: PhantomData,
        }
    }
}

impl<'de, T: Entity> DeserializeSeed<'de> for IdSeed<'_, T> {
    type Value = Id<T>;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        self.context.parse(&s).map_err(de::Error::custom)
    }
}
