//! Context schemas.
//!
//! A [`Context`] is the immutable schema for one addressing scheme: an ordered
//! list of named components, each with a validation pattern, a cardinality,
//! and the separator that joins it to the next component. Contexts are built
//! once through [`ContextBuilder`] and shared (`Arc`) by every [`Id`] created
//! or parsed against them.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::entity::{Entity, EntityKind};
use crate::id::{Id, Segment};
use crate::IdError;

/// Separator used when a context does not configure one.
pub const DEFAULT_SEPARATOR: &str = "-";

/// How many values a component slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// Exactly one value.
    Required,
    /// Zero or one value.
    Optional,
    /// One or more like-shaped values; only allowed as the last component.
    Repeatable,
}

impl Cardinality {
    /// Returns the snake_case name of this cardinality.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Cardinality::Required => "required",
            Cardinality::Optional => "optional",
            Cardinality::Repeatable => "repeatable",
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One slot of a context schema.
#[derive(Debug, Clone)]
pub struct ComponentSpec {
    name: String,
    owner: EntityKind,
    pattern: String,
    matcher: Regex,
    cardinality: Cardinality,
    separator: String,
}

impl ComponentSpec {
    /// Component name, unique within its context.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind of entity this component addresses.
    pub fn owner(&self) -> EntityKind {
        self.owner
    }

    /// Pattern source as declared.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    /// Separator placed after this component's value when another follows.
    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn is_optional(&self) -> bool {
        self.cardinality == Cardinality::Optional
    }

    pub fn is_repeatable(&self) -> bool {
        self.cardinality == Cardinality::Repeatable
    }

    /// Returns true if the whole of `value` matches this component's pattern.
    pub fn matches(&self, value: &str) -> bool {
        self.matcher.is_match(value)
    }
}

/// Immutable schema for one category of identifiers.
#[derive(Debug)]
pub struct Context {
    name: String,
    default_separator: String,
    truncate_on_missing_optional: bool,
    components: Vec<ComponentSpec>,
}

impl Context {
    /// Starts building a context with the given scheme name.
    pub fn builder(name: impl Into<String>) -> ContextBuilder {
        ContextBuilder::new(name)
    }

    /// Scheme name (e.g. `portlet`, `group`).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_separator(&self) -> &str {
        &self.default_separator
    }

    /// Whether parsing stops at the first absent optional component.
    pub fn truncates_on_missing_optional(&self) -> bool {
        self.truncate_on_missing_optional
    }

    /// Declared components, in address order.
    pub fn components(&self) -> &[ComponentSpec] {
        &self.components
    }

    /// Looks up a component by name.
    pub fn component(&self, name: &str) -> Option<&ComponentSpec> {
        self.components.iter().find(|spec| spec.name == name)
    }

    /// Position of a component in address order.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.components.iter().position(|spec| spec.name == name)
    }

    pub(crate) fn spec(&self, slot: usize) -> &ComponentSpec {
        &self.components[slot]
    }

    /// Creates an ID from one value per component, in declared order.
    ///
    /// Trailing optional components may be omitted. A trailing repeatable
    /// component takes every remaining value (at least one).
    pub fn create<T, I, S>(self: &Arc<Self>, values: I) -> Result<Id<T>, IdError>
    where
        T: Entity,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        match self.create_segments(values) {
            Ok(segments) => {
                let id = Id::from_parts(Arc::clone(self), segments);
                trace!(context = %self.name, id = %id, "created id");
                Ok(id)
            }
            Err(e) => {
                debug!(context = %self.name, error = %e, "rejected id values");
                Err(e)
            }
        }
    }

    /// Parses a candidate string into an ID of this context.
    pub fn parse<T: Entity>(self: &Arc<Self>, candidate: &str) -> Result<Id<T>, IdError> {
        match self.parse_segments(candidate) {
            Ok(segments) => {
                trace!(context = %self.name, input = candidate, "parsed id");
                Ok(Id::from_parts(Arc::clone(self), segments))
            }
            Err(e) => {
                debug!(context = %self.name, error = %e, "failed to parse id");
                Err(e)
            }
        }
    }

    /// Checks a value against the component at `slot`.
    ///
    /// Besides the pattern, a delimited value must not contain its
    /// separator, nor end in a way that forms the separator early once the
    /// separator is appended (`x:` followed by `::`). Only the final
    /// non-repeatable slot is exempt.
    pub(crate) fn check_value(&self, slot: usize, value: &str) -> Result<(), IdError> {
        let spec = &self.components[slot];
        if !spec.matches(value) {
            return Err(IdError::PatternMismatch {
                context: self.name.clone(),
                component: spec.name.clone(),
                pattern: spec.pattern.clone(),
                value: value.to_string(),
            });
        }

        let delimited = spec.is_repeatable() || slot + 1 < self.components.len();
        let separator = spec.separator.as_str();
        if delimited && format!("{value}{separator}").find(separator) != Some(value.len()) {
            return Err(IdError::ReservedSeparator {
                context: self.name.clone(),
                component: spec.name.clone(),
                separator: spec.separator.clone(),
                value: value.to_string(),
            });
        }

        Ok(())
    }

    fn create_segments(&self, values: Vec<String>) -> Result<Vec<Segment>, IdError> {
        let supplied = values.len();
        let mut values = values.into_iter();
        let mut segments = Vec::with_capacity(supplied);

        for (slot, spec) in self.components.iter().enumerate() {
            if spec.is_repeatable() {
                let mut any = false;
                for value in values.by_ref() {
                    self.check_value(slot, &value)?;
                    segments.push(Segment::new(slot, value));
                    any = true;
                }
                if !any {
                    return Err(self.missing_required(slot));
                }
                break;
            }

            match values.next() {
                Some(value) => {
                    self.check_value(slot, &value)?;
                    segments.push(Segment::new(slot, value));
                }
                None => {
                    if let Some(required) = self.first_required_from(slot) {
                        return Err(self.missing_required(required));
                    }
                    break;
                }
            }
        }

        if values.next().is_some() {
            return Err(IdError::TooManyValues {
                context: self.name.clone(),
                expected: self.components.len(),
                actual: supplied,
            });
        }
        if segments.is_empty() {
            return Err(self.missing_required(0));
        }

        Ok(segments)
    }

    fn parse_segments(&self, candidate: &str) -> Result<Vec<Segment>, IdError> {
        let last = self.components.len() - 1;
        let mut rest = Some(candidate);
        let mut segments = Vec::new();

        for (slot, spec) in self.components.iter().enumerate() {
            if spec.is_repeatable() {
                let Some(text) = rest.take() else {
                    return Err(self.missing_segment(slot, candidate));
                };
                for piece in text.split(spec.separator.as_str()) {
                    if !spec.matches(piece) {
                        return Err(self.invalid_segment(slot, piece, candidate));
                    }
                    segments.push(Segment::new(slot, piece));
                }
                break;
            }

            let (segment, remainder) = match rest {
                None => (None, None),
                Some(text) if slot == last => (Some(text), None),
                Some(text) => match text.split_once(spec.separator.as_str()) {
                    Some((head, tail)) => (Some(head), Some(tail)),
                    None => (Some(text), None),
                },
            };

            match segment {
                Some(value) if spec.matches(value) => {
                    segments.push(Segment::new(slot, value));
                    rest = remainder;
                }
                _ if spec.is_optional() => {
                    if self.truncate_on_missing_optional {
                        if let Some(required) = self.first_required_from(slot) {
                            return Err(self.missing_segment(required, candidate));
                        }
                        rest = None;
                        break;
                    }
                    // Absent: the segment stays available for the next component.
                }
                Some(value) => return Err(self.invalid_segment(slot, value, candidate)),
                None => return Err(self.missing_segment(slot, candidate)),
            }
        }

        if let Some(trailing) = rest {
            return Err(IdError::TrailingContent {
                context: self.name.clone(),
                trailing: trailing.to_string(),
                input: candidate.to_string(),
            });
        }
        if segments.is_empty() {
            return Err(self.missing_segment(0, candidate));
        }

        Ok(segments)
    }

    fn first_required_from(&self, slot: usize) -> Option<usize> {
        self.components[slot..]
            .iter()
            .position(|spec| !spec.is_optional())
            .map(|offset| slot + offset)
    }

    fn missing_required(&self, slot: usize) -> IdError {
        IdError::MissingRequired {
            context: self.name.clone(),
            component: self.components[slot].name.clone(),
        }
    }

    fn missing_segment(&self, slot: usize, input: &str) -> IdError {
        IdError::MissingSegment {
            context: self.name.clone(),
            component: self.components[slot].name.clone(),
            input: input.to_string(),
        }
    }

    fn invalid_segment(&self, slot: usize, segment: &str, input: &str) -> IdError {
        let spec = &self.components[slot];
        IdError::InvalidSegment {
            context: self.name.clone(),
            component: spec.name.clone(),
            pattern: spec.pattern.clone(),
            segment: segment.to_string(),
            input: input.to_string(),
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// =============================================================================
// Builder
// =============================================================================

#[derive(Debug, Clone)]
struct PendingComponent {
    name: String,
    owner: EntityKind,
    pattern: String,
    cardinality: Cardinality,
    separator: Option<String>,
}

/// Incrementally declares the components of a [`Context`] in address order.
///
/// Nothing is validated until [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    name: String,
    default_separator: String,
    truncate_on_missing_optional: bool,
    components: Vec<PendingComponent>,
    dangling_separator: bool,
}

impl ContextBuilder {
    /// Creates an empty builder for the named scheme.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_separator: DEFAULT_SEPARATOR.to_string(),
            truncate_on_missing_optional: false,
            components: Vec::new(),
            dangling_separator: false,
        }
    }

    /// Declares a component that must always be present.
    pub fn required_component<T: Entity>(
        self,
        name: impl Into<String>,
        pattern: impl Into<String>,
    ) -> Self {
        self.component(name, T::KIND, pattern, Cardinality::Required)
    }

    /// Declares a component that may be absent.
    pub fn optional_component<T: Entity>(
        self,
        name: impl Into<String>,
        pattern: impl Into<String>,
    ) -> Self {
        self.component(name, T::KIND, pattern, Cardinality::Optional)
    }

    /// Declares a trailing component holding one or more path segments.
    pub fn required_unbounded_hierarchical_component<T: Entity>(
        self,
        name: impl Into<String>,
        pattern: impl Into<String>,
    ) -> Self {
        self.component(name, T::KIND, pattern, Cardinality::Repeatable)
    }

    /// Declares a component with an explicit runtime owner kind.
    pub fn component(
        mut self,
        name: impl Into<String>,
        owner: EntityKind,
        pattern: impl Into<String>,
        cardinality: Cardinality,
    ) -> Self {
        self.components.push(PendingComponent {
            name: name.into(),
            owner,
            pattern: pattern.into(),
            cardinality,
            separator: None,
        });
        self
    }

    /// Sets the separator used by components without their own.
    pub fn with_default_separator(mut self, separator: impl Into<String>) -> Self {
        self.default_separator = separator.into();
        self
    }

    /// Overrides the separator following the most recently declared component.
    pub fn with_component_separator(mut self, separator: impl Into<String>) -> Self {
        match self.components.last_mut() {
            Some(component) => component.separator = Some(separator.into()),
            None => self.dangling_separator = true,
        }
        self
    }

    /// Stop parsing at the first absent optional component.
    pub fn ignore_remaining_after_first_missing_optional(mut self) -> Self {
        self.truncate_on_missing_optional = true;
        self
    }

    /// Validates the schema and produces the shared, immutable context.
    pub fn build(self) -> Result<Arc<Context>, IdError> {
        let context = self.name;

        if self.dangling_separator {
            return Err(IdError::DanglingSeparator { context });
        }
        if self.components.is_empty() {
            return Err(IdError::NoComponents { context });
        }

        let count = self.components.len();
        let mut seen = HashSet::with_capacity(count);
        let mut repeatable: Option<String> = None;
        let mut components = Vec::with_capacity(count);

        for (slot, pending) in self.components.into_iter().enumerate() {
            if !seen.insert(pending.name.clone()) {
                return Err(IdError::DuplicateComponent {
                    context,
                    component: pending.name,
                });
            }
            if let Some(repeatable) = &repeatable {
                return Err(IdError::RepeatableNotLast {
                    context,
                    component: pending.name,
                    repeatable: repeatable.clone(),
                });
            }
            if pending.cardinality == Cardinality::Repeatable {
                repeatable = Some(pending.name.clone());
            }

            let matcher = Regex::new(&format!("^(?:{})$", pending.pattern)).map_err(|e| {
                IdError::InvalidPattern {
                    context: context.clone(),
                    component: pending.name.clone(),
                    message: e.to_string(),
                }
            })?;

            let separator = pending
                .separator
                .unwrap_or_else(|| self.default_separator.clone());
            let delimited = pending.cardinality == Cardinality::Repeatable || slot + 1 < count;
            if delimited && separator.is_empty() {
                return Err(IdError::EmptySeparator {
                    context,
                    component: pending.name,
                });
            }

            components.push(ComponentSpec {
                name: pending.name,
                owner: pending.owner,
                pattern: pending.pattern,
                matcher,
                cardinality: pending.cardinality,
                separator,
            });
        }

        debug!(
            context = %context,
            components = components.len(),
            truncate = self.truncate_on_missing_optional,
            "built context"
        );

        Ok(Arc::new(Context {
            name: context,
            default_separator: self.default_separator,
            truncate_on_missing_optional: self.truncate_on_missing_optional,
            components,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Group, PortalObject, User};

    fn three_level() -> Arc<Context> {
        Context::builder("three")
            .with_default_separator(".")
            .required_component::<PortalObject>("a", "[a-z]+")
            .optional_component::<PortalObject>("b", "[0-9]+")
            .optional_component::<PortalObject>("c", "[a-z]+")
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_rejects_duplicate_names() {
        let err = Context::builder("dup")
            .required_component::<User>("name", ".*")
            .optional_component::<User>("name", ".*")
            .build()
            .unwrap_err();
        assert!(matches!(err, IdError::DuplicateComponent { .. }));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_build_rejects_repeatable_not_last() {
        let err = Context::builder("bad")
            .required_unbounded_hierarchical_component::<Group>("path", ".*")
            .required_component::<User>("member", ".*")
            .build()
            .unwrap_err();
        assert!(matches!(err, IdError::RepeatableNotLast { .. }));
    }

    #[test]
    fn test_build_rejects_invalid_pattern() {
        let err = Context::builder("bad")
            .required_component::<User>("name", "[unclosed")
            .build()
            .unwrap_err();
        assert!(matches!(err, IdError::InvalidPattern { .. }));
    }

    #[test]
    fn test_build_rejects_empty_separator_between_components() {
        let err = Context::builder("bad")
            .with_default_separator("")
            .required_component::<User>("a", ".*")
            .required_component::<User>("b", ".*")
            .build()
            .unwrap_err();
        assert!(matches!(err, IdError::EmptySeparator { .. }));

        // A lone component never needs its separator.
        assert!(Context::builder("ok")
            .with_default_separator("")
            .required_component::<User>("a", ".*")
            .build()
            .is_ok());
    }

    #[test]
    fn test_build_rejects_empty_and_dangling() {
        let err = Context::builder("empty").build().unwrap_err();
        assert!(matches!(err, IdError::NoComponents { .. }));

        let err = Context::builder("dangling")
            .with_component_separator("/")
            .required_component::<User>("a", ".*")
            .build()
            .unwrap_err();
        assert!(matches!(err, IdError::DanglingSeparator { .. }));
    }

    #[test]
    fn test_default_separator_applies_to_earlier_components() {
        let context = Context::builder("late")
            .required_component::<User>("a", ".*")
            .optional_component::<User>("b", ".*")
            .with_default_separator("_m:")
            .build()
            .unwrap();
        assert_eq!(context.spec(0).separator(), "_m:");
    }

    #[test]
    fn test_component_separator_override() {
        let context = Context::builder("mixed")
            .with_default_separator("/")
            .required_component::<User>("a", "[a-z]+")
            .with_component_separator(":")
            .required_component::<User>("b", "[a-z]+")
            .required_component::<User>("c", "[a-z]+")
            .build()
            .unwrap();

        let id: Id<User> = context.create(["x", "y", "z"]).unwrap();
        assert_eq!(id.to_string(), "x:y/z");
        assert_eq!(context.parse::<User>("x:y/z").unwrap(), id);
    }

    #[test]
    fn test_create_validates_in_order() {
        let context = three_level();
        let err = context
            .create::<PortalObject, _, _>(["a", "x", "NOPE"])
            .unwrap_err();
        assert_eq!(err.component(), Some("b"));
        assert!(err.is_validation_error());
    }

    #[test]
    fn test_create_missing_and_surplus_values() {
        let context = three_level();
        let empty: [&str; 0] = [];
        let err = context.create::<PortalObject, _, _>(empty).unwrap_err();
        assert!(matches!(err, IdError::MissingRequired { .. }));

        let err = context
            .create::<PortalObject, _, _>(["a", "1", "b", "extra"])
            .unwrap_err();
        assert!(matches!(
            err,
            IdError::TooManyValues {
                expected: 3,
                actual: 4,
                ..
            }
        ));
    }

    #[test]
    fn test_create_rejects_value_containing_its_separator() {
        let context = Context::builder("pair")
            .with_default_separator("/")
            .required_component::<User>("a", ".*")
            .required_component::<User>("b", ".*")
            .build()
            .unwrap();

        let err = context.create::<User, _, _>(["x/y", "z"]).unwrap_err();
        assert!(matches!(err, IdError::ReservedSeparator { .. }));

        // The final component may contain it.
        let id: Id<User> = context.create(["x", "y/z"]).unwrap();
        assert_eq!(context.parse::<User>(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn test_create_rejects_value_overlapping_its_separator() {
        let context = Context::builder("pair")
            .with_default_separator("::")
            .required_component::<User>("a", ".*")
            .required_component::<User>("b", ".*")
            .build()
            .unwrap();

        let err = context.create::<User, _, _>(["x:", "y"]).unwrap_err();
        assert!(matches!(err, IdError::ReservedSeparator { ref value, .. } if value == "x:"));
        assert!(err.is_validation_error());

        let id: Id<User> = context.create([":x", "y:"]).unwrap();
        assert_eq!(id.to_string(), ":x::y:");
        assert_eq!(context.parse::<User>(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn test_repeatable_rejects_value_overlapping_its_separator() {
        let context = Context::builder("path")
            .with_default_separator("::")
            .required_unbounded_hierarchical_component::<Group>("segment", ".*")
            .build()
            .unwrap();

        let err = context.create::<Group, _, _>(["a:", "b"]).unwrap_err();
        assert!(matches!(err, IdError::ReservedSeparator { .. }));

        // The last segment is delimited too, so a later child stays unambiguous.
        let err = context.create::<Group, _, _>(["a", "b:"]).unwrap_err();
        assert!(matches!(err, IdError::ReservedSeparator { .. }));

        let parent: Id<Group> = context.create(["a"]).unwrap();
        let err = parent.child::<Group>("b:".to_string()).unwrap_err();
        assert!(matches!(err, IdError::ReservedSeparator { .. }));

        let id: Id<Group> = context.create([":a", "b"]).unwrap();
        assert_eq!(context.parse::<Group>(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn test_missing_required_after_optional() {
        let context = Context::builder("gap")
            .required_component::<User>("a", ".*")
            .optional_component::<User>("b", "[0-9]+")
            .required_component::<User>("c", ".*")
            .build()
            .unwrap();
        let err = context.create::<User, _, _>(["x"]).unwrap_err();
        assert_eq!(err.component(), Some("c"));
    }

    #[test]
    fn test_parse_skips_unmatched_optional() {
        let context = three_level();
        let id: Id<PortalObject> = context.parse("abc.def").unwrap();
        let names: Vec<_> = id.components().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(id.to_string(), "abc.def");
    }

    #[test]
    fn test_parse_errors() {
        let context = three_level();
        let err = context.parse::<PortalObject>("ABC").unwrap_err();
        assert!(matches!(err, IdError::InvalidSegment { .. }));
        assert!(err.is_parse_error());

        let err = context.parse::<PortalObject>("abc.1.def.ghi").unwrap_err();
        assert!(matches!(err, IdError::TrailingContent { .. }));
    }

    #[test]
    fn test_parse_missing_required_segment() {
        let context = Context::builder("pair")
            .with_default_separator("/")
            .required_component::<User>("a", ".*")
            .required_component::<User>("b", ".*")
            .build()
            .unwrap();
        let err = context.parse::<User>("only").unwrap_err();
        assert!(matches!(err, IdError::MissingSegment { .. }));
        assert_eq!(err.component(), Some("b"));
    }

    #[test]
    fn test_truncation_stops_consuming() {
        let context = Context::builder("trunc")
            .with_default_separator(".")
            .required_component::<PortalObject>("a", "[a-z]+")
            .optional_component::<PortalObject>("b", "[0-9]+")
            .optional_component::<PortalObject>("c", "[a-z]+")
            .ignore_remaining_after_first_missing_optional()
            .build()
            .unwrap();

        let id: Id<PortalObject> = context.parse("abc.def").unwrap();
        assert_eq!(id.depth(), 1);
        assert_eq!(id.to_string(), "abc");
    }

    #[test]
    fn test_repeatable_requires_one_value() {
        let context = Context::builder("path")
            .with_default_separator("/")
            .required_unbounded_hierarchical_component::<Group>("segment", "[a-z]+")
            .build()
            .unwrap();

        let empty: Vec<String> = Vec::new();
        let err = context.create::<Group, _, _>(empty).unwrap_err();
        assert!(matches!(err, IdError::MissingRequired { .. }));

        let err = context.parse::<Group>("a/B/c").unwrap_err();
        assert!(matches!(err, IdError::InvalidSegment { ref segment, .. } if segment == "B"));
    }

    #[test]
    fn test_contexts_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Context>();
        assert_send_sync::<Id<User>>();
    }
}
