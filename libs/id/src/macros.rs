//! Macros for defining entity marker types.

/// Macro to define a zero-sized marker type for an addressable entity.
///
/// This generates a unit struct with:
/// - An [`Entity`](crate::Entity) implementation carrying its [`EntityKind`](crate::EntityKind)
/// - `Debug`, `Clone`, `Copy`, `Default`, `Eq`, `Ord`, and `Hash`
///
/// The marker is only ever used as the type parameter of [`Id`](crate::Id);
/// it is never instantiated by the library.
///
/// # Example
///
/// ```ignore
/// define_entity!(
///     /// A portal user.
///     User, User
/// );
///
/// let id: Id<User> = ids.user_id("root")?;
/// ```
#[macro_export]
macro_rules! define_entity {
    ($(#[$meta:meta])* $name:ident, $kind:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name;

        impl $crate::Entity for $name {
            const KIND: $crate::EntityKind = $crate::EntityKind::$kind;
        }
    };
}
