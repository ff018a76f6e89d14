//! Type keys for bean storage and lookup.

use std::any::TypeId;
use std::fmt;

/// Key identifying a type a bean can be looked up or injected as.
///
/// A key exists for every concrete component type and for every additional
/// type (usually a `dyn Trait`) a component declares it provides. Equality and
/// hashing use the `TypeId` only; the name is carried for diagnostics.
///
/// # Examples
///
/// ```rust
/// use ferrous_beans::Key;
///
/// trait Gateway {}
///
/// let concrete = Key::of::<String>();
/// let erased = Key::of::<dyn Gateway>();
///
/// assert_eq!(concrete, Key::of::<String>());
/// assert_ne!(concrete, erased);
/// assert!(erased.display_name().contains("Gateway"));
/// ```
#[derive(Clone, Copy)]
pub struct Key {
    id: TypeId,
    name: &'static str,
}

impl Key {
    /// Key for `T`, which may be unsized (`dyn Trait`).
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The `TypeId` behind this key.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Get the type name for display
    ///
    /// This is the `std::any::type_name` result and is meant for humans only.
    pub fn display_name(&self) -> &'static str {
        self.name
    }

    /// Last path segment of the type name, e.g. `OrderService` for
    /// `app::orders::OrderService`. Generic arguments are kept.
    pub fn short_name(&self) -> &'static str {
        short_type_name(self.name)
    }
}

/// Shortens a `type_name` the way [`Key::short_name`] does.
pub(crate) fn short_type_name(name: &str) -> &str {
    let name = name.strip_prefix("dyn ").unwrap_or(name);

    // auto-trait bounds (`+ Send + Sync`) are cut only at the top level
    let mut depth = 0usize;
    let mut end = name.len();
    let mut prev = ' ';
    for (i, c) in name.char_indices() {
        match c {
            '<' => depth += 1,
            '>' if prev != '-' => depth = depth.saturating_sub(1),
            '+' if depth == 0 => {
                end = i;
                break;
            }
            _ => {}
        }
        prev = c;
    }
    let name = name[..end].trim_end();

    let head = &name[..name.find('<').unwrap_or(name.len())];
    match head.rfind("::") {
        Some(pos) => &name[pos + 2..],
        None => name,
    }
}

impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Key {}

impl std::hash::Hash for Key {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Key").field(&self.name).finish()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[inline(always)]
pub fn key_of_type<T: ?Sized + 'static>() -> Key {
    Key::of::<T>()
}
