//! Structural identity paths for effect cancellation
//!
//! Every effect unit launched on behalf of a collection element is tagged
//! with an [`IdentityPath`]: the chain of (scope name, element key) segments
//! leading from the store root to that element. Removing an element cancels
//! every unit whose path equals or extends the element's path, so nested
//! descendants are torn down together with their ancestor.
//!
//! Paths compare structurally (scope names plus key values), never by
//! reference, and keys of any `Eq + Hash` type can participate.
//!
//! # Example
//!
//! ```ignore
//! use composure::IdentityPath;
//!
//! let root = IdentityPath::root();
//! let row = root.keyed("todos", 3_u64);
//! let timer = row.descend("timer");
//!
//! assert!(timer.starts_with(&row));
//! assert_eq!(row, root.keyed("todos", 3_u64));
//! ```

use std::any::Any;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Object-safe view of a key value: equality, hashing, and debug formatting
/// without knowing the concrete type.
trait ErasedKey: Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;

    fn eq_erased(&self, other: &dyn ErasedKey) -> bool;

    fn hash_erased(&self) -> u64;

    fn fmt_erased(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl<K> ErasedKey for K
where
    K: Eq + Hash + fmt::Debug + Send + Sync + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_erased(&self, other: &dyn ErasedKey) -> bool {
        other
            .as_any()
            .downcast_ref::<K>()
            .is_some_and(|other| self == other)
    }

    fn hash_erased(&self) -> u64 {
        // Mix in the type id so equal bit patterns of different key types
        // land in different buckets.
        let mut hasher = DefaultHasher::new();
        std::any::TypeId::of::<K>().hash(&mut hasher);
        self.hash(&mut hasher);
        hasher.finish()
    }

    fn fmt_erased(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A type-erased, clonable element key.
///
/// Two tokens are equal iff they wrap the same concrete type and the wrapped
/// values compare equal. Tokens of different key types are never equal.
#[derive(Clone)]
pub struct KeyToken {
    key: Arc<dyn ErasedKey>,
    hash: u64,
}

impl KeyToken {
    /// Wrap a key value.
    pub fn new<K>(key: K) -> Self
    where
        K: Eq + Hash + fmt::Debug + Send + Sync + 'static,
    {
        let hash = key.hash_erased();
        Self {
            key: Arc::new(key),
            hash,
        }
    }
}

impl PartialEq for KeyToken {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.key.eq_erased(&*other.key)
    }
}

impl Eq for KeyToken {}

impl Hash for KeyToken {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl fmt::Debug for KeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.key.fmt_erased(f)
    }
}

/// One segment of an identity path: a named scope, optionally narrowed to a
/// single collection element.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct IdentityStep {
    scope: &'static str,
    key: Option<KeyToken>,
}

impl IdentityStep {
    /// The scope name this segment was created with.
    pub fn scope(&self) -> &'static str {
        self.scope
    }
}

impl fmt::Display for IdentityStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{}[{:?}]", self.scope, key),
            None => f.write_str(self.scope),
        }
    }
}

/// An immutable, appendable sequence of identity segments.
///
/// The path serves two roles:
/// - the ambient navigation path handed to every [`Reducer::reduce`] call,
///   extended as combinators descend into child domains;
/// - the cancellation token attached to effect units, compared structurally
///   when a cancellation runs.
///
/// Appending returns a new path; the receiver is never mutated.
///
/// [`Reducer::reduce`]: crate::Reducer::reduce
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct IdentityPath {
    steps: Vec<IdentityStep>,
}

impl IdentityPath {
    /// The empty path: the store's top-level scope.
    pub fn root() -> Self {
        Self::default()
    }

    /// Append an unkeyed segment, entering a named child domain.
    ///
    /// Also the way reducers mint cancellation IDs for their own effects:
    /// `path.descend("timer")` is rooted at the current scope, so an
    /// ancestor removing this scope tears the timer down as well.
    #[must_use]
    pub fn descend(&self, scope: &'static str) -> Self {
        self.push(IdentityStep { scope, key: None })
    }

    /// Append a keyed segment, entering one collection element's domain.
    #[must_use]
    pub fn keyed<K>(&self, scope: &'static str, key: K) -> Self
    where
        K: Eq + Hash + fmt::Debug + Send + Sync + 'static,
    {
        self.push(IdentityStep {
            scope,
            key: Some(KeyToken::new(key)),
        })
    }

    fn push(&self, step: IdentityStep) -> Self {
        let mut steps = Vec::with_capacity(self.steps.len() + 1);
        steps.extend(self.steps.iter().cloned());
        steps.push(step);
        Self { steps }
    }

    /// Whether `self` equals `prefix` or structurally extends it.
    ///
    /// This is the subtree-cancellation predicate: cancelling a path cancels
    /// every unit whose tag starts with it.
    pub fn starts_with(&self, prefix: &IdentityPath) -> bool {
        self.steps.len() >= prefix.steps.len()
            && self.steps[..prefix.steps.len()] == prefix.steps[..]
    }

    /// Whether this is the root (empty) path.
    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.steps.len()
    }

    /// The segments, root first.
    pub fn steps(&self) -> &[IdentityStep] {
        &self.steps
    }
}

impl fmt::Display for IdentityPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return f.write_str("/");
        }
        for step in &self.steps {
            write!(f, "/{}", step)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_token_structural_equality() {
        let a = KeyToken::new(7_u64);
        let b = KeyToken::new(7_u64);
        let c = KeyToken::new(8_u64);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_key_token_type_mismatch_never_equal() {
        let int = KeyToken::new(7_u64);
        let string = KeyToken::new("7".to_string());

        assert_ne!(int, string);
    }

    #[test]
    fn test_equal_tokens_hash_equal() {
        let a = KeyToken::new("row".to_string());
        let b = KeyToken::new("row".to_string());

        let hash = |token: &KeyToken| {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            hasher.finish()
        };
        assert_eq!(hash(&a), hash(&b));
    }

    #[test]
    fn test_path_append_is_value_semantics() {
        let root = IdentityPath::root();
        let child = root.keyed("todos", 1_u64);

        assert!(root.is_root());
        assert_eq!(child.depth(), 1);
        assert_ne!(root, child);
    }

    #[test]
    fn test_paths_compare_structurally() {
        let a = IdentityPath::root().keyed("todos", 3_u64).descend("timer");
        let b = IdentityPath::root().keyed("todos", 3_u64).descend("timer");
        let c = IdentityPath::root().keyed("todos", 4_u64).descend("timer");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_starts_with() {
        let root = IdentityPath::root();
        let row = root.keyed("todos", 3_u64);
        let timer = row.descend("timer");
        let sibling = root.keyed("todos", 4_u64);

        assert!(row.starts_with(&root));
        assert!(timer.starts_with(&row));
        assert!(timer.starts_with(&timer));
        assert!(!row.starts_with(&timer));
        assert!(!sibling.starts_with(&row));
    }

    #[test]
    fn test_display() {
        let path = IdentityPath::root().keyed("todos", 3_u64).descend("timer");
        assert_eq!(path.to_string(), "/todos[3]/timer");
        assert_eq!(IdentityPath::root().to_string(), "/");
    }
}
