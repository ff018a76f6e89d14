//! Arena of instantiated beans with a key index.

use std::collections::HashMap;

use crate::instantiate::{Bean, BeanId};
use crate::key::Key;

#[cfg(feature = "ahash")]
type KeyMap<V> = HashMap<Key, V, ahash::RandomState>;
#[cfg(not(feature = "ahash"))]
type KeyMap<V> = HashMap<Key, V>;

/// Every bean of a build, addressable by [`BeanId`], plus an index from each
/// provided key to the beans assignable to it.
///
/// Index entries keep registration order, which is the wiring tie-break order.
#[derive(Debug, Default)]
pub struct BeanArena {
    beans: Vec<Bean>,
    index: KeyMap<Vec<BeanId>>,
}

impl BeanArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a bean, assigning it the next id.
    pub fn push(&mut self, mut bean: Bean) -> BeanId {
        let id = BeanId(self.beans.len());
        bean.set_id(id);
        for key in bean.provided_keys() {
            self.index.entry(key).or_default().push(id);
        }
        self.beans.push(bean);
        id
    }

    pub fn get(&self, id: BeanId) -> Option<&Bean> {
        self.beans.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bean> {
        self.beans.iter()
    }

    pub fn len(&self) -> usize {
        self.beans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beans.is_empty()
    }

    /// Beans assignable to `key`, in registration order.
    pub fn assignable(&self, key: &Key) -> &[BeanId] {
        self.index.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Beans assignable to `key` and accepted by the optional qualifier,
    /// excluding `requester`.
    pub fn candidates(&self, key: &Key, qualifier: Option<&str>, requester: Option<BeanId>) -> Vec<BeanId> {
        self.assignable(key)
            .iter()
            .copied()
            .filter(|id| Some(*id) != requester)
            .filter(|id| match qualifier {
                Some(name) => self.beans[id.0].name() == name,
                None => true,
            })
            .collect()
    }

    /// Names of `ids`, for diagnostics.
    pub fn names(&self, ids: &[BeanId]) -> Vec<String> {
        ids.iter()
            .filter_map(|id| self.get(*id))
            .map(|bean| bean.name().to_string())
            .collect()
    }
}
