use std::collections::HashSet;
use std::hash::Hash;

use crate::entity::Entity;

/// Makes sure every present entity of `must_include` appears in `candidates`.
///
/// Entities whose identifier is missing from `candidates` are prepended, in
/// the order given, ahead of the untouched candidates. Entities without an
/// identifier cannot be tracked and are skipped. When nothing is left to
/// include, `candidates` comes back as is.
pub fn reconcile<E, I>(candidates: Vec<E>, must_include: I) -> Vec<E>
where
    E: Entity,
    I: IntoIterator<Item = Option<E>>,
{
    reconcile_by(candidates, must_include, E::id)
}

/// [`reconcile`] with an explicit identifier accessor.
pub fn reconcile_by<E, K, I, F>(candidates: Vec<E>, must_include: I, key: F) -> Vec<E>
where
    K: Eq + Hash,
    I: IntoIterator<Item = Option<E>>,
    F: Fn(&E) -> Option<K>,
{
    let wanted: Vec<E> = must_include.into_iter().flatten().collect();
    if wanted.is_empty() {
        return candidates;
    }

    let mut seen: HashSet<K> = candidates.iter().filter_map(&key).collect();
    let mut merged: Vec<E> = wanted
        .into_iter()
        .filter(|entity| match key(entity) {
            Some(id) => seen.insert(id),
            None => false,
        })
        .collect();

    if merged.is_empty() {
        return candidates;
    }
    merged.extend(candidates);
    merged
}
