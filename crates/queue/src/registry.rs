use std::collections::HashMap;

/// Names of outstanding tasks.
///
/// Counted, so two tasks sharing a name keep it registered until the
/// last of them finishes.
#[derive(Debug, Default)]
pub(crate) struct NameRegistry {
    counts: HashMap<String, usize>,
}

impl NameRegistry {
    pub(crate) fn insert(&mut self, name: &str) {
        *self.counts.entry(name.to_string()).or_default() += 1;
    }

    /// Drop one registration. Returns `true` if the name is now absent.
    pub(crate) fn remove(&mut self, name: &str) -> bool {
        match self.counts.get_mut(name) {
            Some(count) if *count > 1 => {
                *count -= 1;
                false
            }
            Some(_) => {
                self.counts.remove(name);
                true
            }
            None => true,
        }
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.counts.contains_key(name)
    }

    /// Number of distinct names outstanding.
    pub(crate) fn len(&self) -> usize {
        self.counts.len()
    }
}
