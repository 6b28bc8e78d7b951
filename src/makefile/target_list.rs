use linked_hash_set::LinkedHashSet;

/// An ordered list of unique target names.
///
/// Names keep the order in which they were first inserted, later duplicates
/// are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetList {
    names: LinkedHashSet<String>,
}

impl TargetList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a name, returns `false` if it was already present.
    pub fn insert(&mut self, name: &str) -> bool {
        if self.names.contains(name) {
            return false;
        }
        self.names.insert(name.to_string())
    }

    /// Appends the names of `other` that are not already in this list,
    /// preserving their order.
    pub fn merge(&mut self, other: TargetList) {
        for name in other.names {
            if !self.names.contains(&name) {
                self.names.insert(name);
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Reorders the list lexicographically (byte order).
    pub fn sorted(self) -> Self {
        let mut names = self.into_vec();
        names.sort_unstable();
        names.into_iter().collect()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.names.into_iter().collect()
    }
}

impl FromIterator<String> for TargetList {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut list = Self::new();
        for name in iter {
            if !list.names.contains(&name) {
                list.names.insert(name);
            }
        }
        list
    }
}

impl IntoIterator for TargetList {
    type Item = String;
    type IntoIter = <LinkedHashSet<String> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.names.into_iter()
    }
}
