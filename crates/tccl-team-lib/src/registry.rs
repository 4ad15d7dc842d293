//! Team library registry: loaded team libraries in discovery order.

use crate::descriptor::TeamLib;

/// Number of slots the backing storage grows by when full.
pub const GROWTH_CHUNK: usize = 8;

/// Ordered collection of loaded team libraries.
///
/// Entries keep discovery order; compaction removes without reordering.
/// Names are not required to be unique.
#[derive(Debug, Default)]
pub struct TeamLibRegistry {
    libs: Vec<TeamLib>,
}

impl TeamLibRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self { libs: Vec::new() }
    }

    /// Appends a team library, growing storage by [`GROWTH_CHUNK`] slots
    /// when full.
    pub fn push(&mut self, team_lib: TeamLib) {
        if self.libs.len() == self.libs.capacity() {
            self.libs.reserve_exact(GROWTH_CHUNK);
        }
        self.libs.push(team_lib);
    }

    /// Removes every entry failing `keep` and returns the removed entries in
    /// discovery order. Survivors keep their relative order and the backing
    /// storage is shrunk to fit them.
    ///
    /// Removed entries are owned by the caller, which is responsible for
    /// releasing them.
    pub fn compact<F>(&mut self, mut keep: F) -> Vec<TeamLib>
    where
        F: FnMut(&TeamLib) -> bool,
    {
        let mut survivors = Vec::with_capacity(self.libs.len());
        let mut removed = Vec::new();

        for team_lib in self.libs.drain(..) {
            if keep(&team_lib) {
                survivors.push(team_lib);
            } else {
                removed.push(team_lib);
            }
        }

        survivors.shrink_to_fit();
        self.libs = survivors;
        removed
    }

    /// Number of team libraries.
    pub fn len(&self) -> usize {
        self.libs.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.libs.is_empty()
    }

    /// Allocated slots.
    pub fn capacity(&self) -> usize {
        self.libs.capacity()
    }

    /// Team library at `index`.
    pub fn get(&self, index: usize) -> Option<&TeamLib> {
        self.libs.get(index)
    }

    /// First team library named `name`.
    pub fn find(&self, name: &str) -> Option<&TeamLib> {
        self.libs.iter().find(|lib| lib.name() == name)
    }

    /// Iterates in discovery order.
    pub fn iter(&self) -> std::slice::Iter<'_, TeamLib> {
        self.libs.iter()
    }

    /// Display names in discovery order.
    pub fn names(&self) -> Vec<&str> {
        self.libs.iter().map(|lib| lib.name()).collect()
    }
}

impl<'a> IntoIterator for &'a TeamLibRegistry {
    type Item = &'a TeamLib;
    type IntoIter = std::slice::Iter<'a, TeamLib>;

    fn into_iter(self) -> Self::IntoIter {
        self.libs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{ModuleLoader, load_team_lib};
    use crate::mock::{MockEvent, MockLoader};
    use std::path::PathBuf;
    use tccl_core::types::CapabilitySet;

    fn registry_of(names: &[String]) -> (TeamLibRegistry, MockLoader) {
        let loader = names.iter().fold(MockLoader::new(), |loader, name| {
            loader.with_team_lib(name, CapabilitySet::default())
        });
        let mut registry = TeamLibRegistry::new();
        for name in names {
            let path = PathBuf::from("/tl").join(MockLoader::file_name(name));
            registry.push(load_team_lib(&loader as &dyn ModuleLoader, &path).expect("load"));
        }
        (registry, loader)
    }

    fn names(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("tl{i}")).collect()
    }

    #[test]
    fn test_push_across_chunk_boundaries() {
        for count in [7, 8, 9, 16, 17] {
            let (registry, _loader) = registry_of(&names(count));
            assert_eq!(registry.len(), count);
            assert!(registry.capacity() >= count);
            let expected = names(count);
            assert_eq!(registry.names(), expected.iter().map(String::as_str).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_first_push_allocates_a_chunk() {
        let (registry, _loader) = registry_of(&names(1));
        assert!(registry.capacity() >= GROWTH_CHUNK);
    }

    #[test]
    fn test_compact_preserves_order() {
        let (mut registry, _loader) = registry_of(&names(10));
        let removed = registry.compact(|lib| lib.name() != "tl3" && lib.name() != "tl7");

        assert_eq!(
            registry.names(),
            vec!["tl0", "tl1", "tl2", "tl4", "tl5", "tl6", "tl8", "tl9"]
        );
        let removed: Vec<&str> = removed.iter().map(|lib| lib.name()).collect();
        assert_eq!(removed, vec!["tl3", "tl7"]);
        assert_eq!(registry.capacity(), registry.len());
    }

    #[test]
    fn test_removed_entries_released_once() {
        let (mut registry, loader) = registry_of(&names(2));
        for lib in registry.compact(|lib| lib.name() == "tl0") {
            lib.unload();
        }

        let file = MockLoader::file_name("tl1");
        let tail: Vec<MockEvent> = loader.events().into_iter().skip(2).collect();
        assert_eq!(
            tail,
            vec![
                MockEvent::Finalized("tl1".to_string()),
                MockEvent::Closed(file)
            ]
        );

        drop(registry);
        let released = loader
            .events()
            .into_iter()
            .filter(|e| matches!(e, MockEvent::Closed(_)))
            .count();
        assert_eq!(released, 2);
    }

    #[test]
    fn test_duplicate_names_allowed() {
        let (mut registry, _loader) = registry_of(&names(1));
        let loader = MockLoader::new().with_team_lib("tl0", CapabilitySet::default());
        let path = PathBuf::from("/other").join(MockLoader::file_name("tl0"));
        registry.push(load_team_lib(&loader, &path).expect("load"));
        assert_eq!(registry.names(), vec!["tl0", "tl0"]);
        assert_eq!(registry.find("tl0").map(|l| l.path().to_path_buf()), Some(PathBuf::from("/tl").join(MockLoader::file_name("tl0"))));
    }
}
