use super::ClassHierarchy;
use crate::erasure::strip_type_arguments;
use std::collections::{BTreeSet, HashSet};

/// Transitive closure of a set of classes over their supertypes
///
/// Every class added brings along its superclass and interfaces, recursively. Names that cannot
/// be resolved are collected instead of reported as errors, so the whole closure can be checked at
/// once.
pub struct ClassSet<'h, 'a> {
    hierarchy: &'h ClassHierarchy<'a>,

    /// Every name ever enqueued (resolved or not)
    visited: HashSet<String>,

    /// Names that resolved
    classes: BTreeSet<String>,

    /// Names that failed to resolve
    missing: BTreeSet<String>,
}

impl<'h, 'a> ClassSet<'h, 'a> {
    pub fn new(hierarchy: &'h ClassHierarchy<'a>) -> ClassSet<'h, 'a> {
        ClassSet {
            hierarchy,
            visited: HashSet::new(),
            classes: BTreeSet::new(),
            missing: BTreeSet::new(),
        }
    }

    /// Add a class along with all of its supertypes
    pub fn add_class(&mut self, name: &str) {
        let mut to_visit: Vec<String> = vec![strip_type_arguments(name)];

        while let Some(name) = to_visit.pop() {
            if !self.visited.insert(name.clone()) {
                continue;
            }
            match self.hierarchy.load(&name) {
                Ok(class) => {
                    to_visit.extend(class.supertypes().map(strip_type_arguments));
                    self.classes.insert(name);
                }
                Err(err) => {
                    log::debug!("Closure is missing '{}': {}", name, err);
                    self.missing.insert(name);
                }
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains(name)
    }

    /// Resolved classes, sorted by name
    pub fn classes(&self) -> &BTreeSet<String> {
        &self.classes
    }

    /// Names that were referenced but could not be resolved, sorted
    pub fn get_missing_classes(&self) -> &BTreeSet<String> {
        &self.missing
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hierarchy::Snapshot;
    use crate::model::{ClassDescription, ClassKind, Modifiers};
    use crate::settings::{Mode, Settings};

    fn class(name: &str) -> ClassDescription {
        ClassDescription::new(name, ClassKind::Class, Modifiers::PUBLIC)
    }

    fn iface(name: &str) -> ClassDescription {
        ClassDescription::new(name, ClassKind::Interface, Modifiers::PUBLIC)
    }

    #[test]
    fn diamond_is_visited_once() {
        let snapshot = Snapshot::from_classes(vec![
            iface("a.Top"),
            iface("a.Left").with_interface("a.Top"),
            iface("a.Right").with_interface("a.Top"),
            class("a.Impl")
                .with_interface("a.Left")
                .with_interface("a.Right<java.lang.String>"),
        ])
        .unwrap();
        let settings = Settings::new(Mode::Source);
        let hierarchy = ClassHierarchy::new(&snapshot, &settings);
        let mut set = ClassSet::new(&hierarchy);
        set.add_class("a.Impl");

        assert_eq!(set.classes().len(), 4);
        assert!(set.contains("a.Right"));
        assert!(set.get_missing_classes().is_empty());
    }

    #[test]
    fn unresolvable_superclass_is_missing() {
        let snapshot = Snapshot::from_classes(vec![
            class("a.A").with_superclass("a.Gone"),
            class("a.B").with_superclass("a.A").with_interface("a.AlsoGone"),
        ])
        .unwrap();
        let settings = Settings::new(Mode::Source);
        let hierarchy = ClassHierarchy::new(&snapshot, &settings);
        let mut set = ClassSet::new(&hierarchy);
        set.add_class("a.B");
        set.add_class("a.A");

        let missing: Vec<&str> = set.get_missing_classes().iter().map(|s| s.as_str()).collect();
        assert_eq!(missing, vec!["a.AlsoGone", "a.Gone"]);
        assert!(set.contains("a.A"));
    }
}
