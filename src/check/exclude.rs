use crate::model::{ClassDescription, MemberDescription};
use std::cell::Cell;

/// Outcome of consulting an [`Exclude`] predicate
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Exclusion {
    Allow,

    /// Skip the class or member, for the given reason
    Exclude(String),
}

impl Exclusion {
    pub fn is_excluded(&self) -> bool {
        matches!(self, Exclusion::Exclude(_))
    }
}

/// Predicate consulted before a member is compared, or before a class is verified or reported
/// as added
pub trait Exclude {
    /// `member` is `None` when the class itself is being considered
    fn check(&self, class: &ClassDescription, member: Option<&MemberDescription>) -> Exclusion;

    /// Number of exclusions made so far
    fn exclusions_made(&self) -> usize {
        0
    }
}

/// Exclude nothing
#[derive(Copy, Clone, Default, Debug)]
pub struct NoExclusions;

impl Exclude for NoExclusions {
    fn check(&self, _class: &ClassDescription, _member: Option<&MemberDescription>) -> Exclusion {
        Exclusion::Allow
    }
}

/// Exclusions given as a list of names
///
/// An entry is either a class or package name (which also covers everything nested in it), or a
/// `Class#member` pair where `member` is a member name or a full `name(params)` signature.
#[derive(Default, Debug)]
pub struct ExcludeList {
    entries: Vec<String>,
    made: Cell<usize>,
}

impl ExcludeList {
    pub fn new() -> ExcludeList {
        ExcludeList::default()
    }

    pub fn with(mut self, entry: impl Into<String>) -> ExcludeList {
        self.entries.push(entry.into());
        self
    }

    fn matches_class(entry: &str, class_name: &str) -> bool {
        class_name == entry
            || (class_name.starts_with(entry)
                && matches!(class_name.as_bytes().get(entry.len()), Some(b'.') | Some(b'$')))
    }

    fn find(&self, class: &ClassDescription, member: Option<&MemberDescription>) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| match (entry.split_once('#'), member) {
                (None, _) => ExcludeList::matches_class(entry, &class.name),
                (Some((owner, name)), Some(member)) => {
                    owner == class.name && (member.name == name || member.signature() == name)
                }
                (Some(_), None) => false,
            })
            .map(|entry| entry.as_str())
    }
}

impl Exclude for ExcludeList {
    fn check(&self, class: &ClassDescription, member: Option<&MemberDescription>) -> Exclusion {
        match self.find(class, member) {
            None => Exclusion::Allow,
            Some(entry) => {
                self.made.set(self.made.get() + 1);
                Exclusion::Exclude(format!("matches exclusion '{}'", entry))
            }
        }
    }

    fn exclusions_made(&self) -> usize {
        self.made.get()
    }
}

/// Adjustments applied to a found class before it is compared
pub trait PreComparisonHook {
    /// Should the class be compared (or reported as added) at all?
    fn accept(&self, _class: &ClassDescription) -> bool {
        true
    }

    fn transform(&self, class: ClassDescription) -> ClassDescription {
        class
    }
}

/// Accept every class as is
#[derive(Copy, Clone, Default, Debug)]
pub struct NoHook;

impl PreComparisonHook for NoHook {}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::{ClassKind, Modifiers};

    fn class(name: &str) -> ClassDescription {
        ClassDescription::new(name, ClassKind::Class, Modifiers::PUBLIC)
    }

    #[test]
    fn class_and_package_entries() {
        let list = ExcludeList::new().with("a.b").with("c.D");
        assert!(list.check(&class("a.b.C"), None).is_excluded());
        assert!(list.check(&class("a.b.c.E"), None).is_excluded());
        assert!(list.check(&class("c.D$Inner"), None).is_excluded());
        assert!(!list.check(&class("a.bc.C"), None).is_excluded());
        assert!(!list.check(&class("c.DD"), None).is_excluded());
        assert_eq!(list.exclusions_made(), 3);
    }

    #[test]
    fn member_entries() {
        let list = ExcludeList::new().with("a.A#m").with("a.A#f(int)");
        let owner = class("a.A");
        let m = MemberDescription::method("a.A", "m", Modifiers::PUBLIC, "void", vec![]);
        let f = MemberDescription::method(
            "a.A",
            "f",
            Modifiers::PUBLIC,
            "void",
            vec![String::from("int")],
        );
        let g = MemberDescription::method("a.A", "g", Modifiers::PUBLIC, "void", vec![]);

        assert!(!list.check(&owner, None).is_excluded());
        assert!(list.check(&owner, Some(&m)).is_excluded());
        assert!(list.check(&owner, Some(&f)).is_excluded());
        assert_eq!(list.check(&owner, Some(&g)), Exclusion::Allow);
        assert!(!list.check(&class("a.B"), Some(&m)).is_excluded());
    }
}
