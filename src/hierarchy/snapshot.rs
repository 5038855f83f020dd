use super::{ClassDescriptionLoader, LoadError};
use crate::model::{names, ClassDescription};
use std::collections::HashMap;

/// In-memory set of class descriptions
///
/// This is the loader to use when descriptions have already been acquired (deserialized,
/// extracted from class files, built in tests...). It also remembers the order classes were added
/// in, which makes it usable as the ordered stream of required classes.
#[derive(Default, Debug)]
pub struct Snapshot {
    classes: Vec<ClassDescription>,
    index: HashMap<String, usize>,

    /// Classes that resolve, but fail to link (with the message to report)
    linkage_failures: HashMap<String, String>,
}

impl Snapshot {
    pub fn new() -> Snapshot {
        Snapshot::default()
    }

    pub fn from_classes(
        classes: impl IntoIterator<Item = ClassDescription>,
    ) -> Result<Snapshot, String> {
        let mut snapshot = Snapshot::new();
        for class in classes {
            snapshot.add(class)?;
        }
        Ok(snapshot)
    }

    /// Add a class (names must be valid and unique)
    pub fn add(&mut self, class: ClassDescription) -> Result<(), String> {
        names::check_valid(&class.name)?;
        if self.index.contains_key(&class.name) {
            return Err(format!("Class '{}' is described twice", class.name));
        }
        self.index.insert(class.name.clone(), self.classes.len());
        self.classes.push(class);
        Ok(())
    }

    /// Make loading this class fail with a linkage error
    pub fn fail_linkage(&mut self, name: impl Into<String>, message: impl Into<String>) {
        self.linkage_failures.insert(name.into(), message.into());
    }

    pub fn get(&self, name: &str) -> Option<&ClassDescription> {
        self.index.get(name).map(|idx| &self.classes[*idx])
    }

    /// Classes in the order they were added
    pub fn classes(&self) -> impl Iterator<Item = &ClassDescription> {
        self.classes.iter()
    }

    /// Names of the classes in the order they were added
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(|class| class.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl ClassDescriptionLoader for Snapshot {
    fn load(&self, name: &str) -> Result<ClassDescription, LoadError> {
        if let Some(message) = self.linkage_failures.get(name) {
            return Err(LoadError::Linkage {
                class: name.to_owned(),
                message: message.clone(),
            });
        }
        self.get(name)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(name.to_owned()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::{ClassKind, Modifiers};

    #[test]
    fn keeps_insertion_order() {
        let snapshot = Snapshot::from_classes(vec![
            ClassDescription::new("b.B", ClassKind::Class, Modifiers::PUBLIC),
            ClassDescription::new("a.A", ClassKind::Class, Modifiers::PUBLIC),
        ])
        .unwrap();
        assert_eq!(snapshot.class_names().collect::<Vec<_>>(), vec!["b.B", "a.A"]);
    }

    #[test]
    fn rejects_bad_names() {
        let mut snapshot = Snapshot::new();
        let class = ClassDescription::new("a.A", ClassKind::Class, Modifiers::PUBLIC);
        assert!(snapshot.add(class.clone()).is_ok());
        assert!(snapshot.add(class).is_err());
        let bad = ClassDescription::new("a..B", ClassKind::Class, Modifiers::PUBLIC);
        assert!(snapshot.add(bad).is_err());
    }

    #[test]
    fn linkage_failures() {
        let mut snapshot = Snapshot::from_classes(vec![ClassDescription::new(
            "a.A",
            ClassKind::Class,
            Modifiers::PUBLIC,
        )])
        .unwrap();
        snapshot.fail_linkage("a.A", "a.Gone");
        assert_eq!(
            snapshot.load("a.A"),
            Err(LoadError::Linkage {
                class: String::from("a.A"),
                message: String::from("a.Gone"),
            })
        );
        assert_eq!(snapshot.load("a.B"), Err(LoadError::NotFound(String::from("a.B"))));
    }
}
