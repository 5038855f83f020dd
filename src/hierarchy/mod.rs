//! Resolution of classes by qualified name
//!
//! All class data enters through a [`ClassDescriptionLoader`]. A [`ClassHierarchy`] sits on top of
//! one loader, memoizing whatever it resolves for the rest of the run, and answers the questions
//! the checker has about supertypes, subtypes, and accessibility.

mod class_set;
mod snapshot;

pub use class_set::*;
pub use snapshot::*;

use crate::erasure::strip_type_arguments;
use crate::model::{names, ClassDescription, MemberDescription, Modifiers};
use crate::settings::Settings;
use elsa::map::FrozenMap;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt::{Display, Error as FmtError, Formatter};

/// Ways resolving a class can fail
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum LoadError {
    /// No class of that name is known
    NotFound(String),

    /// The class was found, but something it depends on could not be linked
    Linkage { class: String, message: String },
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match self {
            LoadError::NotFound(class) => write!(f, "class {} not found", class),
            LoadError::Linkage { class, message } => {
                write!(f, "class {} could not be linked: {}", class, message)
            }
        }
    }
}

/// Source of class descriptions (backed by reflection, class files, signature files...)
pub trait ClassDescriptionLoader {
    /// Describe the class with the given qualified name
    fn load(&self, name: &str) -> Result<ClassDescription, LoadError>;
}

impl<'l, L: ClassDescriptionLoader + ?Sized> ClassDescriptionLoader for &'l L {
    fn load(&self, name: &str) -> Result<ClassDescription, LoadError> {
        (**self).load(name)
    }
}

/// Memoizing view of the classes reachable through one loader
///
/// Resolved classes are inserted once and never change afterwards, so references handed out by
/// [`Self::load`] stay valid for as long as the hierarchy does. Failures are remembered too, so
/// repeated queries for the same name always give the same answer.
pub struct ClassHierarchy<'a> {
    loader: Box<dyn ClassDescriptionLoader + 'a>,

    /// See [`Settings::all_public`]
    all_public: bool,

    classes: FrozenMap<String, Box<ClassDescription>>,

    failures: RefCell<HashMap<String, LoadError>>,

    /// Direct subtypes of each type, among the classes loaded so far
    subtypes: RefCell<HashMap<String, Vec<String>>>,
}

impl<'a> ClassHierarchy<'a> {
    pub fn new(loader: impl ClassDescriptionLoader + 'a, settings: &Settings) -> ClassHierarchy<'a> {
        ClassHierarchy {
            loader: Box::new(loader),
            all_public: settings.all_public,
            classes: FrozenMap::new(),
            failures: RefCell::new(HashMap::new()),
            subtypes: RefCell::new(HashMap::new()),
        }
    }

    /// Resolve a class by qualified name
    pub fn load(&self, name: &str) -> Result<&ClassDescription, LoadError> {
        if let Some(class) = self.classes.get(name) {
            return Ok(class);
        }
        if let Some(err) = self.failures.borrow().get(name) {
            return Err(err.clone());
        }

        match self.loader.load(name) {
            Ok(class) => {
                log::trace!("Loaded '{}'", name);
                let mut subtypes = self.subtypes.borrow_mut();
                for supertype in class.supertypes() {
                    subtypes
                        .entry(strip_type_arguments(supertype))
                        .or_insert_with(Vec::new)
                        .push(name.to_owned());
                }
                Ok(self.classes.insert(name.to_owned(), Box::new(class)))
            }
            Err(err) => {
                log::trace!("Failed to load '{}': {}", name, err);
                self.failures
                    .borrow_mut()
                    .insert(name.to_owned(), err.clone());
                Err(err)
            }
        }
    }

    /// Is the class part of the API surface visible to outside code?
    ///
    /// Top-level classes need to be public. Nested classes may also be protected, but then their
    /// enclosing class must be accessible too (unless [`Settings::all_public`] is set and the
    /// nested class is itself public). Package and module info units are always accessible.
    pub fn is_accessible(&self, class: &ClassDescription) -> bool {
        if class.is_package_or_module_info() {
            return true;
        }

        let is_public = class.modifiers.contains(Modifiers::PUBLIC);
        let outer = names::outer_class(&class.name);
        let visible = is_public || (outer.is_some() && class.modifiers.contains(Modifiers::PROTECTED));
        if !visible {
            return false;
        }

        match outer {
            None => true,
            Some(_) if self.all_public && is_public => true,
            Some(outer) => match self.load(outer) {
                Ok(outer) => self.is_accessible(outer),
                Err(_) => false,
            },
        }
    }

    /// Is the method overridden in some subtype of its declaring class?
    ///
    /// Only subtypes that have already been loaded through this hierarchy are considered: the
    /// question is about the set of classes under test, not about every possible subclass.
    pub fn is_method_overridden(&self, method: &MemberDescription) -> bool {
        let key = method.key();
        let mut to_visit: Vec<String> = self.direct_subtypes(&method.declaring_class);
        let mut visited: HashSet<String> = HashSet::new();

        while let Some(subtype) = to_visit.pop() {
            if !visited.insert(subtype.clone()) {
                continue;
            }
            let class = match self.load(&subtype) {
                Ok(class) => class,
                Err(_) => continue,
            };
            let overrides = class.members().iter().any(|member| {
                member.is_method()
                    && member.declaring_class != method.declaring_class
                    && member.key() == key
            });
            if overrides {
                log::trace!("'{}' overrides {}", subtype, method.signature());
                return true;
            }
            to_visit.extend(self.direct_subtypes(&subtype));
        }

        false
    }

    fn direct_subtypes(&self, name: &str) -> Vec<String> {
        self.subtypes
            .borrow()
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// Is `name` the class `ancestor` or one of its subclasses?
    ///
    /// Follows the superclass chain only (interfaces are not throwable, which is what this is
    /// for). Unresolvable links end the search with `false`.
    pub fn is_subclass_of(&self, name: &str, ancestor: &str) -> bool {
        let mut next: Option<String> = Some(strip_type_arguments(name));
        let mut visited: HashSet<String> = HashSet::new();
        while let Some(current) = next {
            if current == ancestor {
                return true;
            }
            if !visited.insert(current.clone()) {
                return false;
            }
            next = match self.load(&current) {
                Ok(class) => class.superclass.as_deref().map(strip_type_arguments),
                Err(_) => None,
            };
        }
        false
    }
}
