use super::{sort_annotations, AnnotationItem, MemberDescription, MemberType, Modifiers};
use crate::settings::Settings;
use std::fmt::{Display, Error as FmtError, Formatter};

/// What sort of unit a class description describes
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
    Annotation,
    PackageInfo,
    ModuleInfo,
}

impl ClassKind {
    /// Modifier bits that always accompany this kind
    pub fn implied_modifiers(&self) -> Modifiers {
        match self {
            ClassKind::Class | ClassKind::PackageInfo | ClassKind::ModuleInfo => {
                Modifiers::empty()
            }
            ClassKind::Interface => Modifiers::INTERFACE | Modifiers::ABSTRACT,
            ClassKind::Enum => Modifiers::ENUM,
            ClassKind::Annotation => {
                Modifiers::ANNOTATION | Modifiers::INTERFACE | Modifiers::ABSTRACT
            }
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            ClassKind::Class => "class",
            ClassKind::Interface => "interface",
            ClassKind::Enum => "enum",
            ClassKind::Annotation => "@interface",
            ClassKind::PackageInfo => "package",
            ClassKind::ModuleInfo => "module",
        }
    }
}

/// Description of one class, interface, enum, annotation type, or package/module-info unit
///
/// Supertypes are referenced by qualified name and resolved through a
/// [`crate::hierarchy::ClassHierarchy`], never owned.
#[derive(Clone, PartialEq, Debug)]
pub struct ClassDescription {
    /// Qualified name, unique within one snapshot
    pub name: String,

    pub kind: ClassKind,

    pub modifiers: Modifiers,

    pub superclass: Option<String>,

    /// Implemented (or, for interfaces, extended) interfaces, in declaration order
    pub interfaces: Vec<String>,

    /// Generic type parameters (eg. `<K, V>`), empty if there are none
    pub type_parameters: String,

    /// Kept in sorted order
    annotations: Vec<AnnotationItem>,

    members: Vec<MemberDescription>,
}

impl ClassDescription {
    pub fn new(name: impl Into<String>, kind: ClassKind, modifiers: Modifiers) -> ClassDescription {
        ClassDescription {
            name: name.into(),
            kind,
            modifiers: modifiers | kind.implied_modifiers(),
            superclass: None,
            interfaces: vec![],
            type_parameters: String::new(),
            annotations: vec![],
            members: vec![],
        }
    }

    pub fn with_superclass(mut self, superclass: impl Into<String>) -> ClassDescription {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn with_interface(mut self, interface: impl Into<String>) -> ClassDescription {
        self.interfaces.push(interface.into());
        self
    }

    pub fn with_type_parameters(mut self, type_parameters: impl Into<String>) -> ClassDescription {
        self.type_parameters = type_parameters.into();
        self
    }

    pub fn with_annotation(mut self, annotation: AnnotationItem) -> ClassDescription {
        self.annotations.push(annotation);
        sort_annotations(&mut self.annotations);
        self
    }

    pub fn with_member(mut self, member: MemberDescription) -> ClassDescription {
        self.add_member(member);
        self
    }

    /// Add a member, declared on this class unless the member already names a declaring class
    pub fn add_member(&mut self, mut member: MemberDescription) {
        if member.declaring_class.is_empty() {
            member.declaring_class = self.name.clone();
        }
        self.members.push(member);
    }

    /// Members in declaration order
    pub fn members(&self) -> &[MemberDescription] {
        &self.members
    }

    pub fn members_mut(&mut self) -> &mut [MemberDescription] {
        &mut self.members
    }

    /// Methods whose declaring class is this class
    pub fn declared_methods_mut(&mut self) -> impl Iterator<Item = &mut MemberDescription> {
        let name = &self.name;
        self.members
            .iter_mut()
            .filter(move |member| member.is_method() && &member.declaring_class == name)
    }

    /// Annotations, sorted
    pub fn annotations(&self) -> &[AnnotationItem] {
        &self.annotations
    }

    /// Supertypes by name: superclass first, then interfaces in declaration order
    pub fn supertypes(&self) -> impl Iterator<Item = &str> {
        self.superclass
            .iter()
            .chain(self.interfaces.iter())
            .map(|name| name.as_str())
    }

    pub fn member_type(&self) -> MemberType {
        MemberType::Class
    }

    pub fn is_interface(&self) -> bool {
        self.modifiers.contains(Modifiers::INTERFACE)
    }

    pub fn is_abstract(&self) -> bool {
        self.modifiers.contains(Modifiers::ABSTRACT)
    }

    pub fn is_final(&self) -> bool {
        self.modifiers.contains(Modifiers::FINAL)
    }

    pub fn is_enum(&self) -> bool {
        self.modifiers.contains(Modifiers::ENUM)
    }

    pub fn is_package_or_module_info(&self) -> bool {
        matches!(self.kind, ClassKind::PackageInfo | ClassKind::ModuleInfo)
    }

    /// Does this class or any of its members carry generic type parameters?
    pub fn has_type_parameters(&self) -> bool {
        !self.type_parameters.is_empty()
            || self
                .members
                .iter()
                .any(|member| !member.type_parameters().is_empty())
    }

    /// Could code outside this class's package declare a subclass?
    ///
    /// That takes a non-final class with at least one `public` or `protected` constructor.
    /// Interfaces can always be implemented.
    pub fn can_be_subclassed(&self) -> bool {
        if self.is_interface() {
            return true;
        }
        !self.is_final()
            && self.members.iter().any(|member| {
                member.is_constructor()
                    && member
                        .modifiers
                        .intersects(Modifiers::PUBLIC | Modifiers::PROTECTED)
            })
    }

    /// Check if two class descriptions are compatible
    ///
    /// This covers the class itself: name, kind, tracked modifiers, supertypes (interfaces as a
    /// set) and type parameters. Members and annotations are checked separately.
    pub fn is_compatible(&self, found: &ClassDescription, settings: &Settings) -> bool {
        let mask = MemberType::Class.compared_modifiers() & settings.tracked_modifiers;

        let mut interfaces1: Vec<&String> = self.interfaces.iter().collect();
        let mut interfaces2: Vec<&String> = found.interfaces.iter().collect();
        interfaces1.sort();
        interfaces1.dedup();
        interfaces2.sort();
        interfaces2.dedup();

        self.name == found.name
            && self.kind == found.kind
            && self.modifiers & mask == found.modifiers & mask
            && self.superclass == found.superclass
            && interfaces1 == interfaces2
            && self.type_parameters == found.type_parameters
    }
}

impl Display for ClassDescription {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        let mut modifiers = self.modifiers;
        if self.is_interface() {
            modifiers.remove(Modifiers::ABSTRACT);
        }
        let modifiers = modifiers.to_string();
        if !modifiers.is_empty() {
            write!(f, "{} ", modifiers)?;
        }
        write!(f, "{} {}{}", self.kind.keyword(), self.name, self.type_parameters)?;
        if let Some(superclass) = &self.superclass {
            write!(f, " extends {}", superclass)?;
        }
        if !self.interfaces.is_empty() {
            let keyword = if self.is_interface() { "extends" } else { "implements" };
            write!(f, " {} {}", keyword, self.interfaces.join(","))?;
        }
        Ok(())
    }
}
