use super::{names, sort_annotations, AnnotationItem, Modifiers};
use crate::erasure::strip_type_arguments;
use crate::settings::Settings;
use std::fmt::{Display, Error as FmtError, Formatter};

/// Kind of entity a description or finding is about
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum MemberType {
    Class,
    Field,
    Constructor,
    Method,
    Inner,
}

impl MemberType {
    /// Modifiers that are meaningful when comparing this kind of entity
    pub fn compared_modifiers(&self) -> Modifiers {
        match self {
            MemberType::Class | MemberType::Inner => {
                Modifiers::ACCESS
                    | Modifiers::STATIC
                    | Modifiers::FINAL
                    | Modifiers::ABSTRACT
                    | Modifiers::INTERFACE
                    | Modifiers::ANNOTATION
                    | Modifiers::ENUM
            }
            MemberType::Field => {
                Modifiers::ACCESS
                    | Modifiers::STATIC
                    | Modifiers::FINAL
                    | Modifiers::VOLATILE
                    | Modifiers::TRANSIENT
                    | Modifiers::ENUM
            }
            MemberType::Method => {
                Modifiers::ACCESS
                    | Modifiers::STATIC
                    | Modifiers::FINAL
                    | Modifiers::ABSTRACT
                    | Modifiers::DEFAULT
            }
            MemberType::Constructor => Modifiers::ACCESS,
        }
    }
}

/// Parts shared by methods and constructors
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Invocable {
    /// Parameter types, in declaration order
    pub parameters: Vec<String>,

    /// Declared throwables, kept sorted and free of duplicates
    pub throws: Vec<String>,

    /// Generic type parameters (eg. `<T extends java.lang.Number>`), empty if there are none
    pub type_parameters: String,
}

/// Variant specific parts of a member
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum MemberKind {
    Field {
        field_type: String,

        /// Only ever read for `static final` fields of primitive or string type
        constant_value: Option<String>,
    },
    Method {
        signature: Invocable,
        return_type: String,
    },
    Constructor(Invocable),

    /// Nested class, named by its qualified name
    Inner,
}

/// Field, method, constructor, or nested class of some class
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct MemberDescription {
    pub name: String,

    /// Qualified name of the class declaring this member (not always the class listing it)
    pub declaring_class: String,

    pub modifiers: Modifiers,

    pub kind: MemberKind,

    /// Kept in sorted order
    annotations: Vec<AnnotationItem>,
}

/// What identifies a member across the required and found sides
///
/// Parameter types have their type arguments erased, so `m(List<String>)` and `m(List<T>)` are
/// matched up (and then compared as incompatible if they really differ).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct MemberKey {
    pub member_type: MemberType,
    pub name: String,
    pub parameters: Vec<String>,
}

impl MemberDescription {
    fn new(
        declaring_class: impl Into<String>,
        name: impl Into<String>,
        modifiers: Modifiers,
        kind: MemberKind,
    ) -> MemberDescription {
        MemberDescription {
            name: name.into(),
            declaring_class: declaring_class.into(),
            modifiers,
            kind,
            annotations: vec![],
        }
    }

    pub fn field(
        declaring_class: impl Into<String>,
        name: impl Into<String>,
        modifiers: Modifiers,
        field_type: impl Into<String>,
    ) -> MemberDescription {
        let kind = MemberKind::Field {
            field_type: field_type.into(),
            constant_value: None,
        };
        Self::new(declaring_class, name, modifiers, kind)
    }

    pub fn method(
        declaring_class: impl Into<String>,
        name: impl Into<String>,
        modifiers: Modifiers,
        return_type: impl Into<String>,
        parameters: Vec<String>,
    ) -> MemberDescription {
        let kind = MemberKind::Method {
            signature: Invocable {
                parameters,
                throws: vec![],
                type_parameters: String::new(),
            },
            return_type: return_type.into(),
        };
        Self::new(declaring_class, name, modifiers, kind)
    }

    pub fn constructor(
        declaring_class: impl Into<String>,
        modifiers: Modifiers,
        parameters: Vec<String>,
    ) -> MemberDescription {
        let kind = MemberKind::Constructor(Invocable {
            parameters,
            throws: vec![],
            type_parameters: String::new(),
        });
        Self::new(declaring_class, names::INIT, modifiers, kind)
    }

    /// Nested class member (`name` is the qualified name of the nested class)
    pub fn inner(
        declaring_class: impl Into<String>,
        name: impl Into<String>,
        modifiers: Modifiers,
    ) -> MemberDescription {
        Self::new(declaring_class, name, modifiers, MemberKind::Inner)
    }

    /// Set declared throwables (no-op for fields and nested classes)
    pub fn with_throws(mut self, throws: Vec<String>) -> MemberDescription {
        self.set_throws(throws);
        self
    }

    /// Set generic type parameters (no-op for fields and nested classes)
    pub fn with_type_parameters(mut self, type_parameters: impl Into<String>) -> MemberDescription {
        if let Some(invocable) = self.invocable_mut() {
            invocable.type_parameters = type_parameters.into();
        }
        self
    }

    /// Set the constant value of a field (no-op for other members)
    pub fn with_constant(mut self, value: impl Into<String>) -> MemberDescription {
        if let MemberKind::Field { constant_value, .. } = &mut self.kind {
            *constant_value = Some(value.into());
        }
        self
    }

    pub fn with_annotation(mut self, annotation: AnnotationItem) -> MemberDescription {
        self.annotations.push(annotation);
        sort_annotations(&mut self.annotations);
        self
    }

    pub fn member_type(&self) -> MemberType {
        match self.kind {
            MemberKind::Field { .. } => MemberType::Field,
            MemberKind::Method { .. } => MemberType::Method,
            MemberKind::Constructor(_) => MemberType::Constructor,
            MemberKind::Inner => MemberType::Inner,
        }
    }

    pub fn is_method(&self) -> bool {
        matches!(self.kind, MemberKind::Method { .. })
    }

    pub fn is_constructor(&self) -> bool {
        matches!(self.kind, MemberKind::Constructor(_))
    }

    pub fn is_field(&self) -> bool {
        matches!(self.kind, MemberKind::Field { .. })
    }

    pub fn key(&self) -> MemberKey {
        MemberKey {
            member_type: self.member_type(),
            name: self.name.clone(),
            parameters: self
                .parameters()
                .iter()
                .map(|param| strip_type_arguments(param))
                .collect(),
        }
    }

    pub fn invocable(&self) -> Option<&Invocable> {
        match &self.kind {
            MemberKind::Method { signature, .. } | MemberKind::Constructor(signature) => {
                Some(signature)
            }
            _ => None,
        }
    }

    pub fn invocable_mut(&mut self) -> Option<&mut Invocable> {
        match &mut self.kind {
            MemberKind::Method { signature, .. } | MemberKind::Constructor(signature) => {
                Some(signature)
            }
            _ => None,
        }
    }

    pub fn parameters(&self) -> &[String] {
        self.invocable()
            .map_or(&[][..], |inv| inv.parameters.as_slice())
    }

    pub fn throws(&self) -> &[String] {
        self.invocable()
            .map_or(&[][..], |inv| inv.throws.as_slice())
    }

    /// Replace the declared throwables, restoring the canonical sorted order
    pub fn set_throws(&mut self, mut throws: Vec<String>) {
        if let Some(invocable) = self.invocable_mut() {
            throws.sort();
            throws.dedup();
            invocable.throws = throws;
        }
    }

    pub fn type_parameters(&self) -> &str {
        self.invocable()
            .map_or("", |inv| inv.type_parameters.as_str())
    }

    /// Constant value, if one was recorded for a `static final` field
    pub fn constant_value(&self) -> Option<&str> {
        match &self.kind {
            MemberKind::Field { constant_value, .. }
                if self.modifiers.contains(Modifiers::STATIC | Modifiers::FINAL) =>
            {
                constant_value.as_deref()
            }
            _ => None,
        }
    }

    /// Annotations, sorted
    pub fn annotations(&self) -> &[AnnotationItem] {
        &self.annotations
    }

    /// Name and parameter list for methods and constructors, just the name otherwise
    pub fn signature(&self) -> String {
        match self.invocable() {
            Some(invocable) => format!("{}({})", self.name, invocable.parameters.join(",")),
            None => self.name.clone(),
        }
    }

    /// Check if two members are compatible
    ///
    /// Only modifiers in `settings.tracked_modifiers` that matter for this kind of member are
    /// compared. Throwables are compared as the (already normalized) lists they are, unless
    /// `settings.throws_policy` allows the found side to declare fewer. The constant value of a
    /// field is only compared when constants are checked and `ignore_constant` is not set.
    pub fn is_compatible(
        &self,
        found: &MemberDescription,
        settings: &Settings,
        ignore_constant: bool,
    ) -> bool {
        let member_type = self.member_type();
        if member_type != found.member_type() || self.name != found.name {
            return false;
        }

        let mask = member_type.compared_modifiers() & settings.tracked_modifiers;
        if self.modifiers & mask != found.modifiers & mask {
            return false;
        }

        match (&self.kind, &found.kind) {
            (
                MemberKind::Field {
                    field_type: type1, ..
                },
                MemberKind::Field {
                    field_type: type2, ..
                },
            ) => {
                type1 == type2
                    && (ignore_constant
                        || !settings.check_constants
                        || self.constant_value() == found.constant_value())
            }
            (
                MemberKind::Method {
                    signature: sig1,
                    return_type: ret1,
                },
                MemberKind::Method {
                    signature: sig2,
                    return_type: ret2,
                },
            ) => ret1 == ret2 && sig1.is_compatible(sig2, settings),
            (MemberKind::Constructor(sig1), MemberKind::Constructor(sig2)) => {
                sig1.is_compatible(sig2, settings)
            }
            (MemberKind::Inner, MemberKind::Inner) => true,
            _ => false,
        }
    }
}

impl Invocable {
    fn is_compatible(&self, found: &Invocable, settings: &Settings) -> bool {
        self.parameters == found.parameters
            && self.type_parameters == found.type_parameters
            && settings.throws_policy.throws_compatible(&self.throws, &found.throws)
    }
}

impl Display for MemberDescription {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        let mut parts: Vec<String> = vec![];
        let modifiers = self.modifiers.to_string();
        if !modifiers.is_empty() {
            parts.push(modifiers);
        }
        if !self.type_parameters().is_empty() {
            parts.push(self.type_parameters().to_owned());
        }

        match &self.kind {
            MemberKind::Field { field_type, .. } => {
                parts.push(field_type.clone());
                parts.push(self.name.clone());
                if let Some(value) = self.constant_value() {
                    parts.push(format!("= {}", value));
                }
            }
            MemberKind::Method {
                signature,
                return_type,
            } => {
                parts.push(return_type.clone());
                parts.push(format!("{}({})", self.name, signature.parameters.join(",")));
                if !signature.throws.is_empty() {
                    parts.push(format!("throws {}", signature.throws.join(",")));
                }
            }
            MemberKind::Constructor(signature) => {
                let class_name = names::simple_name(&self.declaring_class);
                parts.push(format!("{}({})", class_name, signature.parameters.join(",")));
                if !signature.throws.is_empty() {
                    parts.push(format!("throws {}", signature.throws.join(",")));
                }
            }
            MemberKind::Inner => {
                parts.push(String::from("class"));
                parts.push(self.name.clone());
            }
        }

        f.write_str(&parts.join(" "))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::settings::{Mode, Settings};

    #[test]
    fn rendering() {
        let method = MemberDescription::method(
            "a.A",
            "m",
            Modifiers::PUBLIC | Modifiers::STATIC,
            "void",
            vec![String::from("int"), String::from("java.lang.String")],
        )
        .with_throws(vec![String::from("java.io.IOException")]);
        assert_eq!(
            method.to_string(),
            "public static void m(int,java.lang.String) throws java.io.IOException"
        );

        let ctor = MemberDescription::constructor("a.Outer$A", Modifiers::PROTECTED, vec![]);
        assert_eq!(ctor.to_string(), "protected A()");

        let field = MemberDescription::field(
            "a.A",
            "X",
            Modifiers::PUBLIC | Modifiers::STATIC | Modifiers::FINAL,
            "int",
        )
        .with_constant("1");
        assert_eq!(field.to_string(), "public static final int X = 1");
    }

    #[test]
    fn key_erases_type_arguments() {
        let m1 = MemberDescription::method(
            "a.A",
            "m",
            Modifiers::PUBLIC,
            "void",
            vec![String::from("java.util.List<java.lang.String>")],
        );
        let m2 = MemberDescription::method(
            "a.B",
            "m",
            Modifiers::PUBLIC | Modifiers::FINAL,
            "void",
            vec![String::from("java.util.List")],
        );
        assert_eq!(m1.key(), m2.key());
    }

    #[test]
    fn constant_only_for_static_final() {
        let field = MemberDescription::field("a.A", "x", Modifiers::PUBLIC, "int").with_constant("1");
        assert_eq!(field.constant_value(), None);
    }

    #[test]
    fn throws_are_canonical() {
        let method = MemberDescription::method("a.A", "m", Modifiers::PUBLIC, "void", vec![])
            .with_throws(vec![String::from("b.E"), String::from("a.E"), String::from("b.E")]);
        assert_eq!(method.throws(), &[String::from("a.E"), String::from("b.E")]);
    }

    #[test]
    fn untracked_modifiers_are_ignored() {
        let settings = Settings::new(Mode::Source);
        let m1 = MemberDescription::method("a.A", "m", Modifiers::PUBLIC, "void", vec![]);
        let m2 = MemberDescription::method(
            "a.A",
            "m",
            Modifiers::PUBLIC | Modifiers::SYNCHRONIZED | Modifiers::NATIVE,
            "void",
            vec![],
        );
        assert!(m1.is_compatible(&m2, &settings, false));

        let m3 = MemberDescription::method("a.A", "m", Modifiers::PROTECTED, "void", vec![]);
        assert!(!m1.is_compatible(&m3, &settings, false));
    }

    #[test]
    fn volatile_tracked_only_in_extended_source_mode() {
        let f1 = MemberDescription::field("a.A", "x", Modifiers::PUBLIC, "int");
        let f2 = MemberDescription::field("a.A", "x", Modifiers::PUBLIC | Modifiers::VOLATILE, "int");
        assert!(f1.is_compatible(&f2, &Settings::new(Mode::Source), false));
        assert!(!f1.is_compatible(&f2, &Settings::new(Mode::SourceExt), false));
    }
}
