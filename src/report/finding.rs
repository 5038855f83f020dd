use crate::model::MemberType;
use std::fmt::{Display, Error as FmtError, Formatter};

/// How bad a finding is
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
}

/// Kind of finding
///
/// The declaration order is the order groups appear in the report.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum MessageType {
    MissClasses,
    MissNestedClasses,
    MissSuperclasses,
    MissFields,
    MissConstructors,
    MissMethods,
    AddClasses,
    AddNestedClasses,
    AddFields,
    AddConstructors,
    AddMethods,
    MissAnno,
    AddAnno,
    ErrorLinkErr,

    // Warning variants of the additions
    AddClassesWarn,
    AddNestedClassesWarn,
    AddFieldsWarn,
    AddConstructorsWarn,
    AddMethodsWarn,
    AddAnnoWarn,
}

impl MessageType {
    /// Kind for a required entity that is missing (or incompatible) in the found API
    pub fn missing(member_type: MemberType) -> MessageType {
        match member_type {
            MemberType::Class => MessageType::MissClasses,
            MemberType::Inner => MessageType::MissNestedClasses,
            MemberType::Field => MessageType::MissFields,
            MemberType::Constructor => MessageType::MissConstructors,
            MemberType::Method => MessageType::MissMethods,
        }
    }

    /// Kind for a found entity that the required API does not have
    pub fn added(member_type: MemberType) -> MessageType {
        match member_type {
            MemberType::Class => MessageType::AddClasses,
            MemberType::Inner => MessageType::AddNestedClasses,
            MemberType::Field => MessageType::AddFields,
            MemberType::Constructor => MessageType::AddConstructors,
            MemberType::Method => MessageType::AddMethods,
        }
    }

    /// Warning counterpart of an addition (other kinds are returned unchanged)
    pub fn as_warning(self) -> MessageType {
        match self {
            MessageType::AddClasses => MessageType::AddClassesWarn,
            MessageType::AddNestedClasses => MessageType::AddNestedClassesWarn,
            MessageType::AddFields => MessageType::AddFieldsWarn,
            MessageType::AddConstructors => MessageType::AddConstructorsWarn,
            MessageType::AddMethods => MessageType::AddMethodsWarn,
            MessageType::AddAnno => MessageType::AddAnnoWarn,
            other => other,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            MessageType::AddClassesWarn
            | MessageType::AddNestedClassesWarn
            | MessageType::AddFieldsWarn
            | MessageType::AddConstructorsWarn
            | MessageType::AddMethodsWarn
            | MessageType::AddAnnoWarn => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }

    /// Header of this kind's group in the report
    pub fn title(&self) -> &'static str {
        match self {
            MessageType::MissClasses => "Missing Classes",
            MessageType::MissNestedClasses => "Missing Nested Classes or Nested Interfaces",
            MessageType::MissSuperclasses => "Missing Superclasses or Superinterfaces",
            MessageType::MissFields => "Missing Fields",
            MessageType::MissConstructors => "Missing Constructors",
            MessageType::MissMethods => "Missing Methods",
            MessageType::AddClasses => "Added Classes",
            MessageType::AddNestedClasses => "Added Nested Classes or Nested Interfaces",
            MessageType::AddFields => "Added Fields",
            MessageType::AddConstructors => "Added Constructors",
            MessageType::AddMethods => "Added Methods",
            MessageType::MissAnno => "Missing Annotations",
            MessageType::AddAnno => "Added Annotations",
            MessageType::ErrorLinkErr => "LinkageError thrown during class loading",
            MessageType::AddClassesWarn => "Added Classes (warning)",
            MessageType::AddNestedClassesWarn => {
                "Added Nested Classes or Nested Interfaces (warning)"
            }
            MessageType::AddFieldsWarn => "Added Fields (warning)",
            MessageType::AddConstructorsWarn => "Added Constructors (warning)",
            MessageType::AddMethodsWarn => "Added Methods (warning)",
            MessageType::AddAnnoWarn => "Added Annotations (warning)",
        }
    }
}

/// One reported divergence between the required and found APIs
///
/// The field order is the report's sort order: kind, class, definition, then tail.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Finding {
    pub kind: MessageType,

    /// Class the finding is about
    pub class_name: String,

    /// Rendered description of the entity (empty when the class name says it all)
    pub definition: String,

    /// Comma separated subclasses whose identical finding was folded into this one (or extra
    /// detail, for linkage errors)
    pub tail: String,

    pub member_type: MemberType,
}

impl Finding {
    pub fn new(
        kind: MessageType,
        class_name: impl Into<String>,
        member_type: MemberType,
        definition: impl Into<String>,
    ) -> Finding {
        Finding {
            kind,
            class_name: class_name.into(),
            definition: definition.into(),
            tail: String::new(),
            member_type,
        }
    }

    pub fn with_tail(mut self, tail: impl Into<String>) -> Finding {
        self.tail = tail.into();
        self
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

impl Display for Finding {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "{}: {}", self.kind.title(), self.class_name)?;
        if !self.definition.is_empty() {
            write!(f, " {}", self.definition)?;
        }
        Ok(())
    }
}
