use std::collections::BTreeSet;
use std::fmt::{Display, Error as FmtError, Formatter};

/// Value of an annotation element
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum AnnotationValue {
    /// Constant, class literal, or enum constant, in its rendered form
    Scalar(String),

    /// Array-valued element
    Array(Vec<AnnotationValue>),

    /// Nested annotation (this is how repeated annotations sit inside their container)
    Annotation(AnnotationItem),
}

/// Named element of an annotation
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct AnnotationParameter {
    pub name: String,
    pub value: AnnotationValue,
}

/// Annotation applied to a class, member, or package
///
/// Annotations are totally ordered (by name, then by parameters) so that two sorted lists can be
/// diffed in one linear pass.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct AnnotationItem {
    /// Qualified name of the annotation type
    pub name: String,

    /// Elements, kept sorted by element name
    pub parameters: Vec<AnnotationParameter>,

    /// Type-use annotation (these are not visible through reflection)
    pub extended: bool,
}

impl AnnotationItem {
    /// Annotation without any elements
    pub fn marker(name: impl Into<String>) -> AnnotationItem {
        AnnotationItem {
            name: name.into(),
            parameters: vec![],
            extended: false,
        }
    }

    pub fn new(name: impl Into<String>, mut parameters: Vec<AnnotationParameter>) -> AnnotationItem {
        parameters.sort_by(|p1, p2| p1.name.cmp(&p2.name));
        AnnotationItem {
            name: name.into(),
            parameters,
            extended: false,
        }
    }

    /// Add an element (keeping elements ordered)
    pub fn with(mut self, name: impl Into<String>, value: AnnotationValue) -> AnnotationItem {
        self.parameters.push(AnnotationParameter {
            name: name.into(),
            value,
        });
        self.parameters.sort_by(|p1, p2| p1.name.cmp(&p2.name));
        self
    }

    /// Look up an element by name
    pub fn parameter(&self, name: &str) -> Option<&AnnotationValue> {
        self.parameters
            .iter()
            .find(|param| param.name == name)
            .map(|param| &param.value)
    }

    /// Sort array-valued elements so that declaration order stops mattering
    ///
    /// Annotations whose type is in `order_important` keep their arrays as declared (nested
    /// annotations inside them are still normalized on their own terms).
    pub fn normalize_arrays(&mut self, order_important: &BTreeSet<String>) {
        let sort = !order_important.contains(&self.name);
        for param in &mut self.parameters {
            param.value.normalize(sort, order_important);
        }
    }
}

impl AnnotationValue {
    fn normalize(&mut self, sort: bool, order_important: &BTreeSet<String>) {
        match self {
            AnnotationValue::Scalar(_) => (),
            AnnotationValue::Annotation(nested) => nested.normalize_arrays(order_important),
            AnnotationValue::Array(values) => {
                for value in values.iter_mut() {
                    value.normalize(sort, order_important);
                }
                if sort {
                    values.sort();
                }
            }
        }
    }
}

/// Sort a list of annotations into the canonical order expected by the rest of the model
pub fn sort_annotations(annotations: &mut Vec<AnnotationItem>) {
    annotations.sort();
}

impl Display for AnnotationValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match self {
            AnnotationValue::Scalar(value) => f.write_str(value),
            AnnotationValue::Annotation(nested) => nested.fmt(f),
            AnnotationValue::Array(values) => {
                f.write_str("{")?;
                for (idx, value) in values.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    value.fmt(f)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl Display for AnnotationItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "@{}", self.name)?;
        if !self.parameters.is_empty() {
            f.write_str("(")?;
            for (idx, param) in self.parameters.iter().enumerate() {
                if idx > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}={}", param.name, param.value)?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}
