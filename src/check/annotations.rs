use crate::hierarchy::ClassHierarchy;
use crate::model::{names, sort_annotations, AnnotationItem, AnnotationValue, MemberKind};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Bring one side's annotations into comparable form
///
/// Annotations whose type is known not to be `@Documented` are dropped (unresolvable types are
/// kept). Repeatable annotations are pulled out of their containers, array-valued elements are
/// put in canonical order, and the result is sorted. Type-use annotations are dropped when
/// `drop_extended` is set.
pub fn prepare(
    annotations: &[AnnotationItem],
    hierarchy: &ClassHierarchy,
    order_important: &BTreeSet<String>,
    drop_extended: bool,
) -> Vec<AnnotationItem> {
    let mut prepared = vec![];
    for annotation in annotations {
        if !is_documented(&annotation.name, hierarchy) {
            continue;
        }
        match container_elements(annotation, hierarchy) {
            Some(elements) => prepared.extend(elements),
            None => prepared.push(annotation.clone()),
        }
    }

    if drop_extended {
        prepared.retain(|annotation| !annotation.extended);
    }
    for annotation in &mut prepared {
        annotation.normalize_arrays(order_important);
    }
    sort_annotations(&mut prepared);
    prepared
}

fn is_documented(annotation_type: &str, hierarchy: &ClassHierarchy) -> bool {
    match hierarchy.load(annotation_type) {
        Ok(class) => class
            .annotations()
            .iter()
            .any(|annotation| annotation.name == names::DOCUMENTED),
        Err(_) => true,
    }
}

/// Repeated annotations held by a container annotation
///
/// `C` is a container if it has a `value()` element of type `X[]` where `X` is annotated with
/// `@Repeatable(C.class)`.
fn container_elements(
    annotation: &AnnotationItem,
    hierarchy: &ClassHierarchy,
) -> Option<Vec<AnnotationItem>> {
    let container = hierarchy.load(&annotation.name).ok()?;
    let element_type = container.members().iter().find_map(|member| match &member.kind {
        MemberKind::Method { return_type, .. }
            if member.name == "value" && member.parameters().is_empty() =>
        {
            return_type.strip_suffix("[]")
        }
        _ => None,
    })?;

    let element = hierarchy.load(element_type).ok()?;
    let repeatable = element
        .annotations()
        .iter()
        .find(|item| item.name == names::REPEATABLE)?;
    match repeatable.parameter("value")? {
        AnnotationValue::Scalar(value)
            if value.strip_suffix(".class").unwrap_or(value) == annotation.name => {}
        _ => return None,
    }

    match annotation.parameter("value")? {
        AnnotationValue::Array(values) => values
            .iter()
            .map(|value| match value {
                AnnotationValue::Annotation(item) => Some(item.clone()),
                _ => None,
            })
            .collect(),
        _ => None,
    }
}

/// Result of diffing two sorted annotation lists
#[derive(Debug, Default, PartialEq, Eq)]
pub struct AnnotationDiff<'a> {
    /// Only in the required list
    pub missing: Vec<&'a AnnotationItem>,

    /// Only in the found list
    pub added: Vec<&'a AnnotationItem>,
}

/// Two-pointer merge of two sorted annotation lists
pub fn diff<'a>(required: &'a [AnnotationItem], found: &'a [AnnotationItem]) -> AnnotationDiff<'a> {
    let mut result = AnnotationDiff::default();
    let (mut r, mut f) = (0, 0);
    while r < required.len() && f < found.len() {
        match required[r].cmp(&found[f]) {
            Ordering::Less => {
                result.missing.push(&required[r]);
                r += 1;
            }
            Ordering::Greater => {
                result.added.push(&found[f]);
                f += 1;
            }
            Ordering::Equal => {
                r += 1;
                f += 1;
            }
        }
    }
    result.missing.extend(&required[r..]);
    result.added.extend(&found[f..]);
    result
}
