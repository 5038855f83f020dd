//! Generic type erasure of class descriptions
//!
//! Types are handled in their textual form: `java.util.List<? extends T>`, `T[]`, `E...`.
//! Erasure strips type arguments and replaces type variables by the erasure of their leftmost
//! bound (or `java.lang.Object` when unbounded).

use crate::model::{names, ClassDescription, MemberDescription, MemberKind};
use std::collections::HashMap;

/// Remove every `<...>` section from a type (nested brackets included)
pub fn strip_type_arguments(type_name: &str) -> String {
    let mut depth: usize = 0;
    let mut erased = String::with_capacity(type_name.len());
    for c in type_name.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            _ if depth == 0 => erased.push(c),
            _ => (),
        }
    }
    erased
}

/// Split on a separator, but only outside of any `<...>` section
fn split_top_level(source: &str, separator: char) -> Vec<&str> {
    let mut parts = vec![];
    let mut depth: usize = 0;
    let mut start = 0;
    for (idx, c) in source.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            _ if c == separator && depth == 0 => {
                parts.push(&source[start..idx]);
                start = idx + c.len_utf8();
            }
            _ => (),
        }
    }
    parts.push(&source[start..]);
    parts
}

/// Map from type variable to the erasure of its leftmost bound
///
/// Bounds referring to other variables in the same list (`<T, U extends T>`) are resolved, and
/// `outer` variables are in scope too (eg. class variables for a method's own variables).
fn type_variables(type_parameters: &str, outer: &HashMap<String, String>) -> HashMap<String, String> {
    let mut variables = outer.clone();
    let inner = type_parameters.trim();
    let inner = inner
        .strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
        .unwrap_or(inner);
    if inner.trim().is_empty() {
        return variables;
    }

    let mut declared: Vec<(String, Option<String>)> = vec![];
    for parameter in split_top_level(inner, ',') {
        let parameter = parameter.trim();
        match parameter.split_once(" extends ") {
            Some((name, bounds)) => {
                let first_bound = split_top_level(bounds, '&')[0].trim().to_owned();
                declared.push((name.trim().to_owned(), Some(first_bound)));
            }
            None => declared.push((parameter.to_owned(), None)),
        }
    }

    // Unbounded first, so that bounds mentioning sibling variables can be resolved in order
    for (name, _) in &declared {
        variables.insert(name.clone(), String::from(names::OBJECT));
    }
    for _ in 0..declared.len() {
        for (name, bound) in &declared {
            if let Some(bound) = bound {
                let erased = erase_type(bound, &variables);
                variables.insert(name.clone(), erased);
            }
        }
    }
    variables
}

/// Erase one type, given the type variables in scope
fn erase_type(type_name: &str, variables: &HashMap<String, String>) -> String {
    let stripped = strip_type_arguments(type_name.trim());
    let erased = {
        let (rest, varargs) = match stripped.strip_suffix("...") {
            Some(rest) => (rest, "..."),
            None => (stripped.as_str(), ""),
        };
        let (base, dimensions) = rest.split_at(rest.find('[').unwrap_or(rest.len()));
        variables
            .get(base)
            .map(|bound| format!("{}{}{}", bound, dimensions, varargs))
    };
    erased.unwrap_or(stripped)
}

fn erase_member(member: &MemberDescription, class_variables: &HashMap<String, String>) -> MemberDescription {
    let mut erased = member.clone();
    let variables = type_variables(member.type_parameters(), class_variables);

    match &mut erased.kind {
        MemberKind::Field { field_type, .. } => {
            *field_type = erase_type(field_type, &variables);
        }
        MemberKind::Method {
            signature,
            return_type,
        } => {
            *return_type = erase_type(return_type, &variables);
            signature.type_parameters.clear();
            for param in &mut signature.parameters {
                *param = erase_type(param, &variables);
            }
        }
        MemberKind::Constructor(signature) => {
            signature.type_parameters.clear();
            for param in &mut signature.parameters {
                *param = erase_type(param, &variables);
            }
        }
        MemberKind::Inner => (),
    }

    let throws: Vec<String> = erased
        .throws()
        .iter()
        .map(|throwable| erase_type(throwable, &variables))
        .collect();
    erased.set_throws(throws);
    erased
}

/// Erase a class description and all of its members
///
/// The input is left untouched. Erasure is idempotent: erasing an erased description changes
/// nothing.
pub fn erasure(class: &ClassDescription) -> ClassDescription {
    let variables = type_variables(&class.type_parameters, &HashMap::new());
    let mut erased = class.clone();
    erased.type_parameters.clear();
    erased.superclass = class.superclass.as_deref().map(strip_type_arguments);
    erased.interfaces = class
        .interfaces
        .iter()
        .map(|interface| strip_type_arguments(interface))
        .collect();
    for member in erased.members_mut() {
        *member = erase_member(member, &variables);
    }
    erased
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::{ClassKind, Modifiers};

    #[test]
    fn strip() {
        assert_eq!(strip_type_arguments("java.util.List<java.lang.String>"), "java.util.List");
        assert_eq!(
            strip_type_arguments("java.util.Map<K, java.util.List<V>>[]"),
            "java.util.Map[]"
        );
        assert_eq!(strip_type_arguments("a.Outer<T>$Inner<U>"), "a.Outer$Inner");
        assert_eq!(strip_type_arguments("int"), "int");
    }

    #[test]
    fn variables_and_bounds() {
        let vars = type_variables(
            "<T extends java.lang.Comparable<T> & java.io.Serializable, U extends T, V>",
            &HashMap::new(),
        );
        assert_eq!(vars["T"], "java.lang.Comparable");
        assert_eq!(vars["U"], "java.lang.Comparable");
        assert_eq!(vars["V"], "java.lang.Object");
    }

    #[test]
    fn erase_types() {
        let vars = type_variables("<T extends java.lang.Number>", &HashMap::new());
        assert_eq!(erase_type("T", &vars), "java.lang.Number");
        assert_eq!(erase_type("T[][]", &vars), "java.lang.Number[][]");
        assert_eq!(erase_type("T...", &vars), "java.lang.Number...");
        assert_eq!(erase_type("java.util.List<T>", &vars), "java.util.List");
        assert_eq!(erase_type("Tx", &vars), "Tx");
    }

    fn generic_class() -> ClassDescription {
        ClassDescription::new("a.Box", ClassKind::Class, Modifiers::PUBLIC)
            .with_type_parameters("<T extends java.lang.Number>")
            .with_superclass("a.Base<T>")
            .with_interface("java.lang.Comparable<a.Box<T>>")
            .with_member(MemberDescription::field("a.Box", "value", Modifiers::PUBLIC, "T"))
            .with_member(
                MemberDescription::method(
                    "a.Box",
                    "map",
                    Modifiers::PUBLIC,
                    "a.Box<R>",
                    vec![String::from("java.util.function.Function<T, R>"), String::from("R[]")],
                )
                .with_type_parameters("<R>"),
            )
    }

    #[test]
    fn erase_class() {
        let erased = erasure(&generic_class());
        assert!(erased.type_parameters.is_empty());
        assert_eq!(erased.superclass.as_deref(), Some("a.Base"));
        assert_eq!(erased.interfaces, vec![String::from("java.lang.Comparable")]);
        assert_eq!(erased.members()[0].to_string(), "public java.lang.Number value");
        assert_eq!(
            erased.members()[1].to_string(),
            "public a.Box map(java.util.function.Function,java.lang.Object[])"
        );
        assert!(!erased.has_type_parameters());
    }

    #[test]
    fn idempotent() {
        let once = erasure(&generic_class());
        let twice = erasure(&once);
        assert_eq!(once, twice);
    }
}
