//! Modifier and throws-clause fixups applied before descriptions are compared
//!
//! Everything here works on the transient copies made for one comparison; descriptions held by a
//! [`ClassHierarchy`] are never touched.

use crate::hierarchy::ClassHierarchy;
use crate::model::{names, ClassDescription, MemberDescription, Modifiers};
use crate::settings::{Mode, ThrowsPolicy};

/// Reconcile class modifiers that outside code cannot tell apart
///
/// A class nobody outside can subclass behaves the same whether it is abstract or not. Enums are
/// implicitly final and their methods are treated as final and non-abstract.
pub fn correct_class_modifiers(required: &mut ClassDescription, found: &mut ClassDescription) {
    if required.is_abstract() != found.is_abstract()
        && !required.can_be_subclassed()
        && !found.can_be_subclassed()
    {
        required.modifiers.insert(Modifiers::ABSTRACT);
        found.modifiers.insert(Modifiers::ABSTRACT);
    }

    if required.is_enum() && found.is_enum() {
        fix_enum(required);
        fix_enum(found);
    }
}

fn fix_enum(class: &mut ClassDescription) {
    class.modifiers.insert(Modifiers::FINAL);
    class.modifiers.remove(Modifiers::ABSTRACT);
    for method in class.declared_methods_mut() {
        method.modifiers.insert(Modifiers::FINAL);
        method.modifiers.remove(Modifiers::ABSTRACT);
    }
}

/// Adjust one member of `class` on its own
///
/// Methods declared by a final class get their `final` bit from whether they are overridden in
/// the hierarchy. In binary mode, `final` on static methods is ignored.
pub fn transform_member(
    class: &ClassDescription,
    member: &mut MemberDescription,
    hierarchy: &ClassHierarchy,
    mode: Mode,
) {
    if !member.is_method() {
        return;
    }

    if class.is_final() && member.declaring_class == class.name {
        let is_final = member.modifiers.contains(Modifiers::FINAL);
        let overridden = hierarchy.is_method_overridden(member);
        if !is_final && !overridden {
            member.modifiers.insert(Modifiers::FINAL);
        } else if is_final && overridden {
            member.modifiers.remove(Modifiers::FINAL);
        }
    }

    if mode == Mode::Binary && member.modifiers.contains(Modifiers::STATIC) {
        member.modifiers.remove(Modifiers::FINAL);
    }
}

/// Adjust a matched pair of members
///
/// Constructors of abstract classes are only reachable from subclasses, so `public` and
/// `protected` mean the same there. A found method that only picked up `final` by being declared
/// in a different class than the required one loses it.
pub fn transform_pair(
    required_class: &ClassDescription,
    required: &mut MemberDescription,
    found_class: &ClassDescription,
    found: &mut MemberDescription,
) {
    if required.is_constructor()
        && found.is_constructor()
        && required_class.is_abstract()
        && found_class.is_abstract()
    {
        let public_vs_protected = |m1: &MemberDescription, m2: &MemberDescription| {
            m1.modifiers.contains(Modifiers::PUBLIC) && m2.modifiers.contains(Modifiers::PROTECTED)
        };
        if public_vs_protected(required, found) || public_vs_protected(found, required) {
            for member in [&mut *required, &mut *found] {
                member.modifiers.remove(Modifiers::PUBLIC);
                member.modifiers.insert(Modifiers::PROTECTED);
            }
        }
    }

    if required.is_method()
        && found.is_method()
        && found.modifiers.contains(Modifiers::FINAL)
        && !required.modifiers.contains(Modifiers::FINAL)
        && found.declaring_class != required.declaring_class
    {
        found.modifiers.remove(Modifiers::FINAL);
    }
}

/// Bring the throws clauses of every member in line with the policy
pub fn apply_throws_policy(
    class: &mut ClassDescription,
    policy: ThrowsPolicy,
    hierarchy: &ClassHierarchy,
) {
    for member in class.members_mut() {
        match policy {
            ThrowsPolicy::Removed => member.set_throws(vec![]),
            ThrowsPolicy::Normalized | ThrowsPolicy::Subset => normalize_throws(member, hierarchy),
        }
    }
}

/// Drop unchecked throwables and those already covered by another listed throwable
///
/// Throwables that cannot be resolved are kept as they are.
pub fn normalize_throws(member: &mut MemberDescription, hierarchy: &ClassHierarchy) {
    if member.throws().is_empty() {
        return;
    }

    let checked: Vec<String> = member
        .throws()
        .iter()
        .filter(|throwable| {
            !hierarchy.is_subclass_of(throwable, names::RUNTIME_EXCEPTION)
                && !hierarchy.is_subclass_of(throwable, names::ERROR)
        })
        .cloned()
        .collect();

    let normalized: Vec<String> = checked
        .iter()
        .filter(|throwable| {
            !checked
                .iter()
                .any(|other| other != *throwable && hierarchy.is_subclass_of(throwable, other))
        })
        .cloned()
        .collect();

    member.set_throws(normalized);
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hierarchy::Snapshot;
    use crate::model::ClassKind;
    use crate::settings::Settings;

    fn throwable(name: &str, superclass: &str) -> ClassDescription {
        ClassDescription::new(name, ClassKind::Class, Modifiers::PUBLIC).with_superclass(superclass)
    }

    fn exceptions() -> Snapshot {
        let mut snapshot = Snapshot::new();
        for (name, superclass) in [
            ("java.lang.Throwable", names::OBJECT),
            ("java.lang.Exception", "java.lang.Throwable"),
            ("java.lang.Error", "java.lang.Throwable"),
            ("java.lang.RuntimeException", "java.lang.Exception"),
            ("java.lang.IllegalStateException", "java.lang.RuntimeException"),
            ("java.io.IOException", "java.lang.Exception"),
            ("java.io.FileNotFoundException", "java.io.IOException"),
        ] {
            snapshot
                .add(throwable(name, superclass))
                .expect("unique class names");
        }
        snapshot
    }

    #[test]
    fn throws_normalization() {
        let snapshot = exceptions();
        let settings = Settings::new(Mode::Source);
        let hierarchy = ClassHierarchy::new(&snapshot, &settings);

        let mut method = MemberDescription::method("a.A", "m", Modifiers::PUBLIC, "void", vec![])
            .with_throws(vec![
                String::from("java.io.FileNotFoundException"),
                String::from("java.lang.IllegalStateException"),
                String::from("java.io.IOException"),
                String::from("x.Unknown"),
                String::from("java.lang.Error"),
            ]);
        normalize_throws(&mut method, &hierarchy);
        assert_eq!(method.throws(), ["java.io.IOException", "x.Unknown"]);
    }

    #[test]
    fn non_subclassable_abstract_merge() {
        let private_ctor = MemberDescription::constructor("a.A", Modifiers::PRIVATE, vec![]);
        let mut required = ClassDescription::new("a.A", ClassKind::Class, Modifiers::PUBLIC)
            .with_member(private_ctor.clone());
        let mut found = ClassDescription::new(
            "a.A",
            ClassKind::Class,
            Modifiers::PUBLIC | Modifiers::ABSTRACT,
        )
        .with_member(private_ctor);

        correct_class_modifiers(&mut required, &mut found);
        assert!(required.is_abstract());
        assert!(found.is_abstract());
    }

    #[test]
    fn subclassable_abstract_mismatch_is_kept() {
        let ctor = MemberDescription::constructor("a.A", Modifiers::PUBLIC, vec![]);
        let mut required = ClassDescription::new("a.A", ClassKind::Class, Modifiers::PUBLIC)
            .with_member(ctor.clone());
        let mut found = ClassDescription::new(
            "a.A",
            ClassKind::Class,
            Modifiers::PUBLIC | Modifiers::ABSTRACT,
        )
        .with_member(ctor);

        correct_class_modifiers(&mut required, &mut found);
        assert!(!required.is_abstract());
        assert!(found.is_abstract());
    }

    #[test]
    fn abstract_constructor_visibility_merge() {
        let mods = Modifiers::PUBLIC | Modifiers::ABSTRACT;
        let required_class = ClassDescription::new("a.A", ClassKind::Class, mods);
        let found_class = ClassDescription::new("a.A", ClassKind::Class, mods);
        let mut required = MemberDescription::constructor("a.A", Modifiers::PUBLIC, vec![]);
        let mut found = MemberDescription::constructor("a.A", Modifiers::PROTECTED, vec![]);

        transform_pair(&required_class, &mut required, &found_class, &mut found);
        assert_eq!(required.modifiers, Modifiers::PROTECTED);
        assert_eq!(found.modifiers, Modifiers::PROTECTED);
    }

    #[test]
    fn inherited_final_is_dropped() {
        let class = ClassDescription::new("a.B", ClassKind::Class, Modifiers::PUBLIC);
        let mut required = MemberDescription::method("a.B", "m", Modifiers::PUBLIC, "void", vec![]);
        let mut found = MemberDescription::method(
            "a.A",
            "m",
            Modifiers::PUBLIC | Modifiers::FINAL,
            "void",
            vec![],
        );

        transform_pair(&class, &mut required, &class, &mut found);
        assert!(!found.modifiers.contains(Modifiers::FINAL));
    }

    #[test]
    fn final_class_methods_and_binary_statics() {
        let snapshot = Snapshot::new();
        let settings = Settings::new(Mode::Binary);
        let hierarchy = ClassHierarchy::new(&snapshot, &settings);

        let class = ClassDescription::new(
            "a.F",
            ClassKind::Class,
            Modifiers::PUBLIC | Modifiers::FINAL,
        );
        let mut method = MemberDescription::method("a.F", "m", Modifiers::PUBLIC, "void", vec![]);
        transform_member(&class, &mut method, &hierarchy, Mode::Binary);
        assert!(method.modifiers.contains(Modifiers::FINAL));

        let mut static_method = MemberDescription::method(
            "a.F",
            "s",
            Modifiers::PUBLIC | Modifiers::STATIC,
            "void",
            vec![],
        );
        transform_member(&class, &mut static_method, &hierarchy, Mode::Binary);
        assert!(!static_method.modifiers.contains(Modifiers::FINAL));
    }

    #[test]
    fn enum_fix() {
        let f = MemberDescription::method(
            "a.E",
            "f",
            Modifiers::PUBLIC | Modifiers::ABSTRACT,
            "void",
            vec![],
        );
        let mut required = ClassDescription::new(
            "a.E",
            ClassKind::Enum,
            Modifiers::PUBLIC | Modifiers::ABSTRACT,
        )
        .with_member(f);
        let mut found = ClassDescription::new("a.E", ClassKind::Enum, Modifiers::PUBLIC);

        correct_class_modifiers(&mut required, &mut found);
        assert!(required.is_final() && !required.is_abstract());
        assert!(found.is_final());
        let method = &required.members()[0];
        assert!(method.modifiers.contains(Modifiers::FINAL));
        assert!(!method.modifiers.contains(Modifiers::ABSTRACT));
    }
}
