//! Helpers for qualified class names
//!
//! Names are in source form with `$` separating nested classes from their outer class, for example
//! `java.util.Map$Entry`.

/// Name given to the synthetic unit that carries package annotations
pub const PACKAGE_INFO: &str = "package-info";

/// Name given to the synthetic unit that carries module annotations
pub const MODULE_INFO: &str = "module-info";

/// Name used for constructors
pub const INIT: &str = "<init>";

// JDK names
pub const OBJECT: &str = "java.lang.Object";
pub const RUNTIME_EXCEPTION: &str = "java.lang.RuntimeException";
pub const ERROR: &str = "java.lang.Error";
pub const DOCUMENTED: &str = "java.lang.annotation.Documented";
pub const REPEATABLE: &str = "java.lang.annotation.Repeatable";

/// Check if a string would be a valid qualified class name
pub fn check_valid(name: impl AsRef<str>) -> Result<(), String> {
    let name = name.as_ref();
    if name.is_empty() {
        return Err(format!("Qualified name '{}' is empty", name));
    }
    for segment in name.split('.') {
        if segment.is_empty() {
            return Err(format!("Qualified name '{}' has an empty segment", name));
        } else if segment.contains(&[';', '[', '/', '<', '>', ' '][..]) {
            return Err(format!(
                "Qualified name '{}' contains an illegal character",
                name
            ));
        }
    }
    Ok(())
}

/// Package part of a qualified name (empty for the default package)
pub fn package_name(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) => &name[..idx],
        None => "",
    }
}

/// Name of the package-info unit of a package
pub fn package_info(package: &str) -> String {
    if package.is_empty() {
        String::from(PACKAGE_INFO)
    } else {
        format!("{}.{}", package, PACKAGE_INFO)
    }
}

/// Last segment of the name, after any package and outer class
pub fn simple_name(name: &str) -> &str {
    let start = name.rfind(&['.', '$'][..]).map_or(0, |idx| idx + 1);
    &name[start..]
}

/// Qualified name of the directly enclosing class, if this is a nested class name
pub fn outer_class(name: &str) -> Option<&str> {
    let idx = name.rfind('$')?;
    if idx < package_name(name).len() {
        None
    } else {
        Some(&name[..idx])
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn validity() {
        assert!(check_valid("java.util.Map$Entry").is_ok());
        assert!(check_valid("Top").is_ok());
        assert!(check_valid("").is_err());
        assert!(check_valid("java..util").is_err());
        assert!(check_valid("java/util/List").is_err());
        assert!(check_valid("java.util.List<T>").is_err());
    }

    #[test]
    fn name_parts() {
        assert_eq!(package_name("java.util.Map$Entry"), "java.util");
        assert_eq!(package_name("Top"), "");
        assert_eq!(simple_name("java.util.Map$Entry"), "Entry");
        assert_eq!(simple_name("Top"), "Top");
        assert_eq!(outer_class("java.util.Map$Entry"), Some("java.util.Map"));
        assert_eq!(outer_class("java.util.Map"), None);
    }

    #[test]
    fn package_info_units() {
        assert_eq!(package_info("a.b"), "a.b.package-info");
        assert_eq!(package_info(""), "package-info");
    }
}
