use crate::model::{names, Modifiers};
use std::collections::BTreeSet;

/// Which flavour of compatibility is being checked
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Mode {
    /// Source compatibility (`src`)
    Source,

    /// Source compatibility, also tracking `volatile` (`src-ext`)
    SourceExt,

    /// Binary compatibility (`bin`)
    Binary,
}

/// How declared throwables take part in member comparison
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ThrowsPolicy {
    /// Throws clauses are dropped from both sides before comparing
    Removed,

    /// Normalized throws clauses must be identical
    Normalized,

    /// The found side may declare a subset of the required (normalized) throwables
    Subset,
}

impl ThrowsPolicy {
    /// Compare two sorted lists of throwables under this policy
    pub fn throws_compatible(&self, required: &[String], found: &[String]) -> bool {
        match self {
            ThrowsPolicy::Removed => true,
            ThrowsPolicy::Normalized => required == found,
            ThrowsPolicy::Subset => found
                .iter()
                .all(|throwable| required.binary_search(throwable).is_ok()),
        }
    }
}

/// Where the found descriptions were read from
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum FoundSource {
    /// Reflective loading in a live runtime: constant values may be unreadable and type-use
    /// annotations are invisible
    Reflection,

    /// Class files or signature files
    Static,
}

/// Set of packages (and classes) under test
#[derive(Clone, Default, Debug)]
pub struct PackageGroup {
    /// Packages to test, with a flag for whether subpackages are included
    pub packages: Vec<(String, bool)>,

    /// Packages or classes to leave out, along with everything nested under them
    pub excluded: Vec<String>,
}

impl PackageGroup {
    /// Test the package and all of its subpackages
    pub fn with_package(mut self, package: impl Into<String>) -> PackageGroup {
        self.packages.push((package.into(), true));
        self
    }

    /// Test only classes directly in this package
    pub fn with_package_only(mut self, package: impl Into<String>) -> PackageGroup {
        self.packages.push((package.into(), false));
        self
    }

    pub fn excluding(mut self, name: impl Into<String>) -> PackageGroup {
        self.excluded.push(name.into());
        self
    }

    /// Is the qualified class name part of the group?
    ///
    /// An empty group (no packages listed) contains every class that is not excluded.
    pub fn contains(&self, class_name: &str) -> bool {
        let is_under = |prefix: &str| {
            class_name == prefix
                || (class_name.starts_with(prefix)
                    && matches!(class_name.as_bytes().get(prefix.len()), Some(b'.') | Some(b'$')))
        };

        if self.excluded.iter().any(|excluded| is_under(excluded)) {
            return false;
        }
        if self.packages.is_empty() {
            return true;
        }

        let package = names::package_name(class_name);
        self.packages.iter().any(|(name, subpackages)| {
            package == name
                || (*subpackages
                    && package.starts_with(name.as_str())
                    && package.as_bytes().get(name.len()) == Some(&b'.'))
        })
    }
}

/// Configuration of one checking run
///
/// Built once up front and then only ever read: hierarchy, checker, and report all take it by
/// reference.
#[derive(Clone, Debug)]
pub struct Settings {
    pub mode: Mode,

    /// Modifier bits whose mismatches are reported
    pub tracked_modifiers: Modifiers,

    pub throws_policy: ThrowsPolicy,

    /// Compare constant values of `static final` fields
    pub check_constants: bool,

    pub found_source: FoundSource,

    /// Compare annotations (including those on package-info and module-info units)
    pub track_annotations: bool,

    /// Compare generic signatures (otherwise both sides are erased first). Binary mode always
    /// erases.
    pub track_generics: bool,

    /// Tolerate additions in the found API (no ADD findings for classes or members)
    pub superset: bool,

    /// Treat public nested classes of non-public classes as accessible
    pub all_public: bool,

    /// Don't fail the run when the required classes are not transitively closed
    pub allow_missing_superclasses: bool,

    /// Report additions as warnings instead of errors
    pub added_as_warnings: bool,

    /// Annotation types whose array-valued elements are order sensitive
    pub order_important_annotations: BTreeSet<String>,

    /// Classes under test
    pub packages: PackageGroup,

    /// Include affected subclasses in the rendered report
    pub verbose: bool,
}

impl Settings {
    pub fn new(mode: Mode) -> Settings {
        let mut tracked_modifiers = Modifiers::all() - Modifiers::NEVER_TRACKED;
        if mode != Mode::SourceExt {
            tracked_modifiers.remove(Modifiers::VOLATILE);
        }

        let throws_policy = match mode {
            Mode::Binary => ThrowsPolicy::Removed,
            Mode::Source | Mode::SourceExt => ThrowsPolicy::Normalized,
        };

        Settings {
            mode,
            tracked_modifiers,
            throws_policy,
            check_constants: true,
            found_source: FoundSource::Static,
            track_annotations: true,
            track_generics: true,
            superset: false,
            all_public: false,
            allow_missing_superclasses: false,
            added_as_warnings: false,
            order_important_annotations: BTreeSet::new(),
            packages: PackageGroup::default(),
            verbose: false,
        }
    }

    /// Tolerate a constant value that could only be observed on one side
    pub fn one_way_constant_checking(&self) -> bool {
        (self.check_constants && self.mode == Mode::Binary)
            || self.found_source == FoundSource::Reflection
    }
}
