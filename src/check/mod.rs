//! Comparison of a required API against a found API
//!
//! A [`SignatureChecker`] owns one [`ClassHierarchy`] per side. Required classes are streamed
//! through it one at a time: each is matched up with the found class of the same name, both are
//! normalized on private copies, and every divergence is recorded in a [`SortedReport`].

pub mod annotations;
mod exclude;
pub mod normalize;

pub use exclude::*;

use annotations::{diff, prepare, AnnotationDiff};
use crate::erasure::{erasure, strip_type_arguments};
use crate::errors::Error;
use crate::hierarchy::{ClassDescriptionLoader, ClassHierarchy, ClassSet, LoadError};
use crate::model::{names, AnnotationItem, ClassDescription, MemberDescription, MemberKey, MemberType};
use crate::report::{Finding, MessageType, Report, SortedReport};
use crate::settings::{FoundSource, Mode, Settings};
use log::{debug, info, warn};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};

/// Result of a complete run
#[derive(Debug)]
pub struct RunOutcome {
    pub report: Report,

    /// Unresolvable supertypes of required classes (only ever non-empty when
    /// [`Settings::allow_missing_superclasses`] is set)
    pub missing_superclasses: BTreeSet<String>,

    /// Classes of the found API that were compared or otherwise accounted for
    pub tracked: BTreeSet<String>,

    /// Number of classes and members skipped by the exclusion predicate
    pub exclusions: usize,
}

impl RunOutcome {
    /// Did the run find no errors?
    pub fn passed(&self) -> bool {
        self.report.is_clean()
    }
}

pub struct SignatureChecker<'a> {
    settings: &'a Settings,

    /// Classes of the API we are checking against
    required: ClassHierarchy<'a>,

    /// Classes of the API being checked
    found: ClassHierarchy<'a>,

    exclude: Box<dyn Exclude + 'a>,
    hook: Box<dyn PreComparisonHook + 'a>,

    /// Names of classes already accounted for (so they aren't reported as added)
    tracked: BTreeSet<String>,

    report: SortedReport,
}

impl<'a> SignatureChecker<'a> {
    pub fn new(
        settings: &'a Settings,
        required: impl ClassDescriptionLoader + 'a,
        found: impl ClassDescriptionLoader + 'a,
    ) -> SignatureChecker<'a> {
        SignatureChecker {
            settings,
            required: ClassHierarchy::new(required, settings),
            found: ClassHierarchy::new(found, settings),
            exclude: Box::new(NoExclusions),
            hook: Box::new(NoHook),
            tracked: BTreeSet::new(),
            report: SortedReport::new(settings),
        }
    }

    pub fn with_exclude(mut self, exclude: impl Exclude + 'a) -> SignatureChecker<'a> {
        self.exclude = Box::new(exclude);
        self
    }

    pub fn with_hook(mut self, hook: impl PreComparisonHook + 'a) -> SignatureChecker<'a> {
        self.hook = Box::new(hook);
        self
    }

    pub fn report(&self) -> &SortedReport {
        &self.report
    }

    pub fn tracked(&self) -> &BTreeSet<String> {
        &self.tracked
    }

    /// Check a stream of required classes against the found API
    ///
    /// `found_names` enumerates the found API, and is used to detect added classes. The required
    /// classes are first checked for transitive closure: if some supertype cannot be resolved in
    /// the required hierarchy, the run fails before comparing anything (unless
    /// [`Settings::allow_missing_superclasses`] is set). A panic raised anywhere in the run,
    /// loaders included, ends it with [`Error::ResourceExhaustion`].
    pub fn run<S: AsRef<str>>(
        mut self,
        required: impl IntoIterator<Item = ClassDescription>,
        found_names: impl IntoIterator<Item = S>,
    ) -> Result<RunOutcome, Error> {
        let required: Vec<ClassDescription> = required.into_iter().collect();
        info!("Checking {} required classes", required.len());

        let guarded = panic::catch_unwind(AssertUnwindSafe(|| -> Result<BTreeSet<String>, Error> {
            let missing_superclasses = self.check_closure(&required)?;
            for class in required {
                self.verify_required(class);
            }
            if !self.settings.superset {
                self.check_added_classes(found_names);
            }
            if self.settings.track_annotations {
                self.check_added_packages();
            }
            Ok(missing_superclasses)
        }));
        let missing_superclasses = guarded.map_err(Error::from)??;

        let mut outcome = self.finish();
        outcome.missing_superclasses = missing_superclasses;
        info!(
            "Finished with {} errors and {} warnings",
            outcome.report.error_count(),
            outcome.report.warning_count()
        );
        Ok(outcome)
    }

    /// Produce the sorted report for everything checked so far
    pub fn finish(self) -> RunOutcome {
        RunOutcome {
            exclusions: self.exclude.exclusions_made(),
            report: self.report.finish(),
            missing_superclasses: BTreeSet::new(),
            tracked: self.tracked,
        }
    }

    fn check_closure(&self, required: &[ClassDescription]) -> Result<BTreeSet<String>, Error> {
        let mut closure = ClassSet::new(&self.required);
        for class in required {
            if !class.is_package_or_module_info() {
                closure.add_class(&class.name);
            }
        }

        let missing = closure.get_missing_classes().clone();
        if missing.is_empty() {
            return Ok(missing);
        }
        if self.settings.allow_missing_superclasses {
            warn!("Required classes are not closed, missing: {:?}", missing);
            Ok(missing)
        } else {
            Err(Error::ClosureViolation {
                missing: missing.into_iter().collect(),
            })
        }
    }

    /// Look up and check the found counterpart of one required class
    ///
    /// Classes outside the package group are ignored. Missing, unlinkable, or inaccessible found
    /// classes are reported without going any further.
    pub fn verify_required(&mut self, required: ClassDescription) {
        let name = required.name.clone();
        if !self.settings.packages.contains(&name) {
            return;
        }

        if required.is_package_or_module_info() {
            if self.settings.track_annotations {
                self.verify_package_or_module_info(&required);
            }
            return;
        }

        if let Exclusion::Exclude(reason) = self.exclude.check(&required, None) {
            debug!("Skipping class '{}': {}", name, reason);
            self.tracked.insert(name);
            return;
        }

        let found = match self.found.load(&name) {
            Ok(found) => found.clone(),
            Err(LoadError::NotFound(_)) => {
                self.report
                    .add_error(MessageType::MissClasses, name, MemberType::Class, "");
                return;
            }
            Err(LoadError::Linkage { message, .. }) => {
                self.report_linkage(name, &message);
                return;
            }
        };

        let missing_supers = match self.missing_supertypes(&found) {
            Ok(missing) => missing,
            Err(message) => {
                self.report_linkage(name, &message);
                return;
            }
        };
        if !missing_supers.is_empty() {
            for missing in missing_supers {
                self.report.add_error(
                    MessageType::MissSuperclasses,
                    missing,
                    MemberType::Class,
                    name.as_str(),
                );
            }
            return;
        }

        if !self.found.is_accessible(&found) {
            self.report
                .add_error(MessageType::MissClasses, name, MemberType::Class, "");
            return;
        }

        if !self.hook.accept(&found) {
            debug!("Skipping class '{}': rejected before comparison", name);
            return;
        }
        let mut found = self.hook.transform(found);
        let mut required = required;

        normalize::apply_throws_policy(&mut required, self.settings.throws_policy, &self.required);
        normalize::apply_throws_policy(&mut found, self.settings.throws_policy, &self.found);

        if !self.settings.track_generics
            || self.settings.mode == Mode::Binary
            || required.has_type_parameters() != found.has_type_parameters()
        {
            required = erasure(&required);
            found = erasure(&found);
        }

        self.verify_class(required, found);
    }

    /// Direct supertypes of a found class that don't resolve
    ///
    /// Fails with the loader's message as soon as a supertype exists but cannot be linked.
    fn missing_supertypes(&self, class: &ClassDescription) -> Result<Vec<String>, String> {
        let mut missing = vec![];
        for name in class.supertypes().map(strip_type_arguments) {
            match self.found.load(&name) {
                Ok(_) => (),
                Err(LoadError::NotFound(_)) => missing.push(name),
                Err(LoadError::Linkage { message, .. }) => return Err(message),
            }
        }
        Ok(missing)
    }

    fn report_linkage(&mut self, name: String, message: &str) {
        let finding = Finding::new(
            MessageType::ErrorLinkErr,
            name.as_str(),
            MemberType::Class,
            format!("linkage error: {}", message),
        )
        .with_tail(format!("class {} could not be linked", name));
        self.report.add(finding);
        self.tracked.insert(name);
    }

    fn verify_package_or_module_info(&mut self, required: &ClassDescription) {
        self.tracked.insert(required.name.clone());
        let found_annotations: Vec<AnnotationItem> = match self.found.load(&required.name) {
            Ok(found) => found.annotations().to_vec(),
            Err(err) => {
                debug!("No found counterpart for '{}': {}", required.name, err);
                vec![]
            }
        };
        self.check_annotations(&required.name, None, required.annotations(), &found_annotations);
    }

    /// Compare a required class with its found counterpart
    ///
    /// Both descriptions are private copies: modifiers get normalized in place before they are
    /// compared.
    pub fn verify_class(&mut self, mut required: ClassDescription, mut found: ClassDescription) {
        debug!("Verifying '{}'", required.name);
        self.tracked.insert(found.name.clone());
        self.report.tested(&found);

        normalize::correct_class_modifiers(&mut required, &mut found);

        self.check_annotations(&required.name, None, required.annotations(), found.annotations());
        if !required.is_compatible(&found, self.settings) {
            self.report.add_error(
                MessageType::MissClasses,
                required.name.as_str(),
                MemberType::Class,
                required.to_string(),
            );
            self.report.add_error(
                MessageType::AddClasses,
                found.name.as_str(),
                MemberType::Class,
                found.to_string(),
            );
        }

        let found_members: HashMap<MemberKey, &MemberDescription> = found
            .members()
            .iter()
            .map(|member| (member.key(), member))
            .collect();
        for member in required.members() {
            if let Exclusion::Exclude(reason) = self.exclude.check(&required, Some(member)) {
                debug!("Skipping '{}' in '{}': {}", member, required.name, reason);
                continue;
            }
            let counterpart = found_members.get(&member.key()).copied();
            self.track_member(&required, &found, Some(member), counterpart);
        }

        if self.settings.superset {
            return;
        }
        let required_keys: HashSet<MemberKey> =
            required.members().iter().map(|member| member.key()).collect();
        for member in found.members() {
            if required_keys.contains(&member.key()) {
                continue;
            }
            if let Exclusion::Exclude(reason) = self.exclude.check(&found, Some(member)) {
                debug!("Skipping '{}' in '{}': {}", member, found.name, reason);
                continue;
            }
            self.track_member(&required, &found, None, Some(member));
        }
    }

    /// Compare one required member with its found counterpart (either may be absent)
    fn track_member(
        &mut self,
        required_class: &ClassDescription,
        found_class: &ClassDescription,
        required: Option<&MemberDescription>,
        found: Option<&MemberDescription>,
    ) {
        let mode = self.settings.mode;
        let mut required = required.cloned();
        let mut found = found.cloned();
        if let Some(member) = &mut required {
            normalize::transform_member(required_class, member, &self.found, mode);
        }
        if let Some(member) = &mut found {
            normalize::transform_member(found_class, member, &self.found, mode);
        }

        if let (Some(req), Some(fnd)) = (&mut required, &mut found) {
            normalize::transform_pair(required_class, req, found_class, fnd);
            self.check_annotations(
                &required_class.name,
                Some(&*req),
                req.annotations(),
                fnd.annotations(),
            );

            if req.is_compatible(fnd, self.settings, false) {
                return;
            }

            // A constant value that only one side could observe
            if self.settings.one_way_constant_checking()
                && req.is_field()
                && req.constant_value().is_some() != fnd.constant_value().is_some()
                && req.is_compatible(fnd, self.settings, true)
            {
                return;
            }
        }

        let class_name = required_class.name.as_str();
        if let Some(member) = &required {
            let member_type = member.member_type();
            self.report.add_error(
                MessageType::missing(member_type),
                class_name,
                member_type,
                member.to_string(),
            );
        }
        if let (Some(member), false) = (&found, self.settings.superset) {
            let member_type = member.member_type();
            let kind = self.added_kind(MessageType::added(member_type));
            self.report.add_error(
                kind,
                class_name,
                member_type,
                member.to_string(),
            );
        }
    }

    fn added_kind(&self, kind: MessageType) -> MessageType {
        if self.settings.added_as_warnings {
            kind.as_warning()
        } else {
            kind
        }
    }

    /// Diff the annotations of a class (`member` is `None`) or of one of its members
    fn check_annotations(
        &mut self,
        class_name: &str,
        member: Option<&MemberDescription>,
        required: &[AnnotationItem],
        found: &[AnnotationItem],
    ) {
        if !self.settings.track_annotations || (required.is_empty() && found.is_empty()) {
            return;
        }

        let order_important = &self.settings.order_important_annotations;
        let drop_extended = self.settings.found_source == FoundSource::Reflection;
        let required = prepare(required, &self.required, order_important, drop_extended);
        let found = prepare(found, &self.found, order_important, false);
        let AnnotationDiff { missing, added } = diff(&required, &found);

        let (member_type, prefix) = match member {
            Some(member) => (member.member_type(), format!("{}:", member.signature())),
            None => (MemberType::Class, String::new()),
        };
        for annotation in missing {
            self.report.add_error(
                MessageType::MissAnno,
                class_name,
                member_type,
                format!("{}{}", prefix, annotation),
            );
        }
        let add_anno = self.added_kind(MessageType::AddAnno);
        for annotation in added {
            self.report.add_error(
                add_anno,
                class_name,
                member_type,
                format!("{}{}", prefix, annotation),
            );
        }
    }

    /// Report found classes that the required API does not have
    ///
    /// Names that don't resolve or don't link are skipped. Found package and module info units
    /// that were not compared have all their annotations reported as added.
    pub fn check_added_classes<S: AsRef<str>>(&mut self, found_names: impl IntoIterator<Item = S>) {
        for name in found_names {
            let name = name.as_ref();
            if self.tracked.contains(name) || !self.settings.packages.contains(name) {
                continue;
            }

            let class = match self.found.load(name) {
                Ok(class) => class.clone(),
                Err(err) => {
                    debug!("Skipping added class candidate: {}", err);
                    continue;
                }
            };

            if class.is_package_or_module_info() {
                if self.settings.track_annotations {
                    self.tracked.insert(class.name.clone());
                    self.check_annotations(&class.name, None, &[], class.annotations());
                }
                continue;
            }

            if !self.found.is_accessible(&class) {
                continue;
            }
            if let Exclusion::Exclude(reason) = self.exclude.check(&class, None) {
                debug!("Skipping added class '{}': {}", name, reason);
                continue;
            }
            let resolved =
                matches!(self.missing_supertypes(&class), Ok(missing) if missing.is_empty());
            if !self.hook.accept(&class) || !resolved {
                continue;
            }

            let kind = self.added_kind(MessageType::added(class.member_type()));
            self.report
                .add_error(kind, class.name.as_str(), class.member_type(), "");
        }
    }

    /// Report annotations of package-info units of tested packages that were never compared
    pub fn check_added_packages(&mut self) {
        let packages: BTreeSet<String> = self
            .tracked
            .iter()
            .map(|name| names::package_name(name).to_owned())
            .collect();

        for package in packages {
            let info = names::package_info(&package);
            if self.tracked.contains(&info) {
                continue;
            }
            let annotations = match self.found.load(&info) {
                Ok(found) => found.annotations().to_vec(),
                Err(_) => continue,
            };
            self.tracked.insert(info.clone());
            self.check_annotations(&info, None, &[], &annotations);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hierarchy::Snapshot;
    use crate::model::{ClassKind, Modifiers};

    fn public_class(name: &str) -> ClassDescription {
        ClassDescription::new(name, ClassKind::Class, Modifiers::PUBLIC)
            .with_superclass(names::OBJECT)
            .with_member(MemberDescription::constructor(name, Modifiers::PUBLIC, vec![]))
    }

    fn object() -> ClassDescription {
        ClassDescription::new(names::OBJECT, ClassKind::Class, Modifiers::PUBLIC)
    }

    fn kinds(report: &SortedReport) -> Vec<MessageType> {
        report.raw_findings().iter().map(|f| f.kind).collect()
    }

    #[test]
    fn incompatible_member_is_missing_and_added() {
        let settings = Settings::new(Mode::Source);
        let snapshot = Snapshot::from_classes(vec![object()]).expect("valid snapshot");
        let mut checker = SignatureChecker::new(&settings, &snapshot, &snapshot);

        let required = public_class("a.A").with_member(MemberDescription::field(
            "a.A",
            "x",
            Modifiers::PUBLIC,
            "int",
        ));
        let found = public_class("a.A").with_member(MemberDescription::field(
            "a.A",
            "x",
            Modifiers::PUBLIC,
            "long",
        ));
        checker.verify_class(required, found);
        assert_eq!(
            kinds(checker.report()),
            vec![MessageType::MissFields, MessageType::AddFields]
        );
    }

    #[test]
    fn superset_and_warnings() {
        let mut settings = Settings::new(Mode::Source);
        settings.added_as_warnings = true;
        let mut superset = settings.clone();
        superset.superset = true;
        let snapshot = Snapshot::from_classes(vec![object()]).expect("valid snapshot");

        let found = || {
            public_class("a.A").with_member(MemberDescription::method(
                "a.A",
                "extra",
                Modifiers::PUBLIC,
                "void",
                vec![],
            ))
        };

        let mut checker = SignatureChecker::new(&settings, &snapshot, &snapshot);
        checker.verify_class(public_class("a.A"), found());
        assert_eq!(kinds(checker.report()), vec![MessageType::AddMethodsWarn]);
        assert_eq!(checker.report().error_count(), 0);

        let mut checker = SignatureChecker::new(&superset, &snapshot, &snapshot);
        checker.verify_class(public_class("a.A"), found());
        assert!(checker.report().raw_findings().is_empty());
    }

    #[test]
    fn excluded_members_are_skipped() {
        let settings = Settings::new(Mode::Source);
        let snapshot = Snapshot::from_classes(vec![object()]).expect("valid snapshot");
        let mut checker = SignatureChecker::new(&settings, &snapshot, &snapshot)
            .with_exclude(ExcludeList::new().with("a.A#gone"));

        let required = public_class("a.A").with_member(MemberDescription::method(
            "a.A",
            "gone",
            Modifiers::PUBLIC,
            "void",
            vec![],
        ));
        checker.verify_class(required, public_class("a.A"));
        assert!(checker.report().raw_findings().is_empty());
        assert_eq!(checker.finish().exclusions, 1);
    }

    #[test]
    fn member_annotation_text() {
        let settings = Settings::new(Mode::Source);
        let snapshot = Snapshot::from_classes(vec![object()]).expect("valid snapshot");
        let mut checker = SignatureChecker::new(&settings, &snapshot, &snapshot);

        let method = |annotated: bool| {
            let method = MemberDescription::method(
                "a.A",
                "m",
                Modifiers::PUBLIC,
                "void",
                vec![String::from("int")],
            );
            if annotated {
                method.with_annotation(AnnotationItem::marker("a.Marker"))
            } else {
                method
            }
        };
        checker.verify_class(
            public_class("a.A").with_member(method(true)),
            public_class("a.A").with_member(method(false)),
        );

        let findings = checker.report().raw_findings();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, MessageType::MissAnno);
        assert_eq!(findings[0].class_name, "a.A");
        assert_eq!(findings[0].definition, "m(int):@a.Marker");
    }

    #[test]
    fn hook_rejects_and_transforms() {
        struct DropMembers;
        impl PreComparisonHook for DropMembers {
            fn accept(&self, class: &ClassDescription) -> bool {
                class.name != "a.Skipped"
            }
            fn transform(&self, class: ClassDescription) -> ClassDescription {
                let mut copy = ClassDescription::new(class.name.clone(), class.kind, class.modifiers);
                copy.superclass = class.superclass.clone();
                copy
            }
        }

        let settings = Settings::new(Mode::Source);
        let required = Snapshot::from_classes(vec![
            object(),
            public_class("a.Skipped"),
            ClassDescription::new("a.Kept", ClassKind::Class, Modifiers::PUBLIC)
                .with_superclass(names::OBJECT),
        ])
        .expect("valid snapshot");
        let found = Snapshot::from_classes(vec![
            object(),
            public_class("a.Skipped").with_member(MemberDescription::field(
                "a.Skipped",
                "f",
                Modifiers::PUBLIC,
                "int",
            )),
            public_class("a.Kept"),
        ])
        .expect("valid snapshot");

        let mut checker =
            SignatureChecker::new(&settings, &required, &found).with_hook(DropMembers);
        for name in ["a.Skipped", "a.Kept"] {
            checker.verify_required(required.get(name).cloned().expect("known class"));
        }
        assert!(checker.report().raw_findings().is_empty());
    }
}
