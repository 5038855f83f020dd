use super::{Finding, MessageType, Severity};
use crate::erasure::strip_type_arguments;
use crate::model::{ClassDescription, MemberType};
use crate::settings::Settings;
use log::debug;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::fmt::{Display, Error as FmtError, Formatter};

/// Width of a column in the rendered report
const TAB: usize = 20;

/// Collects findings while classes are checked
///
/// Findings are kept raw until `finish`, where findings that a subclass merely inherits from a
/// class which already has the same finding are folded into the ancestor's entry.
pub struct SortedReport {
    findings: Vec<Finding>,

    /// Direct supertypes (without type arguments) of every class that was compared
    supertypes: HashMap<String, Vec<String>>,

    verbose: bool,
}

impl SortedReport {
    pub fn new(settings: &Settings) -> SortedReport {
        SortedReport {
            findings: vec![],
            supertypes: HashMap::new(),
            verbose: settings.verbose,
        }
    }

    /// Record the supertypes of a class that is about to be compared
    pub fn tested(&mut self, class: &ClassDescription) {
        if !self.supertypes.contains_key(&class.name) {
            let supers = class.supertypes().map(strip_type_arguments).collect();
            self.supertypes.insert(class.name.clone(), supers);
        }
    }

    pub fn add(&mut self, finding: Finding) {
        debug!("{}", finding);
        self.findings.push(finding);
    }

    pub fn add_error(
        &mut self,
        kind: MessageType,
        class_name: impl Into<String>,
        member_type: MemberType,
        definition: impl Into<String>,
    ) {
        self.add(Finding::new(kind, class_name, member_type, definition));
    }

    /// Findings recorded so far, before any folding
    pub fn raw_findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Number of error findings recorded so far
    pub fn error_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity() == Severity::Error)
            .count()
    }

    pub fn finish(self) -> Report {
        let (findings, collapsed) = collapse_inherited(self.findings.clone(), &self.supertypes);
        Report {
            raw: self.findings,
            findings,
            collapsed,
            verbose: self.verbose,
        }
    }
}

/// Sorted and deduplicated findings of one run
#[derive(Clone, Debug)]
pub struct Report {
    raw: Vec<Finding>,
    findings: Vec<Finding>,
    collapsed: usize,
    verbose: bool,
}

impl Report {
    /// Findings after folding, in report order
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Findings in the order they were recorded
    pub fn raw_findings(&self) -> &[Finding] {
        &self.raw
    }

    /// Number of findings folded into an ancestor's finding
    pub fn collapsed(&self) -> usize {
        self.collapsed
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity() == severity)
            .count()
    }

    pub fn is_clean(&self) -> bool {
        self.error_count() == 0
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        let mut current: Option<MessageType> = None;
        for finding in &self.findings {
            if current != Some(finding.kind) {
                current = Some(finding.kind);
                let title = finding.kind.title();
                writeln!(f)?;
                writeln!(f, "{}", title)?;
                writeln!(f, "{}", "-".repeat(title.len()))?;
                writeln!(f)?;
            }

            if finding.definition.is_empty() {
                writeln!(f, "{}", finding.class_name)?;
            } else {
                let label = finding.class_name.len() + 1;
                let column = (label / TAB + 1) * TAB;
                writeln!(
                    f,
                    "{}:{}{}",
                    finding.class_name,
                    " ".repeat(column - label),
                    finding.definition
                )?;
                if self.verbose && !finding.tail.is_empty() {
                    writeln!(f, "    affected: {}", finding.tail)?;
                }
            }
        }

        if !self.findings.is_empty() {
            writeln!(f)?;
        }
        if self.collapsed > 0 {
            writeln!(f, "duplicate messages suppressed: {}", self.collapsed)?;
        }
        Ok(())
    }
}

/// Fold findings that subclasses inherit from an ancestor with the same finding
///
/// Returns the remaining findings in report order and the number of findings folded away. The
/// outcome does not depend on the order of `findings`.
fn collapse_inherited(
    findings: Vec<Finding>,
    supertypes: &HashMap<String, Vec<String>>,
) -> (Vec<Finding>, usize) {
    let mut groups: BTreeMap<(MessageType, String), Vec<Finding>> = BTreeMap::new();
    for finding in findings {
        groups
            .entry((finding.kind, finding.definition.clone()))
            .or_default()
            .push(finding);
    }

    let mut result = vec![];
    let mut collapsed = 0;
    for (_, mut group) in groups {
        group.sort();
        let before = group.len();
        group.dedup();
        collapsed += before - group.len();

        if group.len() > 1 {
            collapsed += fold_group(&mut group, supertypes);
        }
        result.append(&mut group);
    }

    result.sort();
    (result, collapsed)
}

/// Fold every finding of a sorted group into its nearest ancestor within the group
fn fold_group(group: &mut Vec<Finding>, supertypes: &HashMap<String, Vec<String>>) -> usize {
    let mut index: HashMap<String, usize> = HashMap::new();
    for (i, finding) in group.iter().enumerate() {
        index.entry(finding.class_name.clone()).or_insert(i);
    }

    let mut parents: Vec<Option<usize>> = group
        .iter()
        .enumerate()
        .map(|(i, f)| nearest_ancestor(&f.class_name, &index, supertypes).filter(|p| *p != i))
        .collect();

    // Depth in the folding forest; a cyclic chain is cut where it is detected
    let n = group.len();
    let mut depths = vec![0usize; n];
    for i in 0..n {
        let mut depth = 0;
        let mut cursor = parents[i];
        while let Some(p) = cursor {
            depth += 1;
            if depth > n {
                parents[i] = None;
                depth = 0;
                break;
            }
            cursor = parents[p];
        }
        depths[i] = depth;
    }

    // Deepest first so a child carries its own descendants when it is folded
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|a, b| depths[*b].cmp(&depths[*a]).then(a.cmp(b)));

    let mut removed = vec![false; n];
    let mut folded = 0;
    for i in order {
        let parent = match parents[i] {
            Some(p) if !removed[p] => p,
            _ => continue,
        };
        let mut affected = group[i].class_name.clone();
        if !group[i].tail.is_empty() {
            affected.push(',');
            affected.push_str(&group[i].tail);
        }
        let tail = &mut group[parent].tail;
        if !tail.is_empty() {
            tail.push(',');
        }
        tail.push_str(&affected);
        removed[i] = true;
        folded += 1;
    }

    let mut i = 0;
    group.retain(|_| {
        let keep = !removed[i];
        i += 1;
        keep
    });
    folded
}

/// Breadth first search up the recorded supertypes, superclass before interfaces
fn nearest_ancestor(
    class_name: &str,
    index: &HashMap<String, usize>,
    supertypes: &HashMap<String, Vec<String>>,
) -> Option<usize> {
    let mut queue: VecDeque<&str> = VecDeque::new();
    let mut visited: HashSet<&str> = HashSet::new();
    visited.insert(class_name);
    if let Some(supers) = supertypes.get(class_name) {
        queue.extend(supers.iter().map(String::as_str));
    }

    while let Some(name) = queue.pop_front() {
        if !visited.insert(name) {
            continue;
        }
        if let Some(i) = index.get(name) {
            return Some(*i);
        }
        if let Some(supers) = supertypes.get(name) {
            queue.extend(supers.iter().map(String::as_str));
        }
    }
    None
}
