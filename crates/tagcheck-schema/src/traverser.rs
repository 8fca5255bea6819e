//! Lock-step walk of a data tree and a rule tree.
//!
//! The walk uses an explicit work stack instead of native recursion, so input
//! depth only costs heap. Items are pushed in reverse, which makes the failure
//! order identical to a depth-first pre-order recursion: for every mapping,
//! unknown tags first (data order), then missing tags (rule order), then
//! everything found below each common tag (data order).

use indexmap::IndexMap;
use serde_json::Value;
use tagcheck_tree::DataNode;

use crate::config::ValidatorConfig;
use crate::error::Result;
use crate::failure::{number, Failure};
use crate::predicates;
use crate::registry::CheckRegistry;
use crate::rules::{Constraints, RuleModel, RuleNode, RuleType};
use crate::setdiff;

/// How a node reached its rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Occurrence {
    /// The only occurrence of its tag among its siblings.
    Single,
    /// One element of a sequence; occurrence bounds were checked on the whole.
    Element,
}

struct Visit<'d, 'r> {
    node: &'d DataNode,
    rule: &'r RuleNode,
    path: String,
    occurrence: Occurrence,
}

/// Collects the failures of one validation call.
///
/// A traverser is built per call and consumed by [`Traverser::traverse`], so
/// failures can never leak from one call into another.
pub struct Traverser<'a> {
    config: &'a ValidatorConfig,
    checks: &'a CheckRegistry,
    failures: Vec<Failure>,
}

impl<'a> Traverser<'a> {
    pub fn new(config: &'a ValidatorConfig, checks: &'a CheckRegistry) -> Self {
        Self {
            config,
            checks,
            failures: Vec::new(),
        }
    }

    /// Walk `tree` (a mapping of the root tag name to the root node) against
    /// `model` and return every failure in report order.
    ///
    /// Errors only if the model names a `checkBy` validator that is not
    /// registered.
    pub fn traverse(mut self, tree: &DataNode, model: &RuleModel) -> Result<Vec<Failure>> {
        self.checks.ensure_covers(model)?;

        let mut stack = vec![Visit {
            node: tree,
            rule: model.top(),
            path: String::new(),
            occurrence: Occurrence::Single,
        }];
        while let Some(visit) = stack.pop() {
            self.visit(visit, &mut stack);
        }

        Ok(self.failures)
    }

    fn visit<'d, 'r>(&mut self, visit: Visit<'d, 'r>, stack: &mut Vec<Visit<'d, 'r>>) {
        let Visit {
            node,
            rule,
            path,
            occurrence,
        } = visit;
        tracing::trace!(path = %path, shape = node.kind(), kind = rule.kind().name(), "visit");

        match node {
            DataNode::Sequence(items) => self.visit_sequence(items, rule, path, stack),
            DataNode::Mapping(map) => {
                self.check_lone_occurrence(rule, occurrence, &path);
                self.compare_siblings(map, rule, &path, stack);
                self.run_custom_check(node, rule, &path);
            }
            DataNode::Scalar(value) => {
                self.check_lone_occurrence(rule, occurrence, &path);
                self.check_leaf(value, rule, &path);
                self.run_custom_check(node, rule, &path);
            }
        }
    }

    fn visit_sequence<'d, 'r>(
        &mut self,
        items: &'d [DataNode],
        rule: &'r RuleNode,
        path: String,
        stack: &mut Vec<Visit<'d, 'r>>,
    ) {
        if !rule.is_repeatable() {
            self.failures.push(Failure::unexpected_sequence(path));
            return;
        }

        self.check_occurrences(rule.constraints(), items.len() as u64, &path);
        for (index, item) in items.iter().enumerate().rev() {
            stack.push(Visit {
                node: item,
                rule,
                path: format!("{path}[{index}]"),
                occurrence: Occurrence::Element,
            });
        }
    }

    /// A repeatable tag that appears once still has to satisfy its bounds.
    fn check_lone_occurrence(&mut self, rule: &RuleNode, occurrence: Occurrence, path: &str) {
        if occurrence == Occurrence::Single && rule.is_repeatable() {
            self.check_occurrences(rule.constraints(), 1, path);
        }
    }

    fn compare_siblings<'d, 'r>(
        &mut self,
        map: &'d IndexMap<String, DataNode>,
        rule: &'r RuleNode,
        path: &str,
        stack: &mut Vec<Visit<'d, 'r>>,
    ) {
        let partition = setdiff::diff(
            map.keys().map(String::as_str),
            rule.children().keys().map(String::as_str),
        );

        if !self.config.unknown_allow {
            for key in &partition.data {
                self.failures.push(Failure::unknown(join(path, key)));
            }
        }

        for key in &partition.rules {
            if rule.child(key).is_some_and(RuleNode::is_required) {
                self.failures.push(Failure::missing(join(path, key)));
            }
        }

        for key in partition.common.iter().rev() {
            if let (Some(node), Some(child)) = (map.get(*key), rule.child(key)) {
                stack.push(Visit {
                    node,
                    rule: child,
                    path: join(path, key),
                    occurrence: Occurrence::Single,
                });
            }
        }
    }

    fn check_leaf(&mut self, value: &str, rule: &RuleNode, path: &str) {
        let constraints = rule.constraints();
        match rule.kind() {
            RuleType::Map => {
                if !value.is_empty() {
                    self.failures
                        .push(Failure::unexpected_value_in_map(path, value));
                }
                self.report_required_children(rule, path);
            }
            RuleType::Date => {
                if !predicates::is_date(value) {
                    self.failures.push(Failure::not_a("date", path, value));
                }
            }
            RuleType::Boolean => {
                if !self.config.is_boolean(value) {
                    self.failures.push(Failure::not_a("boolean", path, value));
                }
            }
            kind @ (RuleType::PositiveInteger
            | RuleType::Integer
            | RuleType::PositiveDecimal
            | RuleType::Decimal
            | RuleType::Number) => {
                match predicates::parse_number(value).filter(|n| kind.accepts_number(*n)) {
                    Some(parsed) => self.check_numeric(constraints, parsed, path),
                    None => self.failures.push(Failure::not_a(kind.name(), path, value)),
                }
            }
            RuleType::String => self.check_string(constraints, value, path),
        }
    }

    /// A bare value stood in for a map: every required child is missing.
    fn report_required_children(&mut self, rule: &RuleNode, path: &str) {
        for (name, child) in rule.children() {
            if child.is_required() {
                self.failures.push(Failure::missing(join(path, name)));
            }
        }
    }

    fn check_string(&mut self, constraints: &Constraints, actual: &str, path: &str) {
        let lengths: [(&str, Option<usize>, fn(usize, &str) -> bool); 3] = [
            ("minLength", constraints.min_length, predicates::min_length),
            ("maxLength", constraints.max_length, predicates::max_length),
            ("length", constraints.length, predicates::length),
        ];
        for (code, expected, holds) in lengths {
            if let Some(expected) = expected {
                if !holds(expected, actual) {
                    self.fail(code, path, actual, expected as u64);
                }
            }
        }

        if let Some(pattern) = &constraints.pattern {
            if !predicates::pattern(pattern, actual) {
                self.fail("pattern", path, actual, pattern.source());
            }
        }
        if let Some(expected) = &constraints.fixed {
            if !predicates::fixed(expected, actual) {
                self.fail("fixed", path, actual, expected.as_str());
            }
        }
        if let Some(csv) = &constraints.one_of {
            if !predicates::one_of(csv, actual) {
                self.fail("in", path, actual, csv.as_str());
            }
        }
    }

    fn check_numeric(&mut self, constraints: &Constraints, actual: f64, path: &str) {
        if let Some(expected) = constraints.min {
            if !predicates::min(expected, actual) {
                self.fail("min", path, number(actual), number(expected));
            }
        }
        if let Some(expected) = constraints.max {
            if !predicates::max(expected, actual) {
                self.fail("max", path, number(actual), number(expected));
            }
        }
    }

    fn check_occurrences(&mut self, constraints: &Constraints, count: u64, path: &str) {
        if let Some(expected) = constraints.min_occurs {
            if !predicates::min_occurs(expected, count) {
                self.fail("minOccurs", path, count, expected);
            }
        }
        if let Some(expected) = constraints.max_occurs {
            if !predicates::max_occurs(expected, count) {
                self.fail("maxOccurs", path, count, expected);
            }
        }
    }

    fn run_custom_check(&mut self, node: &DataNode, rule: &RuleNode, path: &str) {
        let Some(name) = &rule.constraints().check_by else {
            return;
        };
        if let Some(check) = self.checks.get(name) {
            if let Some(failure) = check(node, path) {
                self.failures.push(failure);
            }
        }
    }

    fn fail(
        &mut self,
        code: &str,
        path: &str,
        actual: impl Into<Value>,
        expected: impl Into<Value>,
    ) {
        self.failures
            .push(Failure::predicate(code, path, actual, expected));
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}
