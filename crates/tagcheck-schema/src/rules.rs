use std::fmt;

use indexmap::IndexMap;
use tagcheck_tree::{scan, Attribute, AttributeMode, Markup, OpenTag, ParseOptions};

use crate::error::{Result, SchemaError};
use crate::predicates::{parse_number, Pattern, PatternError};

const LEGACY_PATTERN_PREFIX: &str = "pattern_";

/// Declared value type of a rule, resolved once at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleType {
    String,
    Map,
    Date,
    Boolean,
    PositiveInteger,
    Integer,
    PositiveDecimal,
    Decimal,
    Number,
}

impl RuleType {
    pub const ALL: [RuleType; 9] = [
        RuleType::String,
        RuleType::Map,
        RuleType::Date,
        RuleType::Boolean,
        RuleType::PositiveInteger,
        RuleType::Integer,
        RuleType::PositiveDecimal,
        RuleType::Decimal,
        RuleType::Number,
    ];

    /// Look up a type by its schema spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Schema spelling of the type, also used in `not a <type>` codes.
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Map => "map",
            Self::Date => "date",
            Self::Boolean => "boolean",
            Self::PositiveInteger => "positiveInteger",
            Self::Integer => "integer",
            Self::PositiveDecimal => "positiveDecimal",
            Self::Decimal => "decimal",
            Self::Number => "number",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::PositiveInteger
                | Self::Integer
                | Self::PositiveDecimal
                | Self::Decimal
                | Self::Number
        )
    }

    /// Sign and integrality requirements of numeric types.
    pub fn accepts_number(self, value: f64) -> bool {
        match self {
            Self::PositiveInteger => value >= 0.0 && value.fract() == 0.0,
            Self::Integer => value.fract() == 0.0,
            Self::PositiveDecimal => value >= 0.0,
            _ => true,
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The attribute set of one schema tag, parsed into typed values.
#[derive(Debug, Clone, Default)]
pub struct Constraints {
    pub declared_type: Option<RuleType>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub length: Option<usize>,
    pub pattern: Option<Pattern>,
    pub fixed: Option<String>,
    /// Raw comma-separated list from the `in` attribute.
    pub one_of: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub min_occurs: Option<u64>,
    pub max_occurs: Option<u64>,
    pub repeatable: bool,
    pub nillable: Option<bool>,
    pub check_by: Option<String>,
}

impl Constraints {
    /// An absent tag with these constraints is a `missing` failure.
    pub fn is_required(&self) -> bool {
        self.nillable == Some(false) || self.min_occurs.is_some_and(|n| n > 0)
    }

    fn has_string_checks(&self) -> bool {
        self.min_length.is_some()
            || self.max_length.is_some()
            || self.length.is_some()
            || self.pattern.is_some()
            || self.fixed.is_some()
            || self.one_of.is_some()
    }

    /// Human-readable `name=value` list of everything declared.
    pub fn describe(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(n) = self.min_length {
            out.push(format!("minLength={n}"));
        }
        if let Some(n) = self.max_length {
            out.push(format!("maxLength={n}"));
        }
        if let Some(n) = self.length {
            out.push(format!("length={n}"));
        }
        if let Some(p) = &self.pattern {
            out.push(format!("pattern=/{}/{}", p.source(), p.flags()));
        }
        if let Some(v) = &self.fixed {
            out.push(format!("fixed={v:?}"));
        }
        if let Some(v) = &self.one_of {
            out.push(format!("in={v:?}"));
        }
        if let Some(n) = self.min {
            out.push(format!("min={n}"));
        }
        if let Some(n) = self.max {
            out.push(format!("max={n}"));
        }
        if let Some(n) = self.min_occurs {
            out.push(format!("minOccurs={n}"));
        }
        if let Some(n) = self.max_occurs {
            out.push(format!("maxOccurs={n}"));
        }
        if self.repeatable {
            out.push("repeatable".to_string());
        }
        if let Some(v) = self.nillable {
            out.push(format!("nillable={v}"));
        }
        if let Some(name) = &self.check_by {
            out.push(format!("checkBy={name}"));
        }
        out
    }
}

/// One compiled schema tag: its constraints and its nested rules.
#[derive(Debug, Clone)]
pub struct RuleNode {
    kind: RuleType,
    constraints: Constraints,
    children: IndexMap<String, RuleNode>,
    map_shaped: bool,
}

impl RuleNode {
    fn new(kind: RuleType, constraints: Constraints, children: IndexMap<String, RuleNode>) -> Self {
        let map_shaped = !children.is_empty();
        Self {
            kind,
            constraints,
            children,
            map_shaped,
        }
    }

    /// Resolved type: the declared one, or `map`/`string` by shape.
    pub fn kind(&self) -> RuleType {
        self.kind
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    pub fn children(&self) -> &IndexMap<String, RuleNode> {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<&RuleNode> {
        self.children.get(name)
    }

    /// True iff the rule declares at least one nested tag.
    pub fn is_map_shaped(&self) -> bool {
        self.map_shaped
    }

    pub fn is_repeatable(&self) -> bool {
        self.constraints.repeatable
    }

    pub fn is_required(&self) -> bool {
        self.constraints.is_required()
    }
}

/// A `checkBy` hook found in the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRef {
    pub name: String,
    pub path: String,
}

impl Drop for RuleNode {
    fn drop(&mut self) {
        let mut pending: Vec<RuleNode> =
            std::mem::take(&mut self.children).into_values().collect();
        while let Some(mut node) = pending.pop() {
            pending.extend(std::mem::take(&mut node.children).into_values());
        }
    }
}

/// A compiled schema. Immutable once built and safe to share across threads.
#[derive(Debug, Clone)]
pub struct RuleModel {
    top: RuleNode,
    root_name: String,
    checks: Vec<CheckRef>,
    node_count: usize,
}

impl RuleModel {
    /// Compile schema markup with default parse limits.
    pub fn compile(text: &str) -> Result<Self> {
        Self::compile_with(text, &ParseOptions::default())
    }

    /// Compile schema markup.
    ///
    /// Tag nesting defines the shape; attributes define the constraints.
    /// Valueless attributes such as `repeatable` are accepted.
    pub fn compile_with(text: &str, options: &ParseOptions) -> Result<Self> {
        let mut stack: Vec<PendingRule> = Vec::new();
        let mut finished: Option<(String, RuleNode)> = None;
        let mut checks = Vec::new();
        let mut node_count = 0usize;

        scan(text, AttributeMode::Boolean, options, |markup| {
            match markup {
                Markup::Open(tag) => {
                    let parent_path = stack.last().map(|parent| parent.path.as_str());
                    let pending = PendingRule::open(tag, parent_path)?;
                    if let Some(name) = &pending.constraints.check_by {
                        checks.push(CheckRef {
                            name: name.clone(),
                            path: pending.path.clone(),
                        });
                    }
                    stack.push(pending);
                }
                Markup::Text(_) => {}
                Markup::Close => {
                    if let Some(pending) = stack.pop() {
                        let (name, path, node) = pending.close()?;
                        node_count += 1;
                        match stack.last_mut() {
                            Some(parent) => {
                                if parent.children.contains_key(&name) {
                                    return Err(SchemaError::DuplicateRule { path });
                                }
                                parent.children.insert(name, node);
                            }
                            None => finished = Some((name, node)),
                        }
                    }
                }
            }
            Ok::<(), SchemaError>(())
        })?;

        let (root_name, root) = finished.ok_or(SchemaError::Markup(
            tagcheck_tree::MarkupError::NoRoot,
        ))?;
        tracing::debug!(
            root = %root_name,
            rules = node_count,
            checks = checks.len(),
            "compiled rule model"
        );

        let mut top_children = IndexMap::with_capacity(1);
        top_children.insert(root_name.clone(), root);
        Ok(Self {
            top: RuleNode::new(RuleType::Map, Constraints::default(), top_children),
            root_name,
            checks,
            node_count,
        })
    }

    /// Tag name of the schema's root element.
    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    /// The schema's root rule.
    pub fn root(&self) -> Option<&RuleNode> {
        self.top.child(&self.root_name)
    }

    /// Synthetic rule whose only child is the schema root; the traversal
    /// starts here so a wrong document root is an ordinary sibling mismatch.
    pub(crate) fn top(&self) -> &RuleNode {
        &self.top
    }

    /// Every `checkBy` hook in document order.
    pub fn checks(&self) -> &[CheckRef] {
        &self.checks
    }

    /// Number of schema tags.
    pub fn len(&self) -> usize {
        self.node_count
    }

    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    /// All rules with their dotted paths, in document order.
    pub fn walk(&self) -> Vec<(String, &RuleNode)> {
        let mut out = Vec::with_capacity(self.node_count);
        let mut stack: Vec<(String, &RuleNode)> = self
            .top
            .children
            .iter()
            .rev()
            .map(|(name, node)| (name.clone(), node))
            .collect();

        while let Some((path, node)) = stack.pop() {
            for (name, child) in node.children.iter().rev() {
                stack.push((format!("{path}.{name}"), child));
            }
            out.push((path, node));
        }
        out
    }
}

/// A schema tag whose end tag has not been seen yet.
struct PendingRule {
    name: String,
    path: String,
    constraints: Constraints,
    children: IndexMap<String, RuleNode>,
}

impl PendingRule {
    fn open(tag: OpenTag, parent_path: Option<&str>) -> Result<Self> {
        let path = match parent_path {
            Some(parent) => format!("{parent}.{}", tag.name),
            None => tag.name.clone(),
        };
        let constraints = parse_constraints(&tag.attributes, &path)?;
        Ok(Self {
            name: tag.name,
            path,
            constraints,
            children: IndexMap::new(),
        })
    }

    fn close(self) -> Result<(String, String, RuleNode)> {
        let map_shaped = !self.children.is_empty();
        let kind = match self.constraints.declared_type {
            Some(RuleType::Map) => RuleType::Map,
            Some(declared) if map_shaped => {
                return Err(SchemaError::ConflictingShape {
                    path: self.path,
                    name: declared.name().to_string(),
                })
            }
            Some(declared) => declared,
            None if map_shaped => RuleType::Map,
            None => RuleType::String,
        };

        warn_ineffective(&self.path, kind, &self.constraints);

        let node = RuleNode::new(kind, self.constraints, self.children);
        Ok((self.name, self.path, node))
    }
}

fn warn_ineffective(path: &str, kind: RuleType, constraints: &Constraints) {
    if kind != RuleType::String && constraints.has_string_checks() {
        tracing::warn!(path, kind = kind.name(), "string constraints have no effect");
    }
    if !kind.is_numeric() && (constraints.min.is_some() || constraints.max.is_some()) {
        tracing::warn!(path, kind = kind.name(), "min/max have no effect");
    }
    if !constraints.repeatable && constraints.max_occurs.is_some() {
        tracing::warn!(path, "maxOccurs has no effect without repeatable");
    }
}

struct PatternDecl<'a> {
    attribute: &'a str,
    source: &'a str,
    legacy_flags: &'a str,
}

fn parse_constraints(attributes: &[Attribute], path: &str) -> Result<Constraints> {
    let mut constraints = Constraints::default();
    let mut pattern: Option<PatternDecl<'_>> = None;
    let mut flags: Option<&str> = None;

    for attr in attributes {
        let name = attr.name.as_str();
        let value = attr.value.as_str();
        match name {
            "type" => {
                let kind =
                    RuleType::from_name(value).ok_or_else(|| SchemaError::UnsupportedType {
                        path: path.to_string(),
                        name: value.to_string(),
                    })?;
                constraints.declared_type = Some(kind);
            }
            "minLength" => constraints.min_length = Some(parse_count(path, name, value)?),
            "maxLength" => constraints.max_length = Some(parse_count(path, name, value)?),
            "length" => constraints.length = Some(parse_count(path, name, value)?),
            "minOccurs" => constraints.min_occurs = Some(parse_count(path, name, value)?),
            "maxOccurs" => constraints.max_occurs = Some(parse_count(path, name, value)?),
            "min" => constraints.min = Some(parse_bound(path, name, value)?),
            "max" => constraints.max = Some(parse_bound(path, name, value)?),
            "fixed" => constraints.fixed = Some(value.to_string()),
            "in" => constraints.one_of = Some(value.to_string()),
            "repeatable" => {
                constraints.repeatable = match value {
                    "" | "true" => true,
                    "false" => false,
                    _ => return Err(invalid(path, name, "expected no value, true or false")),
                }
            }
            "nillable" => {
                constraints.nillable = match value {
                    "true" => Some(true),
                    "false" => Some(false),
                    _ => return Err(invalid(path, name, "expected \"true\" or \"false\"")),
                }
            }
            "checkBy" => {
                if value.trim().is_empty() {
                    return Err(invalid(path, name, "expected a validator name"));
                }
                constraints.check_by = Some(value.to_string());
            }
            "flags" => flags = Some(value),
            "pattern" => declare_pattern(&mut pattern, path, name, value, "")?,
            _ if name.starts_with(LEGACY_PATTERN_PREFIX) => {
                let legacy_flags = &name[LEGACY_PATTERN_PREFIX.len()..];
                declare_pattern(&mut pattern, path, name, value, legacy_flags)?;
            }
            _ => {
                return Err(SchemaError::UnknownAttribute {
                    path: path.to_string(),
                    attribute: name.to_string(),
                })
            }
        }
    }

    constraints.pattern = match (pattern, flags) {
        (Some(decl), Some(_)) if decl.attribute != "pattern" => {
            return Err(SchemaError::AmbiguousPattern {
                path: path.to_string(),
                reason: format!("'flags' cannot be combined with '{}'", decl.attribute),
            })
        }
        (Some(decl), flags) => {
            let flags = flags.unwrap_or(decl.legacy_flags);
            Some(compile_pattern(path, decl.attribute, decl.source, flags)?)
        }
        (None, Some(_)) => {
            return Err(SchemaError::AmbiguousPattern {
                path: path.to_string(),
                reason: "'flags' given without 'pattern'".to_string(),
            })
        }
        (None, None) => None,
    };

    Ok(constraints)
}

fn declare_pattern<'a>(
    slot: &mut Option<PatternDecl<'a>>,
    path: &str,
    attribute: &'a str,
    source: &'a str,
    legacy_flags: &'a str,
) -> Result<()> {
    if let Some(existing) = slot {
        return Err(SchemaError::AmbiguousPattern {
            path: path.to_string(),
            reason: format!("both '{}' and '{attribute}' declared", existing.attribute),
        });
    }
    *slot = Some(PatternDecl {
        attribute,
        source,
        legacy_flags,
    });
    Ok(())
}

fn compile_pattern(path: &str, attribute: &str, source: &str, flags: &str) -> Result<Pattern> {
    Pattern::compile(source, flags).map_err(|err| match err {
        PatternError::UnknownFlag(flag) => invalid(
            path,
            attribute,
            &format!("unsupported pattern flag '{flag}'"),
        ),
        PatternError::Regex(source) => SchemaError::InvalidPattern {
            path: path.to_string(),
            source,
        },
    })
}

fn parse_count<T: std::str::FromStr>(path: &str, attribute: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| invalid(path, attribute, "expected a non-negative integer"))
}

fn parse_bound(path: &str, attribute: &str, value: &str) -> Result<f64> {
    parse_number(value).ok_or_else(|| invalid(path, attribute, "expected a number"))
}

fn invalid(path: &str, attribute: &str, reason: &str) -> SchemaError {
    SchemaError::InvalidAttribute {
        path: path.to_string(),
        attribute: attribute.to_string(),
        reason: reason.to_string(),
    }
}
