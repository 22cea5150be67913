//! Explicit model of a generated CartoCSS style sheet.
//!
//! A [`StyleSheet`] is a selector, a list of base declarations, and an
//! ordered list of [`Rule`]s pairing a [`Predicate`] with declarations.
//! [`Display`](std::fmt::Display) renders the CartoCSS text sent to the
//! host, and [`StyleSheet::evaluate`] resolves the style of one feature by
//! applying the base declarations and then every matching rule in order,
//! so a later match overrides an earlier one.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use parcel_map_style_models::{FieldValue, QuantificationMethod, RenderTarget};
use strum_macros::{AsRefStr, Display};

use crate::classify;

/// A styleable visual property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Property {
    /// `polygon-fill`
    PolygonFill,
    /// `polygon-opacity`
    PolygonOpacity,
    /// `line-color`
    LineColor,
    /// `line-opacity`
    LineOpacity,
    /// `line-width`
    LineWidth,
}

impl Property {
    /// The color property for a render target.
    #[must_use]
    pub const fn color_of(target: RenderTarget) -> Self {
        match target {
            RenderTarget::Polygon => Self::PolygonFill,
            RenderTarget::Line => Self::LineColor,
        }
    }

    /// The opacity property for a render target.
    #[must_use]
    pub const fn opacity_of(target: RenderTarget) -> Self {
        match target {
            RenderTarget::Polygon => Self::PolygonOpacity,
            RenderTarget::Line => Self::LineOpacity,
        }
    }
}

/// A color ramp binned over a numeric field by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ramp {
    /// Field the ramp is computed over.
    pub field: String,
    /// Colors, one per bin, lowest bin first.
    pub colors: Vec<String>,
    /// Binning algorithm.
    pub method: QuantificationMethod,
}

impl Ramp {
    /// Resolves the color of `value` given breaks computed from a sample.
    #[must_use]
    pub fn color_for(&self, value: f64, breaks: &[f64]) -> Option<&str> {
        classify::ramp_color(&self.colors, breaks, value)
    }
}

/// The right-hand side of a declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A plain number (opacity, width).
    Number(f64),
    /// A color name or hex value.
    Color(String),
    /// A host-evaluated color ramp.
    Ramp(Ramp),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Color(c) => f.write_str(c),
            Self::Ramp(ramp) => write!(
                f,
                "ramp([{}], ({}), {}({}))",
                ramp.field,
                ramp.colors.join(", "),
                ramp.method,
                ramp.colors.len()
            ),
        }
    }
}

/// A single `property: value;` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// Property being set.
    pub property: Property,
    /// Value assigned.
    pub value: Value,
}

impl Declaration {
    /// Sets a numeric property.
    #[must_use]
    pub const fn number(property: Property, value: f64) -> Self {
        Self {
            property,
            value: Value::Number(value),
        }
    }

    /// Sets a color property.
    #[must_use]
    pub fn color(property: Property, color: impl Into<String>) -> Self {
        Self {
            property,
            value: Value::Color(color.into()),
        }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {};", self.property, self.value)
    }
}

/// A comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Comparison {
    /// `=`
    #[strum(serialize = "=")]
    Eq,
    /// `<`
    #[strum(serialize = "<")]
    Lt,
    /// `<=`
    #[strum(serialize = "<=")]
    Le,
    /// `>`
    #[strum(serialize = ">")]
    Gt,
    /// `>=`
    #[strum(serialize = ">=")]
    Ge,
}

impl Comparison {
    /// Whether `lhs.cmp(rhs) == ordering` satisfies this operator.
    #[must_use]
    pub const fn holds(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => matches!(ordering, Ordering::Equal),
            Self::Lt => matches!(ordering, Ordering::Less),
            Self::Le => !matches!(ordering, Ordering::Greater),
            Self::Gt => matches!(ordering, Ordering::Greater),
            Self::Ge => !matches!(ordering, Ordering::Less),
        }
    }
}

/// The right-hand side of a field comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Compared as a string.
    Text(String),
    /// Compared numerically.
    Number(f64),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => {
                let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
                write!(f, "\"{escaped}\"")
            }
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// The condition under which a rule applies.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Compares a feature attribute against a literal.
    Field {
        /// Attribute name.
        field: String,
        /// Operator.
        op: Comparison,
        /// Right-hand side.
        value: Literal,
    },
    /// Compares the current zoom level against a constant.
    Zoom {
        /// Operator.
        op: Comparison,
        /// Zoom level.
        level: u8,
    },
}

impl Predicate {
    /// Shorthand for a field comparison.
    #[must_use]
    pub fn field(field: impl Into<String>, op: Comparison, value: Literal) -> Self {
        Self::Field {
            field: field.into(),
            op,
            value,
        }
    }

    /// Whether the predicate holds for a feature.
    ///
    /// A feature without the attribute never satisfies a field predicate.
    /// Numeric literals compare numerically (text attributes are parsed);
    /// text literals compare against the attribute's string form.
    #[must_use]
    pub fn matches(&self, attributes: &BTreeMap<String, FieldValue>, zoom: u8) -> bool {
        match self {
            Self::Zoom { op, level } => op.holds(zoom.cmp(level)),
            Self::Field { field, op, value } => {
                let Some(attribute) = attributes.get(field) else {
                    return false;
                };
                let ordering = match value {
                    Literal::Number(rhs) => attribute.as_f64().and_then(|lhs| lhs.partial_cmp(rhs)),
                    Literal::Text(rhs) => Some(attribute.to_string().as_str().cmp(rhs.as_str())),
                };
                ordering.is_some_and(|o| op.holds(o))
            }
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field { field, op, value } => write!(f, "[{field} {op} {value}]"),
            Self::Zoom { op, level } => write!(f, "[zoom {op} {level}]"),
        }
    }
}

/// Where a rule is written in the rendered text.
///
/// Placement never changes evaluation order, which follows the rule list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Inside the selector block: `#id { ... [pred] { ... } }`.
    Nested,
    /// As its own block after the selector block: `#id[pred] { ... }`.
    Attached,
}

/// A predicate and the declarations it applies.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// Condition.
    pub predicate: Predicate,
    /// Effects, applied in order.
    pub declarations: Vec<Declaration>,
    /// Rendering position.
    pub placement: Placement,
}

impl Rule {
    /// A rule written inside the selector block.
    #[must_use]
    pub const fn nested(predicate: Predicate, declarations: Vec<Declaration>) -> Self {
        Self {
            predicate,
            declarations,
            placement: Placement::Nested,
        }
    }

    /// A rule written as its own selector block.
    #[must_use]
    pub const fn attached(predicate: Predicate, declarations: Vec<Declaration>) -> Self {
        Self {
            predicate,
            declarations,
            placement: Placement::Attached,
        }
    }

    fn write_body(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for declaration in &self.declarations {
            write!(f, " {declaration}")?;
        }
        f.write_str(" }")
    }
}

/// A complete style sheet for one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSheet {
    /// Selector namespace, without the leading `#`.
    pub selector: String,
    /// Declarations applied to every feature.
    pub base: Vec<Declaration>,
    /// Conditional rules, in evaluation order.
    pub rules: Vec<Rule>,
}

impl StyleSheet {
    /// Creates an empty style sheet for `selector`.
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            base: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Appends a base declaration.
    #[must_use]
    pub fn with(mut self, declaration: Declaration) -> Self {
        self.base.push(declaration);
        self
    }

    /// Appends a rule.
    #[must_use]
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Resolves the style of one feature at a zoom level.
    #[must_use]
    pub fn evaluate(&self, attributes: &BTreeMap<String, FieldValue>, zoom: u8) -> ComputedStyle {
        let mut computed = ComputedStyle::default();
        computed.apply(&self.base);
        for rule in &self.rules {
            if rule.predicate.matches(attributes, zoom) {
                computed.apply(&rule.declarations);
            }
        }
        computed
    }
}

impl fmt::Display for StyleSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "#{} {{", self.selector)?;
        for declaration in &self.base {
            writeln!(f, "  {declaration}")?;
        }
        for rule in self.rules.iter().filter(|r| r.placement == Placement::Nested) {
            write!(f, "  {} ", rule.predicate)?;
            rule.write_body(f)?;
            writeln!(f)?;
        }
        f.write_str("}")?;
        for rule in self.rules.iter().filter(|r| r.placement == Placement::Attached) {
            write!(f, "\n#{}{} ", self.selector, rule.predicate)?;
            rule.write_body(f)?;
        }
        Ok(())
    }
}

/// The resolved properties of one feature.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComputedStyle {
    properties: BTreeMap<Property, Value>,
}

impl ComputedStyle {
    fn apply(&mut self, declarations: &[Declaration]) {
        for declaration in declarations {
            self.properties
                .insert(declaration.property, declaration.value.clone());
        }
    }

    /// The resolved value of a property, if set.
    #[must_use]
    pub fn get(&self, property: Property) -> Option<&Value> {
        self.properties.get(&property)
    }

    /// The resolved value of a numeric property, if set to a number.
    #[must_use]
    pub fn number(&self, property: Property) -> Option<f64> {
        match self.get(property)? {
            Value::Number(n) => Some(*n),
            Value::Color(_) | Value::Ramp(_) => None,
        }
    }

    /// The resolved value of a color property, if set to a plain color.
    #[must_use]
    pub fn color(&self, property: Property) -> Option<&str> {
        match self.get(property)? {
            Value::Color(c) => Some(c),
            Value::Number(_) | Value::Ramp(_) => None,
        }
    }

    /// The resolved opacity of a render target; unset means transparent.
    #[must_use]
    pub fn opacity(&self, target: RenderTarget) -> f64 {
        self.number(Property::opacity_of(target)).unwrap_or(0.0)
    }

    /// Whether the render target is drawn at all.
    #[must_use]
    pub fn is_visible(&self, target: RenderTarget) -> bool {
        self.opacity(target) > 0.0
    }
}
