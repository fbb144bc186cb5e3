//! Filter Compiler
//!
//! Turns user-supplied `(field, operator, value)` strings into a validated
//! [`QueryPlan`]. The engine can only order a range query by the field the
//! range applies to, so every inequality (`>`, `>=`, `<`, `<=`) in one plan
//! must target the same field. The plan is then ordered by that field first and
//! by name second; without inequalities it is ordered by name alone.
//!
//! Everything here runs before the store is touched.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::value::{FilterValue, ValueType};
use crate::error::{ConferenceError, ConferenceResult};

/// Vocabulary of fields a query may filter and sort on
pub trait FilterField: Copy + Eq + fmt::Debug + fmt::Display {
    /// Resolve a logical token (`MAX_ATTENDEES`) or physical name (`maxAttendees`)
    fn parse(token: &str) -> Option<Self>;

    fn value_type(&self) -> ValueType;

    /// Field used as the default and tiebreak ordering
    fn name_field() -> Self;
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operator {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    Ne,
    /// Membership in a set; built programmatically, never parsed from user input
    In,
}

impl Operator {
    /// Accepts `EQ GT GTEQ LT LTEQ NE` and `= > >= < <= !=`
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim() {
            "EQ" | "=" | "==" => Some(Operator::Eq),
            "GT" | ">" => Some(Operator::Gt),
            "GTEQ" | ">=" => Some(Operator::Gte),
            "LT" | "<" => Some(Operator::Lt),
            "LTEQ" | "<=" => Some(Operator::Lte),
            "NE" | "!=" => Some(Operator::Ne),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Ne => "!=",
            Operator::In => "IN",
        }
    }

    /// Range operators constrain ordering; `=`, `!=` and `IN` do not
    pub fn is_inequality(&self) -> bool {
        matches!(self, Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Right-hand side of a predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Operand {
    Single(FilterValue),
    Set(Vec<FilterValue>),
}

impl Operand {
    /// Does a single stored value satisfy `value <op> operand`?
    pub fn accepts(&self, operator: Operator, value: &FilterValue) -> bool {
        match (operator, self) {
            (Operator::In, Operand::Set(set)) => set.contains(value),
            (Operator::In, Operand::Single(single)) => value == single,
            (_, Operand::Set(_)) => false,
            (Operator::Eq, Operand::Single(v)) => value == v,
            (Operator::Ne, Operand::Single(v)) => value != v,
            (Operator::Gt, Operand::Single(v)) => value > v,
            (Operator::Gte, Operand::Single(v)) => value >= v,
            (Operator::Lt, Operand::Single(v)) => value < v,
            (Operator::Lte, Operand::Single(v)) => value <= v,
        }
    }
}

/// One validated, typed predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate<F> {
    pub field: F,
    pub operator: Operator,
    pub operand: Operand,
}

/// A validated query: predicates plus ascending sort keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan<F> {
    predicates: Vec<Predicate<F>>,
    order: Vec<F>,
    inequality_field: Option<F>,
}

impl<F: FilterField> QueryPlan<F> {
    pub fn builder() -> PlanBuilder<F> {
        PlanBuilder::new()
    }

    /// Plan with no predicates, ordered by name
    pub fn all() -> Self {
        PlanBuilder::new().build()
    }

    pub fn predicates(&self) -> &[Predicate<F>] {
        &self.predicates
    }

    /// Sort keys, most significant first
    pub fn order(&self) -> &[F] {
        &self.order
    }

    pub fn inequality_field(&self) -> Option<F> {
        self.inequality_field
    }
}

/// Incrementally builds a plan, enforcing the single-inequality-field rule
#[derive(Debug, Clone)]
pub struct PlanBuilder<F> {
    predicates: Vec<Predicate<F>>,
    inequality_field: Option<F>,
}

impl<F: FilterField> PlanBuilder<F> {
    pub fn new() -> Self {
        Self {
            predicates: Vec::new(),
            inequality_field: None,
        }
    }

    /// Add `field <operator> value`
    pub fn filter(mut self, field: F, operator: Operator, value: FilterValue) -> ConferenceResult<Self> {
        self.track_inequality(field, operator)?;
        self.predicates.push(Predicate {
            field,
            operator,
            operand: Operand::Single(value),
        });
        Ok(self)
    }

    /// Add `field IN values`
    pub fn filter_in(mut self, field: F, values: Vec<FilterValue>) -> ConferenceResult<Self> {
        self.track_inequality(field, Operator::In)?;
        self.predicates.push(Predicate {
            field,
            operator: Operator::In,
            operand: Operand::Set(values),
        });
        Ok(self)
    }

    pub fn build(self) -> QueryPlan<F> {
        let name = F::name_field();
        let order = match self.inequality_field {
            Some(field) if field != name => vec![field, name],
            _ => vec![name],
        };

        QueryPlan {
            predicates: self.predicates,
            order,
            inequality_field: self.inequality_field,
        }
    }

    fn track_inequality(&mut self, field: F, operator: Operator) -> ConferenceResult<()> {
        if !operator.is_inequality() {
            return Ok(());
        }
        match self.inequality_field {
            Some(first) if first != field => Err(ConferenceError::MultipleInequalityFields {
                first: first.to_string(),
                second: field.to_string(),
            }),
            _ => {
                self.inequality_field = Some(field);
                Ok(())
            }
        }
    }
}

impl<F: FilterField> Default for PlanBuilder<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// A predicate exactly as the client sent it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFilter {
    pub field: String,
    pub operator: String,
    pub value: String,
}

impl RawFilter {
    pub fn new(field: impl Into<String>, operator: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }
}

/// Compile raw predicates into a plan; the first invalid predicate fails the
/// whole compilation
pub fn compile_filters<F: FilterField>(raw: &[RawFilter]) -> ConferenceResult<QueryPlan<F>> {
    let mut builder = PlanBuilder::new();

    for filter in raw {
        let field = F::parse(&filter.field).ok_or_else(|| {
            ConferenceError::InvalidFilter(format!("unknown field '{}'", filter.field))
        })?;
        let operator = Operator::parse(&filter.operator).ok_or_else(|| {
            ConferenceError::InvalidFilter(format!("unknown operator '{}'", filter.operator))
        })?;

        // Shape is checked before the value so an illegal combination is
        // reported even when the value is also malformed
        builder.track_inequality(field, operator)?;
        let value = field.value_type().coerce(&field.to_string(), &filter.value)?;
        builder.predicates.push(Predicate {
            field,
            operator,
            operand: Operand::Single(value),
        });
    }

    Ok(builder.build())
}
