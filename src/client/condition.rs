//! Query conditions and aggregate descriptions understood by every
//! entity client.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Matches everything.
    All,
    Eq(String, Value),
    /// Field value inside the given set. An empty set matches nothing.
    In(String, Vec<Value>),
    Gt(String, Value),
    Gte(String, Value),
    Lt(String, Value),
    Lte(String, Value),
    IsNull(String),
    And(Vec<Condition>),
}

impl Condition {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Condition::Eq(field.to_string(), value.into())
    }

    pub fn inside<I, V>(field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Condition::In(field.to_string(), values.into_iter().map(Into::into).collect())
    }

    pub fn gte(field: &str, value: impl Into<Value>) -> Self {
        Condition::Gte(field.to_string(), value.into())
    }

    pub fn lte(field: &str, value: impl Into<Value>) -> Self {
        Condition::Lte(field.to_string(), value.into())
    }

    /// Logical AND; `All` operands are dropped.
    pub fn and(self, other: Condition) -> Self {
        match (self, other) {
            (Condition::All, c) | (c, Condition::All) => c,
            (Condition::And(mut a), Condition::And(b)) => {
                a.extend(b);
                Condition::And(a)
            }
            (Condition::And(mut a), c) => {
                a.push(c);
                Condition::And(a)
            }
            (c, Condition::And(mut b)) => {
                b.insert(0, c);
                Condition::And(b)
            }
            (a, b) => Condition::And(vec![a, b]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub condition: Condition,
    pub order_by: Option<(String, Order)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new(condition: Condition) -> Self {
        Self {
            condition,
            order_by: None,
            limit: None,
        }
    }

    pub fn all() -> Self {
        Self::new(Condition::All)
    }

    pub fn order_by(mut self, field: &str, order: Order) -> Self {
        self.order_by = Some((field.to_string(), order));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl Default for Query {
    fn default() -> Self {
        Self::all()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateOp {
    Sum,
    Count,
    Avg,
    Min,
    Max,
}

impl AggregateOp {
    pub fn sql_fn(&self) -> &'static str {
        match self {
            AggregateOp::Sum => "SUM",
            AggregateOp::Count => "COUNT",
            AggregateOp::Avg => "AVG",
            AggregateOp::Min => "MIN",
            AggregateOp::Max => "MAX",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub op: AggregateOp,
    pub field: String,
}

impl Aggregate {
    pub fn sum(field: &str) -> Self {
        Self {
            op: AggregateOp::Sum,
            field: field.to_string(),
        }
    }

    pub fn count(field: &str) -> Self {
        Self {
            op: AggregateOp::Count,
            field: field.to_string(),
        }
    }
}

/// One bucket of a grouped aggregate. `key` is `None` for records where the
/// grouping field is absent.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRow {
    pub key: Option<String>,
    pub value: f64,
}
