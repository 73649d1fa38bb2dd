//! Where, OrderBy and Tweak clauses.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::ops::{Add, BitAnd, BitOr, Not};

/// Comparison operator in a predicate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
    In,
}

impl Comparison {
    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Eq => "==",
            Comparison::Ne => "!=",
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
            Comparison::Like => "LIKE",
            Comparison::In => "IN",
        }
    }
}

/// Predicate tree evaluated by the tracking engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    True,
    False,
    Compare {
        key_path: String,
        op: Comparison,
        value: Value,
    },
    IsNull {
        key_path: String,
    },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    /// Conjunction, flattening nested `And`s.
    pub fn and(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Predicate::True, p) | (p, Predicate::True) => p,
            (Predicate::And(mut left), Predicate::And(right)) => {
                left.extend(right);
                Predicate::And(left)
            }
            (Predicate::And(mut left), p) => {
                left.push(p);
                Predicate::And(left)
            }
            (p, Predicate::And(mut right)) => {
                right.insert(0, p);
                Predicate::And(right)
            }
            (a, b) => Predicate::And(vec![a, b]),
        }
    }

    /// Disjunction, flattening nested `Or`s.
    pub fn or(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Predicate::False, p) | (p, Predicate::False) => p,
            (Predicate::Or(mut left), Predicate::Or(right)) => {
                left.extend(right);
                Predicate::Or(left)
            }
            (Predicate::Or(mut left), p) => {
                left.push(p);
                Predicate::Or(left)
            }
            (p, Predicate::Or(mut right)) => {
                right.insert(0, p);
                Predicate::Or(right)
            }
            (a, b) => Predicate::Or(vec![a, b]),
        }
    }

    pub fn negate(self) -> Predicate {
        match self {
            Predicate::True => Predicate::False,
            Predicate::False => Predicate::True,
            Predicate::Not(inner) => *inner,
            p => Predicate::Not(Box::new(p)),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, parts: &[Predicate], sep: &str) -> fmt::Result {
            write!(f, "(")?;
            for (i, p) in parts.iter().enumerate() {
                if i > 0 {
                    write!(f, " {} ", sep)?;
                }
                write!(f, "{}", p)?;
            }
            write!(f, ")")
        }

        match self {
            Predicate::True => write!(f, "TRUEPREDICATE"),
            Predicate::False => write!(f, "FALSEPREDICATE"),
            Predicate::Compare { key_path, op, value } => {
                write!(f, "{} {} {}", key_path, op.symbol(), value)
            }
            Predicate::IsNull { key_path } => write!(f, "{} == nil", key_path),
            Predicate::And(parts) => join(f, parts, "AND"),
            Predicate::Or(parts) => join(f, parts, "OR"),
            Predicate::Not(inner) => write!(f, "NOT {}", inner),
        }
    }
}

/// Filter clause.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Where(pub Predicate);

impl Where {
    pub fn always() -> Self {
        Where(Predicate::True)
    }

    pub fn never() -> Self {
        Where(Predicate::False)
    }

    fn compare(key_path: impl Into<String>, op: Comparison, value: impl Into<Value>) -> Self {
        Where(Predicate::Compare {
            key_path: key_path.into(),
            op,
            value: value.into(),
        })
    }

    pub fn eq(key_path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(key_path, Comparison::Eq, value)
    }

    pub fn ne(key_path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(key_path, Comparison::Ne, value)
    }

    pub fn lt(key_path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(key_path, Comparison::Lt, value)
    }

    pub fn le(key_path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(key_path, Comparison::Le, value)
    }

    pub fn gt(key_path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(key_path, Comparison::Gt, value)
    }

    pub fn ge(key_path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(key_path, Comparison::Ge, value)
    }

    /// Pattern match (`*` and `?` wildcards).
    pub fn like(key_path: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::compare(key_path, Comparison::Like, Value::String(pattern.into()))
    }

    pub fn is_in<I, V>(key_path: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        Self::compare(key_path, Comparison::In, Value::Array(values))
    }

    pub fn is_null(key_path: impl Into<String>) -> Self {
        Where(Predicate::IsNull {
            key_path: key_path.into(),
        })
    }

    pub fn predicate(&self) -> &Predicate {
        &self.0
    }
}

impl BitAnd for Where {
    type Output = Where;

    fn bitand(self, rhs: Where) -> Where {
        Where(self.0.and(rhs.0))
    }
}

impl BitOr for Where {
    type Output = Where;

    fn bitor(self, rhs: Where) -> Where {
        Where(self.0.or(rhs.0))
    }
}

impl Not for Where {
    type Output = Where;

    fn not(self) -> Where {
        Where(self.0.negate())
    }
}

/// Sort direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// One sort key of an ordering clause.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortKey {
    pub key_path: String,
    pub direction: SortDirection,
}

/// Ordering clause. Holds one or more sort keys, applied in order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderBy {
    pub keys: Vec<SortKey>,
}

impl OrderBy {
    pub fn ascending(key_path: impl Into<String>) -> Self {
        Self {
            keys: vec![SortKey {
                key_path: key_path.into(),
                direction: SortDirection::Ascending,
            }],
        }
    }

    pub fn descending(key_path: impl Into<String>) -> Self {
        Self {
            keys: vec![SortKey {
                key_path: key_path.into(),
                direction: SortDirection::Descending,
            }],
        }
    }

    /// Add a secondary ascending key.
    pub fn then_ascending(self, key_path: impl Into<String>) -> Self {
        self + OrderBy::ascending(key_path)
    }

    /// Add a secondary descending key.
    pub fn then_descending(self, key_path: impl Into<String>) -> Self {
        self + OrderBy::descending(key_path)
    }
}

impl Add for OrderBy {
    type Output = OrderBy;

    fn add(mut self, rhs: OrderBy) -> OrderBy {
        self.keys.extend(rhs.keys);
        self
    }
}

/// Adjustment applied to the generated fetch request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tweak {
    FetchLimit(usize),
    FetchOffset(usize),
    BatchSize(usize),
    IncludesPendingChanges(bool),
    /// Engine-specific hint, passed through untouched.
    Hint { name: String, value: Value },
}

impl Tweak {
    pub fn hint(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Tweak::Hint {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A single clause of a list request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchClause {
    Where(Where),
    OrderBy(OrderBy),
    Tweak(Tweak),
}

impl FetchClause {
    pub fn is_order_by(&self) -> bool {
        matches!(self, FetchClause::OrderBy(_))
    }

    pub fn as_order_by(&self) -> Option<&OrderBy> {
        match self {
            FetchClause::OrderBy(order) => Some(order),
            _ => None,
        }
    }

    pub fn as_where(&self) -> Option<&Where> {
        match self {
            FetchClause::Where(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_tweak(&self) -> Option<&Tweak> {
        match self {
            FetchClause::Tweak(t) => Some(t),
            _ => None,
        }
    }
}

impl From<Where> for FetchClause {
    fn from(clause: Where) -> Self {
        FetchClause::Where(clause)
    }
}

impl From<OrderBy> for FetchClause {
    fn from(clause: OrderBy) -> Self {
        FetchClause::OrderBy(clause)
    }
}

impl From<Tweak> for FetchClause {
    fn from(clause: Tweak) -> Self {
        FetchClause::Tweak(clause)
    }
}
