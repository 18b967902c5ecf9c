use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

use crate::error::CoreError;

/// Which of the two recipient registries a record lives in.
///
/// The customer and staff registries do not share an id space; an untagged
/// id on its own does not identify a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientKind {
    Customer,
    Staff,
}

impl RecipientKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipientKind::Customer => "customer",
            RecipientKind::Staff => "staff",
        }
    }
}

impl fmt::Display for RecipientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecipientKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(RecipientKind::Customer),
            "staff" => Ok(RecipientKind::Staff),
            other => Err(CoreError::invalid_recipient_kind(other)),
        }
    }
}

/// Registry-tagged recipient reference.
///
/// This is the id currency used throughout the push subsystem; bare ids
/// only exist at the public facade boundary, where callers may not know
/// which registry an id belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecipientRef {
    pub kind: RecipientKind,
    pub id: String,
}

impl RecipientRef {
    pub fn new(kind: RecipientKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    pub fn customer(id: impl Into<String>) -> Self {
        Self::new(RecipientKind::Customer, id)
    }

    pub fn staff(id: impl Into<String>) -> Self {
        Self::new(RecipientKind::Staff, id)
    }
}

impl fmt::Display for RecipientRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

/// One order on a customer's history. Totals are currency units; order
/// status plays no part in classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub total: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Order {
    pub fn new(total: f64, created_at: OffsetDateTime) -> Self {
        Self { total, created_at }
    }
}

/// A customer or staff member as read from its registry.
///
/// `order_history` and `last_active_at` are customer-only; staff records
/// carry an empty history and no activity timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub id: String,
    pub kind: RecipientKind,

    /// Opaque device token strings. Set semantics: a token appears at most
    /// once per recipient, though nothing prevents two recipients from
    /// holding the same token.
    #[serde(default)]
    pub device_tokens: BTreeSet<String>,

    #[serde(default)]
    pub order_history: Vec<Order>,

    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_active_at: Option<OffsetDateTime>,
}

impl Recipient {
    pub fn customer(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: RecipientKind::Customer,
            device_tokens: BTreeSet::new(),
            order_history: Vec::new(),
            last_active_at: None,
        }
    }

    pub fn staff(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: RecipientKind::Staff,
            device_tokens: BTreeSet::new(),
            order_history: Vec::new(),
            last_active_at: None,
        }
    }

    pub fn with_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.device_tokens = tokens.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_orders(mut self, orders: Vec<Order>) -> Self {
        self.order_history = orders;
        self
    }

    pub fn with_last_active(mut self, at: OffsetDateTime) -> Self {
        self.last_active_at = Some(at);
        self
    }

    /// Tagged reference to this record.
    pub fn reference(&self) -> RecipientRef {
        RecipientRef::new(self.kind, self.id.clone())
    }

    /// Most recent order by creation time, if any.
    pub fn latest_order(&self) -> Option<&Order> {
        self.order_history.iter().max_by_key(|o| o.created_at)
    }

    /// Sum of all order totals over the customer's lifetime.
    pub fn lifetime_spend(&self) -> f64 {
        self.order_history.iter().map(|o| o.total).sum()
    }
}
