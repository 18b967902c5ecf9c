//! Customer segmentation.
//!
//! Segments are pure, named predicates over a customer snapshot and the
//! current time. They are NOT a partition: a customer can satisfy several
//! at once (a big spender with no recent orders is both `vip` and
//! `dormant`). Classification never fails and has no side effects.

use serde::{Deserialize, Serialize};
use souq_core::Recipient;
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

use crate::error::PushError;

/// Lifetime spend above which a customer is `vip`, in currency units.
pub const VIP_SPEND_THRESHOLD: f64 = 5000.0;

const ACTIVE_WINDOW_DAYS: i64 = 30;
const SEMI_ACTIVE_WINDOW_DAYS: i64 = 90;
const INTERACTIVE_WINDOW_DAYS: i64 = 7;
const DORMANT_AFTER_DAYS: i64 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    Vip,
    Active,
    SemiActive,
    Interactive,
    Dormant,
    All,
}

impl Segment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::Vip => "vip",
            Segment::Active => "active",
            Segment::SemiActive => "semi_active",
            Segment::Interactive => "interactive",
            Segment::Dormant => "dormant",
            Segment::All => "all",
        }
    }

    /// Whether `customer` falls in this segment as of `now`.
    ///
    /// Boundaries are evaluated at whole-day granularity: an order exactly
    /// 30 days old is still `active`; `semi_active` starts strictly after
    /// 30 days.
    pub fn matches(&self, customer: &Recipient, now: OffsetDateTime) -> bool {
        match self {
            Segment::All => true,
            Segment::Vip => customer.lifetime_spend() > VIP_SPEND_THRESHOLD,
            Segment::Active => {
                days_since_latest_order(customer, now).is_some_and(|d| d <= ACTIVE_WINDOW_DAYS)
            }
            Segment::SemiActive => days_since_latest_order(customer, now)
                .is_some_and(|d| d > ACTIVE_WINDOW_DAYS && d < SEMI_ACTIVE_WINDOW_DAYS),
            Segment::Interactive => {
                customer.order_history.is_empty()
                    && customer
                        .last_active_at
                        .is_some_and(|at| days_between(at, now) <= INTERACTIVE_WINDOW_DAYS)
            }
            // Absence defaults to dormant, not "unknown".
            Segment::Dormant => match customer.last_active_at {
                None => true,
                Some(at) => days_between(at, now) > DORMANT_AFTER_DAYS,
            },
        }
    }
}

fn days_between(earlier: OffsetDateTime, now: OffsetDateTime) -> i64 {
    (now - earlier).whole_days()
}

fn days_since_latest_order(customer: &Recipient, now: OffsetDateTime) -> Option<i64> {
    customer
        .latest_order()
        .map(|order| days_between(order.created_at, now))
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Segment {
    type Err = PushError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vip" => Ok(Segment::Vip),
            "active" => Ok(Segment::Active),
            "semi_active" => Ok(Segment::SemiActive),
            "interactive" => Ok(Segment::Interactive),
            "dormant" => Ok(Segment::Dormant),
            "all" => Ok(Segment::All),
            other => Err(PushError::unknown_segment(other)),
        }
    }
}
