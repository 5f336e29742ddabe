//! Cancellation and modification policies and the pure policy engine.

use chrono::{DateTime, Utc};
use common::Money;
use serde::{Deserialize, Serialize};

/// One cancellation fee tier: cancelling at least `days_before_start`
/// days ahead of the stay costs `fee_percentage` of the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeTier {
    pub days_before_start: i64,
    pub fee_percentage: u8,
}

/// Cancellation terms stored on a booking as a structured sub-document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CancellationPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_cancellation_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub fee_tiers: Vec<FeeTier>,
    #[serde(default)]
    pub non_refundable: bool,
}

/// Modification terms stored on a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ModificationPolicy {
    pub allow_modifications: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<Money>,
    #[serde(default)]
    pub restrictions: Vec<String>,
}

/// Outcome of a cancellation policy check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancellationCheck {
    pub allowed: bool,
    pub fee_percentage: u8,
    pub reason: Option<String>,
}

impl CancellationCheck {
    fn allowed(fee_percentage: u8) -> Self {
        Self {
            allowed: true,
            fee_percentage,
            reason: None,
        }
    }

    fn denied(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            fee_percentage: 100,
            reason: Some(reason.into()),
        }
    }
}

/// Outcome of a modification policy check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModificationCheck {
    pub allowed: bool,
    pub reason: Option<String>,
}

/// Number of whole days until the stay starts, rounded up.
///
/// A start date in the past (or less than a day away) counts as 0 or
/// negative days, which never satisfies a positive fee tier.
fn days_until_start(start_date: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let secs = (start_date - now).num_seconds();
    (secs + 86_399).div_euclid(86_400)
}

/// Checks whether a booking may be cancelled at `now` and what fee applies.
///
/// Rules, in order:
/// - no policy: allowed, 0% fee
/// - non-refundable: denied
/// - at or before the free-cancellation cutoff: allowed, 0% fee
/// - otherwise the tier with the largest `days_before_start` not
///   exceeding the days until the stay starts applies; with no matching
///   tier the fee defaults to 100%.
pub fn check_cancellation(
    policy: Option<&CancellationPolicy>,
    start_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> CancellationCheck {
    let Some(policy) = policy else {
        return CancellationCheck::allowed(0);
    };

    if policy.non_refundable {
        return CancellationCheck::denied("This booking is non-refundable");
    }

    if let Some(cutoff) = policy.free_cancellation_until
        && now <= cutoff
    {
        return CancellationCheck::allowed(0);
    }

    let days = days_until_start(start_date, now);

    let mut tiers = policy.fee_tiers.clone();
    tiers.sort_by(|a, b| b.days_before_start.cmp(&a.days_before_start));

    let fee = tiers
        .iter()
        .find(|tier| days >= tier.days_before_start)
        .map(|tier| tier.fee_percentage)
        .unwrap_or(100);

    CancellationCheck::allowed(fee)
}

/// Checks whether a booking may be modified at `now`.
pub fn check_modification(
    policy: Option<&ModificationPolicy>,
    now: DateTime<Utc>,
) -> ModificationCheck {
    let Some(policy) = policy else {
        return ModificationCheck {
            allowed: true,
            reason: None,
        };
    };

    if !policy.allow_modifications {
        return ModificationCheck {
            allowed: false,
            reason: Some("Modifications not allowed for this booking".to_string()),
        };
    }

    if let Some(deadline) = policy.deadline
        && now > deadline
    {
        return ModificationCheck {
            allowed: false,
            reason: Some("Modification deadline has passed".to_string()),
        };
    }

    ModificationCheck {
        allowed: true,
        reason: None,
    }
}

/// The amount returned to the traveler after the cancellation fee:
/// `total × (100 − fee) / 100`, rounded to the nearest cent.
pub fn refund_amount(total: Money, fee_percentage: u8) -> Money {
    total.percentage(100u8.saturating_sub(fee_percentage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_no_policy_allows_free_cancellation() {
        let check = check_cancellation(None, at(2026, 10, 1), at(2026, 9, 1));
        assert!(check.allowed);
        assert_eq!(check.fee_percentage, 0);
    }

    #[test]
    fn test_non_refundable_denied() {
        let policy = CancellationPolicy {
            non_refundable: true,
            ..Default::default()
        };
        let check = check_cancellation(Some(&policy), at(2026, 10, 1), at(2026, 9, 1));
        assert!(!check.allowed);
        assert!(check.reason.is_some());
    }

    #[test]
    fn test_free_cancellation_window() {
        let policy = CancellationPolicy {
            free_cancellation_until: Some(at(2026, 9, 15)),
            fee_tiers: vec![FeeTier {
                days_before_start: 7,
                fee_percentage: 50,
            }],
            non_refundable: false,
        };

        // exactly at the cutoff still counts
        let check = check_cancellation(Some(&policy), at(2026, 10, 1), at(2026, 9, 15));
        assert!(check.allowed);
        assert_eq!(check.fee_percentage, 0);

        // one second after the cutoff falls through to the tiers
        let after = at(2026, 9, 15) + Duration::seconds(1);
        let check = check_cancellation(Some(&policy), at(2026, 10, 1), after);
        assert_eq!(check.fee_percentage, 50);
    }

    #[test]
    fn test_tier_tie_break_selects_largest_matching() {
        // tiers {30 days: 50%} and {7 days: 100%}; 10 days out the 7-day
        // tier matches but the 30-day tier does not
        let policy = CancellationPolicy {
            fee_tiers: vec![
                FeeTier {
                    days_before_start: 30,
                    fee_percentage: 50,
                },
                FeeTier {
                    days_before_start: 7,
                    fee_percentage: 100,
                },
            ],
            ..Default::default()
        };
        let start = at(2026, 9, 11);
        let now = at(2026, 9, 1);
        let check = check_cancellation(Some(&policy), start, now);
        assert!(check.allowed);
        assert_eq!(check.fee_percentage, 100);

        // 40 days out the 30-day tier wins
        let check = check_cancellation(Some(&policy), at(2026, 10, 11), now);
        assert_eq!(check.fee_percentage, 50);
    }

    #[test]
    fn test_no_matching_tier_defaults_to_full_fee() {
        // 5 days before start with a single 7-day tier: no match, 100%
        let policy = CancellationPolicy {
            fee_tiers: vec![FeeTier {
                days_before_start: 7,
                fee_percentage: 50,
            }],
            ..Default::default()
        };
        let check = check_cancellation(Some(&policy), at(2026, 9, 6), at(2026, 9, 1));
        assert!(check.allowed);
        assert_eq!(check.fee_percentage, 100);
    }

    #[test]
    fn test_days_until_start_rounds_up() {
        let now = at(2026, 9, 1);
        assert_eq!(days_until_start(now + Duration::hours(1), now), 1);
        assert_eq!(days_until_start(now + Duration::hours(25), now), 2);
        assert_eq!(days_until_start(now, now), 0);
        assert_eq!(days_until_start(now - Duration::hours(30), now), -1);
    }

    #[test]
    fn test_modification_requires_allow_flag() {
        let policy = ModificationPolicy {
            allow_modifications: false,
            ..Default::default()
        };
        let check = check_modification(Some(&policy), at(2026, 9, 1));
        assert!(!check.allowed);
    }

    #[test]
    fn test_modification_deadline() {
        let policy = ModificationPolicy {
            allow_modifications: true,
            deadline: Some(at(2026, 9, 10)),
            ..Default::default()
        };
        assert!(check_modification(Some(&policy), at(2026, 9, 10)).allowed);
        assert!(!check_modification(Some(&policy), at(2026, 9, 11)).allowed);
    }

    #[test]
    fn test_refund_amount_rounding() {
        // 30% fee on $333.33 keeps 70%: 23333.1 cents rounds to 23333
        assert_eq!(
            refund_amount(Money::from_cents(33_333), 30).cents(),
            23_333
        );
        assert_eq!(refund_amount(Money::from_cents(10_000), 0).cents(), 10_000);
        assert_eq!(refund_amount(Money::from_cents(10_000), 100).cents(), 0);
    }
}
