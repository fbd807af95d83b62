//! Subscription status derivation.
//!
//! Subscription state is never stored; it is derived from the stored expiry
//! timestamp relative to the current time, so a record flips buckets without
//! any writes as time passes.

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::models::suppliers::SupplierDBResponse;

/// Days before expiry at which a subscription counts as expiring soon.
pub const EXPIRING_SOON_DAYS: i64 = 30;

/// Derived subscription state for the payments dashboard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionBucket {
    Active,
    ExpiringSoon,
    Expired,
    NoSubscription,
}

impl SubscriptionBucket {
    /// Classify an expiry timestamp relative to `now`.
    ///
    /// `None` means no subscription was ever purchased. An expiry exactly at
    /// `now` counts as expired; an expiry exactly 30 days out counts as
    /// expiring soon.
    pub fn classify(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        let Some(expires_at) = expires_at else {
            return Self::NoSubscription;
        };
        let days_left = (expires_at - now).num_days();
        if expires_at <= now {
            Self::Expired
        } else if days_left <= EXPIRING_SOON_DAYS {
            Self::ExpiringSoon
        } else {
            Self::Active
        }
    }

    pub fn for_supplier(supplier: &SupplierDBResponse, now: DateTime<Utc>) -> Self {
        Self::classify(supplier.subscription_expires_at, now)
    }
}

/// Compute the expiry timestamp for a subscription purchased at
/// `payment_date` lasting `duration_years` calendar years.
///
/// Calendar arithmetic, not day counting: a one-year subscription bought on
/// 2024-01-01 expires 2025-01-01 even though 2024 is a leap year.
pub fn subscription_expiry(payment_date: DateTime<Utc>, duration_years: i32) -> DateTime<Utc> {
    let months = Months::new((duration_years.max(0) as u32) * 12);
    payment_date
        .checked_add_months(months)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_bucket_classification() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();

        assert_eq!(
            SubscriptionBucket::classify(None, now),
            SubscriptionBucket::NoSubscription
        );
        assert_eq!(
            SubscriptionBucket::classify(Some(now - Duration::days(1)), now),
            SubscriptionBucket::Expired
        );
        // Expiring exactly now counts as expired
        assert_eq!(
            SubscriptionBucket::classify(Some(now), now),
            SubscriptionBucket::Expired
        );
        assert_eq!(
            SubscriptionBucket::classify(Some(now + Duration::days(10)), now),
            SubscriptionBucket::ExpiringSoon
        );
        assert_eq!(
            SubscriptionBucket::classify(Some(now + Duration::days(30)), now),
            SubscriptionBucket::ExpiringSoon
        );
        assert_eq!(
            SubscriptionBucket::classify(Some(now + Duration::days(31)), now),
            SubscriptionBucket::Active
        );
    }

    #[test]
    fn test_expiry_uses_calendar_years() {
        // 2024 is a leap year; 365-day arithmetic would land on 2024-12-31
        let paid = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let expires = subscription_expiry(paid, 1);
        assert_eq!(expires, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());

        let expires = subscription_expiry(paid, 3);
        assert_eq!(expires, Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_expiry_clamps_end_of_month() {
        // Jan 31 + 1 month windows handled by chrono's month arithmetic
        let paid = Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap();
        let expires = subscription_expiry(paid, 1);
        assert_eq!(expires, Utc.with_ymd_and_hms(2025, 2, 28, 0, 0, 0).unwrap());
    }
}
