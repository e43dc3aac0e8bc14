//! Daily request-quota counter
//!
//! Guards outbound quote API calls against a fixed daily ceiling. The
//! counter lives in memory only and resets when the calendar date
//! changes in the exchange timezone. A denied gate does not increment.

use chrono::{NaiveDate, Utc};
use chrono_tz::Asia::Shanghai;
use parking_lot::Mutex;

/// Daily call-limit tracker
#[derive(Debug)]
pub struct DailyQuota {
    limit: u32,
    inner: Mutex<QuotaDay>,
}

#[derive(Debug)]
struct QuotaDay {
    date: NaiveDate,
    used: u32,
}

/// Quota usage snapshot for the status endpoint
#[derive(Debug, Clone, serde::Serialize)]
pub struct QuotaStatus {
    pub limit: u32,
    pub used: u32,
    pub remaining: u32,
}

impl DailyQuota {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            inner: Mutex::new(QuotaDay {
                date: Self::today(),
                used: 0,
            }),
        }
    }

    /// Current calendar date in the exchange timezone
    fn today() -> NaiveDate {
        Utc::now().with_timezone(&Shanghai).date_naive()
    }

    /// Try to consume one call from today's quota. Returns false once
    /// the ceiling is reached; the first call on a new day sees a fresh
    /// counter.
    pub fn try_acquire(&self) -> bool {
        self.try_acquire_on(Self::today())
    }

    fn try_acquire_on(&self, today: NaiveDate) -> bool {
        let mut day = self.inner.lock();

        if day.date != today {
            day.date = today;
            day.used = 0;
        }

        if day.used >= self.limit {
            return false;
        }

        day.used += 1;
        true
    }

    /// Usage snapshot for today
    pub fn status(&self) -> QuotaStatus {
        let today = Self::today();
        let mut day = self.inner.lock();

        if day.date != today {
            day.date = today;
            day.used = 0;
        }

        QuotaStatus {
            limit: self.limit,
            used: day.used,
            remaining: self.limit.saturating_sub(day.used),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_quota_exhausts_at_limit() {
        let quota = DailyQuota::new(3);
        let today = date("2026-08-26");

        for _ in 0..3 {
            assert!(quota.try_acquire_on(today));
        }
        assert!(!quota.try_acquire_on(today));
        // Denied calls do not increment
        assert!(!quota.try_acquire_on(today));
        assert_eq!(quota.inner.lock().used, 3);
    }

    #[test]
    fn test_quota_resets_on_new_day() {
        let quota = DailyQuota::new(2);
        let monday = date("2026-08-24");
        let tuesday = date("2026-08-25");

        assert!(quota.try_acquire_on(monday));
        assert!(quota.try_acquire_on(monday));
        assert!(!quota.try_acquire_on(monday));

        // Date change zeroes the counter
        assert!(quota.try_acquire_on(tuesday));
        assert_eq!(quota.inner.lock().used, 1);
    }

    #[test]
    fn test_status_reports_remaining() {
        let quota = DailyQuota::new(200);
        let status = quota.status();
        assert_eq!(status.limit, 200);
        assert_eq!(status.used, 0);
        assert_eq!(status.remaining, 200);

        assert!(quota.try_acquire());
        assert_eq!(quota.status().remaining, 199);
    }
}
