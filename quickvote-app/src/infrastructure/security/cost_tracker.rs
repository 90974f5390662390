use chrono::{DateTime, Utc};
use quickvote_errors::AppError;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

const DAILY_REQUEST_LIMIT: u32 = 1000;

/// Daily budget for paid LLM calls, shared by all three drafting helpers.
pub struct CostTracker {
    daily_requests: AtomicU32,
    daily_limit: u32,
    last_reset: Mutex<DateTime<Utc>>,
}

impl CostTracker {
    pub fn new() -> Self {
        Self::with_daily_limit(DAILY_REQUEST_LIMIT)
    }

    pub fn with_daily_limit(daily_limit: u32) -> Self {
        Self {
            daily_requests: AtomicU32::new(0),
            daily_limit,
            last_reset: Mutex::new(Utc::now()),
        }
    }

    pub fn check_and_increment(&self) -> Result<(), CostLimitError> {
        self.maybe_reset_daily();

        let limit = self.daily_limit;
        self.daily_requests
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                (current < limit).then_some(current + 1)
            })
            .map(|_| ())
            .map_err(|_| CostLimitError::DailyRequestLimitReached)
    }

    pub fn get_remaining_requests(&self) -> u32 {
        self.daily_limit
            .saturating_sub(self.daily_requests.load(Ordering::SeqCst))
    }

    fn maybe_reset_daily(&self) {
        let now = Utc::now();
        let mut last_reset = self.last_reset.lock().unwrap_or_else(|e| e.into_inner());

        if now.date_naive() != last_reset.date_naive() {
            self.daily_requests.store(0, Ordering::SeqCst);
            *last_reset = now;
            tracing::info!("Daily AI request budget reset");
        }
    }
}

impl Default for CostTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CostLimitError {
    DailyRequestLimitReached,
}

impl CostLimitError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::DailyRequestLimitReached => {
                "AI suggestions are used up for today. Try again tomorrow!"
            }
        }
    }
}

impl From<CostLimitError> for AppError {
    fn from(err: CostLimitError) -> Self {
        AppError::RateLimited(err.message().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_runs_out() {
        let tracker = CostTracker::with_daily_limit(2);
        assert!(tracker.check_and_increment().is_ok());
        assert!(tracker.check_and_increment().is_ok());
        assert_eq!(tracker.get_remaining_requests(), 0);
        assert_eq!(
            tracker.check_and_increment(),
            Err(CostLimitError::DailyRequestLimitReached)
        );
    }
}
