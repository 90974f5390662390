use dashmap::DashMap;
use quickvote_errors::AppError;
use std::collections::VecDeque;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const MAX_REQUESTS_PER_MINUTE: u32 = 10;
const MAX_REQUESTS_PER_HOUR: u32 = 60;
const SWEEP_EVERY: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Window {
    Minute,
    Hour,
}

impl Window {
    fn length(self) -> Duration {
        match self {
            Window::Minute => Duration::from_secs(60),
            Window::Hour => Duration::from_secs(3600),
        }
    }

    fn exceeded(self, retry_after: Duration) -> RateLimitError {
        let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
        match self {
            Window::Minute => RateLimitError::TooManyRequestsPerMinute(secs),
            Window::Hour => RateLimitError::TooManyRequestsPerHour(secs),
        }
    }
}

/// Admission times of one client, oldest first. Nothing older than the
/// longest window is kept.
#[derive(Debug, Default)]
struct History(VecDeque<Instant>);

impl History {
    fn forget_before(&mut self, now: Instant) {
        while self
            .0
            .front()
            .is_some_and(|t| now.duration_since(*t) >= Window::Hour.length())
        {
            self.0.pop_front();
        }
    }

    /// How long until one more request fits in `window`, if it does not now.
    fn retry_after(&self, now: Instant, window: Duration, limit: u32) -> Option<Duration> {
        let limit = limit as usize;
        let recent = self
            .0
            .iter()
            .rev()
            .take_while(|t| now.duration_since(**t) < window)
            .count();
        if recent < limit {
            return None;
        }
        // The admission that has to age out before another fits.
        let age = self
            .0
            .get(self.0.len() - limit)
            .map(|t| now.duration_since(*t))
            .unwrap_or_default();
        Some(window.saturating_sub(age))
    }

    fn is_idle(&self, now: Instant) -> bool {
        self.0
            .back()
            .map_or(true, |t| now.duration_since(*t) >= Window::Hour.length())
    }
}

/// Per-IP sliding-window limiter for the AI endpoints. Only admitted
/// requests count against a client.
#[derive(Clone)]
pub struct RateLimiter {
    clients: Arc<DashMap<IpAddr, History>>,
    last_sweep: Arc<Mutex<Instant>>,
    per_minute: u32,
    per_hour: u32,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_limits(MAX_REQUESTS_PER_MINUTE, MAX_REQUESTS_PER_HOUR)
    }

    pub fn with_limits(per_minute: u32, per_hour: u32) -> Self {
        Self {
            clients: Arc::new(DashMap::new()),
            last_sweep: Arc::new(Mutex::new(Instant::now())),
            per_minute,
            per_hour,
        }
    }

    pub fn check_rate_limit(&self, ip: IpAddr) -> Result<(), RateLimitError> {
        let now = Instant::now();
        self.sweep_if_due(now);
        self.check_at(ip, now)
    }

    fn check_at(&self, ip: IpAddr, now: Instant) -> Result<(), RateLimitError> {
        let mut history = self.clients.entry(ip).or_default();
        history.forget_before(now);

        for (window, limit) in [(Window::Minute, self.per_minute), (Window::Hour, self.per_hour)] {
            if let Some(wait) = history.retry_after(now, window.length(), limit) {
                return Err(window.exceeded(wait));
            }
        }

        history.0.push_back(now);
        Ok(())
    }

    fn sweep_if_due(&self, now: Instant) {
        let mut last_sweep = self.last_sweep.lock().unwrap_or_else(|e| e.into_inner());
        if now.duration_since(*last_sweep) >= SWEEP_EVERY {
            self.sweep(now);
            *last_sweep = now;
        }
    }

    fn sweep(&self, now: Instant) {
        let before = self.clients.len();
        self.clients.retain(|_, history| !history.is_idle(now));
        tracing::debug!("Rate limiter dropped {} idle clients", before - self.clients.len());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

/// Carries the seconds until the client may try again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitError {
    TooManyRequestsPerMinute(u64),
    TooManyRequestsPerHour(u64),
}

impl RateLimitError {
    pub fn message(&self) -> String {
        match self {
            Self::TooManyRequestsPerMinute(secs) => {
                format!("Too many requests. Try again in {secs} seconds.")
            }
            Self::TooManyRequestsPerHour(secs) => format!(
                "You've reached the hourly limit. Try again in {} minutes.",
                secs.div_ceil(60)
            ),
        }
    }
}

impl From<RateLimitError> for AppError {
    fn from(err: RateLimitError) -> Self {
        AppError::RateLimited(err.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_minute_window_slides() {
        let limiter = RateLimiter::with_limits(2, 100);
        let t0 = Instant::now();

        assert!(limiter.check_at(ip(1), t0).is_ok());
        assert!(limiter.check_at(ip(1), t0 + secs(30)).is_ok());
        assert_eq!(
            limiter.check_at(ip(1), t0 + secs(40)),
            Err(RateLimitError::TooManyRequestsPerMinute(20))
        );

        // The first admission has aged out, the second has not.
        assert!(limiter.check_at(ip(1), t0 + secs(61)).is_ok());
        assert!(limiter.check_at(ip(1), t0 + secs(62)).is_err());
    }

    #[test]
    fn test_rejections_do_not_extend_the_wait() {
        let limiter = RateLimiter::with_limits(1, 100);
        let t0 = Instant::now();

        assert!(limiter.check_at(ip(2), t0).is_ok());
        for offset in [10, 20, 50] {
            assert!(limiter.check_at(ip(2), t0 + secs(offset)).is_err());
        }
        assert!(limiter.check_at(ip(2), t0 + secs(60)).is_ok());
    }

    #[test]
    fn test_limits_are_per_ip() {
        let limiter = RateLimiter::with_limits(1, 100);
        assert!(limiter.check_rate_limit(ip(3)).is_ok());
        assert!(limiter.check_rate_limit(ip(4)).is_ok());
        assert!(limiter.check_rate_limit(ip(3)).is_err());
    }

    #[test]
    fn test_hour_window_reports_minutes() {
        let limiter = RateLimiter::with_limits(100, 2);
        let t0 = Instant::now();

        assert!(limiter.check_at(ip(5), t0).is_ok());
        assert!(limiter.check_at(ip(5), t0 + secs(120)).is_ok());
        let err = limiter.check_at(ip(5), t0 + secs(600)).unwrap_err();

        assert_eq!(err, RateLimitError::TooManyRequestsPerHour(3000));
        assert_eq!(
            AppError::from(err).user_message(),
            "You've reached the hourly limit. Try again in 50 minutes."
        );
    }

    #[test]
    fn test_sweep_drops_idle_clients_only() {
        let limiter = RateLimiter::with_limits(10, 10);
        let t0 = Instant::now();
        limiter.check_at(ip(6), t0).unwrap();
        limiter.check_at(ip(7), t0 + secs(3000)).unwrap();

        limiter.sweep(t0 + secs(3700));

        assert!(!limiter.clients.contains_key(&ip(6)));
        assert!(limiter.clients.contains_key(&ip(7)));
    }
}
