use std::net::IpAddr;
use std::num::NonZeroU32;

use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tracing::warn;

/// Per-client-address budget for lead submissions.
pub struct LeadRateLimiter {
    limiter: DefaultKeyedRateLimiter<IpAddr>,
}

impl LeadRateLimiter {
    pub fn per_minute(leads: NonZeroU32) -> Self {
        Self {
            limiter: RateLimiter::keyed(Quota::per_minute(leads)),
        }
    }

    /// Spends one unit for `ip`. Returns false once the budget is exhausted.
    pub fn check(&self, ip: IpAddr) -> bool {
        match self.limiter.check_key(&ip) {
            Ok(()) => true,
            Err(_) => {
                warn!("Lead rate limit exceeded for {}", ip);
                false
            }
        }
    }

    /// Drops state for addresses whose budget has fully refilled.
    pub fn retain_recent(&self) {
        self.limiter.retain_recent();
    }

    pub fn tracked(&self) -> usize {
        self.limiter.len()
    }
}
