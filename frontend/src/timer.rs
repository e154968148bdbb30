use std::time::Duration;

use async_trait::async_trait;
use diffrenzz_leads::Timer;
use gloo_timers::future::TimeoutFuture;

/// Browser timer backed by `setTimeout`.
pub struct GlooTimer;

#[async_trait(?Send)]
impl Timer for GlooTimer {
    async fn sleep(&self, duration: Duration) {
        let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
        TimeoutFuture::new(millis).await;
    }
}
