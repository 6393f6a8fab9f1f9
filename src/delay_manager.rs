use std::time::Duration;
use std::thread;
use rand::Rng;
use log::info;

use crate::config::ScraperConfig;

/// Exponential backoff before attempt `attempt + 1`, where `attempt` is the
/// 1-based number of the attempt that just failed. Jitter is not included.
pub fn backoff_delay(config: &ScraperConfig, attempt: u32) -> Duration {
    if config.backoff_base_ms == 0 {
        return Duration::ZERO;
    }
    let shift = attempt.saturating_sub(1).min(16);
    let ms = config
        .backoff_base_ms
        .saturating_mul(1u64 << shift)
        .min(config.backoff_max_ms);
    Duration::from_millis(ms)
}

/// Adds up to 25% random jitter on top of `base`.
pub fn with_jitter(base: Duration) -> Duration {
    let max_jitter = base.as_millis() as u64 / 4;
    if max_jitter == 0 {
        return base;
    }
    let mut rng = rand::thread_rng();
    base + Duration::from_millis(rng.gen_range(0..=max_jitter))
}

pub fn retry_delay(config: &ScraperConfig, attempt: u32) {
    let delay = with_jitter(backoff_delay(config, attempt));
    if delay.is_zero() {
        return;
    }
    info!("Waiting {} ms before retry (attempt {} failed)...", delay.as_millis(), attempt);
    thread::sleep(delay);
}
