//! A single shared token-bucket rate limiter (spec §4.4, §5): all ontology
//! HTTP calls serialize through this, regardless of caller-side
//! parallelism. Cache hits bypass it entirely (checked by the caller before
//! acquiring a token).

use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    capacity: f64,
    refill_per_sec: f64,
    last_refill: Instant,
}

/// A token bucket shared across threads via an internal mutex; `acquire`
/// blocks the calling thread until a token is available.
#[derive(Debug)]
pub struct TokenBucket {
    inner: Mutex<Bucket>,
}

impl TokenBucket {
    pub fn new(requests_per_second: f64) -> Self {
        Self {
            inner: Mutex::new(Bucket {
                tokens: requests_per_second,
                capacity: requests_per_second,
                refill_per_sec: requests_per_second,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Block until a token is available, then consume it.
    pub fn acquire(&self) {
        loop {
            let wait = {
                let mut bucket = self.inner.lock().expect("rate limiter mutex poisoned");
                let now = Instant::now();
                let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
                bucket.tokens = (bucket.tokens + elapsed * bucket.refill_per_sec).min(bucket.capacity);
                bucket.last_refill = now;

                if bucket.tokens >= 1.0 {
                    bucket.tokens -= 1.0;
                    None
                } else {
                    let deficit = 1.0 - bucket.tokens;
                    Some(Duration::from_secs_f64(deficit / bucket.refill_per_sec))
                }
            };
            match wait {
                None => return,
                Some(d) => std::thread::sleep(d),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_burst_up_to_capacity() {
        let bucket = TokenBucket::new(5.0);
        let start = Instant::now();
        for _ in 0..5 {
            bucket.acquire();
        }
        // Five tokens were available immediately; this should not have slept
        // appreciably.
        assert!(start.elapsed() < Duration::from_millis(200));
    }
}
