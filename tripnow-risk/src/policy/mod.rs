//! Resilience policy layers
//!
//! Each layer wraps the next inner call. The client composes them
//! outermost first:
//!
//! ```text
//! fallback ⊃ timeout ⊃ circuit breaker ⊃ retry ⊃ oracle call
//! ```
//!
//! | Layer | Default | Effect |
//! |-------|---------|--------|
//! | retry | 3 retries, 2s/4s/8s | re-runs transport, status and body failures |
//! | circuit breaker | 3 failed calls, 30s open | rejects calls without touching the oracle |
//! | timeout | 10s | aborts the breaker and retry sequence |
//! | fallback | | `FALLBACK` for failures, `ERROR` for local failures |

mod circuit_breaker;
mod fallback;
mod retry;
mod timeout;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use fallback::FallbackPolicy;
pub use retry::{RetryConfig, RetryPolicy};
pub use timeout::TimeoutPolicy;
