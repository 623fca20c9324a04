// ============================================================================
// Logging, timing and seeding shared by the wasm and native builds
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
use once_cell::sync::Lazy;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

#[cfg(not(target_arch = "wasm32"))]
static PROCESS_START: Lazy<Instant> = Lazy::new(Instant::now);

/// Diagnostic line. Browser console on wasm, stderr natively.
pub fn log(msg: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::log_1(&msg.into());
    #[cfg(not(target_arch = "wasm32"))]
    eprintln!("{msg}");
}

pub fn warn(msg: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&msg.into());
    #[cfg(not(target_arch = "wasm32"))]
    eprintln!("warning: {msg}");
}

/// Milliseconds on a monotonic clock. Only differences are meaningful.
pub fn now_ms() -> f64 {
    #[cfg(target_arch = "wasm32")]
    {
        match web_sys::window().and_then(|w| w.performance()) {
            Some(perf) => perf.now(),
            None => js_sys::Date::now(),
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        PROCESS_START.elapsed().as_secs_f64() * 1000.0
    }
}

/// Entropy for the AI's RNG when no seed is configured.
pub fn random_seed() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        (js_sys::Math::random() * u64::MAX as f64) as u64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        use std::time::{SystemTime, UNIX_EPOCH};
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let mut x = nanos as u64 | 1;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        x
    }
}
