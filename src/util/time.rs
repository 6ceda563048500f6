/// Seconds on a monotonic-enough clock, for measuring durations
#[cfg(not(target_arch = "wasm32"))]
pub fn now_secs() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

/// Seconds on a monotonic-enough clock, for measuring durations
#[cfg(target_arch = "wasm32")]
pub fn now_secs() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|perf| perf.now() / 1000.0)
        .unwrap_or(0.0)
}

/// Seconds elapsed since `start` (a value from [`now_secs`])
pub fn elapsed_secs(start: f64) -> f64 {
    (now_secs() - start).max(0.0)
}
