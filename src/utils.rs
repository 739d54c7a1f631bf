/// Utility functions
use rand::Rng;
use regex::Regex;
use std::any::Any;
use std::sync::LazyLock;

static TRAILING_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/(\d+)/$").unwrap());

/// Extract the numeric id from a resource URL such as `https://swapi.dev/api/planets/3/`
pub fn trailing_id(url: &str) -> Option<u32> {
    TRAILING_ID
        .captures(url)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Stand-in id for records whose URL carries none. Not stable between calls.
pub fn fallback_id() -> u32 {
    rand::rng().random_range(100..1000)
}

/// Best-effort text of a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
