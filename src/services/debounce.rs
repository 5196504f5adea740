/// Suppresses duplicate rapid-fire navigation triggers.
///
/// Stateful over the last accepted call: anything inside the window after an
/// accepted call is rejected and dropped, never queued.
#[derive(Debug)]
pub struct NavigationDebounce {
    window_ms: i64,
    last_accepted_ms: Option<i64>,
}

impl NavigationDebounce {
    pub fn new(window_ms: i64) -> Self {
        Self {
            window_ms,
            last_accepted_ms: None,
        }
    }

    /// Decide on a navigation at an explicit timestamp (epoch millis).
    pub fn allow_at(&mut self, now_ms: i64) -> bool {
        if let Some(last) = self.last_accepted_ms {
            if now_ms - last < self.window_ms {
                return false;
            }
        }
        self.last_accepted_ms = Some(now_ms);
        true
    }

    /// Decide on a navigation right now.
    pub fn allow(&mut self) -> bool {
        self.allow_at(chrono::Utc::now().timestamp_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_call_is_accepted() {
        let mut debounce = NavigationDebounce::new(1000);
        assert!(debounce.allow_at(10_000));
    }

    #[test]
    fn test_call_within_window_is_rejected() {
        let mut debounce = NavigationDebounce::new(1000);
        assert!(debounce.allow_at(10_000));
        assert!(!debounce.allow_at(10_500));
    }

    #[test]
    fn test_call_after_window_is_accepted() {
        let mut debounce = NavigationDebounce::new(1000);
        assert!(debounce.allow_at(10_000));
        assert!(debounce.allow_at(11_500));
    }

    #[test]
    fn test_rejected_calls_do_not_reset_the_window() {
        let mut debounce = NavigationDebounce::new(1000);
        assert!(debounce.allow_at(10_000));
        assert!(!debounce.allow_at(10_900));
        // 10_000 is still the reference point, so 11_000 passes.
        assert!(debounce.allow_at(11_000));
    }
}
