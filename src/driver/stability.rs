//! Two-poll stability check for the response region.

/// Remembers the previous indicator-free region and reports when the next
/// one is identical.
#[derive(Debug, Default)]
pub(super) struct SettleTracker {
    previous: Option<String>,
}

impl SettleTracker {
    /// Feed the region of a quiet (`Submitted`) frame. Returns the region
    /// once two consecutive quiet frames carry the same text.
    pub fn quiet(&mut self, region: &str) -> Option<String> {
        let settled = self.previous.as_deref() == Some(region);
        self.previous = Some(region.to_string());
        settled.then(|| region.to_string())
    }

    /// Any frame that is not quiet breaks the streak.
    pub fn reset(&mut self) {
        self.previous = None;
    }
}
