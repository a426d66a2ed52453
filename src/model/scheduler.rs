//! Coalescing of layout and placeholder refreshes.
//!
//! Mutations only mark the view dirty. The refresh runs once, either when a
//! query needs fresh geometry or at the end of the current update turn.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateScheduler {
    needs_update: bool,
    placeholder_needs_update: bool,
    refreshes: u64,
    placeholder_refreshes: u64,
}

impl UpdateScheduler {
    pub fn commit_update(&mut self) {
        self.needs_update = true;
    }

    pub fn commit_placeholder_update(&mut self) {
        self.placeholder_needs_update = true;
    }

    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    pub fn placeholder_needs_update(&self) -> bool {
        self.placeholder_needs_update
    }

    /// Clear the layout flag, returning whether a refresh is due
    pub fn take_update(&mut self) -> bool {
        std::mem::take(&mut self.needs_update)
    }

    pub fn take_placeholder_update(&mut self) -> bool {
        std::mem::take(&mut self.placeholder_needs_update)
    }

    pub fn record_refresh(&mut self) {
        self.refreshes += 1;
    }

    pub fn record_placeholder_refresh(&mut self) {
        self.placeholder_refreshes += 1;
    }

    /// Layout refreshes performed so far
    pub fn refresh_count(&self) -> u64 {
        self.refreshes
    }

    pub fn placeholder_refresh_count(&self) -> u64 {
        self.placeholder_refreshes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_commits_collapse() {
        let mut s = UpdateScheduler::default();
        s.commit_update();
        s.commit_update();
        assert!(s.take_update());
        assert!(!s.take_update());
    }

    #[test]
    fn test_placeholder_flag_is_separate() {
        let mut s = UpdateScheduler::default();
        s.commit_placeholder_update();
        assert!(!s.needs_update());
        assert!(s.take_placeholder_update());
        assert!(!s.placeholder_needs_update());
    }
}
