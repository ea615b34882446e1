pub const STEP_MINUTES: u32 = 5;
pub const MIN_MINUTES: u32 = 5;
pub const MAX_MINUTES: u32 = 120;
pub const DEFAULT_MINUTES: u32 = 25;

/// Countdown timer driven by one-second ticks from the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PomodoroTimer {
    target_minutes: u32,
    remaining_seconds: u32,
    running: bool,
}

impl Default for PomodoroTimer {
    fn default() -> Self {
        Self::new(DEFAULT_MINUTES)
    }
}

impl PomodoroTimer {
    pub fn new(minutes: u32) -> Self {
        let target_minutes = minutes.clamp(MIN_MINUTES, MAX_MINUTES);
        Self {
            target_minutes,
            remaining_seconds: target_minutes * 60,
            running: false,
        }
    }

    pub fn target_minutes(&self) -> u32 {
        self.target_minutes
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Only while stopped; resets the countdown
    pub fn increase(&mut self) -> bool {
        self.set_target(self.target_minutes + STEP_MINUTES)
    }

    pub fn decrease(&mut self) -> bool {
        self.set_target(self.target_minutes.saturating_sub(STEP_MINUTES))
    }

    fn set_target(&mut self, minutes: u32) -> bool {
        let minutes = minutes.clamp(MIN_MINUTES, MAX_MINUTES);
        if self.running || minutes == self.target_minutes {
            return false;
        }
        self.target_minutes = minutes;
        self.reset();
        true
    }

    pub fn start(&mut self) {
        if self.remaining_seconds == 0 {
            self.reset();
        }
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn reset(&mut self) {
        self.remaining_seconds = self.target_minutes * 60;
    }

    /// Advance one second. Returns true when the countdown just finished.
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.running = false;
            return true;
        }
        false
    }

    /// `mm:ss`
    pub fn format(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.remaining_seconds / 60,
            self.remaining_seconds % 60
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_are_clamped() {
        let mut timer = PomodoroTimer::new(10);
        assert!(timer.decrease());
        assert!(!timer.decrease());
        assert_eq!(timer.target_minutes(), 5);

        let mut timer = PomodoroTimer::new(500);
        assert_eq!(timer.target_minutes(), MAX_MINUTES);
        assert!(!timer.increase());
    }

    #[test]
    fn target_is_locked_while_running() {
        let mut timer = PomodoroTimer::default();
        timer.start();
        assert!(!timer.increase());
        assert_eq!(timer.format(), "25:00");

        timer.tick();
        assert_eq!(timer.format(), "24:59");

        timer.pause();
        assert!(timer.increase());
        assert_eq!(timer.format(), "30:00");
    }

    #[test]
    fn finishing_stops_and_restart_resets() {
        let mut timer = PomodoroTimer::new(5);
        timer.start();
        let finished = (0..300).map(|_| timer.tick()).filter(|done| *done).count();

        assert_eq!(finished, 1);
        assert!(!timer.is_running());
        assert_eq!(timer.format(), "00:00");
        assert!(!timer.tick());

        timer.start();
        assert_eq!(timer.remaining_seconds(), 300);
    }
}
