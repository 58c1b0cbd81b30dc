//! Load-shift (demand response) schedules.

use serde::Deserialize;

/// Per-minute load-shift instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadShift {
    /// Avoid heating (flag `0`).
    Shed,
    /// Heating allowed (flag `1`).
    Allowed,
}

impl LoadShift {
    pub fn is_shed(self) -> bool {
        self == LoadShift::Shed
    }
}

impl From<u8> for LoadShift {
    fn from(flag: u8) -> Self {
        if flag == 0 {
            LoadShift::Shed
        } else {
            LoadShift::Allowed
        }
    }
}

/// Hourly control letter used by scenarios: normal, load-up, or shed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    #[serde(alias = "N")]
    Normal,
    #[serde(alias = "L")]
    LoadUp,
    #[serde(alias = "S")]
    Shed,
}

impl ControlMode {
    /// Only `Shed` blocks heating; load-up is a normal allowed period.
    pub fn load_shift(self) -> LoadShift {
        match self {
            ControlMode::Shed => LoadShift::Shed,
            ControlMode::Normal | ControlMode::LoadUp => LoadShift::Allowed,
        }
    }
}

/// Ordered per-minute load-shift flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadShiftSchedule {
    flags: Vec<LoadShift>,
}

impl LoadShiftSchedule {
    /// A schedule with heating allowed at every minute.
    pub fn all_allowed(len: usize) -> Self {
        Self {
            flags: vec![LoadShift::Allowed; len],
        }
    }

    /// Builds a schedule from `0`/`1` flags.
    pub fn from_flags(flags: &[u8]) -> Self {
        Self {
            flags: flags.iter().map(|&f| LoadShift::from(f)).collect(),
        }
    }

    pub fn from_modes(modes: &[ControlMode]) -> Self {
        Self {
            flags: modes.iter().map(|m| m.load_shift()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Flag at minute `t`.
    ///
    /// # Panics
    ///
    /// Panics if `t` is out of range.
    pub fn at(&self, t: usize) -> LoadShift {
        self.flags[t]
    }

    /// Returns `true` when minute `t` is shed and minute `t - 1` was allowed.
    pub fn transitioned_to_shed(&self, t: usize) -> bool {
        t > 0 && self.flags[t - 1] == LoadShift::Allowed && self.flags[t] == LoadShift::Shed
    }

    /// Number of shed minutes in the schedule.
    pub fn shed_minutes(&self) -> usize {
        self.flags.iter().filter(|f| f.is_shed()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = LoadShift> + '_ {
        self.flags.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_flag_is_shed() {
        assert_eq!(LoadShift::from(0), LoadShift::Shed);
        assert_eq!(LoadShift::from(1), LoadShift::Allowed);
    }

    #[test]
    fn transition_detected_only_on_falling_edge() {
        let s = LoadShiftSchedule::from_flags(&[1, 1, 0, 0, 1, 0]);
        assert!(!s.transitioned_to_shed(0));
        assert!(!s.transitioned_to_shed(1));
        assert!(s.transitioned_to_shed(2));
        assert!(!s.transitioned_to_shed(3));
        assert!(!s.transitioned_to_shed(4));
        assert!(s.transitioned_to_shed(5));
    }

    #[test]
    fn first_minute_shed_is_not_a_transition() {
        let s = LoadShiftSchedule::from_flags(&[0, 0]);
        assert!(!s.transitioned_to_shed(0));
        assert!(!s.transitioned_to_shed(1));
    }

    #[test]
    fn shed_minutes_counted() {
        let s = LoadShiftSchedule::from_flags(&[1, 0, 0, 1, 0]);
        assert_eq!(s.shed_minutes(), 3);
        assert_eq!(LoadShiftSchedule::all_allowed(10).shed_minutes(), 0);
    }

    #[test]
    fn load_up_is_allowed() {
        let s = LoadShiftSchedule::from_modes(&[
            ControlMode::Normal,
            ControlMode::LoadUp,
            ControlMode::Shed,
        ]);
        assert_eq!(s.at(0), LoadShift::Allowed);
        assert_eq!(s.at(1), LoadShift::Allowed);
        assert_eq!(s.at(2), LoadShift::Shed);
    }
}
