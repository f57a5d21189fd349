/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::common::types::TimeStamp;
use chrono::Duration;

/// Commit gate for driver GPS updates: at most one committed update per
/// window. A freshly created (or reset) throttle lets the first fix
/// through immediately so the map does not appear frozen at trip start.
#[derive(Debug, Clone)]
pub struct UpdateThrottle {
    window_secs: u64,
    last_commit: Option<TimeStamp>,
}

impl UpdateThrottle {
    pub fn new(window_secs: u64) -> Self {
        UpdateThrottle {
            window_secs,
            last_commit: None,
        }
    }

    pub fn reset(&mut self) {
        self.last_commit = None;
    }

    /// Decides whether a fix observed at `at` may be committed, recording
    /// the commit time when it is.
    pub fn should_commit(&mut self, at: TimeStamp) -> bool {
        match self.last_commit {
            None => {
                self.last_commit = Some(at);
                true
            }
            Some(TimeStamp(last)) => {
                if at.inner().signed_duration_since(last)
                    >= Duration::seconds(self.window_secs as i64)
                {
                    self.last_commit = Some(at);
                    true
                } else {
                    false
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(secs: i64) -> TimeStamp {
        TimeStamp(Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap())
    }

    #[test]
    fn first_fix_commits_immediately() {
        let mut throttle = UpdateThrottle::new(10);
        assert!(throttle.should_commit(at(0)));
    }

    #[test]
    fn five_fixes_inside_the_window_commit_once() {
        let mut throttle = UpdateThrottle::new(10);

        let commits = [0, 2, 4, 6, 8]
            .into_iter()
            .filter(|secs| throttle.should_commit(at(*secs)))
            .count();

        assert_eq!(commits, 1);
    }

    #[test]
    fn fix_after_the_window_commits_again() {
        let mut throttle = UpdateThrottle::new(10);

        for secs in [0, 2, 4, 6, 8] {
            throttle.should_commit(at(secs));
        }

        assert!(throttle.should_commit(at(11)));
    }

    #[test]
    fn reset_lets_the_next_fix_through() {
        let mut throttle = UpdateThrottle::new(10);
        assert!(throttle.should_commit(at(0)));
        assert!(!throttle.should_commit(at(3)));

        throttle.reset();
        assert!(throttle.should_commit(at(4)));
    }
}
