//! Recorder version numbers and their ranking.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{VersionError, VersionResult};

/// Which of two inputs carries the newer version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Newer {
    First,
    Second,
}

/// `major.minor.patch` of the recorder that wrote a movie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Whether minor and patch are single digits.
    pub fn is_single_digit(&self) -> bool {
        self.minor < 10 && self.patch < 10
    }

    /// Rank against `other`.
    ///
    /// Majors compare numerically. Minor and patch are ranked as the decimal
    /// `minor.patch`, which only orders correctly while both are single
    /// digits; otherwise the pair is reported as incomparable.
    pub fn try_cmp(&self, other: &Version) -> VersionResult<Ordering> {
        if self.major != other.major {
            return Ok(self.major.cmp(&other.major));
        }
        if !self.is_single_digit() || !other.is_single_digit() {
            return Err(VersionError::Incomparable {
                first: *self,
                second: *other,
            });
        }
        Ok((self.minor * 10 + self.patch).cmp(&(other.minor * 10 + other.patch)))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Pick the newer of two versions. Ties go to the first.
pub fn newer_of(first: &Version, second: &Version) -> VersionResult<Newer> {
    match first.try_cmp(second)? {
        Ordering::Less => Ok(Newer::Second),
        Ordering::Equal | Ordering::Greater => Ok(Newer::First),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_single_digit_versions() {
        let a = Version::new(1, 4, 4);
        let b = Version::new(1, 4, 5);
        let c = Version::new(1, 3, 9);

        assert_eq!(newer_of(&a, &b).unwrap(), Newer::Second);
        assert_eq!(newer_of(&a, &c).unwrap(), Newer::First);
        assert_eq!(newer_of(&a, &a).unwrap(), Newer::First);
    }

    #[test]
    fn major_dominates() {
        let old = Version::new(1, 9, 9);
        let new = Version::new(2, 0, 0);
        assert_eq!(newer_of(&old, &new).unwrap(), Newer::Second);
    }

    #[test]
    fn two_digit_minor_is_incomparable() {
        let a = Version::new(1, 10, 0);
        let b = Version::new(1, 9, 0);
        assert!(matches!(
            newer_of(&a, &b),
            Err(VersionError::Incomparable { .. })
        ));
    }

    #[test]
    fn displays_dotted() {
        assert_eq!(Version::new(1, 4, 6).to_string(), "1.4.6");
    }
}
