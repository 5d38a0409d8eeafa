//! Explicit "value or nothing" results for lookups that may legitimately
//! come back empty.

/// Result of a lookup that is allowed to find nothing.
///
/// `Absent` is a normal outcome, not an error: an upstream that declares no
/// language standard simply means no standard is forced downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The lookup produced a value.
    Found(T),
    /// Nothing matched.
    Absent,
}

impl<T> Lookup<T> {
    /// Returns `true` if a value was found.
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Returns `true` if nothing was found.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Converts into an `Option`.
    #[must_use]
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::Absent => None,
        }
    }

    /// Maps the found value.
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Self::Found(value) => Lookup::Found(f(value)),
            Self::Absent => Lookup::Absent,
        }
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Self::Found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_conversion_round_trips() {
        let found: Lookup<u8> = Some(3).into();
        assert_eq!(found, Lookup::Found(3));
        assert_eq!(found.found(), Some(3));

        let absent: Lookup<u8> = None.into();
        assert!(absent.is_absent());
        assert_eq!(absent.map(|v| v + 1), Lookup::Absent);
    }
}
