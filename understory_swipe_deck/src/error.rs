// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contract errors raised by index-range edits.

use core::fmt;

/// Error returned when the data source count disagrees with an edit.
///
/// After [`insert_card_at_index_range`](crate::CardDeck::insert_card_at_index_range)
/// the data source must report the previous count plus the range length;
/// after [`remove_card_in_index_range`](crate::CardDeck::remove_card_in_index_range)
/// it must report the previous count minus the range length.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeckError {
    /// The data source reported `actual` cards where `expected` were required.
    CountMismatch {
        /// Count implied by the edit.
        expected: usize,
        /// Count the data source reported.
        actual: usize,
    },
}

impl fmt::Display for DeckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CountMismatch { expected, actual } => write!(
                f,
                "card count after update is {actual}, but the edit implies {expected}"
            ),
        }
    }
}

impl core::error::Error for DeckError {}

/// How to handle a data source count that disagrees with an edit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum MismatchHandling {
    /// Panic in debug builds, log and continue in release builds.
    #[default]
    DebugAssert,
    /// Return [`DeckError::CountMismatch`].
    Error,
    /// Log and continue.
    Ignore,
}

impl MismatchHandling {
    /// Checks `actual` against `expected`.
    ///
    /// The edit itself has already been applied when this runs; the deck keeps
    /// the count the data source reported either way.
    pub fn check(self, expected: usize, actual: usize) -> Result<(), DeckError> {
        if expected == actual {
            return Ok(());
        }
        tracing::warn!(expected, actual, "card count diverged from data source");
        match self {
            Self::DebugAssert => {
                debug_assert!(
                    false,
                    "card count after update ({actual}) is not equal to expected count ({expected})"
                );
                Ok(())
            }
            Self::Error => Err(DeckError::CountMismatch { expected, actual }),
            Self::Ignore => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn matching_counts_pass_under_every_policy() {
        for handling in [
            MismatchHandling::DebugAssert,
            MismatchHandling::Error,
            MismatchHandling::Ignore,
        ] {
            assert_eq!(handling.check(6, 6), Ok(()), "{handling:?}");
        }
    }

    #[test]
    fn error_policy_reports_both_counts() {
        let err = MismatchHandling::Error.check(6, 5).unwrap_err();
        assert_eq!(err, DeckError::CountMismatch { expected: 6, actual: 5 });
        assert_eq!(
            err.to_string(),
            "card count after update is 5, but the edit implies 6"
        );
    }

    #[test]
    fn ignore_policy_continues() {
        assert_eq!(MismatchHandling::Ignore.check(6, 5), Ok(()));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "not equal to expected count")]
    fn debug_assert_policy_panics_in_debug() {
        let _ = MismatchHandling::DebugAssert.check(6, 5);
    }
}
