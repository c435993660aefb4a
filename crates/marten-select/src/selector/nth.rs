//! `:nth-child()` arithmetic.
//!
//! [§ 6.6.5.2 :nth-child() pseudo-class](https://www.w3.org/TR/selectors-3/#nth-child-pseudo)
//!
//! "The :nth-child(an+b) pseudo-class notation represents an element that
//! has an+b-1 siblings before it in the document tree, for any positive
//! integer or zero value of n."

use crate::SelectorError;

/// A parsed `an+b` expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NthExpr {
    /// The step `a` (the engine calls it the magnitude).
    pub step: i64,
    /// The offset `b`.
    pub offset: i64,
}

impl NthExpr {
    /// Build an expression from its two coefficients.
    #[must_use]
    pub const fn new(step: i64, offset: i64) -> Self {
        Self { step, offset }
    }

    /// Parse `odd`, `even`, a bare integer, or `an+b`.
    ///
    /// Whitespace is allowed around the expression and around the sign
    /// that separates `an` from `b`.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError::InvalidArgument`] for anything else.
    pub fn parse(raw: &str) -> Result<Self, SelectorError> {
        let malformed = || SelectorError::InvalidArgument(format!("malformed nth-child expression {raw:?}"));

        let text = raw.trim().to_ascii_lowercase();
        match text.as_str() {
            // "odd and even can be used as arguments instead. odd has the same
            // signification as 2n+1, and even has the same signification as 2n."
            "odd" => return Ok(Self::new(2, 1)),
            "even" => return Ok(Self::new(2, 0)),
            "" => return Err(malformed()),
            _ => {}
        }

        let Some((step_text, offset_text)) = text.split_once('n') else {
            return parse_integer(&text).map(|offset| Self::new(0, offset)).ok_or_else(malformed);
        };

        let step = match step_text.trim() {
            "" | "+" => 1,
            "-" => -1,
            other => parse_integer(other).ok_or_else(malformed)?,
        };

        // "b" must be introduced by an explicit sign: `2n+1`, `-n - 3`.
        let offset_text: String = offset_text.chars().filter(|c| !c.is_whitespace()).collect();
        let offset = if offset_text.is_empty() {
            0
        } else if offset_text.starts_with(['+', '-']) {
            parse_integer(&offset_text).ok_or_else(malformed)?
        } else {
            return Err(malformed());
        };

        Ok(Self::new(step, offset))
    }

    /// Whether the 1-based sibling `position` satisfies the expression.
    ///
    /// With no step the position must equal the offset. Otherwise the
    /// distance to the offset must be a multiple of the step, and a negative
    /// step only reaches positions up to the offset ("counting down").
    #[must_use]
    pub fn matches(&self, position: i64) -> bool {
        if self.step == 0 {
            return position == self.offset;
        }
        // Widened so any pair of i64 coefficients is representable.
        let distance = i128::from(position) - i128::from(self.offset);
        distance % i128::from(self.step) == 0 && (self.step > 0 || position <= self.offset)
    }
}

/// Parse an optionally signed decimal integer with no embedded whitespace.
fn parse_integer(text: &str) -> Option<i64> {
    let digits = text.strip_prefix('+').unwrap_or(text);
    let unsigned = digits.strip_prefix('-').unwrap_or(digits);
    if unsigned.is_empty() || !unsigned.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keywords() {
        assert_eq!(NthExpr::parse("odd"), Ok(NthExpr::new(2, 1)));
        assert_eq!(NthExpr::parse(" EVEN "), Ok(NthExpr::new(2, 0)));
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(NthExpr::parse("3"), Ok(NthExpr::new(0, 3)));
        assert_eq!(NthExpr::parse("+3"), Ok(NthExpr::new(0, 3)));
        assert_eq!(NthExpr::parse("2n+1"), Ok(NthExpr::new(2, 1)));
        assert_eq!(NthExpr::parse("n"), Ok(NthExpr::new(1, 0)));
        assert_eq!(NthExpr::parse("-n+3"), Ok(NthExpr::new(-1, 3)));
        assert_eq!(NthExpr::parse("+5n - 2"), Ok(NthExpr::new(5, -2)));
        assert_eq!(NthExpr::parse("3n"), Ok(NthExpr::new(3, 0)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "x", "2n1", "2n+", "n+x", "1.5", "--n"] {
            assert!(NthExpr::parse(bad).is_err(), "{bad:?} should fail");
        }
    }

    #[test]
    fn test_matches_positions() {
        let odd = NthExpr::new(2, 1);
        assert!(odd.matches(1));
        assert!(!odd.matches(2));
        assert!(odd.matches(5));

        let first_three = NthExpr::new(-1, 3);
        assert!(first_three.matches(1));
        assert!(first_three.matches(3));
        assert!(!first_three.matches(4));

        let second = NthExpr::new(0, 2);
        assert!(second.matches(2));
        assert!(!second.matches(4));
    }

    #[test]
    fn test_matches_extreme_coefficients() {
        assert!(NthExpr::new(1, i64::MIN).matches(1));
        assert!(NthExpr::new(2, i64::MAX).matches(1));
        assert!(!NthExpr::new(2, i64::MAX).matches(2));
        assert!(!NthExpr::new(-1, i64::MIN).matches(1));
        assert!(!NthExpr::new(i64::MIN, 1).matches(2));
        assert!(NthExpr::new(i64::MIN, 1).matches(1));
    }
}
