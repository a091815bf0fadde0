//! `An+B` microsyntax used by the `:nth-*()` pseudo-classes.
//! See <https://www.w3.org/TR/css-syntax-3/#anb-microsyntax>

use crate::error::SyntaxError;

/// A parsed `An+B` formula. Matches 1-based position `p` when `p = A*n + B`
/// for some integer `n >= 0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NthFormula {
    pub step: i32,
    pub offset: i32,
}

impl NthFormula {
    pub const fn new(step: i32, offset: i32) -> Self {
        Self { step, offset }
    }

    /// Test a 1-based position.
    pub fn matches(self, position: usize) -> bool {
        let Ok(position) = i64::try_from(position) else {
            return false;
        };
        let step = i64::from(self.step);
        let diff = position - i64::from(self.offset);
        if step == 0 {
            return diff == 0;
        }
        diff % step == 0 && diff / step >= 0
    }

    /// Parse the argument of an `:nth-*()` pseudo-class.
    ///
    /// Accepts `odd`, `even`, a signed integer, and `An+B` with optional
    /// signs and whitespace around the binary `+`/`-`.
    ///
    /// # Errors
    /// Returns [`SyntaxError::InvalidNth`] for anything else.
    pub fn parse(raw: &str) -> Result<Self, SyntaxError> {
        let invalid = || SyntaxError::InvalidNth(raw.trim().to_owned());
        let text = raw.trim().to_ascii_lowercase();
        match text.as_str() {
            "" => return Err(invalid()),
            "odd" => return Ok(Self::new(2, 1)),
            "even" => return Ok(Self::new(2, 0)),
            _ => {}
        }

        let Some(n_pos) = text.find('n') else {
            return parse_signed(&text).map(|offset| Self::new(0, offset)).ok_or_else(invalid);
        };

        let (step_part, rest) = text.split_at(n_pos);
        let step = match step_part {
            "" | "+" => 1,
            "-" => -1,
            digits => parse_signed(digits).ok_or_else(invalid)?,
        };

        let tail = rest.get(1..).unwrap_or("").trim_start();
        if tail.is_empty() {
            return Ok(Self::new(step, 0));
        }
        let (negative, magnitude) = if let Some(after) = tail.strip_prefix('+') {
            (false, after.trim_start())
        } else if let Some(after) = tail.strip_prefix('-') {
            (true, after.trim_start())
        } else {
            return Err(invalid());
        };
        if magnitude.is_empty() || !magnitude.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(invalid());
        }
        let value: i32 = magnitude.parse().map_err(|_| invalid())?;
        Ok(Self::new(step, if negative { -value } else { value }))
    }
}

/// Parse an integer with an optional leading sign and no inner whitespace.
fn parse_signed(text: &str) -> Option<i32> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}
