//! Forgiveness collar values accepted by the SD and SAD scorers.

use std::fmt;

/// Collar length in seconds, restricted to the values the external scorers
/// are calibrated for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Collar {
    Zero,
    Quarter,
    Half,
    One,
    Two,
}

impl Collar {
    pub const ALLOWED: [Collar; 5] = [
        Collar::Zero,
        Collar::Quarter,
        Collar::Half,
        Collar::One,
        Collar::Two,
    ];

    /// Parse a collar from its numeric value. Only the enumerated values
    /// are accepted; anything else is `None` and the caller substitutes the
    /// task default.
    pub fn parse(seconds: f64) -> Option<Self> {
        Self::ALLOWED
            .into_iter()
            .find(|collar| collar.seconds() == seconds)
    }

    pub fn seconds(self) -> f64 {
        match self {
            Collar::Zero => 0.0,
            Collar::Quarter => 0.25,
            Collar::Half => 0.5,
            Collar::One => 1.0,
            Collar::Two => 2.0,
        }
    }

    /// Fixed decimal rendering used on scorer command lines.
    pub fn as_arg(self) -> &'static str {
        match self {
            Collar::Zero => "0.0",
            Collar::Quarter => "0.25",
            Collar::Half => "0.5",
            Collar::One => "1.0",
            Collar::Two => "2.0",
        }
    }

    /// Row index of this collar in the NIST SAD scorer's DCF table.
    pub fn sad_table_row(self) -> usize {
        match self {
            Collar::Zero => 3,
            Collar::Quarter => 7,
            Collar::Half => 11,
            Collar::One => 15,
            Collar::Two => 19,
        }
    }
}

impl fmt::Display for Collar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_arg())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_enumerated_values_only() {
        assert_eq!(Collar::parse(0.25), Some(Collar::Quarter));
        assert_eq!(Collar::parse(2.0), Some(Collar::Two));
        assert_eq!(Collar::parse(0.3), None);
        assert_eq!(Collar::parse(-1.0), None);
    }

    #[test]
    fn renders_fixed_decimal_forms() {
        assert_eq!(Collar::Zero.as_arg(), "0.0");
        assert_eq!(Collar::One.as_arg(), "1.0");
    }
}
