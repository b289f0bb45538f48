use std::fmt;
use std::str::FromStr;

use bevy::prelude::*;
use hexx::HexOrientation;

use super::MapError;

/// The four offset-grid conventions a map can be laid out in.
///
/// Flat-top systems (`odd-q`, `even-q`) offset alternate columns, pointy-top
/// systems (`odd-r`, `even-r`) offset alternate rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub enum CoordinateSystem {
    /// Flat-top, odd parity.
    OddQ,
    /// Flat-top, even parity.
    #[default]
    EvenQ,
    /// Pointy-top, odd parity.
    OddR,
    /// Pointy-top, even parity.
    EvenR,
}

impl CoordinateSystem {
    /// Every system, ordered by table index.
    pub const ALL: [Self; 4] = [Self::OddQ, Self::EvenQ, Self::OddR, Self::EvenR];

    /// Looks a system up by its table index (`0..4`).
    pub fn from_index(index: usize) -> Result<Self, MapError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or_else(|| MapError::UnknownCoordinateSystem(index.to_string()))
    }

    /// Position of this system in [`Self::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Self::OddQ => 0,
            Self::EvenQ => 1,
            Self::OddR => 2,
            Self::EvenR => 3,
        }
    }

    /// Short conventional name (`"odd-q"` etc).
    pub const fn name(self) -> &'static str {
        match self {
            Self::OddQ => "odd-q",
            Self::EvenQ => "even-q",
            Self::OddR => "odd-r",
            Self::EvenR => "even-r",
        }
    }

    /// `true` for flat-top hexes, `false` for pointy-top.
    pub const fn is_flat_top(self) -> bool {
        matches!(self, Self::OddQ | Self::EvenQ)
    }

    /// Parity rule of the offset rows/columns.
    pub const fn is_odd(self) -> bool {
        matches!(self, Self::OddQ | Self::OddR)
    }

    /// Matching `hexx` orientation.
    pub const fn orientation(self) -> HexOrientation {
        if self.is_flat_top() {
            HexOrientation::Flat
        } else {
            HexOrientation::Pointy
        }
    }
}

impl fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts either the name (`"odd-r"`) or the table index (`"2"`).
impl FromStr for CoordinateSystem {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(index) = s.parse::<usize>() {
            return Self::from_index(index);
        }
        Self::ALL
            .into_iter()
            .find(|cs| cs.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| MapError::UnknownCoordinateSystem(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_conventions() {
        let table: Vec<_> = CoordinateSystem::ALL
            .iter()
            .map(|cs| (cs.name(), cs.is_flat_top(), cs.is_odd()))
            .collect();
        assert_eq!(
            table,
            vec![
                ("odd-q", true, true),
                ("even-q", true, false),
                ("odd-r", false, true),
                ("even-r", false, false),
            ]
        );
    }

    #[test]
    fn index_roundtrip() {
        for cs in CoordinateSystem::ALL {
            assert_eq!(CoordinateSystem::from_index(cs.index()), Ok(cs));
        }
        assert!(CoordinateSystem::from_index(4).is_err());
    }

    #[test]
    fn parses_names_and_indices() {
        assert_eq!("odd-r".parse::<CoordinateSystem>(), Ok(CoordinateSystem::OddR));
        assert_eq!("EVEN-Q".parse::<CoordinateSystem>(), Ok(CoordinateSystem::EvenQ));
        assert_eq!("3".parse::<CoordinateSystem>(), Ok(CoordinateSystem::EvenR));
        assert!("hexagonal".parse::<CoordinateSystem>().is_err());
    }

    #[test]
    fn default_is_even_q() {
        assert_eq!(CoordinateSystem::default(), CoordinateSystem::EvenQ);
    }
}
