//! EPSG codes of the coordinate reference systems used throughout the crate.

use std::str::FromStr;

use crate::{Error, Result};

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Epsg(u16);

impl Epsg {
    pub const fn new(code: u16) -> Self {
        Epsg(code)
    }

    pub const fn code(&self) -> u16 {
        self.0
    }
}

impl From<u16> for Epsg {
    fn from(code: u16) -> Self {
        Epsg(code)
    }
}

impl From<Epsg> for u16 {
    fn from(epsg: Epsg) -> Self {
        epsg.0
    }
}

impl std::fmt::Display for Epsg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}

impl FromStr for Epsg {
    type Err = Error;

    /// Parses `EPSG:<code>` (case insensitive)
    fn from_str(s: &str) -> Result<Self> {
        let code = s
            .get(..5)
            .filter(|prefix| prefix.eq_ignore_ascii_case("EPSG:"))
            .and_then(|_| s[5..].trim().parse::<u16>().ok())
            .ok_or_else(|| Error::InvalidArgument(format!("Not an EPSG definition: {s}")))?;
        Ok(Epsg(code))
    }
}

pub mod epsg {
    use super::Epsg;

    pub const WGS84: Epsg = Epsg::new(4326);
    pub const WGS84_WEB_MERCATOR: Epsg = Epsg::new(3857);
    pub const WGS84_UTM18S: Epsg = Epsg::new(32718);
    pub const WGS84_UTM19S: Epsg = Epsg::new(32719);
}
