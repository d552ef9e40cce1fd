// ── Target-temperature setpoint ──
//
// The heat pump accepts 10.0-40.0 °C in half-degree steps; the wire
// carries tenths of a degree. Construction is the validation boundary:
// a `Setpoint` that exists is legal to transmit.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest accepted target temperature, °C.
pub const MIN_CELSIUS: f64 = 10.0;
/// Highest accepted target temperature, °C.
pub const MAX_CELSIUS: f64 = 40.0;
/// Accepted increment, °C.
pub const STEP_CELSIUS: f64 = 0.5;

#[derive(Debug, Error, PartialEq)]
pub enum SetpointError {
    #[error("setpoint {celsius} °C is outside the accepted range {MIN_CELSIUS}-{MAX_CELSIUS} °C")]
    OutOfRange { celsius: f64 },

    #[error("setpoint {celsius} °C is not a multiple of {STEP_CELSIUS} °C")]
    OffIncrement { celsius: f64 },
}

/// A validated target temperature.
///
/// Stored internally as tenths of a degree, the same unit the wire
/// uses, so encode/decode cannot drift through float rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Setpoint(i64);

impl Setpoint {
    /// Validate a Celsius value into a setpoint.
    pub fn new(celsius: f64) -> Result<Self, SetpointError> {
        let tenths = (celsius * 10.0).round();
        if (celsius * 10.0 - tenths).abs() > 1e-6 {
            return Err(SetpointError::OffIncrement { celsius });
        }

        #[allow(clippy::as_conversions, clippy::cast_possible_truncation)]
        let tenths = tenths as i64;
        Self::from_tenths(tenths)
    }

    /// Build from a wire value (tenths of °C).
    pub fn from_tenths(tenths: i64) -> Result<Self, SetpointError> {
        #[allow(clippy::as_conversions, clippy::cast_precision_loss)]
        let celsius = tenths as f64 / 10.0;

        if !(100..=400).contains(&tenths) {
            return Err(SetpointError::OutOfRange { celsius });
        }
        if tenths % 5 != 0 {
            return Err(SetpointError::OffIncrement { celsius });
        }
        Ok(Self(tenths))
    }

    /// The value in °C.
    pub fn celsius(self) -> f64 {
        #[allow(clippy::as_conversions, clippy::cast_precision_loss)]
        let celsius = self.0 as f64 / 10.0;
        celsius
    }

    /// The wire encoding (tenths of °C).
    pub const fn as_tenths(self) -> i64 {
        self.0
    }
}

impl TryFrom<f64> for Setpoint {
    type Error = SetpointError;

    fn try_from(celsius: f64) -> Result<Self, Self::Error> {
        Self::new(celsius)
    }
}

impl From<Setpoint> for f64 {
    fn from(sp: Setpoint) -> Self {
        sp.celsius()
    }
}

impl std::fmt::Display for Setpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1} °C", self.celsius())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn accepts_every_half_degree_in_range() {
        let mut tenths = 100;
        while tenths <= 400 {
            #[allow(clippy::as_conversions, clippy::cast_precision_loss)]
            let celsius = tenths as f64 / 10.0;
            let sp = Setpoint::new(celsius).unwrap();
            assert_eq!(sp.as_tenths(), tenths);
            tenths += 5;
        }
    }

    #[test]
    fn rejects_out_of_range() {
        assert_eq!(
            Setpoint::new(9.5),
            Err(SetpointError::OutOfRange { celsius: 9.5 })
        );
        assert_eq!(
            Setpoint::new(40.5),
            Err(SetpointError::OutOfRange { celsius: 40.5 })
        );
        assert!(Setpoint::new(-5.0).is_err());
        assert!(Setpoint::new(100.0).is_err());
    }

    #[test]
    fn rejects_off_increment() {
        assert!(matches!(
            Setpoint::new(27.3),
            Err(SetpointError::OffIncrement { .. })
        ));
        assert!(matches!(
            Setpoint::new(28.25),
            Err(SetpointError::OffIncrement { .. })
        ));
    }

    #[test]
    fn boundaries_are_inclusive() {
        assert_eq!(Setpoint::new(10.0).unwrap().as_tenths(), 100);
        assert_eq!(Setpoint::new(40.0).unwrap().as_tenths(), 400);
    }

    #[test]
    fn wire_round_trip() {
        let sp = Setpoint::new(28.5).unwrap();
        assert_eq!(sp.as_tenths(), 285);
        assert_eq!(Setpoint::from_tenths(285).unwrap(), sp);
    }

    #[test]
    fn from_tenths_rejects_off_step_wire_values() {
        assert!(Setpoint::from_tenths(283).is_err());
        assert!(Setpoint::from_tenths(401).is_err());
    }

    #[test]
    fn serde_rejects_invalid_values() {
        let ok: Setpoint = serde_json::from_str("28.5").unwrap();
        assert_eq!(ok.celsius(), 28.5);
        assert!(serde_json::from_str::<Setpoint>("41.0").is_err());
        assert!(serde_json::from_str::<Setpoint>("28.3").is_err());
    }

    #[test]
    fn display_is_one_decimal() {
        assert_eq!(Setpoint::new(28.5).unwrap().to_string(), "28.5 °C");
    }
}
