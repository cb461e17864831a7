//! Status values exposed by the smoke sensor.
//!
//! Each dimension has its own small enumeration whose discriminants are the
//! HomeKit characteristic codes, so hosts can forward them unchanged.

use strum::{Display, EnumIter};

/// One of the four independently tracked status facets.
///
/// The declaration order is the matching priority order: when several
/// configured topics coincide, the dimension declared first wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Dimension {
    #[strum(serialize = "smoke detected")]
    SmokeDetected,
    #[strum(serialize = "low battery")]
    LowBattery,
    #[strum(serialize = "tampered")]
    Tampered,
    #[strum(serialize = "fault")]
    Fault,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum SmokeDetected {
    #[default]
    NotDetected = 0,
    Detected = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum LowBattery {
    #[default]
    Normal = 0,
    Low = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum Tampered {
    #[default]
    NotTampered = 0,
    Tampered = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum Fault {
    #[default]
    NoFault = 0,
    GeneralFault = 1,
}

/// A value for exactly one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusValue {
    SmokeDetected(SmokeDetected),
    LowBattery(LowBattery),
    Tampered(Tampered),
    Fault(Fault),
}

impl StatusValue {
    /// Value reported when the `active` (true) or inactive (false) pair of a
    /// dimension fires.
    pub fn from_polarity(dimension: Dimension, active: bool) -> Self {
        match (dimension, active) {
            (Dimension::SmokeDetected, true) => Self::SmokeDetected(SmokeDetected::Detected),
            (Dimension::SmokeDetected, false) => Self::SmokeDetected(SmokeDetected::NotDetected),
            (Dimension::LowBattery, true) => Self::LowBattery(LowBattery::Low),
            (Dimension::LowBattery, false) => Self::LowBattery(LowBattery::Normal),
            (Dimension::Tampered, true) => Self::Tampered(Tampered::Tampered),
            (Dimension::Tampered, false) => Self::Tampered(Tampered::NotTampered),
            (Dimension::Fault, true) => Self::Fault(Fault::GeneralFault),
            (Dimension::Fault, false) => Self::Fault(Fault::NoFault),
        }
    }

    pub fn dimension(&self) -> Dimension {
        match self {
            Self::SmokeDetected(_) => Dimension::SmokeDetected,
            Self::LowBattery(_) => Dimension::LowBattery,
            Self::Tampered(_) => Dimension::Tampered,
            Self::Fault(_) => Dimension::Fault,
        }
    }

    /// HomeKit characteristic code for this value.
    pub fn code(&self) -> u8 {
        match *self {
            Self::SmokeDetected(v) => v as u8,
            Self::LowBattery(v) => v as u8,
            Self::Tampered(v) => v as u8,
            Self::Fault(v) => v as u8,
        }
    }
}

impl std::fmt::Display for StatusValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SmokeDetected(v) => write!(f, "{}", v),
            Self::LowBattery(v) => write!(f, "{}", v),
            Self::Tampered(v) => write!(f, "{}", v),
            Self::Fault(v) => write!(f, "{}", v),
        }
    }
}

/// Current value of every dimension.
///
/// Defaults to the normal/safe reading for each one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SensorState {
    pub smoke_detected: SmokeDetected,
    pub low_battery: LowBattery,
    pub tampered: Tampered,
    pub fault: Fault,
}

impl SensorState {
    pub fn get(&self, dimension: Dimension) -> StatusValue {
        match dimension {
            Dimension::SmokeDetected => StatusValue::SmokeDetected(self.smoke_detected),
            Dimension::LowBattery => StatusValue::LowBattery(self.low_battery),
            Dimension::Tampered => StatusValue::Tampered(self.tampered),
            Dimension::Fault => StatusValue::Fault(self.fault),
        }
    }

    /// Store `value` and return the value it replaced.
    pub fn set(&mut self, value: StatusValue) -> StatusValue {
        let old = self.get(value.dimension());
        match value {
            StatusValue::SmokeDetected(v) => self.smoke_detected = v,
            StatusValue::LowBattery(v) => self.low_battery = v,
            StatusValue::Tampered(v) => self.tampered = v,
            StatusValue::Fault(v) => self.fault = v,
        }
        old
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_default_state_is_safe() {
        let state = SensorState::default();
        assert_eq!(state.smoke_detected, SmokeDetected::NotDetected);
        assert_eq!(state.low_battery, LowBattery::Normal);
        assert_eq!(state.tampered, Tampered::NotTampered);
        assert_eq!(state.fault, Fault::NoFault);
        for dimension in Dimension::iter() {
            assert_eq!(state.get(dimension).code(), 0);
        }
    }

    #[test]
    fn test_dimension_order() {
        let order: Vec<Dimension> = Dimension::iter().collect();
        assert_eq!(
            order,
            vec![
                Dimension::SmokeDetected,
                Dimension::LowBattery,
                Dimension::Tampered,
                Dimension::Fault
            ]
        );
    }

    #[test]
    fn test_polarity_codes() {
        for dimension in Dimension::iter() {
            let active = StatusValue::from_polarity(dimension, true);
            let inactive = StatusValue::from_polarity(dimension, false);
            assert_eq!(active.dimension(), dimension);
            assert_eq!(inactive.dimension(), dimension);
            assert_eq!(active.code(), 1);
            assert_eq!(inactive.code(), 0);
        }
    }

    #[test]
    fn test_set_returns_previous_value() {
        let mut state = SensorState::default();
        let old = state.set(StatusValue::Fault(Fault::GeneralFault));
        assert_eq!(old, StatusValue::Fault(Fault::NoFault));
        assert_eq!(state.fault, Fault::GeneralFault);
        assert_eq!(state.smoke_detected, SmokeDetected::NotDetected);
    }
}
