//! Per-vehicle behavioural parameters.

use crate::{Error, Result};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

/// A parameter of the perception and mental model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ParameterType {
    /// Downstream perception range, in m.
    Lookahead,
    /// Upstream perception range, in m.
    Lookback,
    /// Decay time of the ego approach to a conflict, in s.
    HEgo,
    /// Decay time of a conflicting vehicle's approach, in s.
    HConf,
    /// Decay time of the car-following headway, in s.
    HExp,
    /// Demand of a scan task.
    TdScan,
    /// Sensitivity to social pressure from a follower.
    Socio,
    /// Tailgating pressure exerted on the leader.
    Rho,
    /// Perception delay of a fully attended channel, in s.
    TauMin,
    /// Perception delay of an unattended channel, in s.
    TauMax,
}

impl ParameterType {
    /// All parameter types.
    pub const ALL: [ParameterType; 10] = [
        Self::Lookahead,
        Self::Lookback,
        Self::HEgo,
        Self::HConf,
        Self::HExp,
        Self::TdScan,
        Self::Socio,
        Self::Rho,
        Self::TauMin,
        Self::TauMax,
    ];

    /// A short identifier of the parameter.
    pub fn id(self) -> &'static str {
        match self {
            Self::Lookahead => "LOOKAHEAD",
            Self::Lookback => "LOOKBACK",
            Self::HEgo => "h_ego",
            Self::HConf => "h_conf",
            Self::HExp => "h_exp",
            Self::TdScan => "td_scan",
            Self::Socio => "socio",
            Self::Rho => "rho",
            Self::TauMin => "tau_min",
            Self::TauMax => "tau_max",
        }
    }

    /// The default value, if the parameter has one.
    pub fn default_value(self) -> Option<f64> {
        match self {
            Self::Lookahead => Some(295.0),
            Self::Lookback => Some(200.0),
            Self::HEgo => Some(4.46),
            Self::HConf => Some(2.49),
            Self::HExp => Some(4.0),
            Self::TdScan => Some(0.02),
            Self::Socio | Self::Rho => None,
            Self::TauMin => Some(0.32),
            Self::TauMax => Some(1.2),
        }
    }

    /// Whether the value satisfies the parameter's constraint.
    pub fn accepts(self, value: f64) -> bool {
        match self {
            Self::Lookahead | Self::Lookback => value > 0.0,
            Self::TdScan => (0.0..1.0).contains(&value),
            Self::Socio | Self::Rho => (0.0..=1.0).contains(&value),
            Self::HEgo | Self::HConf | Self::HExp | Self::TauMin | Self::TauMax => value >= 0.0,
        }
    }
}

impl Display for ParameterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// A set of parameter values belonging to one vehicle.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParameterSet {
    values: BTreeMap<ParameterType, f64>,
}

impl ParameterSet {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates a parameter set holding every parameter that has a default value.
    pub fn with_defaults() -> Self {
        let values = ParameterType::ALL
            .into_iter()
            .filter_map(|p| p.default_value().map(|v| (p, v)))
            .collect();
        Self { values }
    }

    /// Sets a parameter, validating it against its constraint.
    pub fn set(&mut self, parameter: ParameterType, value: f64) -> Result<()> {
        if !parameter.accepts(value) {
            return Err(Error::InvalidParameter { parameter, value });
        }
        self.values.insert(parameter, value);
        Ok(())
    }

    /// Removes a parameter from the set.
    pub fn reset(&mut self, parameter: ParameterType) {
        self.values.remove(&parameter);
    }

    /// Gets a required parameter.
    pub fn get(&self, parameter: ParameterType) -> Result<f64> {
        self.get_optional(parameter)
            .ok_or(Error::MissingParameter(parameter))
    }

    /// Gets a parameter, if it's set.
    pub fn get_optional(&self, parameter: ParameterType) -> Option<f64> {
        self.values.get(&parameter).copied()
    }

    /// Whether the parameter is set.
    pub fn contains(&self, parameter: ParameterType) -> bool {
        self.values.contains_key(&parameter)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_leave_social_parameters_unset() {
        let params = ParameterSet::with_defaults();
        assert_eq!(params.get(ParameterType::HEgo), Ok(4.46));
        assert_eq!(params.get(ParameterType::HConf), Ok(2.49));
        assert!(!params.contains(ParameterType::Socio));
        assert_eq!(
            params.get(ParameterType::Rho),
            Err(Error::MissingParameter(ParameterType::Rho))
        );
    }

    #[test]
    fn set_rejects_values_outside_constraint() {
        let mut params = ParameterSet::new();
        assert!(params.set(ParameterType::HConf, -1.0).is_err());
        assert!(params.set(ParameterType::TdScan, 1.0).is_err());
        assert!(params.set(ParameterType::Socio, 1.0).is_ok());
        assert!(!params.contains(ParameterType::HConf));
    }
}
