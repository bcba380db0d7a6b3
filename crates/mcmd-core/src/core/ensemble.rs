use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Statistical-mechanical sampling mode of the coupled simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ensemble {
    #[serde(rename = "NVT")]
    Nvt,
    #[serde(rename = "NPT")]
    Npt,
    #[serde(rename = "GEMC")]
    Gemc,
    #[serde(rename = "GCMC")]
    Gcmc,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown simulation type '{0}'. Expected one of NVT, NPT, GEMC, GCMC.")]
pub struct UnknownEnsembleError(pub String);

impl Ensemble {
    pub fn as_str(self) -> &'static str {
        match self {
            Ensemble::Nvt => "NVT",
            Ensemble::Npt => "NPT",
            Ensemble::Gemc => "GEMC",
            Ensemble::Gcmc => "GCMC",
        }
    }

    /// Ensembles whose box volume changes during a run.
    pub fn has_fluctuating_box(self) -> bool {
        matches!(self, Ensemble::Gemc | Ensemble::Npt)
    }

    /// Ensembles in which the Monte Carlo engine tracks a second box.
    pub fn uses_second_box(self) -> bool {
        matches!(self, Ensemble::Gemc | Ensemble::Gcmc)
    }
}

impl fmt::Display for Ensemble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Ensemble {
    type Err = UnknownEnsembleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "NVT" => Ok(Ensemble::Nvt),
            "NPT" => Ok(Ensemble::Npt),
            "GEMC" => Ok(Ensemble::Gemc),
            "GCMC" => Ok(Ensemble::Gcmc),
            other => Err(UnknownEnsembleError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_names_and_rejects_others() {
        assert_eq!("GEMC".parse::<Ensemble>(), Ok(Ensemble::Gemc));
        assert_eq!(" NPT ".parse::<Ensemble>(), Ok(Ensemble::Npt));
        assert_eq!(
            "FOO".parse::<Ensemble>(),
            Err(UnknownEnsembleError("FOO".to_string()))
        );
    }

    #[test]
    fn box_fluctuation_and_second_box_flags() {
        assert!(Ensemble::Gemc.has_fluctuating_box());
        assert!(Ensemble::Npt.has_fluctuating_box());
        assert!(!Ensemble::Gcmc.has_fluctuating_box());
        assert!(Ensemble::Gcmc.uses_second_box());
        assert!(!Ensemble::Nvt.uses_second_box());
    }
}
