//! Model parameters shared by every group.

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::group::Strategy;

fn default_min_size() -> f64 {
    6.0
}

fn default_max_size() -> f64 {
    6000.0
}

fn default_forager_growth() -> f64 {
    0.01
}

fn default_farmer_growth() -> f64 {
    0.02
}

fn default_complexity_threshold() -> f64 {
    100.0
}

fn default_loss_rate() -> f64 {
    0.5
}

fn default_intensification() -> f64 {
    1.2
}

fn default_diffusion_range() -> (f64, f64) {
    (50.0, 100.0)
}

fn default_radius() -> u32 {
    1
}

fn default_retreat_depth() -> u32 {
    8
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyParams {
    #[serde(default = "default_min_size")]
    pub min_size: f64,
    #[serde(default = "default_max_size")]
    pub max_size: f64,
    pub growth_rate: f64,
}

impl StrategyParams {
    fn forager() -> Self {
        Self {
            min_size: default_min_size(),
            max_size: default_max_size(),
            growth_rate: default_forager_growth(),
        }
    }

    fn farmer() -> Self {
        Self {
            min_size: default_min_size(),
            max_size: default_max_size(),
            growth_rate: default_farmer_growth(),
        }
    }
}

/// Conversion probabilities per target strategy. A key left out of the
/// scenario never converts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConvertProb {
    #[serde(default)]
    pub to_farmer: f64,
    #[serde(default)]
    pub to_rice: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Neighborhood {
    #[serde(default = "default_radius")]
    pub radius: u32,
    /// Include diagonals (Moore) instead of the four orthogonal cells.
    #[serde(default)]
    pub moore: bool,
}

impl Default for Neighborhood {
    fn default() -> Self {
        Self {
            radius: default_radius(),
            moore: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Arability {
    pub max_slope: f64,
    pub min_aspect: f64,
    pub max_aspect: f64,
    pub min_elevation: f64,
    pub max_elevation: f64,
    pub rice_max_elevation: f64,
    pub rice_max_slope: f64,
}

impl Default for Arability {
    fn default() -> Self {
        Self {
            max_slope: 10.0,
            min_aspect: 45.0,
            max_aspect: 315.0,
            min_elevation: 0.0,
            max_elevation: 200.0,
            rice_max_elevation: 100.0,
            rice_max_slope: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    pub forager: StrategyParams,
    pub farmer: StrategyParams,
    pub rice_farmer: StrategyParams,
    pub complexity_threshold: f64,
    pub loss_rate: f64,
    pub intensification_coefficient: f64,
    pub convert_prob: ConvertProb,
    pub diffusion_range: (f64, f64),
    pub neighborhood: Neighborhood,
    pub move_radius: u32,
    pub max_retreat_depth: u32,
    pub arability: Arability,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            forager: StrategyParams::forager(),
            farmer: StrategyParams::farmer(),
            rice_farmer: StrategyParams::farmer(),
            complexity_threshold: default_complexity_threshold(),
            loss_rate: default_loss_rate(),
            intensification_coefficient: default_intensification(),
            convert_prob: ConvertProb::default(),
            diffusion_range: default_diffusion_range(),
            neighborhood: Neighborhood::default(),
            move_radius: default_radius(),
            max_retreat_depth: default_retreat_depth(),
            arability: Arability::default(),
        }
    }
}

impl Params {
    pub fn strategy(&self, strategy: Strategy) -> &StrategyParams {
        match strategy {
            Strategy::Forager => &self.forager,
            Strategy::Farmer => &self.farmer,
            Strategy::RiceFarmer => &self.rice_farmer,
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        for strategy in Strategy::ALL {
            let bounds = self.strategy(strategy);
            if !(bounds.min_size >= 0.0 && bounds.min_size <= bounds.max_size) {
                return Err(SimError::InvalidParams(format!(
                    "{strategy}: size bounds [{}, {}] are not ordered and non-negative",
                    bounds.min_size, bounds.max_size
                )));
            }
            if !bounds.growth_rate.is_finite() || bounds.growth_rate <= -1.0 {
                return Err(SimError::InvalidParams(format!(
                    "{strategy}: growth rate {} must be finite and above -1",
                    bounds.growth_rate
                )));
            }
        }
        if !(0.0..1.0).contains(&self.loss_rate) {
            return Err(SimError::InvalidParams(format!(
                "loss_rate {} must lie in [0, 1)",
                self.loss_rate
            )));
        }
        if !(self.intensification_coefficient > 0.0) {
            return Err(SimError::InvalidParams(
                "intensification_coefficient must be positive".into(),
            ));
        }
        for (key, prob) in [
            ("to_farmer", self.convert_prob.to_farmer),
            ("to_rice", self.convert_prob.to_rice),
        ] {
            if !(0.0..=1.0).contains(&prob) {
                return Err(SimError::InvalidParams(format!(
                    "convert_prob.{key} = {prob} is not a probability"
                )));
            }
        }
        let (min, max) = self.diffusion_range;
        if !(min > 0.0 && min <= max) {
            return Err(SimError::InvalidParams(format!(
                "diffusion_range ({min}, {max}) must be positive and ordered"
            )));
        }
        if self.complexity_threshold < 0.0 {
            return Err(SimError::InvalidParams(
                "complexity_threshold must be non-negative".into(),
            ));
        }
        Ok(())
    }
}
