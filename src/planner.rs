//! Color groups → ordered machine layers.

use crate::color::{luminance, resolve_color};
use crate::error::{Error, Result};
use crate::types::{ColorLayer, LaserJob};
use crate::walker::ColorMap;
use tracing::{debug, info};

/// Machine parameters applied by the planner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannerConfig {
    /// Power (percent) for white
    pub min_power: f64,
    /// Power (percent) for black
    pub max_power: f64,
    /// Speed (mm/s) for every layer
    pub speed: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            min_power: 10.0,
            max_power: 70.0,
            speed: 300.0,
        }
    }
}

impl PlannerConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.min_power.is_finite() && self.max_power.is_finite() && self.speed.is_finite()) {
            return Err(Error::InvalidConfig(
                "power and speed must be finite numbers".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&self.min_power) || !(0.0..=100.0).contains(&self.max_power) {
            return Err(Error::InvalidConfig(format!(
                "power must be within 0-100%, got {}-{}",
                self.min_power, self.max_power
            )));
        }
        if self.min_power > self.max_power {
            return Err(Error::InvalidConfig(format!(
                "min power {} exceeds max power {}",
                self.min_power, self.max_power
            )));
        }
        if self.speed <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "speed must be positive, got {}",
                self.speed
            )));
        }
        Ok(())
    }

    /// Power for a luminance in 0..=255: black gets `max_power`, white `min_power`
    pub fn power_for(&self, luminance: f64) -> f64 {
        let power = self.min_power + (1.0 - luminance / 255.0) * (self.max_power - self.min_power);
        // f64::clamp panics on min > max; an unvalidated config must not
        power.max(self.min_power).min(self.max_power)
    }
}

/// Turn grouped geometry into a job ordered by ascending channel sum.
///
/// Colors with no paths are dropped; nothing else is. Ties in channel sum
/// keep their first-encountered order.
pub fn plan(colors: ColorMap, config: &PlannerConfig) -> LaserJob {
    let mut layers: Vec<ColorLayer> = colors
        .into_iter()
        .filter_map(|(color_key, paths)| {
            if paths.is_empty() {
                debug!("Dropping color {} with no geometry", color_key);
                return None;
            }
            let rgb = resolve_color(&color_key);
            let power = config.power_for(luminance(rgb));
            Some(ColorLayer {
                color_key,
                paths,
                power,
                speed: config.speed,
                rgb,
            })
        })
        .collect();

    layers.sort_by_key(|layer| layer.rgb.sum());

    for (i, layer) in layers.iter().enumerate() {
        info!(
            "Layer {}: color {} ({}) gray {:.1} -> power {:.1}%, speed {}mm/s, {} path(s)",
            i,
            layer.color_key,
            layer.rgb.to_hex(),
            luminance(layer.rgb),
            layer.power,
            layer.speed,
            layer.paths.len()
        );
    }

    LaserJob::from_layers(layers)
}
