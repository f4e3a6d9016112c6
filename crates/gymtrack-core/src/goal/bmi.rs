//! Body mass index.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn for_value(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BmiReading {
    pub value: f64,
    pub category: BmiCategory,
}

impl BmiReading {
    /// Value rounded to one decimal place, as displayed.
    pub fn rounded(&self) -> f64 {
        (self.value * 10.0).round() / 10.0
    }
}

/// `weight_kg / (height_cm / 100)^2`. `None` unless both inputs are
/// positive finite numbers.
pub fn bmi(weight_kg: f64, height_cm: f64) -> Option<BmiReading> {
    let valid = |v: f64| v.is_finite() && v > 0.0;
    if !valid(weight_kg) || !valid(height_cm) {
        return None;
    }
    let meters = height_cm / 100.0;
    let value = weight_kg / (meters * meters);
    Some(BmiReading {
        value,
        category: BmiCategory::for_value(value),
    })
}

/// [`bmi`] over free-text form input; unparsable text gives `None`.
pub fn bmi_from_input(weight_kg: &str, height_cm: &str) -> Option<BmiReading> {
    let weight = weight_kg.trim().parse::<f64>().ok()?;
    let height = height_cm.trim().parse::<f64>().ok()?;
    bmi(weight, height)
}
