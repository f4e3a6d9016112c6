mod bmi;
mod projection;

pub use bmi::{bmi, bmi_from_input, BmiCategory, BmiReading};
pub use projection::{
    log_weight, normalize_history, project, within_window, GoalConfig, GoalProjector, GoalState,
    GoalTargets, HistoryWindow, Projection, WeightHistoryEntry,
};
