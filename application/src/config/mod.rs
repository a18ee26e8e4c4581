//! Application-level configuration.
//!
//! - [`PlanningParams`]: loop control for the self-critique planner
//!   (iterations, samples per vote, sampling parameters, timeouts)

pub mod planning_params;

pub use planning_params::{PlanningParams, PlanningParamsError};
