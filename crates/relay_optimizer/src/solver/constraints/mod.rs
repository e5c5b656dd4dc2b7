pub mod capacity_constraint;
pub mod compute_insertion_score;
pub mod priority_constraint;
pub mod route_evaluation;
pub mod time_window_constraint;
pub mod transport_cost_constraint;
pub mod violation;
