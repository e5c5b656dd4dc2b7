pub mod constraints;
pub mod construction;
pub mod insertion;
pub mod ls;
pub mod optimize;
pub mod schedule;
pub mod score;
pub mod solution;
pub mod solver;
pub mod solver_params;
pub mod statistics;
