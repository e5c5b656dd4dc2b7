pub mod construct_solution;
pub mod first_solution_strategy;
