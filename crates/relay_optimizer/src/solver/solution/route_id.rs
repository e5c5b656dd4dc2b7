use crate::{define_index_newtype, solver::solution::route::WorkingSolutionRoute};

define_index_newtype!(RouteIdx, WorkingSolutionRoute);
