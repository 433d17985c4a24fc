//! Re-exported APIs for consumers of the transfer crate.

pub use crate::mission::delta_v::{departure_hyperbola, ejection_capture_dv};
pub use crate::mission::porkchop::{
    GridCell, GridSearchError, GridSearchProblem, GridSearchResult, TimeRange, grid_search,
    grid_search_parallel, partition_rows,
};
pub use crate::mission::transfer::{
    TransferArc, TransferEndpoint, TransferError, TransferOrbit, approximate_time_of_flight,
    excess_velocity, planetary_transfer, planetary_transfer_with_direction,
};
pub use kerbol_impulsive::TransferDirection;
