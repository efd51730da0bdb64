//! Source/destination positions in the combined locations array.

use std::ops::Range;

/// Positions of the sources and destinations in the locations array.
///
/// Outside the self-matrix case the ranges are disjoint and together cover
/// `0..sources + destinations`. For a self-matrix both ranges are
/// `0..sources` and the locations array holds the source features only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexAssignment {
    /// Indices of the source locations.
    pub sources: Vec<usize>,
    /// Indices of the destination locations.
    pub destinations: Vec<usize>,
    /// Length of the combined locations array.
    pub locations: usize,
}

/// Lay out sources and destinations in one locations array.
///
/// # Examples
/// ```
/// use waymatrix_core::assign_indices;
///
/// let split = assign_indices(2, 3, false);
/// assert_eq!(split.sources, vec![0, 1]);
/// assert_eq!(split.destinations, vec![2, 3, 4]);
///
/// let shared = assign_indices(2, 2, true);
/// assert_eq!(shared.sources, shared.destinations);
/// assert_eq!(shared.locations, 2);
/// ```
pub fn assign_indices(
    sources_amount: usize,
    destinations_amount: usize,
    source_equals_destination: bool,
) -> IndexAssignment {
    let sources: Range<usize> = 0..sources_amount;
    if source_equals_destination {
        return IndexAssignment {
            sources: sources.clone().collect(),
            destinations: sources.collect(),
            locations: sources_amount,
        };
    }

    let locations = sources_amount + destinations_amount;
    IndexAssignment {
        sources: sources.collect(),
        destinations: (sources_amount..locations).collect(),
        locations,
    }
}
