use itertools::Itertools;
use rstar::{RTree, RTreeObject, AABB};

/// A candidate segment for intersection testing, indexed by its local-plane
/// bounding box (spec §4.C: "a spatial index (grid or R-tree) is required").
#[derive(Debug, Clone, Copy)]
pub(crate) struct IndexedSegment {
    /// Position of this segment within the slice passed to [`candidate_pairs`].
    pub idx: usize,
    pub feature: usize,
    pub seg: usize,
    pub a_local: [f64; 2],
    pub b_local: [f64; 2],
}

impl RTreeObject for IndexedSegment {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.a_local[0].min(self.b_local[0]), self.a_local[1].min(self.b_local[1])],
            [self.a_local[0].max(self.b_local[0]), self.a_local[1].max(self.b_local[1])],
        )
    }
}

/// Below this many segments, building the R-tree costs more than a naive
/// O(n^2) scan saves (spec §4.C: "naive O(n^2) is acceptable only under a
/// documented threshold").
pub(crate) const NAIVE_SCAN_THRESHOLD: usize = 64;

/// Yields every unordered pair of segments whose bounding boxes overlap.
pub(crate) fn candidate_pairs(segments: &[IndexedSegment]) -> Vec<(usize, usize)> {
    if segments.len() < NAIVE_SCAN_THRESHOLD {
        let mut pairs = Vec::new();
        for i in 0..segments.len() {
            for j in (i + 1)..segments.len() {
                if segments[i].envelope().intersects(&segments[j].envelope()) {
                    pairs.push((i, j));
                }
            }
        }
        return pairs;
    }

    let tree = RTree::bulk_load(segments.to_vec());
    segments
        .iter()
        .flat_map(|seg| {
            tree.locate_in_envelope_intersecting(&seg.envelope())
                .filter(move |candidate| seg.idx < candidate.idx)
                .map(move |candidate| (seg.idx, candidate.idx))
        })
        .sorted_unstable()
        .dedup()
        .collect()
}
