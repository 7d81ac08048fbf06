use crate::stitch::AssembledRoute;

/// A contiguous sub-sequence of the route's points, bounded by estimated
/// drive time (spec §4.E "Chunking"). `end_idx` of one chunk equals
/// `start_idx` of the next — the required one-point overlap at boundaries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chunk {
    pub start_idx: usize,
    pub end_idx: usize,
    pub length_m: f64,
    pub duration_s: f64,
}

/// Splits `route` into chunks whose estimated drive time never exceeds
/// `target_duration_s`, never breaking mid-edge in the sense that every
/// boundary falls on an existing route point rather than an interpolated
/// one. A single point-to-point hop longer than the target still gets its
/// own chunk (the target is a ceiling to respect, not a hard cap to enforce
/// by splitting geometry).
#[must_use]
pub fn chunk_route(route: &AssembledRoute, target_duration_s: u32) -> Vec<Chunk> {
    let target = f64::from(target_duration_s);
    let n = route.points.len();
    if n < 2 {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;
    let mut duration_acc = 0.0;
    let mut length_acc = 0.0;

    for i in 0..route.durations_s.len() {
        let seg_duration = route.durations_s[i];
        let seg_length = haversine_segment(route, i);

        if duration_acc > 0.0 && duration_acc + seg_duration > target {
            chunks.push(Chunk {
                start_idx: start,
                end_idx: i,
                length_m: length_acc,
                duration_s: duration_acc,
            });
            start = i;
            duration_acc = 0.0;
            length_acc = 0.0;
        }

        duration_acc += seg_duration;
        length_acc += seg_length;
    }

    chunks.push(Chunk {
        start_idx: start,
        end_idx: n - 1,
        length_m: length_acc,
        duration_s: duration_acc,
    });
    chunks
}

fn haversine_segment(route: &AssembledRoute, i: usize) -> f64 {
    routesweep_geom::haversine(route.points[i], route.points[i + 1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gap::GapSummary;
    use routesweep_geom::Point;

    fn route_with_durations(durations_s: Vec<f64>) -> AssembledRoute {
        let points: Vec<Point> = (0..=durations_s.len())
            .map(|i| Point::new(f64::from(i32::try_from(i).unwrap()) * 0.001, 0.0))
            .collect();
        AssembledRoute {
            points,
            durations_s,
            length_m: 0.0,
            oracle_calls_real: 0,
            oracle_calls_synthetic: 0,
            gap_summary: GapSummary::default(),
            violations: 0,
            continuity_valid: true,
        }
    }

    #[test]
    fn single_chunk_when_under_target() {
        let route = route_with_durations(vec![100.0, 100.0, 100.0]);
        let chunks = chunk_route(&route, 3600);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].start_idx, 0);
        assert_eq!(chunks[0].end_idx, 3);
    }

    #[test]
    fn splits_when_target_exceeded_and_boundaries_overlap() {
        // Three segments of 1800s each; target 3000s should split after the
        // second segment (3600 > 3000), not the first (1800 <= 3000).
        let route = route_with_durations(vec![1800.0, 1800.0, 1800.0]);
        let chunks = chunk_route(&route, 3000);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].end_idx, chunks[1].start_idx);
        assert_eq!(chunks[0].start_idx, 0);
        assert_eq!(chunks.last().unwrap().end_idx, route.points.len() - 1);
    }

    #[test]
    fn oversized_single_segment_gets_its_own_chunk() {
        let route = route_with_durations(vec![100.0, 5000.0, 100.0]);
        let chunks = chunk_route(&route, 3600);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1].duration_s, 5000.0);
    }

    #[test]
    fn empty_route_yields_no_chunks() {
        let route = route_with_durations(vec![]);
        assert!(chunk_route(&route, 3600).is_empty());
    }
}
