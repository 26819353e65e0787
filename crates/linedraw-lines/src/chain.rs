//! Joining segments into polylines.

use std::collections::HashMap;

use linedraw_math::Point3;

use crate::types::{FeatureKind, Polyline, Segment, Visibility};

/// Key for endpoint lookup with tolerance-based hashing.
fn point_key(p: &Point3, tolerance: f64) -> (i64, i64, i64) {
    let scale = 1.0 / tolerance;
    (
        (p.x * scale).round() as i64,
        (p.y * scale).round() as i64,
        (p.z * scale).round() as i64,
    )
}

/// Chain segments into polylines.
///
/// Only segments of the same kind and visibility are joined. Endpoints
/// match when they quantize to the same grid cell of size `tolerance`.
/// Output order follows the first segment of each chain in the input.
pub fn chain_segments(segments: &[Segment], tolerance: f64) -> Vec<Polyline> {
    let mut groups: Vec<((FeatureKind, Visibility), Vec<usize>)> = Vec::new();
    for (i, s) in segments.iter().enumerate() {
        let key = (s.kind, s.visibility);
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(i),
            None => groups.push((key, vec![i])),
        }
    }

    let mut chains: Vec<(usize, Polyline)> = Vec::new();
    for ((kind, visibility), members) in groups {
        let pairs: Vec<(Point3, Point3)> =
            members.iter().map(|&i| (segments[i].p0, segments[i].p1)).collect();
        for (first, points, closed) in chain_points(&pairs, tolerance) {
            chains.push((
                members[first],
                Polyline {
                    kind,
                    visibility,
                    points,
                    closed,
                },
            ));
        }
    }
    chains.sort_by_key(|(first, _)| *first);
    chains.into_iter().map(|(_, line)| line).collect()
}

/// Greedy endpoint matching. Returns `(first segment, points, closed)`.
fn chain_points(segments: &[(Point3, Point3)], tolerance: f64) -> Vec<(usize, Vec<Point3>, bool)> {
    // point_key -> (segment index, matched at end point)
    let mut adjacency: HashMap<(i64, i64, i64), Vec<(usize, bool)>> = HashMap::new();
    for (i, (p0, p1)) in segments.iter().enumerate() {
        adjacency.entry(point_key(p0, tolerance)).or_default().push((i, false));
        adjacency.entry(point_key(p1, tolerance)).or_default().push((i, true));
    }

    let mut used = vec![false; segments.len()];
    let mut polylines = Vec::new();

    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let (p0, p1) = segments[start];
        let mut forward = vec![p0, p1];
        extend(&mut forward, segments, &adjacency, &mut used, tolerance);

        let mut backward = vec![p0];
        extend(&mut backward, segments, &adjacency, &mut used, tolerance);

        // backward runs p0, b1, b2, ...; the chain starts at its far end.
        let mut chain: Vec<Point3> = backward.into_iter().skip(1).rev().collect();
        chain.extend(forward);

        let closed = chain.len() >= 4
            && point_key(&chain[0], tolerance) == point_key(&chain[chain.len() - 1], tolerance);
        if closed {
            chain.pop();
        }
        polylines.push((start, chain, closed));
    }

    polylines
}

/// Follow unused segments from the last point of `chain`.
fn extend(
    chain: &mut Vec<Point3>,
    segments: &[(Point3, Point3)],
    adjacency: &HashMap<(i64, i64, i64), Vec<(usize, bool)>>,
    used: &mut [bool],
    tolerance: f64,
) {
    while let Some(current) = chain.last() {
        let next = adjacency
            .get(&point_key(current, tolerance))
            .and_then(|neighbors| neighbors.iter().find(|(i, _)| !used[*i]))
            .copied();
        let Some((i, is_end)) = next else {
            break;
        };
        used[i] = true;
        let (s0, s1) = segments[i];
        chain.push(if is_end { s0 } else { s1 });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LinePiece, Segment};

    fn seg(kind: FeatureKind, a: (f64, f64), b: (f64, f64)) -> Segment {
        Segment::from_piece(
            LinePiece::visible(Point3::new(a.0, a.1, 0.0), Point3::new(b.0, b.1, 0.0)),
            kind,
            kind.style(false),
        )
    }

    #[test]
    fn test_closed_square() {
        let k = FeatureKind::Contour;
        // Shuffled and partly reversed.
        let segments = [
            seg(k, (1.0, 0.0), (1.0, 1.0)),
            seg(k, (0.0, 1.0), (0.0, 0.0)),
            seg(k, (1.0, 0.0), (0.0, 0.0)),
            seg(k, (1.0, 1.0), (0.0, 1.0)),
        ];
        let lines = chain_segments(&segments, 1e-6);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].closed);
        assert_eq!(lines[0].points.len(), 4);
        assert!((lines[0].length() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_open_chain_from_the_middle() {
        let k = FeatureKind::Ridge;
        let segments = [
            seg(k, (1.0, 0.0), (2.0, 0.0)),
            seg(k, (0.0, 0.0), (1.0, 0.0)),
            seg(k, (2.0, 0.0), (3.0, 0.0)),
        ];
        let lines = chain_segments(&segments, 1e-6);
        assert_eq!(lines.len(), 1);
        assert!(!lines[0].closed);
        let xs: Vec<f64> = lines[0].points.iter().map(|p| p.x).collect();
        assert_eq!(xs, [0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_kinds_are_not_mixed() {
        let segments = [
            seg(FeatureKind::Ridge, (0.0, 0.0), (1.0, 0.0)),
            seg(FeatureKind::Valley, (1.0, 0.0), (2.0, 0.0)),
        ];
        let lines = chain_segments(&segments, 1e-6);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].kind, FeatureKind::Ridge);
        assert_eq!(lines[1].kind, FeatureKind::Valley);
    }

    #[test]
    fn test_tolerance_bridges_small_gaps() {
        let k = FeatureKind::Contour;
        let segments = [
            seg(k, (0.0, 0.0), (1.0, 0.0)),
            seg(k, (1.0 + 1e-9, 0.0), (2.0, 0.0)),
        ];
        assert_eq!(chain_segments(&segments, 1e-6).len(), 1);
        assert_eq!(chain_segments(&segments, 1e-12).len(), 2);
    }

    #[test]
    fn test_empty() {
        assert!(chain_segments(&[], 1e-6).is_empty());
    }
}
