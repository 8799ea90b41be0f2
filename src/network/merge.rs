//! Joins the parts of multi-part route features into continuous lines.

use geo::{Coord, LineString, MultiLineString};

/// Geometry of a route feature after its parts have been joined
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentShape {
    /// A single continuous line
    Continuous(LineString<f64>),
    /// Parts that do not share endpoints; unusable for measuring
    Fragmented(MultiLineString<f64>),
    /// No part with at least two coordinates
    Empty,
}

impl SegmentShape {
    pub fn line(&self) -> Option<&LineString<f64>> {
        match self {
            SegmentShape::Continuous(line) => Some(line),
            _ => None,
        }
    }
}

/// Merge the parts of a multi-line into one line where they share endpoints.
///
/// Parts are chained greedily starting from the first one, reversing a part
/// when it connects end-to-end or start-to-start.
pub fn merge_parts(geometry: &MultiLineString<f64>) -> SegmentShape {
    let parts: Vec<Vec<Coord<f64>>> = geometry
        .0
        .iter()
        .map(|line| line.0.clone())
        .filter(|coords| coords.len() >= 2)
        .collect();

    let chains = chain_parts(parts);

    match chains.len() {
        0 => SegmentShape::Empty,
        1 => {
            let mut chains = chains;
            let coords = chains.remove(0);
            SegmentShape::Continuous(LineString::new(coords))
        }
        _ => SegmentShape::Fragmented(MultiLineString::new(
            chains.into_iter().map(LineString::new).collect(),
        )),
    }
}

/// Chain coordinate runs that share endpoints
fn chain_parts(parts: Vec<Vec<Coord<f64>>>) -> Vec<Vec<Coord<f64>>> {
    let mut result = Vec::new();
    let mut remaining = parts;

    while !remaining.is_empty() {
        let mut current = remaining.remove(0);

        let mut merged = true;
        while merged && !remaining.is_empty() {
            merged = false;

            let current_start = current.first().copied();
            let current_end = current.last().copied();

            for i in 0..remaining.len() {
                let part_start = remaining[i].first().copied();
                let part_end = remaining[i].last().copied();

                if current_end == part_start {
                    let mut part = remaining.remove(i);
                    part.remove(0);
                    current.extend(part);
                    merged = true;
                    break;
                } else if current_end == part_end {
                    let mut part = remaining.remove(i);
                    part.reverse();
                    part.remove(0);
                    current.extend(part);
                    merged = true;
                    break;
                } else if current_start == part_end {
                    let mut part = remaining.remove(i);
                    part.pop();
                    part.extend(current);
                    current = part;
                    merged = true;
                    break;
                } else if current_start == part_start {
                    let mut part = remaining.remove(i);
                    part.reverse();
                    part.pop();
                    part.extend(current);
                    current = part;
                    merged = true;
                    break;
                }
            }
        }

        result.push(current);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::line_string;

    fn multi(parts: Vec<LineString<f64>>) -> MultiLineString<f64> {
        MultiLineString::new(parts)
    }

    #[test]
    fn test_single_part_is_continuous() {
        let line = line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)];
        let shape = merge_parts(&multi(vec![line.clone()]));
        assert_eq!(shape, SegmentShape::Continuous(line));
    }

    #[test]
    fn test_merge_touching_parts() {
        let a = line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)];
        let b = line_string![(x: 10.0, y: 0.0), (x: 20.0, y: 0.0)];
        let shape = merge_parts(&multi(vec![a, b]));
        let line = shape.line().expect("merged line");
        assert_eq!(line.0.len(), 3);
        assert_eq!(line.0[2], Coord { x: 20.0, y: 0.0 });
    }

    #[test]
    fn test_merge_disordered_parts() {
        let a = line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)];
        let b = line_string![(x: 10.0, y: 0.0), (x: 20.0, y: 0.0)];
        let c = line_string![(x: 20.0, y: 0.0), (x: 30.0, y: 0.0)];
        let shape = merge_parts(&multi(vec![c, a, b]));
        let line = shape.line().expect("merged line");
        assert_eq!(line.0.len(), 4);
        assert_eq!(line.0[0], Coord { x: 0.0, y: 0.0 });
        assert_eq!(line.0[3], Coord { x: 30.0, y: 0.0 });
    }

    #[test]
    fn test_merge_reversed_part() {
        let a = line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)];
        let b = line_string![(x: 20.0, y: 0.0), (x: 10.0, y: 0.0)];
        let shape = merge_parts(&multi(vec![a, b]));
        let line = shape.line().expect("merged line");
        assert_eq!(line.0.last(), Some(&Coord { x: 20.0, y: 0.0 }));
    }

    #[test]
    fn test_gap_stays_fragmented() {
        let a = line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)];
        let b = line_string![(x: 50.0, y: 0.0), (x: 60.0, y: 0.0)];
        match merge_parts(&multi(vec![a, b])) {
            SegmentShape::Fragmented(parts) => assert_eq!(parts.0.len(), 2),
            other => panic!("expected fragmented shape, got {:?}", other),
        }
    }

    #[test]
    fn test_degenerate_parts_are_dropped() {
        let point_like = LineString::new(vec![Coord { x: 1.0, y: 1.0 }]);
        assert_eq!(merge_parts(&multi(vec![point_like])), SegmentShape::Empty);
        assert_eq!(merge_parts(&multi(vec![])), SegmentShape::Empty);
    }
}
