//! Greedy, order-dependent point clustering.
//!
//! Purpose
//! - Group lon/lat points whose great-circle distance to a group anchor is
//!   within a threshold (metres).
//!
//! Behaviour
//! - Single pass over the input. Each point joins the first existing group
//!   (in creation order) that accepts it, otherwise it opens a new group.
//!   Membership is never revisited, so the result depends on input order.
//! - `group_by_distance` anchors a group at its first member;
//!   `group_by_centroid_distance` at the centroid of all members so far.
//! - Both are O(n·g) for n points and g groups.
//!
//! Code cross-refs: `bridge::create_point`, `geo::Geodesic`

use geo::algorithm::line_measures::metric_spaces::Geodesic;
use geo::algorithm::line_measures::Distance;
use geo::{Centroid, MultiPoint, Point};
use tracing::debug;

/// Geodesic (WGS-84) distance in metres between two lon/lat points.
#[inline]
pub fn distance(p1: Point, p2: Point) -> f64 {
    Geodesic.distance(p1, p2)
}

/// Cluster around each group's first point.
pub fn group_by_distance(points: &[Point], max_distance: f64) -> Vec<MultiPoint> {
    greedy(points, max_distance, |group| group.0.first().copied())
}

/// Cluster around each group's running centroid.
pub fn group_by_centroid_distance(points: &[Point], max_distance: f64) -> Vec<MultiPoint> {
    greedy(points, max_distance, |group| group.centroid())
}

fn greedy<F>(points: &[Point], max_distance: f64, anchor: F) -> Vec<MultiPoint>
where
    F: Fn(&MultiPoint) -> Option<Point>,
{
    let mut groups: Vec<MultiPoint> = Vec::new();
    for &p in points {
        let home = groups.iter().position(|g| {
            anchor(g).is_some_and(|a| distance(a, p) <= max_distance)
        });
        match home {
            Some(i) => groups[i].0.push(p),
            None => groups.push(MultiPoint::new(vec![p])),
        }
    }
    debug!(points = points.len(), groups = groups.len(), "clustered");
    groups
}
