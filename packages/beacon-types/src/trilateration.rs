//! trilateration.rs — closed-form three-anchor 2D position solver
//!
//! Given three fixed receiver positions and a range estimate to each (e.g.
//! derived from RSSI), recovers the 2D point consistent with all three range
//! circles by pairwise elimination of the quadratic terms.
//!
//! Standalone capability: nothing on the monitor's request path calls it yet.
//! It is exposed here so gateways or a future API command can solve positions
//! from three gateway readings.

use thiserror::Error;

/// Display scale used by map frontends (pixels per meter).
pub const PX_PER_M: f64 = 24.0;

/// 2D position in the receiver frame (meters).
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Pos2D {
    pub x: f64,
    pub y: f64,
}

/// Degenerate receiver geometry: the elimination step requires `x1 != x2`,
/// `x2 != x3`, and non-colinear anchors. Violations would otherwise divide
/// by zero and leak NaN/∞ into the result.
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("anchors {0} and {1} share an x-coordinate")]
    SharedX(&'static str, &'static str),
    #[error("anchors are colinear or otherwise degenerate")]
    Colinear,
}

/// Solve for the 2D point at ranges `r1`, `r2`, `r3` from anchors `p1`, `p2`,
/// `p3`.
///
/// Subtracting the circle equations pairwise cancels the `x² + y²` terms and
/// leaves two linear equations in `(x, y)`, solved by elimination:
///
/// ```text
/// Di   = ri² − xi² − yi²
/// 2y   = [(D2−D3)/(x3−x2) − (D2−D1)/(x1−x2)]
///        / [(y2−y1)/(x1−x2) − (y2−y3)/(x3−x2)]
/// 2x   = (D2−D1)/(x1−x2) + 2y·(y2−y1)/(x1−x2)
/// ```
pub fn solve(
    r1: f64,
    r2: f64,
    r3: f64,
    p1: Pos2D,
    p2: Pos2D,
    p3: Pos2D,
) -> Result<Pos2D, GeometryError> {
    let d1 = r1 * r1 - p1.x * p1.x - p1.y * p1.y;
    let d2 = r2 * r2 - p2.x * p2.x - p2.y * p2.y;
    let d3 = r3 * r3 - p3.x * p3.x - p3.y * p3.y;

    let dx32 = p3.x - p2.x;
    let dx12 = p1.x - p2.x;
    if dx32 == 0.0 {
        return Err(GeometryError::SharedX("p2", "p3"));
    }
    if dx12 == 0.0 {
        return Err(GeometryError::SharedX("p1", "p2"));
    }

    let denom = (p2.y - p1.y) / dx12 - (p2.y - p3.y) / dx32;
    if denom == 0.0 || !denom.is_finite() {
        return Err(GeometryError::Colinear);
    }

    let two_y = ((d2 - d3) / dx32 - (d2 - d1) / dx12) / denom;
    let two_x = (d2 - d1) / dx12 + two_y * (p2.y - p1.y) / dx12;

    let pos = Pos2D {
        x: two_x / 2.0,
        y: two_y / 2.0,
    };
    if !pos.x.is_finite() || !pos.y.is_finite() {
        return Err(GeometryError::Colinear);
    }
    Ok(pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dist(a: Pos2D, b: Pos2D) -> f64 {
        ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
    }

    #[test]
    fn recovers_exact_point_from_true_ranges() {
        let anchors = (
            Pos2D { x: 0.0, y: 0.0 },
            Pos2D { x: 10.0, y: 0.0 },
            Pos2D { x: 5.0, y: 10.0 },
        );
        let truth = Pos2D { x: 5.0, y: 5.0 };

        let est = solve(
            dist(truth, anchors.0),
            dist(truth, anchors.1),
            dist(truth, anchors.2),
            anchors.0,
            anchors.1,
            anchors.2,
        )
        .unwrap();

        assert!((est.x - truth.x).abs() < 1e-6, "x = {}", est.x);
        assert!((est.y - truth.y).abs() < 1e-6, "y = {}", est.y);
    }

    #[test]
    fn recovers_off_center_point() {
        let p1 = Pos2D { x: -3.0, y: 1.0 };
        let p2 = Pos2D { x: 7.0, y: -2.0 };
        let p3 = Pos2D { x: 2.0, y: 9.0 };
        let truth = Pos2D { x: 1.5, y: 2.5 };

        let est = solve(
            dist(truth, p1),
            dist(truth, p2),
            dist(truth, p3),
            p1,
            p2,
            p3,
        )
        .unwrap();

        assert!((est.x - truth.x).abs() < 1e-6);
        assert!((est.y - truth.y).abs() < 1e-6);
    }

    #[test]
    fn shared_x_between_p2_p3_is_rejected() {
        // p2 and p3 share x = 0 → first elimination denominator is zero
        let err = solve(
            5.0,
            5.0,
            5.0,
            Pos2D { x: 10.0, y: 0.0 },
            Pos2D { x: 0.0, y: 0.0 },
            Pos2D { x: 0.0, y: 5.0 },
        )
        .unwrap_err();
        assert_eq!(err, GeometryError::SharedX("p2", "p3"));
    }

    #[test]
    fn shared_x_between_p1_p2_is_rejected() {
        let err = solve(
            5.0,
            5.0,
            5.0,
            Pos2D { x: 0.0, y: 0.0 },
            Pos2D { x: 0.0, y: 5.0 },
            Pos2D { x: 10.0, y: 0.0 },
        )
        .unwrap_err();
        assert_eq!(err, GeometryError::SharedX("p1", "p2"));
    }

    #[test]
    fn colinear_anchors_are_rejected() {
        // All three anchors on the x-axis → combined denominator is zero
        let err = solve(
            1.0,
            2.0,
            3.0,
            Pos2D { x: 0.0, y: 0.0 },
            Pos2D { x: 5.0, y: 0.0 },
            Pos2D { x: 10.0, y: 0.0 },
        )
        .unwrap_err();
        assert_eq!(err, GeometryError::Colinear);
    }
}
