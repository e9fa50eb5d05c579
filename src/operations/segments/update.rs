use crate::error::{GeometryError, Result, RoadspineError};
use crate::operations::decompose::{DecomposeSpline, GeometryParams};
use crate::topology::{RoadNetwork, SplineId};

use super::rebreak_spline;

/// Recomputes a spline's geometry from its control points and re-cuts it
/// onto every road segment the spline owns.
///
/// Geometry is replaced wholesale; road lengths follow their windows.
#[derive(Debug)]
pub struct UpdateSplineGeometry {
    spline: SplineId,
    params: GeometryParams,
}

impl UpdateSplineGeometry {
    /// Creates a new `UpdateSplineGeometry` operation.
    #[must_use]
    pub fn new(spline: SplineId) -> Self {
        Self {
            spline,
            params: GeometryParams::default(),
        }
    }

    /// Sets custom fitting parameters.
    #[must_use]
    pub fn with_params(mut self, params: GeometryParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the update. Returns `false` when the spline has fewer than
    /// two control points; that case is logged and leaves the network
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the spline or one of its roads is missing, or if
    /// decomposition fails for a reason other than too few control points.
    pub fn execute(&self, network: &mut RoadNetwork) -> Result<bool> {
        let spline = network.spline(self.spline)?;
        let decomposed = DecomposeSpline::from_spline(spline)
            .with_params(self.params)
            .execute();
        let geometries = match decomposed {
            Ok(geometries) => geometries,
            Err(RoadspineError::Geometry(GeometryError::InvalidSpline { count })) => {
                tracing::warn!(spline = ?self.spline, count, "spline has too few control points, geometry not rebuilt");
                return Ok(false);
            }
            Err(err) => return Err(err),
        };

        network.spline_mut(self.spline)?.geometries = geometries;
        rebreak_spline(network, self.spline)?;
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{total_length, ControlPoint, SplineKind};
    use crate::topology::{NetworkEvent, SegmentRef, SplineData};
    use approx::assert_abs_diff_eq;

    fn straight(points: &[f64]) -> Vec<ControlPoint> {
        points
            .iter()
            .map(|x| ControlPoint::new(*x, 0.0, 0.0, 0.0))
            .collect()
    }

    #[test]
    fn roads_receive_their_windows() {
        let mut network = RoadNetwork::new();
        let first = network.create_road(0.0);
        let second = network.create_road(0.0);
        let mut spline = SplineData::new(SplineKind::AutoFit, straight(&[0.0, 60.0, 100.0]));
        spline.segments.insert(0.0, SegmentRef::Road(first)).unwrap();
        spline.segments.insert(35.0, SegmentRef::Road(second)).unwrap();
        let id = network.add_spline(spline);
        network.drain_events();

        assert!(UpdateSplineGeometry::new(id).execute(&mut network).unwrap());

        let a = network.road(first).unwrap();
        let b = network.road(second).unwrap();
        assert_abs_diff_eq!(a.length, 35.0, epsilon = 1e-9);
        assert_abs_diff_eq!(b.length, 65.0, epsilon = 1e-9);
        assert_abs_diff_eq!(b.geometries[0].x, 35.0, epsilon = 1e-9);
        assert_abs_diff_eq!(total_length(&b.geometries), b.length, epsilon = 1e-12);
        assert_eq!(
            network.drain_events(),
            vec![
                NetworkEvent::GeometryChanged(first),
                NetworkEvent::GeometryChanged(second)
            ]
        );
    }

    #[test]
    fn too_few_points_is_a_no_op() {
        // RUST_LOG=warn shows the skipped rebuild.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
        let mut network = RoadNetwork::new();
        let road = network.create_road(12.0);
        let mut spline = SplineData::new(SplineKind::AutoFit, straight(&[0.0]));
        spline.segments.insert(0.0, SegmentRef::Road(road)).unwrap();
        let id = network.add_spline(spline);

        assert!(!UpdateSplineGeometry::new(id).execute(&mut network).unwrap());
        assert_abs_diff_eq!(network.road(road).unwrap().length, 12.0);
        assert!(network.spline(id).unwrap().geometries.is_empty());
    }

    #[test]
    fn rerun_is_bit_identical() {
        let mut network = RoadNetwork::new();
        let road = network.create_road(0.0);
        let mut spline = SplineData::new(
            SplineKind::AutoFit,
            vec![
                ControlPoint::new(0.0, 0.0, 0.0, 0.0),
                ControlPoint::new(50.0, 20.0, 0.0, 0.8),
            ],
        );
        spline.segments.insert(0.0, SegmentRef::Road(road)).unwrap();
        let id = network.add_spline(spline);

        UpdateSplineGeometry::new(id).execute(&mut network).unwrap();
        let before = network.road(road).unwrap().geometries.clone();
        UpdateSplineGeometry::new(id).execute(&mut network).unwrap();
        assert_eq!(network.road(road).unwrap().geometries, before);
    }
}
