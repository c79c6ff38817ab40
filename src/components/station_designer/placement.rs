use log::warn;
use rand::Rng;

use super::error::ProjectionError;
use super::types::Position;

/// Side of the square used when no viewport projection is available.
pub const FALLBACK_EXTENT: f64 = 400.0;

/// Maps the visible viewport back into canvas coordinates.
pub trait ViewportProjector {
	/// Canvas coordinate under the centre of the visible viewport.
	fn viewport_center(&self) -> Result<Position, ProjectionError>;
}

/// Where to put a freshly added node.
///
/// Uses the viewport centre when a projector is available and works,
/// otherwise a uniform random point in `[0, FALLBACK_EXTENT)` on both axes.
pub fn compute_position(projector: Option<&dyn ViewportProjector>, rng: &mut impl Rng) -> Position {
	if let Some(projector) = projector {
		match projector.viewport_center() {
			Ok(center) if center.x.is_finite() && center.y.is_finite() => return center,
			Ok(center) => warn!("ignoring non-finite viewport centre {center:?}"),
			Err(e) => warn!("viewport projection failed, placing randomly: {e}"),
		}
	}
	Position::new(
		rng.gen_range(0.0..FALLBACK_EXTENT),
		rng.gen_range(0.0..FALLBACK_EXTENT),
	)
}
