use force_graph::SimulationParameters;
use serde::{Deserialize, Serialize};

/// Force layout tuning, applied when the simulation is rebuilt for a new window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
	/// Rest length of a link.
	pub link_distance: f64,
	/// Negative values repel.
	pub charge_strength: f64,
	/// Nodes further apart than this do not repel each other.
	pub charge_distance_max: f64,
	/// Minimum distance kept between node centres.
	pub collide_radius: f64,
	/// Share of velocity lost per tick.
	pub velocity_decay: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			link_distance: 500.0,
			charge_strength: -250.0,
			charge_distance_max: 2500.0,
			collide_radius: 50.0,
			velocity_decay: 0.2,
		}
	}
}

impl LayoutConfig {
	pub fn simulation_parameters(&self) -> SimulationParameters {
		SimulationParameters {
			force_charge: (-self.charge_strength) as f32,
			force_spring: 0.05,
			force_max: (self.charge_distance_max / 25.0) as f32,
			node_speed: 3000.0,
			damping_factor: (1.0 - self.velocity_decay).clamp(0.0, 1.0) as f32,
		}
	}
}

/// Offset moving `a` so that the a-b distance relaxes towards `distance`.
/// `b` receives the opposite offset.
pub fn link_correction(a: (f64, f64), b: (f64, f64), distance: f64, strength: f64) -> (f64, f64) {
	let (dx, dy) = (b.0 - a.0, b.1 - a.1);
	let len = (dx * dx + dy * dy).sqrt();
	if len < 1e-6 {
		return (0.0, 0.0);
	}
	let k = (len - distance) / len * strength * 0.5;
	(dx * k, dy * k)
}

/// Offset pushing `a` out of `b`'s collision radius, if they overlap.
pub fn collide_correction(a: (f64, f64), b: (f64, f64), radius: f64) -> Option<(f64, f64)> {
	let (dx, dy) = (a.0 - b.0, a.1 - b.1);
	let len = (dx * dx + dy * dy).sqrt();
	let min = radius * 2.0;
	if len >= min {
		return None;
	}
	if len < 1e-6 {
		return Some((radius, 0.0));
	}
	let push = (min - len) / len * 0.5;
	Some((dx * push, dy * push))
}
