//! Hex colour arithmetic used when painting items.

/// Parses `#rgb` or `#rrggbb`.
pub fn parse_hex(color: &str) -> Option<[u8; 3]> {
	let hex = color.strip_prefix('#').unwrap_or(color);
	let expanded: String = match hex.len() {
		3 => hex.chars().flat_map(|c| [c, c]).collect(),
		6 => hex.to_owned(),
		_ => return None,
	};
	let channel = |i: usize| u8::from_str_radix(expanded.get(i..i + 2)?, 16).ok();
	Some([channel(0)?, channel(2)?, channel(4)?])
}

pub fn to_hex([r, g, b]: [u8; 3]) -> String {
	format!("#{r:02x}{g:02x}{b:02x}")
}

/// Moves every channel towards white by `coefficient` (0 keeps, 1 is white).
pub fn lighten(color: &str, coefficient: f64) -> String {
	let Some(rgb) = parse_hex(color) else {
		return color.to_owned();
	};
	let coefficient = coefficient.clamp(0.0, 1.0);
	to_hex(rgb.map(|c| (c as f64 + (255.0 - c as f64) * coefficient).round() as u8))
}

/// Adds `amount` to every channel, clamped to the valid range.
pub fn shade(color: &str, amount: i32) -> String {
	let Some(rgb) = parse_hex(color) else {
		return color.to_owned();
	};
	to_hex(rgb.map(|c| (c as i32 + amount).clamp(0, 255) as u8))
}

pub fn with_alpha(color: &str, alpha: f64) -> String {
	match parse_hex(color) {
		Some([r, g, b]) => format!("rgba({r}, {g}, {b}, {alpha})"),
		None => color.to_owned(),
	}
}

fn luminance(rgb: [u8; 3]) -> f64 {
	let [r, g, b] = rgb.map(|v| {
		let v = v as f64 / 255.0;
		if v <= 0.03928 {
			v / 12.92
		} else {
			((v + 0.055) / 1.055).powf(2.4)
		}
	});
	r * 0.2126 + g * 0.7152 + b * 0.0722
}

fn contrast(a: f64, b: f64) -> f64 {
	(a.max(b) + 0.05) / (a.min(b) + 0.05)
}

/// `"white"` or `"black"`, whichever reads better on `background`.
pub fn font_color(background: &str) -> &'static str {
	let Some(rgb) = parse_hex(background) else {
		return "black";
	};
	let lum = luminance(rgb);
	if contrast(lum, 1.0) > contrast(lum, 0.0) {
		"white"
	} else {
		"black"
	}
}
