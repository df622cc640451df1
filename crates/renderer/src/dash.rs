//! Flowing-dash colouring for streamlines.
//!
//! Each streamline is drawn as a run of short segments whose grey level
//! cycles with arc length. Shifting every arc length by a constant each
//! frame moves the grey bands along the line, which reads as flow.
//!
//! The grey level of segment `i` is taken from the arc length of segment
//! `n - 1 - i`: levels are assigned in reverse segment order.

use rand::Rng;
use wind_field::{Point, Streamline};

/// Colour cycles per unit arc length.
pub const DEFAULT_DASH_DENSITY: f64 = 1.5;

/// Arc length added to every streamline per frame.
pub const DEFAULT_LENGTH_STEP: f64 = 0.05;

/// An RGB colour with channels in `[0, 1)`.
pub type Rgb = [f64; 3];

/// Grey levels for a set of arc lengths, in reverse order.
///
/// `colors[n - 1 - i]` is the grey `(lengths[i] * density) mod 1`.
pub fn dash_colors(lengths: &[f64], density: f64) -> Vec<Rgb> {
    let mut colors = vec![[0.0; 3]; lengths.len()];
    fill_dash_colors(&mut colors, lengths, density);
    colors
}

fn fill_dash_colors(colors: &mut [Rgb], lengths: &[f64], density: f64) {
    let n = lengths.len();
    for (i, length) in lengths.iter().enumerate() {
        let grey = (length * density).rem_euclid(1.0);
        colors[n - 1 - i] = [grey; 3];
    }
}

/// Per-streamline mutable animation state: arc lengths and their colours.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationState {
    lengths: Vec<f64>,
    colors: Vec<Rgb>,
    dash_density: f64,
}

impl AnimationState {
    pub fn new(lengths: Vec<f64>, dash_density: f64) -> Self {
        let colors = dash_colors(&lengths, dash_density);
        Self {
            lengths,
            colors,
            dash_density,
        }
    }

    /// Shift every arc length by `step` and recolour.
    pub fn advance(&mut self, step: f64) {
        for length in &mut self.lengths {
            *length += step;
        }
        fill_dash_colors(&mut self.colors, &self.lengths, self.dash_density);
    }

    pub fn lengths(&self) -> &[f64] {
        &self.lengths
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn dash_density(&self) -> f64 {
        self.dash_density
    }
}

/// The drawable segments of one streamline together with their animation state.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentSet {
    segments: Vec<[Point; 2]>,
    phase: f64,
    state: AnimationState,
}

impl SegmentSet {
    /// Build segments for `streamline` with a phase drawn uniformly from `[0, 1)`.
    pub fn from_streamline<R: Rng + ?Sized>(
        streamline: &Streamline,
        dash_density: f64,
        rng: &mut R,
    ) -> Self {
        let phase = rng.gen::<f64>();
        Self::with_phase(streamline, dash_density, phase)
    }

    /// Build segments for `streamline` with an explicit phase offset.
    ///
    /// Fewer than two points give an empty set.
    pub fn with_phase(streamline: &Streamline, dash_density: f64, phase: f64) -> Self {
        let segments: Vec<[Point; 2]> = streamline
            .points
            .windows(2)
            .map(|pair| [pair[0], pair[1]])
            .collect();

        let mut total = 0.0;
        let lengths = segments
            .iter()
            .map(|[a, b]| {
                total += a.distance(b);
                total + phase
            })
            .collect();

        Self {
            segments,
            phase,
            state: AnimationState::new(lengths, dash_density),
        }
    }

    pub fn segments(&self) -> &[[Point; 2]] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn lengths(&self) -> &[f64] {
        self.state.lengths()
    }

    pub fn colors(&self) -> &[Rgb] {
        self.state.colors()
    }

    /// Advance the dashes by one frame.
    pub fn advance(&mut self, step: f64) {
        self.state.advance(step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(points: &[(f64, f64)]) -> Streamline {
        Streamline::new(points.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    #[test]
    fn test_dash_colors_reverse_order() {
        let colors = dash_colors(&[0.1, 0.2, 0.5], 1.0);
        assert_eq!(colors[0], [0.5; 3]);
        assert_eq!(colors[1], [0.2; 3]);
        assert_eq!(colors[2], [0.1; 3]);
    }

    #[test]
    fn test_dash_colors_wrap() {
        let colors = dash_colors(&[1.0], 1.5);
        assert!((colors[0][0] - 0.5).abs() < 1e-12);
        assert!(dash_colors(&[], 1.5).is_empty());
    }

    #[test]
    fn test_single_point_is_empty() {
        let set = SegmentSet::with_phase(&line(&[(1.0, 1.0)]), 1.5, 0.3);
        assert!(set.is_empty());
        assert!(set.lengths().is_empty());
        assert!(set.colors().is_empty());
    }

    #[test]
    fn test_empty_streamline_is_empty() {
        let set = SegmentSet::with_phase(&Streamline::default(), 1.5, 0.3);
        assert!(set.is_empty());
    }

    #[test]
    fn test_lengths_include_phase() {
        let set = SegmentSet::with_phase(&line(&[(0.0, 0.0), (3.0, 4.0), (3.0, 5.0)]), 1.5, 0.25);
        assert_eq!(set.lengths(), &[5.25, 6.25]);
    }

    #[test]
    fn test_advance_on_empty_set_is_noop() {
        let mut set = SegmentSet::with_phase(&Streamline::default(), 1.5, 0.0);
        set.advance(0.05);
        assert!(set.is_empty());
    }
}
