//! Lotus growth model: total practice minutes → visual state.
//!
//! Every renderer (SVG, canvas, 3D scene) derives its parameters from the
//! same [`GrowthState`], so they stay visually consistent by construction.
//! The function is pure and total: no clock, no randomness, no caching.
//! Breathing animation is applied by consumers on their own clock; this
//! model only supplies the amplitude and pulse cadence.

use serde::Serialize;

use crate::constants::{
    GROWTH_CAP_MINUTES, LAYER_WINDOWS, PHASE_THRESHOLDS, PRESENCE_BREATH_AMPLITUDE,
    PRESENCE_PULSE_INTERVAL_SECS,
};

/// Visual and behavioral state of the lotus for a given lifetime total.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthState {
    /// Index into [`PHASE_THRESHOLDS`]: highest threshold ≤ the clamped input.
    pub phase: usize,
    /// Fraction in [0,1] of progress through the current phase's span.
    pub phase_progress: f64,
    /// True iff the clamped input equals the cap.
    pub cap_reached: bool,
    /// Primary size/complexity driver, eased so early minutes are visible.
    pub overall_growth: f64,
    /// Structural refinement: petal shape detail, stem firmness.
    pub geometric_maturity: f64,
    /// Color saturation / luminance driver. Floored above zero so the very
    /// first session already shows color.
    pub vividness: f64,
    /// Openness of the four concentric petal layers, innermost first.
    pub layer_openness: [f64; 4],
    pub petal_size: f64,
    pub petal_thickness: f64,
    /// Mean openness across layers; drives the silhouette as a whole.
    pub bloom_openness: f64,
    pub glow_intensity: f64,
    pub particle_count: u32,
    pub particle_speed: f64,
    /// Breathing scale oscillation amplitude (applied by the renderer).
    pub breath_amplitude: f64,
    /// Seconds per glow pulse.
    pub pulse_interval_secs: f64,
}

/// Cubic Hermite smoothstep: 0 at `edge0`, 1 at `edge1`, smooth in between.
/// `x` outside the window clamps to the nearest edge.
pub fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Derive the lotus state from lifetime meditation minutes.
///
/// Input is clamped to `[0, GROWTH_CAP_MINUTES]`; NaN and negative values
/// clamp to 0 rather than erroring, so a renderer fed a bad value degrades
/// to the seed state instead of crashing mid-frame. Cheap enough to call
/// every animation frame.
pub fn compute_growth_state(total_minutes: f64) -> GrowthState {
    let minutes = if total_minutes.is_nan() {
        0.0
    } else {
        total_minutes.clamp(0.0, GROWTH_CAP_MINUTES)
    };
    let progress = minutes / GROWTH_CAP_MINUTES;
    let cap_reached = minutes >= GROWTH_CAP_MINUTES;

    let (phase, phase_progress) = select_phase(minutes);

    // Three distinct curves. The exponent pre-warp (<1) front-loads visible
    // change; the differing windows keep the curves from collapsing into one.
    let overall_growth = smoothstep(0.0, 1.0, progress.powf(0.70));
    let geometric_maturity = smoothstep(0.0, 0.92, progress.powf(0.85));
    let vividness = 0.18 + 0.82 * smoothstep(0.0, 0.75, progress.powf(0.55));

    let mut layer_openness = [0.0; 4];
    for (i, (open_at, full_at)) in LAYER_WINDOWS.iter().enumerate() {
        layer_openness[i] = smoothstep(*open_at, *full_at, progress);
    }
    let bloom_openness = layer_openness.iter().sum::<f64>() / layer_openness.len() as f64;

    let (breath_amplitude, pulse_interval_secs) = if cap_reached {
        // Presence mode: the bloom stops striving and settles. Deliberately
        // a discrete switch at the cap, not a continuation of the curves.
        (PRESENCE_BREATH_AMPLITUDE, PRESENCE_PULSE_INTERVAL_SECS)
    } else {
        (0.04 + 0.04 * overall_growth, 4.0 + 2.0 * overall_growth)
    };

    GrowthState {
        phase,
        phase_progress,
        cap_reached,
        overall_growth,
        geometric_maturity,
        vividness,
        layer_openness,
        petal_size: 0.30 + 0.70 * overall_growth,
        petal_thickness: 0.35 + 0.65 * geometric_maturity,
        bloom_openness,
        glow_intensity: vividness * (0.6 + 0.4 * overall_growth),
        particle_count: (2.0 + 22.0 * overall_growth).round() as u32,
        particle_speed: 0.15 + 0.45 * overall_growth,
        breath_amplitude,
        pulse_interval_secs,
    }
}

/// Highest threshold ≤ `minutes`, plus linear progress toward the next
/// threshold (or the cap, for the last phase).
fn select_phase(minutes: f64) -> (usize, f64) {
    let mut phase = 0;
    for (i, threshold) in PHASE_THRESHOLDS.iter().enumerate() {
        if minutes >= *threshold {
            phase = i;
        } else {
            break;
        }
    }

    let lower = PHASE_THRESHOLDS[phase];
    let upper = if phase + 1 < PHASE_THRESHOLDS.len() {
        PHASE_THRESHOLDS[phase + 1]
    } else {
        GROWTH_CAP_MINUTES
    };
    let phase_progress = ((minutes - lower) / (upper - lower)).clamp(0.0, 1.0);

    (phase, phase_progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_seed_state_at_zero() {
        let s = compute_growth_state(0.0);
        assert_eq!(s.phase, 0);
        assert_eq!(s.phase_progress, 0.0);
        assert!(!s.cap_reached);
        assert_eq!(s.overall_growth, 0.0);
        assert_eq!(s.layer_openness, [0.0; 4]);
        // Vividness floor: the seed is dim but not invisible
        assert!(s.vividness > 0.0 && s.vividness < 0.25, "vividness {}", s.vividness);
    }

    #[test]
    fn test_full_bloom_at_cap() {
        let s = compute_growth_state(GROWTH_CAP_MINUTES);
        assert!(s.cap_reached);
        assert_eq!(s.phase, PHASE_THRESHOLDS.len() - 1);
        assert_relative_eq!(s.overall_growth, 1.0);
        assert_relative_eq!(s.geometric_maturity, 1.0);
        assert_relative_eq!(s.vividness, 1.0);
        assert_relative_eq!(s.bloom_openness, 1.0);
        for layer in s.layer_openness {
            assert_relative_eq!(layer, 1.0);
        }
    }

    #[test]
    fn test_clamps_above_cap() {
        let at_cap = compute_growth_state(GROWTH_CAP_MINUTES);
        let above = compute_growth_state(GROWTH_CAP_MINUTES + 12345.0);
        assert_eq!(at_cap, above, "inputs above the cap must collapse to the cap state");
    }

    #[test]
    fn test_negative_and_nan_clamp_to_zero() {
        let zero = compute_growth_state(0.0);
        assert_eq!(compute_growth_state(-50.0), zero);
        assert_eq!(compute_growth_state(f64::NAN), zero);
        assert_eq!(compute_growth_state(f64::NEG_INFINITY), zero);
    }

    #[test]
    fn test_deterministic() {
        let a = compute_growth_state(1234.5);
        let b = compute_growth_state(1234.5);
        assert_eq!(a, b);
    }

    #[test]
    fn test_phase_table_coverage() {
        assert_eq!(compute_growth_state(0.0).phase, 0);
        assert_eq!(compute_growth_state(14.0).phase, 0);
        assert_eq!(compute_growth_state(15.0).phase, 1);
        assert_eq!(compute_growth_state(19999.0).phase, 24);
        assert!(!compute_growth_state(19999.0).cap_reached);
        assert!(compute_growth_state(20000.0).cap_reached);
    }

    #[test]
    fn test_phase_progress_interpolates() {
        // Phase 1 spans [15, 45]; 30 is its midpoint
        let s = compute_growth_state(30.0);
        assert_eq!(s.phase, 1);
        assert_relative_eq!(s.phase_progress, 0.5);

        // Last phase spans [17500, 20000]
        let s = compute_growth_state(18750.0);
        assert_eq!(s.phase, 24);
        assert_relative_eq!(s.phase_progress, 0.5);
    }

    #[test]
    fn test_layers_open_inner_first() {
        // At 35% progress: layer 0 nearly open, layer 3 barely started
        let s = compute_growth_state(0.35 * GROWTH_CAP_MINUTES);
        assert!(s.layer_openness[0] > 0.9, "inner layer should be nearly open");
        assert!(s.layer_openness[3] < 0.05, "outer layer should be nearly closed");
        for i in 0..3 {
            assert!(
                s.layer_openness[i] >= s.layer_openness[i + 1],
                "layer {i} lags layer {}: {:?}",
                i + 1,
                s.layer_openness
            );
        }
    }

    #[test]
    fn test_presence_mode_switch() {
        let before = compute_growth_state(GROWTH_CAP_MINUTES - 1.0);
        let at = compute_growth_state(GROWTH_CAP_MINUTES);
        // Calmer breathing, longer pulse — discontinuous at the boundary
        assert!(at.breath_amplitude < before.breath_amplitude);
        assert!(at.pulse_interval_secs > before.pulse_interval_secs);
        assert_relative_eq!(at.breath_amplitude, 0.025);
        assert_relative_eq!(at.pulse_interval_secs, 10.0);
    }

    #[test]
    fn test_curves_are_distinct() {
        // The three scalars must not collapse into one curve
        let s = compute_growth_state(0.25 * GROWTH_CAP_MINUTES);
        assert!((s.overall_growth - s.geometric_maturity).abs() > 1e-3);
        assert!((s.overall_growth - s.vividness).abs() > 1e-3);
        assert!((s.geometric_maturity - s.vividness).abs() > 1e-3);
    }

    #[test]
    fn test_smoothstep_edges() {
        assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 0.0), 0.0);
        assert_relative_eq!(smoothstep(0.0, 1.0, 0.5), 0.5);
        assert_eq!(smoothstep(0.0, 1.0, 1.0), 1.0);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
        // Shifted window
        assert_eq!(smoothstep(0.2, 0.8, 0.1), 0.0);
        assert_relative_eq!(smoothstep(0.2, 0.8, 0.5), 0.5);
        assert_eq!(smoothstep(0.2, 0.8, 0.9), 1.0);
    }

    #[test]
    fn test_threshold_table_shape() {
        assert_eq!(PHASE_THRESHOLDS.len(), 25);
        assert_eq!(PHASE_THRESHOLDS[0], 0.0);
        for w in PHASE_THRESHOLDS.windows(2) {
            assert!(w[0] < w[1], "thresholds must be strictly ascending: {w:?}");
        }
        assert!(PHASE_THRESHOLDS[24] < GROWTH_CAP_MINUTES);
        // Early spacing rewards new practice: first gap well under the last
        let first_gap = PHASE_THRESHOLDS[1] - PHASE_THRESHOLDS[0];
        let last_gap = PHASE_THRESHOLDS[24] - PHASE_THRESHOLDS[23];
        assert!(first_gap * 10.0 < last_gap);
    }

    #[test]
    fn test_derived_scalars_in_range() {
        for minutes in [0.0, 10.0, 100.0, 1000.0, 5000.0, 12000.0, 20000.0] {
            let s = compute_growth_state(minutes);
            assert!((0.0..=1.0).contains(&s.overall_growth));
            assert!((0.0..=1.0).contains(&s.geometric_maturity));
            assert!((0.0..=1.0).contains(&s.vividness));
            assert!((0.3..=1.0).contains(&s.petal_size));
            assert!((0.35..=1.0).contains(&s.petal_thickness));
            assert!((0.0..=1.0).contains(&s.bloom_openness));
            assert!((0.0..=1.0).contains(&s.glow_intensity));
            assert!(s.particle_count >= 2 && s.particle_count <= 24);
            assert!(s.breath_amplitude > 0.0);
            assert!(s.pulse_interval_secs >= 4.0);
        }
    }
}
