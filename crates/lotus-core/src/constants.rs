/// Lifetime practice minutes at which the lotus reaches full bloom.
pub const GROWTH_CAP_MINUTES: f64 = 20000.0;

/// Phase thresholds in total minutes, ascending. Spacing is denser near
/// zero so the first weeks of practice move through phases quickly, then
/// widens toward the cap. The last phase runs from its threshold to the cap.
pub const PHASE_THRESHOLDS: [f64; 25] = [
    0.0, 15.0, 45.0, 90.0, 150.0, 225.0, 320.0, 440.0, 590.0, 775.0, 1000.0, 1275.0, 1600.0,
    2000.0, 2500.0, 3100.0, 3800.0, 4600.0, 5500.0, 6550.0, 7750.0, 9100.0, 11000.0, 14000.0,
    17500.0,
];

/// Per-layer smoothstep windows over overall progress, innermost first.
/// Windows overlap: each layer starts opening before the previous one
/// saturates, so the bloom unfolds from the center outward.
pub const LAYER_WINDOWS: [(f64, f64); 4] = [(0.0, 0.4), (0.1, 0.6), (0.2, 0.8), (0.3, 1.0)];

/// Maximum number of saved rituals per user.
pub const MAX_RITUALS: usize = 5;

/// Breathing amplitude once the cap is reached (presence mode).
pub const PRESENCE_BREATH_AMPLITUDE: f64 = 0.025;

/// Pulse interval in seconds once the cap is reached (presence mode).
pub const PRESENCE_PULSE_INTERVAL_SECS: f64 = 10.0;
