use std::borrow::Cow;
use std::time::Duration;

/// Engine tuning values with their documented defaults.
///
/// These are policy constants, genuinely tunable per deployment region
/// (urban GPS canyons want a looser accuracy limit, motorway-heavy regions a
/// larger glitch bound), so they live here rather than at the call sites.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Fixes reporting a horizontal accuracy above this many metres are
    /// discarded entirely.
    pub accuracy_limit_m: f64,
    /// Inter-fix distance deltas above this many kilometres are treated as
    /// GPS glitches and excluded from accumulation.
    pub max_delta_km: f64,
    /// Speeds at or below this many km/h classify the vehicle as still.
    pub still_speed_kmh: f64,
    /// Continuous stillness required before the dwell condition holds.
    pub dwell: Duration,
    /// Pickup fires only within this many metres of the session's first fix.
    pub start_radius_m: f64,
    /// Minimum kilometres travelled since pickup before drop-off can fire.
    pub min_travel_km: f64,
    /// Raw speed readings above this value are assumed to already be km/h
    /// rather than m/s. See [`crate::motion::speed_kmh`].
    pub speed_kmh_cutoff: f64,
    /// IANA timezone used to format event times into trip record fields.
    pub timezone: Cow<'static, str>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            accuracy_limit_m: 100.0,
            max_delta_km: 1.0,
            still_speed_kmh: 15.0,
            dwell: Duration::from_secs(10),
            start_radius_m: 50.0,
            min_travel_km: 0.5,
            speed_kmh_cutoff: 60.0,
            timezone: Cow::Borrowed("Europe/Rome"),
        }
    }
}
