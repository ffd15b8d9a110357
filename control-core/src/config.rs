//! The single persisted configuration scalar: the switch-power auto-off delay.

/// Default auto-off delay applied when no valid value is persisted (5 min).
pub const DEFAULT_DELAY_MS: u32 = 300_000;

/// Largest programmable delay (20 min).
pub const MAX_DELAY_MS: u32 = 1_200_000;

/// Programming granularity: one pushbutton press adds one minute.
pub const DELAY_STEP_MS: u32 = 60_000;

/// Upper clamp for programmed minute counts.
pub const MAX_DELAY_MINUTES: u8 = 20;

/// Validated auto-off delay. The domain is {0, 60 000, …, 1 200 000} ms;
/// zero disables switch-activated power entirely while the ignition is off.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DelaySetting(u32);

impl DelaySetting {
    pub const DEFAULT: Self = Self(DEFAULT_DELAY_MS);

    /// Builds a setting from a programmed minute count, clamping to
    /// [`MAX_DELAY_MINUTES`]. Clamping is silent; programming never fails.
    pub const fn from_minutes(minutes: u8) -> Self {
        let minutes = if minutes > MAX_DELAY_MINUTES {
            MAX_DELAY_MINUTES
        } else {
            minutes
        };
        Self(minutes as u32 * DELAY_STEP_MS)
    }

    /// Validates a raw persisted word. Erased or corrupted storage (for
    /// example 0xFFFF_FFFF from a blank page) falls back to the default
    /// rather than producing a multi-day timeout.
    pub const fn sanitize(raw: u32) -> Self {
        if raw <= MAX_DELAY_MS && raw % DELAY_STEP_MS == 0 {
            Self(raw)
        } else {
            Self::DEFAULT
        }
    }

    pub const fn as_ms(self) -> u32 {
        self.0
    }

    pub const fn minutes(self) -> u8 {
        (self.0 / DELAY_STEP_MS) as u8
    }

    /// A zero delay locks out switch-activated power while the vehicle is off.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Default for DelaySetting {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minutes_round_trip_and_clamp() {
        assert_eq!(DelaySetting::from_minutes(7).as_ms(), 420_000);
        assert_eq!(DelaySetting::from_minutes(7).minutes(), 7);
        assert_eq!(DelaySetting::from_minutes(0).as_ms(), 0);
        assert_eq!(DelaySetting::from_minutes(200).as_ms(), MAX_DELAY_MS);
    }

    #[test]
    fn sanitize_accepts_domain_values() {
        assert_eq!(DelaySetting::sanitize(0).as_ms(), 0);
        assert_eq!(DelaySetting::sanitize(420_000).as_ms(), 420_000);
        assert_eq!(DelaySetting::sanitize(MAX_DELAY_MS).as_ms(), MAX_DELAY_MS);
    }

    #[test]
    fn sanitize_rejects_out_of_domain_values() {
        assert_eq!(DelaySetting::sanitize(u32::MAX), DelaySetting::DEFAULT);
        assert_eq!(DelaySetting::sanitize(59_999), DelaySetting::DEFAULT);
        assert_eq!(
            DelaySetting::sanitize(MAX_DELAY_MS + DELAY_STEP_MS),
            DelaySetting::DEFAULT
        );
    }
}
