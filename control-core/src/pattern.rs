//! LED animation primitives and the pattern engine.
//!
//! Duty cycles are pure functions of a pattern and a phase counter; the
//! [`LedEngine`] owns the phase counters, advances them once per tick, and
//! writes duties through the hardware trait only when a value changes.

use crate::channel::{AuxOutput, LED_COUNT, LedId};
use crate::hal::Hardware;

/// 64 stored samples covering one quarter-period of a sine wave centered at
/// 128 with ±127 amplitude.
const QUARTER_SINE: [u8; 64] = [
    128, 131, 134, 137, 140, 143, 146, 149, 152, 155, 158, 162, 165, 167, 170, 173, 176, 179, 182,
    185, 188, 190, 193, 196, 198, 201, 203, 206, 208, 211, 213, 215, 218, 220, 222, 224, 226, 228,
    230, 232, 234, 235, 237, 238, 240, 241, 243, 244, 245, 246, 248, 249, 250, 250, 251, 252, 253,
    253, 254, 254, 254, 255, 255, 255,
];

/// Full-cycle sine value for an 8-bit angle, offset at 128.
pub const fn sine(angle: u8) -> u8 {
    let quadrant = angle >> 6;
    let mut index = angle & 0x3F;
    if quadrant & 0x01 != 0 {
        index = 63 - index;
    }
    let value = QUARTER_SINE[index as usize];
    if quadrant & 0x02 != 0 {
        255 - value
    } else {
        value
    }
}

/// Rising-half sine with the offset removed: values below the midline clamp
/// to zero, values above rescale to the full 0–255 range. Produces the
/// sharper color transitions used by the rainbow pattern.
pub const fn sine_peak(angle: u8) -> u8 {
    let value = sine(angle);
    if value >= 128 { (value - 128) * 2 } else { 0 }
}

/// Maps an 8-bit hue angle to (red, green, blue) intensities via three
/// 120°-phase-shifted peak-sine evaluations.
pub fn rainbow(hue: u8) -> [u8; 3] {
    let angle = (u16::from(hue) * 3 / 4) as u8;

    let red = if hue < 85 {
        sine_peak(angle.wrapping_add(64))
    } else if hue >= 170 {
        sine_peak(angle.wrapping_sub(128))
    } else {
        0
    };
    let green = if hue <= 170 { sine_peak(angle) } else { 0 };
    let blue = if hue < 85 {
        0
    } else {
        sine_peak(angle.wrapping_sub(64))
    };

    [red, green, blue]
}

/// Period of the slow 50% flash shared by programming mode and the horn
/// alarm, in ticks.
pub const FLASH_PERIOD_MS: u16 = 1_500;

/// On-time inside one flash period.
pub const FLASH_ON_MS: u16 = FLASH_PERIOD_MS / 2;

/// Ticks between breathe-phase increments (full sine period ≈ 2 s).
pub const BREATHE_DIVIDER: u8 = 8;

/// Breathe phase parked at the sine peak while nothing is breathing, so a
/// newly breathing LED starts from full intensity rather than mid-fade.
pub const BREATHE_IDLE_PHASE: u8 = 64;

/// Ticks between rainbow hue increments while idle with ignition on.
pub const RAINBOW_DIVIDER: u8 = 64;

/// Hue the rainbow parks at while the ignition is off.
pub const RAINBOW_IDLE_HUE: u8 = 85;

/// Named animation patterns for the switch indicator LEDs.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum Pattern {
    #[default]
    Off,
    On,
    Breathe,
    Flash,
}

/// Operating mode for the horn switch RGB indicator.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum HornPattern {
    #[default]
    Off,
    /// Hue cycles continuously while the vehicle idles.
    Rainbow,
    /// Red channel carries the slow flash while the horn is engaged.
    Alarm,
}

/// Square-wave duty for the shared flash clock.
const fn flash_duty(flash_ms: u16) -> u8 {
    if flash_ms < FLASH_ON_MS { 255 } else { 0 }
}

/// Phase counters plus the per-channel pattern assignments. Writes duties
/// through [`Hardware::set_led_duty`] and tracks the last written value per
/// channel so steady patterns cost nothing per tick.
#[derive(Copy, Clone, Debug)]
pub struct LedEngine {
    switch: [Pattern; 2],
    horn: HornPattern,
    breathe_phase: u8,
    breathe_div: u8,
    hue: u8,
    rainbow_div: u8,
    flash_ms: u16,
    clocking: bool,
    written: [u8; LED_COUNT],
}

impl LedEngine {
    pub const fn new() -> Self {
        Self {
            switch: [Pattern::Off; 2],
            horn: HornPattern::Off,
            breathe_phase: BREATHE_IDLE_PHASE,
            breathe_div: 0,
            hue: RAINBOW_IDLE_HUE,
            rainbow_div: 0,
            flash_ms: 0,
            clocking: true,
            written: [0; LED_COUNT],
        }
    }

    pub const fn switch_pattern(&self, aux: AuxOutput) -> Pattern {
        self.switch[aux.as_index()]
    }

    pub const fn horn_pattern(&self) -> HornPattern {
        self.horn
    }

    /// Assigns a pattern to one switch indicator, applying any static duty
    /// immediately. Animated patterns are refreshed on subsequent ticks.
    pub fn set_switch(&mut self, aux: AuxOutput, pattern: Pattern, hw: &mut impl Hardware) {
        if self.switch[aux.as_index()] == pattern {
            return;
        }
        self.switch[aux.as_index()] = pattern;
        let duty = match pattern {
            Pattern::Off => 0,
            Pattern::On => 255,
            // Breathe picks up from the shared phase on its next divider
            // tick; the placeholder write just unsticks a stale duty.
            Pattern::Breathe => 0,
            Pattern::Flash => flash_duty(self.flash_ms),
        };
        self.write(aux.led(), duty, hw);
    }

    /// Assigns both switch indicators at once (programming mode drives them
    /// as a pair).
    pub fn set_switches(&mut self, pattern: Pattern, hw: &mut impl Hardware) {
        self.set_switch(AuxOutput::V1, pattern, hw);
        self.set_switch(AuxOutput::V2, pattern, hw);
    }

    /// Switches the horn RGB indicator mode, applying the current frame
    /// immediately.
    pub fn set_horn(&mut self, pattern: HornPattern, hw: &mut impl Hardware) {
        if self.horn == pattern {
            return;
        }
        self.horn = pattern;
        match pattern {
            HornPattern::Off => {
                self.write(LedId::HornRed, 0, hw);
                self.write(LedId::HornGreen, 0, hw);
                self.write(LedId::HornBlue, 0, hw);
            }
            HornPattern::Rainbow => {
                let [r, g, b] = rainbow(self.hue);
                self.write(LedId::HornRed, r, hw);
                self.write(LedId::HornGreen, g, hw);
                self.write(LedId::HornBlue, b, hw);
            }
            HornPattern::Alarm => {
                self.write(LedId::HornRed, flash_duty(self.flash_ms), hw);
                self.write(LedId::HornGreen, 0, hw);
                self.write(LedId::HornBlue, 0, hw);
            }
        }
    }

    /// Enables or disables pattern clocking. Disabling blanks every channel;
    /// this is the suspend preparation path, where no indicator may stay lit.
    pub fn set_clocking(&mut self, enabled: bool, hw: &mut impl Hardware) {
        self.clocking = enabled;
        if !enabled {
            for index in 0..LED_COUNT {
                if let Some(led) = LedId::from_index(index) {
                    self.write(led, 0, hw);
                }
            }
        }
    }

    pub const fn is_clocking(&self) -> bool {
        self.clocking
    }

    /// Advances all phase counters by one tick and refreshes animated
    /// channels. `ignition`/`horn_held` gate the rainbow exactly as the
    /// arbitration rules require: the hue advances only while idle with the
    /// ignition on, parks at zero under the horn, and resets once the
    /// vehicle turns off.
    pub fn on_tick(&mut self, ignition: bool, horn_held: bool, hw: &mut impl Hardware) {
        if !self.clocking {
            return;
        }

        self.flash_ms += 1;
        if self.flash_ms >= FLASH_PERIOD_MS {
            self.flash_ms = 0;
        }
        let flash = flash_duty(self.flash_ms);

        if ignition {
            if horn_held {
                // Release restarts the cycle at red on the very next frame.
                self.rainbow_div = RAINBOW_DIVIDER;
                self.hue = 0;
            } else {
                self.rainbow_div += 1;
                if self.rainbow_div >= RAINBOW_DIVIDER {
                    self.rainbow_div = 0;
                    if self.horn == HornPattern::Rainbow {
                        let [r, g, b] = rainbow(self.hue);
                        self.write(LedId::HornRed, r, hw);
                        self.write(LedId::HornGreen, g, hw);
                        self.write(LedId::HornBlue, b, hw);
                    }
                    self.hue = self.hue.wrapping_add(1);
                }
            }
        } else {
            self.rainbow_div = 0;
            self.hue = RAINBOW_IDLE_HUE;
        }

        self.breathe_div += 1;
        if self.breathe_div >= BREATHE_DIVIDER {
            self.breathe_div = 0;
            let any_breathing = self
                .switch
                .iter()
                .any(|pattern| *pattern == Pattern::Breathe);
            if any_breathing {
                self.breathe_phase = self.breathe_phase.wrapping_add(1);
                for aux in AuxOutput::BOTH {
                    if self.switch[aux.as_index()] == Pattern::Breathe {
                        self.write(aux.led(), sine(self.breathe_phase), hw);
                    }
                }
            } else {
                self.breathe_phase = BREATHE_IDLE_PHASE;
            }
        }

        for aux in AuxOutput::BOTH {
            if self.switch[aux.as_index()] == Pattern::Flash {
                self.write(aux.led(), flash, hw);
            }
        }
        if self.horn == HornPattern::Alarm {
            self.write(LedId::HornRed, flash, hw);
        }
    }

    fn write(&mut self, led: LedId, duty: u8, hw: &mut impl Hardware) {
        if self.written[led.as_index()] != duty {
            self.written[led.as_index()] = duty;
            hw.set_led_duty(led, duty);
        }
    }
}

impl Default for LedEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::NoopHardware;

    #[test]
    fn sine_is_symmetric_around_the_midline() {
        for angle in 0..=255u8 {
            let sum = u16::from(sine(angle)) + u16::from(sine(angle.wrapping_add(128)));
            assert!(
                (254..=256).contains(&sum),
                "sine({angle}) + sine({}) = {sum}",
                angle.wrapping_add(128)
            );
        }
    }

    #[test]
    fn sine_peak_isolates_the_rising_half() {
        for angle in 0..=255u8 {
            let full = sine(angle);
            let peak = sine_peak(angle);
            if full < 128 {
                assert_eq!(peak, 0, "angle {angle}");
            } else {
                assert_eq!(peak, (full - 128) * 2, "angle {angle}");
            }
        }
    }

    #[test]
    fn sine_covers_quadrant_boundaries() {
        assert_eq!(sine(0), 128);
        assert_eq!(sine(64), 255);
        assert_eq!(sine(192), 0);
    }

    #[test]
    fn rainbow_channel_windows_match_hue_ranges() {
        // Pure red at hue 0, pure green at 85, pure blue near 170.
        assert_eq!(rainbow(0), [254, 0, 0]);
        let [r, g, b] = rainbow(85);
        assert_eq!(r, 0);
        assert!(g > 200);
        assert_eq!(b, 0);
        let [r, g, b] = rainbow(171);
        assert_eq!(g, 0);
        assert!(b > 200);
        assert!(r < 16);
    }

    #[test]
    fn flash_duty_is_a_half_period_square_wave() {
        assert_eq!(flash_duty(0), 255);
        assert_eq!(flash_duty(FLASH_ON_MS - 1), 255);
        assert_eq!(flash_duty(FLASH_ON_MS), 0);
        assert_eq!(flash_duty(FLASH_PERIOD_MS - 1), 0);
    }

    #[test]
    fn disabling_the_clock_blanks_every_channel() {
        let mut hw = NoopHardware::new();
        let mut engine = LedEngine::new();
        engine.set_switches(Pattern::On, &mut hw);
        engine.set_horn(HornPattern::Rainbow, &mut hw);
        engine.set_clocking(false, &mut hw);
        assert_eq!(engine.written, [0; LED_COUNT]);
    }

    #[test]
    fn breathe_phase_parks_at_peak_when_idle() {
        let mut hw = NoopHardware::new();
        let mut engine = LedEngine::new();
        for _ in 0..100 {
            engine.on_tick(true, false, &mut hw);
        }
        assert_eq!(engine.breathe_phase, BREATHE_IDLE_PHASE);

        engine.set_switch(AuxOutput::V1, Pattern::Breathe, &mut hw);
        for _ in 0..BREATHE_DIVIDER {
            engine.on_tick(true, false, &mut hw);
        }
        assert_ne!(engine.breathe_phase, BREATHE_IDLE_PHASE);
    }

    #[test]
    fn horn_hold_parks_hue_at_red() {
        let mut hw = NoopHardware::new();
        let mut engine = LedEngine::new();
        for _ in 0..1_000 {
            engine.on_tick(true, false, &mut hw);
        }
        engine.on_tick(true, true, &mut hw);
        assert_eq!(engine.hue, 0);
        // Ignition off resets the idle parking hue.
        engine.on_tick(false, false, &mut hw);
        assert_eq!(engine.hue, RAINBOW_IDLE_HUE);
    }
}
