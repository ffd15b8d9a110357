//! Hardware implementation for the accessory board.
//!
//! Owns the three high-side output drivers, the five PWM indicator
//! channels, and the flash page holding the persisted delay word. Input
//! levels are not read from pins here; the edge tasks keep the shared level
//! mask current and the debounce resample consumes that.

use embassy_stm32::Peri;
use embassy_stm32::flash::{Blocking, Flash};
use embassy_stm32::gpio::{Output, OutputType};
use embassy_stm32::peripherals::{FLASH, PA6, PA7, PB0, PB1, PB6, TIM3, TIM4};
use embassy_stm32::time::khz;
use embassy_stm32::timer::simple_pwm::{PwmPin, SimplePwm, SimplePwmChannel};
use embassy_time::{Duration, block_for};

use control_core::{ChannelId, Hardware, LedId, OutputId};

/// Flash offset of the persisted delay record (last 2 KiB page).
const STORE_OFFSET: u32 = 512 * 1024 - 2048;

/// Marker distinguishing a programmed record from erased flash.
const STORE_MAGIC: u32 = 0x444C_5931;

/// Pause between shedding the auxiliary loads and asserting the horn.
const HORN_SETTLE: Duration = Duration::from_millis(1);

/// The five indicator PWM channels: TIM3 ch1-ch4 plus TIM4 ch1.
pub struct LedBank {
    horn_red: SimplePwmChannel<'static, TIM3>,
    horn_green: SimplePwmChannel<'static, TIM3>,
    horn_blue: SimplePwmChannel<'static, TIM3>,
    switch1: SimplePwmChannel<'static, TIM3>,
    switch2: SimplePwmChannel<'static, TIM4>,
}

impl LedBank {
    #[allow(clippy::similar_names)]
    pub fn new(
        tim3: Peri<'static, TIM3>,
        red_pin: Peri<'static, PA6>,
        green_pin: Peri<'static, PA7>,
        blue_pin: Peri<'static, PB0>,
        switch1_pin: Peri<'static, PB1>,
        tim4: Peri<'static, TIM4>,
        switch2_pin: Peri<'static, PB6>,
    ) -> Self {
        let rgb = SimplePwm::new(
            tim3,
            Some(PwmPin::new_ch1(red_pin, OutputType::PushPull)),
            Some(PwmPin::new_ch2(green_pin, OutputType::PushPull)),
            Some(PwmPin::new_ch3(blue_pin, OutputType::PushPull)),
            Some(PwmPin::new_ch4(switch1_pin, OutputType::PushPull)),
            khz(1),
            Default::default(),
        );
        let channels = rgb.split();
        let aux = SimplePwm::new(
            tim4,
            Some(PwmPin::new_ch1(switch2_pin, OutputType::PushPull)),
            None,
            None,
            None,
            khz(1),
            Default::default(),
        );

        let mut bank = Self {
            horn_red: channels.ch1,
            horn_green: channels.ch2,
            horn_blue: channels.ch3,
            switch1: channels.ch4,
            switch2: aux.split().ch1,
        };
        bank.horn_red.enable();
        bank.horn_green.enable();
        bank.horn_blue.enable();
        bank.switch1.enable();
        bank.switch2.enable();
        bank.set(LedId::HornRed, 0);
        bank.set(LedId::HornGreen, 0);
        bank.set(LedId::HornBlue, 0);
        bank.set(LedId::Switch1, 0);
        bank.set(LedId::Switch2, 0);
        bank
    }

    fn set(&mut self, led: LedId, duty: u8) {
        match led {
            LedId::HornRed => set_channel(&mut self.horn_red, duty),
            LedId::HornGreen => set_channel(&mut self.horn_green, duty),
            LedId::HornBlue => set_channel(&mut self.horn_blue, duty),
            LedId::Switch1 => set_channel(&mut self.switch1, duty),
            LedId::Switch2 => set_channel(&mut self.switch2, duty),
        }
    }
}

fn set_channel<T: embassy_stm32::timer::GeneralInstance4Channel>(
    channel: &mut SimplePwmChannel<'static, T>,
    duty: u8,
) {
    let max = u32::from(channel.max_duty_cycle());
    let scaled = (u32::from(duty) * max / 255) as u16;
    channel.set_duty_cycle(scaled);
}

pub struct Board {
    horn: Output<'static>,
    v1: Output<'static>,
    v2: Output<'static>,
    leds: LedBank,
    flash: Flash<'static, Blocking>,
    horn_on: bool,
}

impl Board {
    pub fn new(
        horn: Output<'static>,
        v1: Output<'static>,
        v2: Output<'static>,
        leds: LedBank,
        flash: Peri<'static, FLASH>,
    ) -> Self {
        Self {
            horn,
            v1,
            v2,
            leds,
            flash: Flash::new_blocking(flash),
            horn_on: false,
        }
    }

    pub fn horn_is_on(&self) -> bool {
        self.horn_on
    }
}

impl Hardware for Board {
    fn read_input(&mut self, channel: ChannelId) -> bool {
        super::level(channel)
    }

    fn set_output(&mut self, output: OutputId, on: bool) {
        let pin = match output {
            OutputId::Horn => {
                self.horn_on = on;
                &mut self.horn
            }
            OutputId::V1 => &mut self.v1,
            OutputId::V2 => &mut self.v2,
        };
        if on {
            pin.set_high();
        } else {
            pin.set_low();
        }
    }

    fn set_led_duty(&mut self, led: LedId, duty: u8) {
        self.leds.set(led, duty);
    }

    fn horn_settle(&mut self) {
        block_for(HORN_SETTLE);
    }

    fn load_delay_ms(&mut self) -> u32 {
        let mut record = [0u8; 8];
        if self.flash.blocking_read(STORE_OFFSET, &mut record).is_err() {
            defmt::warn!("delay record read failed");
            return u32::MAX;
        }
        let magic = u32::from_le_bytes([record[0], record[1], record[2], record[3]]);
        if magic != STORE_MAGIC {
            // Erased or never-programmed page; the core falls back to its
            // default.
            return u32::MAX;
        }
        u32::from_le_bytes([record[4], record[5], record[6], record[7]])
    }

    fn store_delay_ms(&mut self, delay_ms: u32) {
        let mut record = [0u8; 8];
        record[..4].copy_from_slice(&STORE_MAGIC.to_le_bytes());
        record[4..].copy_from_slice(&delay_ms.to_le_bytes());

        if self
            .flash
            .blocking_erase(STORE_OFFSET, STORE_OFFSET + 2048)
            .is_err()
        {
            defmt::warn!("delay page erase failed");
            return;
        }
        if self.flash.blocking_write(STORE_OFFSET, &record).is_err() {
            defmt::warn!("delay record write failed");
        }
    }
}
