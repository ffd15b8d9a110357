//! Identifiers and board metadata for the controller's inputs and outputs.
//!
//! The catalog mirrors how the lines are routed on the accessory board so
//! firmware, emulator, and diagnostics all agree on naming and polarity
//! without embedding any MCU-specific knowledge in the state machines.

/// Identifier for the six debounced vehicle-signal inputs.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ChannelId {
    Ignition,
    Reverse,
    HighBeam,
    HornSwitch,
    Switch1,
    Switch2,
}

/// Number of [`ChannelId`] variants.
pub const CHANNEL_COUNT: usize = 6;

impl ChannelId {
    /// Deterministic index for lookups into [`ALL_INPUTS`] and channel arrays.
    pub const fn as_index(self) -> usize {
        match self {
            ChannelId::Ignition => 0,
            ChannelId::Reverse => 1,
            ChannelId::HighBeam => 2,
            ChannelId::HornSwitch => 3,
            ChannelId::Switch1 => 4,
            ChannelId::Switch2 => 5,
        }
    }

    /// Attempts to construct a [`ChannelId`] from a raw index.
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(ChannelId::Ignition),
            1 => Some(ChannelId::Reverse),
            2 => Some(ChannelId::HighBeam),
            3 => Some(ChannelId::HornSwitch),
            4 => Some(ChannelId::Switch1),
            5 => Some(ChannelId::Switch2),
            _ => None,
        }
    }

    /// The auxiliary output whose toggle a press on this channel flips, if any.
    pub const fn aux(self) -> Option<AuxOutput> {
        match self {
            ChannelId::Switch1 => Some(AuxOutput::V1),
            ChannelId::Switch2 => Some(AuxOutput::V2),
            _ => None,
        }
    }
}

/// Input polarity as wired through the board's level shifters.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InputPolarity {
    /// 12 V on the connector reads as logic high.
    ActiveHigh,
    /// Pushbutton lines are inverted by the input stage.
    Inverted,
}

/// Metadata describing how an input line is routed on the board.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct InputLine {
    pub id: ChannelId,
    pub name: &'static str,
    pub mcu_pin: &'static str,
    pub polarity: InputPolarity,
}

impl InputLine {
    pub const fn new(
        id: ChannelId,
        name: &'static str,
        mcu_pin: &'static str,
        polarity: InputPolarity,
    ) -> Self {
        Self {
            id,
            name,
            mcu_pin,
            polarity,
        }
    }
}

/// Compile-time catalog of every input line.
pub const ALL_INPUTS: [InputLine; CHANNEL_COUNT] = [
    InputLine::new(ChannelId::Ignition, "IGN", "PA3", InputPolarity::ActiveHigh),
    InputLine::new(ChannelId::Reverse, "REV", "PA2", InputPolarity::ActiveHigh),
    InputLine::new(ChannelId::HighBeam, "HB", "PA4", InputPolarity::ActiveHigh),
    InputLine::new(ChannelId::HornSwitch, "HSW", "PA0", InputPolarity::Inverted),
    InputLine::new(ChannelId::Switch1, "SW1", "PC6", InputPolarity::Inverted),
    InputLine::new(ChannelId::Switch2, "SW2", "PA1", InputPolarity::Inverted),
];

/// Retrieve input metadata by identifier.
pub const fn input_by_id(id: ChannelId) -> InputLine {
    ALL_INPUTS[id.as_index()]
}

/// Identifier for the three high-current outputs.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputId {
    Horn,
    V1,
    V2,
}

impl OutputId {
    /// Deterministic index for output arrays.
    pub const fn as_index(self) -> usize {
        match self {
            OutputId::Horn => 0,
            OutputId::V1 => 1,
            OutputId::V2 => 2,
        }
    }
}

/// Identifier for the five PWM indicator LED channels.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LedId {
    HornRed,
    HornGreen,
    HornBlue,
    Switch1,
    Switch2,
}

/// Number of [`LedId`] variants.
pub const LED_COUNT: usize = 5;

impl LedId {
    /// Deterministic index for duty arrays.
    pub const fn as_index(self) -> usize {
        match self {
            LedId::HornRed => 0,
            LedId::HornGreen => 1,
            LedId::HornBlue => 2,
            LedId::Switch1 => 3,
            LedId::Switch2 => 4,
        }
    }

    /// Attempts to construct a [`LedId`] from a raw index.
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(LedId::HornRed),
            1 => Some(LedId::HornGreen),
            2 => Some(LedId::HornBlue),
            3 => Some(LedId::Switch1),
            4 => Some(LedId::Switch2),
            _ => None,
        }
    }
}

/// The two switch-controlled auxiliary 12 V outputs.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AuxOutput {
    V1,
    V2,
}

impl AuxOutput {
    /// Deterministic index for toggle arrays.
    pub const fn as_index(self) -> usize {
        match self {
            AuxOutput::V1 => 0,
            AuxOutput::V2 => 1,
        }
    }

    /// The output line this auxiliary channel drives.
    pub const fn output(self) -> OutputId {
        match self {
            AuxOutput::V1 => OutputId::V1,
            AuxOutput::V2 => OutputId::V2,
        }
    }

    /// The indicator LED paired with this auxiliary channel.
    pub const fn led(self) -> LedId {
        match self {
            AuxOutput::V1 => LedId::Switch1,
            AuxOutput::V2 => LedId::Switch2,
        }
    }

    /// Both auxiliary outputs, in index order.
    pub const BOTH: [AuxOutput; 2] = [AuxOutput::V1, AuxOutput::V2];
}

/// Tri-state intent for an auxiliary output, distinct from its electrical
/// state. `OnUser` may only be cleared by an explicit press or a system-level
/// reset; automatic vehicle signals are confined to `Off`/`OnAuto`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum Toggle {
    #[default]
    Off,
    OnAuto,
    OnUser,
}

impl Toggle {
    /// Returns `true` when the output should be energized.
    pub const fn is_on(self) -> bool {
        !matches!(self, Toggle::Off)
    }

    /// Result of an explicit pushbutton press: off becomes user-on, any
    /// on state (user or automatic) becomes off.
    pub const fn pressed(self) -> Toggle {
        match self {
            Toggle::Off => Toggle::OnUser,
            Toggle::OnAuto | Toggle::OnUser => Toggle::Off,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_indices_round_trip() {
        for (index, line) in ALL_INPUTS.iter().enumerate() {
            assert_eq!(line.id.as_index(), index);
            assert_eq!(ChannelId::from_index(index), Some(line.id));
        }
        assert_eq!(ChannelId::from_index(CHANNEL_COUNT), None);
    }

    #[test]
    fn pushbutton_lines_are_inverted() {
        for id in [ChannelId::HornSwitch, ChannelId::Switch1, ChannelId::Switch2] {
            assert_eq!(input_by_id(id).polarity, InputPolarity::Inverted);
        }
        assert_eq!(
            input_by_id(ChannelId::Ignition).polarity,
            InputPolarity::ActiveHigh
        );
    }

    #[test]
    fn press_flips_between_off_and_user() {
        assert_eq!(Toggle::Off.pressed(), Toggle::OnUser);
        assert_eq!(Toggle::OnUser.pressed(), Toggle::Off);
        // A press cancels an automatic request rather than promoting it.
        assert_eq!(Toggle::OnAuto.pressed(), Toggle::Off);
    }

    #[test]
    fn switch_channels_map_to_aux_outputs() {
        assert_eq!(ChannelId::Switch1.aux(), Some(AuxOutput::V1));
        assert_eq!(ChannelId::Switch2.aux(), Some(AuxOutput::V2));
        assert_eq!(ChannelId::Ignition.aux(), None);
        assert_eq!(AuxOutput::V1.led(), LedId::Switch1);
        assert_eq!(AuxOutput::V2.output(), OutputId::V2);
    }
}
