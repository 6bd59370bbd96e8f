//! Processor types implemented by the engine itself

use crate::parameters::Parameter;

/// Which plugin types a caller is interested in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PluginTypes {
    /// Effects and instruments
    #[default]
    AllPlugins,
    /// Effects only
    EffectPlugins,
}

/// Built-in processor types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltInType {
    VolumeAndPan,
    LevelMeter,
    Equaliser,
    Reverb,
    Delay,
    Chorus,
    Phaser,
    Compressor,
    PitchShift,
    LowPass,
    MidiModifier,
    MidiPatchBay,
    PatchBay,
    AuxSend,
    AuxReturn,
    Text,
    FreezePoint,
    Sampler,
    FourOsc,
    Insert,
}

impl BuiltInType {
    /// Every built-in type, in the order they are offered to the user
    pub const ALL: [BuiltInType; 20] = [
        BuiltInType::VolumeAndPan,
        BuiltInType::LevelMeter,
        BuiltInType::Equaliser,
        BuiltInType::Reverb,
        BuiltInType::Delay,
        BuiltInType::Chorus,
        BuiltInType::Phaser,
        BuiltInType::Compressor,
        BuiltInType::PitchShift,
        BuiltInType::LowPass,
        BuiltInType::MidiModifier,
        BuiltInType::MidiPatchBay,
        BuiltInType::PatchBay,
        BuiltInType::AuxSend,
        BuiltInType::AuxReturn,
        BuiltInType::Text,
        BuiltInType::FreezePoint,
        BuiltInType::Sampler,
        BuiltInType::FourOsc,
        BuiltInType::Insert,
    ];

    /// Types available for a given filter. Instruments are only offered when
    /// all plugin types are wanted.
    pub fn available(types: PluginTypes) -> impl Iterator<Item = BuiltInType> {
        Self::ALL
            .into_iter()
            .filter(move |t| !t.is_synth() || types == PluginTypes::AllPlugins)
    }

    /// Type tag stored in the session and used to create instances
    pub fn xml_type_name(&self) -> &'static str {
        match self {
            BuiltInType::VolumeAndPan => "volume",
            BuiltInType::LevelMeter => "level",
            BuiltInType::Equaliser => "4bandEq",
            BuiltInType::Reverb => "reverb",
            BuiltInType::Delay => "delay",
            BuiltInType::Chorus => "chorus",
            BuiltInType::Phaser => "phaser",
            BuiltInType::Compressor => "compressor",
            BuiltInType::PitchShift => "pitchShifter",
            BuiltInType::LowPass => "lowpass",
            BuiltInType::MidiModifier => "midiModifier",
            BuiltInType::MidiPatchBay => "midiPatchBay",
            BuiltInType::PatchBay => "patchbay",
            BuiltInType::AuxSend => "auxsend",
            BuiltInType::AuxReturn => "auxreturn",
            BuiltInType::Text => "text",
            BuiltInType::FreezePoint => "freezePoint",
            BuiltInType::Sampler => "sampler",
            BuiltInType::FourOsc => "4osc",
            BuiltInType::Insert => "insert",
        }
    }

    /// Look a type up by its tag
    pub fn from_xml_type_name(name: &str) -> Option<BuiltInType> {
        Self::ALL.into_iter().find(|t| t.xml_type_name() == name)
    }

    /// Display name
    pub fn display_name(&self) -> &'static str {
        match self {
            BuiltInType::VolumeAndPan => "Volume & Pan",
            BuiltInType::LevelMeter => "Level Meter",
            BuiltInType::Equaliser => "4-Band Equaliser",
            BuiltInType::Reverb => "Reverb",
            BuiltInType::Delay => "Delay",
            BuiltInType::Chorus => "Chorus",
            BuiltInType::Phaser => "Phaser",
            BuiltInType::Compressor => "Compressor/Limiter",
            BuiltInType::PitchShift => "Pitch Shifter",
            BuiltInType::LowPass => "Low/High-Pass Filter",
            BuiltInType::MidiModifier => "MIDI Modifier",
            BuiltInType::MidiPatchBay => "MIDI Patch Bay",
            BuiltInType::PatchBay => "Patch Bay",
            BuiltInType::AuxSend => "Aux Send",
            BuiltInType::AuxReturn => "Aux Return",
            BuiltInType::Text => "Text",
            BuiltInType::FreezePoint => "Freeze Point",
            BuiltInType::Sampler => "Sampler",
            BuiltInType::FourOsc => "4OSC",
            BuiltInType::Insert => "Insert",
        }
    }

    /// Whether the type generates sound from MIDI
    pub fn is_synth(&self) -> bool {
        matches!(self, BuiltInType::Sampler | BuiltInType::FourOsc)
    }

    /// Parameters a fresh instance starts with
    pub fn default_parameters(&self) -> Vec<Parameter> {
        match self {
            BuiltInType::VolumeAndPan => vec![
                Parameter::continuous(0, "Volume", "dB", -100.0, 6.0, 0.0),
                Parameter::continuous(1, "Pan", "", -1.0, 1.0, 0.0),
            ],
            BuiltInType::LevelMeter => vec![Parameter::switch(0, "Show Peak Hold", true)],
            BuiltInType::Equaliser => vec![
                Parameter::continuous(0, "Low Gain", "dB", -20.0, 20.0, 0.0),
                Parameter::continuous(1, "Low Mid Gain", "dB", -20.0, 20.0, 0.0),
                Parameter::continuous(2, "High Mid Gain", "dB", -20.0, 20.0, 0.0),
                Parameter::continuous(3, "High Gain", "dB", -20.0, 20.0, 0.0),
            ],
            BuiltInType::Reverb => vec![
                Parameter::continuous(0, "Room Size", "", 0.0, 1.0, 0.3),
                Parameter::continuous(1, "Damping", "", 0.0, 1.0, 0.5),
                Parameter::continuous(2, "Wet", "", 0.0, 1.0, 0.33),
                Parameter::continuous(3, "Dry", "", 0.0, 1.0, 0.4),
                Parameter::continuous(4, "Width", "", 0.0, 1.0, 1.0),
            ],
            BuiltInType::Delay => vec![
                Parameter::continuous(0, "Feedback", "dB", -30.0, 0.0, -6.0),
                Parameter::continuous(1, "Mix", "%", 0.0, 100.0, 30.0),
                Parameter::continuous(2, "Length", "ms", 1.0, 2000.0, 150.0),
            ],
            BuiltInType::Chorus => vec![
                Parameter::continuous(0, "Depth", "ms", 0.0, 10.0, 3.0),
                Parameter::continuous(1, "Speed", "Hz", 0.0, 10.0, 1.0),
                Parameter::continuous(2, "Width", "", 0.0, 1.0, 0.5),
                Parameter::continuous(3, "Mix", "", 0.0, 1.0, 0.5),
            ],
            BuiltInType::Phaser => vec![
                Parameter::continuous(0, "Depth", "", 0.0, 12.0, 5.0),
                Parameter::continuous(1, "Rate", "Hz", 0.0, 3.0, 0.4),
                Parameter::continuous(2, "Feedback", "", 0.0, 0.99, 0.7),
            ],
            BuiltInType::Compressor => vec![
                Parameter::continuous(0, "Threshold", "dB", -60.0, 0.0, -12.0),
                Parameter::continuous(1, "Ratio", ":1", 1.0, 20.0, 4.0),
                Parameter::continuous(2, "Attack", "ms", 0.3, 200.0, 100.0),
                Parameter::continuous(3, "Release", "ms", 10.0, 300.0, 100.0),
                Parameter::continuous(4, "Output", "dB", -10.0, 24.0, 0.0),
                Parameter::switch(5, "Sidechain", false),
            ],
            BuiltInType::PitchShift => vec![Parameter::continuous(0, "Semitones", "st", -24.0, 24.0, 0.0)],
            BuiltInType::LowPass => vec![
                Parameter::continuous(0, "Frequency", "Hz", 10.0, 22000.0, 4000.0),
                Parameter::switch(1, "High-Pass", false),
            ],
            BuiltInType::MidiModifier => vec![
                Parameter::continuous(0, "Semitones", "st", -24.0, 24.0, 0.0),
                Parameter::continuous(1, "Velocity", "%", -100.0, 100.0, 0.0),
            ],
            BuiltInType::AuxSend => vec![
                Parameter::continuous(0, "Send Level", "dB", -100.0, 6.0, 0.0),
                Parameter::continuous(1, "Pan", "", -1.0, 1.0, 0.0),
                Parameter::continuous(2, "Bus", "", 0.0, 31.0, 0.0),
            ],
            BuiltInType::AuxReturn => vec![Parameter::continuous(0, "Bus", "", 0.0, 31.0, 0.0)],
            BuiltInType::Sampler => vec![Parameter::continuous(0, "Gain", "dB", -48.0, 12.0, 0.0)],
            BuiltInType::FourOsc => vec![
                Parameter::continuous(0, "Master Level", "dB", -100.0, 0.0, -6.0),
                Parameter::continuous(1, "Filter Freq", "Hz", 8.0, 20000.0, 8000.0),
                Parameter::continuous(2, "Filter Resonance", "", 0.0, 100.0, 0.0),
                Parameter::continuous(3, "Amp Attack", "s", 0.001, 60.0, 0.1),
                Parameter::continuous(4, "Amp Release", "s", 0.001, 60.0, 0.1),
            ],
            BuiltInType::MidiPatchBay
            | BuiltInType::PatchBay
            | BuiltInType::Text
            | BuiltInType::FreezePoint
            | BuiltInType::Insert => Vec::new(),
        }
    }
}
