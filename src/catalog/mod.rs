//! The fixed table of UI sounds.
//!
//! Every [`SoundEventId`] maps to exactly one [`SoundRecipe`]; [`recipe`] is
//! an exhaustive `match`, so adding an identifier without a recipe does not
//! compile.

pub mod notes;

use std::{fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{EnvelopeParams, FilterType, WaveformKind},
    error::EngineError,
};

use notes::*;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEventId {
    LetterReveal,
    CorrectAnswer,
    WrongAnswer,
    Skip,
    TimeWarning,
    Win,
    ButtonClick,
}

impl SoundEventId {
    pub const ALL: [SoundEventId; 7] = [
        SoundEventId::LetterReveal,
        SoundEventId::CorrectAnswer,
        SoundEventId::WrongAnswer,
        SoundEventId::Skip,
        SoundEventId::TimeWarning,
        SoundEventId::Win,
        SoundEventId::ButtonClick,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SoundEventId::LetterReveal => "letterReveal",
            SoundEventId::CorrectAnswer => "correctAnswer",
            SoundEventId::WrongAnswer => "wrongAnswer",
            SoundEventId::Skip => "skip",
            SoundEventId::TimeWarning => "timeWarning",
            SoundEventId::Win => "win",
            SoundEventId::ButtonClick => "buttonClick",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SoundEventId::LetterReveal => "Quick pop when revealing a letter",
            SoundEventId::CorrectAnswer => "Musical jingle for correct answers",
            SoundEventId::WrongAnswer => "Error buzz for wrong answers",
            SoundEventId::Skip => "Whoosh sound when skipping a word",
            SoundEventId::TimeWarning => "Tick sound during final 10 seconds",
            SoundEventId::Win => "Triumphant fanfare when winning",
            SoundEventId::ButtonClick => "Click feedback for all buttons",
        }
    }
}

impl fmt::Display for SoundEventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SoundEventId {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SoundEventId::ALL
            .into_iter()
            .find(|id| id.name() == s)
            .ok_or_else(|| EngineError::CatalogMiss(s.to_owned()))
    }
}

/// One tone inside a melody.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    /// Hz.
    pub frequency: f32,
    /// Seconds.
    pub duration: f32,
    /// Seconds after the start of playback.
    pub delay: f32,
}

impl Note {
    pub const fn new(frequency: f32, duration: f32, delay: f32) -> Self {
        Self {
            frequency,
            duration,
            delay,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tone {
    Frequency(f32),
    Melody(&'static [Note]),
}

#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSpec {
    pub kind: FilterType,
    pub start_frequency: f32,
    /// When set, the center frequency sweeps exponentially to this value
    /// over the sound's duration.
    pub end_frequency: Option<f32>,
    pub q: f32,
}

#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundRecipe {
    pub waveform: WaveformKind,
    /// Ignored when `uses_noise` is set.
    pub tone: Tone,
    /// Seconds.
    pub duration: f32,
    pub envelope: EnvelopeParams,
    pub uses_noise: bool,
    /// Required when `uses_noise` is set.
    pub filter: Option<FilterSpec>,
}

/// How a recipe turns into nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Strategy {
    Single { frequency: f32 },
    Melody { notes: &'static [Note] },
    FilteredNoise { filter: FilterSpec },
}

impl SoundRecipe {
    pub fn strategy(&self) -> Strategy {
        match (self.uses_noise, self.filter, self.tone) {
            (true, Some(filter), _) => Strategy::FilteredNoise { filter },
            (_, _, Tone::Melody(notes)) => Strategy::Melody { notes },
            (_, _, Tone::Frequency(frequency)) => Strategy::Single { frequency },
        }
    }
}

static CORRECT_ANSWER: [Note; 4] = [
    Note::new(C5, 0.25, 0.0),
    Note::new(E5, 0.25, 0.2),
    Note::new(G5, 0.25, 0.4),
    Note::new(C6, 0.3, 0.6),
];

static WIN: [Note; 6] = [
    Note::new(C4, 0.25, 0.0),
    Note::new(E4, 0.25, 0.2),
    Note::new(G4, 0.25, 0.4),
    Note::new(C5, 0.25, 0.6),
    Note::new(E5, 0.25, 0.8),
    Note::new(G5, 0.5, 1.0),
];

static LETTER_REVEAL: SoundRecipe = SoundRecipe {
    waveform: WaveformKind::Sine,
    tone: Tone::Frequency(A4),
    duration: 0.1,
    envelope: EnvelopeParams::POP,
    uses_noise: false,
    filter: None,
};

static CORRECT: SoundRecipe = SoundRecipe {
    waveform: WaveformKind::Square,
    tone: Tone::Melody(&CORRECT_ANSWER),
    duration: 1.0,
    envelope: EnvelopeParams::MUSICAL,
    uses_noise: false,
    filter: None,
};

static WRONG: SoundRecipe = SoundRecipe {
    waveform: WaveformKind::Sawtooth,
    tone: Tone::Frequency(200.0),
    duration: 0.3,
    envelope: EnvelopeParams::ERROR,
    uses_noise: false,
    filter: None,
};

static SKIP: SoundRecipe = SoundRecipe {
    waveform: WaveformKind::Sine,
    tone: Tone::Frequency(0.0),
    duration: 0.2,
    envelope: EnvelopeParams::WHOOSH,
    uses_noise: true,
    filter: Some(FilterSpec {
        kind: FilterType::LowPass,
        start_frequency: 2000.0,
        end_frequency: Some(200.0),
        q: 1.0,
    }),
};

static TIME_WARNING: SoundRecipe = SoundRecipe {
    waveform: WaveformKind::Square,
    tone: Tone::Frequency(A5),
    duration: 0.05,
    envelope: EnvelopeParams::CLICK,
    uses_noise: false,
    filter: None,
};

static FANFARE: SoundRecipe = SoundRecipe {
    waveform: WaveformKind::Triangle,
    tone: Tone::Melody(&WIN),
    duration: 1.5,
    envelope: EnvelopeParams::FANFARE,
    uses_noise: false,
    filter: None,
};

static BUTTON_CLICK: SoundRecipe = SoundRecipe {
    waveform: WaveformKind::Sine,
    tone: Tone::Frequency(1000.0),
    duration: 0.05,
    envelope: EnvelopeParams::CLICK,
    uses_noise: false,
    filter: None,
};

pub fn recipe(id: SoundEventId) -> &'static SoundRecipe {
    match id {
        SoundEventId::LetterReveal => &LETTER_REVEAL,
        SoundEventId::CorrectAnswer => &CORRECT,
        SoundEventId::WrongAnswer => &WRONG,
        SoundEventId::Skip => &SKIP,
        SoundEventId::TimeWarning => &TIME_WARNING,
        SoundEventId::Win => &FANFARE,
        SoundEventId::ButtonClick => &BUTTON_CLICK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_event_resolves_to_a_valid_recipe() {
        for id in SoundEventId::ALL {
            let recipe = recipe(id);
            assert!(recipe.duration > 0.0, "{id}");
            assert!((0.0..=1.0).contains(&recipe.envelope.sustain), "{id}");
            if recipe.uses_noise {
                assert!(recipe.filter.is_some(), "{id} uses noise without a filter");
            }
        }
    }

    #[test]
    fn names_round_trip() {
        for id in SoundEventId::ALL {
            assert_eq!(id.name().parse::<SoundEventId>().unwrap(), id);
            assert!(!id.description().is_empty());
        }
    }

    #[test]
    fn unknown_name_is_a_catalog_miss() {
        let err = "airHorn".parse::<SoundEventId>().unwrap_err();
        assert!(matches!(err, EngineError::CatalogMiss(name) if name == "airHorn"));
    }

    #[test]
    fn strategies_follow_the_recipe_shape() {
        assert_eq!(
            recipe(SoundEventId::LetterReveal).strategy(),
            Strategy::Single { frequency: 440.0 }
        );
        assert!(matches!(
            recipe(SoundEventId::Win).strategy(),
            Strategy::Melody { notes } if notes.len() == 6
        ));
        assert!(matches!(
            recipe(SoundEventId::Skip).strategy(),
            Strategy::FilteredNoise { filter } if filter.end_frequency == Some(200.0)
        ));
    }

    #[test]
    fn melodies_fit_inside_their_recipe() {
        for id in SoundEventId::ALL {
            let recipe = recipe(id);
            if let Tone::Melody(notes) = recipe.tone {
                for note in notes {
                    assert!(note.frequency > 0.0 && note.duration > 0.0 && note.delay >= 0.0);
                    assert!(note.delay + note.duration <= recipe.duration + 1e-6, "{id}");
                }
            }
        }
    }
}
