use anyhow::{Context, Result};
use std::io::Write;
use tracing::{debug, info};

use crate::chord::{ChordCode, ChordDecoder, ChordError, Dot, Glyph};
use crate::dictation::{DictationEngine, DictationError, DictationEvent, Phase};
use crate::progress::ProgressRepository;
use crate::speech::{Announcer, Cue};

/// Keypad keys for dots 1 to 6, in dot order
///
/// The left column (7, 4, 1) holds dots 1-3 and the right column (8, 5, 2)
/// holds dots 4-6, mirroring a Braille cell.
pub const DOT_KEYS: [char; 6] = ['7', '4', '1', '8', '5', '2'];

/// Trainer mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Compose and speak letters freely
    Free,
    /// Typed words are scored by the dictation engine
    Dictation,
}

/// One keypad action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Press a Braille dot
    Dot(Dot),
    /// Hear the current chord without committing it
    Preview,
    /// Commit the chord as a letter of the word
    Append,
    /// Submit the composed word
    SubmitWord,
    /// Speak the composed word
    Speak,
    /// Drop the chord and the word
    Clear,
    /// Toggle free and dictation mode
    SwitchMode,
}

impl Key {
    /// Key bound to a keypad character
    pub fn from_char(c: char) -> Option<Self> {
        if let Some(index) = DOT_KEYS.iter().position(|&k| k == c) {
            return Dot::new(index).ok().map(Self::Dot);
        }
        match c {
            '=' => Some(Self::Preview),
            '+' => Some(Self::Append),
            '-' => Some(Self::SubmitWord),
            '.' => Some(Self::Speak),
            '0' => Some(Self::Clear),
            'm' | 'M' => Some(Self::SwitchMode),
            _ => None,
        }
    }
}

/// One command typed on the console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Keypad action
    Key(Key),
    /// Show the key list
    Help,
}

impl Command {
    /// Command bound to a console character
    pub fn from_char(c: char) -> Option<Self> {
        if c == '?' {
            return Some(Self::Help);
        }
        Key::from_char(c).map(Self::Key)
    }
}

/// How a console line is to be handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineInput<'a> {
    /// The whole line is a student code
    StudentId(&'a str),
    /// Every character is a command; unmapped characters are dropped
    Commands(Vec<Command>),
}

/// Output for the student
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    /// Phrase to speak
    Speak(String),
    /// Fixed sound prompt
    Cue(Cue),
    /// Text to show on screen
    Display(String),
}

impl From<DictationEvent> for Feedback {
    fn from(event: DictationEvent) -> Self {
        Self::Speak(event.speech())
    }
}

/// Sends feedback to the announcer and the screen, in order
///
/// # Errors
/// Returns error if the announcer or the screen writer fails
pub fn render<A, W>(feedback: &[Feedback], announcer: &mut A, screen: &mut W) -> Result<()>
where
    A: Announcer + ?Sized,
    W: Write,
{
    for item in feedback {
        match item {
            Feedback::Speak(text) => announcer.announce(text)?,
            Feedback::Cue(cue) => announcer.play_cue(*cue)?,
            Feedback::Display(text) => {
                writeln!(screen, "{text}").context("failed to write to screen")?;
            }
        }
    }
    Ok(())
}

/// Keypad trainer
///
/// Turns chords into letters and letters into words. In dictation mode
/// submitted words go to the [`DictationEngine`]; the engine's events come
/// back as [`Feedback`].
pub struct Trainer<R: ProgressRepository> {
    decoder: ChordDecoder,
    word: Vec<char>,
    mode: Mode,
    engine: DictationEngine<R>,
}

impl<R: ProgressRepository> Trainer<R> {
    /// Trainer in free mode
    pub fn new(engine: DictationEngine<R>) -> Self {
        Self {
            decoder: ChordDecoder::new(),
            word: Vec::new(),
            mode: Mode::Free,
            engine,
        }
    }

    /// Current mode
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Underlying dictation engine
    pub const fn engine(&self) -> &DictationEngine<R> {
        &self.engine
    }

    /// Letters composed so far
    pub fn composed_word(&self) -> String {
        self.word.iter().collect()
    }

    /// Code of the chord being pressed
    pub fn chord_code(&self) -> ChordCode {
        self.decoder.code()
    }

    /// Whether the next line of input is a student code
    pub fn awaiting_student_id(&self) -> bool {
        self.mode == Mode::Dictation && self.engine.phase() == Phase::AwaitingStudentId
    }

    /// Splits a console line into a student code or commands
    ///
    /// A line holding only a mode switch or help is always a command, so the
    /// student can leave dictation before giving a code.
    pub fn parse_line<'a>(&self, line: &'a str) -> LineInput<'a> {
        let trimmed = line.trim();
        let mut chars = trimmed.chars();
        let single = match (chars.next(), chars.next()) {
            (Some(c), None) => Command::from_char(c),
            _ => None,
        };
        let escapes = matches!(single, Some(Command::Help | Command::Key(Key::SwitchMode)));

        if self.awaiting_student_id() && !escapes {
            return LineInput::StudentId(trimmed);
        }
        LineInput::Commands(
            trimmed
                .chars()
                .filter(|c| !c.is_whitespace())
                .filter_map(|c| {
                    let command = Command::from_char(c);
                    if command.is_none() {
                        debug!(key = %c, "unmapped key");
                    }
                    command
                })
                .collect(),
        )
    }

    /// Word the student is asked to type, if any
    pub fn current_prompt_word(&self) -> Option<&str> {
        self.engine.current_prompt_word()
    }

    /// Handles one keypad action
    ///
    /// # Errors
    /// Returns error if the dictation engine fails on a submitted word
    pub fn press(&mut self, key: Key) -> Result<Vec<Feedback>, DictationError> {
        match key {
            Key::Dot(dot) => {
                self.decoder.accumulate(dot);
                let dots: Vec<String> = self
                    .decoder
                    .pressed_dots()
                    .iter()
                    .map(|d| (d.index() + 1).to_string())
                    .collect();
                Ok(vec![Feedback::Display(format!("точки {}", dots.join(" ")))])
            }
            Key::Preview => Ok(self.preview_chord()),
            Key::Append => Ok(self.append_chord()),
            Key::SubmitWord => self.submit_word(),
            Key::Speak => Ok(self.speak_phrase()),
            Key::Clear => {
                self.clear();
                Ok(Vec::new())
            }
            Key::SwitchMode => Ok(self.switch_mode()),
        }
    }

    /// Presses the dot at `index` (0 to 5)
    ///
    /// # Errors
    /// Returns error if `index` is not a dot position
    pub fn submit_chord_digit(&mut self, index: usize) -> Result<ChordCode, ChordError> {
        self.decoder.accumulate(Dot::new(index)?);
        Ok(self.decoder.code())
    }

    /// Resolves the chord and resets it
    pub fn submit_chord(&mut self) -> Glyph {
        self.decoder.submit()
    }

    /// Adds a resolved glyph to the word; unknown glyphs are refused
    pub fn append_letter_to_word(&mut self, glyph: Glyph) -> bool {
        match glyph.as_char() {
            Some(c) => {
                self.word.push(c);
                true
            }
            None => false,
        }
    }

    /// Plays the current chord's letter, or the retype cue if it has none
    ///
    /// An unknown chord is dropped so the student can start over.
    pub fn preview_chord(&mut self) -> Vec<Feedback> {
        match self.decoder.peek().as_char() {
            Some(c) => vec![Feedback::Cue(Cue::Letter(c))],
            None => {
                debug!(code = %self.decoder.code(), "unknown chord on preview");
                self.decoder.reset();
                vec![Feedback::Cue(Cue::Retype)]
            }
        }
    }

    /// Commits the current chord to the word
    pub fn append_chord(&mut self) -> Vec<Feedback> {
        let code = self.decoder.code();
        let glyph = self.submit_chord();
        if !self.append_letter_to_word(glyph) {
            debug!(%code, "unknown chord not appended");
            return vec![Feedback::Cue(Cue::Retype)];
        }
        let mut feedback = Vec::with_capacity(2);
        if let Some(c) = glyph.as_char() {
            feedback.push(Feedback::Cue(Cue::Letter(c)));
        }
        feedback.push(Feedback::Display(self.composed_word()));
        feedback
    }

    /// Speaks the composed word
    pub fn speak_phrase(&self) -> Vec<Feedback> {
        if self.word.is_empty() {
            return Vec::new();
        }
        vec![Feedback::Speak(self.composed_word())]
    }

    /// Drops the chord and the composed word
    pub fn clear(&mut self) {
        self.decoder.reset();
        self.word.clear();
    }

    /// Shows the word in free mode or scores it in dictation mode
    ///
    /// # Errors
    /// Returns error if the engine can't persist the result; the session is
    /// over by then and the trainer is back in free mode
    pub fn submit_word(&mut self) -> Result<Vec<Feedback>, DictationError> {
        let word = self.composed_word();
        if self.mode == Mode::Free {
            return Ok(vec![Feedback::Display(word)]);
        }
        if self.engine.phase() != Phase::WordActive {
            debug!(phase = %self.engine.phase(), "word submitted with no prompt");
            return Ok(vec![Feedback::Display("Нет слова для проверки".to_owned())]);
        }

        self.word.clear();
        let result = self.engine.submit_word(&word);
        self.settle(result)
    }

    /// Starts a session for the typed student code
    ///
    /// A blank code asks again.
    ///
    /// # Errors
    /// Returns error if the engine fails to start the session
    pub fn begin_session(&mut self, student_id: &str) -> Result<Vec<Feedback>, DictationError> {
        match self.engine.begin_session(student_id) {
            Err(DictationError::EmptyStudentId) => {
                Ok(vec![Feedback::from(DictationEvent::AskStudentId)])
            }
            result => self.settle(result),
        }
    }

    /// Toggles free and dictation mode
    ///
    /// Leaving dictation drops the running session without penalty.
    pub fn switch_mode(&mut self) -> Vec<Feedback> {
        self.clear();
        match self.mode {
            Mode::Free => {
                info!("mode: Free → Dictation");
                self.mode = Mode::Dictation;
                self.engine
                    .enter_dictation()
                    .into_iter()
                    .map(Feedback::from)
                    .collect()
            }
            Mode::Dictation => {
                info!("mode: Dictation → Free");
                self.engine.exit();
                self.mode = Mode::Free;
                vec![Feedback::Display("Свободный режим".to_owned())]
            }
        }
    }

    /// Turns engine events into feedback, leaving dictation once the session ends
    ///
    /// A failed call leaves dictation if the engine dropped the session.
    fn settle(
        &mut self,
        result: Result<Vec<DictationEvent>, DictationError>,
    ) -> Result<Vec<Feedback>, DictationError> {
        let over = match &result {
            Ok(events) => events.iter().any(DictationEvent::is_terminal),
            Err(_) => self.engine.phase() == Phase::Idle,
        };
        if over && self.mode == Mode::Dictation {
            info!(phase = %self.engine.phase(), "session over: Dictation → Free");
            self.engine.exit();
            self.mode = Mode::Free;
        }
        Ok(result?.into_iter().map(Feedback::from).collect())
    }
}
