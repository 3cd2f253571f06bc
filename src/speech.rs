use anyhow::{bail, Context, Result};
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, warn};

use crate::config::{Config, SpeechConfig};

/// Fixed non-speech prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Recorded name of a letter
    Letter(char),
    /// "Type the letter again" after an unknown chord
    Retype,
}

impl Cue {
    /// Sound file for this cue inside the sounds directory
    pub fn file_name(self) -> String {
        match self {
            Self::Letter(c) => format!("буква_{}.ogg", c.to_lowercase()),
            Self::Retype => "perenabor_l.ogg".to_owned(),
        }
    }

    /// Phrase spoken when no sound file is available
    pub fn spoken(self) -> String {
        match self {
            Self::Letter(' ') => "пробел".to_owned(),
            Self::Letter(c) => format!("буква {c}"),
            Self::Retype => "Перенаберите букву".to_owned(),
        }
    }
}

/// Speech and sound output
///
/// Calls block until playback finishes.
#[cfg_attr(test, mockall::automock)]
pub trait Announcer {
    /// Speaks a phrase
    ///
    /// # Errors
    /// Returns error if the output device or synthesizer fails
    fn announce(&mut self, text: &str) -> Result<()>;

    /// Plays a fixed prompt
    ///
    /// # Errors
    /// Returns error if the output device or player fails
    fn play_cue(&mut self, cue: Cue) -> Result<()>;
}

/// Writes speech to stdout
pub struct ConsoleAnnouncer<W: Write> {
    out: W,
}

impl ConsoleAnnouncer<std::io::Stdout> {
    /// Announcer printing to stdout
    pub fn stdout() -> Self {
        Self {
            out: std::io::stdout(),
        }
    }
}

impl<W: Write> ConsoleAnnouncer<W> {
    /// Announcer printing to any writer
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    /// Consumes the announcer, returning the writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Announcer for ConsoleAnnouncer<W> {
    fn announce(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "🔊 {text}").context("failed to write announcement")
    }

    fn play_cue(&mut self, cue: Cue) -> Result<()> {
        writeln!(self.out, "🔔 {}", cue.spoken()).context("failed to write cue")
    }
}

/// Runs external programs for speech and cues, echoing to stdout as well
///
/// A failing program is logged and the text is still printed, so the session
/// keeps going without audio.
pub struct CommandAnnouncer {
    config: SpeechConfig,
    console: ConsoleAnnouncer<std::io::Stdout>,
}

impl CommandAnnouncer {
    /// Announcer driven by the speech section of the config
    pub fn new(config: SpeechConfig) -> Self {
        Self {
            config,
            console: ConsoleAnnouncer::stdout(),
        }
    }

    fn speak(&self, text: &str) -> Result<()> {
        let Some(program) = self.config.command.as_deref() else {
            return Ok(());
        };
        let status = Command::new(program)
            .arg("-v")
            .arg(&self.config.voice)
            .arg("-s")
            .arg(self.config.rate.to_string())
            .arg(text)
            .status()
            .with_context(|| format!("failed to run speech command {program}"))?;
        if !status.success() {
            bail!("speech command {program} exited with {status}");
        }
        Ok(())
    }

    fn cue_path(&self, cue: Cue) -> Result<Option<PathBuf>> {
        let Some(dir) = self.config.sounds_dir.as_deref() else {
            return Ok(None);
        };
        let path = Config::expand_path(dir)?.join(cue.file_name());
        Ok(path.exists().then_some(path))
    }

    fn play(&self, cue: Cue) -> Result<bool> {
        let (Some(player), Some(path)) = (self.config.player.as_deref(), self.cue_path(cue)?) else {
            return Ok(false);
        };
        let status = Command::new(player)
            .arg(&path)
            .status()
            .with_context(|| format!("failed to run sound player {player}"))?;
        if !status.success() {
            bail!("sound player {player} exited with {status} for {}", path.display());
        }
        Ok(true)
    }
}

impl Announcer for CommandAnnouncer {
    fn announce(&mut self, text: &str) -> Result<()> {
        self.console.announce(text)?;
        if !self.config.enabled {
            return Ok(());
        }
        if let Err(e) = self.speak(text) {
            warn!(error = %e, "speech failed");
        }
        Ok(())
    }

    fn play_cue(&mut self, cue: Cue) -> Result<()> {
        self.console.play_cue(cue)?;
        if !self.config.enabled {
            return Ok(());
        }
        match self.play(cue) {
            Ok(true) => debug!(?cue, "cue played"),
            Ok(false) => {
                if let Err(e) = self.speak(&cue.spoken()) {
                    warn!(error = %e, "cue speech failed");
                }
            }
            Err(e) => warn!(error = %e, ?cue, "cue playback failed"),
        }
        Ok(())
    }
}
