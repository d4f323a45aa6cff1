//! Music player over a fixed playlist. Playback itself is an external embed.

use crate::applets::{Applet, AppletContext, arg, unknown_command};
use crate::error::Result;
use crate::registry::AppId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Track {
    pub title: &'static str,
    pub artist: &'static str,
    /// Embed id; empty when the track has no video.
    pub video_id: &'static str,
}

pub const PLAYLIST: [Track; 4] = [
    Track {
        title: "You Only Live Once",
        artist: "The Strokes",
        video_id: "",
    },
    Track {
        title: "I was running through the six",
        artist: "Drake",
        video_id: "jqScSp5l-AQ",
    },
    Track {
        title: "Undercover",
        artist: "Lane 8",
        video_id: "HSydHbGdIcY",
    },
    Track {
        title: "King of Everything",
        artist: "Wiz Khalifa",
        video_id: "8d0cm_hcQes",
    },
];

const DEFAULT_VOLUME: u8 = 50;

pub struct MusicApplet {
    index: usize,
    playing: bool,
    volume: u8,
}

impl MusicApplet {
    pub fn new() -> Self {
        Self {
            index: 0,
            playing: false,
            volume: DEFAULT_VOLUME,
        }
    }

    pub fn current(&self) -> Track {
        PLAYLIST[self.index]
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn toggle(&mut self) {
        self.playing = !self.playing;
    }

    /// Skip forward, wrapping, and start playing.
    pub fn next(&mut self) {
        self.index = (self.index + 1) % PLAYLIST.len();
        self.playing = true;
    }

    pub fn prev(&mut self) {
        self.index = self.index.checked_sub(1).unwrap_or(PLAYLIST.len() - 1);
        self.playing = true;
    }

    pub fn set_volume(&mut self, volume: i64) {
        self.volume = volume.clamp(0, 100) as u8;
    }
}

impl Default for MusicApplet {
    fn default() -> Self {
        Self::new()
    }
}

impl Applet for MusicApplet {
    fn id(&self) -> AppId {
        AppId::Music
    }

    fn on_unmount(&mut self, _cx: &mut AppletContext<'_>) {
        self.playing = false;
    }

    fn handle(&mut self, command: &str, args: &[&str], _cx: &mut AppletContext<'_>) -> Result<()> {
        match command {
            "play" => self.playing = true,
            "pause" => self.playing = false,
            "toggle" => self.toggle(),
            "next" => self.next(),
            "prev" => self.prev(),
            "volume" => self.set_volume(arg(args, 0, "volume")?),
            other => return Err(unknown_command(self.id(), other)),
        }
        Ok(())
    }

    fn view(&self) -> Vec<String> {
        let track = self.current();
        let mut lines = vec![track.title.to_string(), track.artist.to_string()];
        if !track.video_id.is_empty() {
            lines.push(format!("https://www.youtube.com/embed/{}", track.video_id));
        }
        lines.push(format!(
            "|<<   {}   >>|   vol {}",
            if self.playing { "||" } else { ">" },
            self.volume
        ));
        lines
    }
}
