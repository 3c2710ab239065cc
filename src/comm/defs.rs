/* =======================================================================
Rustic is a chess playing engine.
Copyright (C) 2019-2024, Marcel Vanthoor
https://rustic-chess.org/

Rustic is written in the Rust programming language. It is an original
work, not derived from any engine that came before it. However, it does
use a lot of concepts which are well-known and are in use by most if not
all classical alpha/beta-based chess engines.

Rustic is free software: you can redistribute it and/or modify it under
the terms of the GNU General Public License version 3 as published by
the Free Software Foundation.

Rustic is distributed in the hope that it will be useful, but WITHOUT
ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License
for more details.

You should have received a copy of the GNU General Public License along
with this program.  If not, see <http://www.gnu.org/licenses/>.
======================================================================= */

use chrono::Local;
use std::{
    fs::{create_dir_all, OpenOptions},
    io::Write,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

// Commands the front-end understands, already tokenized into what the
// engine needs to act on them.
#[derive(Debug, PartialEq, Eq)]
pub enum UciCommand {
    Uci,
    IsReady,
    NewGame,
    Debug(bool),
    Print,
    Quit,
    SetOption { name: String, value: String },
    Position { fen: Option<String>, moves: Vec<String> },
    Go(GoCommand),
    Unknown(String),
}

#[derive(Debug, PartialEq, Eq)]
pub enum GoCommand {
    Depth(i8),
    Infinite,
    MoveTime(u128),
    GameTime {
        wtime: u128,
        btime: u128,
        winc: u128,
        binc: u128,
    },
    Perft(u8),
}

// Rolling session log: every received command and every emitted
// response line lands in logs/EngineLog-<unix millis>.txt with a
// wall-clock timestamp. Logging must never take the engine down, so
// all I/O errors are swallowed.
pub struct EngineLog {
    path: PathBuf,
}

impl EngineLog {
    pub fn new() -> Self {
        let _ = create_dir_all("logs");
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_millis())
            .unwrap_or(0);
        Self {
            path: PathBuf::from(format!("logs/EngineLog-{millis}.txt")),
        }
    }

    pub fn write(&self, message: &str) {
        if message.is_empty() {
            return;
        }
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let timestamp = Local::now().format("%H:%M:%S%.3f");
            let _ = writeln!(file, "{timestamp} | {message}");
        }
    }
}

impl Default for EngineLog {
    fn default() -> Self {
        Self::new()
    }
}
