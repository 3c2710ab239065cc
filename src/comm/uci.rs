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

use super::defs::{EngineLog, GoCommand, UciCommand};
use crate::{
    defs::About,
    engine::defs::{EngineOptionDefaults, ErrFatal},
};
use if_chain::if_chain;
use std::io::{self, BufRead, Write};

// Newline-delimited text protocol on stdin/stdout, UCI dialect. The
// command loop is synchronous: read, parse, hand the command to the
// engine, print whatever it answers.
pub struct Uci {
    log: EngineLog,
}

impl Uci {
    pub fn new() -> Self {
        Self {
            log: EngineLog::new(),
        }
    }

    // Block until the next input line; the line is logged verbatim.
    // A closed stdin reads as a quit so the engine shuts down cleanly
    // when the GUI goes away.
    pub fn read_line(&self) -> String {
        let mut line = String::new();
        let bytes = io::stdin()
            .lock()
            .read_line(&mut line)
            .expect(ErrFatal::READ_IO);
        if bytes == 0 {
            return "quit".to_string();
        }
        let line = line.trim().to_string();
        self.log.write(&line);
        line
    }

    // Print a response line (or block) and log it.
    pub fn respond(&self, message: &str) {
        if message.is_empty() {
            return;
        }
        self.log.write(message);
        println!("{message}");
        let _ = io::stdout().flush();
    }

    pub fn identify(&self) {
        self.respond(&format!("id name {} {}", About::ENGINE, About::VERSION));
        self.respond(&format!("id author {}", About::AUTHOR));
        self.respond(&format!(
            "option name Hash type spin default {} min {} max {}",
            EngineOptionDefaults::HASH_DEFAULT,
            EngineOptionDefaults::HASH_MIN,
            EngineOptionDefaults::HASH_MAX
        ));
        self.respond(&format!(
            "option name MaxSearchTime type spin default {} min {} max {}",
            EngineOptionDefaults::MAX_SEARCH_TIME_DEFAULT,
            EngineOptionDefaults::MAX_SEARCH_TIME_MIN,
            EngineOptionDefaults::MAX_SEARCH_TIME_MAX
        ));
        self.respond("uciok");
    }

    pub fn parse(line: &str) -> UciCommand {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(&command) = tokens.first() else {
            return UciCommand::Unknown(String::new());
        };

        match command.to_lowercase().as_str() {
            "uci" => UciCommand::Uci,
            "isready" => UciCommand::IsReady,
            "ucinewgame" => UciCommand::NewGame,
            "print" => UciCommand::Print,
            "quit" => UciCommand::Quit,
            "debug" => UciCommand::Debug(tokens.get(1) == Some(&"on")),
            "setoption" => Self::parse_setoption(&tokens, line),
            "position" => Self::parse_position(&tokens, line),
            "go" => Self::parse_go(&tokens, line),
            _ => UciCommand::Unknown(line.to_string()),
        }
    }

    fn parse_setoption(tokens: &[&str], line: &str) -> UciCommand {
        if_chain! {
            if tokens.len() >= 5;
            if tokens[1].eq_ignore_ascii_case("name");
            if tokens[3].eq_ignore_ascii_case("value");
            then {
                UciCommand::SetOption {
                    name: tokens[2].to_lowercase(),
                    value: tokens[4].to_string(),
                }
            } else {
                UciCommand::Unknown(line.to_string())
            }
        }
    }

    fn parse_position(tokens: &[&str], line: &str) -> UciCommand {
        let moves_at = tokens.iter().position(|&token| token == "moves");
        let moves = match moves_at {
            Some(index) => tokens[index + 1..]
                .iter()
                .map(|&token| token.to_string())
                .collect(),
            None => Vec::new(),
        };

        match tokens.get(1) {
            Some(&"startpos") => UciCommand::Position { fen: None, moves },
            Some(&"fen") => {
                let fen_end = moves_at.unwrap_or(tokens.len());
                if fen_end <= 2 {
                    return UciCommand::Unknown(line.to_string());
                }
                let fen = tokens[2..fen_end].join(" ");
                UciCommand::Position {
                    fen: Some(fen),
                    moves,
                }
            }
            _ => UciCommand::Unknown(line.to_string()),
        }
    }

    fn parse_go(tokens: &[&str], line: &str) -> UciCommand {
        let number_after = |keyword: &str| -> Option<u128> {
            tokens
                .iter()
                .position(|&token| token.eq_ignore_ascii_case(keyword))
                .and_then(|index| tokens.get(index + 1))
                .and_then(|value| value.parse::<u128>().ok())
        };

        match tokens.get(1).map(|token| token.to_lowercase()).as_deref() {
            Some("depth") => {
                if let Some(depth) = number_after("depth") {
                    UciCommand::Go(GoCommand::Depth(depth.min(i8::MAX as u128) as i8))
                } else {
                    UciCommand::Unknown(line.to_string())
                }
            }
            Some("infinite") => UciCommand::Go(GoCommand::Infinite),
            Some("movetime") => {
                if let Some(movetime) = number_after("movetime") {
                    UciCommand::Go(GoCommand::MoveTime(movetime))
                } else {
                    UciCommand::Unknown(line.to_string())
                }
            }
            Some("perft") => {
                if let Some(depth) = number_after("perft") {
                    UciCommand::Go(GoCommand::Perft(depth.min(u8::MAX as u128) as u8))
                } else {
                    UciCommand::Unknown(line.to_string())
                }
            }
            Some("wtime") | Some("btime") => UciCommand::Go(GoCommand::GameTime {
                wtime: number_after("wtime").unwrap_or(0),
                btime: number_after("btime").unwrap_or(0),
                winc: number_after("winc").unwrap_or(0),
                binc: number_after("binc").unwrap_or(0),
            }),
            _ => UciCommand::Unknown(line.to_string()),
        }
    }
}

impl Default for Uci {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_commands_parse() {
        assert_eq!(Uci::parse("uci"), UciCommand::Uci);
        assert_eq!(Uci::parse("isready"), UciCommand::IsReady);
        assert_eq!(Uci::parse("ucinewgame"), UciCommand::NewGame);
        assert_eq!(Uci::parse("debug on"), UciCommand::Debug(true));
        assert_eq!(Uci::parse("debug off"), UciCommand::Debug(false));
        assert_eq!(Uci::parse("quit"), UciCommand::Quit);
        assert!(matches!(Uci::parse("frobnicate"), UciCommand::Unknown(_)));
    }

    #[test]
    fn setoption_needs_name_and_value() {
        assert_eq!(
            Uci::parse("setoption name Hash value 64"),
            UciCommand::SetOption {
                name: "hash".to_string(),
                value: "64".to_string()
            }
        );
        assert!(matches!(
            Uci::parse("setoption Hash 64"),
            UciCommand::Unknown(_)
        ));
    }

    #[test]
    fn position_variants_parse() {
        assert_eq!(
            Uci::parse("position startpos moves e2e4 e7e5"),
            UciCommand::Position {
                fen: None,
                moves: vec!["e2e4".to_string(), "e7e5".to_string()]
            }
        );

        let fen = "8/8/8/8/8/6k1/4K2R/8 w - - 0 1";
        assert_eq!(
            Uci::parse(&format!("position fen {fen}")),
            UciCommand::Position {
                fen: Some(fen.to_string()),
                moves: Vec::new()
            }
        );
        assert_eq!(
            Uci::parse(&format!("position fen {fen} moves h2h7")),
            UciCommand::Position {
                fen: Some(fen.to_string()),
                moves: vec!["h2h7".to_string()]
            }
        );
    }

    #[test]
    fn go_variants_parse() {
        assert_eq!(Uci::parse("go depth 6"), UciCommand::Go(GoCommand::Depth(6)));
        assert_eq!(Uci::parse("go infinite"), UciCommand::Go(GoCommand::Infinite));
        assert_eq!(
            Uci::parse("go movetime 3000"),
            UciCommand::Go(GoCommand::MoveTime(3000))
        );
        assert_eq!(Uci::parse("go perft 5"), UciCommand::Go(GoCommand::Perft(5)));
        assert_eq!(
            Uci::parse("go wtime 60000 btime 55000 winc 1000 binc 1000"),
            UciCommand::Go(GoCommand::GameTime {
                wtime: 60000,
                btime: 55000,
                winc: 1000,
                binc: 1000
            })
        );
    }
}
