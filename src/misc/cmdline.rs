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

use crate::{defs::About, engine::defs::EngineOptionDefaults};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

// Consts for command line options, flags and arguments

struct CmdLineArgs {}
impl CmdLineArgs {
    // FEN
    const FEN_LONG: &'static str = "fen";
    const FEN_SHORT: char = 'f';
    const FEN_HELP: &'static str = "Set up the given position";

    // Perft
    const PERFT_LONG: &'static str = "perft";
    const PERFT_SHORT: char = 'p';
    const PERFT_HELP: &'static str = "Run perft to the given depth";
    const PERFT_DEFAULT: i8 = 0;

    // Hash: long-form only, -h belongs to clap's help flag.
    const HASH_LONG: &'static str = "hash";
    const HASH_HELP: &'static str = "Transposition Table size in MB";
    const HASH_DEFAULT: usize = EngineOptionDefaults::HASH_DEFAULT;

    // Quiet (no search stats updates except on depth change)
    const QUIET_LONG: &'static str = "quiet";
    const QUIET_SHORT: char = 'q';
    const QUIET_HELP: &'static str = "No intermediate search stats updates";

    // Kiwipete
    const KIWI_LONG: &'static str = "kiwipete";
    const KIWI_SHORT: char = 'k';
    const KIWI_HELP: &'static str = "Set up KiwiPete position (ignore --fen)";
}

pub struct CmdLine {
    arguments: ArgMatches,
}

impl CmdLine {
    pub fn new() -> Self {
        Self {
            arguments: Self::get(),
        }
    }

    pub fn fen(&self) -> Option<String> {
        self.arguments
            .get_one::<String>(CmdLineArgs::FEN_LONG)
            .cloned()
    }

    pub fn perft(&self) -> i8 {
        *self
            .arguments
            .get_one::<i8>(CmdLineArgs::PERFT_LONG)
            .unwrap_or(&CmdLineArgs::PERFT_DEFAULT)
    }

    pub fn hash(&self) -> usize {
        *self
            .arguments
            .get_one::<usize>(CmdLineArgs::HASH_LONG)
            .unwrap_or(&CmdLineArgs::HASH_DEFAULT)
    }

    pub fn quiet(&self) -> bool {
        self.arguments.get_flag(CmdLineArgs::QUIET_LONG)
    }

    pub fn kiwipete(&self) -> bool {
        self.arguments.get_flag(CmdLineArgs::KIWI_LONG)
    }

    fn get() -> ArgMatches {
        Command::new(About::ENGINE)
            .version(About::VERSION)
            .author(About::AUTHOR)
            .arg(
                Arg::new(CmdLineArgs::FEN_LONG)
                    .short(CmdLineArgs::FEN_SHORT)
                    .long(CmdLineArgs::FEN_LONG)
                    .help(CmdLineArgs::FEN_HELP)
                    .num_args(1)
                    .value_parser(value_parser!(String)),
            )
            .arg(
                Arg::new(CmdLineArgs::PERFT_LONG)
                    .short(CmdLineArgs::PERFT_SHORT)
                    .long(CmdLineArgs::PERFT_LONG)
                    .help(CmdLineArgs::PERFT_HELP)
                    .num_args(1)
                    .default_value("0")
                    .value_parser(value_parser!(i8)),
            )
            .arg(
                Arg::new(CmdLineArgs::HASH_LONG)
                    .long(CmdLineArgs::HASH_LONG)
                    .help(CmdLineArgs::HASH_HELP)
                    .num_args(1)
                    .default_value("256")
                    .value_parser(value_parser!(usize)),
            )
            .arg(
                Arg::new(CmdLineArgs::QUIET_LONG)
                    .short(CmdLineArgs::QUIET_SHORT)
                    .long(CmdLineArgs::QUIET_LONG)
                    .help(CmdLineArgs::QUIET_HELP)
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new(CmdLineArgs::KIWI_LONG)
                    .short(CmdLineArgs::KIWI_SHORT)
                    .long(CmdLineArgs::KIWI_LONG)
                    .help(CmdLineArgs::KIWI_HELP)
                    .action(ArgAction::SetTrue),
            )
            .get_matches()
    }
}

impl Default for CmdLine {
    fn default() -> Self {
        Self::new()
    }
}
