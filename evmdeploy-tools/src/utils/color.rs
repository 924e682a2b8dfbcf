// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! ANSI color helpers for status lines.

use std::fmt::{Debug, Display};

pub const BLUE: &str = "\x1b[34;1m";
pub const GREY: &str = "\x1b[0;0m";
pub const LAVENDER: &str = "\x1b[38;5;183;1m";
pub const MINT: &str = "\x1b[38;5;48;1m";
pub const PINK: &str = "\x1b[38;5;161;1m";
pub const RED: &str = "\x1b[31;1m";
pub const YELLOW: &str = "\x1b[33;1m";

pub trait Color: Display {
    fn color(&self, color: &str) -> String {
        format!("{color}{self}{GREY}")
    }
    fn blue(&self) -> String {
        self.color(BLUE)
    }
    fn grey(&self) -> String {
        self.color(GREY)
    }
    fn lavender(&self) -> String {
        self.color(LAVENDER)
    }
    fn mint(&self) -> String {
        self.color(MINT)
    }
    fn pink(&self) -> String {
        self.color(PINK)
    }
    fn red(&self) -> String {
        self.color(RED)
    }
    fn yellow(&self) -> String {
        self.color(YELLOW)
    }
}

impl<T: Display> Color for T {}

/// Like [`Color`], but using the [`Debug`] rendering of the value.
pub trait DebugColor: Debug {
    fn debug_color(&self, color: &str) -> String {
        format!("{color}{self:?}{GREY}")
    }
    fn debug_lavender(&self) -> String {
        self.debug_color(LAVENDER)
    }
    fn debug_mint(&self) -> String {
        self.debug_color(MINT)
    }
    fn debug_red(&self) -> String {
        self.debug_color(RED)
    }
    fn debug_yellow(&self) -> String {
        self.debug_color(YELLOW)
    }
}

impl<T: Debug> DebugColor for T {}
