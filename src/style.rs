// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Human-readable output.
//!
//! Listings and status messages are purely cosmetic. Nothing in dorg depends
//! on them for correctness, so they are handed in as a [`Presenter`] instead
//! of being printed directly.

use colored::Colorize;

/// Render human-readable progress.
pub trait Presenter {
    /// Render section heading.
    fn heading(&mut self, text: &str);

    /// Render final success message.
    fn success(&mut self, text: &str);

    /// Render one listed item.
    fn item(&mut self, text: &str);
}

/// Colored output on stdout.
#[derive(Debug, Default, Clone)]
pub struct Terminal;

impl Presenter for Terminal {
    fn heading(&mut self, text: &str) {
        println!("\n{}\n", format!("▌{text}").blue().bold());
    }

    fn success(&mut self, text: &str) {
        println!("\n{}\n", text.bold());
    }

    fn item(&mut self, text: &str) {
        println!("  {} {text}", "✔︎".green());
    }
}

/// No output at all.
#[derive(Debug, Default, Clone)]
pub struct Quiet;

impl Presenter for Quiet {
    fn heading(&mut self, _: &str) {}

    fn success(&mut self, _: &str) {}

    fn item(&mut self, _: &str) {}
}
