use std::io::{self, Write};

use colored::Colorize;

use crate::errors::{ClientError, Result};
use crate::utils::theme::{Palette, Theme};

/// Terminal output in the active theme's colours.
#[derive(Debug, Clone, Copy)]
pub struct Console {
    theme: Theme,
    palette: Palette,
}

impl Console {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            palette: theme.palette(),
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    pub fn print_header(&self, title: &str) {
        println!("{}", "=".repeat(60).color(self.palette.muted));
        println!("{}", format!("  {}", title).color(self.palette.heading).bold());
        println!("{}", "=".repeat(60).color(self.palette.muted));
    }

    pub fn print_success(&self, message: &str) {
        println!("{} {}", "✔".color(self.palette.success), message.color(self.palette.success));
    }

    pub fn print_error(&self, message: &str) {
        eprintln!("{} {}", "✘".color(self.palette.error), message.color(self.palette.error));
    }

    pub fn print_info(&self, message: &str) {
        println!("{} {}", "ℹ".color(self.palette.accent), message);
    }

    pub fn heading(&self, text: &str) -> String {
        text.color(self.palette.heading).bold().to_string()
    }

    pub fn accent(&self, text: &str) -> String {
        text.color(self.palette.accent).to_string()
    }

    pub fn muted(&self, text: &str) -> String {
        text.color(self.palette.muted).to_string()
    }

    /// Prompts for one line; `None` once input is exhausted.
    pub fn read_line(&self, prompt: &str) -> Result<Option<String>> {
        print!("{} ", prompt.color(self.palette.accent));
        io::stdout()
            .flush()
            .map_err(|e| ClientError::InvalidInput(format!("IO error: {}", e)))?;

        let mut input = String::new();
        let read = io::stdin()
            .read_line(&mut input)
            .map_err(|e| ClientError::InvalidInput(format!("Failed to read input: {}", e)))?;
        Ok((read > 0).then(|| input.trim().to_string()))
    }

    pub fn get_input(&self, prompt: &str) -> Result<String> {
        Ok(self.read_line(prompt)?.unwrap_or_default())
    }

    pub fn get_password(&self, prompt: &str) -> Result<String> {
        print!("{} ", prompt.color(self.palette.accent));
        io::stdout()
            .flush()
            .map_err(|e| ClientError::InvalidInput(format!("IO error: {}", e)))?;

        rpassword::read_password()
            .map_err(|e| ClientError::InvalidInput(format!("Failed to read password: {}", e)))
    }

    pub fn confirm_action(&self, prompt: &str) -> Result<bool> {
        loop {
            let Some(input) = self.read_line(&format!("{} (y/n):", prompt))? else {
                return Ok(false);
            };
            match input.to_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.print_error("Please enter 'y' for yes or 'n' for no"),
            }
        }
    }
}
