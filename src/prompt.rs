//! Interactive stdin prompts.
//!
//! Reads block, so each one runs on the blocking pool and the Ctrl-C race in
//! `main` stays responsive.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, bail};
use colored::Colorize;
use version_compare::Environment;
use version_compare::environment::is_known;

/// Prints `prompt` and reads one trimmed line. `None` on end of input.
pub async fn read_line(prompt: impl Into<String>) -> Result<Option<String>> {
    let prompt = prompt.into();
    tokio::task::spawn_blocking(move || -> io::Result<Option<String>> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "{prompt}")?;
        stdout.flush()?;

        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        Ok((read > 0).then(|| line.trim().to_string()))
    })
    .await
    .context("prompt task failed")?
    .context("failed to read from stdin")
}

/// `y` / `yes`, case-insensitive.
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// `(y/N)` question; end of input counts as no.
pub async fn confirm(question: &str) -> Result<bool> {
    let answer = read_line(format!("{question} (y/N): ")).await?;
    Ok(answer.as_deref().is_some_and(is_yes))
}

#[derive(Debug, PartialEq, Eq)]
pub enum MenuChoice {
    Empty,
    Selected(usize),
    OutOfRange,
    NotANumber,
}

/// Interprets a 1-based menu answer for `len` entries.
pub fn parse_menu_choice(input: &str, len: usize) -> MenuChoice {
    let input = input.trim();
    if input.is_empty() {
        return MenuChoice::Empty;
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=len).contains(&n) => MenuChoice::Selected(n - 1),
        Ok(_) => MenuChoice::OutOfRange,
        Err(_) => MenuChoice::NotANumber,
    }
}

/// Numbered environment menu; loops until a valid choice.
pub async fn select_environment() -> Result<Environment> {
    let envs = Environment::ALL;
    let rule = "-".repeat(30);

    println!("\nAvailable environments:");
    println!("{rule}");
    for (i, env) in envs.iter().enumerate() {
        println!("{}. {env}", i + 1);
    }
    println!("{rule}");

    loop {
        let Some(answer) = read_line(format!("Select environment [1-{}]: ", envs.len())).await?
        else {
            bail!("no environment selected");
        };
        match parse_menu_choice(&answer, envs.len()) {
            MenuChoice::Selected(i) => {
                println!("Selected: {}", envs[i]);
                return Ok(envs[i]);
            }
            MenuChoice::Empty => continue,
            MenuChoice::OutOfRange => println!("Please enter a number between 1 and {}", envs.len()),
            MenuChoice::NotANumber => println!("Please enter a valid number"),
        }
    }
}

/// Resolves the environment host: menu when absent, confirmation when the
/// given host is not in the catalogue. `None` means the user declined.
pub async fn resolve_environment(given: Option<&str>, force_menu: bool) -> Result<Option<String>> {
    let host = match given {
        Some(host) if !force_menu => host.to_string(),
        _ => return Ok(Some(select_environment().await?.host().to_string())),
    };

    if is_known(&host) {
        return Ok(Some(host));
    }

    println!(
        "{}",
        format!("Warning: '{host}' is not in the predefined environment list.").yellow()
    );
    println!(
        "Valid environments: {}",
        Environment::hosts().collect::<Vec<_>>().join(", ")
    );
    if confirm("Continue anyway?").await? {
        Ok(Some(host))
    } else {
        println!("Operation cancelled.");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_answers() {
        assert_eq!(parse_menu_choice(" 2 ", 4), MenuChoice::Selected(1));
        assert_eq!(parse_menu_choice("", 4), MenuChoice::Empty);
        assert_eq!(parse_menu_choice("0", 4), MenuChoice::OutOfRange);
        assert_eq!(parse_menu_choice("5", 4), MenuChoice::OutOfRange);
        assert_eq!(parse_menu_choice("two", 4), MenuChoice::NotANumber);
    }

    #[test]
    fn yes_answers() {
        assert!(is_yes("Y"));
        assert!(is_yes(" yes "));
        assert!(!is_yes(""));
        assert!(!is_yes("nope"));
    }
}
