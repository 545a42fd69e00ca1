use anifold::data::Candidate;
use colored::*;
use std::io::{self, BufRead, Write};

/// Prints `prompt` and reads one line. `None` means stdin is closed.
pub fn read_line(prompt: &str) -> io::Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    let read = io::stdin().lock().read_line(&mut input)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

/// Blocks until ENTER. A closed or failing stdin does not block.
pub fn wait_for_enter(message: &str) {
    if let Err(e) = read_line(message) {
        tracing::debug!("stdin unavailable: {}", e);
    }
}

/// Maps the user's answer to a 0-based index; blank or out-of-range picks the first.
pub fn parse_choice(input: &str, count: usize) -> usize {
    match input.trim().parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => n - 1,
        _ => 0,
    }
}

/// Lets the user pick one of `results`, falling back to `guess` when there are none.
pub fn choose_candidate(guess: &str, results: &[Candidate]) -> String {
    match results {
        [] => {
            println!("{}\n", "❌ No results! Using best guess.".red());
            guess.to_string()
        }
        [only] => {
            println!("{}\n", format!("✨ Found: {}", only).green());
            only.title.clone()
        }
        _ => {
            println!("\n{}", format!("🎯 Found {} results:", results.len()).yellow());
            for (idx, candidate) in results.iter().enumerate() {
                println!("  {}", describe(idx + 1, candidate));
            }

            let answer = read_line(&format!("\n{}", "👉 Choose (Enter for #1): ".magenta()))
                .ok()
                .flatten()
                .unwrap_or_default();
            results[parse_choice(&answer, results.len())].title.clone()
        }
    }
}

fn describe(number: usize, candidate: &Candidate) -> String {
    let mut line = format!("{} {}", format!("{}.", number).bold(), candidate.title);
    if let Some(year) = candidate.year {
        line.push_str(&format!(" {}", format!("({})", year).cyan()));
    }
    if let Some(score) = candidate.score.filter(|s| *s > 0.0) {
        line.push_str(&format!(" {}", format!("⭐{}", score).yellow()));
    }
    line
}
