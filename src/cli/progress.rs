use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Instant;

const NAME_WIDTH: usize = 20;
const BAR_TEMPLATE: &str = "{prefix:.bold.cyan}: |{bar:40.cyan}| {percent}% ({pos}/{len}) {msg}";

pub struct ProgressIndicator {
    bar: ProgressBar,
    total: usize,
    completed: usize,
    failed: usize,
    start_time: Instant,
}

impl ProgressIndicator {
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template(BAR_TEMPLATE)
                .expect("valid progress template")
                .progress_chars("█░"),
        );
        bar.set_prefix("🔄 Processing");

        Self {
            bar,
            total,
            completed: 0,
            failed: 0,
            start_time: Instant::now(),
        }
    }

    pub fn start_item(&self, name: &str) {
        self.bar.set_message(short_name(name));
    }

    /// Runs `f` with the bar cleared so its output and prompts are not overdrawn.
    pub fn suspend<R>(&self, f: impl FnOnce() -> R) -> R {
        self.bar.suspend(f)
    }

    pub fn complete_item(&mut self, name: &str, success: bool) {
        let mark = if success {
            self.completed += 1;
            "✅"
        } else {
            self.failed += 1;
            "❌"
        };
        self.bar.inc(1);
        self.bar.set_message(format!("{} {}", mark, short_name(name)));
    }

    pub fn succeeded(&self) -> usize {
        self.completed
    }

    pub fn finish(&self) {
        self.bar.set_prefix("✅ All Done");
        self.bar.finish_with_message("");

        let elapsed = self.start_time.elapsed();
        println!("\n{}", "=".repeat(60).bold().green());
        println!("{}", celebration(self.completed, self.total).bold());
        println!(
            "{}",
            format!(
                "📊 Results: {}/{} anime folders processed successfully",
                self.completed, self.total
            )
            .bold()
            .green()
        );
        println!("  Failed:    {}", self.failed);
        println!("  Duration:  {:.2}s", elapsed.as_secs_f64());
    }
}

fn short_name(name: &str) -> String {
    name.chars().take(NAME_WIDTH).collect()
}

/// Closing line for a batch run, picked by success rate.
pub fn celebration(successful: usize, total: usize) -> ColoredString {
    let rate = if total > 0 {
        successful as f64 / total as f64
    } else {
        0.0
    };

    if rate >= 0.9 {
        "🏆 Perfect! All folders upgraded! 🏆".green()
    } else if rate >= 0.7 {
        "🎯 Great job! Mission accomplished! 🎯".green()
    } else if rate >= 0.5 {
        "💪 Good work! Halfway to greatness! 💪".yellow()
    } else if rate > 0.0 {
        "🔥 You're on fire! Keep going! 🔥".yellow()
    } else {
        "😅 Don't worry, we can try again! 😅".red()
    }
}
