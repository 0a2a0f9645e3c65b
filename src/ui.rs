use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use colored::*;
use crossterm::{
    cursor::{MoveTo, MoveToColumn, MoveUp, RestorePosition, SavePosition},
    execute, queue,
    style::Print,
    terminal::{Clear, ClearType},
};
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::celebration::{Celebration, CelebrationHandle, confetti_line};
use crate::config::UIConfig;
use crate::event_bus::Metrics;
use crate::idea::{Card, CardKind, Idea, Outcome};
use crate::profile::Field;
use crate::prompt::Mode;
use crate::session::{Phase, Session};

const WIDTH: usize = 72;

/// Terminal front end: the form, the spinner and the result views.
pub struct TerminalUI {
    config: UIConfig,
    spinner: Option<ProgressBar>,
    celebration: Option<CelebrationHandle>,
}

impl TerminalUI {
    pub fn new(config: UIConfig) -> Self {
        if !config.colorful {
            colored::control::set_override(false);
        }
        Self {
            config,
            spinner: None,
            celebration: None,
        }
    }

    pub fn start(&self, mode: Mode) -> Result<()> {
        if self.config.colorful {
            execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0))?;
        }
        println!("{}", "=".repeat(WIDTH).bright_blue());
        println!("{}", "IDEAVIBE".bright_white().bold());
        println!("{}", "Build the next unicorn. 500x potential.".bright_black());
        if mode == Mode::Game {
            println!(
                "{}",
                "Three startups, one unicorn. Pick wisely: you only get one card."
                    .bright_black()
            );
        }
        println!("{}", "=".repeat(WIDTH).bright_blue());
        println!();
        Ok(())
    }

    /// Ask for one profile field. An empty answer keeps `current`. `None` on end of input.
    pub fn ask_field(&self, field: Field, current: &str) -> Result<Option<String>> {
        let hint = if current.trim().is_empty() {
            format!("({})", field.example())
        } else {
            format!("[{}]", current)
        };
        let question = format!(
            "{} {}",
            format!("{}:", field.label()).cyan().bold(),
            hint.bright_black()
        );
        Ok(read_answer(&question)?.map(|answer| resolve_answer(&answer, current)))
    }

    /// Ask which card to flip; returns a zero-based index. `None` on end of input.
    pub fn ask_card(&self, count: usize) -> Result<Option<usize>> {
        loop {
            let question = format!("{} ", format!("Pick a card [1-{}]:", count).cyan().bold());
            let Some(answer) = read_answer(&question)? else {
                return Ok(None);
            };
            match answer.trim().parse::<usize>() {
                Ok(n) if (1..=count).contains(&n) => return Ok(Some(n - 1)),
                _ => println!("{}", format!("Enter a number from 1 to {}.", count).yellow()),
            }
        }
    }

    pub fn confirm(&self, question: &str) -> Result<bool> {
        let question = format!("{} ", format!("{} [y/N]", question).cyan().bold());
        Ok(read_answer(&question)?
            .map(|answer| matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
            .unwrap_or(false))
    }

    pub fn start_loading(&mut self, model: &str) {
        let message = format!("Analyzing profile with {}... looking for 500x potential...", model);
        if !self.config.spinner {
            println!("{}", message);
            return;
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.magenta} [{elapsed}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message);
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(spinner);
    }

    pub fn finish_loading(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    pub fn display_error(&self, error: &str) {
        println!("{} {}", "✗ Error:".red().bold(), error.red());
    }

    /// Print whatever the session currently has to show.
    pub fn render(&self, session: &Session) {
        if let Some(error) = session.error() {
            self.display_error(error);
        }
        match session.phase() {
            Phase::Input { .. } | Phase::Loading => {}
            Phase::Listing => {
                println!();
                println!("{}", "Your Best-Fit Startups".bright_white().bold());
                for (index, idea) in session.ideas().iter().enumerate() {
                    println!("{}", format_idea(index, idea));
                }
            }
            Phase::Playing | Phase::Resolved(_) => {
                println!();
                for (index, card) in session.cards().iter().enumerate() {
                    println!("{}", format_card(index, card));
                }
                if let Some(outcome) = session.outcome() {
                    println!();
                    println!("{}", format_outcome(outcome));
                }
            }
        }
    }

    /// Fire the confetti and return immediately. The animation redraws a single
    /// line reserved above whatever is printed next, so prompts stay in place.
    pub fn celebrate(&mut self) {
        if !self.config.celebration {
            return;
        }
        println!();
        let celebration = Celebration::new(Duration::from_millis(self.config.celebration_frame_ms));
        let last = celebration.frame_count() - 1;
        let mut rng = StdRng::from_os_rng();
        let handle = celebration.launch(move |frame| {
            let line = if frame == last {
                String::new()
            } else {
                confetti_line(WIDTH, &mut rng)
            };
            let _ = draw_above_cursor(&line);
        });
        self.celebration = Some(handle);
    }

    /// Stop redrawing confetti once the line below it has been answered.
    pub fn end_celebration(&mut self) {
        if let Some(handle) = self.celebration.take() {
            handle.stop();
        }
    }

    pub fn finish(&self, metrics: &Metrics) {
        println!();
        println!("{}", "=".repeat(WIDTH).bright_blue());
        println!("{}", "Session Summary".bright_white().bold());
        println!("{}", "=".repeat(WIDTH).bright_blue());
        println!(
            "🤖 API Calls: {}  🪙  Tokens (est.): {}",
            metrics.total_api_calls.to_string().bright_cyan(),
            metrics.total_tokens.to_string().bright_cyan()
        );
        println!(
            "✅ Generations: {}  ❌ Failed: {}",
            metrics.generations_succeeded.to_string().bright_green(),
            metrics.generations_failed.to_string().bright_red()
        );
        if metrics.games_won + metrics.games_lost > 0 {
            println!(
                "🦄 Won: {}  💩 Lost: {}",
                metrics.games_won.to_string().bright_magenta(),
                metrics.games_lost.to_string().bright_yellow()
            );
        }
    }
}

/// Keep the current value when the answer is blank.
pub fn resolve_answer(answer: &str, current: &str) -> String {
    if answer.trim().is_empty() {
        current.to_string()
    } else {
        answer.to_string()
    }
}

fn draw_above_cursor(line: &str) -> io::Result<()> {
    let mut out = io::stdout().lock();
    queue!(
        out,
        SavePosition,
        MoveUp(1),
        MoveToColumn(0),
        Clear(ClearType::CurrentLine),
        Print(line),
        RestorePosition
    )?;
    out.flush()
}

fn read_answer(question: &str) -> Result<Option<String>> {
    print!("{} ", question);
    io::stdout().flush()?;
    let mut line = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

pub fn format_idea(index: usize, idea: &Idea) -> String {
    format!(
        "\n{}\n  {} {}\n  {} {}\n  {} {}\n  {} {}",
        format!("{}. {}", index + 1, idea.title).bright_white().bold(),
        "🦄 Pitch:".bold(),
        idea.pitch,
        "💡 Concept:".bold(),
        idea.concept,
        "💰 Monetization:".bold(),
        idea.monetization,
        "🛠  MVP:".bold(),
        idea.mvp
    )
}

pub fn format_card(index: usize, card: &Card) -> String {
    if !card.revealed {
        return format!("  [{}] {}", index + 1, "🂠  ???".bright_black());
    }
    let badge = match card.kind {
        CardKind::Unicorn => "🦄 UNICORN".bright_magenta().bold(),
        CardKind::Dogshit => "💩 DOGSHIT".yellow().bold(),
    };
    format!(
        "  [{}] {} {} ({})\n      {}",
        index + 1,
        badge,
        card.title.bright_white().bold(),
        card.valuation,
        card.pitch
    )
}

pub fn format_outcome(outcome: Outcome) -> String {
    match outcome {
        Outcome::Won => "You found the unicorn! 🦄".bright_green().bold().to_string(),
        Outcome::Lost => "That one was dogshit. Better luck next time. 💩"
            .bright_red()
            .bold()
            .to_string(),
    }
}
