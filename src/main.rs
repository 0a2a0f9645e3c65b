use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

mod app;
mod celebration;
mod config;
mod error;
mod event_bus;
mod idea;
mod interpreter;
mod llm_manager;
mod logger;
mod profile;
mod prompt;
mod providers;
mod session;
mod ui;

use app::App;
use config::Config;
use event_bus::{EventBus, EventEmitter};
use idea::Outcome;
use llm_manager::LLMManager;
use profile::Field;
use prompt::Mode;
use providers::GeminiProvider;
use session::Phase;
use ui::TerminalUI;

#[derive(Parser)]
#[command(name = "ideavibe", version, about)]
struct Args {
    /// Play the unicorn card game instead of listing ideas
    #[arg(short, long)]
    game: bool,
    /// Your interests (asked interactively when omitted)
    #[arg(long)]
    interests: Option<String>,
    /// Your skills (asked interactively when omitted)
    #[arg(long)]
    skills: Option<String>,
    /// Your hobbies (asked interactively when omitted)
    #[arg(long)]
    hobbies: Option<String>,
    /// Model identifier, overrides the config file and IDEAVIBE_MODEL
    #[arg(short, long)]
    model: Option<String>,
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<String>,
    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
    /// No colors, spinner or confetti
    #[arg(long)]
    plain: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    logger::init(args.verbose);

    let mut config = Config::load(&args.config)?;
    config.merge_with_args(args.model.clone(), args.plain);
    let mode = if args.game { Mode::Game } else { Mode::Ideas };

    let event_bus = Arc::new(EventBus::new(100));
    let mut manager = LLMManager::new(
        Box::new(GeminiProvider::new(&config.model)),
        config.model.timeout(),
    );
    manager.set_event_bus(event_bus.clone());
    let mut app = App::new(mode, manager, &config);
    app.set_event_bus(event_bus.clone());

    let mut ui = TerminalUI::new(config.ui.clone());
    ui.start(mode)?;

    let preset = [args.interests, args.skills, args.hobbies];
    run(&mut app, &mut ui, preset).await?;

    ui.finish(&event_bus.get_metrics().await);
    Ok(())
}

/// Form → generation → result, until the user stops or input ends.
async fn run(app: &mut App, ui: &mut TerminalUI, mut preset: [Option<String>; 3]) -> Result<()> {
    let mut revise = false;
    loop {
        if !fill_form(app, ui, &mut preset, revise)? {
            return Ok(());
        }

        ui.start_loading(app.manager().provider().model_name());
        let submitted = app.submit().await;
        ui.finish_loading();
        if let Err(e) = submitted {
            ui.display_error(&e.to_string());
            continue;
        }
        ui.render(app.session());

        let phase = app.session().phase().clone();
        match phase {
            Phase::Input { .. } => {
                if !ui.confirm("Try again? Press Enter to keep an answer.")? {
                    return Ok(());
                }
                revise = true;
            }
            Phase::Listing => {
                if !ui.confirm("Generate again? Press Enter to keep an answer.")? {
                    return Ok(());
                }
                revise = true;
            }
            Phase::Playing => {
                let Some(index) = ui.ask_card(app.session().cards().len())? else {
                    return Ok(());
                };
                let outcome = app.reveal(index).await;
                ui.render(app.session());
                if outcome == Some(Outcome::Won) {
                    ui.celebrate();
                }
                let again = ui.confirm("Play again?")?;
                ui.end_celebration();
                if !again {
                    return Ok(());
                }
                app.reset().await?;
                revise = false;
            }
            Phase::Loading | Phase::Resolved(_) => return Ok(()),
        }
    }
}

/// Fill the profile, from the command line first. Empty fields are always
/// asked for; with `revise` every field is offered again with its current
/// value kept on a blank answer. `false` on end of input.
fn fill_form(
    app: &mut App,
    ui: &TerminalUI,
    preset: &mut [Option<String>; 3],
    revise: bool,
) -> Result<bool> {
    for (field, value) in Field::ALL.into_iter().zip(preset.iter_mut()) {
        if let Some(value) = value.take() {
            app.set_field(field, value)?;
        }
        let mut ask = revise;
        while ask || app.session().profile().get(field).trim().is_empty() {
            let current = app.session().profile().get(field).to_string();
            match ui.ask_field(field, &current)? {
                Some(answer) => app.set_field(field, answer)?,
                None => return Ok(false),
            }
            ask = false;
        }
    }
    Ok(app.session().can_submit())
}
