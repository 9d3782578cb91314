//! Headless notekeep host.
//!
//! # Responsibility
//! - Drive `NoteController` from one-shot subcommands.
//! - Print notices and field errors the way a UI would render them.

mod cli;

use clap::Parser;
use cli::{Cli, Command, NoteArgs};
use log::info;
use notekeep_core::{
    init_logging, ClientConfig, ControllerError, FormMode, HistoryNavigator, HttpTransport,
    InMemoryBackend, NewNote, Note, NoteClient, NoteController, NoteId, Priority,
    SubmitOutcome, Transport, ValidationReport,
};
use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;

type Controller = NoteController<Arc<dyn Transport>, HistoryNavigator>;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, Box<dyn Error>> {
    let mut config = ClientConfig::load(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(dir) = cli.log_dir {
        config.log_dir = Some(dir);
    }
    config.validate()?;

    if let Some(dir) = &config.log_dir {
        init_logging(&config.log_level, dir)?;
    }

    let transport: Arc<dyn Transport> = if cli.offline_demo {
        Arc::new(demo_backend().await?)
    } else {
        Arc::new(HttpTransport::new(&config.base_url, config.timeout())?)
    };
    info!(
        "event=cli_start module=cli status=ok offline_demo={}",
        cli.offline_demo
    );

    let mut controller = NoteController::new(NoteClient::new(transport), HistoryNavigator::new());
    let result = match cli.command {
        Command::List => list(&mut controller).await,
        Command::Show { id } => show(&mut controller, NoteId::new(id)).await,
        Command::Add(fields) => add(&mut controller, &fields).await,
        Command::Edit { id, fields } => edit(&mut controller, NoteId::new(id), &fields).await,
        Command::Delete { id } => delete(&mut controller, NoteId::new(id)).await,
    };

    match result {
        Ok(code) => Ok(code),
        Err(err) => {
            match controller.take_notice() {
                Some(notice) => eprintln!("{notice}"),
                None => eprintln!("error: {err}"),
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn list(controller: &mut Controller) -> Result<ExitCode, ControllerError> {
    let notes = controller.load_notes().await?;
    if notes.is_empty() {
        println!("no notes");
    }
    for note in notes {
        print_summary(note);
    }
    Ok(ExitCode::SUCCESS)
}

async fn show(controller: &mut Controller, id: NoteId) -> Result<ExitCode, ControllerError> {
    controller.begin_edit(&id).await?;
    if let Some(note) = controller
        .active_form()
        .and_then(|form| match form.mode() {
            FormMode::Edit(note) => Some(note),
            FormMode::Create => None,
        })
    {
        print_summary(note);
        println!("    {}", note.description);
    }
    controller.cancel();
    Ok(ExitCode::SUCCESS)
}

async fn add(controller: &mut Controller, fields: &NoteArgs) -> Result<ExitCode, ControllerError> {
    controller.begin_create()?;
    fill_form(controller, fields)?;
    finish_submit(controller).await
}

async fn edit(
    controller: &mut Controller,
    id: NoteId,
    fields: &NoteArgs,
) -> Result<ExitCode, ControllerError> {
    controller.begin_edit(&id).await?;
    fill_form(controller, fields)?;
    finish_submit(controller).await
}

async fn delete(controller: &mut Controller, id: NoteId) -> Result<ExitCode, ControllerError> {
    controller.delete(&id).await?;
    print_notice(controller);
    println!("{} notes remain", controller.notes().len());
    Ok(ExitCode::SUCCESS)
}

fn fill_form(controller: &mut Controller, fields: &NoteArgs) -> Result<(), ControllerError> {
    for (field, value) in fields.supplied() {
        controller.set_field(field, value)?;
    }
    Ok(())
}

async fn finish_submit(controller: &mut Controller) -> Result<ExitCode, ControllerError> {
    match controller.submit().await? {
        SubmitOutcome::Saved(note) => {
            print_notice(controller);
            print_summary(&note);
            Ok(ExitCode::SUCCESS)
        }
        SubmitOutcome::Invalid(report) => {
            print_field_errors(&report);
            controller.cancel();
            Ok(ExitCode::from(2))
        }
    }
}

fn print_notice(controller: &mut Controller) {
    if let Some(notice) = controller.take_notice() {
        if notice.is_error() {
            eprintln!("{notice}");
        } else {
            println!("{notice}");
        }
    }
}

fn print_field_errors(report: &ValidationReport) {
    for error in report.all_errors() {
        eprintln!("{}: {}", error.field, error.message);
    }
}

fn print_summary(note: &Note) {
    println!(
        "{}  [{}]  {}  ({})",
        note.id,
        note.priority,
        note.title,
        note.created_at.format("%Y-%m-%d %H:%M")
    );
}

/// In-process backend seeded through the regular create path.
async fn demo_backend() -> Result<InMemoryBackend, Box<dyn Error>> {
    let client = NoteClient::new(InMemoryBackend::new());
    let seed = [
        ("Groceries", Priority::Medium, "Milk, eggs and coffee beans"),
        ("Quarterly report", Priority::High, "Draft the numbers section"),
        ("Bike service", Priority::Low, "Book a slot at the shop"),
    ];
    for (title, priority, description) in seed {
        client
            .create_note(&NewNote::generated(title, priority, description))
            .await?;
    }
    Ok(client.into_transport())
}
