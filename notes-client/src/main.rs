mod api;
mod debounce;
mod state;
mod views;

use clap::Parser;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    time::{Duration, Instant, sleep_until},
};
use tracing_subscriber::EnvFilter;

use api::{HttpNotesApi, NotesApi};
use debounce::EditDebouncer;
use state::{NoteDraft, NotesController};
use views::{Command, Intent};

#[derive(Debug, Parser)]
#[command(version, about = "Terminal client for notes-server")]
struct Cli {
    /// Base URL of the notes REST API
    #[arg(long, env = "NOTES_API_URL", default_value = "http://localhost:3001")]
    api_url: String,

    /// Quiet period before buffered edits are sent
    #[arg(long, default_value_t = 500)]
    debounce_ms: u64,
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn redraw<A: NotesApi>(controller: &NotesController<A>) {
    println!("{}", views::render_list(controller.notes(), controller.active_note_id()));
    println!();
    println!("{}", views::render_editor(controller.active_note()));
}

async fn send_pending<A: NotesApi>(
    controller: &mut NotesController<A>,
    draft: Option<NoteDraft>,
) {
    if let Some(draft) = draft {
        controller.dispatch(Intent::Edit(draft)).await;
    }
}

async fn queue_edit<A: NotesApi>(
    controller: &mut NotesController<A>,
    debouncer: &mut EditDebouncer,
    draft: NoteDraft,
) {
    if draft.id.is_none() {
        println!("No note selected.");
        // The controller rejects id-less drafts without a request
        controller.dispatch(Intent::Edit(draft)).await;
        return;
    }

    let displaced = debouncer.push(draft, Instant::now());
    send_pending(controller, displaced).await;
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    tracing::info!("Using notes API at {}", cli.api_url);

    let mut controller = NotesController::new(HttpNotesApi::new(&cli.api_url));
    let mut debouncer = EditDebouncer::new(Duration::from_millis(cli.debounce_ms));

    controller.load().await;
    redraw(&controller);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!("failed to read input: {e}");
                        break;
                    }
                };

                let command = match views::parse_command(&line) {
                    Ok(command) => command,
                    Err(e) => {
                        println!("{e}");
                        continue;
                    }
                };

                match command {
                    Command::Quit => break,
                    Command::Help => println!("{}", views::HELP),
                    Command::List => {
                        send_pending(&mut controller, debouncer.flush()).await;
                        println!("{}", views::render_list(controller.notes(), controller.active_note_id()));
                    }
                    Command::Show => {
                        send_pending(&mut controller, debouncer.flush()).await;
                        println!("{}", views::render_editor(controller.active_note()));
                    }
                    Command::SetTitle(title) => {
                        let draft = debouncer.draft_for(controller.active_note(), |d| d.title = title);
                        queue_edit(&mut controller, &mut debouncer, draft).await;
                    }
                    Command::SetContent(content) => {
                        let draft = debouncer.draft_for(controller.active_note(), |d| d.content = content);
                        queue_edit(&mut controller, &mut debouncer, draft).await;
                    }
                    Command::Intent(intent) => {
                        send_pending(&mut controller, debouncer.flush()).await;
                        controller.dispatch(intent).await;
                        redraw(&controller);
                    }
                }
            }
            () = wait_until(debouncer.deadline()) => {
                let due = debouncer.take_due(Instant::now());
                send_pending(&mut controller, due).await;
            }
        }
    }

    send_pending(&mut controller, debouncer.flush()).await;
}
