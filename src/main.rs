use anyhow::Result;
use tokio::sync::mpsc;

mod app;
mod client;
mod config;
mod handler;
mod tui;
mod ui;

use app::{App, ReplyEvent};
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load_or_init().unwrap_or_else(|_| Config::new());

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    // Request tasks report back over this channel; the UI loop folds
    // replies into the transcript in arrival order.
    let (reply_tx, reply_rx) = mpsc::unbounded_channel();
    let app = App::new(&config, reply_tx);

    let result = run(&mut terminal, app, reply_rx).await;

    tui::restore()?;
    result
}

async fn run(
    terminal: &mut tui::Tui,
    mut app: App,
    mut reply_rx: mpsc::UnboundedReceiver<ReplyEvent>,
) -> Result<()> {
    let mut events = tui::EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        tokio::select! {
            Some(event) = events.next() => {
                handler::handle_event(&mut app, event)?;
            }
            Some(reply) = reply_rx.recv() => {
                app.apply_reply(reply);
            }
            else => break,
        }
    }

    Ok(())
}
