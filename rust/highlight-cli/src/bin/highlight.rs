use anyhow::Result;
use clap::Parser;
use highlight_cli::cli::HighlightCli;
use highlight_cli::{Command, describe, nth_entity, render_segments, render_status};
use highlight_remote::Highlighter;
use highlight_remote::backend::RestBackend;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

enum Event {
    Line(Option<String>),
    Updated,
}

#[tokio::main]
pub async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = HighlightCli::parse();
    let backend = RestBackend::new(cli.backend_config())?;
    let mut highlighter = Highlighter::new(cli.highlight_config(), backend);

    tracing::debug!(endpoint = %cli.endpoint, "Reading input revisions from stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let event = tokio::select! {
            line = lines.next_line() => Event::Line(line?),
            _ = highlighter.next_update() => Event::Updated,
        };

        match event {
            Event::Line(None) => break,
            Event::Line(Some(line)) => match Command::parse(&line) {
                Ok(Command::Quit) => break,
                Ok(command) => handle(&mut highlighter, command),
                Err(error) => eprintln!("{error}"),
            },
            Event::Updated => print_view(&highlighter),
        }
    }

    Ok(())
}

fn handle(highlighter: &mut Highlighter, command: Command) {
    match command {
        Command::Input(text) => {
            highlighter.input(text);
            if !highlighter.is_busy() {
                print_view(highlighter);
            }
        }
        Command::Clear => {
            highlighter.input("");
            println!("(cleared)");
        }
        Command::Send => {
            highlighter.message_sent();
            println!("(sent)");
        }
        Command::Select(index) => {
            match nth_entity(&highlighter.visible_segments(), index).cloned() {
                Some(span) => {
                    println!("{}", describe(&span));
                    highlighter.select(span);
                }
                None => eprintln!("No entity #{index}"),
            }
        }
        Command::Remove(index) => {
            match nth_entity(&highlighter.visible_segments(), index).cloned() {
                Some(span) => {
                    highlighter.remove(&span);
                    print_view(highlighter);
                }
                None => eprintln!("No entity #{index}"),
            }
        }
        Command::Quit => {}
    }
}

fn print_view(highlighter: &Highlighter) {
    let view = highlighter.view();

    if !view.loading {
        println!("{}", render_segments(&highlighter.visible_segments()));
    }
    if let Some(status) = render_status(view) {
        println!("  {status}");
    }
}
