use skein::prelude::*;
use skein::session::format;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Console commands
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
enum Command<'a> {
    Become(&'a str),
    Release,
    Rename(&'a str),
    Act { index: usize, args: Vec<(&'a str, &'a str)> },
    Render { kind: &'a str, name: &'a str },
    Skip,
    Leave,
    Reconnect,
    Quit,
    Input(&'a str),
}

fn parse_command(line: &str) -> Result<Command<'_>, String> {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Command::Input(line));
    };
    let (verb, args) = rest.split_once(' ').unwrap_or((rest, ""));
    let args = args.trim();

    match verb {
        "become" if !args.is_empty() => Ok(Command::Become(args)),
        "release" => Ok(Command::Release),
        "name" if !args.is_empty() => Ok(Command::Rename(args)),
        "act" => {
            let mut words = args.split_whitespace();
            let index = words
                .next()
                .and_then(|word| word.parse().ok())
                .ok_or("usage: /act <number> [name=value ...]")?;
            let args = words
                .map(|pair| pair.split_once('=').ok_or(format!("expected name=value, got {pair}")))
                .collect::<Result<_, _>>()?;
            Ok(Command::Act { index, args })
        }
        "render" => match args.split_once(' ') {
            Some((kind, name)) => Ok(Command::Render { kind, name: name.trim() }),
            None => Err("usage: /render <event|character|item|portal|room> <name>".into()),
        },
        "skip" => Ok(Command::Skip),
        "leave" => Ok(Command::Leave),
        "reconnect" => Ok(Command::Reconnect),
        "quit" => Ok(Command::Quit),
        _ => Err(format!("unknown command: /{verb}")),
    }
}

/// Parses a console value: `true`/`false`, a number, or a string.
fn parse_value(raw: &str) -> ParameterValue {
    match raw {
        "true" => ParameterValue::Boolean(true),
        "false" => ParameterValue::Boolean(false),
        _ => raw
            .parse::<f64>()
            .map(ParameterValue::Number)
            .unwrap_or_else(|_| ParameterValue::String(raw.to_string())),
    }
}

fn render_request(kind: &str, name: &str) -> Option<RenderRequest> {
    match kind {
        "event" => Some(RenderRequest::event(name)),
        "character" => Some(RenderRequest::character(name)),
        "item" => Some(RenderRequest::item(name)),
        "portal" => Some(RenderRequest::portal(name)),
        "room" => Some(RenderRequest::room(name)),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Printing
// ---------------------------------------------------------------------------

fn print_turn(session: &Session) {
    let Some(view) = TurnController::new().view(session) else {
        return;
    };
    println!("== It's your turn, {}! ==", view.character);
    println!("{}", view.prompt);
    for (index, action) in view.actions.iter().enumerate() {
        let form = ActionForm::new(action, session.world());
        println!("  [{index}] {} {}", action.description, form.encode());
        for field in form.fields() {
            if let Some(options) = field.options() {
                let options: Vec<String> = options.iter().map(ToString::to_string).collect();
                println!("        {}: {}", field.name(), options.join(" | "));
            }
        }
    }
}

/// Prints new log entries and the turn prompt as the session changes.
fn console_observer() -> impl FnMut(&Session) + Send + 'static {
    let mut printed = 0;
    let mut was_my_turn = false;
    move |session: &Session| {
        let history = session.history();
        if printed > history.len() {
            // The session was reset by a reconnect.
            printed = 0;
        }
        for event in &history[printed..] {
            println!("{}", format::describe(event));
        }
        printed = history.len();

        let my_turn = session.is_my_turn();
        if my_turn && !was_my_turn {
            print_turn(session);
        }
        was_my_turn = my_turn;
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

async fn handle(
    client: &mut SkeinClient<WebSocketConnection>,
    command: Command<'_>,
) -> Result<bool, SkeinError> {
    match command {
        Command::Become(name) => client.become_character(name).await?,
        Command::Release => client.release_character().await?,
        Command::Rename(name) => client.rename(name).await?,
        Command::Act { index, args } => {
            let Some(action) = client
                .session()
                .prompt()
                .and_then(|prompt| prompt.actions.get(index))
                .cloned()
            else {
                eprintln!("no action [{index}] in the current prompt");
                return Ok(true);
            };
            let mut form = ActionForm::new(&action, client.session().world());
            for (name, raw) in args {
                form.set(name, parse_value(raw))?;
            }
            client.turn_mut().choose_action(&form);
            client.submit_turn().await?;
        }
        Command::Render { kind, name } => match render_request(kind, name) {
            Some(request) => client.request_render(request).await?,
            None => eprintln!("cannot render a {kind}"),
        },
        Command::Skip => client.skip_turn(),
        Command::Leave => client.leave_turn(),
        Command::Reconnect => client.reconnect().await?,
        Command::Quit => {
            client.close().await?;
            return Ok(false);
        }
        Command::Input(text) => {
            client.turn_mut().set_draft(text);
            client.submit_turn().await?;
        }
    }
    Ok(true)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| skein::DEFAULT_URL.to_string());
    eprintln!("connecting to {url}");

    let mut client = SkeinClient::builder().url(&url).connect().await?;
    client.store_mut().subscribe(console_observer());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            applied = client.pump() => {
                if applied?.is_none() {
                    eprintln!("connection closed; type /reconnect or /quit");
                    match lines.next_line().await? {
                        Some(line) if line.trim() == "/reconnect" => client.reconnect().await?,
                        _ => break,
                    }
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Ok(command) => match handle(&mut client, command).await {
                        Ok(true) => {}
                        Ok(false) => break,
                        Err(e) => eprintln!("error: {e}"),
                    },
                    Err(usage) => eprintln!("{usage}"),
                }
            }
        }
    }

    tracing::info!("console client exiting");
    Ok(())
}
