use std::io::Write;
use std::sync::Arc;

use color_eyre::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use tutorchat::adapters::{ReqwestHttpClient, UuidIdGenerator};
use tutorchat::config::ChatConfig;
use tutorchat::session::{tutor_greeting, ConversationSession, SessionEvent, SessionStatus};
use tutorchat::stream::ChatStreamClient;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Command-line options.
struct Options {
    tutor: String,
    subject: String,
}

impl Options {
    fn from_args() -> Self {
        let (options, warnings) = Self::parse(std::env::args().skip(1));
        for warning in warnings {
            eprintln!("{}", warning);
        }
        options
    }

    /// Parse arguments, collecting a warning for each one that is ignored.
    fn parse<I: IntoIterator<Item = String>>(args: I) -> (Self, Vec<String>) {
        let mut options = Options {
            tutor: "your tutor".to_string(),
            subject: "course".to_string(),
        };
        let mut warnings = Vec::new();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--tutor" => match args.next() {
                    Some(value) => options.tutor = value,
                    None => warnings.push("Missing value for --tutor".to_string()),
                },
                "--subject" => match args.next() {
                    Some(value) => options.subject = value,
                    None => warnings.push("Missing value for --subject".to_string()),
                },
                other => warnings.push(format!("Ignoring unknown argument: {}", other)),
            }
        }
        (options, warnings)
    }
}

fn main() -> Result<()> {
    if std::env::args().any(|arg| arg == "--version") {
        println!("tutorchat {}", VERSION);
        return Ok(());
    }

    color_eyre::install()?;

    // Logs go to stderr so they never interleave with the streamed answer.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tutorchat=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = Options::from_args();
    let config = ChatConfig::from_env()?;
    tracing::info!(base_url = %config.api_base_url, "configuration loaded");

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(config, options))
}

async fn run(config: ChatConfig, options: Options) -> Result<()> {
    let http = ReqwestHttpClient::with_connect_timeout(config.connect_timeout)?;
    let client = Arc::new(ChatStreamClient::new(config, http));
    let mut session = ConversationSession::new(client, Arc::new(UuidIdGenerator))
        .with_greeting(tutor_greeting(&options.tutor, &options.subject));

    for message in session.messages() {
        println!("{}\n", message.content);
    }
    println!("Type a question. /clear starts over, /quit exits, Ctrl+C stops an answer.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "/quit" => break,
            "/clear" => {
                session.clear_history();
                println!("Started a new conversation.\n");
                continue;
            }
            _ => {}
        }

        if session.send(&line).is_none() {
            continue;
        }
        stream_answer(&mut session).await?;
    }

    Ok(())
}

/// Print the active turn as it streams in.
async fn stream_answer<C>(session: &mut ConversationSession<C>) -> Result<()>
where
    C: tutorchat::traits::HttpClient + 'static,
{
    let mut printed_any = false;
    loop {
        let update = tokio::select! {
            event = session.next_update() => Some(event),
            _ = tokio::signal::ctrl_c() => None,
        };
        match update {
            Some(Some(SessionEvent::Fragment { text, .. })) => {
                print!("{}", text);
                std::io::stdout().flush()?;
                printed_any = true;
            }
            Some(_) => break,
            None => {
                session.stop();
                break;
            }
        }
    }

    match session.status() {
        SessionStatus::Settled => println!("\n"),
        SessionStatus::StoppedByUser => println!("\n[Stopped by user]\n"),
        _ => {
            if printed_any {
                println!();
            }
            if let Some(message) = session.messages().last() {
                println!("{}\n", message.content);
            }
        }
    }
    Ok(())
}
