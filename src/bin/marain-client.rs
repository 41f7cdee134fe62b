extern crate marain_client;

use anyhow::Result;
use futures_channel::mpsc::{unbounded, UnboundedSender};
use futures_util::StreamExt;
use log::{error, info};
use marain_client::prelude::{ClientConfig, SessionView, SessionWorker, UiInput};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = env_logger::try_init();
    let config = ClientConfig::from_env();
    info!("Connecting to {}", config.server_url);

    let worker = SessionWorker::connect(&config).await?;

    let (input_sink, input_source) = unbounded::<UiInput>();
    let (view_sink, mut view_source) = unbounded::<SessionView>();

    tokio::spawn(stdin_reader(input_sink));
    let printer = tokio::spawn(async move {
        let mut printer = ViewPrinter::default();
        while let Some(view) = view_source.next().await {
            printer.print(&view);
        }
    });

    let session = worker.run(input_source, view_sink).await?;
    if let Err(e) = printer.await {
        error!("View printer stopped abnormally: {e}");
    }
    info!(
        "Session ended with {} transcript entries",
        session.transcript().len()
    );

    Ok(())
}

/// First non-empty line joins, every later line is typed and sent, `/quit` leaves.
async fn stdin_reader(inputs: UnboundedSender<UiInput>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut joined = false;
    println!("Enter a username to join:");

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("Could not read from stdin: {e}");
                break;
            }
        };

        let batch = if line.trim() == "/quit" {
            vec![UiInput::Quit]
        } else if !joined {
            joined = !line.trim().is_empty();
            vec![UiInput::SubmitUsername(line)]
        } else {
            vec![UiInput::Edit(line), UiInput::Submit]
        };

        for input in batch {
            if inputs.unbounded_send(input).is_err() {
                return;
            }
        }
    }
}

#[derive(Default)]
struct ViewPrinter {
    printed: usize,
    roster: String,
}

impl ViewPrinter {
    fn print(&mut self, view: &SessionView) {
        if !view.joined {
            return;
        }

        for line in view.transcript.iter().skip(self.printed) {
            if line.is_mine {
                println!("{line}");
            } else {
                println!("{:>60}", line.to_string());
            }
        }
        self.printed = view.transcript.len();

        let roster = view
            .online
            .iter()
            .map(|line| match (line.is_me, line.is_typing) {
                (true, _) => format!("{} (me)", line.username),
                (false, true) => format!("{} (typing...)", line.username),
                (false, false) => line.username.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        if roster != self.roster {
            println!("-- online: {roster}");
            self.roster = roster;
        }
    }
}
