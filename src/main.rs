use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use chat_widget::{ChatWidget, RenderOp, View, WidgetConfig, WidgetError, diff};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::oneshot;
use tokio::task::JoinSet;
use tracing::{Level, debug, error, info};

const QUIT: &str = "/quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = WidgetConfig::from_env().context("invalid chat widget configuration")?;
    init_tracing();
    info!(endpoint = %config.endpoint, assistant = %config.assistant_label, "chat widget starting");

    let widget = Arc::new(ChatWidget::new(config)?);
    let (stop_tx, stop_rx) = oneshot::channel();
    let painter = tokio::spawn(paint(widget.clone(), stop_rx));

    let mut input = BufReader::new(tokio::io::stdin()).lines();

    let session = loop {
        let Some(raw) = input.next_line().await? else {
            let _ = stop_tx.send(());
            painter.await?;
            return Ok(());
        };
        match widget.begin_session(&raw).await {
            Ok(session) => break session,
            Err(WidgetError::EmptyUserId) => {
                print!("A user id is required.\nUser ID: ");
                let _ = std::io::stdout().flush();
            }
            Err(e) => return Err(e.into()),
        }
    };

    let mut sends = JoinSet::new();
    while let Some(line) = input.next_line().await? {
        if line.trim() == QUIT {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }
        let widget = widget.clone();
        let session = session.clone();
        sends.spawn(async move {
            if let Err(e) = widget.send_message(&session, &line).await {
                debug!(error = %e, "send finished without a reply");
            }
        });
    }

    while let Some(joined) = sends.join_next().await {
        if let Err(e) = joined {
            error!(error = %e, "send task failed");
        }
    }
    let _ = stop_tx.send(());
    painter.await?;
    Ok(())
}

/// Redraw whenever the widget changes, applying only the difference to
/// what is already on screen.
async fn paint(widget: Arc<ChatWidget>, mut stop: oneshot::Receiver<()>) {
    let mut changes = widget.subscribe();
    let mut shown: Option<View> = None;
    loop {
        let view = widget.render().await;
        for op in diff(shown.as_ref(), &view) {
            apply(&op);
        }
        shown = Some(view);

        tokio::select! {
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = &mut stop => {
                let view = widget.render().await;
                for op in diff(shown.as_ref(), &view) {
                    apply(&op);
                }
                break;
            }
        }
    }
}

fn apply(op: &RenderOp) {
    match op {
        RenderOp::ShowIdentification => print!("User ID: "),
        RenderOp::ShowConversation => println!("\n== Chat == (type {} to leave)", QUIT),
        RenderOp::AppendLine(line) => println!("{}", line),
    }
    let _ = std::io::stdout().flush();
}

fn init_tracing() {
    let level = std::env::var("CHAT_LOG")
        .ok()
        .and_then(|raw| raw.parse::<Level>().ok())
        .unwrap_or(Level::INFO);

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
