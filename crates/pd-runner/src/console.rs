//! Interactive console: stdin commands in, notices out.
//!
//! While an input request is open the next line answers it instead of being
//! parsed as a command. A line consisting of `:cancel` (or end of input)
//! cancels the request.

use std::io::BufRead;

use pd_dash::{Command, InputReceiver, InputRequest, Notice, NoticeReceiver, parse_command};
use tokio::sync::mpsc;
use tracing::{debug, warn};

const CANCEL: &str = ":cancel";

/// Read stdin on a plain thread so a blocked read never holds up runtime
/// shutdown.
pub fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || forward_lines(std::io::stdin().lock(), &tx));
    rx
}

/// Send each line of `reader` until it ends, fails, or the receiver is gone.
fn forward_lines(reader: impl BufRead, tx: &mpsc::UnboundedSender<String>) {
    for line in reader.lines() {
        match line {
            Ok(line) => {
                if tx.send(line).is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!("[console] stdin: {e}");
                break;
            }
        }
    }
}

/// Drive the console until the user quits, input ends, or the engine stops.
pub async fn run(
    commands: mpsc::Sender<Command>,
    mut notices: NoticeReceiver,
    mut prompts: InputReceiver,
    mut lines: mpsc::UnboundedReceiver<String>,
) {
    let mut pending: Option<InputRequest> = None;

    loop {
        tokio::select! {
            notice = notices.recv() => match notice {
                Some(notice) => print!("{}", format_notice(&notice)),
                None => break,
            },

            Some(request) = prompts.recv(), if pending.is_none() => {
                println!("{} [{}] ({CANCEL} to abort)", request.prompt, request.initial);
                pending = Some(request);
            }

            line = lines.recv() => {
                let Some(line) = line else {
                    debug!("[console] end of input");
                    if let Some(request) = pending.take() {
                        request.cancel();
                    }
                    let _ = commands.send(Command::Quit).await;
                    break;
                };
                if let Some(request) = pending.take() {
                    request.respond(prompt_answer(&line));
                    continue;
                }
                match parse_command(&line) {
                    Ok(Some(Command::Quit)) => {
                        let _ = commands.send(Command::Quit).await;
                        break;
                    }
                    Ok(Some(cmd)) => {
                        if commands.send(cmd).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => println!("{e}"),
                }
            }
        }
    }
}

/// Map a prompt reply line to an answer; `None` means cancelled.
fn prompt_answer(line: &str) -> Option<String> {
    if line.trim() == CANCEL { None } else { Some(line.to_string()) }
}

fn format_notice(notice: &Notice) -> String {
    match notice {
        Notice::Info(msg) => format!("{msg}\n"),
        Notice::Rejected(msg) => format!("rejected: {msg}\n"),
        Notice::Error(msg) => format!("error: {msg}\n"),
        Notice::View(_, text) => format!("\n{text}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pd_dash::View;

    #[test]
    fn cancel_keyword_cancels_and_blank_line_clears() {
        assert_eq!(prompt_answer(" :cancel "), None);
        assert_eq!(prompt_answer(""), Some(String::new()));
        assert_eq!(prompt_answer("hold till Q3"), Some("hold till Q3".into()));
    }

    #[test]
    fn notices_are_labelled() {
        assert_eq!(format_notice(&Notice::Rejected("insufficient quantity".into())), "rejected: insufficient quantity\n");
        assert_eq!(format_notice(&Notice::Error("x".into())), "error: x\n");
        assert_eq!(format_notice(&Notice::View(View::Trades, "T\n".into())), "\nT\n");
    }

    #[test]
    fn forwards_every_line_then_stops() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        forward_lines(std::io::Cursor::new("buy ABC 1\n\nquit\n"), &tx);
        drop(tx);
        let mut got = Vec::new();
        while let Ok(line) = rx.try_recv() {
            got.push(line);
        }
        assert_eq!(got, ["buy ABC 1", "", "quit"]);
    }

    #[test]
    fn forwarding_stops_when_receiver_is_gone() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        forward_lines(std::io::Cursor::new("a\nb\n"), &tx);
    }

    #[tokio::test]
    async fn lines_become_commands_and_prompt_answers() {
        let (cmd_tx, mut cmd_rx) = mpsc::channel(8);
        let (_notice_tx, notice_rx) = mpsc::unbounded_channel();
        let (prompter, prompt_rx) = pd_dash::prompt_channel(1);
        let (line_tx, line_rx) = mpsc::unbounded_channel();
        let console = tokio::spawn(run(cmd_tx, notice_rx, prompt_rx, line_rx));

        line_tx.send("refresh".into()).unwrap();
        assert_eq!(cmd_rx.recv().await, Some(Command::Refresh));

        let ask = tokio::spawn(async move { prompter.ask("notes?", "old").await });
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        line_tx.send("new text".into()).unwrap();
        assert_eq!(ask.await.unwrap().as_deref(), Some("new text"));

        drop(line_tx);
        assert_eq!(cmd_rx.recv().await, Some(Command::Quit));
        console.await.unwrap();
    }
}
