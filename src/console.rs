//! Line-oriented terminal surface over the admin session.
//!
//! Rows are addressed by their 1-based position in the view currently on screen.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::Path;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::admin_actor::CommandOutcome;
use crate::app_system::{AdminConfig, AdminSystem, AppError};
use crate::clients::{AdminClient, NotificationClient};
use crate::domain::{OrderError, OrderStatus, StatusFilter};
use crate::notification_actor::{Notification, NotificationPhase};
use crate::sync::{Confirmation, DELETE_PROMPT};
use crate::view::{OrderCard, OrderListView, LOADING, NO_ORDERS};

pub const EXPORT_WRITE_FAILED: &str = "Error exporting orders";

pub const HELP: &str = "\
commands:
  filter <all|pending|confirmed|shipped|delivered|cancelled>
  search [term]
  status <row> <status>
  call <row>
  delete <row>
  export
  help
  quit";

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Filter(StatusFilter),
    Search(String),
    Status { row: usize, status: OrderStatus },
    Call { row: usize },
    Delete { row: usize },
    Export,
    Help,
    Quit,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParseError {
    #[error("Unknown command {0:?}, try `help`")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("Invalid row {0:?}, rows start at 1")]
    InvalidRow(String),
    #[error(transparent)]
    Order(#[from] OrderError),
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<ConsoleCommand>, ParseError> {
    let line = line.trim();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let args: Vec<&str> = rest.split_whitespace().collect();

    let command = match word {
        "" => return Ok(None),
        "filter" => match args.as_slice() {
            [filter] => ConsoleCommand::Filter(filter.parse()?),
            _ => return Err(ParseError::Usage("filter <all|status>")),
        },
        "search" => ConsoleCommand::Search(rest.to_string()),
        "status" => match args.as_slice() {
            [row, status] => ConsoleCommand::Status {
                row: parse_row(row)?,
                status: status.parse()?,
            },
            _ => return Err(ParseError::Usage("status <row> <status>")),
        },
        "call" => match args.as_slice() {
            [row] => ConsoleCommand::Call { row: parse_row(row)? },
            _ => return Err(ParseError::Usage("call <row>")),
        },
        "delete" => match args.as_slice() {
            [row] => ConsoleCommand::Delete { row: parse_row(row)? },
            _ => return Err(ParseError::Usage("delete <row>")),
        },
        "export" => ConsoleCommand::Export,
        "help" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn parse_row(raw: &str) -> Result<usize, ParseError> {
    match raw.parse::<usize>() {
        Ok(row) if row > 0 => Ok(row),
        _ => Err(ParseError::InvalidRow(raw.to_string())),
    }
}

/// Text rendering of a whole view.
pub fn draw(view: &OrderListView) -> String {
    match view {
        OrderListView::Loading => LOADING.to_string(),
        OrderListView::Empty => NO_ORDERS.to_string(),
        OrderListView::Cards(cards) => {
            let mut out = String::new();
            for (index, card) in cards.iter().enumerate() {
                draw_card(&mut out, index + 1, card);
            }
            out
        }
    }
}

fn draw_card(out: &mut String, row: usize, card: &OrderCard) {
    let _ = writeln!(
        out,
        "[{}] {}  {}  {}  ({})",
        row, card.heading, card.date, card.total, card.status
    );
    let customer = &card.customer;
    let _ = writeln!(out, "    {}", customer.name);
    let _ = writeln!(out, "    📞 {}", customer.phone);
    let _ = writeln!(out, "    📧 {}", customer.email);
    let _ = writeln!(out, "    📍 {}", customer.address);
    if let Some(notes) = &customer.notes {
        let _ = writeln!(out, "    📝 {}", notes);
    }
    for line in &card.items {
        let _ = writeln!(out, "    - {}  {}", line.label, line.amount);
    }
    let selected = card
        .status_select
        .selected()
        .map(|status| status.label())
        .unwrap_or("?");
    let _ = writeln!(out, "    status: {}", selected);
}

pub fn draw_notification(notification: &Notification) -> String {
    format!("[{}] {}", notification.kind, notification.message)
}

/// Reads commands from stdin until `quit` or end of input.
pub async fn run(system: &AdminSystem, config: &AdminConfig) -> Result<(), AppError> {
    let printers = [
        spawn_view_printer(&system.admin_client),
        spawn_notification_printer(&system.notification_client),
    ];

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut output = tokio::io::stdout();

    let result = match say(&mut output, HELP).await {
        Ok(()) => command_loop(&mut input, &mut output, system, &config.export_dir).await,
        Err(e) => Err(e.into()),
    };

    for printer in printers {
        printer.abort();
    }
    result
}

/// Runs commands read from `input`, writing replies and prompts to `output`.
///
/// Remote failures never end the loop; they surface as notifications. Only a
/// closed admin session or broken console I/O does.
pub async fn command_loop<R, W>(
    input: &mut Lines<R>,
    output: &mut W,
    system: &AdminSystem,
    export_dir: &Path,
) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let admin = &system.admin_client;

    while let Some(line) = input.next_line().await? {
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                say(output, &e.to_string()).await?;
                continue;
            }
        };

        match command {
            ConsoleCommand::Filter(filter) => admin.set_filter(filter).await?,
            ConsoleCommand::Search(term) => admin.set_search(term).await?,
            ConsoleCommand::Status { row, status } => {
                if let Some(card) = card_at(admin, output, row).await? {
                    admin.execute(card.status_select.on_change(status)).await?;
                }
            }
            ConsoleCommand::Call { row } => {
                if let Some(card) = card_at(admin, output, row).await? {
                    if let CommandOutcome::Dial { uri } = admin.execute(card.call.activate()).await? {
                        say(output, &format!("Opening {}", uri)).await?;
                    }
                }
            }
            ConsoleCommand::Delete { row } => {
                if let Some(card) = card_at(admin, output, row).await? {
                    output
                        .write_all(format!("{} [y/N] ", DELETE_PROMPT).as_bytes())
                        .await?;
                    output.flush().await?;

                    let answer = input.next_line().await?.unwrap_or_default();
                    let command = card.delete.activate(Confirmation::from_answer(&answer));
                    if admin.execute(command).await? == CommandOutcome::DeleteCancelled {
                        say(output, "Nothing deleted").await?;
                    }
                }
            }
            ConsoleCommand::Export => {
                let export = admin.export_csv().await?;
                let path = export_dir.join(&export.file_name);
                match tokio::fs::write(&path, &export.bytes).await {
                    Ok(()) => {
                        info!(path = %path.display(), mime = export.mime, "Export written");
                        system
                            .notification_client
                            .notify_info(format!("Saved {}", path.display()))
                            .await;
                    }
                    Err(e) => {
                        error!(path = %path.display(), error = %e, "Error exporting orders");
                        system.notification_client.notify_error(EXPORT_WRITE_FAILED).await;
                    }
                }
            }
            ConsoleCommand::Help => say(output, HELP).await?,
            ConsoleCommand::Quit => break,
        }
    }

    Ok(())
}

async fn say<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> std::io::Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await
}

async fn card_at<W: AsyncWrite + Unpin>(
    admin: &AdminClient,
    output: &mut W,
    row: usize,
) -> Result<Option<OrderCard>, AppError> {
    let view = admin.current_view().await?;
    let card = view.cards().get(row - 1).cloned();
    if card.is_none() {
        warn!(row, "No such row");
        say(output, &format!("No order on row {}", row)).await?;
    }
    Ok(card)
}

fn spawn_view_printer(admin: &AdminClient) -> JoinHandle<()> {
    let mut views = admin.views();
    tokio::spawn(async move {
        println!("{}", draw(&views.borrow_and_update()));
        while views.changed().await.is_ok() {
            let text = draw(&views.borrow_and_update());
            println!("{}", text);
        }
    })
}

fn spawn_notification_printer(notifications: &NotificationClient) -> JoinHandle<()> {
    let mut updates = notifications.updates();
    tokio::spawn(async move {
        let mut printed = HashSet::new();
        while updates.changed().await.is_ok() {
            let active = updates.borrow_and_update().clone();
            for notification in &active {
                if notification.phase == NotificationPhase::Shown && printed.insert(notification.id) {
                    println!("{}", draw_notification(notification));
                }
            }
            printed.retain(|id| active.iter().any(|n| n.id == *id));
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection_actor::Snapshot;
    use crate::domain::Document;
    use crate::mock_framework::{
        order, order_fields, start_mock_system, wait_for_notification, Pushes, WAIT,
    };
    use crate::notification_actor::NotificationKind;
    use crate::view::{render, DateFormatter};
    use tokio::io::AsyncReadExt;
    use tokio::sync::mpsc::error::TryRecvError;
    use tokio::time::timeout;

    async fn with_one_order(system: &AdminSystem, pushes: &Pushes) {
        let documents = vec![Document::new("doc_1", order_fields("1001"))];
        pushes.send(Ok(Snapshot { documents })).unwrap();
        let mut views = system.admin_client.views();
        timeout(WAIT, views.wait_for(|view| !view.cards().is_empty()))
            .await
            .expect("Timed out waiting for view")
            .expect("Admin session closed");
    }

    fn script(text: &'static str) -> Lines<BufReader<&'static [u8]>> {
        BufReader::new(text.as_bytes()).lines()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("   "), Ok(None));
        assert_eq!(
            parse_command("filter shipped"),
            Ok(Some(ConsoleCommand::Filter(StatusFilter::Only(OrderStatus::Shipped))))
        );
        assert_eq!(
            parse_command("search  Ali Hassan "),
            Ok(Some(ConsoleCommand::Search("Ali Hassan".to_string())))
        );
        assert_eq!(parse_command("search"), Ok(Some(ConsoleCommand::Search(String::new()))));
        assert_eq!(
            parse_command("status 2 delivered"),
            Ok(Some(ConsoleCommand::Status {
                row: 2,
                status: OrderStatus::Delivered
            }))
        );
        assert_eq!(parse_command("delete 1"), Ok(Some(ConsoleCommand::Delete { row: 1 })));
        assert_eq!(parse_command("exit"), Ok(Some(ConsoleCommand::Quit)));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse_command("status 1 lost"),
            Err(ParseError::Order(OrderError::InvalidStatus("lost".to_string())))
        );
        assert_eq!(parse_command("call 0"), Err(ParseError::InvalidRow("0".to_string())));
        assert_eq!(parse_command("call"), Err(ParseError::Usage("call <row>")));
        assert!(matches!(parse_command("refund 1"), Err(ParseError::Unknown(_))));
    }

    #[test]
    fn test_draw_placeholders_and_cards() {
        assert_eq!(draw(&OrderListView::Loading), LOADING);
        assert_eq!(draw(&OrderListView::Empty), NO_ORDERS);

        let mut with_notes = order("doc_1", "1001");
        with_notes.notes = Some("Leave at door".to_string());
        let orders = vec![with_notes];
        let text = draw(&render(&orders.iter().collect::<Vec<_>>(), &DateFormatter::utc()));

        assert!(text.starts_with("[1] #1001"));
        assert!(text.contains("📝 Leave at door"));
        assert!(text.contains("status: ⏳ Pending"));
    }

    #[tokio::test]
    async fn test_delete_prompt_is_written_before_reading_answer() {
        let (system, mut requests, pushes) = start_mock_system(&AdminConfig::default()).await;
        with_one_order(&system, &pushes).await;

        let (mut keyboard, console_in) = tokio::io::duplex(1024);
        let (mut console_out, mut screen) = tokio::io::duplex(4096);
        let mut input = BufReader::new(console_in).lines();

        let admin_side = async move {
            keyboard.write_all(b"delete 1\n").await.unwrap();

            let mut shown = String::new();
            let mut buf = [0u8; 256];
            timeout(WAIT, async {
                while !shown.contains(DELETE_PROMPT) {
                    let n = screen.read(&mut buf).await.unwrap();
                    shown.push_str(&String::from_utf8_lossy(&buf[..n]));
                }
            })
            .await
            .expect("Prompt not visible while the answer is awaited");

            keyboard.write_all(b"n\nquit\n").await.unwrap();
            screen
        };

        let (result, _screen) = tokio::join!(
            command_loop(&mut input, &mut console_out, &system, Path::new(".")),
            admin_side
        );

        result.unwrap();
        assert!(matches!(requests.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_export_write_failure_keeps_console_running() {
        let (system, _requests, pushes) = start_mock_system(&AdminConfig::default()).await;
        with_one_order(&system, &pushes).await;
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");

        let mut output = Vec::new();
        command_loop(&mut script("export\nhelp\nquit\n"), &mut output, &system, &missing)
            .await
            .unwrap();

        // `help` after the failed export still ran.
        assert!(String::from_utf8(output).unwrap().contains("commands:"));
        let notification = wait_for_notification(&system.notification_client, EXPORT_WRITE_FAILED).await;
        assert_eq!(notification.kind, NotificationKind::Error);
        assert!(!missing.exists());
    }

    #[tokio::test]
    async fn test_export_writes_file_and_notifies() {
        let (system, _requests, pushes) = start_mock_system(&AdminConfig::default()).await;
        with_one_order(&system, &pushes).await;
        let dir = tempfile::tempdir().unwrap();

        let mut output = Vec::new();
        command_loop(&mut script("export\n"), &mut output, &system, dir.path())
            .await
            .unwrap();

        let written: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert_eq!(written.len(), 1);
        let name = written[0].file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("majormania-orders-"));
        assert!(name.ends_with(".csv"));

        let text = std::fs::read_to_string(&written[0]).unwrap();
        assert!(text.starts_with("\"Order ID\""));
        assert!(text.contains("\"1001\""));

        let saved = format!("Saved {}", written[0].display());
        let notification = wait_for_notification(&system.notification_client, &saved).await;
        assert_eq!(notification.kind, NotificationKind::Info);
    }

    #[tokio::test]
    async fn test_missing_rows_and_bad_input_are_reported() {
        let (system, mut requests, pushes) = start_mock_system(&AdminConfig::default()).await;
        with_one_order(&system, &pushes).await;

        let mut output = Vec::new();
        command_loop(
            &mut script("call 5\nstatus 3 shipped\ndelete 2\nrefund 1\ncall 1\nquit\n"),
            &mut output,
            &system,
            Path::new("."),
        )
        .await
        .unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("No order on row 5"));
        assert!(text.contains("No order on row 3"));
        assert!(text.contains("No order on row 2"));
        assert!(!text.contains(DELETE_PROMPT));
        assert!(text.contains("Unknown command \"refund\""));
        assert!(text.contains("Opening tel:0123456789"));
        assert!(matches!(requests.try_recv(), Err(TryRecvError::Empty)));
    }
}
