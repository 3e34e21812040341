//! Interactive `browse` loop.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use shelfscout_enrich::SimilarProductSource;
use shelfscout_scraper::RecordSource;
use shelfscout_session::Session;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::render::{render_outcome, render_page, SEARCHING};

const HELP: &str = "\
commands:
  show            redraw the current page
  page N          jump to page N
  next | prev     move one page
  similar ROW     search similar products for a row on this page (runs in the background)
  rescrape        fetch the page again
  export [PATH]   write every product to an xlsx file
  help            this text
  quit            leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ReplCommand {
    Show,
    Page(usize),
    Next,
    Prev,
    Similar(usize),
    Rescrape,
    Export(Option<PathBuf>),
    Help,
    Quit,
}

/// `Ok(None)` for a blank line.
pub(crate) fn parse_command(line: &str) -> Result<Option<ReplCommand>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();
    if words.next().is_some() {
        return Err(format!("too many arguments for `{verb}`"));
    }

    let number = |what: &str| -> Result<usize, String> {
        let raw = arg.ok_or_else(|| format!("`{verb}` needs a {what}"))?;
        raw.parse()
            .map_err(|_| format!("`{raw}` is not a valid {what}"))
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "show" | "ls" => ReplCommand::Show,
        "page" | "p" => ReplCommand::Page(number("page number")?),
        "next" | "n" => ReplCommand::Next,
        "prev" => ReplCommand::Prev,
        "similar" | "s" => ReplCommand::Similar(number("row number")?),
        "rescrape" => ReplCommand::Rescrape,
        "export" => ReplCommand::Export(arg.map(PathBuf::from)),
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" | "q" => ReplCommand::Quit,
        other => return Err(format!("unknown command `{other}` (try `help`)")),
    };
    Ok(Some(command))
}

async fn print_page<T: RecordSource, S: SimilarProductSource>(session: &Session<T, S>) {
    print!("{}", render_page(&session.page_view().await));
    print_message(session).await;
}

async fn print_message<T: RecordSource, S: SimilarProductSource>(session: &Session<T, S>) {
    if let Some(message) = session.message().current().await {
        println!("! {message}");
    }
}

/// Reads commands from stdin until `quit` or end of input.
///
/// # Errors
///
/// Returns an error only if stdin cannot be read. Command failures are
/// printed and the loop continues.
pub(crate) async fn run_repl<T, S>(
    session: &mut Session<T, S>,
    default_export: &Path,
) -> anyhow::Result<()>
where
    T: RecordSource,
    S: SimilarProductSource + 'static,
{
    println!("{HELP}");
    print_page(session).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        match command {
            ReplCommand::Show => print_page(session).await,
            ReplCommand::Page(n) => {
                session.set_page(n).await;
                print_page(session).await;
            }
            ReplCommand::Next => {
                session.next_page().await;
                print_page(session).await;
            }
            ReplCommand::Prev => {
                session.prev_page().await;
                print_page(session).await;
            }
            ReplCommand::Similar(row) => match session.prepare_enrichment(row) {
                Ok(pending) => {
                    println!("row {row}: {SEARCHING}");
                    tokio::spawn(async move {
                        let outcome = pending.run().await;
                        println!("{}", render_outcome(row, &outcome));
                    });
                }
                Err(e) => println!("{e}"),
            },
            ReplCommand::Rescrape => {
                if let Err(e) = session.scrape().await {
                    tracing::debug!(error = %e, "rescrape failed");
                }
                print_page(session).await;
            }
            ReplCommand::Export(path) => {
                let path = path.as_deref().unwrap_or(default_export);
                match session.export(path).await {
                    Ok(count) => println!("exported {count} products to {}", path.display()),
                    Err(e) => println!("{e}"),
                }
            }
            ReplCommand::Help => println!("{HELP}"),
            ReplCommand::Quit => break,
        }
    }
    Ok(())
}
