use std::io::{BufRead, Write, stdin, stdout};

use miette::{IntoDiagnostic, Result, miette};
use tracing_subscriber::EnvFilter;

use ice_adapter::{Adapter, ResultSet, SqliteConnection};

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(false)
                .context_lines(3)
                .tab_width(4)
                .break_words(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    miette::set_panic_hook();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "./ice.db".to_string());
    let conn = SqliteConnection::open(&path)?;
    let mut adapter = Adapter::new(conn);

    println!("Connected to {path}");
    println!(r"Commands: \batch, \flush, \last, exit");

    let mut buf = String::new();
    let mut batching = false;

    let mut stdin = stdin().lock();
    let mut stdout = stdout().lock();

    loop {
        let prompt = if batching { "BATCH: " } else { "ICE: " };
        stdout.write_all(prompt.as_bytes()).into_diagnostic()?;
        stdout.flush().into_diagnostic()?;

        buf.clear();
        let Ok(read) = stdin.read_line(&mut buf) else {
            return Err(miette!("Input reading failed"));
        };
        if read == 0 {
            break;
        }

        let input = buf.trim();
        match input {
            "" => continue,
            "exit" => break,
            r"\batch" => {
                adapter.start_batch();
                batching = true;
                continue;
            }
            r"\flush" => {
                batching = false;
                match adapter.batch_update() {
                    Ok(counts) => println!("Batch affected {counts:?}"),
                    Err(err) => println!("{:?}", miette::Report::new(err)),
                }
                continue;
            }
            r"\last" => {
                match adapter.last_error() {
                    Some(err) => println!("{:?}", miette::Report::new(err.clone())),
                    None => println!("No errors"),
                }
                continue;
            }
            _ => {}
        }

        if batching {
            if let Err(err) = adapter.add_batch(input) {
                println!("{:?}", miette::Report::new(err));
            }
            continue;
        }

        let is_query = ["SELECT", "WITH", "PRAGMA", "EXPLAIN"]
            .iter()
            .any(|word| {
                input
                    .get(..word.len())
                    .is_some_and(|head| head.eq_ignore_ascii_case(word))
            });

        if is_query {
            match adapter.select_query_raw(input) {
                Ok(set) => print_results(&mut stdout, &set)?,
                Err(err) => println!("{:?}", miette::Report::new(err)),
            }
        } else {
            match adapter.update_query_raw(input) {
                Ok(count) => println!("{count} row(s) affected"),
                Err(err) => println!("{:?}", miette::Report::new(err)),
            }
        }
    }

    println!("Exiting Ice");

    Ok(())
}

fn print_results(stdout: &mut impl Write, set: &ResultSet) -> Result<()> {
    stdout
        .write_all(format!("{: <8}", "Results").as_bytes())
        .into_diagnostic()?;
    for column in &set.columns {
        stdout
            .write_all(format!(" | {column: <8}").as_bytes())
            .into_diagnostic()?;
    }
    stdout.write_all(b"\n").into_diagnostic()?;

    for (idx, row) in set.rows.iter().enumerate() {
        stdout
            .write_all(format!("{idx: <8}").as_bytes())
            .into_diagnostic()?;
        for value in row {
            stdout
                .write_all(format!(" | {: <8}", value.to_string()).as_bytes())
                .into_diagnostic()?;
        }
        stdout.write_all(b"\n").into_diagnostic()?;
    }

    stdout.flush().into_diagnostic()
}
