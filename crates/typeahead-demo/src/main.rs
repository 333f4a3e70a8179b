#![forbid(unsafe_code)]

//! Typeahead demo binary entry point.

use std::io::{self, Write};
use std::time::Duration;

use crossterm::{cursor, queue, style, terminal as ct};
use typeahead_demo::app::{self, DemoApp, Flow};
use typeahead_demo::cli;
use typeahead_demo::terminal::Session;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

fn draw(lines: &[String]) -> io::Result<()> {
    let mut stdout = io::stdout();
    for (row, line) in lines.iter().enumerate() {
        let row = u16::try_from(row).unwrap_or(u16::MAX);
        queue!(
            stdout,
            cursor::MoveTo(0, row),
            ct::Clear(ct::ClearType::CurrentLine),
            style::Print(line)
        )?;
    }
    queue!(stdout, ct::Clear(ct::ClearType::FromCursorDown))?;
    stdout.flush()
}

fn run(app: &mut DemoApp, mouse: bool) -> io::Result<()> {
    let session = Session::new(mouse)?;
    draw(&app.view())?;
    loop {
        if let Some(event) = session.next_event(POLL_INTERVAL)?
            && app.handle_event(&event) == Flow::Quit
        {
            break;
        }
        if app.pump() {
            draw(&app.view())?;
        }
    }
    Ok(())
}

fn main() {
    let opts = cli::Opts::parse();

    if let Some(filter) = &opts.log
        && !typeahead_core::logging::init_json_logging(filter)
    {
        eprintln!("Logging already initialized; ignoring --log");
    }

    let records = match app::load_records(opts.data.as_deref()) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("Failed to load records: {e}");
            std::process::exit(1);
        }
    };
    let config = match app::build_config(&opts) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    let mut demo = DemoApp::new(records, config, Duration::from_millis(opts.latency_ms));
    if let Err(e) = run(&mut demo, opts.mouse) {
        eprintln!("Runtime error: {e}");
        std::process::exit(1);
    }

    for record in demo.selections() {
        println!("{record}");
    }
}
