mod board;
mod session;

use std::env;
use std::io::{self, BufRead, Write};
use std::process;

use session::Session;

fn main() -> io::Result<()> {
    let persist_path = parse_args().unwrap_or_else(|err| {
        eprintln!("{err}");
        eprintln!("Usage: accessory-emulator [--persist <path>]");
        process::exit(2);
    });

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    let mut session = Session::new(persist_path);
    let mut line = String::new();

    writeln!(
        writer,
        "Accessory Controller Emulator ready. Type `help` for commands or `exit` to quit."
    )?;

    loop {
        line.clear();
        write!(writer, "> ")?;
        writer.flush()?;

        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            writeln!(writer)?;
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if should_terminate(trimmed) {
            writeln!(writer, "Session closed.")?;
            break;
        }

        for response in session.handle_command(trimmed) {
            writeln!(writer, "{response}")?;
        }
    }

    Ok(())
}

fn should_terminate(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

fn parse_args() -> Result<Option<String>, String> {
    let mut args = env::args().skip(1);
    match args.next() {
        None => Ok(None),
        Some(arg) if arg == "--persist" => args
            .next()
            .map(Some)
            .ok_or_else(|| "Expected path after --persist".to_string()),
        Some(arg) => arg
            .strip_prefix("--persist=")
            .map(|path| Some(path.to_string()))
            .ok_or_else(|| format!("Unknown argument `{arg}`")),
    }
}
