//! Held Keys Example - Live key state in the terminal
//!
//! Shows which keys are pressed, held and released each frame.
//! Press Escape to quit.
//!
//! On terminals without key release reporting every key is released
//! right after the frame it was pressed in, so `Held` never shows.
//!
//! Run with: RUST_LOG=debug cargo run --example held_keys

use std::io::{stdout, Write};
use std::rc::Rc;
use std::cell::Cell;

use crossterm::cursor::MoveTo;
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{execute, queue};
use spark_keystate::input::{self, PollOptions};
use spark_keystate::{KeyEventKind, KeyPhase, Keyboard, KeysError};

fn run(keyboard: &mut Keyboard, releases: bool) -> Result<(), KeysError> {
    let options = PollOptions::default();
    let mut out = stdout();

    loop {
        input::poll_into(keyboard, &options)?;

        if keyboard.is_key_pressed(&["Escape"]) {
            return Ok(());
        }

        queue!(out, MoveTo(0, 0), Clear(ClearType::All))?;
        write!(out, "spark-keystate demo (Escape quits)\r\n\r\n")?;
        if let Some(last) = keyboard.last_transition() {
            write!(out, "last: {} {}\r\n", last.kind, last.code)?;
        }
        let tracked: Vec<_> = keyboard.held_keys().cloned().collect();
        for code in &tracked {
            let phase = keyboard.phase(code).unwrap_or(KeyPhase::Released);
            let text = keyboard
                .payload(code)
                .map(|p| p.key.clone())
                .unwrap_or_default();
            write!(out, "{:<14} {:<8} {:?}\r\n", code.as_str(), format!("{:?}", phase), text)?;
        }
        out.flush()?;

        keyboard.update();

        if !releases {
            for code in tracked {
                keyboard.release(code);
            }
        }
    }
}

fn main() {
    env_logger::init();

    let mut keyboard = Keyboard::new();

    let jumps = Rc::new(Cell::new(0u32));
    let jumps_clone = jumps.clone();
    keyboard.on_key(KeyEventKind::Pressed, "Space", move |_| {
        jumps_clone.set(jumps_clone.get() + 1);
    });

    if let Err(e) = terminal::enable_raw_mode() {
        eprintln!("Failed to enter raw mode: {}", e);
        return;
    }

    let releases = match input::enable_release_events() {
        Ok(()) => true,
        Err(e) => {
            log::warn!("{}", e);
            false
        }
    };

    let result = run(&mut keyboard, releases);

    if releases {
        let _ = input::disable_release_events();
    }
    let _ = execute!(stdout(), Clear(ClearType::All), MoveTo(0, 0));
    let _ = terminal::disable_raw_mode();

    match result {
        Ok(()) => println!("Space pressed {} time(s)", jumps.get()),
        Err(e) => eprintln!("Demo failed: {}", e),
    }
}
