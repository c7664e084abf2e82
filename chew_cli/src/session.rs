//! `session`: interactive loop on the real clock.
//!
//! A reader thread forwards stdin lines over a channel; the loop polls the
//! controller every 100 ms. While the controller is busy only `home` and
//! `quit` are acted on; other commands stay queued until it is idle.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chew_camera::{NoCamera, StillCamera};
use chew_config::Config;
use chew_core::gemini::GeminiEstimator;
use chew_core::pacer::PacerEvent;
use chew_core::{SessionController, SessionEvent, UserIntent};
use chew_traits::{Camera, Estimator};
use crossbeam_channel as xch;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Intent(UserIntent),
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let cmd = match line.trim().to_ascii_lowercase().as_str() {
        "start" => Command::Intent(UserIntent::StartCapture),
        "snap" => Command::Intent(UserIntent::CapturePhoto),
        "go" => Command::Intent(UserIntent::ConfirmMealPrep),
        "pause" => Command::Intent(UserIntent::TogglePause),
        "end" => Command::Intent(UserIntent::EndSession),
        "home" => Command::Intent(UserIntent::ReturnToDashboard),
        "quit" | "exit" => Command::Quit,
        _ => return None,
    };
    Some(cmd)
}

/// Commands that may jump the queue while an analysis is pending.
fn allowed_while_busy(cmd: Command) -> bool {
    matches!(
        cmd,
        Command::Quit | Command::Intent(UserIntent::ReturnToDashboard)
    )
}

pub fn run_session(
    cfg: &Config,
    image: Option<&Path>,
    json: bool,
    shutdown: Arc<AtomicBool>,
) -> eyre::Result<()> {
    let estimator = GeminiEstimator::from_config(&cfg.estimator)?;
    let camera: Box<dyn Camera> = match image {
        Some(path) => Box::new(StillCamera::new(path)),
        None => {
            tracing::info!("no --image given; camera unavailable, demo mode will engage");
            Box::new(NoCamera)
        }
    };
    let controller =
        SessionController::new(camera, estimator).with_prefer_rear(cfg.camera.prefer_rear);
    drive(controller, json, &shutdown)
}

fn drive<C: Camera, E: Estimator + Send + Sync + 'static>(
    mut ctl: SessionController<C, E>,
    json: bool,
    shutdown: &AtomicBool,
) -> eyre::Result<()> {
    let (tx, rx) = xch::unbounded::<String>();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut line = String::new();
        loop {
            line.clear();
            match stdin.read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    if tx.send(line.trim().to_string()).is_err() {
                        break;
                    }
                }
            }
        }
        tracing::debug!("stdin closed");
    });

    print_view(&ctl, json);
    let mut queue: VecDeque<Command> = VecDeque::new();
    let mut stdin_open = true;

    loop {
        if shutdown.load(Ordering::Relaxed) {
            tracing::info!("interrupted; ending session");
            break;
        }

        if stdin_open {
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(line) if line.is_empty() => {}
                Ok(line) => match parse_command(&line) {
                    Some(cmd) => queue.push_back(cmd),
                    None => eprintln!("unknown command `{line}` (start|snap|go|pause|end|home|quit)"),
                },
                Err(xch::RecvTimeoutError::Timeout) => {}
                Err(xch::RecvTimeoutError::Disconnected) => stdin_open = false,
            }
        } else {
            std::thread::sleep(POLL_INTERVAL);
        }

        let events = ctl.poll();
        emit(&ctl, &events, json);

        while let Some(cmd) = next_command(&mut queue, ctl.is_busy()) {
            let intent = match cmd {
                Command::Quit => return Ok(()),
                Command::Intent(intent) => intent,
            };
            match ctl.handle(intent) {
                Ok(events) => emit(&ctl, &events, json),
                Err(e) => {
                    tracing::warn!(error = %e, "command rejected");
                    eprintln!("rejected: {e}");
                }
            }
        }

        if !stdin_open && queue.is_empty() && !ctl.is_busy() {
            break;
        }
    }
    // Dropping the controller releases the camera and cancels pending work.
    Ok(())
}

fn next_command(queue: &mut VecDeque<Command>, busy: bool) -> Option<Command> {
    if !busy {
        return queue.pop_front();
    }
    let pos = queue.iter().position(|c| allowed_while_busy(*c))?;
    queue.remove(pos)
}

fn emit<C: Camera, E: Estimator + Send + Sync + 'static>(
    ctl: &SessionController<C, E>,
    events: &[SessionEvent],
    json: bool,
) {
    if json {
        for ev in events {
            match serde_json::to_string(ev) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::warn!(error = %e, "event not serializable"),
            }
        }
        return;
    }
    for ev in events {
        match ev {
            SessionEvent::Notice { message } => println!("! {message}"),
            SessionEvent::BiteCounted { bites_taken } => println!("bite {bites_taken} done"),
            SessionEvent::Paused { paused: true } => println!("paused"),
            SessionEvent::Paused { paused: false } => println!("resumed"),
            _ => {}
        }
    }
    let redraw = events.iter().any(|e| {
        matches!(
            e,
            SessionEvent::ViewChanged { .. }
                | SessionEvent::Pacer {
                    pacer: PacerEvent::PhaseChanged { .. }
                }
        )
    });
    if redraw {
        print_view(ctl, false);
    }
}

fn print_view<C: Camera, E: Estimator + Send + Sync + 'static>(
    ctl: &SessionController<C, E>,
    json: bool,
) {
    if !json {
        print!("{}", chew_ui::render(&ctl.snapshot()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse_case_insensitively() {
        assert_eq!(
            parse_command(" Snap "),
            Some(Command::Intent(UserIntent::CapturePhoto))
        );
        assert_eq!(parse_command("quit"), Some(Command::Quit));
        assert_eq!(parse_command("dance"), None);
    }

    #[test]
    fn busy_queue_lets_home_through_and_keeps_the_rest() {
        let mut q: VecDeque<Command> = [
            Command::Intent(UserIntent::ConfirmMealPrep),
            Command::Intent(UserIntent::ReturnToDashboard),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            next_command(&mut q, true),
            Some(Command::Intent(UserIntent::ReturnToDashboard))
        );
        assert_eq!(next_command(&mut q, true), None);
        assert_eq!(
            next_command(&mut q, false),
            Some(Command::Intent(UserIntent::ConfirmMealPrep))
        );
    }
}
