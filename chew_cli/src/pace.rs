//! `pace`: print the pacer timeline without waiting on the wall clock.

use std::io::{self, Write};

use chew_core::pacer::{PacerEngine, PacerEvent, cycle_length_ms};
use chew_ui::pacer_visual;

pub fn run_pace(target_chews: u32, cycles: u32, json: bool) -> eyre::Result<()> {
    let mut pacer = PacerEngine::new(target_chews);
    let step_ms = cycle_length_ms(pacer.target_chews());
    tracing::info!(target_chews = pacer.target_chews(), cycles, step_ms, "pace start");

    let mut out = io::stdout().lock();
    write_events(&mut out, &pacer.activate(0), json)?;
    // One cycle per batch so output streams and memory stays flat.
    for k in 1..=u64::from(cycles) {
        let batch = pacer.advance(step_ms.saturating_mul(k));
        write_events(&mut out, &batch, json)?;
    }
    out.flush()?;
    tracing::info!(bites = pacer.cycles(), "pace done");
    Ok(())
}

fn write_events(out: &mut impl Write, events: &[PacerEvent], json: bool) -> eyre::Result<()> {
    for ev in events {
        if json {
            writeln!(out, "{}", serde_json::to_string(ev)?)?;
        } else {
            writeln!(out, "{}", describe(ev))?;
        }
    }
    Ok(())
}

fn describe(ev: &PacerEvent) -> String {
    match *ev {
        PacerEvent::PhaseChanged { phase, at_ms } => {
            let v = pacer_visual(phase);
            format!("{:>8}  {:<8} {}", stamp(at_ms), phase.as_str(), v.instruction)
        }
        PacerEvent::ChewCounted { count, at_ms } => format!("{:>8}  chew {count}", stamp(at_ms)),
        PacerEvent::BiteCompleted { cycle, at_ms } => {
            format!("{:>8}  bite {cycle} complete", stamp(at_ms))
        }
    }
}

/// `12.6s`
fn stamp(at_ms: u64) -> String {
    format!("{}.{}s", at_ms / 1000, (at_ms % 1000) / 100)
}
