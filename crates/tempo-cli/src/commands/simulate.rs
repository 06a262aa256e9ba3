//! Simulate command — drives the dispatcher from a deterministic frame loop

use anyhow::{Context, Result};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tempo_runtime::{Dispatcher, FixedUpdate, LateUpdate, Phase, Update};

use crate::clock::FrameClock;

pub struct SimulateArgs {
    pub frames: u64,
    pub frame_ms: f64,
    pub config: Option<String>,
}

/// Counts every phase it receives
#[derive(Debug, Default)]
struct Body {
    fixed: u64,
    updates: u64,
    late: u64,
}

impl FixedUpdate for Body {
    fn fixed_update(&mut self) {
        self.fixed += 1;
    }
}

impl Update for Body {
    fn update(&mut self) {
        self.updates += 1;
    }
}

impl LateUpdate for Body {
    fn late_update(&mut self) {
        self.late += 1;
    }
}

/// Runs one fixed step, then unregisters itself
struct OneShot {
    dispatcher: Rc<Dispatcher>,
    me: Weak<RefCell<OneShot>>,
    fired: u64,
}

impl FixedUpdate for OneShot {
    fn fixed_update(&mut self) {
        self.fired += 1;
        if let Some(me) = self.me.upgrade() {
            self.dispatcher.remove_fixed_update(&me);
        }
    }
}

/// Registers a fresh `Body` for updates the first time it runs
struct Spawner {
    dispatcher: Rc<Dispatcher>,
    children: Vec<Rc<RefCell<Body>>>,
}

impl Update for Spawner {
    fn update(&mut self) {
        if self.children.is_empty() {
            let child = Rc::new(RefCell::new(Body::default()));
            self.dispatcher.add_update(&child);
            self.children.push(child);
        }
    }
}

/// Run `frames` frames of `frame_secs` each: fixed steps owed by the clock,
/// then update, then late update. Returns the number of fixed steps run.
fn run_frames(
    dispatcher: &Dispatcher,
    clock: &mut FrameClock,
    frames: u64,
    frame_secs: f64,
) -> u64 {
    let mut fixed_steps = 0;
    for _ in 0..frames {
        clock.advance(frame_secs);
        while clock.should_fixed_update() {
            dispatcher.dispatch_fixed_update();
            clock.consume_fixed_step();
            fixed_steps += 1;
        }
        dispatcher.dispatch_update();
        dispatcher.dispatch_late_update();
    }
    fixed_steps
}

pub fn run(args: SimulateArgs) -> Result<()> {
    let config = super::resolve_config(args.config.as_deref())?;
    let frame_secs = args.frame_ms / 1000.0;
    if !(frame_secs > 0.0) {
        anyhow::bail!("--frame-ms must be positive, got {}", args.frame_ms);
    }

    let dispatcher = Rc::new(Dispatcher::with_config(&config.dispatcher));
    let mut clock =
        FrameClock::from_config(&config.clock).context("Invalid clock configuration")?;

    let body = Rc::new(RefCell::new(Body::default()));
    dispatcher.add_fixed_update(&body);
    dispatcher.add_update(&body);
    dispatcher.add_late_update(&body);

    let one_shot = Rc::new_cyclic(|me| {
        RefCell::new(OneShot {
            dispatcher: dispatcher.clone(),
            me: me.clone(),
            fired: 0,
        })
    });
    dispatcher.add_fixed_update(&one_shot);

    let spawner = Rc::new(RefCell::new(Spawner {
        dispatcher: dispatcher.clone(),
        children: Vec::new(),
    }));
    dispatcher.add_update(&spawner);

    // Dropped without unregistering: stays in the sequence as a stale handle
    let ghost = Rc::new(RefCell::new(Body::default()));
    dispatcher.add_update(&ghost);
    drop(ghost);

    // Scoped for the first half of the run only
    let scoped = Rc::new(RefCell::new(Body::default()));
    let registration = dispatcher.register_late_update(&scoped);

    log::info!(
        "Simulating {} frames of {:.3} ms at {:.1} Hz fixed rate",
        args.frames,
        args.frame_ms,
        1.0 / clock.fixed_timestep
    );

    let first_half = args.frames / 2;
    let mut fixed_steps = run_frames(&dispatcher, &mut clock, first_half, frame_secs);
    drop(registration);
    fixed_steps += run_frames(&dispatcher, &mut clock, args.frames - first_half, frame_secs);

    let pruned = dispatcher.prune_stale();

    println!("Frames:        {}", clock.frame_count());
    println!("Simulated:     {:.3} s", clock.total_time);
    println!("Fixed steps:   {}", fixed_steps);
    println!();
    println!("{:<14}{:>12}{:>10}{:>8}{:>8}", "phase", "dispatches", "invoked", "stale", "busy");
    for phase in Phase::ALL {
        let stats = dispatcher.stats(phase);
        println!(
            "{:<14}{:>12}{:>10}{:>8}{:>8}",
            phase.to_string(),
            stats.dispatches,
            stats.invoked,
            stats.skipped_stale,
            stats.skipped_busy
        );
    }
    println!();
    println!("Body:          {:?}", body.borrow());
    println!("One-shot:      fired {} time(s)", one_shot.borrow().fired);
    if let Some(child) = spawner.borrow().children.first() {
        println!("Spawned child: {} update(s)", child.borrow().updates);
    }
    println!("Scoped body:   {} late update(s)", scoped.borrow().late);
    println!("Pruned stale:  {}", pruned);

    Ok(())
}
