use clap::Parser;
use hashbrown::HashSet;
use plan_model::{ActionName, Plan, PlanAction, UnarySpec};
use ta_encoder::Encoder;
use ta_ir::{Automaton, AutomataGlobals, AutomataSystem, Bounds, Location, Transition};

#[derive(Clone, Copy, PartialEq, Eq, Debug, clap::ValueEnum)]
pub enum Demo {
    /// Two-action plan, no constraints: just the copy-edge chain into `QUERY`.
    Plain,
    /// A `Future(bounds=[3,7], targets={running})` constraint on the first action.
    Future,
    /// A `Past(bounds=[2,5], targets={running})` constraint on the second action.
    Past,
}

#[derive(Parser, Debug)]
#[command(version, about = "Compiles a timed plan and metric temporal constraints into a timed-automata network.", long_about = None)]
pub struct Args {
    /// Which built-in demo plan/constraint to encode.
    #[arg(long, value_enum, default_value_t = Demo::Plain)]
    pub demo: Demo,
}

pub fn parse_args() -> Args {
    Args::parse()
}

fn sample_base() -> Automaton {
    Automaton::new(
        vec![Location::new("idle", "").initial(), Location::new("running", ""), Location::new("done", "")],
        vec![Transition::new("idle", "running", "start", "", "", ""), Transition::new("running", "done", "finish", "", "", "")],
        "base",
        true,
    )
}

fn sample_plan() -> Plan {
    Plan::new(vec![
        PlanAction::new(ActionName::new("pick", vec![]), Bounds::new(2, Some(6)), Bounds::new(0, Some(10)), Bounds::new(0, None)),
        PlanAction::new(ActionName::new("place", vec![]), Bounds::new(1, Some(4)), Bounds::new(6, Some(20)), Bounds::new(0, None)),
    ])
}

pub fn run(args: &Args) -> anyhow::Result<()> {
    let system = AutomataSystem {
        instances: vec![(sample_base(), "base".to_string())],
        globals: AutomataGlobals::default(),
    };
    let mut encoder = Encoder::new_encoder(&system, sample_plan(), 0);

    match args.demo {
        Demo::Plain => {}
        Demo::Future => {
            let spec = UnarySpec {
                bounds: Bounds::new(3, Some(7)),
                targets: HashSet::from_iter(["running".to_string()]),
            };
            if let Some(diag) = encoder.encode_future("running_soon", "pick::1", &spec)? {
                tracing::warn!(%diag, "demo constraint produced a diagnostic");
            }
        }
        Demo::Past => {
            let spec = UnarySpec {
                bounds: Bounds::new(2, Some(5)),
                targets: HashSet::from_iter(["running".to_string()]),
            };
            if let Some(diag) = encoder.encode_past("was_running", "place::2", &spec)? {
                tracing::warn!(%diag, "demo constraint produced a diagnostic");
            }
        }
    }

    let result = encoder.finalize();
    let (ta, name) = &result.instances[0];
    println!("automaton {name}: {} locations, {} transitions", ta.locations.len(), ta.transitions.len());
    for loc in &ta.locations {
        println!("  location {} invariant={:?} urgent={} initial={}", loc.id, loc.invariant, loc.urgent, loc.initial);
    }
    for t in &ta.transitions {
        println!("  {} -> {} guard={:?} update={:?} sync={:?}", t.source, t.dest, t.guard, t.update, t.sync);
    }
    Ok(())
}
