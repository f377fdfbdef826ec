//! Command-line host for the net engine: create, inspect, run and convert
//! TPNS files.
use anyhow::{Context, Result};
use clap::{Arg, Command, value_parser};

use tpns::net::{Network, Step, io};

fn make_cli() -> Command {
    Command::new("tpns")
        .about("Petri net simulator for TPNS files")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("new")
                .about("Write an empty network")
                .arg(Arg::new("file").required(true)),
        )
        .subcommand(
            Command::new("show")
                .about("Print a summary of a network")
                .arg(Arg::new("file").required(true)),
        )
        .subcommand(
            Command::new("run")
                .about("Run the simulation until no transition is enabled")
                .arg(Arg::new("file").required(true))
                .arg(
                    Arg::new("steps")
                        .long("steps")
                        .value_parser(value_parser!(u64))
                        .default_value("1000")
                        .help("Upper bound on the number of steps"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_parser(value_parser!(u64))
                        .help("Seed for the random firing choice"),
                )
                .arg(
                    Arg::new("save")
                        .long("save")
                        .value_name("FILE")
                        .help("Write the final state back to FILE"),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Dump a network as JSON or RON")
                .arg(Arg::new("file").required(true))
                .arg(
                    Arg::new("format")
                        .long("format")
                        .value_parser(["json", "ron"])
                        .default_value("json"),
                ),
        )
}

fn show(net: &Network) {
    println!(
        "{} place(s), {} transition(s)",
        net.place_count(),
        net.transition_count()
    );
    for (id, place) in net.places() {
        let arcs: Vec<String> = place
            .arcs()
            .iter()
            .filter_map(|arc| arc.target())
            .map(|t| format!("-> t{t}"))
            .collect();
        println!(
            "  place {id} at ({}, {}): {} token(s) {}",
            place.pos.x,
            place.pos.y,
            place.tokens(),
            arcs.join(" ")
        );
    }
    for (id, transition) in net.transitions() {
        let inputs: Vec<String> = transition.input_places().map(|p| format!("p{p}")).collect();
        let outputs: Vec<String> = transition.output_places().map(|p| format!("p{p}")).collect();
        println!(
            "  transition {id} at ({}, {}): in [{}] out [{}]",
            transition.pos.x,
            transition.pos.y,
            inputs.join(", "),
            outputs.join(", ")
        );
    }
    let enabled = net.enabled_transitions();
    if enabled.is_empty() {
        println!("no enabled transition");
    } else {
        let ids: Vec<String> = enabled.iter().map(|t| format!("t{t}")).collect();
        println!("enabled: {}", ids.join(", "));
    }
}

fn main() -> Result<()> {
    let env = env_logger::Env::new().filter_or("RUST_LOG", "info");
    env_logger::init_from_env(env);

    let matches = make_cli().get_matches();
    match matches.subcommand() {
        Some(("new", sub)) => {
            let file = sub.get_one::<String>("file").context("missing file")?;
            Network::new()
                .save_to(file)
                .with_context(|| format!("writing {file}"))?;
            println!("wrote empty network to {file}");
        }
        Some(("show", sub)) => {
            let file = sub.get_one::<String>("file").context("missing file")?;
            let net = Network::load_from(file).with_context(|| format!("loading {file}"))?;
            show(&net);
        }
        Some(("run", sub)) => {
            let file = sub.get_one::<String>("file").context("missing file")?;
            let mut net = Network::load_from(file).with_context(|| format!("loading {file}"))?;
            if let Some(seed) = sub.get_one::<u64>("seed") {
                net.reseed(*seed);
            }
            let steps = *sub.get_one::<u64>("steps").context("missing steps")?;
            let mut fired = 0u64;
            for round in 1..=steps {
                match net.step() {
                    Step::Fired(t) => {
                        fired += 1;
                        println!("step {round}: fired t{t}");
                    }
                    Step::NoEnabledTransition => {
                        println!("step {round}: no enabled transition, stopping");
                        break;
                    }
                }
            }
            println!("fired {fired} transition(s)");
            for (id, tokens) in net.marking() {
                println!("  place {id}: {tokens} token(s)");
            }
            if let Some(out) = sub.get_one::<String>("save") {
                net.save_to(out).with_context(|| format!("writing {out}"))?;
                println!("saved final state to {out}");
            }
        }
        Some(("export", sub)) => {
            let file = sub.get_one::<String>("file").context("missing file")?;
            let net = Network::load_from(file).with_context(|| format!("loading {file}"))?;
            let format = sub.get_one::<String>("format").context("missing format")?;
            let text = match format.as_str() {
                "ron" => io::to_ron_string(&net)?,
                _ => io::to_json_string(&net)?,
            };
            println!("{text}");
        }
        _ => unreachable!("subcommand_required is set"),
    }
    Ok(())
}
