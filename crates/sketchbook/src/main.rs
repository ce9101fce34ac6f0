mod cli;
mod export;
mod run;

use anyhow::Result;
use cli::{Command, KnobsArgs};
use serde::Serialize;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Some(Command::Render(args)) => export::export(args),
        Some(Command::Knobs(args)) => print_knobs(args),
        None => run::run(cli.run),
    }
}

#[derive(Serialize)]
struct KnobRow<'a> {
    name: &'a str,
    label: &'a str,
    min: f64,
    max: f64,
    step: f64,
    default: f64,
}

fn print_knobs(args: KnobsArgs) -> Result<()> {
    let schema = args.sketch.schema();
    if args.json {
        let rows: Vec<KnobRow<'_>> = schema
            .iter()
            .map(|knob| KnobRow {
                name: knob.name,
                label: knob.label,
                min: knob.min,
                max: knob.max,
                step: knob.step,
                default: knob.default,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("{} ({}):", schema.title, schema.sketch);
    for knob in schema.iter() {
        println!(
            "  {:<26} {:<22} default={:<6} range={}..{} step={}",
            knob.name, knob.label, knob.default, knob.min, knob.max, knob.step
        );
    }
    Ok(())
}
