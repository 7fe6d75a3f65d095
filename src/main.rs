use anyhow::Result;
use clap::Parser;
use coalflow::{CLIArguments, plan_main};

fn main() -> Result<()> {
    let args = CLIArguments::parse();

    plan_main(args.plan)
}
