mod alpha_bleed;
mod commands;
mod config;
mod glob;
mod image;
mod inputs;
mod lua_ast;
mod metadata;
mod options;
mod spritesheet;
mod template;

use std::process;

use structopt::StructOpt;

use crate::options::Options;

fn main() {
    let options = Options::from_args();

    let default_filter = if options.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match run(options) {
        Ok(_) => {}
        Err(err) => {
            eprintln!("Error: {:?}", err);
            process::exit(1);
        }
    }
}

fn run(options: Options) -> anyhow::Result<()> {
    commands::pack(options)
}
