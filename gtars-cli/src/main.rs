mod anyvar;

use anyhow::Result;
use clap::Command;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "gtars";
    pub const BIN_NAME: &str = "gtars";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .author("Databio")
        .about("Tools for translating, identifying and registering GA4GH VRS variation objects.")
        .subcommand_required(true)
        .subcommand(anyvar::cli::create_anyvar_cli())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let app = build_parser();
    let matches = app.get_matches();

    match matches.subcommand() {
        //
        // ANYVAR
        //
        Some((anyvar::cli::ANYVAR_CMD, matches)) => {
            anyvar::handlers::run_anyvar(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}
