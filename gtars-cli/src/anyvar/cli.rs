use clap::{Arg, ArgAction, Command};

pub use gtars_anyvar::consts::*;

fn format_arg() -> Arg {
    Arg::new("format")
        .long("format")
        .short('f')
        .required(true)
        .value_parser(["ga4gh", "beacon", "hgvs", "gnomad", "spdi", "text"])
        .help("Format of the definition; 'ga4gh' takes a JSON object of Allele fields")
}

fn store_arg() -> Arg {
    Arg::new("store")
        .long("store")
        .short('s')
        .help("Path to the SQLite object store [default: $ANYVAR_STORE or ~/.anyvar/anyvar.sqlite]")
}

pub fn create_anyvar_cli() -> Command {
    Command::new(ANYVAR_CMD)
        .author("Databio")
        .about("Translate, register and retrieve GA4GH VRS variation objects")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("seqrepo")
                .long("seqrepo")
                .global(true)
                .help("Reference sequence directory [default: $SEQREPO_DIR or /usr/local/share/seqrepo/latest]"),
        )
        .subcommand(
            Command::new(ANYVAR_TRANSLATE)
                .about("Translate a definition and print the VRS object as JSON")
                .arg(format_arg())
                .arg(Arg::new("definition").required(true)),
        )
        .subcommand(
            Command::new(ANYVAR_REGISTER)
                .about("Translate a definition, register it and print its identifier")
                .arg(format_arg())
                .arg(Arg::new("definition").required(true))
                .arg(store_arg()),
        )
        .subcommand(
            Command::new(ANYVAR_RETRIEVE)
                .about("Print a registered object as JSON")
                .arg(Arg::new("id").required(true))
                .arg(
                    Arg::new("expand")
                        .long("expand")
                        .short('e')
                        .action(ArgAction::SetTrue)
                        .help("Inline nested objects instead of printing their identifiers"),
                )
                .arg(store_arg()),
        )
        .subcommand(
            Command::new(ANYVAR_LIST)
                .about("List the identifiers of all registered objects")
                .arg(store_arg()),
        )
        .subcommand(
            Command::new(ANYVAR_DEMO)
                .about("Translate, register and retrieve an example HGVS variant in memory"),
        )
}
