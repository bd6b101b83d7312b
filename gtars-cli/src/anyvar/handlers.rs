use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use log::info;
use serde_json::Value;

use gtars_anyvar::consts::*;
use gtars_anyvar::store::ObjectStore;
use gtars_anyvar::{AnyVar, AnyVarBuilder, Definition, Format};
use gtars_vrs::{FormatTranslator, VrsObject};

fn builder_from_matches(matches: &ArgMatches) -> AnyVarBuilder {
    let mut builder = AnyVarBuilder::new();
    if let Some(dir) = matches.get_one::<String>("seqrepo") {
        builder = builder.with_seqrepo_dir(PathBuf::from(dir));
    }
    if let Ok(Some(store)) = matches.try_get_one::<String>("store") {
        builder = builder.with_store_path(PathBuf::from(store));
    }
    builder
}

fn print_json(object: &VrsObject) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(object)?);
    Ok(())
}

fn translate_from_matches<T: FormatTranslator, S: ObjectStore>(
    av: &AnyVar<T, S>,
    matches: &ArgMatches,
) -> Result<VrsObject> {
    let format = matches
        .get_one::<String>("format")
        .context("A format is required")?;
    let definition = matches
        .get_one::<String>("definition")
        .context("A definition is required")?;

    if format == "text" {
        return Ok(av.translate_text(definition));
    }
    let format: Format = format.parse()?;
    let definition = match format {
        Format::Ga4gh => Definition::Structured(
            serde_json::from_str::<Value>(definition).context("ga4gh definitions must be JSON")?,
        ),
        _ => Definition::Text(definition.to_string()),
    };
    Ok(av.translate_as(definition, format)?)
}

/// Run the round trip on an in-memory store: translate, register, retrieve
/// with expansion and compare.
fn run_demo(matches: &ArgMatches) -> Result<()> {
    let mut av = builder_from_matches(matches)
        .with_in_memory_store()
        .finish()?;

    let allele = av.translate(DEMO_HGVS, "hgvs")?;
    let id = av.register(&allele)?;
    let round_tripped = av.retrieve(&id, true)?;
    if round_tripped != allele {
        bail!("Round trip of {} produced a different object", DEMO_HGVS);
    }
    info!("Round trip of {} succeeded", DEMO_HGVS);
    println!("{}\t{}", DEMO_HGVS, id);
    print_json(&round_tripped)
}

/// Execute the anyvar subcommands
/// # Arguments
/// - matches: matched items from CLAP args
pub fn run_anyvar(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some((ANYVAR_TRANSLATE, matches)) => {
            let av = builder_from_matches(matches).with_in_memory_store().finish()?;
            let object = translate_from_matches(&av, matches)?;
            print_json(&object)
        }
        Some((ANYVAR_REGISTER, matches)) => {
            let mut av = builder_from_matches(matches).finish()?;
            let object = translate_from_matches(&av, matches)?;
            let id = av.register(&object)?;
            println!("{}", id);
            Ok(())
        }
        Some((ANYVAR_RETRIEVE, matches)) => {
            let id = matches
                .get_one::<String>("id")
                .context("An identifier is required")?;
            let expand = matches.get_flag("expand");
            let av = builder_from_matches(matches).finish()?;
            let object = av.retrieve(id, expand)?;
            print_json(&object)
        }
        Some((ANYVAR_LIST, matches)) => {
            let av = builder_from_matches(matches).finish()?;
            let ids = av.list()?;
            for id in &ids {
                println!("{}", id);
            }
            info!("Number of registered objects: {}", ids.len());
            Ok(())
        }
        Some((ANYVAR_DEMO, matches)) => run_demo(matches),
        _ => unreachable!("Unknown ANYVAR subcommand"),
    }
}
