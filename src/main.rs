use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use judq::utils::{
    get_catalog_path, get_presets_path, load_catalog, load_presets, presets_configured, today,
};
use judq::{Intensity, ResolveError, SelectionWarning, Session, TagPolicy};
use tracing_subscriber::EnvFilter;

/// judq - boolean query builder for judicial decision search
#[derive(Parser)]
#[command(name = "judq")]
#[command(about = "Compose boolean search queries for judicial decisions")]
#[command(version)]
struct Cli {
    /// Tag catalog JSON file
    #[arg(long, value_name = "PATH", global = true)]
    catalog: Option<PathBuf>,

    /// Preset JSON file
    #[arg(long, value_name = "PATH", global = true)]
    presets: Option<PathBuf>,

    /// Share-link query string to restore the session from
    #[arg(long, value_name = "QUERY", global = true)]
    state: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Print the composed query
    Compose(ComposeCommand),
    /// Include tags matched by free text
    Resolve(ResolveCommand),
    /// Apply a preset
    Preset(PresetCommand),
    /// Toggle a tag between included and untouched
    Toggle(TagCommand),
    /// Toggle a tag's exclusion
    Exclude(TagCommand),
    /// Print fitness, what the query is built from and its settings
    Explain,
}

#[derive(Parser)]
struct ComposeCommand {
    /// loose, balanced or strict; defaults to the session's intensity
    #[arg(short, long, value_name = "LEVEL", value_parser = parse_intensity)]
    intensity: Option<Intensity>,
}

#[derive(Parser)]
struct ResolveCommand {
    /// Colloquial phrases separated by spaces or commas
    #[arg(value_name = "TEXT")]
    text: String,
}

#[derive(Parser)]
struct PresetCommand {
    #[arg(value_name = "ID")]
    id: String,
}

#[derive(Parser)]
struct TagCommand {
    #[arg(value_name = "TAG_ID")]
    id: String,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Determines if an error is a user error (vs internal error).
///
/// User errors are selection warnings, empty free text and unknown ids.
/// Catalog and preset loading failures are internal.
fn is_user_error(error: &anyhow::Error) -> bool {
    error.downcast_ref::<SelectionWarning>().is_some()
        || error.downcast_ref::<ResolveError>().is_some()
        || error.to_string().starts_with("Unknown")
}

fn run(cli: &Cli) -> Result<()> {
    let catalog_path = get_catalog_path(cli.catalog.as_deref())?;
    let presets_path = get_presets_path(cli.presets.as_deref())?;

    let catalog = load_catalog(&catalog_path)?;
    let presets = load_presets(&presets_path, presets_configured(cli.presets.as_deref()))?;
    let policy = TagPolicy::from_env();

    let mut session = match &cli.state {
        Some(query) => Session::restore(catalog, presets, policy, query, today()),
        None => Session::new(catalog, presets, policy, today()),
    };

    let mut out = Vec::new();
    let result = execute(&cli.command, &mut session, &mut out);
    print!("{}", String::from_utf8_lossy(&out));
    result
}

/// Runs one command against a session, writing output lines to `out`.
///
/// The share query is always the last line, even when the command fails
/// with a user error.
fn execute(command: &Commands, session: &mut Session, out: &mut Vec<u8>) -> Result<()> {
    use std::io::Write;

    let result = match command {
        Commands::Compose(cmd) => {
            let composed = match cmd.intensity {
                Some(intensity) => session
                    .warning()
                    .map_or_else(|| Ok(session.compose(intensity)), Err),
                None => session.generate(),
            };
            match composed {
                Ok(query) => {
                    writeln!(out, "{query}")?;
                    Ok(())
                }
                Err(warning) => Err(warning.into()),
            }
        }
        Commands::Resolve(cmd) => session
            .apply_free_text(&cmd.text)
            .map_err(anyhow::Error::from)
            .and_then(|outcome| {
                for id in &outcome.applied {
                    writeln!(out, "+ {id}")?;
                }
                writeln!(out, "{outcome}")?;
                Ok(())
            }),
        Commands::Preset(cmd) => match session.apply_preset(&cmd.id) {
            Some(applied) => {
                writeln!(out, "{applied} tags applied")?;
                writeln!(out, "{}", session.compose(session.config().intensity))?;
                Ok(())
            }
            None => Err(anyhow::anyhow!("Unknown preset: {}", cmd.id)),
        },
        Commands::Toggle(cmd) => toggle(session, &cmd.id, false, out),
        Commands::Exclude(cmd) => toggle(session, &cmd.id, true, out),
        Commands::Explain => {
            let fitness = session.fitness();
            writeln!(out, "推薦檢索字詞（{}）", session.config().intensity.label())?;
            writeln!(out, "{} {}", fitness.label(), fitness.hint())?;
            writeln!(out, "{}", session.summary())?;
            writeln!(out, "{}", session.meta())?;
            Ok(())
        }
    };

    writeln!(out, "?{}", session.share_query())?;
    result
}

fn toggle(session: &mut Session, id: &str, exclude: bool, out: &mut Vec<u8>) -> Result<()> {
    use std::io::Write;

    if session.catalog().get(id).is_none() {
        anyhow::bail!("Unknown tag: {id}");
    }

    let changed = if exclude {
        session.toggle_exclude(id)
    } else {
        session.cycle(id)
    };
    let state = session
        .selection()
        .get(id)
        .map_or_else(|| "untouched".to_string(), |mark| mark.to_string());

    if changed {
        writeln!(out, "{id}: {state}")?;
    } else {
        writeln!(out, "{id}: {state} (unchanged)")?;
    }
    Ok(())
}

fn parse_intensity(value: &str) -> Result<Intensity, String> {
    Intensity::parse(value).ok_or_else(|| format!("invalid intensity: {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use judq::{Catalog, Preset, Scope, TagBuilder, TagGroup, TagId};
    use time::macros::date;

    fn session() -> Session {
        let catalog = Catalog::from_tags(vec![
            TagBuilder::new("traffic_accident")
                .legal_core("交通事故")
                .group(TagGroup::Core)
                .build(),
            TagBuilder::new("tort_compensation")
                .legal_core("侵權行為")
                .group(TagGroup::Core)
                .build(),
            TagBuilder::new("fracture")
                .labels("骨折", "骨折")
                .legal_core("骨折")
                .group(TagGroup::Detail)
                .build(),
        ])
        .unwrap();
        let presets = vec![Preset::new(
            "bones",
            "骨折",
            Scope::Civil,
            vec![TagId::new("fracture")],
        )];
        Session::new(catalog, presets, TagPolicy::default(), date!(2026 - 10 - 19))
    }

    fn lines(out: &[u8]) -> Vec<String> {
        String::from_utf8_lossy(out)
            .lines()
            .map(String::from)
            .collect()
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "judq",
            "compose",
            "--intensity",
            "strict",
            "--catalog",
            "tags.json",
        ])
        .unwrap();

        assert_eq!(cli.catalog, Some(PathBuf::from("tags.json")));
        assert!(matches!(
            cli.command,
            Commands::Compose(ComposeCommand {
                intensity: Some(Intensity::Strict)
            })
        ));
    }

    #[test]
    fn rejects_unknown_intensity() {
        let result = Cli::try_parse_from(["judq", "compose", "--intensity", "extreme"]);
        assert!(result.is_err());
    }

    #[test]
    fn compose_warning_is_a_user_error_and_still_prints_share_query() {
        let mut session = session();
        let mut out = Vec::new();

        let err = execute(
            &Commands::Compose(ComposeCommand { intensity: None }),
            &mut session,
            &mut out,
        )
        .unwrap_err();

        assert!(is_user_error(&err));
        let lines = lines(&out);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("?mode=simple"));
    }

    #[test]
    fn toggle_then_compose() {
        let mut session = session();
        let mut out = Vec::new();

        execute(
            &Commands::Toggle(TagCommand {
                id: "fracture".to_string(),
            }),
            &mut session,
            &mut out,
        )
        .unwrap();
        assert_eq!(lines(&out)[0], "fracture: include");

        let mut out = Vec::new();
        execute(
            &Commands::Compose(ComposeCommand { intensity: None }),
            &mut session,
            &mut out,
        )
        .unwrap();
        assert_eq!(lines(&out)[0], "交通事故&侵權行為&骨折");
    }

    #[test]
    fn unknown_tag_and_preset_are_user_errors() {
        let mut session = session();
        let mut out = Vec::new();

        let err = execute(
            &Commands::Exclude(TagCommand {
                id: "nope".to_string(),
            }),
            &mut session,
            &mut out,
        )
        .unwrap_err();
        assert!(is_user_error(&err));

        let err = execute(
            &Commands::Preset(PresetCommand {
                id: "nope".to_string(),
            }),
            &mut session,
            &mut out,
        )
        .unwrap_err();
        assert!(is_user_error(&err));
    }

    #[test]
    fn preset_prints_count_query_and_share_query() {
        let mut session = session();
        let mut out = Vec::new();

        execute(
            &Commands::Preset(PresetCommand {
                id: "bones".to_string(),
            }),
            &mut session,
            &mut out,
        )
        .unwrap();

        let lines = lines(&out);
        assert_eq!(lines[0], "1 tags applied");
        assert_eq!(lines[1], "交通事故&侵權行為&骨折");
        assert!(lines[2].contains("scope=civil"));
    }

    #[test]
    fn explain_prints_summary_then_meta_line() {
        let mut session = session();
        session.cycle("fracture");
        let mut out = Vec::new();

        execute(&Commands::Explain, &mut session, &mut out).unwrap();

        let lines = lines(&out);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "推薦檢索字詞（平衡）");
        assert!(lines[2].starts_with("本次產出依據："));
        assert_eq!(lines[3], "範圍：刑事＋民事｜期間：近5年｜窄搜：關閉");
        assert!(lines[4].starts_with('?'));
    }

    #[test]
    fn empty_free_text_is_a_user_error() {
        let mut session = session();
        let mut out = Vec::new();

        let err = execute(
            &Commands::Resolve(ResolveCommand {
                text: "  ".to_string(),
            }),
            &mut session,
            &mut out,
        )
        .unwrap_err();

        assert!(is_user_error(&err));
    }
}
