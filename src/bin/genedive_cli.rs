use genedive::adjacency::AdjacencyIndex;
use genedive::api::{FileApi, InteractionApi};
use genedive::coordinator::{
    NoticeKind, Notifier, Phase, SearchOutcome, StateCoordinator,
};
use genedive::export::write_filtrate_csv_file;
use genedive::search::Topology;
use genedive::suggestions::{SuggestionCatalog, SuggestionCategory};
use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde_json::json;
use std::{env, fs};

fn usage() {
    eprintln!(
        "Usage:\n  \
  genedive_cli --adjacency PATH --store PATH search TOPOLOGY MIN_PROB NAME=ID[,ID...] ... \n    \
      [--filter FIELD:is|not:TEXT]... [--highlight TEXT] [--group pair|article]\n    \
      [--csv OUTPUT.csv] [--save-state PATH]\n  \
  genedive_cli --adjacency PATH --store PATH restore STATE_PATH\n  \
  genedive_cli --suggestions PATH suggest CATEGORY PREFIX\n\n  \
  TOPOLOGY is one of 1hop, 2hop, 3hop, clique."
    );
}

/// Prints notifications the way the engine would toast them.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, kind: NoticeKind, message: &str) {
        eprintln!("[{kind:?}] {message}");
    }
}

#[derive(Serialize)]
struct SearchReport {
    phase: Phase,
    sets: usize,
    interactions: usize,
    filtrate: usize,
    nodes: usize,
    edges: usize,
    table: Vec<genedive::table_view::TableSummaryRow>,
}

struct Flags {
    adjacency: Option<String>,
    store: Option<String>,
    suggestions: Option<String>,
    filters: Vec<String>,
    highlight: Option<String>,
    group: Option<String>,
    csv: Option<String>,
    save_state: Option<String>,
    rest: Vec<String>,
}

fn flag_value(args: &[String], idx: usize, arg: &str) -> Result<String> {
    args.get(idx + 1)
        .cloned()
        .with_context(|| format!("Missing value after {arg}"))
}

fn parse_flags(args: &[String]) -> Result<Flags> {
    let mut flags = Flags {
        adjacency: None,
        store: None,
        suggestions: None,
        filters: vec![],
        highlight: None,
        group: None,
        csv: None,
        save_state: None,
        rest: vec![],
    };
    let mut idx = 0;
    while idx < args.len() {
        let arg = args[idx].as_str();
        match arg {
            "--adjacency" => {
                flags.adjacency = Some(flag_value(args, idx, arg)?);
                idx += 2;
            }
            "--store" => {
                flags.store = Some(flag_value(args, idx, arg)?);
                idx += 2;
            }
            "--suggestions" => {
                flags.suggestions = Some(flag_value(args, idx, arg)?);
                idx += 2;
            }
            "--highlight" => {
                flags.highlight = Some(flag_value(args, idx, arg)?);
                idx += 2;
            }
            "--group" => {
                flags.group = Some(flag_value(args, idx, arg)?);
                idx += 2;
            }
            "--csv" => {
                flags.csv = Some(flag_value(args, idx, arg)?);
                idx += 2;
            }
            "--save-state" => {
                flags.save_state = Some(flag_value(args, idx, arg)?);
                idx += 2;
            }
            "--filter" => {
                flags.filters.push(flag_value(args, idx, arg)?);
                idx += 2;
            }
            _ => {
                flags.rest.push(args[idx].clone());
                idx += 1;
            }
        }
    }
    Ok(flags)
}

fn parse_filter_rule(raw: &str) -> Result<genedive::filter::TextFilterRule> {
    let parts: Vec<&str> = raw.splitn(3, ':').collect();
    if parts.len() != 3 {
        bail!("Invalid filter '{raw}', expected FIELD:is|not:TEXT");
    }
    let field = match parts[0] {
        "mention" => genedive::filter::FilterField::Mention,
        "article" => genedive::filter::FilterField::Article,
        "journal" => genedive::filter::FilterField::Journal,
        "section" => genedive::filter::FilterField::Section,
        "excerpt" => genedive::filter::FilterField::Excerpt,
        other => bail!("Unknown filter field '{other}'"),
    };
    let include = match parts[1] {
        "is" => true,
        "not" => false,
        other => bail!("Expected is|not, got '{other}'"),
    };
    Ok(genedive::filter::TextFilterRule {
        field,
        include,
        text: parts[2].to_string(),
    })
}

fn parse_search_set(raw: &str) -> Result<(String, Vec<String>)> {
    let (name, ids) = raw
        .split_once('=')
        .with_context(|| format!("Invalid search set '{raw}', expected NAME=ID[,ID...]"))?;
    let ids: Vec<String> = ids
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if name.is_empty() || ids.is_empty() {
        bail!("Invalid search set '{raw}', expected NAME=ID[,ID...]");
    }
    Ok((name.to_string(), ids))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Could not serialize JSON output")?;
    println!("{text}");
    Ok(())
}

fn drive_fetch(
    coordinator: &mut StateCoordinator,
    api: &mut FileApi,
    outcome: SearchOutcome,
) -> Result<()> {
    let SearchOutcome::Fetch(request) = outcome else {
        return Ok(());
    };
    let result = api.interactions(&request.ids, request.min_probability);
    coordinator.complete_fetch(request.ticket, result);

    if matches!(coordinator.phase(), Phase::Displaying | Phase::Empty) {
        let absent = coordinator.absent_search_members();
        if !absent.is_empty() {
            let names = api.entity_names(&absent)?;
            coordinator.report_absent_members(&names);
        }
    }
    Ok(())
}

fn report(coordinator: &StateCoordinator) -> SearchReport {
    SearchReport {
        phase: coordinator.phase(),
        sets: coordinator.sets().len(),
        interactions: coordinator.interactions().map_or(0, |i| i.len()),
        filtrate: coordinator.filtrate().map_or(0, |f| f.len()),
        nodes: coordinator.graph().nodes.len(),
        edges: coordinator.graph().edges.len(),
        table: coordinator.table_summary(),
    }
}

fn finish_outputs(coordinator: &StateCoordinator, flags: &Flags) -> Result<()> {
    if let Some(path) = &flags.csv {
        let filtrate = coordinator.filtrate().unwrap_or(&[]);
        write_filtrate_csv_file(filtrate, path)?;
        eprintln!("Wrote {} row(s) to '{path}'", filtrate.len());
    }
    if let Some(path) = &flags.save_state {
        let state = coordinator.save_state()?;
        fs::write(path, state).with_context(|| format!("Could not write state file '{path}'"))?;
        eprintln!("Saved state to '{path}'");
    }
    print_json(&report(coordinator))
}

fn run_search_command(flags: &Flags, arguments: &[String]) -> Result<()> {
    let adjacency_path = flags
        .adjacency
        .as_deref()
        .context("Missing --adjacency PATH")?;
    let store_path = flags.store.as_deref().context("Missing --store PATH")?;
    let adjacency = AdjacencyIndex::from_json_file(adjacency_path)?;
    let mut api = FileApi::from_json_file(store_path)?;
    let mut coordinator =
        StateCoordinator::with_notifier(adjacency, Box::new(ConsoleNotifier));

    let topology = arguments
        .first()
        .and_then(|t| Topology::parse(t))
        .context("Expected TOPOLOGY: 1hop, 2hop, 3hop, or clique")?;
    let min_probability: f64 = arguments
        .get(1)
        .and_then(|p| p.parse().ok())
        .context("Expected MIN_PROB as a number in [0,1]")?;

    coordinator.select_topology(topology);
    coordinator.set_min_probability(min_probability);
    for raw in &arguments[2..] {
        let (name, ids) = parse_search_set(raw)?;
        coordinator.extend_search(&name, &ids);
    }
    let outcome = coordinator.run_search();
    drive_fetch(&mut coordinator, &mut api, outcome)?;

    for raw in &flags.filters {
        coordinator.add_filter_rule(parse_filter_rule(raw)?);
    }
    if let Some(text) = &flags.highlight {
        coordinator.set_highlight_text(text);
    }
    if let Some(group) = &flags.group {
        let grouper = match group.as_str() {
            "pair" => genedive::table_view::Grouper::Pair,
            "article" => genedive::table_view::Grouper::Article,
            other => bail!("Unknown grouping '{other}'"),
        };
        coordinator.select_grouping(grouper);
    }

    finish_outputs(&coordinator, flags)
}

fn run_restore_command(flags: &Flags, arguments: &[String]) -> Result<()> {
    let adjacency_path = flags
        .adjacency
        .as_deref()
        .context("Missing --adjacency PATH")?;
    let state_path = arguments.first().context("Expected STATE_PATH")?;
    let adjacency = AdjacencyIndex::from_json_file(adjacency_path)?;
    let mut coordinator =
        StateCoordinator::with_notifier(adjacency, Box::new(ConsoleNotifier));

    let data = fs::read_to_string(state_path)
        .with_context(|| format!("Could not read state file '{state_path}'"))?;
    coordinator.restore_state(&data)?;
    finish_outputs(&coordinator, flags)
}

fn run_suggest_command(flags: &Flags, arguments: &[String]) -> Result<()> {
    let suggestions_path = flags
        .suggestions
        .as_deref()
        .context("Missing --suggestions PATH")?;
    let catalog = SuggestionCatalog::from_json_file(suggestions_path)?;
    let category = arguments
        .first()
        .and_then(|c| SuggestionCategory::parse(c))
        .context("Expected CATEGORY: genes, genesets, chemicals, or diseases")?;
    let prefix = arguments.get(1).context("Expected PREFIX")?;
    print_json(&json!({ "suggestions": catalog.lookup(category, prefix) }))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        usage();
        bail!("Missing command");
    }

    let flags = parse_flags(&args)?;
    let Some((command, arguments)) = flags.rest.split_first() else {
        usage();
        bail!("Missing command");
    };

    match command.as_str() {
        "search" => run_search_command(&flags, arguments),
        "restore" => run_restore_command(&flags, arguments),
        "suggest" => run_suggest_command(&flags, arguments),
        other => {
            usage();
            bail!("Unknown command '{other}'")
        }
    }
}
