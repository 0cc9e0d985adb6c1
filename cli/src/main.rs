//! selset CLI — driving adapter for the indexed selector set.
//!
//! Subcommands:
//! - `match <rules> <document> [--select <selector>]` — rules matching one element
//! - `query <rules> <document>` — every rule with matches under the root
//! - `index <rules>` — where each rule group is indexed
//! - `check <rules>` — validate that every selector parses
//!
//! Rules files hold `{ rules: [{ selector, data }] }`; documents hold a node
//! tree (`{ tag, id, class, attrs, children }`). Both are YAML, or JSON when
//! the extension is `.json`. Set `RUST_LOG=selset=debug` to see index activity.

use std::process;

use selset::{Rule, RuleSetConfig, SelectorEngine, SelectorSet};
use selset_test::{Document, NodeSpec, TestElement, TestEngine};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

type Rules = RuleSetConfig<Value>;

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "match" => cmd_match(&args[2..]),
        "query" => cmd_query(&args[2..]),
        "index" => cmd_index(&args[2..]),
        "check" => cmd_check(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("error: unknown command \"{other}\"");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_match(args: &[String]) -> Result<(), String> {
    let (rules_path, document_path, rest) = match args {
        [rules, document, rest @ ..] => (rules, document, rest),
        _ => return Err("match requires a rules file and a document file".into()),
    };
    let select = parse_select(rest)?;

    let set = build_set(load(rules_path)?);
    let root = Document::build(load::<NodeSpec>(document_path)?);

    let element = match &select {
        Some(selector) => root
            .find(selector)
            .ok_or_else(|| format!("no element matches \"{selector}\""))?,
        None => root,
    };

    let matched = set
        .matches(&element)
        .map_err(|e| format!("match failed: {e}"))?;

    if matched.is_empty() {
        println!("(no match)");
    }
    for rule in matched {
        println!("{}", to_json(rule)?);
    }
    Ok(())
}

fn cmd_query(args: &[String]) -> Result<(), String> {
    let [rules_path, document_path] = args else {
        return Err("query requires a rules file and a document file".into());
    };

    let set = build_set(load(rules_path)?);
    let root = Document::build(load::<NodeSpec>(document_path)?);

    let results = set
        .query_all(&root)
        .map_err(|e| format!("query failed: {e}"))?;

    if results.is_empty() {
        println!("(no match)");
    }
    for found in results {
        let line = QueryLine {
            rule: found.rule,
            elements: found.elements.iter().map(TestElement::describe).collect(),
        };
        println!("{}", to_json(&line)?);
    }
    Ok(())
}

fn cmd_index(args: &[String]) -> Result<(), String> {
    let [rules_path] = args else {
        return Err("index requires a rules file path".into());
    };

    let set = build_set(load(rules_path)?);

    for rule in set.rules() {
        let placements = set.classify(rule.selector());
        if placements.is_empty() {
            println!("{}\t{:?}\t(not indexed)", rule.id(), rule.selector());
        }
        for placement in placements {
            println!("{}\t{placement}", rule.id());
        }
    }

    println!();
    for stats in set.index_stats() {
        println!(
            "{:<10} {} keys, {} entries",
            stats.name, stats.keys, stats.entries
        );
    }
    Ok(())
}

fn cmd_check(args: &[String]) -> Result<(), String> {
    let [rules_path] = args else {
        return Err("check requires a rules file path".into());
    };

    let rules: Rules = load(rules_path)?;
    let total = rules.rules.len();
    let set = build_set(rules);
    let probe = Document::build(NodeSpec::new("html"));

    let invalid: Vec<String> = set
        .rules()
        .filter(|rule| !set.classify(rule.selector()).is_empty())
        .filter_map(|rule| TestEngine.matches(&probe, rule.selector()).err())
        .map(|e| e.to_string())
        .collect();

    if !invalid.is_empty() {
        return Err(format!(
            "{} invalid selector(s):\n  {}",
            invalid.len(),
            invalid.join("\n  ")
        ));
    }

    println!(
        "Rules valid: {} loaded, {} skipped",
        set.len(),
        total - set.len()
    );
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Set assembly (composition root)
// ═══════════════════════════════════════════════════════════════════════════════

fn build_set(rules: Rules) -> SelectorSet<TestElement, Value> {
    let mut set = SelectorSet::new(TestEngine);
    let total = rules.rules.len();
    let added = set.extend_from_config(rules).len();
    debug!(total, added, "rules loaded");
    set
}

/// One `query` output line: the rule's fields plus the matched elements.
#[derive(Serialize)]
struct QueryLine<'a> {
    #[serde(flatten)]
    rule: &'a Rule<Value>,
    elements: Vec<String>,
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("failed to encode output: {e}"))
}

// ═══════════════════════════════════════════════════════════════════════════════
// File loading
// ═══════════════════════════════════════════════════════════════════════════════

fn load<T: DeserializeOwned>(path: &str) -> Result<T, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("failed to read \"{path}\": {e}"))?;

    let is_json = std::path::Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&content).map_err(|e| format!("JSON parse error in \"{path}\": {e}"))
    } else {
        // Default to YAML (handles .yaml and .yml)
        serde_yaml::from_str(&content).map_err(|e| format!("YAML parse error in \"{path}\": {e}"))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Argument parsing
// ═══════════════════════════════════════════════════════════════════════════════

fn parse_select(args: &[String]) -> Result<Option<String>, String> {
    let mut select = None;
    let mut i = 0;

    while i < args.len() {
        if args[i] == "--select" {
            let selector = args
                .get(i + 1)
                .ok_or("--select requires a selector")?;
            select = Some(selector.clone());
            i += 2;
        } else {
            return Err(format!("unexpected argument \"{}\"", args[i]));
        }
    }

    Ok(select)
}

fn print_usage() {
    eprintln!(
        "Usage: selset <command> [options]

Commands:
  match <rules> <document> [--select <selector>]   Rules matching one element (root by default)
  query <rules> <document>                         Every rule with matches under the root
  index <rules>                                    Show where each rule group is indexed
  check <rules>                                    Validate every selector
  help                                             Show this help"
    );
}
