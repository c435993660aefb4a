//! marten - run selector queries against DOM snapshots and preview tweens.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use marten_anim::{
    AnimationOptions, EasingName, EventKind, Scheduler, SystemClock, TICK_INTERVAL, css_animation,
};
use marten_dom::{DomSnapshot, DomTree, ElementData, NodeId};
use marten_select::QueryContext;
use owo_colors::OwoColorize;
use strum::IntoEnumIterator;
use tracing_subscriber::EnvFilter;

/// Marten: CSS selector queries and property tweens from the terminal
#[derive(Parser, Debug)]
#[command(name = "marten")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Find list items in a snapshot
    marten query 'ul#menu > li:not(.hidden)' page.json

    # Query SVG content with a namespace prefix
    marten query 'svg|rect[fill]' drawing.json --ns svg=http://www.w3.org/2000/svg

    # Print matches as JSON snapshots
    marten query 'p:empty' page.json --json

    # Sample an easing curve
    marten ease bounce-out --steps 20

    # Preview a tween frame by frame
    marten tween left 0px 120px --duration 300 --easing ease-both
"#)]
struct Cli {
    /// Log at debug level (otherwise RUST_LOG, defaulting to warn)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a selector against a JSON DOM snapshot
    Query {
        /// Selector group, e.g. "div.note > p, a[href^='http']"
        #[arg(value_name = "SELECTOR")]
        selector: String,

        /// Snapshot file: one node or an array of top-level nodes
        #[arg(value_name = "SNAPSHOT")]
        snapshot: PathBuf,

        /// Only search below the elements matched by this selector
        #[arg(long, value_name = "SELECTOR")]
        context: Option<String>,

        /// Bind a namespace prefix (repeatable)
        #[arg(long = "ns", value_name = "PREFIX=URI", value_parser = parse_binding)]
        namespaces: Vec<(String, String)>,

        /// Namespace applied to unprefixed type selectors
        #[arg(long, value_name = "URI")]
        default_ns: Option<String>,

        /// Print matched subtrees as JSON instead of one line each
        #[arg(long)]
        json: bool,
    },

    /// Print samples of a named easing curve
    Ease {
        /// Curve name, e.g. "ease-in" or "elastic-out"
        #[arg(value_name = "NAME")]
        name: String,

        /// Number of intervals to sample
        #[arg(long, default_value = "10")]
        steps: u32,
    },

    /// Tween one property on a scratch element and print every frame
    Tween {
        /// CSS property or attribute name
        #[arg(value_name = "PROPERTY")]
        property: String,

        /// Start value
        #[arg(value_name = "FROM")]
        from: String,

        /// End value
        #[arg(value_name = "TO")]
        to: String,

        /// Duration in milliseconds
        #[arg(long, default_value = "400")]
        duration: f64,

        /// Easing curve name
        #[arg(long, default_value = "linear")]
        easing: String,

        /// Inline style for the scratch element's 200x100 container
        #[arg(long, value_name = "CSS")]
        container_style: Option<String>,

        /// Tick on the wall clock instead of a simulated one
        #[arg(long)]
        realtime: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Query {
            selector,
            snapshot,
            context,
            namespaces,
            default_ns,
            json,
        } => {
            let tree = load_snapshot(&snapshot)?;
            let mut query_context = QueryContext::new()
                .with_namespaces(namespaces.iter().map(|(p, u)| (p.as_str(), u.as_str())))?;
            if let Some(uri) = default_ns {
                query_context = query_context.with_default_namespace(&uri);
            }
            run_query(&tree, &query_context, &selector, context.as_deref(), json)
        }
        Command::Ease { name, steps } => {
            let name = parse_easing(&name)?;
            print_easing(name, steps.max(1));
            Ok(())
        }
        Command::Tween {
            property,
            from,
            to,
            duration,
            easing,
            container_style,
            realtime,
        } => {
            let easing = parse_easing(&easing)?;
            let tween = TweenArgs {
                property: &property,
                from: &from,
                to: &to,
                duration,
                easing,
                container_style: container_style.as_deref(),
            };
            run_tween(&tween, realtime)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_binding(text: &str) -> Result<(String, String), String> {
    text.split_once('=')
        .map(|(prefix, uri)| (prefix.to_string(), uri.to_string()))
        .ok_or_else(|| format!("expected PREFIX=URI, got {text:?}"))
}

fn parse_easing(name: &str) -> Result<EasingName> {
    EasingName::from_str(name).map_err(|_| {
        let known: Vec<String> = EasingName::iter().map(|e| e.to_string()).collect();
        anyhow!("unknown easing {name:?}; expected one of: {}", known.join(", "))
    })
}

/// Load a snapshot file holding either one node or an array of nodes.
fn load_snapshot(path: &Path) -> Result<DomTree> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    let roots: Vec<DomSnapshot> = if value.is_array() {
        serde_json::from_value::<Vec<DomSnapshot>>(value)
    } else {
        serde_json::from_value::<DomSnapshot>(value).map(|root| vec![root])
    }
    .with_context(|| format!("{} is not a DOM snapshot", path.display()))?;
    tracing::debug!(nodes = roots.len(), "loaded snapshot");
    Ok(DomTree::from_snapshots(&roots))
}

fn run_query(
    tree: &DomTree,
    query_context: &QueryContext,
    selector: &str,
    context: Option<&str>,
    json: bool,
) -> Result<()> {
    let roots = match context {
        Some(context) => {
            let roots = query_context.query(context, tree, NodeId::ROOT)?;
            if roots.is_empty() {
                bail!("context selector {context:?} matched nothing");
            }
            roots
        }
        None => vec![NodeId::ROOT],
    };

    let mut matches = Vec::new();
    for root in roots {
        for id in query_context.query(selector, tree, root)? {
            if !matches.contains(&id) {
                matches.push(id);
            }
        }
    }
    matches.sort();

    if json {
        let snapshots: Vec<DomSnapshot> = matches.iter().filter_map(|&id| tree.snapshot(id)).collect();
        println!("{}", serde_json::to_string_pretty(&snapshots)?);
        return Ok(());
    }

    for &id in &matches {
        let depth = tree.ancestors(id).count().saturating_sub(1);
        println!(
            "{}{} {}",
            "  ".repeat(depth),
            tree.describe(id).cyan(),
            format!("#{}", id.0).dimmed()
        );
    }
    let noun = if matches.len() == 1 { "match" } else { "matches" };
    println!("{}", format!("{} {noun}", matches.len()).bold());
    Ok(())
}

fn print_easing(name: EasingName, steps: u32) {
    const WIDTH: f64 = 40.0;
    let easing = name.easing();
    println!("{}", name.to_string().bold());
    for step in 0..=steps {
        let t = f64::from(step) / f64::from(steps);
        let value = easing.apply(t);
        let bar = "#".repeat((value.clamp(0.0, 1.5) * WIDTH).round() as usize);
        println!("{t:>5.2}  {value:>8.4}  {}", bar.green());
    }
}

struct TweenArgs<'a> {
    property: &'a str,
    from: &'a str,
    to: &'a str,
    duration: f64,
    easing: EasingName,
    container_style: Option<&'a str>,
}

/// Current value of `property` on `element`, as a style or an attribute.
fn read_value(tree: &DomTree, element: NodeId, property: &str) -> String {
    tree.style_property(element, property)
        .or_else(|| {
            tree.as_element(element)
                .and_then(|data| data.attribute(property))
                .map(str::to_string)
        })
        .unwrap_or_default()
}

fn run_tween(args: &TweenArgs<'_>, realtime: bool) -> Result<()> {
    let mut tree = DomTree::new();
    let container = tree.append_element(
        NodeId::ROOT,
        ElementData::new("div").attr(
            "style",
            args.container_style.unwrap_or("width: 200px; height: 100px"),
        ),
    );
    let element = tree.append_element(container, ElementData::new("div"));
    let host = Rc::new(RefCell::new(tree));

    let (scheduler, clock) = if realtime {
        (Scheduler::new(SystemClock::new()), None)
    } else {
        let (scheduler, clock) = Scheduler::manual();
        (scheduler, Some(clock))
    };

    let options = AnimationOptions::on(&scheduler).with_easing(args.easing);
    let animation = css_animation(
        &host,
        &[element],
        args.property,
        Some(args.from),
        args.to,
        args.duration,
        options,
    )?;

    for kind in [EventKind::Start, EventKind::Frame] {
        let host = Rc::clone(&host);
        let property = args.property.to_string();
        let _ = animation.add_listener(kind, move |event| {
            let value = read_value(&host.borrow(), element, &property);
            println!(
                "{:>8.1}ms  {:>6.3}  {}",
                event.time_delta,
                event.factor,
                value.yellow()
            );
            Ok(())
        });
    }

    animation.start()?;
    match clock {
        Some(clock) => {
            while scheduler.is_ticking() {
                scheduler.run_for(&clock, TICK_INTERVAL)?;
            }
        }
        None => scheduler.run()?,
    }
    println!("{}", format!("{} -> {}", args.property, args.to).bold());
    Ok(())
}
