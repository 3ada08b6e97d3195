//! # Carte CLI
//!
//! Usage:
//!   carte menu.json --template template.json -o layout.json
//!   carte --template template.json --margin 18 menu.json
//!   cat menu.json | carte --template template.json --text-only
//!   carte --example-menu > menu.json
//!   carte --example-template > template.json
//!
//! Logs go to stderr; set `RUST_LOG=carte=debug` to see page breaks.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use carte::model::Edges;
use carte::{paginate_with_options, EngineMenu, LayoutOptions, PageSpec, SelectionConfig, Template};

const EXAMPLE_MENU: &str = include_str!("../demos/menu.json");
const EXAMPLE_TEMPLATE: &str = include_str!("../demos/template.json");

/// Flags followed by a value.
const VALUE_FLAGS: [&str; 4] = ["--template", "-o", "--pattern", "--margin"];

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--example-menu") {
        print!("{}", EXAMPLE_MENU);
        return;
    }
    if args.iter().any(|a| a == "--example-template") {
        print!("{}", EXAMPLE_TEMPLATE);
        return;
    }

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}=info", env!("CARGO_PKG_NAME")))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let flag = |name: &str| args.iter().any(|a| a == name);
    let value = |name: &str| args.windows(2).find(|w| w[0] == name).map(|w| w[1].clone());

    // Read menu
    let menu_json = if let Some(path) = menu_path(&args) {
        read_or_exit(path)
    } else {
        let mut buf = String::new();
        if let Err(e) = io::stdin().read_to_string(&mut buf) {
            fail(&format!("Failed to read stdin: {}", e));
        }
        buf
    };

    let template_path = value("--template").unwrap_or_else(|| fail("Missing --template <template.json>"));
    let template_json = read_or_exit(&template_path);

    let menu: EngineMenu = match serde_json::from_str(&menu_json) {
        Ok(menu) => menu,
        Err(e) => fail(&carte::CarteError::parse("menu", e).to_string()),
    };
    let template = match Template::from_json(&template_json) {
        Ok(t) => t,
        Err(e) => fail(&e.to_string()),
    };

    let margin = value("--margin").map(|v| match v.parse::<f64>() {
        Ok(pt) if pt >= 0.0 => Edges::uniform(pt),
        _ => fail(&format!("--margin expects a non-negative number of points, got '{}'", v)),
    });
    let page_spec = PageSpec::from_template(&template, margin);

    let selection = SelectionConfig {
        text_only: flag("--text-only"),
        fillers_enabled: !flag("--no-fillers"),
        textures_enabled: flag("--textures"),
        show_menu_title: !flag("--no-title"),
        filler_pattern: value("--pattern"),
    };
    let options = LayoutOptions {
        debug: flag("--debug"),
    };

    let document = match paginate_with_options(&menu, &template, &page_spec, &selection, &options) {
        Ok(doc) => doc,
        Err(e) => fail(&format!("Layout failed: {}", e)),
    };
    let json = match serde_json::to_string_pretty(&document) {
        Ok(json) => json,
        Err(e) => fail(&format!("Failed to serialize layout: {}", e)),
    };

    match value("-o") {
        Some(path) => {
            if let Err(e) = fs::write(&path, &json) {
                fail(&format!("Failed to write {}: {}", path, e));
            }
            tracing::info!(
                pages = document.pages.len(),
                items = menu.item_count(),
                output = %path,
                "wrote layout"
            );
            eprintln!("✓ Laid out {} page(s) to {}", document.pages.len(), path);
        }
        None => println!("{}", json),
    }
}

/// The first argument that is neither a flag nor a flag's value.
fn menu_path(args: &[String]) -> Option<&str> {
    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            rest.next();
        } else if !arg.starts_with('-') {
            return Some(arg.as_str());
        }
    }
    None
}

fn read_or_exit(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| fail(&format!("Failed to read {}: {}", path, e)))
}

fn fail(message: &str) -> ! {
    eprintln!("✗ {}", message);
    process::exit(1);
}
