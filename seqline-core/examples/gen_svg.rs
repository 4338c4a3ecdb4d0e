//! Render a diagram to SVG on stdout.
//!
//! ```sh
//! cargo run --example gen_svg -- diagram.txt [theme] > out.svg
//! ```
//!
//! With no arguments a built-in demo diagram is rendered.

use std::env;
use std::fs;
use std::process::ExitCode;

use seqline_core::DiagramOptions;

const DEMO: &str = r#"title: Order checkout

actor: user
ll: web as "Web shop"
ll: api as "API"
ll: db as "Database"

user -> web: place order
web ->+ api: POST /orders
api ->+ db: insert order
db -->- api: id 42
note right of api: payment is async
api -> api: queue payment
api -->- web: 201 Created
web --> user: confirmation
"#;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();

    let source = match args.first() {
        Some(path) => match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("cannot read {path}: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => DEMO.to_string(),
    };

    let options = match args.get(1) {
        Some(name) => match DiagramOptions::by_name(name) {
            Some(options) => options,
            None => {
                eprintln!(
                    "unknown theme {name}; available: {}",
                    DiagramOptions::available_themes().join(", ")
                );
                return ExitCode::FAILURE;
            }
        },
        None => DiagramOptions::default_theme(),
    };

    match seqline_core::render_with_options(&source, &options) {
        Ok(svg) => {
            print!("{svg}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
