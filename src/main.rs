use std::path::PathBuf;

use clap::Parser;
use cuelite::ExportRequest;

/// Evaluate a configuration and print the emit value as JSON.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Files or directories to load. Without any, the working directory is
    /// loaded as a package instance.
    args: Vec<String>,

    /// Working directory for evaluation.
    #[arg(long, short = 'd')]
    dir: Option<PathBuf>,

    /// Only load files belonging to this package.
    #[arg(long, short = 'p')]
    package: Option<String>,

    /// Tag binding, `key=value` or bare `key` (repeatable).
    #[arg(long, short = 't')]
    tag: Vec<String>,

    /// Path to look up inside the value, e.g. `Foo.Bar`.
    #[arg(long, short = 'e')]
    expression: Option<String>,

    /// Use only the first instance instead of unifying all of them.
    #[arg(long)]
    no_unify: bool,

    /// Print the digest of the rendered bytes instead of the JSON.
    #[arg(long)]
    id: bool,
}

fn main() {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let req = ExportRequest {
        dir: args.dir,
        args: args.args,
        package: args.package,
        tags: args.tag,
        expression: args.expression,
        unify: !args.no_unify,
    };

    match cuelite::export(&req) {
        Ok(out) => {
            if args.id {
                println!("{}", out.id);
            } else {
                println!("{}", out.rendered);
            }
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
