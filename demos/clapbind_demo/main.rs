//! # clapbind demo application
//!
//! A sample CLI tool that exercises clapbind end to end. It exists purely to
//! demonstrate and manually verify the library's features.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example clapbind_demo -- --name Ada
//! cargo run --example clapbind_demo -- greet -t 3 --shout
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature                 | How to exercise it                                              |
//! |-------------------------|-----------------------------------------------------------------|
//! | Prompt for missing name | `cargo run --example clapbind_demo`                             |
//! | Flag beats config file  | Put `name: Ada` in the config file, then pass `--name Bob`      |
//! | Command record          | `cargo run --example clapbind_demo -- greet -t 2`               |
//! | Root flag after command | `cargo run --example clapbind_demo -- greet -V`                 |
//! | Positional arguments    | `cargo run --example clapbind_demo -- one two three`            |
//! | Hidden command          | `cargo run --example clapbind_demo -- doctor`                   |
//! | Spinner                 | `cargo run --example clapbind_demo -- doctor` in a terminal     |
//! | Version                 | `cargo run --example clapbind_demo -- --version`                |
//! | Diagnostics             | `RUST_LOG=clapbind=debug cargo run --example clapbind_demo`     |

mod config;

use std::thread;
use std::time::Duration;

use clapbind::{App, Args, Command, Config, Context, Global};
use tracing_subscriber::EnvFilter;

use config::{DemoConfig, GreetConfig};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    App::with_config(DemoConfig::default())
        .name("clapbind-demo")
        .description("A sample CLI app for showcasing clapbind")
        .version(env!("CARGO_PKG_VERSION"))
        .action(root)
        .command(
            Command::with_config("greet", "Greet someone", GreetConfig::default()).action(greet),
        )
        .command(
            Command::new("doctor", "Check the demo environment")
                .hidden()
                .action(doctor),
        )
        .run();
}

fn root(Args(args): Args, Config(cfg): Config<DemoConfig>, ctx: Context) -> Result<(), String> {
    ctx.info(format!("hello, {}", cfg.name));
    if cfg.verbose {
        ctx.info(format!("running {} {}", ctx.name(), ctx.version().unwrap_or("")));
    }
    if !cfg.tags.is_empty() {
        ctx.info(format!("tags: {}", cfg.tags.join(", ")));
    }
    for arg in args {
        ctx.info(format!("arg: {arg}"));
    }
    Ok(())
}

fn greet(
    Config(greet): Config<GreetConfig>,
    Global(root): Global<DemoConfig>,
    ctx: Context,
) -> Result<(), String> {
    if greet.times == 0 {
        return Err("--times must be at least 1".to_string());
    }
    let mut line = format!("Hello, {}{}", root.name, greet.punctuation);
    if greet.shout {
        line = line.to_uppercase();
    }
    for _ in 0..greet.times {
        ctx.info(&line);
    }
    Ok(())
}

fn doctor(ctx: Context) -> Result<(), String> {
    ctx.spin("Checking config directory", || {
        thread::sleep(Duration::from_millis(600));
        match clapbind::default_config_path(ctx.name()) {
            Some(_) => Ok(()),
            None => Err("no home directory".to_string()),
        }
    })
}
