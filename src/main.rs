#![doc = include_str!("../README.md")]

use std::{borrow::Cow, fmt::Display, fs, path::Path, process::exit};

use clap::Parser;
use log::{error, info, LevelFilter};
use log4rs::{
    append::console::ConsoleAppender,
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};

use crate::encoder::Encoder;
use crate::sketch::SketchOptions;

/// Byte stream encoding module
mod encoder;
/// Error module
mod error;
/// Script line parsing module
mod parser;
/// Key code resolution module
mod resolver;
/// Digispark sketch generation module
mod sketch;
/// Symbol table module
mod tables;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// DuckyScript file
    input: String,

    #[arg(short, long, default_value = "inject.bin")]
    /// Output filename
    output: String,

    #[arg(short, long, default_value = "us")]
    /// Keyboard layout name or layout table file
    layout: String,

    #[arg(short, long)]
    /// Key table file overriding the built-in default table
    keys: Option<String>,

    #[arg(short, long)]
    /// Also write a Digispark sketch wrapping the payload
    sketch: Option<String>,
}

/// Turns a result into its ok value. If the result is an error it logs
/// the message followed by the error and exits with status 1.
trait OrExit<T> {
    fn or_exit(self, msg: &str) -> T;
}

impl<T, E> OrExit<T> for Result<T, E>
where
    E: Display,
{
    fn or_exit(self, msg: &str) -> T {
        match self {
            Ok(t) => t,
            Err(e) => {
                error!("{}, {}", msg, e);
                exit(1);
            }
        }
    }
}

fn init_logger() {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{h({l})} {m}{n}")))
        .build();

    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info));

    let result = match config {
        Ok(config) => log4rs::init_config(config).map(|_| ()).map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };
    if let Err(e) = result {
        println!("unable to init logger, {}", e);
    }
}

fn main() {
    init_logger();
    let args = Cli::parse();

    let default_src = match &args.keys {
        Some(path) => Cow::Owned(fs::read_to_string(path).or_exit("Unable to read key table")),
        None => Cow::Borrowed(tables::DEFAULT_KEYS),
    };
    let layout_src = match tables::builtin_layout(&args.layout) {
        Some(src) => Cow::Borrowed(src),
        None => Cow::Owned(fs::read_to_string(&args.layout).or_exit("Unable to read layout table")),
    };

    let encoder = Encoder::from_sources(&default_src, &layout_src).or_exit("Unable to load tables");

    let input = fs::read_to_string(&args.input).or_exit("Unable to read script");
    let payload = match encoder.encode(&input) {
        Ok(payload) => payload,
        Err((line, e)) => {
            error!("{}", e.to_err_msg(&line));
            exit(2);
        }
    };

    fs::write(&args.output, &payload).or_exit("Unable to write payload");
    info!("encoded {} bytes to {}", payload.len(), args.output);

    if let Some(path) = args.sketch {
        let source = sketch::generate(&payload, &SketchOptions::default());
        fs::write(Path::new(&path), source).or_exit("Unable to write sketch");
        info!("wrote sketch to {}", path);
    }
}
