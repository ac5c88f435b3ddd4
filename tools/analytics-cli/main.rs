use analytics_builder::codec::{DEFAULT_NAMESPACE, EplCodecBuilder};
use analytics_builder::prelude::*;
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Reads, writes and checks analytics pipeline configurations
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read a text configuration and print it as JSON
    Parse {
        #[command(flatten)]
        codec: CodecArgs,
        /// Path to the text configuration
        config_path: String,
        /// Also list every channel name the configuration references
        #[arg(long)]
        channels: bool,
    },
    /// Write a JSON configuration in the text format
    Render {
        #[command(flatten)]
        codec: CodecArgs,
        /// Path to the JSON configuration
        config_path: String,
    },
    /// Parse, validate and re-serialize a text configuration
    Check {
        #[command(flatten)]
        codec: CodecArgs,
        /// Path to the text configuration
        config_path: String,
    },
    /// List the analytics of a catalog by group
    Catalog {
        /// Path to the catalog JSON file
        catalog_path: String,
    },
}

#[derive(Args, Debug)]
struct CodecArgs {
    /// Path to the catalog JSON file
    #[arg(short, long)]
    catalog: String,
    /// Namespace written in front of each analytic
    #[arg(long, default_value = DEFAULT_NAMESPACE)]
    namespace: String,
    /// Transformer capacity of rows read from text
    #[arg(long, default_value_t = 3)]
    max_transformers: usize,
    /// Reject property keys the analytic does not define
    #[arg(long)]
    strict: bool,
}

impl CodecArgs {
    fn load_catalog(&self) -> Metadata {
        load_catalog(&self.catalog)
    }

    fn codec<'m>(&self, metadata: &'m Metadata) -> EplCodec<'m> {
        EplCodecBuilder::new(metadata)
            .with_namespace(&self.namespace)
            .with_max_transformer_count(self.max_transformers)
            .with_strict_properties(self.strict)
            .build()
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Parse {
            codec,
            config_path,
            channels,
        } => run_parse(&codec, &config_path, channels),
        Command::Render { codec, config_path } => run_render(&codec, &config_path),
        Command::Check { codec, config_path } => run_check(&codec, &config_path),
        Command::Catalog { catalog_path } => run_catalog(&catalog_path),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_parse(args: &CodecArgs, config_path: &str, list_channels: bool) {
    let metadata = args.load_catalog();
    let text = read_file(config_path, "configuration");

    let mut known = KnownChannels::new();
    let config = args
        .codec(&metadata)
        .deserialize_with_registry(&text, &mut known)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse '{}': {}", config_path, e)));

    let json = config
        .to_json_pretty()
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));
    println!("{}", json);

    if list_channels {
        eprintln!("\nChannels referenced ({}):", known.len());
        for name in known.sorted() {
            eprintln!("  {}", name);
        }
    }
}

fn run_render(args: &CodecArgs, config_path: &str) {
    let metadata = args.load_catalog();
    let json = read_file(config_path, "configuration");

    let config = Config::from_json(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load '{}': {}", config_path, e)));
    config
        .validate_against(&metadata)
        .unwrap_or_else(|e| exit_with_error(&format!("Configuration is invalid: {}", e)));

    let text = args
        .codec(&metadata)
        .serialize(&config)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize: {}", e)));
    print!("{}", text);
}

fn run_check(args: &CodecArgs, config_path: &str) {
    let metadata = args.load_catalog();
    let text = read_file(config_path, "configuration");
    let codec = args.codec(&metadata);

    let start = Instant::now();
    let config = codec
        .deserialize(&text)
        .unwrap_or_else(|e| exit_with_error(&format!("Parse failed: {}", e)));
    let parse_duration = start.elapsed();

    config
        .validate_against(&metadata)
        .unwrap_or_else(|e| exit_with_error(&format!("Validation failed: {}", e)));

    let rendered = codec
        .serialize(&config)
        .unwrap_or_else(|e| exit_with_error(&format!("Serialization failed: {}", e)));
    let reparsed = codec
        .deserialize(&rendered)
        .unwrap_or_else(|e| exit_with_error(&format!("Re-parse of rendered text failed: {}", e)));

    let transformer_count: usize = config.rows().iter().map(|r| r.transformers().len()).sum();
    println!("Name:          {}", config.name().unwrap_or_default());
    println!("Rows:          {}", config.rows().len());
    println!("Transformers:  {}", transformer_count);
    println!("Parse time:    {:?}", parse_duration);

    if reparsed != config {
        exit_with_error("Rendered text does not read back to the same configuration");
    }
    if rendered == text {
        println!("Round trip:    identical");
    } else {
        println!("Round trip:    equivalent (text differs in formatting or link names)");
    }
}

fn run_catalog(catalog_path: &str) {
    let metadata = load_catalog(catalog_path);
    println!(
        "Catalog version {} ({} analytics)",
        if metadata.version().is_empty() {
            "<none>"
        } else {
            metadata.version()
        },
        metadata.analytics().len()
    );
    for (group, defs) in metadata.analytics_by_group() {
        println!("\n{}", if group.is_empty() { "<ungrouped>" } else { group.as_str() });
        for def in defs {
            println!(
                "  {:<24} in: {:<2} out: {:<2} properties: {}",
                def.name(),
                def.input_channels().len(),
                def.output_channels().len(),
                def.properties().len()
            );
        }
    }
}

fn load_catalog(path: &str) -> Metadata {
    let json = read_file(path, "catalog");
    Metadata::from_json(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load catalog '{}': {}", path, e)))
}

fn read_file(path: &str, what: &str) -> String {
    fs::read_to_string(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read {} file '{}': {}", what, path, e)))
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
