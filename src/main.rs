use std::path::PathBuf;

use clap::Parser;
use env_logger::Env;

use letterhead::{Config, Job, Letter, Recipient};

#[derive(Parser)]
#[command(name = "letterhead")]
#[command(about = "Convert a Markdown letter to a Word document on a letterhead template")]
struct Cli {
    /// Letterhead template (.docx) whose header and footer are kept
    #[arg(long)]
    template: PathBuf,

    /// Markdown source of the letter body
    #[arg(long)]
    source: PathBuf,

    /// Output Word document
    #[arg(short, long)]
    output: PathBuf,

    /// Recipient's full name, e.g. "Ms Jane Smith"
    #[arg(long)]
    recipient_name: String,

    /// Recipient's job title
    #[arg(long)]
    recipient_title: String,

    /// Recipient's organisation
    #[arg(long)]
    recipient_org: String,

    /// Street address line (repeat for several lines)
    #[arg(long = "recipient-address", required = true)]
    recipient_address: Vec<String>,

    /// City and postcode
    #[arg(long)]
    recipient_city: String,

    /// Recipient's country
    #[arg(long)]
    recipient_country: String,

    /// Title printed at the top (defaults to the source's first `#` heading; omitted if neither)
    #[arg(long)]
    doc_title: Option<String>,

    /// Date printed verbatim (defaults to today)
    #[arg(long)]
    date: Option<String>,

    /// Style configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        None => Config::compiled_default(),
    };

    let job = Job {
        template: cli.template,
        source: cli.source,
        output: cli.output,
        letter: Letter {
            recipient: Recipient {
                name: cli.recipient_name,
                title: cli.recipient_title,
                organisation: cli.recipient_org,
                address: cli.recipient_address,
                city: cli.recipient_city,
                country: cli.recipient_country,
            },
            title: cli.doc_title,
            date: cli.date,
        },
    };

    if let Err(e) = letterhead::convert(&job, &config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    println!("Created {}", job.output.display());
}
