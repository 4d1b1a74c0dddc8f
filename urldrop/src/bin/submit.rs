//! `urldrop-submit`: send one URL to a running urldrop server.
//!
//! ```bash
//! urldrop-submit https://tokio.rs --title "Tokio" --category rust --category async
//! URLDROP_SUBMIT_ENDPOINT=https://links.example.com/api/submit urldrop-submit https://example.com
//! ```

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use url::Url;
use urldrop::client::{Field, HttpTransport, Locale, Orchestrator, UiStatus, UrlForm};

#[derive(Parser, Debug)]
#[command(author, version, about = "Save a URL to Notion through a urldrop server", long_about = None)]
struct Args {
    /// The URL to save
    url: String,

    /// Page title (defaults to the URL)
    #[arg(short, long)]
    title: Option<String>,

    /// Notes stored on the page
    #[arg(short, long)]
    notes: Option<String>,

    /// Category; repeat the flag or separate names with commas
    #[arg(short, long = "category")]
    categories: Vec<String>,

    /// Submission endpoint of the urldrop server
    #[arg(
        short,
        long,
        env = "URLDROP_SUBMIT_ENDPOINT",
        default_value = "http://localhost:3001/api/submit"
    )]
    endpoint: Url,

    /// Language of the messages printed
    #[arg(short, long, value_enum, default_value_t = Locale::En)]
    locale: Locale,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    tracing::debug!("{:?}", args);

    let mut form = UrlForm::new(args.locale);
    form.edit(Field::Url, args.url);
    if let Some(title) = args.title {
        form.edit(Field::Title, title);
    }
    if let Some(notes) = args.notes {
        form.edit(Field::Notes, notes);
    }
    form.edit(Field::Categories, args.categories.join(","));

    let Some(request) = form.submit() else {
        eprintln!("{}", form.error().unwrap_or_else(|| args.locale.invalid_url()));
        return Ok(ExitCode::from(2));
    };

    let orchestrator = Orchestrator::new(HttpTransport::new(args.endpoint)?, args.locale);

    form.set_disabled(true);
    eprintln!("{} {}", glyph(UiStatus::Loading), args.locale.sending());
    let status = orchestrator.submit(request).await?;
    form.set_disabled(false);

    let snapshot = orchestrator.snapshot();
    match status {
        UiStatus::Success => {
            println!("{} {}", glyph(status), snapshot.message);
            if let Some(page_id) = snapshot.page_id {
                println!("{page_id}");
            }
            Ok(ExitCode::SUCCESS)
        }
        _ => {
            eprintln!("{} {}", glyph(status), snapshot.message);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn glyph(status: UiStatus) -> &'static str {
    status.presentation().icon.map(|icon| icon.glyph()).unwrap_or("")
}
