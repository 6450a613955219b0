use std::{fs, path::PathBuf, sync::Arc};

use clap::{
	Parser,
	builder::{
		Styles,
		styling::{AnsiColor, Effects},
	},
};
use color_eyre::eyre;
use serde::Serialize;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use basketry_config::Config;
use basketry_domain::strategy::ProductType;
use basketry_service::{SuggestRequest, SuggestResponse, SuggestionService};
use basketry_storage::qdrant::QdrantStore;

pub const VERSION: &str = concat!(
	env!("CARGO_PKG_VERSION"),
	"-",
	env!("VERGEN_GIT_SHA"),
	"-",
	env!("VERGEN_CARGO_TARGET_TRIPLE"),
);

#[derive(Debug, Parser)]
#[command(
	version = VERSION,
	rename_all = "kebab",
	styles = styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// JSON file holding `{"product_type": ..., "selected_stocks": [...]}`.
	#[arg(long, short = 'r', value_name = "FILE")]
	pub request: PathBuf,
	/// Overrides the request's product type, e.g. phoenix-autocall.
	#[arg(long, value_name = "TYPE")]
	pub product_type: Option<ProductType>,
	#[arg(long, value_name = "N")]
	pub top_k: Option<u32>,
	/// Skips the explanation generator.
	#[arg(long)]
	pub no_explain: bool,
}

#[derive(Debug, Serialize)]
pub struct Report {
	pub generated_at: String,
	#[serde(flatten)]
	pub response: SuggestResponse,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = load_config(&args)?;

	init_tracing(&config)?;

	let raw = fs::read_to_string(&args.request)
		.map_err(|err| eyre::eyre!("Failed to read request {}: {err}.", args.request.display()))?;
	let request = apply_overrides(serde_json::from_str(&raw)?, &args);
	let qdrant = QdrantStore::new(&config.catalog)?;
	let service = SuggestionService::new(config, Arc::new(qdrant))?;
	let cancel = CancellationToken::new();
	let signal_token = cancel.clone();

	tokio::spawn(async move {
		if tokio::signal::ctrl_c().await.is_ok() {
			tracing::warn!("Interrupt received. Cancelling the request.");

			signal_token.cancel();
		}
	});

	let response = service.build_suggestions_with_cancel(&request, &cancel).await?;
	let report = Report { generated_at: OffsetDateTime::now_utc().format(&Rfc3339)?, response };

	println!("{}", serde_json::to_string_pretty(&report)?);

	Ok(())
}

/// Reads the config file, applies command-line flags, then validates the result.
pub fn load_config(args: &Args) -> color_eyre::Result<Config> {
	let mut config = basketry_config::parse(&args.config)?;

	if args.no_explain {
		config.suggestions.explain = false;
	}

	basketry_config::validate(&config)?;

	Ok(config)
}

/// Command-line flags win over the request file.
pub fn apply_overrides(mut request: SuggestRequest, args: &Args) -> SuggestRequest {
	if let Some(product_type) = args.product_type {
		request.product_type = product_type;
	}
	if args.top_k.is_some() {
		request.top_k = args.top_k;
	}

	request
}

fn init_tracing(config: &Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.try_init()
		.map_err(|err| eyre::eyre!("Failed to install tracing subscriber: {err}."))?;

	Ok(())
}

fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Green.on_default() | Effects::BOLD)
		.usage(AnsiColor::Green.on_default() | Effects::BOLD)
		.literal(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Yellow.on_default())
}
