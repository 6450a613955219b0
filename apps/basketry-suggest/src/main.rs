use clap::Parser;

use basketry_suggest::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = Args::parse();

	basketry_suggest::run(args).await
}
