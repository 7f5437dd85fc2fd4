use clap::Parser;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod cli;
mod config;
mod errors;
mod export;
mod extract;
mod log;
mod orchestrator;
mod prompt;
mod provider;
mod session;
mod ux;
mod wire;
mod wizard;

fn init_tracing(debug: bool) {
    let default = if debug { "ui_weaver=debug" } else { "ui_weaver=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    init_tracing(args.debug);

    let cfg = config::Config::load(&args)?;
    let out_dir = Path::new(&cfg.out_dir);
    info!(provider = ?cfg.provider, model = %cfg.text_model(), image_model = %cfg.image_model(), "starting");

    let prov = provider::make_provider(&cfg)?;
    let mut orch = orchestrator::Orchestrator::new(prov);
    if cfg.save_artifacts {
        let journal = log::Journal::new(out_dir, Uuid::new_v4());
        info!(dir = %journal.dir().display(), "saving stage artifacts");
        orch = orch.with_journal(journal);
    }

    let mut session = session::Session::new();
    ux::run(&mut session, &orch, out_dir).await
}
