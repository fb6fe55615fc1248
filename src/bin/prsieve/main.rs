use prsieve::{GitHub, Registry, RunMode, Worker, config_base_path, load_config, parse_args};

fn handle_clap_help_version(clap_err: &clap::Error) -> ! {
    use clap::error::ErrorKind;
    match clap_err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            print!("{clap_err}");
            std::process::exit(0);
        }
        _ => {
            eprint!("{clap_err}");
            std::process::exit(2);
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let invocation = match parse_args(std::env::args()) {
        Ok(result) => result,
        Err(err) => {
            if let Some(clap_err) = err.downcast_ref::<clap::Error>() {
                handle_clap_help_version(clap_err);
            } else {
                return Err(err);
            }
        }
    };

    let config = load_config(&invocation.config_path)?;
    let registry = Registry::builtin();
    let github = GitHub::connect().await?;
    let worker = Worker::new(
        &config,
        &invocation.overrides,
        &registry,
        &github,
        config_base_path(&invocation.config_path),
    );

    match invocation.mode {
        RunMode::Process => {
            worker.process().await?;
        }
        RunMode::Get => {
            let mut stdout = std::io::stdout();
            worker.list(&mut stdout).await?;
        }
    }

    Ok(())
}
