use clap::Parser;

mod app;
mod cache;
mod catalog;
mod cli;
mod config;
mod fetch;
mod http;
mod logging;
mod semantic;
#[cfg(test)]
mod tests;
mod web;

use app::AppFactory;

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();

    logging::init_logging();

    let mut config = AppFactory::create_config(args.config.as_deref())?;

    match args.command {
        cli::Command::Serve { listen, warm } => {
            if let Some(listen) = listen {
                config.listen = listen;
            }
            let app = AppFactory::create_app(config)?;
            web::start_daemon(app, warm)
        }

        cli::Command::Search {
            query,
            limit,
            brief,
        } => {
            if let Some(limit) = limit.filter(|l| *l > 0) {
                config.top_k = limit;
            }
            let app = AppFactory::create_app(config)?;
            let results = run_local(app.search(Some(&query)))??;

            if brief {
                for result in &results {
                    println!("{:.4}  {}", result.score, result.title());
                }
            } else {
                println!("{}", serde_json::to_string_pretty(&results)?);
            }
            Ok(())
        }

        cli::Command::Build { force } => {
            let app = AppFactory::create_app(config)?;
            let catalog = match run_local(app.build(force))? {
                Ok(catalog) => catalog,
                Err(err) if err.is_data_missing() => anyhow::bail!(
                    "{err}; place the dataset at {}",
                    app.config().dataset_path().display()
                ),
                Err(err) => return Err(err.into()),
            };

            println!(
                "{} entries cached at {} ({} dimensions)",
                catalog.len(),
                app.status().cache_path.display(),
                catalog.dimensions()
            );
            Ok(())
        }

        cli::Command::Status {} => {
            let app = AppFactory::create_app(config)?;
            let status = app.status();

            println!("{}", serde_json::to_string_pretty(&status)?);
            if !status.cache_path.exists() {
                println!("cache file not built yet");
            }
            Ok(())
        }
    }
}

/// Drive a future to completion on a single-threaded runtime.
fn run_local<F: std::future::Future>(future: F) -> anyhow::Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(future))
}
