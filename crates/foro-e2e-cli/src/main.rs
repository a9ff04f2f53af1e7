//! foro: scenario runner for the foro end-to-end suite.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use foro_e2e::{
    load_forum_cases, load_register_cases, CdpSession, DiagnosticSink, FixtureManager,
    ForoError, ForoResult, FsDiagnostics, NullDiagnostics, PageContext, SessionFixture,
    SqliteStore, SuiteConfig, SuiteReport, UiDriver,
};
use foro_e2e_cli::output::{print_report, print_totals};
use foro_e2e_cli::{Cli, SuiteRunner};

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_directive())),
        )
        .init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ForoResult<bool> {
    let config = build_config(&cli)?;

    let sink: Arc<dyn DiagnosticSink> = match &config.screenshot_dir {
        Some(dir) => Arc::new(FsDiagnostics::new(dir)?),
        None => Arc::new(NullDiagnostics),
    };

    let session = CdpSession::launch(config.session_config()).await?;
    let driver: Arc<dyn UiDriver> = Arc::new(session);

    // guaranteed release of the browser, whatever the suites do
    let mut fixtures = FixtureManager::new();
    fixtures.register(SessionFixture::new(driver.clone()));
    fixtures.setup_all().await?;

    let ctx = PageContext::new(driver, &config, sink);
    let mut runner = SuiteRunner::new(ctx)
        .with_credentials(&cli.username, &cli.password)
        .with_filter(cli.filter.clone())
        .with_fail_fast(cli.fail_fast);

    if let Some(path) = &config.store_path {
        runner = runner.with_store(Arc::new(SqliteStore::open(path)?));
    }

    // run first, release the session unconditionally, then surface errors
    let outcome = run_suites(&cli, &runner).await;
    if let Err(e) = fixtures.teardown_all().await {
        tracing::warn!(error = %e, "session teardown failed");
    }
    let reports = outcome?;

    for report in &reports {
        print_report(report);
    }
    print_totals(&reports);

    Ok(reports.iter().all(SuiteReport::all_passed))
}

fn build_config(cli: &Cli) -> ForoResult<SuiteConfig> {
    let mut config = match &cli.config {
        Some(path) => SuiteConfig::load(path)?,
        None => {
            let mut config = SuiteConfig::default();
            config.apply_env();
            config
        }
    };

    if cli.headless {
        config.headless = true;
    }
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(dir) = &cli.screenshot_dir {
        config.screenshot_dir = Some(dir.clone());
    }
    if let Some(store) = &cli.store {
        config.store_path = Some(store.clone());
    }
    Ok(config)
}

async fn run_suites(cli: &Cli, runner: &SuiteRunner) -> ForoResult<Vec<SuiteReport>> {
    let mut reports = Vec::new();

    let register_path = cli.data_dir.join("register_cases.json");
    if register_path.is_file() {
        let cases = load_register_cases(&register_path)?;
        tracing::info!(cases = cases.len(), "register suite loaded");
        reports.push(runner.run_register(&cases).await);
    } else {
        tracing::warn!(path = %register_path.display(), "register data not found, skipping");
    }

    let forum_path = cli.data_dir.join("forum_cases.json");
    if forum_path.is_file() {
        let cases = load_forum_cases(&forum_path)?;
        reports.push(runner.run_forum(&cases).await);
    } else {
        tracing::warn!(path = %forum_path.display(), "forum data not found, skipping");
    }

    if reports.is_empty() {
        return Err(ForoError::Config {
            message: format!("no scenario data under {}", cli.data_dir.display()),
        });
    }
    Ok(reports)
}
