use anyhow::Context;
use loadtest::report::DEFAULT_ARTIFACT_PATH;
use loadtest::LoadTestConfig;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let config = match std::env::args().nth(1) {
        Some(path) => LoadTestConfig::from_file(path)?,
        None => LoadTestConfig::default(),
    };
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build runtime")?;
    let _guard = rt.enter();
    let report = rt.block_on(loadtest::run(config))?;
    report.write_to(DEFAULT_ARTIFACT_PATH)?;
    println!("Detailed results saved to: {DEFAULT_ARTIFACT_PATH}");
    Ok(())
}
