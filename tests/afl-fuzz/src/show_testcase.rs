use std::{env, fs};

use anyhow::Context as _;
use pretty_assertions::assert_eq;
use statefuzz::DEFAULT_FIXTURE_NAME;
use statefuzz_afl_fuzz::FuzzInput;
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    FmtSubscriber,
};

fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env()?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let filename = env::args()
        .nth(1)
        .context("Please provide the test case to show as argument.")?;
    let bytes = fs::read(&filename).with_context(|| format!("Failed to read {filename}"))?;

    let input: FuzzInput = arbitrary::Unstructured::new(&bytes).arbitrary()?;
    println!("{input:#?}");

    let fixtures = input.run()?;
    for (i, fixture) in fixtures.iter().enumerate() {
        println!("round {}:", i + 1);
        let named = fixture.clone().named(DEFAULT_FIXTURE_NAME);
        println!("{}", serde_json::to_string_pretty(&named)?);
    }

    // replaying from the same bytes must reproduce every fixture
    assert_eq!(input.run()?, fixtures);
    Ok(())
}
