use std::{env, fs};

use anyhow::Context as _;
use statefuzz_afl_fuzz::FuzzInput;

/// Reports how many bytes of a test case are consumed when decoding a [`FuzzInput`].
fn main() -> anyhow::Result<()> {
    let filename = env::args()
        .nth(1)
        .context("Please provide the test case to check as argument.")?;
    let bytes = fs::read(&filename).with_context(|| format!("Failed to read {filename}"))?;

    let mut unstructured = arbitrary::Unstructured::new(&bytes);
    let input: FuzzInput = unstructured.arbitrary()?;
    let consumed = bytes.len() - unstructured.len();
    println!("{input:?}");
    println!(
        "consumed {consumed} of {} bytes; size hint {:?}",
        bytes.len(),
        <FuzzInput as arbitrary::Arbitrary>::size_hint(0)
    );
    Ok(())
}
