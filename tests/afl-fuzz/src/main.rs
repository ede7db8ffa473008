use statefuzz_afl_fuzz::FuzzInput;

fn main() {
    afl::fuzz!(|data: &[u8]| {
        if let Ok(input) = arbitrary::Unstructured::new(data).arbitrary::<FuzzInput>() {
            if let Err(err) = input.run() {
                panic!("{err:#}");
            }
        }
    });
}
