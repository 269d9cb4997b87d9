use std::error::Error;
use std::io::{stdin, stdout, BufWriter, Read};

use simscomp::Decoder;

/// usage: decode <uncompressed length> < input > output
fn main() -> Result<(), Box<dyn Error>> {
    pretty_env_logger::init();
    let expected: usize = std::env::args()
        .nth(1)
        .ok_or("missing uncompressed length")?
        .parse()?;
    let mut input = vec![];
    stdin().lock().read_to_end(&mut input)?;
    Decoder::new(BufWriter::new(stdout()), expected).decode(&input)?;
    Ok(())
}
