use std::io::{self, stdin, stdout, BufWriter};

use simscomp::Encoder;

fn main() -> io::Result<()> {
    pretty_env_logger::init();
    let mut encoder = Encoder::new(BufWriter::new(stdout()));
    io::copy(&mut stdin().lock(), &mut encoder)?;
    encoder.finalize()?;
    Ok(())
}
