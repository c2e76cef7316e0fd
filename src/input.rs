use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use anyhow::Result;

/// Unified input reader that handles both file and pipe input with buffered reading
pub struct InputReader {
    reader: Box<dyn Read>,
}

impl InputReader {
    /// Create a new InputReader from a path
    /// Use "-" for stdin pipe input
    pub fn new<P: AsRef<Path>>(input_path: P) -> Result<Self> {
        let reader: Box<dyn Read> = if is_pipe_path(input_path.as_ref()) {
            Box::new(BufReader::new(io::stdin().lock()))
        } else {
            let file = File::open(input_path)?;
            Box::new(BufReader::new(file))
        };

        Ok(Self { reader })
    }
}

impl Read for InputReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

pub fn is_pipe_path(path: &Path) -> bool {
    path.as_os_str() == "-"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_file_input() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("input.bin");
        std::fs::write(&path, [1u8, 2, 3])?;

        let mut reader = InputReader::new(&path)?;

        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        assert_eq!(data, [1, 2, 3]);
        Ok(())
    }

    #[test]
    fn dash_is_stdin() {
        assert!(is_pipe_path(Path::new("-")));
        assert!(!is_pipe_path(Path::new("./-")));
    }
}
