use crate::error::Result;
use crate::utils::constants::DEFAULT_BUFFER_SIZE;
use crate::utils::filename::is_gzip_path;
use csv::{Reader, ReaderBuilder};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Open an input file, decompressing `.gz` paths.
///
/// Combined outputs are built by appending one gzip member per part, so the
/// decoder must read every member rather than stop after the first.
pub fn open_input(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path)?;
    let reader = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file);

    if is_gzip_path(path) {
        Ok(Box::new(MultiGzDecoder::new(reader)))
    } else {
        Ok(Box::new(reader))
    }
}

/// CSV reader over [`open_input`] with the header row consumed as headers
pub fn open_csv(path: &Path) -> Result<Reader<Box<dyn Read>>> {
    Ok(csv_reader(open_input(path)?))
}

pub fn csv_reader<R: Read>(input: R) -> Reader<R> {
    ReaderBuilder::new()
        .has_headers(true)
        .buffer_capacity(DEFAULT_BUFFER_SIZE)
        .from_reader(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_reads_plain_file() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("plain.csv");
        std::fs::write(&path, "a,b\n1,2\n")?;

        let mut content = String::new();
        open_input(&path)?.read_to_string(&mut content)?;
        assert_eq!(content, "a,b\n1,2\n");
        Ok(())
    }

    #[test]
    fn test_reads_every_gzip_member() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("members.csv.gz");

        for chunk in ["a,b\n", "1,2\n", "3,4\n"] {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)?;
            let mut encoder = GzEncoder::new(file, Compression::default());
            encoder.write_all(chunk.as_bytes())?;
            encoder.finish()?;
        }

        let mut reader = open_csv(&path)?;
        let rows: Vec<csv::StringRecord> = reader.records().collect::<std::result::Result<_, _>>()?;
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[1][0], "3");
        Ok(())
    }
}
