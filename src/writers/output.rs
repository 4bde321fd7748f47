use crate::error::Result;
use crate::utils::constants::DEFAULT_BUFFER_SIZE;
use crate::utils::filename::is_gzip_path;
use csv::{Writer, WriterBuilder};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Plain or gzip-compressed output file.
///
/// Gzip streams need their trailer written, so callers must end with
/// [`OutputStream::finish`] instead of relying on drop.
pub enum OutputStream {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl OutputStream {
    /// Open `path` for writing. With `append` set, new bytes go after any
    /// existing content; for gzip this starts a new member.
    pub fn create(path: &Path, append: bool, compression_level: u32) -> Result<Self> {
        let file = if append {
            OpenOptions::new().create(true).append(true).open(path)?
        } else {
            File::create(path)?
        };
        let writer = BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file);

        if is_gzip_path(path) {
            Ok(OutputStream::Gzip(GzEncoder::new(
                writer,
                Compression::new(compression_level),
            )))
        } else {
            Ok(OutputStream::Plain(writer))
        }
    }

    pub fn finish(self) -> Result<()> {
        let mut writer = match self {
            OutputStream::Plain(writer) => writer,
            OutputStream::Gzip(encoder) => encoder.finish()?,
        };
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    }
}

impl Write for OutputStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputStream::Plain(writer) => writer.write(buf),
            OutputStream::Gzip(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputStream::Plain(writer) => writer.flush(),
            OutputStream::Gzip(encoder) => encoder.flush(),
        }
    }
}

pub fn csv_writer(stream: OutputStream) -> Writer<OutputStream> {
    WriterBuilder::new()
        .has_headers(false)
        .buffer_capacity(DEFAULT_BUFFER_SIZE)
        .from_writer(stream)
}

/// Flush the CSV layer and finish the underlying stream
pub fn finish_csv(writer: Writer<OutputStream>) -> Result<()> {
    let stream = writer.into_inner().map_err(|e| e.into_error())?;
    stream.finish()
}
