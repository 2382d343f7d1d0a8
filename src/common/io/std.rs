//! Common I/O code using sync I/O.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use flate2::{bufread::MultiGzDecoder, write::GzEncoder, Compression};

/// Returns whether the path looks like a gzip or bgzip file.
pub fn is_gz<P>(path: P) -> bool
where
    P: AsRef<Path>,
{
    [Some(Some("gz")), Some(Some("bgz"))].contains(&path.as_ref().extension().map(|s| s.to_str()))
}

/// Transparently open a file with gzip decoder.
///
/// Note that decoding of multi-member gzip files is automatically supported, as is needed for
/// `bgzip` files.
///
/// # Arguments
///
/// * `path` - A path to the file to open.
pub fn open_read_maybe_gz<P>(path: P) -> Result<Box<dyn BufRead>, crate::error::Error>
where
    P: AsRef<Path>,
{
    if is_gz(path.as_ref()) {
        tracing::trace!("Opening {:?} as gzip for reading", path.as_ref());
        let file = File::open(path)?;
        let bufreader = BufReader::new(file);
        let decoder = MultiGzDecoder::new(bufreader);
        Ok(Box::new(BufReader::new(decoder)))
    } else {
        tracing::trace!("Opening {:?} as plain text for reading", path.as_ref());
        let file = File::open(path)?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// An output file, optionally gzip compressed.
///
/// Must be closed with `finish()`; dropping it discards errors from writing the gzip trailer.
pub enum MaybeGzWriter {
    Plain(BufWriter<File>),
    Gz(GzEncoder<BufWriter<File>>),
}

impl Write for MaybeGzWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            MaybeGzWriter::Plain(writer) => writer.write(buf),
            MaybeGzWriter::Gz(writer) => writer.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            MaybeGzWriter::Plain(writer) => writer.flush(),
            MaybeGzWriter::Gz(writer) => writer.flush(),
        }
    }
}

impl MaybeGzWriter {
    /// Write the gzip trailer if any, flush buffers and sync the file.
    pub fn finish(self) -> Result<(), crate::error::Error> {
        let mut bufwriter = match self {
            MaybeGzWriter::Plain(writer) => writer,
            MaybeGzWriter::Gz(encoder) => encoder.finish()?,
        };
        bufwriter.flush()?;
        let file = bufwriter
            .into_inner()
            .map_err(|e| e.into_error())?;
        file.sync_all()?;
        Ok(())
    }
}

/// Transparently open a file with gzip encoder for writing.
///
/// # Arguments
///
/// * `path` - A path to the file to open.
pub fn open_write_maybe_gz<P>(path: P) -> Result<MaybeGzWriter, crate::error::Error>
where
    P: AsRef<Path>,
{
    if is_gz(path.as_ref()) {
        tracing::trace!("Opening {:?} as gzip for writing", path.as_ref());
        let file = File::create(path)?;
        let bufwriter = BufWriter::new(file);
        let encoder = GzEncoder::new(bufwriter, Compression::default());
        Ok(MaybeGzWriter::Gz(encoder))
    } else {
        tracing::trace!("Opening {:?} as plain text for writing", path.as_ref());
        let file = File::create(path)?;
        Ok(MaybeGzWriter::Plain(BufWriter::new(file)))
    }
}

/// Open a tab-separated file for reading, lines starting with `#` are skipped.
pub fn tsv_reader<P>(
    path: P,
    has_headers: bool,
) -> Result<csv::Reader<Box<dyn BufRead>>, crate::error::Error>
where
    P: AsRef<Path>,
{
    Ok(csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .flexible(true)
        .has_headers(has_headers)
        .from_reader(open_read_maybe_gz(path)?))
}

/// Close the TSV `writer` and its file, see `MaybeGzWriter::finish`.
pub fn finish_tsv_writer(writer: csv::Writer<MaybeGzWriter>) -> Result<(), crate::error::Error> {
    writer
        .into_inner()
        .map_err(|e| e.into_error())?
        .finish()
}

/// Create a tab-separated writer with `\n` line endings and no automatic header.
///
/// The header is written explicitly so it is present even when there are no records.
pub fn tsv_writer<W>(inner: W) -> csv::Writer<W>
where
    W: Write,
{
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .terminator(csv::Terminator::Any(b'\n'))
        .has_headers(false)
        .from_writer(inner)
}
