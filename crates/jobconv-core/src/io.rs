//! Record sources and sinks
//!
//! CSV input may start with a UTF-8 byte order mark, which is dropped.
//! CSV output always starts with one so spreadsheet tools detect UTF-8.

use crate::error::{Error, Result};
use crate::record::{Header, OutputRecord, SourceRecord};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;

pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Consume a leading UTF-8 byte order mark, if any
pub fn skip_bom<R: BufRead>(reader: &mut R) -> std::io::Result<()> {
    let starts_with_bom = reader.fill_buf()?.starts_with(UTF8_BOM);
    if starts_with_bom {
        reader.consume(UTF8_BOM.len());
    }
    Ok(())
}

/// Stream of source records sharing one header
pub trait RecordSource {
    fn header(&self) -> Arc<Header>;

    /// Next data row, `None` at end of input
    fn next_record(&mut self) -> Result<Option<SourceRecord>>;
}

/// Destination for converted records
pub trait RecordSink {
    fn write_header(&mut self, columns: &[&str]) -> Result<()>;

    fn write_record(&mut self, record: &OutputRecord) -> Result<()>;

    fn flush(&mut self) -> Result<()>;
}

pub struct CsvRecordSource<R: Read> {
    reader: csv::Reader<BufReader<R>>,
    header: Arc<Header>,
    buffer: csv::StringRecord,
}

impl CsvRecordSource<File> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::Io {
            message: format!("cannot open input {}", path.display()),
            source: e,
        })?;
        Self::from_reader(file)
    }
}

impl<R: Read> CsvRecordSource<R> {
    /// Reads the header row immediately
    pub fn from_reader(reader: R) -> Result<Self> {
        let mut buffered = BufReader::new(reader);
        skip_bom(&mut buffered)?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(buffered);

        let header = Header::new(reader.headers()?.iter());

        Ok(Self {
            reader,
            header: Arc::new(header),
            buffer: csv::StringRecord::new(),
        })
    }
}

impl<R: Read> RecordSource for CsvRecordSource<R> {
    fn header(&self) -> Arc<Header> {
        Arc::clone(&self.header)
    }

    fn next_record(&mut self) -> Result<Option<SourceRecord>> {
        if !self.reader.read_record(&mut self.buffer)? {
            return Ok(None);
        }
        let cells = self.buffer.iter().map(str::to_string).collect();
        Ok(Some(SourceRecord::new(Arc::clone(&self.header), cells)))
    }
}

pub struct CsvRecordSink<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvRecordSink<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| Error::Io {
            message: format!("cannot create output {}", path.display()),
            source: e,
        })?;
        Self::from_writer(BufWriter::new(file))
    }
}

impl<W: Write> CsvRecordSink<W> {
    /// Writes the byte order mark immediately
    pub fn from_writer(mut writer: W) -> Result<Self> {
        writer.write_all(UTF8_BOM)?;
        Ok(Self {
            writer: csv::WriterBuilder::new().flexible(false).from_writer(writer),
        })
    }

    /// Flush and hand back the underlying writer
    pub fn into_inner(self) -> Result<W> {
        self.writer.into_inner().map_err(|e| Error::Io {
            message: "failed to flush CSV output".to_string(),
            source: e.into_error(),
        })
    }
}

impl<W: Write> RecordSink for CsvRecordSink<W> {
    fn write_header(&mut self, columns: &[&str]) -> Result<()> {
        self.writer.write_record(columns)?;
        Ok(())
    }

    fn write_record(&mut self, record: &OutputRecord) -> Result<()> {
        self.writer.write_record(record.values())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// In-memory source, mostly for tests and embedding
#[derive(Debug, Clone)]
pub struct VecRecordSource {
    header: Arc<Header>,
    rows: std::vec::IntoIter<Vec<String>>,
}

impl VecRecordSource {
    pub fn new<H, S>(header: H, rows: Vec<Vec<String>>) -> Self
    where
        H: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            header: Arc::new(Header::new(header)),
            rows: rows.into_iter(),
        }
    }
}

impl RecordSource for VecRecordSource {
    fn header(&self) -> Arc<Header> {
        Arc::clone(&self.header)
    }

    fn next_record(&mut self) -> Result<Option<SourceRecord>> {
        Ok(self
            .rows
            .next()
            .map(|cells| SourceRecord::new(Arc::clone(&self.header), cells)))
    }
}

/// In-memory sink that keeps everything it is given
#[derive(Debug, Clone, Default)]
pub struct VecRecordSink {
    pub header: Vec<String>,
    pub records: Vec<OutputRecord>,
    pub flushes: usize,
}

impl VecRecordSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordSink for VecRecordSink {
    fn write_header(&mut self, columns: &[&str]) -> Result<()> {
        self.header = columns.iter().map(|c| c.to_string()).collect();
        Ok(())
    }

    fn write_record(&mut self, record: &OutputRecord) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

/// Number of data rows in a CSV file, for progress reporting
pub fn count_data_rows(path: &Path) -> Result<u64> {
    let mut source = CsvRecordSource::open(path)?;
    let mut count = 0;
    while source.next_record()?.is_some() {
        count += 1;
    }
    Ok(count)
}
