//! Bounded-memory index construction
//!
//! `add_postings` appends `(key, posting)` records to a flat log on disk.
//! `finish_construction` then:
//! 1. reads the log in chunks of at most `memory_budget` bytes,
//! 2. sorts each chunk by `(key, sequence_id, position)`,
//! 3. spills each sorted chunk as a run file,
//! 4. merges the runs by repeatedly taking the smallest run head,
//! 5. streams the merged records, grouped by key, into a bucket file,
//!
//! and finally loads that bucket file as the queryable index. Every
//! intermediate file is removed when the builder goes away, whether or not
//! the build succeeded.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, info, warn};

use super::bucket_file::{read_bucket_file, BucketWriter};
use super::{check_key, IndexBuilder, InvertedIndex, Posting};
use crate::error::{ConfigError, IndexError};

/// Bytes per log record: key u32 + posting u64.
pub const RECORD_BYTES: usize = 12;

/// Smallest budget accepted: room for 16 records per sorted run.
pub const MIN_MEMORY_BUDGET: usize = 16 * RECORD_BYTES;

static BUILD_SEQ: AtomicUsize = AtomicUsize::new(0);

type Record = (u32, u64);

/// Files removed on drop.
struct Scratch {
    paths: Vec<PathBuf>,
}

impl Drop for Scratch {
    fn drop(&mut self) {
        for path in &self.paths {
            if let Err(e) = fs::remove_file(path) {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!("could not remove {}: {}", path.display(), e);
                }
            }
        }
    }
}

pub struct SortMergeIndexBuilder {
    key_bits: u32,
    work_dir: PathBuf,
    memory_budget: usize,
    output: Option<PathBuf>,
    token: String,
    log_path: PathBuf,
    log: BufWriter<File>,
    records: u64,
    scratch: Scratch,
}

impl SortMergeIndexBuilder {
    /// `output` keeps the merged bucket file; without it the file is
    /// written to `work_dir` and removed after loading.
    pub fn new(
        key_bits: u32,
        work_dir: &Path,
        memory_budget: usize,
        output: Option<PathBuf>,
    ) -> Result<Self, IndexError> {
        if memory_budget < MIN_MEMORY_BUDGET {
            return Err(ConfigError::MemoryBudgetTooSmall {
                budget: memory_budget,
                minimum: MIN_MEMORY_BUDGET,
            }
            .into());
        }
        fs::create_dir_all(work_dir)
            .map_err(|e| IndexError::io(format!("creating {}", work_dir.display()), e))?;

        let token = format!(
            "kblast-{}-{}",
            std::process::id(),
            BUILD_SEQ.fetch_add(1, Ordering::Relaxed)
        );
        let log_path = work_dir.join(format!("{}.log", token));
        let file = File::create(&log_path)
            .map_err(|e| IndexError::io(format!("creating {}", log_path.display()), e))?;

        Ok(Self {
            key_bits,
            work_dir: work_dir.to_path_buf(),
            memory_budget,
            output,
            token,
            scratch: Scratch {
                paths: vec![log_path.clone()],
            },
            log_path,
            log: BufWriter::new(file),
            records: 0,
        })
    }

    /// Records appended so far.
    pub fn logged_records(&self) -> u64 {
        self.records
    }

    fn records_per_run(&self) -> usize {
        self.memory_budget / RECORD_BYTES
    }

    /// Steps 1-3: sorted runs of at most `records_per_run` records.
    fn spill_sorted_runs(&mut self) -> Result<Vec<PathBuf>, IndexError> {
        let file = File::open(&self.log_path)
            .map_err(|e| IndexError::io(format!("reopening {}", self.log_path.display()), e))?;
        let mut reader = BufReader::new(file);
        let capacity = self.records_per_run();
        let mut chunk: Vec<Record> = Vec::with_capacity(capacity);
        let mut runs = Vec::new();

        loop {
            chunk.clear();
            while chunk.len() < capacity {
                match read_record(&mut reader)
                    .map_err(|e| IndexError::io(format!("reading {}", self.log_path.display()), e))?
                {
                    Some(record) => chunk.push(record),
                    None => break,
                }
            }
            if chunk.is_empty() {
                break;
            }
            chunk.sort_unstable();

            let run_path = self
                .work_dir
                .join(format!("{}.run{:05}", self.token, runs.len()));
            self.scratch.paths.push(run_path.clone());
            write_run(&run_path, &chunk)
                .map_err(|e| IndexError::io(format!("spilling {}", run_path.display()), e))?;
            debug!("spilled run {} with {} records", run_path.display(), chunk.len());
            runs.push(run_path);
        }
        Ok(runs)
    }

    /// Steps 4-5: k-way merge into a bucket file.
    fn merge_runs(&self, runs: &[PathBuf], output: &Path) -> Result<(), IndexError> {
        let mut heads = Vec::with_capacity(runs.len());
        for path in runs {
            heads.push(RunReader::open(path)?);
        }
        let mut writer = BucketWriter::create(output, self.key_bits)?;
        let mut current_key: Option<u32> = None;
        let mut group: Vec<Posting> = Vec::new();

        loop {
            let mut smallest: Option<usize> = None;
            for (i, run) in heads.iter().enumerate() {
                if let Some(head) = run.head {
                    match smallest {
                        Some(j) if heads[j].head.is_some_and(|h| h <= head) => {}
                        _ => smallest = Some(i),
                    }
                }
            }
            let Some(i) = smallest else { break };
            let (key, raw) = heads[i].head.take().unwrap_or_default();
            heads[i].advance()?;

            if current_key != Some(key) {
                if let Some(done) = current_key {
                    writer.push(done, &group)?;
                }
                group.clear();
                current_key = Some(key);
            }
            group.push(Posting::from_raw(raw));
        }
        if let Some(done) = current_key {
            writer.push(done, &group)?;
        }
        writer.finish()
    }
}

impl IndexBuilder for SortMergeIndexBuilder {
    fn key_bits(&self) -> u32 {
        self.key_bits
    }

    fn add_postings(&mut self, key: u32, postings: &[Posting]) -> Result<(), IndexError> {
        check_key(key, self.keyspace())?;
        for posting in postings {
            write_record(&mut self.log, (key, posting.raw()))
                .map_err(|e| IndexError::io(format!("appending to {}", self.log_path.display()), e))?;
        }
        self.records += postings.len() as u64;
        Ok(())
    }

    fn finish_construction(mut self: Box<Self>) -> Result<InvertedIndex, IndexError> {
        self.log
            .flush()
            .map_err(|e| IndexError::io(format!("flushing {}", self.log_path.display()), e))?;

        let runs = self.spill_sorted_runs()?;
        info!(
            "merging {} postings from {} sorted runs (budget {} bytes)",
            self.records,
            runs.len(),
            self.memory_budget
        );

        let output = match &self.output {
            Some(path) => path.clone(),
            None => {
                let path = self.work_dir.join(format!("{}.kbix", self.token));
                self.scratch.paths.push(path.clone());
                path
            }
        };
        self.merge_runs(&runs, &output)?;
        read_bucket_file(&output)
    }
}

fn write_record<W: Write>(out: &mut W, (key, raw): Record) -> io::Result<()> {
    out.write_all(&key.to_le_bytes())?;
    out.write_all(&raw.to_le_bytes())
}

fn read_record<R: Read>(input: &mut R) -> io::Result<Option<Record>> {
    let mut buf = [0u8; RECORD_BYTES];
    match input.read_exact(&mut buf) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    }
    let mut key = [0u8; 4];
    let mut raw = [0u8; 8];
    key.copy_from_slice(&buf[..4]);
    raw.copy_from_slice(&buf[4..]);
    Ok(Some((u32::from_le_bytes(key), u64::from_le_bytes(raw))))
}

fn write_run(path: &Path, records: &[Record]) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for &record in records {
        write_record(&mut out, record)?;
    }
    out.flush()
}

struct RunReader {
    path: PathBuf,
    reader: BufReader<File>,
    head: Option<Record>,
}

impl RunReader {
    fn open(path: &Path) -> Result<Self, IndexError> {
        let file = File::open(path).map_err(|e| IndexError::io(format!("opening {}", path.display()), e))?;
        let mut run = Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
            head: None,
        };
        run.advance()?;
        Ok(run)
    }

    fn advance(&mut self) -> Result<(), IndexError> {
        self.head = read_record(&mut self.reader)
            .map_err(|e| IndexError::io(format!("reading {}", self.path.display()), e))?;
        Ok(())
    }
}
