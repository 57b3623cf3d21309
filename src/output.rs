use crate::error::{Error, Result};
use crate::trajectory::{Sample, Trajectory};
use regex::Regex;
use std::fs::File;
use std::io::{prelude::*, BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// Digits after the decimal point in the trajectory table.
pub const PRECISION: usize = 10;

/// Consumer of a finished trajectory.
pub trait TrajectorySink {
  fn consume(&mut self, trajectory: &Trajectory) -> Result<()>;
}

/// Writes one `t x v` row per sample.
pub fn write_table<W: Write>(
  writer: &mut W,
  trajectory: &Trajectory,
) -> Result<()> {
  for sample in trajectory {
    writeln!(
      writer,
      "{:.*} {:.*} {:.*}",
      PRECISION, sample.t, PRECISION, sample.x, PRECISION, sample.v
    )?;
  }
  Ok(())
}

pub fn save_table(path: &Path, trajectory: &Trajectory) -> Result<()> {
  let mut writer = BufWriter::new(File::create(path)?);
  write_table(&mut writer, trajectory)?;
  writer.flush()?;
  Ok(())
}

pub fn read_table<R: BufRead>(reader: R) -> Result<Trajectory> {
  let row_re = Regex::new(
    r"^\s*(-?\d*\.?\d+(?:[eE][-+]?\d+)?)\s+(-?\d*\.?\d+(?:[eE][-+]?\d+)?)\s+(-?\d*\.?\d+(?:[eE][-+]?\d+)?)\s*$",
  )
  .expect("row pattern is valid");

  let mut samples = Vec::new();

  for (idx, line) in reader.lines().enumerate() {
    let line = line?;
    if line.trim().is_empty() {
      continue;
    }

    let malformed = || Error::Parse {
      line: idx + 1,
      content: line.clone(),
    };

    let matchs = row_re.captures(&line).ok_or_else(malformed)?;
    debug_assert_eq!(matchs.len(), 4);

    let mut vals = [0.0; 3];
    for (val, m) in vals.iter_mut().zip(matchs.iter().skip(1)) {
      *val = m
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(malformed)?;
    }

    samples.push(Sample::new(vals[0], vals[1], vals[2]));
  }

  Ok(Trajectory::from_samples(samples))
}

pub fn load_table(path: &Path) -> Result<Trajectory> {
  read_table(BufReader::new(File::open(path)?))
}

/// Sink persisting the trajectory table to a file.
pub struct TableSink {
  path: PathBuf,
}

impl TableSink {
  pub fn new<P: Into<PathBuf>>(path: P) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl TrajectorySink for TableSink {
  fn consume(&mut self, trajectory: &Trajectory) -> Result<()> {
    save_table(&self.path, trajectory)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assert_float_eq;
  use std::env;

  fn trajectory() -> Trajectory {
    Trajectory::from_samples(vec![
      Sample::new(0.0, 0.0, 2.0),
      Sample::new(1.0, 1.682941969615793, 1.0806046117362795),
      Sample::new(2.0, 1.8185948536513634, -0.8322936730942848),
    ])
  }

  #[test]
  fn rows_are_fixed_precision() {
    let mut buf = Vec::new();
    write_table(&mut buf, &trajectory()).unwrap();

    assert_eq!(
      String::from_utf8(buf).unwrap(),
      "0.0000000000 0.0000000000 2.0000000000\n\
       1.0000000000 1.6829419696 1.0806046117\n\
       2.0000000000 1.8185948537 -0.8322936731\n"
    );
  }

  #[test]
  fn reads_written_rows_back() {
    let mut buf = Vec::new();
    write_table(&mut buf, &trajectory()).unwrap();
    let read = read_table(&buf[..]).unwrap();

    assert_eq!(read.len(), 3);
    for (a, b) in read.iter().zip(&trajectory()) {
      assert_float_eq!(a.t, b.t, 1e-10);
      assert_float_eq!(a.x, b.x, 1e-10);
      assert_float_eq!(a.v, b.v, 1e-10);
    }
  }

  #[test]
  fn reads_exponents_and_skips_blank_lines() {
    let read = read_table("1e-3  -2.5E2 .5\n\n".as_bytes()).unwrap();
    assert_eq!(read.samples(), &[Sample::new(1e-3, -250.0, 0.5)]);
  }

  #[test]
  fn malformed_row_names_its_line() {
    match read_table("0.0 1.0 2.0\n0.1 nan 2.0\n".as_bytes()) {
      Err(Error::Parse { line, content }) => {
        assert_eq!(line, 2);
        assert_eq!(content, "0.1 nan 2.0");
      }
      other => panic!("unexpected {:?}", other),
    }
  }

  #[test]
  fn table_sink_writes_file() {
    let path = env::temp_dir()
      .join(format!("rk4_ode2_table_{}.txt", std::process::id()));
    TableSink::new(&path).consume(&trajectory()).unwrap();

    let loaded = load_table(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded.len(), 3);
    assert_float_eq!(loaded.last().unwrap().v, -0.8322936731, 1e-12);
  }
}
