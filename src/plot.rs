//! Raster plots of a trajectory: position and velocity against time, and
//! the phase portrait.

use crate::error::{Error, Result};
use crate::output::TrajectorySink;
use crate::trajectory::{Trajectory, S};
use image::{Rgb, RgbImage};
use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const GREY: Rgb<u8> = Rgb([200, 200, 200]);
const RED: Rgb<u8> = Rgb([220, 0, 0]);
const BLUE: Rgb<u8> = Rgb([0, 0, 220]);

const MARGIN: u32 = 40;
const GRID_LINES: u32 = 8;

pub const TIME_SERIES_FILE: &str = "time_series.png";
pub const PHASE_SPACE_FILE: &str = "phase_space.png";

/// Axis limits with a quarter of each extreme added as padding.
pub fn axis_range(values: &[S]) -> (S, S) {
  let (min, max) = values
    .iter()
    .fold((S::INFINITY, S::NEG_INFINITY), |(lo, hi), &v| {
      (lo.min(v), hi.max(v))
    });

  if !min.is_finite() || !max.is_finite() {
    return (-1.0, 1.0);
  }

  let lo = min - min.abs() / 4.0;
  let hi = max + max.abs() / 4.0;

  if hi - lo <= S::EPSILON * lo.abs().max(1.0) {
    (lo - 1.0, hi + 1.0)
  } else {
    (lo, hi)
  }
}

/// Rectangle of an image mapped onto data coordinates.
struct Panel {
  left: u32,
  top: u32,
  width: u32,
  height: u32,
  x_range: (S, S),
  y_range: (S, S),
}

impl Panel {
  fn new(
    left: u32,
    top: u32,
    width: u32,
    height: u32,
    xs: &[S],
    ys: &[S],
  ) -> Self {
    Self {
      left,
      top,
      width,
      height,
      x_range: axis_range(xs),
      y_range: axis_range(ys),
    }
  }

  fn to_pixel(&self, x: S, y: S) -> (i64, i64) {
    let (x0, x1) = self.x_range;
    let (y0, y1) = self.y_range;
    let px = self.left as S + (x - x0) / (x1 - x0) * (self.width - 1) as S;
    let py =
      self.top as S + (y1 - y) / (y1 - y0) * (self.height - 1) as S;
    (px.round() as i64, py.round() as i64)
  }

  fn contains(&self, (px, py): (i64, i64)) -> bool {
    px >= self.left as i64
      && py >= self.top as i64
      && px < (self.left + self.width) as i64
      && py < (self.top + self.height) as i64
  }

  fn put(&self, image: &mut RgbImage, p: (i64, i64), color: Rgb<u8>) {
    if self.contains(p) {
      image.put_pixel(p.0 as u32, p.1 as u32, color);
    }
  }

  fn draw_frame(&self, image: &mut RgbImage, grid: bool) {
    let right = self.left + self.width - 1;
    let bottom = self.top + self.height - 1;

    if grid {
      for i in 1..GRID_LINES {
        let gx = self.left + i * (self.width - 1) / GRID_LINES;
        let gy = self.top + i * (self.height - 1) / GRID_LINES;
        for y in self.top..=bottom {
          image.put_pixel(gx, y, GREY);
        }
        for x in self.left..=right {
          image.put_pixel(x, gy, GREY);
        }
      }
    }

    for x in self.left..=right {
      image.put_pixel(x, self.top, BLACK);
      image.put_pixel(x, bottom, BLACK);
    }
    for y in self.top..=bottom {
      image.put_pixel(self.left, y, BLACK);
      image.put_pixel(right, y, BLACK);
    }
  }

  fn draw_line(
    &self,
    image: &mut RgbImage,
    from: (i64, i64),
    to: (i64, i64),
    color: Rgb<u8>,
  ) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
      self.put(image, (x, y), color);
      if x == to.0 && y == to.1 {
        break;
      }
      let e2 = 2 * err;
      if e2 >= dy {
        err += dy;
        x += sx;
      }
      if e2 <= dx {
        err += dx;
        y += sy;
      }
    }
  }

  fn draw_series(
    &self,
    image: &mut RgbImage,
    xs: &[S],
    ys: &[S],
    color: Rgb<u8>,
  ) {
    let points: Vec<_> = xs
      .iter()
      .zip(ys)
      .map(|(&x, &y)| self.to_pixel(x, y))
      .collect();

    for pair in points.windows(2) {
      self.draw_line(image, pair[0], pair[1], color);
    }
    if let [only] = points.as_slice() {
      self.put(image, *only, color);
    }
  }

  fn draw_markers(
    &self,
    image: &mut RgbImage,
    xs: &[S],
    ys: &[S],
    color: Rgb<u8>,
  ) {
    for (&x, &y) in xs.iter().zip(ys) {
      let (px, py) = self.to_pixel(x, y);
      for ox in -1..=1 {
        for oy in -1..=1 {
          self.put(image, (px + ox, py + oy), color);
        }
      }
    }
  }
}

fn check_dimensions(
  trajectory: &Trajectory,
  width: u32,
  height: u32,
) -> Result<()> {
  if width <= 2 * MARGIN || height <= 4 * MARGIN {
    return Err(Error::PlotTooSmall { width, height });
  }
  if trajectory.is_empty() {
    return Err(Error::EmptyTrajectory);
  }
  Ok(())
}

/// x(t) in the upper panel (line with markers), v(t) in the lower one.
pub fn render_time_series(
  trajectory: &Trajectory,
  width: u32,
  height: u32,
) -> Result<RgbImage> {
  check_dimensions(trajectory, width, height)?;

  let (t, x, v) = (
    trajectory.times(),
    trajectory.positions(),
    trajectory.velocities(),
  );

  let mut image = RgbImage::from_pixel(width, height, WHITE);
  let panel_width = width - 2 * MARGIN;
  let panel_height = (height - 3 * MARGIN) / 2;

  let upper = Panel::new(MARGIN, MARGIN, panel_width, panel_height, &t, &x);
  upper.draw_frame(&mut image, false);
  upper.draw_series(&mut image, &t, &x, BLACK);
  upper.draw_markers(&mut image, &t, &x, BLACK);

  let lower = Panel::new(
    MARGIN,
    2 * MARGIN + panel_height,
    panel_width,
    panel_height,
    &t,
    &v,
  );
  lower.draw_frame(&mut image, false);
  lower.draw_series(&mut image, &t, &v, RED);

  Ok(image)
}

/// v against x on a grid.
pub fn render_phase_space(
  trajectory: &Trajectory,
  width: u32,
  height: u32,
) -> Result<RgbImage> {
  check_dimensions(trajectory, width, height)?;

  let (x, v) = (trajectory.positions(), trajectory.velocities());

  let mut image = RgbImage::from_pixel(width, height, WHITE);
  let panel = Panel::new(
    MARGIN,
    MARGIN,
    width - 2 * MARGIN,
    height - 2 * MARGIN,
    &x,
    &v,
  );
  panel.draw_frame(&mut image, true);
  panel.draw_series(&mut image, &x, &v, BLUE);

  Ok(image)
}

/// Sink rendering both figures as PNG files into a directory.
pub struct PlotSink {
  dir: PathBuf,
  width: u32,
  height: u32,
}

impl PlotSink {
  pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
    Self {
      dir: dir.into(),
      width: 800,
      height: 600,
    }
  }

  pub fn with_size(mut self, width: u32, height: u32) -> Self {
    self.width = width;
    self.height = height;
    self
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }
}

impl TrajectorySink for PlotSink {
  fn consume(&mut self, trajectory: &Trajectory) -> Result<()> {
    create_dir_all(&self.dir)?;

    render_time_series(trajectory, self.width, self.height)?
      .save(self.dir.join(TIME_SERIES_FILE))?;
    render_phase_space(trajectory, self.width, self.height)?
      .save(self.dir.join(PHASE_SPACE_FILE))?;

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::trajectory::Sample;
  use std::env;

  fn circle() -> Trajectory {
    Trajectory::from_samples(
      (0..64)
        .map(|i| {
          let t = i as S * 0.1;
          Sample::new(t, t.sin(), t.cos())
        })
        .collect(),
    )
  }

  #[test]
  fn axis_range_pads_by_a_quarter() {
    assert_eq!(axis_range(&[-2.0, 0.0, 4.0]), (-2.5, 5.0));
    assert_eq!(axis_range(&[0.0, 0.0]), (-1.0, 1.0));
    assert_eq!(axis_range(&[]), (-1.0, 1.0));
  }

  #[test]
  fn axis_range_contains_positive_data() {
    let (lo, hi) = axis_range(&[1.0, 3.0]);
    assert!(lo < 1.0 && hi > 3.0);
  }

  #[test]
  fn time_series_draws_both_panels() {
    let image = render_time_series(&circle(), 400, 300).unwrap();
    assert_eq!(image.dimensions(), (400, 300));

    let count = |color: Rgb<u8>| image.pixels().filter(|p| **p == color).count();
    assert!(count(RED) > 0);
    assert!(count(BLACK) > 0);
  }

  #[test]
  fn phase_space_draws_curve() {
    let image = render_phase_space(&circle(), 300, 300).unwrap();
    assert!(image.pixels().any(|p| *p == BLUE));
    assert!(image.pixels().any(|p| *p == GREY));
  }

  #[test]
  fn single_sample_is_plottable() {
    let single = Trajectory::from_samples(vec![Sample::new(0.0, 0.0, 2.0)]);
    assert!(render_phase_space(&single, 200, 200).is_ok());
  }

  #[test]
  fn empty_trajectory_is_rejected() {
    assert!(matches!(
      render_time_series(&Trajectory::default(), 200, 200),
      Err(Error::EmptyTrajectory)
    ));
  }

  #[test]
  fn undersized_image_is_rejected() {
    assert!(matches!(
      render_phase_space(&circle(), 80, 300),
      Err(Error::PlotTooSmall {
        width: 80,
        height: 300
      })
    ));

    let dir =
      env::temp_dir().join(format!("rk4_ode2_small_{}", std::process::id()));
    assert!(matches!(
      PlotSink::new(&dir).with_size(200, 160).consume(&circle()),
      Err(Error::PlotTooSmall { .. })
    ));
    let _ = std::fs::remove_dir_all(&dir);
  }

  #[test]
  fn sink_writes_both_figures() {
    let dir =
      env::temp_dir().join(format!("rk4_ode2_plots_{}", std::process::id()));
    PlotSink::new(&dir)
      .with_size(320, 240)
      .consume(&circle())
      .unwrap();

    assert!(dir.join(TIME_SERIES_FILE).is_file());
    assert!(dir.join(PHASE_SPACE_FILE).is_file());
    std::fs::remove_dir_all(&dir).unwrap();
  }
}
