//! Offline frame renderer
//!
//! Consumes snapshots as the integrator produces them and writes one PNG per
//! rendered step: a top-down (x, y) view where the `trail + 1` snapshots
//! before the current one are drawn as light blue dots and the current
//! positions as black dots.
//! Frames are named by zero-padded step index so a plain name sort and
//! [`list_frames`] agree on the order. After the run the numbered frames can
//! be assembled into a looping GIF with [`encode_animation`].

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, Rgb, RgbImage};

use crate::configuration::config::RenderConfig;
use crate::error::{Error, Result};
use crate::simulation::history::{Snapshot, TrailBuffer};
use crate::simulation::states::NVec3;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const TRAIL: Rgb<u8> = Rgb([178, 178, 255]);
const BODY: Rgb<u8> = Rgb([0, 0, 0]);

pub struct FrameRenderer {
    dir: PathBuf,
    extent: f64,
    size: u32,
    every: usize,
    last_index: usize, // final step, always rendered
    trail: TrailBuffer,
    written: usize,
    animation: Option<PathBuf>,
    fps: u32,
}

impl FrameRenderer {
    /// Create the output directory and a renderer for a run ending at `last_index`
    pub fn new(cfg: &RenderConfig, last_index: usize) -> Result<Self> {
        if cfg.size == 0 || cfg.every == 0 || !(cfg.extent > 0.0) {
            return Err(Error::InvalidParam("render size, every and extent must be > 0".into()));
        }
        if cfg.animation.is_some() && cfg.fps == 0 {
            return Err(Error::InvalidParam("render fps must be > 0".into()));
        }
        let dir = PathBuf::from(&cfg.dir);
        fs::create_dir_all(&dir)?;

        Ok(Self {
            dir,
            extent: cfg.extent,
            size: cfg.size,
            every: cfg.every,
            last_index,
            // previous trail + 1 snapshots, the current one excluded
            trail: TrailBuffer::new(cfg.trail + 1)?,
            written: 0,
            animation: cfg.animation.as_ref().map(PathBuf::from),
            fps: cfg.fps,
        })
    }

    pub fn frames_written(&self) -> usize {
        self.written
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Record a snapshot and write a frame when this step is due.
    /// Snapshot 0 (the initial state) only seeds the trail.
    pub fn consume(&mut self, snap: Snapshot<'_>) -> Result<()> {
        let due = snap.index > 0 && (snap.index % self.every == 0 || snap.index == self.last_index);
        if due {
            let img = self.draw(snap.positions);
            let path = self.dir.join(frame_name(snap.index));
            img.save(&path)?;
            self.written += 1;
            log::trace!("wrote {}", path.display());
        }

        self.trail.push(snap);
        Ok(())
    }

    /// Assemble the numbered frames into the configured GIF, if any.
    /// Returns the animation path and the number of frames in it.
    pub fn write_animation(&self) -> Result<Option<(PathBuf, usize)>> {
        let Some(out) = &self.animation else {
            return Ok(None);
        };
        let frames = numbered_frames(&self.dir)?;
        let n = encode_animation(&frames, out, self.fps)?;
        Ok(Some((out.clone(), n)))
    }

    fn draw(&self, current: &[NVec3]) -> RgbImage {
        let mut img = RgbImage::from_pixel(self.size, self.size, BACKGROUND);

        for snap in self.trail.iter() {
            for x in snap.positions {
                self.plot(&mut img, x, 0, TRAIL);
            }
        }
        for x in current {
            self.plot(&mut img, x, 2, BODY);
        }
        img
    }

    /// Map world (x, y) in [-extent, extent] to pixels, y up.
    /// Points far outside the image are culled so the integer math stays small.
    fn to_pixel(&self, x: &NVec3) -> Option<(i64, i64)> {
        let scale = self.size as f64 / (2.0 * self.extent);
        let px = ((x.x + self.extent) * scale).floor();
        let py = ((self.extent - x.y) * scale).floor();

        let margin = self.size as f64;
        let visible = |p: f64| p.is_finite() && p >= -margin && p <= 2.0 * margin;
        if !visible(px) || !visible(py) {
            return None;
        }
        Some((px as i64, py as i64))
    }

    fn plot(&self, img: &mut RgbImage, x: &NVec3, radius: i64, color: Rgb<u8>) {
        let Some((cx, cy)) = self.to_pixel(x) else {
            return;
        };
        let size = self.size as i64;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy > radius * radius {
                    continue;
                }
                let (px, py) = (cx + dx, cy + dy);
                if (0..size).contains(&px) && (0..size).contains(&py) {
                    img.put_pixel(px as u32, py as u32, color);
                }
            }
        }
    }
}

pub fn frame_name(index: usize) -> String {
    format!("{index:06}.png")
}

fn frame_index(path: &Path) -> Option<u64> {
    path.file_stem()?.to_str()?.parse().ok()
}

/// PNG files in `dir`, ordered by the numeric value of their file stem
/// (`2.png` before `10.png`). Files with non-numeric stems sort last, by name.
pub fn list_frames(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut frames: Vec<(Option<u64>, PathBuf)> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("png")))
        .map(|p| (frame_index(&p), p))
        .collect();

    frames.sort_by(|(ka, pa), (kb, pb)| match (ka, kb) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => pa.cmp(pb),
    });

    Ok(frames.into_iter().map(|(_, p)| p).collect())
}

/// [`list_frames`] restricted to files named by step index
pub fn numbered_frames(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut frames = list_frames(dir)?;
    frames.retain(|p| frame_index(p).is_some());
    Ok(frames)
}

/// Encode `frames` in order as a looping GIF at `fps` frames per second.
/// Returns the number of frames written.
pub fn encode_animation(frames: &[PathBuf], out: &Path, fps: u32) -> Result<usize> {
    if fps == 0 {
        return Err(Error::InvalidParam("animation fps must be > 0".into()));
    }
    if frames.is_empty() {
        return Err(Error::InvalidParam("no frames to animate".into()));
    }

    let mut writer = BufWriter::new(File::create(out)?);
    {
        let mut encoder = GifEncoder::new(&mut writer);
        encoder.set_repeat(Repeat::Infinite)?;
        let delay = Delay::from_numer_denom_ms(1000, fps);
        for path in frames {
            let rgba = image::open(path)?.to_rgba8();
            encoder.encode_frame(Frame::from_parts(rgba, 0, 0, delay))?;
        }
    }
    writer.flush()?;

    log::debug!("encoded {} frames into {}", frames.len(), out.display());
    Ok(frames.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("nbsim-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn frame_names_sort_numerically() {
        assert_eq!(frame_name(7), "000007.png");
        assert!(frame_name(9) < frame_name(10));
    }

    #[test]
    fn list_frames_uses_natural_order() {
        let dir = scratch_dir("list");
        for name in ["10.png", "2.png", "1.png", "notes.txt", "cover.png"] {
            fs::write(dir.join(name), b"").unwrap();
        }
        let names: Vec<String> = list_frames(&dir)
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["1.png", "2.png", "10.png", "cover.png"]);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn renders_due_steps_only() {
        let dir = scratch_dir("render");
        let cfg = RenderConfig {
            dir: dir.to_string_lossy().into_owned(),
            trail: 3,
            extent: 2.0,
            size: 32,
            every: 2,
            animation: None,
            fps: 20,
        };
        let mut renderer = FrameRenderer::new(&cfg, 5).unwrap();
        for i in 0..=5 {
            let p = vec![NVec3::new(0.1 * i as f64, 0.0, 0.0), NVec3::new(5.0, 5.0, 0.0)];
            renderer.consume(Snapshot { index: i, t: i as f64, positions: &p }).unwrap();
        }
        // steps 2, 4 and the final step 5
        assert_eq!(renderer.frames_written(), 3);
        let frames = list_frames(&dir).unwrap();
        assert_eq!(frames.len(), 3);
        assert!(frames[2].ends_with(frame_name(5)));

        let img = image::open(&frames[2]).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (32, 32));
        // body at x = 0.5, y = 0 lands at pixel (20, 16)
        assert_eq!(*img.get_pixel(20, 16), BODY);
        // trail holds steps 1..=4, step 1 at x = 0.1 lands at pixel (16, 16)
        assert_eq!(*img.get_pixel(16, 16), TRAIL);
        let _ = fs::remove_dir_all(&dir);
    }

    fn tiny_config(dir: &Path, animation: Option<PathBuf>) -> RenderConfig {
        RenderConfig {
            dir: dir.to_string_lossy().into_owned(),
            trail: 0,
            extent: 1.0,
            size: 16,
            every: 1,
            animation: animation.map(|p| p.to_string_lossy().into_owned()),
            fps: 20,
        }
    }

    #[test]
    fn far_away_bodies_are_culled() {
        let dir = scratch_dir("far");
        let mut renderer = FrameRenderer::new(&tiny_config(&dir, None), 3).unwrap();
        let far = [
            NVec3::new(1e30, 0.0, 0.0),
            NVec3::new(0.0, -1e30, 0.0),
            NVec3::new(f64::MAX, f64::MIN, 0.0),
            NVec3::new(0.0, 0.0, 0.0),
        ];
        for i in 0..=3 {
            renderer.consume(Snapshot { index: i, t: i as f64, positions: &far }).unwrap();
        }
        assert_eq!(renderer.frames_written(), 3);

        let img = image::open(dir.join(frame_name(3))).unwrap().to_rgb8();
        let dark = img.pixels().filter(|p| **p == BODY).count();
        assert!(dark > 0 && dark <= 13, "only the body at the origin is drawn, got {dark}");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn zero_trail_draws_only_the_previous_state() {
        let dir = scratch_dir("zero-trail");
        let mut renderer = FrameRenderer::new(&tiny_config(&dir, None), 2).unwrap();
        for i in 0..=2 {
            let p = vec![NVec3::new(-0.5 + 0.5 * i as f64, 0.0, 0.0)];
            renderer.consume(Snapshot { index: i, t: i as f64, positions: &p }).unwrap();
        }
        let img = image::open(dir.join(frame_name(2))).unwrap().to_rgb8();
        // scale 8: previous x = 0.0 at (8, 8), step 0 at (4, 8) already evicted
        assert_eq!(*img.get_pixel(8, 8), TRAIL);
        assert_eq!(*img.get_pixel(4, 8), BACKGROUND);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn animation_contains_every_numbered_frame() {
        let dir = scratch_dir("gif");
        let out = dir.join("run.gif");
        let mut renderer = FrameRenderer::new(&tiny_config(&dir, Some(out.clone())), 4).unwrap();
        for i in 0..=4 {
            let p = vec![NVec3::new(0.2 * i as f64, 0.0, 0.0)];
            renderer.consume(Snapshot { index: i, t: i as f64, positions: &p }).unwrap();
        }
        // stray files are not animated
        RgbImage::from_pixel(16, 16, BODY).save(dir.join("cover.png")).unwrap();

        let (path, n) = renderer.write_animation().unwrap().unwrap();
        assert_eq!(path, out);
        assert_eq!(n, 4);

        use image::AnimationDecoder;
        let decoder = image::codecs::gif::GifDecoder::new(std::io::BufReader::new(File::open(&out).unwrap())).unwrap();
        let frames = decoder.into_frames().collect_frames().unwrap();
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0].buffer().dimensions(), (16, 16));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn animation_needs_frames_and_rate() {
        let dir = scratch_dir("gif-empty");
        let out = dir.join("empty.gif");
        assert!(encode_animation(&[], &out, 20).is_err());
        assert!(encode_animation(&[dir.join("000001.png")], &out, 0).is_err());

        let mut cfg = tiny_config(&dir, Some(out));
        cfg.fps = 0;
        assert!(FrameRenderer::new(&cfg, 1).is_err());
        let _ = fs::remove_dir_all(&dir);
    }
}
