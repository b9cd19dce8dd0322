//! AVIF source decoding.
//!
//! The `image` crate only ships an AVIF *encoder* in pure Rust; its decoder
//! needs the dav1d C library. AVIF sources are therefore unpacked with
//! `avif-parse` (container) and decoded with `rav1d` (pure Rust port of
//! dav1d), then converted from YUV to RGB8 here.

use super::backend::EncodeError;
use image::DynamicImage;
use rav1d::include::dav1d::data::Dav1dData;
use rav1d::include::dav1d::dav1d::Dav1dSettings;
use rav1d::include::dav1d::headers::{
    DAV1D_PIXEL_LAYOUT_I400, DAV1D_PIXEL_LAYOUT_I420, DAV1D_PIXEL_LAYOUT_I422,
    DAV1D_PIXEL_LAYOUT_I444,
};
use rav1d::include::dav1d::picture::Dav1dPicture;
use rav1d::src::lib as dav1d;
use std::path::Path;
use std::ptr::NonNull;

pub(super) fn is_avif(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("avif"))
}

/// Decode an AVIF file into an RGB8 image.
pub(super) fn decode_avif(path: &Path) -> Result<DynamicImage, EncodeError> {
    let file_data = std::fs::read(path)?;
    let avif = avif_parse::read_avif(&mut std::io::Cursor::new(&file_data)).map_err(|e| {
        EncodeError::Decode(format!("Failed to parse AVIF {}: {e:?}", path.display()))
    })?;
    let av1_bytes: &[u8] = &avif.primary_item;

    let mut settings = std::mem::MaybeUninit::<Dav1dSettings>::uninit();
    let settings_ptr = NonNull::new(settings.as_mut_ptr())
        .ok_or_else(|| EncodeError::Decode("rav1d settings pointer is null".into()))?;
    unsafe { dav1d::dav1d_default_settings(settings_ptr) };
    let mut settings = unsafe { settings.assume_init() };
    settings.n_threads = 1;
    settings.max_frame_delay = 1;

    let mut ctx = None;
    let rc = unsafe { dav1d::dav1d_open(NonNull::new(&mut ctx), NonNull::new(&mut settings)) };
    if rc.0 != 0 {
        return Err(EncodeError::Decode(format!("rav1d open failed ({})", rc.0)));
    }

    // Every exit below funnels through the single close after this block.
    let decoded = (|| {
        let mut data = Dav1dData::default();
        let buf =
            unsafe { dav1d::dav1d_data_create(NonNull::new(&mut data), av1_bytes.len()) };
        if buf.is_null() {
            return Err(EncodeError::Decode("rav1d data_create failed".into()));
        }
        unsafe { std::ptr::copy_nonoverlapping(av1_bytes.as_ptr(), buf, av1_bytes.len()) };

        let rc = unsafe { dav1d::dav1d_send_data(ctx, NonNull::new(&mut data)) };
        if rc.0 != 0 {
            unsafe { dav1d::dav1d_data_unref(NonNull::new(&mut data)) };
            return Err(EncodeError::Decode(format!(
                "rav1d send_data failed ({})",
                rc.0
            )));
        }

        let mut pic: Dav1dPicture = unsafe { std::mem::zeroed() };
        let rc = unsafe { dav1d::dav1d_get_picture(ctx, NonNull::new(&mut pic)) };
        if rc.0 != 0 {
            return Err(EncodeError::Decode(format!(
                "rav1d get_picture failed ({})",
                rc.0
            )));
        }

        let image = picture_to_rgb(&pic);
        unsafe { dav1d::dav1d_picture_unref(NonNull::new(&mut pic)) };
        image
    })();

    unsafe { dav1d::dav1d_close(NonNull::new(&mut ctx)) };
    decoded
}

/// One YUV plane inside a decoded picture.
#[derive(Clone, Copy)]
struct Plane {
    ptr: *const u8,
    stride: isize,
}

impl Plane {
    /// Sample at (x, y); 10/12-bit content is stored as u16.
    #[inline]
    fn sample(self, x: u32, y: u32, bpc: u32) -> f32 {
        if bpc <= 8 {
            (unsafe { *self.ptr.offset(y as isize * self.stride + x as isize) }) as f32
        } else {
            let offset = y as isize * self.stride + x as isize * 2;
            (unsafe { *(self.ptr.offset(offset) as *const u16) }) as f32
        }
    }
}

fn plane(pic: &Dav1dPicture, index: usize, stride: isize) -> Result<Plane, EncodeError> {
    let ptr = pic.data[index]
        .map(|p| p.as_ptr() as *const u8)
        .ok_or_else(|| EncodeError::Decode(format!("AVIF plane {index} missing")))?;
    Ok(Plane { ptr, stride })
}

/// Convert a decoded picture to interleaved RGB8 using BT.601 coefficients.
fn picture_to_rgb(pic: &Dav1dPicture) -> Result<DynamicImage, EncodeError> {
    let width = pic.p.w as u32;
    let height = pic.p.h as u32;
    let bpc = pic.p.bpc as u32;
    let layout = pic.p.layout;

    let luma = plane(pic, 0, pic.stride[0])?;
    // (chroma planes, horizontal subsampling, vertical subsampling)
    let chroma = if layout == DAV1D_PIXEL_LAYOUT_I400 {
        None
    } else {
        let (ss_x, ss_y) = match layout {
            DAV1D_PIXEL_LAYOUT_I420 => (true, true),
            DAV1D_PIXEL_LAYOUT_I422 => (true, false),
            DAV1D_PIXEL_LAYOUT_I444 => (false, false),
            _ => {
                return Err(EncodeError::Decode(format!(
                    "Unsupported AVIF pixel layout: {layout}"
                )));
            }
        };
        let u = plane(pic, 1, pic.stride[1])?;
        let v = plane(pic, 2, pic.stride[1])?;
        Some((u, v, ss_x, ss_y))
    };

    let max_val = ((1u32 << bpc) - 1) as f32;
    let center = (1u32 << (bpc - 1)) as f32;
    let scale = 255.0 / max_val;

    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    for row in 0..height {
        for col in 0..width {
            let y = luma.sample(col, row, bpc);
            let (r, g, b) = match chroma {
                None => (y, y, y),
                Some((u, v, ss_x, ss_y)) => {
                    let cx = if ss_x { col / 2 } else { col };
                    let cy = if ss_y { row / 2 } else { row };
                    let cb = u.sample(cx, cy, bpc) - center;
                    let cr = v.sample(cx, cy, bpc) - center;
                    (
                        y + 1.402 * cr,
                        y - 0.344136 * cb - 0.714136 * cr,
                        y + 1.772 * cb,
                    )
                }
            };
            for channel in [r, g, b] {
                rgb.push((channel * scale).clamp(0.0, 255.0) as u8);
            }
        }
    }

    image::RgbImage::from_raw(width, height, rgb)
        .map(DynamicImage::ImageRgb8)
        .ok_or_else(|| EncodeError::Decode("Decoded AVIF buffer has the wrong size".into()))
}
