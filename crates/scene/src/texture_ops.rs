//! CPU bakes that turn loaded PBR maps into the layout the standard
//! material samples.
//!
//! Every function here works on `image::RgbaImage` and knows nothing about
//! Bevy, so the bakes can be tested without a render app.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

/// Resample `image` to `width`x`height` unless it already matches
fn matched(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if image.dimensions() == (width, height) {
        image.clone()
    } else {
        imageops::resize(image, width, height, FilterType::Triangle)
    }
}

/// Base color whose alpha channel comes from the opacity map's green channel.
///
/// Without an opacity map the color keeps its own alpha.
pub fn combine_base_alpha(color: &RgbaImage, opacity: Option<&RgbaImage>) -> RgbaImage {
    let (width, height) = color.dimensions();
    let mut out = color.clone();

    if let Some(opacity) = opacity {
        let opacity = matched(opacity, width, height);
        for (pixel, mask) in out.pixels_mut().zip(opacity.pixels()) {
            pixel[3] = mask[1];
        }
    }
    out
}

/// Pack separate roughness and metalness maps into one texture.
///
/// Roughness goes to green, metalness to blue. A missing map contributes
/// full intensity so the material scalar alone decides that channel.
pub fn pack_metallic_roughness(
    roughness: Option<&RgbaImage>,
    metallic: Option<&RgbaImage>,
) -> Option<RgbaImage> {
    let (width, height) = roughness.or(metallic)?.dimensions();
    let roughness = roughness.map(|image| matched(image, width, height));
    let metallic = metallic.map(|image| matched(image, width, height));

    let packed = RgbaImage::from_fn(width, height, |x, y| {
        let g = roughness.as_ref().map_or(u8::MAX, |image| image.get_pixel(x, y)[1]);
        let b = metallic.as_ref().map_or(u8::MAX, |image| image.get_pixel(x, y)[2]);
        Rgba([0, g, b, u8::MAX])
    });
    Some(packed)
}

/// Scale the tangent-space XY of a normal map and renormalize.
pub fn scale_normal_map(normal: &RgbaImage, scale: f32) -> RgbaImage {
    let mut out = normal.clone();
    for pixel in out.pixels_mut() {
        let x = (f32::from(pixel[0]) / 255.0 * 2.0 - 1.0) * scale;
        let y = (f32::from(pixel[1]) / 255.0 * 2.0 - 1.0) * scale;
        let z = f32::from(pixel[2]) / 255.0 * 2.0 - 1.0;

        let length = (x * x + y * y + z * z).sqrt();
        let (x, y, z) = if length > f32::EPSILON {
            (x / length, y / length, z / length)
        } else {
            (0.0, 0.0, 1.0)
        };

        pixel[0] = encode_unit(x);
        pixel[1] = encode_unit(y);
        pixel[2] = encode_unit(z);
    }
    out
}

fn encode_unit(v: f32) -> u8 {
    ((v * 0.5 + 0.5).clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Specular level moved into alpha, where the material reads reflectance
pub fn specular_from_level(level: &RgbaImage) -> RgbaImage {
    let mut out = level.clone();
    for pixel in out.pixels_mut() {
        *pixel = Rgba([u8::MAX, u8::MAX, u8::MAX, pixel[0]]);
    }
    out
}

/// Occlusion with intensity applied as `1 + (ao - 1) * intensity`.
///
/// The result is written to RGB so any channel the shader reads agrees.
pub fn apply_ao_intensity(ao: &RgbaImage, intensity: f32) -> RgbaImage {
    let mut out = ao.clone();
    for pixel in out.pixels_mut() {
        let ao = f32::from(pixel[0]) / 255.0;
        let value = (1.0 + (ao - 1.0) * intensity).clamp(0.0, 1.0);
        let byte = (value * 255.0).round() as u8;
        *pixel = Rgba([byte, byte, byte, u8::MAX]);
    }
    out
}

/// Number of levels in a full mip chain for the given size
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Level 0 followed by every box-filtered level down to 1x1, tightly packed.
pub fn build_mip_chain(image: &RgbaImage) -> (Vec<u8>, u32) {
    let (width, height) = image.dimensions();
    let levels = mip_level_count(width, height);

    let mut data = image.as_raw().clone();
    let mut current = image.clone();
    for _ in 1..levels {
        let (w, h) = current.dimensions();
        current = box_downsample(&current, (w / 2).max(1), (h / 2).max(1));
        data.extend_from_slice(current.as_raw());
    }
    (data, levels)
}

/// Average each 2x2 footprint (clamped at odd edges) into one texel
fn box_downsample(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let (src_w, src_h) = image.dimensions();
    RgbaImage::from_fn(width, height, |x, y| {
        let xs = [(2 * x).min(src_w - 1), (2 * x + 1).min(src_w - 1)];
        let ys = [(2 * y).min(src_h - 1), (2 * y + 1).min(src_h - 1)];

        let mut sum = [0u32; 4];
        for sy in ys {
            for sx in xs {
                let p = image.get_pixel(sx, sy);
                for (acc, channel) in sum.iter_mut().zip(p.0) {
                    *acc += u32::from(channel);
                }
            }
        }
        Rgba(sum.map(|s| ((s + 2) / 4) as u8))
    })
}

/// Black disc whose alpha falls off from `opacity` at the center to zero at
/// the rim. `blur` is the falloff exponent; larger values soften the core.
pub fn contact_shadow(size: u32, opacity: f32, blur: f32) -> RgbaImage {
    let size = size.max(1);
    let center = (size as f32 - 1.0) / 2.0;
    let radius = (size as f32 / 2.0).max(f32::EPSILON);
    let exponent = blur.max(f32::EPSILON);

    RgbaImage::from_fn(size, size, |x, y| {
        let dx = x as f32 - center;
        let dy = y as f32 - center;
        let d = ((dx * dx + dy * dy).sqrt() / radius).min(1.0);
        let alpha = opacity.clamp(0.0, 1.0) * (1.0 - d).powf(exponent);
        Rgba([0, 0, 0, (alpha * 255.0).round() as u8])
    })
}

/// Single-channel height samples used for CPU displacement
#[derive(Debug, Clone, PartialEq)]
pub struct HeightField {
    width: u32,
    height: u32,
    samples: Vec<f32>,
}

impl HeightField {
    /// Read heights from the red channel, normalized to [0, 1]
    pub fn from_image(image: &RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        let samples = image.pixels().map(|p| f32::from(p[0]) / 255.0).collect();
        Self {
            width,
            height,
            samples,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn texel(&self, x: i64, y: i64) -> f32 {
        let w = i64::from(self.width);
        let h = i64::from(self.height);
        let x = x.rem_euclid(w) as usize;
        let y = y.rem_euclid(h) as usize;
        self.samples[y * self.width as usize + x]
    }

    /// Bilinear sample with repeat wrapping; `(0, 0)` is the top-left texel
    pub fn sample(&self, u: f32, v: f32) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let fx = u * self.width as f32 - 0.5;
        let fy = v * self.height as f32 - 0.5;
        let x0 = fx.floor();
        let y0 = fy.floor();
        let tx = fx - x0;
        let ty = fy - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);

        let top = self.texel(x0, y0) * (1.0 - tx) + self.texel(x0 + 1, y0) * tx;
        let bottom = self.texel(x0, y0 + 1) * (1.0 - tx) + self.texel(x0 + 1, y0 + 1) * tx;
        top * (1.0 - ty) + bottom * ty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(rgba))
    }

    #[test]
    fn test_base_alpha_from_opacity_green() {
        let color = solid(4, 4, [200, 100, 50, 255]);
        let opacity = solid(4, 4, [0, 64, 0, 255]);
        let out = combine_base_alpha(&color, Some(&opacity));
        assert_eq!(out.get_pixel(1, 2).0, [200, 100, 50, 64]);
    }

    #[test]
    fn test_base_alpha_resizes_opacity() {
        let color = solid(8, 8, [10, 10, 10, 0]);
        let opacity = solid(2, 2, [0, 128, 0, 255]);
        let out = combine_base_alpha(&color, Some(&opacity));
        assert_eq!(out.dimensions(), (8, 8));
        assert_eq!(out.get_pixel(7, 7)[3], 128);
    }

    #[test]
    fn test_base_alpha_without_opacity_keeps_alpha() {
        let out = combine_base_alpha(&solid(2, 2, [1, 2, 3, 7]), None);
        assert!(out.pixels().all(|p| p.0 == [1, 2, 3, 7]));
    }

    #[test]
    fn test_specular_level_in_alpha() {
        let out = specular_from_level(&solid(1, 1, [90, 0, 0, 255]));
        assert_eq!(out.get_pixel(0, 0).0, [255, 255, 255, 90]);
    }

    #[test]
    fn test_pack_metallic_roughness_channels() {
        let rough = solid(2, 2, [0, 30, 0, 255]);
        let metal = solid(2, 2, [0, 0, 220, 255]);
        let packed = pack_metallic_roughness(Some(&rough), Some(&metal)).unwrap();
        assert_eq!(packed.get_pixel(0, 0).0, [0, 30, 220, 255]);

        let rough_only = pack_metallic_roughness(Some(&rough), None).unwrap();
        assert_eq!(rough_only.get_pixel(1, 1).0, [0, 30, 255, 255]);

        assert!(pack_metallic_roughness(None, None).is_none());
    }

    #[test]
    fn test_normal_scale_one_preserves_normal() {
        // Encodes roughly (0.3, -0.2, 0.93)
        let normal = solid(2, 2, [166, 102, 246, 255]);
        let out = scale_normal_map(&normal, 1.0);
        for (a, b) in out.get_pixel(0, 0).0.iter().zip(normal.get_pixel(0, 0).0) {
            assert!((i16::from(*a) - i16::from(b)).abs() <= 1, "{a} vs {b}");
        }
    }

    #[test]
    fn test_normal_scale_zero_is_flat() {
        let out = scale_normal_map(&solid(1, 1, [200, 40, 180, 255]), 0.0);
        assert_eq!(out.get_pixel(0, 0).0, [128, 128, 255, 255]);
    }

    #[test]
    fn test_ao_intensity_zero_is_white() {
        let ao = solid(3, 3, [40, 40, 40, 255]);
        let out = apply_ao_intensity(&ao, 0.0);
        assert!(out.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn test_ao_intensity_amplifies() {
        let ao = solid(1, 1, [191, 191, 191, 255]);
        // 0.749 at intensity 2 => 1 - 0.502 = 0.498
        let out = apply_ao_intensity(&ao, 2.0);
        assert!((i16::from(out.get_pixel(0, 0)[0]) - 127).abs() <= 1);
        let clamped = apply_ao_intensity(&solid(1, 1, [0, 0, 0, 255]), 5.0);
        assert_eq!(clamped.get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn test_mip_chain_ends_at_one_by_one() {
        let image = solid(8, 4, [255, 0, 0, 255]);
        let (data, levels) = build_mip_chain(&image);
        assert_eq!(levels, 4);
        // 8x4 + 4x2 + 2x1 + 1x1
        assert_eq!(data.len(), (32 + 8 + 2 + 1) * 4);
        assert_eq!(&data[data.len() - 4..], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_mip_level_count() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(1024, 512), 11);
        assert_eq!(mip_level_count(3, 5), 3);
    }

    #[test]
    fn test_box_downsample_averages() {
        let mut image = solid(2, 2, [0, 0, 0, 255]);
        image.put_pixel(0, 0, Rgba([200, 0, 0, 255]));
        image.put_pixel(1, 1, Rgba([200, 0, 0, 255]));
        let out = box_downsample(&image, 1, 1);
        assert_eq!(out.get_pixel(0, 0)[0], 100);
    }

    #[test]
    fn test_contact_shadow_falloff() {
        let shadow = contact_shadow(64, 0.5, 2.0);
        let center = shadow.get_pixel(32, 32)[3];
        let edge = shadow.get_pixel(0, 32)[3];
        let corner = shadow.get_pixel(0, 0)[3];
        assert!(center > edge);
        assert!(center <= 128);
        assert_eq!(corner, 0);
        assert!(shadow.pixels().all(|p| p[0] == 0 && p[1] == 0 && p[2] == 0));
    }

    #[test]
    fn test_height_field_sampling() {
        let mut image = solid(2, 1, [0, 0, 0, 255]);
        image.put_pixel(1, 0, Rgba([255, 0, 0, 255]));
        let field = HeightField::from_image(&image);

        assert!((field.sample(0.25, 0.5) - 0.0).abs() < 1e-6);
        assert!((field.sample(0.75, 0.5) - 1.0).abs() < 1e-6);
        assert!((field.sample(0.5, 0.5) - 0.5).abs() < 1e-6);
        // Repeat wrapping
        assert!((field.sample(1.75, 0.5) - 1.0).abs() < 1e-6);
        assert!((field.sample(-0.25, 0.5) - 1.0).abs() < 1e-6);
    }
}
