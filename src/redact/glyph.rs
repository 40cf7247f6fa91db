//! Glyph overlay mode.
//!
//! Draws an opaque glyph over the region crop with imageproc primitives.
//! Shapes are scaled from the region's shorter side and centered, so the
//! glyph fully covers the sensitive content regardless of aspect ratio.

use crate::core::Glyph;
use image::{Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_ellipse_mut, draw_filled_rect_mut, draw_hollow_circle_mut,
    draw_polygon_mut,
};
use imageproc::point::Point;
use imageproc::rect::Rect as DrawRect;

const SMILEY_FACE: Rgb<u8> = Rgb([255, 220, 0]);
const SMILEY_BORDER: Rgb<u8> = Rgb([220, 180, 0]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const MONKEY_FACE: Rgb<u8> = Rgb([200, 130, 80]);
const MONKEY_DARK: Rgb<u8> = Rgb([140, 90, 50]);
const MONKEY_HANDS: Rgb<u8> = Rgb([220, 160, 100]);
const STAR_FILL: Rgb<u8> = Rgb([255, 215, 0]);
const HEART_FILL: Rgb<u8> = Rgb([220, 0, 0]);
const LOCK_BODY: Rgb<u8> = Rgb([50, 150, 200]);
const LOCK_SHACKLE: Rgb<u8> = Rgb([100, 100, 100]);
const LOCK_KEYHOLE: Rgb<u8> = Rgb([50, 50, 50]);

/// Draws `glyph` opaquely over a copy of the crop.
pub fn apply(roi: &RgbImage, glyph: Glyph) -> RgbImage {
    let mut out = roi.clone();
    let cx = (roi.width() / 2) as i32;
    let cy = (roi.height() / 2) as i32;
    let radius = ((roi.width().min(roi.height()) / 2) as i32).max(1);
    match glyph {
        Glyph::Smiley => draw_smiley(&mut out, cx, cy, radius),
        Glyph::Sunglasses => draw_sunglasses(&mut out, cx, cy, radius),
        Glyph::SeeNoEvil => draw_see_no_evil(&mut out, cx, cy, radius),
        Glyph::Star => draw_star(&mut out, cx, cy, radius),
        Glyph::Heart => draw_heart(&mut out, cx, cy, radius),
        Glyph::Lock => draw_lock(&mut out, cx, cy, radius),
    }
    out
}

fn draw_smiley(img: &mut RgbImage, cx: i32, cy: i32, r: i32) {
    draw_filled_circle_mut(img, (cx, cy), r, SMILEY_FACE);
    draw_hollow_circle_mut(img, (cx, cy), r, SMILEY_BORDER);
    let eye_r = (r / 6).max(1);
    let eye_dx = r * 2 / 5;
    let eye_dy = r / 3;
    draw_filled_circle_mut(img, (cx - eye_dx, cy - eye_dy), eye_r, BLACK);
    draw_filled_circle_mut(img, (cx + eye_dx, cy - eye_dy), eye_r, BLACK);
    // Mouth: a wide flat ellipse in the lower half.
    draw_filled_ellipse_mut(
        img,
        (cx, cy + r / 3),
        (r / 2).max(1),
        (r / 6).max(1),
        BLACK,
    );
}

fn draw_sunglasses(img: &mut RgbImage, cx: i32, cy: i32, r: i32) {
    draw_filled_circle_mut(img, (cx, cy), r, SMILEY_FACE);
    draw_hollow_circle_mut(img, (cx, cy), r, SMILEY_BORDER);
    let lens_w = (r / 2).max(2);
    let lens_h = (r / 3).max(2);
    let lens_y = cy - r / 3;
    draw_filled_ellipse_mut(img, (cx - r * 2 / 5, lens_y), lens_w / 2 + 1, lens_h / 2 + 1, BLACK);
    draw_filled_ellipse_mut(img, (cx + r * 2 / 5, lens_y), lens_w / 2 + 1, lens_h / 2 + 1, BLACK);
    // Bridge between the lenses.
    let bridge_w = (r * 2 / 5).max(1) as u32;
    draw_filled_rect_mut(
        img,
        DrawRect::at(cx - (bridge_w as i32) / 2, lens_y - 1).of_size(bridge_w, 2),
        BLACK,
    );
    draw_filled_ellipse_mut(
        img,
        (cx, cy + r / 3),
        (r / 2).max(1),
        (r / 6).max(1),
        BLACK,
    );
}

fn draw_see_no_evil(img: &mut RgbImage, cx: i32, cy: i32, r: i32) {
    draw_filled_circle_mut(img, (cx, cy), r, MONKEY_DARK);
    // Inner face, then hands over where the eyes would be.
    draw_filled_ellipse_mut(img, (cx, cy + r / 6), r * 3 / 4, r * 2 / 3, MONKEY_FACE);
    let ear_r = (r / 4).max(1);
    draw_filled_circle_mut(img, (cx - r, cy - r / 4), ear_r, MONKEY_DARK);
    draw_filled_circle_mut(img, (cx + r, cy - r / 4), ear_r, MONKEY_DARK);
    let hand_r = (r * 2 / 5).max(1);
    draw_filled_circle_mut(img, (cx - r / 2, cy - r / 6), hand_r, MONKEY_HANDS);
    draw_filled_circle_mut(img, (cx + r / 2, cy - r / 6), hand_r, MONKEY_HANDS);
    draw_filled_ellipse_mut(
        img,
        (cx, cy + r / 2),
        (r / 4).max(1),
        (r / 8).max(1),
        MONKEY_DARK,
    );
}

fn draw_star(img: &mut RgbImage, cx: i32, cy: i32, r: i32) {
    // Ten alternating outer/inner points starting at the top.
    let outer = r as f32 * 0.95;
    let inner = r as f32 * 0.4;
    let mut points = Vec::with_capacity(10);
    for i in 0..10 {
        let angle = -std::f32::consts::FRAC_PI_2 + i as f32 * std::f32::consts::PI / 5.0;
        let radius = if i % 2 == 0 { outer } else { inner };
        points.push(Point::new(
            cx + (radius * angle.cos()).round() as i32,
            cy + (radius * angle.sin()).round() as i32,
        ));
    }
    if points.first() != points.last() {
        draw_polygon_mut(img, &points, STAR_FILL);
    }
}

fn draw_heart(img: &mut RgbImage, cx: i32, cy: i32, r: i32) {
    let lobe_r = (r / 2).max(1);
    let lobe_y = cy - r / 4;
    draw_filled_circle_mut(img, (cx - lobe_r, lobe_y), lobe_r, HEART_FILL);
    draw_filled_circle_mut(img, (cx + lobe_r, lobe_y), lobe_r, HEART_FILL);
    let tip = Point::new(cx, cy + r);
    let left = Point::new(cx - lobe_r * 2, lobe_y);
    let right = Point::new(cx + lobe_r * 2, lobe_y);
    if tip != left && tip != right && left != right {
        draw_polygon_mut(img, &[left, Point::new(cx, lobe_y), right, tip], HEART_FILL);
    }
}

fn draw_lock(img: &mut RgbImage, cx: i32, cy: i32, r: i32) {
    let body_w = ((r * 6 / 5).max(2)) as u32;
    let body_h = (r.max(2)) as u32;
    let body_x = cx - (body_w as i32) / 2;
    let body_y = cy - r / 6;
    draw_hollow_circle_mut(img, (cx, body_y), (r / 2).max(1), LOCK_SHACKLE);
    draw_hollow_circle_mut(img, (cx, body_y), (r / 2 - 1).max(1), LOCK_SHACKLE);
    draw_filled_rect_mut(img, DrawRect::at(body_x, body_y).of_size(body_w, body_h), LOCK_BODY);
    draw_filled_circle_mut(img, (cx, cy + r / 4), (r / 6).max(1), LOCK_KEYHOLE);
    let slot_h = ((r / 3).max(1)) as u32;
    draw_filled_rect_mut(
        img,
        DrawRect::at(cx - 1, cy + r / 4).of_size(2, slot_h),
        LOCK_KEYHOLE,
    );
}
