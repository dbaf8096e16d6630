use imageproc::{
    contours::{self, BorderType},
    contrast::{self, ThresholdType},
    geometry,
    image::{GrayImage as LumaImage, ImageBuffer},
    point::Point,
};
use nalgebra::Point2;

use crate::Error;

use super::{Contour, GrayImage, ImageAnalysis, Moments};

/// Image analysis on the CPU through `imageproc`
#[derive(Debug, Default, Clone, Copy)]
pub struct CpuAnalysis;

impl CpuAnalysis {
    pub fn new() -> Self {
        Self
    }
}

fn to_luma(image: &GrayImage) -> Result<LumaImage, Error> {
    ImageBuffer::from_raw(image.width as u32, image.height as u32, image.buffer.clone()).ok_or_else(|| {
        Error::Analysis(format!(
            "{}x{} image with {} bytes",
            image.width,
            image.height,
            image.buffer.len()
        ))
    })
}

impl ImageAnalysis for CpuAnalysis {
    fn threshold_binary(&self, image: &GrayImage, threshold: u8, max_value: u8) -> Result<GrayImage, Error> {
        let binary = contrast::threshold(&to_luma(image)?, threshold, ThresholdType::Binary);
        let mut buffer = binary.into_raw();

        if max_value != u8::MAX {
            buffer
                .iter_mut()
                .filter(|value| **value != 0)
                .for_each(|value| *value = max_value);
        }

        Ok(GrayImage {
            width: image.width,
            height: image.height,
            buffer,
        })
    }

    fn find_contours(&self, binary: &GrayImage) -> Result<Vec<Contour>, Error> {
        if binary.width == 0 || binary.height == 0 {
            return Ok(Vec::new());
        }

        Ok(contours::find_contours::<i32>(&to_luma(binary)?)
            .into_iter()
            .filter(|contour| contour.border_type == BorderType::Outer)
            .map(|contour| {
                Contour::new(
                    contour
                        .points
                        .iter()
                        .map(|point| Point2::new(point.x, point.y))
                        .collect(),
                )
            })
            .collect())
    }

    fn approx_poly(&self, contour: &Contour, epsilon: f64) -> Result<Vec<Point2<i32>>, Error> {
        if contour.points.len() < 3 {
            return Ok(contour.points.clone());
        }

        let curve: Vec<_> = contour
            .points
            .iter()
            .map(|point| Point::new(point.x, point.y))
            .collect();
        // imageproc rejects a non-positive epsilon
        let mut polygon: Vec<_> = geometry::approximate_polygon_dp(&curve, epsilon.max(f64::EPSILON), true)
            .into_iter()
            .map(|point| Point2::new(point.x, point.y))
            .collect();

        if polygon.len() > 1 && polygon.first() == polygon.last() {
            polygon.pop();
        }

        Ok(polygon)
    }

    fn moments(&self, contour: &Contour) -> Result<Moments, Error> {
        Ok(Moments::of_polygon(&contour.points))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::analysis::Rect;

    fn filled_rect(width: usize, height: usize, x0: usize, y0: usize, x1: usize, y1: usize) -> GrayImage {
        let mut image = GrayImage::new(width, height);

        for y in y0..=y1 {
            for x in x0..=x1 {
                image.buffer[x + y * width] = 200;
            }
        }

        image
    }

    fn sorted(mut points: Vec<Point2<i32>>) -> Vec<Point2<i32>> {
        points.sort_by_key(|point| (point.x, point.y));
        points
    }

    #[test]
    fn threshold_is_strictly_greater() {
        let mut image = GrayImage::new(3, 1);
        image.buffer = vec![59, 60, 61];

        assert_eq!(CpuAnalysis.threshold_binary(&image, 60, 255).unwrap().buffer, vec![0, 0, 255]);
        assert_eq!(CpuAnalysis.threshold_binary(&image, 60, 1).unwrap().buffer, vec![0, 0, 1]);
    }

    #[test]
    fn rectangle_contour_and_approximation() {
        let image = filled_rect(100, 80, 20, 10, 60, 40);
        let contours = CpuAnalysis.find_contours(&image).unwrap();

        assert_eq!(contours.len(), 1);

        let contour = &contours[0];

        assert_eq!(
            contour.bounding_rect(),
            Some(Rect {
                x: 20,
                y: 10,
                width: 41,
                height: 31
            })
        );

        let epsilon = contour.perimeter() * 0.015;
        let polygon = CpuAnalysis.approx_poly(contour, epsilon).unwrap();

        assert_eq!(
            sorted(polygon),
            vec![
                Point2::new(20, 10),
                Point2::new(20, 40),
                Point2::new(60, 10),
                Point2::new(60, 40)
            ]
        );

        let moments = CpuAnalysis.moments(contour).unwrap();

        assert_relative_eq!(moments.m00, 40.0 * 30.0);
        assert_relative_eq!(moments.m10 / moments.m00, 40.0, epsilon = 1e-9);
        assert_relative_eq!(moments.m01 / moments.m00, 25.0, epsilon = 1e-9);
    }

    #[test]
    fn holes_are_not_reported() {
        let mut image = filled_rect(40, 40, 5, 5, 30, 30);

        for y in 12..20 {
            for x in 12..20 {
                image.buffer[x + y * 40] = 0;
            }
        }

        let contours = CpuAnalysis.find_contours(&image).unwrap();

        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].bounding_rect().unwrap().width, 26);
    }

    #[test]
    fn separate_regions_give_separate_contours() {
        let mut image = filled_rect(50, 50, 2, 2, 10, 10);

        for y in 30..40 {
            for x in 30..45 {
                image.buffer[x + y * 50] = 255;
            }
        }

        let mut widths: Vec<_> = CpuAnalysis
            .find_contours(&image)
            .unwrap()
            .iter()
            .map(|contour| contour.bounding_rect().unwrap().width)
            .collect();
        widths.sort();

        assert_eq!(widths, vec![9, 15]);
    }

    #[test]
    fn tiny_contours_are_kept_as_is() {
        let contour = Contour::new(vec![Point2::new(2, 2)]);

        assert_eq!(CpuAnalysis.approx_poly(&contour, 0.0).unwrap(), contour.points);
        assert_eq!(CpuAnalysis.moments(&contour).unwrap().m00, 0.0);
    }

    #[test]
    fn region_touching_the_border() {
        let image = filled_rect(10, 10, 0, 0, 9, 9);
        let contours = CpuAnalysis.find_contours(&image).unwrap();
        let polygon = CpuAnalysis.approx_poly(&contours[0], 1.0).unwrap();

        assert_eq!(polygon.len(), 4);
        assert_eq!(contours[0].bounding_rect().unwrap().width, 10);
    }

    #[test]
    fn empty_image_has_no_contours() {
        assert!(CpuAnalysis.find_contours(&GrayImage::new(0, 0)).unwrap().is_empty());
    }
}
