use nalgebra::Point2;
use opencv::{
    core::{Mat, Point, Vector},
    imgproc,
    prelude::*,
};

use crate::Error;

use super::{Contour, GrayImage, ImageAnalysis, Moments};

/// Image analysis backed by OpenCV's imgproc module
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenCvAnalysis;

impl OpenCvAnalysis {
    pub fn new() -> Self {
        Self
    }
}

fn to_vector(points: &[Point2<i32>]) -> Vector<Point> {
    points.iter().map(|point| Point::new(point.x, point.y)).collect()
}

fn from_vector(points: &Vector<Point>) -> Vec<Point2<i32>> {
    points.iter().map(|point| Point2::new(point.x, point.y)).collect()
}

impl ImageAnalysis for OpenCvAnalysis {
    fn threshold_binary(&self, image: &GrayImage, threshold: u8, max_value: u8) -> Result<GrayImage, Error> {
        let source = Mat::new_rows_cols_with_data(image.height as i32, image.width as i32, &image.buffer)?;
        let mut binary = Mat::default();

        imgproc::threshold(
            &source,
            &mut binary,
            threshold as f64,
            max_value as f64,
            imgproc::THRESH_BINARY,
        )?;

        Ok(GrayImage {
            width: image.width,
            height: image.height,
            buffer: binary.data_bytes()?.to_vec(),
        })
    }

    fn find_contours(&self, binary: &GrayImage) -> Result<Vec<Contour>, Error> {
        let image = Mat::new_rows_cols_with_data(binary.height as i32, binary.width as i32, &binary.buffer)?;
        let mut contours = Vector::<Vector<Point>>::new();

        imgproc::find_contours(
            &image,
            &mut contours,
            imgproc::RETR_EXTERNAL,
            imgproc::CHAIN_APPROX_NONE,
            Point::new(0, 0),
        )?;

        Ok(contours
            .iter()
            .map(|contour| Contour::new(from_vector(&contour)))
            .collect())
    }

    fn approx_poly(&self, contour: &Contour, epsilon: f64) -> Result<Vec<Point2<i32>>, Error> {
        let mut polygon = Vector::<Point>::new();

        imgproc::approx_poly_dp(&to_vector(&contour.points), &mut polygon, epsilon, true)?;

        Ok(from_vector(&polygon))
    }

    fn moments(&self, contour: &Contour) -> Result<Moments, Error> {
        let moments = imgproc::moments(&to_vector(&contour.points), false)?;

        Ok(Moments {
            m00: moments.m00,
            m10: moments.m10,
            m01: moments.m01,
        })
    }
}
