/// Cover image descriptors and crop geometry
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverRole {
    Front,
    Back,
}

/// Snapshot of one cover slot taken while detecting
#[derive(Debug, Clone, PartialEq)]
pub struct CoverImage {
    pub role: CoverRole,
    pub present: bool,
    pub natural_width: u32,
    pub natural_height: u32,
    pub source_url: String,
}

impl CoverImage {
    pub fn new(
        role: CoverRole,
        natural_width: u32,
        natural_height: u32,
        source_url: String,
    ) -> CoverImage {
        CoverImage {
            role,
            present: true,
            natural_width,
            natural_height,
            source_url,
        }
    }

    pub fn absent(role: CoverRole) -> CoverImage {
        CoverImage {
            role,
            present: false,
            natural_width: 0,
            natural_height: 0,
            source_url: String::new(),
        }
    }
}

/// Both cover slots of a movie page
#[derive(Debug, Clone, PartialEq)]
pub struct CoverImages {
    pub front: CoverImage,
    pub back: CoverImage,
}

impl CoverImages {
    /// Returns the front cover when the page offers a split:
    /// a front cover of the expected shape and no back cover yet.
    pub fn splittable_front(&self, shape: &SplittableShape) -> Option<&CoverImage> {
        if !self.front.present || self.back.present {
            return None;
        }
        shape
            .matches(self.front.natural_width, self.front.natural_height)
            .then_some(&self.front)
    }
}

/// Natural size a combined cover scan must have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplittableShape {
    pub width: u32,
    pub max_height: u32,
}

impl SplittableShape {
    pub fn matches(&self, width: u32, height: u32) -> bool {
        width == self.width && height <= self.max_height
    }
}

impl Default for SplittableShape {
    fn default() -> Self {
        SplittableShape {
            width: 800,
            max_height: 600,
        }
    }
}

/// Pixel rectangle `[x, y, x + width, y + height)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Vertical strip of a cover scan; the height comes from the image itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropBand {
    pub x: u32,
    pub width: u32,
}

impl CropBand {
    pub fn region(&self, height: u32) -> Region {
        Region {
            x: self.x,
            y: 0,
            width: self.width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn covers(front: Option<(u32, u32)>, back: bool) -> CoverImages {
        CoverImages {
            front: match front {
                Some((w, h)) => {
                    CoverImage::new(CoverRole::Front, w, h, "https://x/front.jpg".to_string())
                }
                None => CoverImage::absent(CoverRole::Front),
            },
            back: if back {
                CoverImage::new(CoverRole::Back, 380, 450, "https://x/back.jpg".to_string())
            } else {
                CoverImage::absent(CoverRole::Back)
            },
        }
    }

    #[test]
    fn test_splittable_front_only() {
        let shape = SplittableShape::default();

        assert!(covers(Some((800, 450)), false).splittable_front(&shape).is_some());
        assert!(covers(Some((800, 600)), false).splittable_front(&shape).is_some());
        assert!(covers(Some((800, 1)), false).splittable_front(&shape).is_some());
    }

    #[test]
    fn test_not_splittable_shapes() {
        let shape = SplittableShape::default();

        assert!(covers(Some((800, 601)), false).splittable_front(&shape).is_none());
        assert!(covers(Some((799, 450)), false).splittable_front(&shape).is_none());
        assert!(covers(Some((1600, 450)), false).splittable_front(&shape).is_none());
    }

    #[test]
    fn test_not_splittable_with_back_or_without_front() {
        let shape = SplittableShape::default();

        assert!(covers(Some((800, 450)), true).splittable_front(&shape).is_none());
        assert!(covers(None, false).splittable_front(&shape).is_none());
        assert!(covers(None, true).splittable_front(&shape).is_none());
    }

    #[test]
    fn test_band_region_uses_full_height() {
        let band = CropBand { x: 420, width: 380 };
        assert_eq!(
            band.region(450),
            Region { x: 420, y: 0, width: 380, height: 450 }
        );
    }
}
