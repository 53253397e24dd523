use image::DynamicImage;
use rand::Rng;

use crate::domain::prediction::{PredictionResult, WasteClass};

const NON_BIODEGRADABLE_HINTS: [&str; 3] = ["plastic", "bottle", "metal"];
const BIODEGRADABLE_HINTS: [&str; 3] = ["food", "fruit", "organic"];

/// Banda de confianza simulada del modo demo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceBand {
    Upload, // [0.80, 1.00)
    Sample, // [0.85, 1.00)
}

impl ConfidenceBand {
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        let low = match self {
            ConfidenceBand::Upload => 0.80,
            ConfidenceBand::Sample => 0.85,
        };
        rng.gen_range(low..1.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColorTally {
    pub greenish: u64,
    pub blueish: u64,
    pub clearish: u64,
}

impl ColorTally {
    /// Recorre todos los píxeles a resolución original. Los contadores son
    /// independientes: un píxel casi blanco y verdoso suma en ambos.
    pub fn of(image: &DynamicImage) -> Self {
        let mut tally = ColorTally::default();
        for p in image.to_rgb8().pixels() {
            let [r, g, b] = p.0;
            if g > r && g > b {
                tally.greenish += 1;
            }
            if b > r && b > g {
                tally.blueish += 1;
            }
            if r > 200 && g > 200 && b > 200 {
                tally.clearish += 1;
            }
        }
        tally
    }

    pub fn looks_biodegradable(&self) -> bool {
        let is_plastic = self.blueish + self.clearish > self.greenish;
        !is_plastic
    }
}

/// Pista por nombre de archivo; tiene prioridad sobre los píxeles.
pub fn filename_hint(filename: &str) -> Option<bool> {
    let name = filename.to_lowercase();
    if NON_BIODEGRADABLE_HINTS.iter().any(|k| name.contains(k)) {
        Some(false)
    } else if BIODEGRADABLE_HINTS.iter().any(|k| name.contains(k)) {
        Some(true)
    } else {
        None
    }
}

pub fn heuristic_predict<R: Rng + ?Sized>(
    image: &DynamicImage,
    filename: &str,
    band: ConfidenceBand,
    rng: &mut R,
) -> PredictionResult {
    let is_biodegradable =
        filename_hint(filename).unwrap_or_else(|| ColorTally::of(image).looks_biodegradable());
    fixed_class_prediction(WasteClass::from_biodegradable(is_biodegradable), band, rng)
}

/// Resultado con clase conocida y confianza simulada dentro de la banda.
pub fn fixed_class_prediction<R: Rng + ?Sized>(
    class: WasteClass,
    band: ConfidenceBand,
    rng: &mut R,
) -> PredictionResult {
    let confidence = band.draw(rng);
    let raw_prediction = match class {
        WasteClass::NonBiodegradable => confidence,
        WasteClass::Biodegradable => 1.0 - confidence,
    };
    PredictionResult { class, confidence, raw_prediction }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use rand::{rngs::StdRng, SeedableRng};

    fn solid(rgb: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb(rgb)))
    }

    #[test]
    fn tally_counts_are_independent() {
        // verdoso y casi blanco a la vez
        let t = ColorTally::of(&solid([210, 250, 220]));
        assert_eq!(t, ColorTally { greenish: 256, blueish: 0, clearish: 256 });
        // empate: ningún canal domina estrictamente
        let t = ColorTally::of(&solid([100, 100, 100]));
        assert_eq!(t, ColorTally::default());
    }

    #[test]
    fn pixels_decide_without_filename_hint() {
        let mut rng = StdRng::seed_from_u64(1);
        let green = heuristic_predict(&solid([10, 200, 10]), "IMG_0001.JPG", ConfidenceBand::Upload, &mut rng);
        assert_eq!(green.class, WasteClass::Biodegradable);
        let blue = heuristic_predict(&solid([10, 10, 200]), "IMG_0002.JPG", ConfidenceBand::Upload, &mut rng);
        assert_eq!(blue.class, WasteClass::NonBiodegradable);
        // todo neutro: 0 > 0 es falso, así que no es plástico
        let grey = heuristic_predict(&solid([90, 90, 90]), "x.png", ConfidenceBand::Upload, &mut rng);
        assert_eq!(grey.class, WasteClass::Biodegradable);
    }

    #[test]
    fn filename_overrides_pixels() {
        let mut rng = StdRng::seed_from_u64(2);
        let p = heuristic_predict(&solid([0, 255, 0]), "My_Plastic_Thing.png", ConfidenceBand::Upload, &mut rng);
        assert_eq!(p.class, WasteClass::NonBiodegradable);
        let p = heuristic_predict(&solid([0, 0, 255]), "fruit-bowl.jpg", ConfidenceBand::Upload, &mut rng);
        assert_eq!(p.class, WasteClass::Biodegradable);
    }

    #[test]
    fn non_biodegradable_hints_checked_first() {
        assert_eq!(filename_hint("organic_metal_can.jpg"), Some(false));
        assert_eq!(filename_hint("FOOD.PNG"), Some(true));
        assert_eq!(filename_hint("cat.png"), None);
    }

    #[test]
    fn confidence_stays_in_band() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..2000 {
            let u = ConfidenceBand::Upload.draw(&mut rng);
            assert!((0.80..=1.0).contains(&u), "{u}");
            let s = ConfidenceBand::Sample.draw(&mut rng);
            assert!((0.85..=1.0).contains(&s), "{s}");
        }
    }

    #[test]
    fn raw_prediction_agrees_with_threshold_rule() {
        let mut rng = StdRng::seed_from_u64(7);
        let p = fixed_class_prediction(WasteClass::Biodegradable, ConfidenceBand::Sample, &mut rng);
        assert!(p.raw_prediction <= 0.5);
        assert!((p.raw_prediction + p.confidence - 1.0).abs() < 1e-6);
        let p = fixed_class_prediction(WasteClass::NonBiodegradable, ConfidenceBand::Sample, &mut rng);
        assert_eq!(p.raw_prediction, p.confidence);
    }
}
