use crate::domain::model::Coordinates;
use crate::extract::numeric::parse_turkish_number;
use crate::utils::error::Result;
use regex::{Captures, Regex};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Hemisphere {
    East,
    West,
    North,
    South,
}

impl Hemisphere {
    fn from_word(word: &str) -> Option<Self> {
        let first = word.chars().next()?.to_lowercase().next()?;
        match first {
            'd' | 'e' => Some(Self::East),
            'b' | 'w' => Some(Self::West),
            'k' | 'n' => Some(Self::North),
            'g' | 's' => Some(Self::South),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct DmsAngle {
    text: String,
    degrees: f64,
    hemisphere: Hemisphere,
}

/// Degree-minute-second positions such as `37°53'10" Doğu - 40°58'20" Kuzey`.
pub struct CoordinateParser {
    dms: Regex,
}

impl CoordinateParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dms: Regex::new(
                r#"(\d{1,3})\s*°\s*(\d{1,2})\s*['′’]\s*(\d{1,2}(?:[.,]\d+)?)\s*(?:"|''|″|”)?\s*((?i:do[ğg]u|bat[ıi]|kuzey|g[üu]ney)|[DBKGEWNS]\b)"#,
            )?,
        })
    }

    fn angle(caps: &Captures<'_>) -> Option<DmsAngle> {
        let degrees = parse_turkish_number(&caps[1])?;
        let minutes = parse_turkish_number(&caps[2])?;
        let seconds = parse_turkish_number(&caps[3])?;
        let hemisphere = Hemisphere::from_word(&caps[4])?;
        if minutes >= 60.0 || seconds >= 60.0 {
            return None;
        }
        Some(DmsAngle {
            text: caps[0].trim().to_string(),
            degrees: degrees + minutes / 60.0 + seconds / 3600.0,
            hemisphere,
        })
    }

    /// Finds the first two DMS angles in the window, preferring a single
    /// line that carries both.
    pub fn extract(&self, lines: &[&str]) -> Option<Coordinates> {
        let per_line: Vec<Vec<DmsAngle>> = lines
            .iter()
            .map(|line| {
                self.dms
                    .captures_iter(line)
                    .filter_map(|caps| Self::angle(&caps))
                    .collect()
            })
            .collect();

        let pair: Vec<&DmsAngle> = match per_line.iter().find(|angles| angles.len() >= 2) {
            Some(angles) => angles.iter().take(2).collect(),
            None => per_line.iter().flatten().take(2).collect(),
        };
        if pair.is_empty() {
            return None;
        }

        let mut coordinates = Coordinates {
            raw: pair
                .iter()
                .map(|angle| angle.text.as_str())
                .collect::<Vec<_>>()
                .join(" - "),
            latitude: None,
            longitude: None,
        };
        for angle in pair {
            match angle.hemisphere {
                Hemisphere::East => coordinates.longitude = Some(angle.degrees),
                Hemisphere::West => coordinates.longitude = Some(-angle.degrees),
                Hemisphere::North => coordinates.latitude = Some(angle.degrees),
                Hemisphere::South => coordinates.latitude = Some(-angle.degrees),
            }
        }
        Some(coordinates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-6)
    }

    #[test]
    fn test_turkish_direction_words() {
        let parser = CoordinateParser::new().unwrap();
        let coords = parser
            .extract(&["KOORDİNAT : 37°53'10\" Doğu - 40°58'20\" Kuzey"])
            .unwrap();
        assert!(close(coords.longitude, 37.0 + 53.0 / 60.0 + 10.0 / 3600.0));
        assert!(close(coords.latitude, 40.0 + 58.0 / 60.0 + 20.0 / 3600.0));
        assert_eq!(coords.raw, "37°53'10\" Doğu - 40°58'20\" Kuzey");
    }

    #[test]
    fn test_single_letter_directions_and_signs() {
        let parser = CoordinateParser::new().unwrap();
        let coords = parser.extract(&["41°38'50\"G 26°34'20\"B"]).unwrap();
        assert!(close(coords.latitude, -(41.0 + 38.0 / 60.0 + 50.0 / 3600.0)));
        assert!(close(coords.longitude, -(26.0 + 34.0 / 60.0 + 20.0 / 3600.0)));
    }

    #[test]
    fn test_angles_on_separate_lines() {
        let parser = CoordinateParser::new().unwrap();
        let coords = parser
            .extract(&["Boylam 36°1'14'' DOĞU", "Enlem 40°55'13'' KUZEY"])
            .unwrap();
        assert!(coords.lat_lon().is_some());
        assert!(close(coords.latitude, 40.0 + 55.0 / 60.0 + 13.0 / 3600.0));
    }

    #[test]
    fn test_no_coordinates() {
        let parser = CoordinateParser::new().unwrap();
        assert!(parser.extract(&["YAĞIŞ ALANI : 210,00 km2"]).is_none());
    }
}
