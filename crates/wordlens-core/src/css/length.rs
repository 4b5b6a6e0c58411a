//! CSS lengths and unit conversion.
//!
//! Word-processing XML measures most things in twips (twentieths of a
//! point); borders use eighths of a point. Percentages convert relative to a
//! caller-supplied reference.

pub const POINTS_PER_PC: f64 = 12.0;
pub const POINTS_PER_PX: f64 = 0.75;
pub const POINTS_PER_IN: f64 = 72.0;
pub const POINTS_PER_CM: f64 = POINTS_PER_IN / 2.54;
pub const POINTS_PER_MM: f64 = POINTS_PER_CM / 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Units {
    In,
    Cm,
    Mm,
    Pt,
    Pc,
    Px,
    Pct,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CssLength {
    pub value: f64,
    pub units: Units,
}

impl CssLength {
    pub fn new(value: f64, units: Units) -> Self {
        Self { value, units }
    }

    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let split = text
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit() && *c != '.' && *c != '-' && *c != '+')
            .map(|(i, _)| i)?;
        let value: f64 = text[..split].parse().ok()?;
        let units = match text[split..].trim() {
            "%" => Units::Pct,
            "in" => Units::In,
            "cm" => Units::Cm,
            "mm" => Units::Mm,
            "pt" => Units::Pt,
            "pc" => Units::Pc,
            "px" => Units::Px,
            _ => return None,
        };
        Some(Self { value, units })
    }

    pub fn is_percentage(&self) -> bool {
        self.units == Units::Pct
    }

    pub fn is_absolute(&self) -> bool {
        !self.is_percentage()
    }

    /// The length in points; percentages resolve against `total_pts`.
    pub fn to_pts(&self, total_pts: f64) -> f64 {
        match self.units {
            Units::Pct => (self.value / 100.0) * total_pts,
            _ => convert_between_units(self.value, self.units, Units::Pt),
        }
    }
}

pub fn convert_between_units(value: f64, from: Units, to: Units) -> f64 {
    if from == to {
        return value;
    }
    let points = match from {
        Units::In => value * POINTS_PER_IN,
        Units::Cm => value * POINTS_PER_CM,
        Units::Mm => value * POINTS_PER_MM,
        Units::Pt => value,
        Units::Pc => value * POINTS_PER_PC,
        Units::Px => value * POINTS_PER_PX,
        Units::Pct => return value,
    };
    match to {
        Units::In => points / POINTS_PER_IN,
        Units::Cm => points / POINTS_PER_CM,
        Units::Mm => points / POINTS_PER_MM,
        Units::Pt => points,
        Units::Pc => points / POINTS_PER_PC,
        Units::Px => points / POINTS_PER_PX,
        Units::Pct => points,
    }
}

/// A CSS length rendered as a twip count; percentages resolve against
/// `relative_twips`.
pub fn twips_from_css(text: &str, relative_twips: i32) -> Option<String> {
    let length = CssLength::parse(text)?;
    let twips = if length.is_percentage() {
        ((length.value / 100.0) * relative_twips as f64).round() as i64
    } else {
        (length.to_pts(0.0) * 20.0).round() as i64
    };
    Some(twips.to_string())
}

/// A twip count rendered as a CSS point length.
pub fn css_pts_from_twips(twips: i64) -> String {
    let pts = twips as f64 / 20.0;
    format_pts(pts)
}

/// Formats a point value the short way: no trailing zeros, "pt" suffix.
pub fn format_pts(pts: f64) -> String {
    if (pts - pts.round()).abs() < 1e-9 {
        format!("{}pt", pts.round() as i64)
    } else {
        let mut s = format!("{:.2}", pts);
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
        format!("{}pt", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_lengths() {
        assert_eq!(CssLength::parse("12pt"), Some(CssLength::new(12.0, Units::Pt)));
        assert_eq!(CssLength::parse("2.5cm"), Some(CssLength::new(2.5, Units::Cm)));
        assert_eq!(CssLength::parse("50%"), Some(CssLength::new(50.0, Units::Pct)));
        assert_eq!(CssLength::parse("-3px"), Some(CssLength::new(-3.0, Units::Px)));
        assert_eq!(CssLength::parse("12"), None);
        assert_eq!(CssLength::parse("thin"), None);
    }

    #[test]
    fn converts_to_twips() {
        assert_eq!(twips_from_css("1pt", 0).as_deref(), Some("20"));
        assert_eq!(twips_from_css("1in", 0).as_deref(), Some("1440"));
        assert_eq!(twips_from_css("50%", 1000).as_deref(), Some("500"));
        assert_eq!(twips_from_css("bogus", 0), None);
    }

    #[test]
    fn formats_points_compactly() {
        assert_eq!(css_pts_from_twips(240), "12pt");
        assert_eq!(css_pts_from_twips(250), "12.5pt");
        assert_eq!(format_pts(0.5), "0.5pt");
    }

    #[test]
    fn px_converts_at_three_quarters_pt() {
        assert_eq!(convert_between_units(4.0, Units::Px, Units::Pt), 3.0);
        assert_eq!(convert_between_units(1.0, Units::Pc, Units::Pt), 12.0);
    }
}
